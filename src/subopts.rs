//! Decoders for flags whose argument packs a tag and positional values
//! into one string, e.g. `--filter_r gc=0.3,0.6` or `--select_b center,2,40`.
//!
//! The argument is split on `=` and `,`; the first part names the variant
//! and decides how many values follow and what type they are.

use crate::error::ConfigError;
use regex::Regex;
use std::{fmt, str::FromStr, sync::LazyLock};

static DELIMITERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[=,]").unwrap());

const FILTER_R: &str = "--filter_r";
const FILTER_B: &str = "--filter_b";
const SELECT_R: &str = "--select_r";
const SELECT_B: &str = "--select_b";
const HACKER: &str = "--hacker";

/// Inclusive numeric bounds with `min < max`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds<T> {
    pub min: T,
    pub max: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlastFilter {
    /// Drop targets hitting more than one place in the reference
    NonUnique,
    /// Drop targets hitting the exclusion database
    Exclusion,
    /// Drop targets whose best hit cannot be told apart from the next
    Ambiguous,
}

impl BlastFilter {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "blast_n" => Some(BlastFilter::NonUnique),
            "blast_x" => Some(BlastFilter::Exclusion),
            "blast_a" => Some(BlastFilter::Ambiguous),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            BlastFilter::NonUnique => "blast_n",
            BlastFilter::Exclusion => "blast_x",
            BlastFilter::Ambiguous => "blast_a",
        }
    }
}

// --------------------------------------------------
#[derive(Debug, Clone, PartialEq)]
pub enum RegionFilter {
    Snp(Bounds<usize>),
    Mask(Bounds<f64>),
    Gc(Bounds<f64>),
    Len(Bounds<usize>),
    /// Pairwise identity range
    Pairwise(Bounds<f64>),
    /// Hit identity range for a BLAST screen
    Blast(BlastFilter, Bounds<f64>),
    Rand(usize),
    Gap(usize),
    Bad(usize),
}

impl FromStr for RegionFilter {
    type Err = ConfigError;

    fn from_str(arg: &str) -> Result<Self, Self::Err> {
        let opts = SubOpts::split(FILTER_R, arg);
        match opts.tag {
            "snp" => opts.int_bounds().map(RegionFilter::Snp),
            "mask" => opts.proportion_bounds().map(RegionFilter::Mask),
            "gc" => opts.proportion_bounds().map(RegionFilter::Gc),
            "len" => opts.int_bounds().map(RegionFilter::Len),
            "pw" => opts.proportion_bounds().map(RegionFilter::Pairwise),
            "rand" => opts.count().map(RegionFilter::Rand),
            "gap" => opts.count().map(RegionFilter::Gap),
            "bad" => opts.count().map(RegionFilter::Bad),
            tag => match BlastFilter::from_tag(tag) {
                Some(kind) => {
                    opts.proportion_bounds().map(|b| RegionFilter::Blast(kind, b))
                }
                _ => Err(opts.unknown()),
            },
        }
    }
}

impl fmt::Display for RegionFilter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RegionFilter::Snp(b) => write!(f, "snp={},{}", b.min, b.max),
            RegionFilter::Mask(b) => write!(f, "mask={},{}", b.min, b.max),
            RegionFilter::Gc(b) => write!(f, "gc={},{}", b.min, b.max),
            RegionFilter::Len(b) => write!(f, "len={},{}", b.min, b.max),
            RegionFilter::Pairwise(b) => write!(f, "pw={},{}", b.min, b.max),
            RegionFilter::Blast(kind, b) => {
                write!(f, "{}={},{}", kind.tag(), b.min, b.max)
            }
            RegionFilter::Rand(n) => write!(f, "rand,{n}"),
            RegionFilter::Gap(n) => write!(f, "gap,{n}"),
            RegionFilter::Bad(n) => write!(f, "bad,{n}"),
        }
    }
}

// --------------------------------------------------
#[derive(Debug, Clone, PartialEq)]
pub enum BaitFilter {
    Mask(Bounds<f64>),
    Gc(Bounds<f64>),
    /// Pairwise identity range
    Pairwise(Bounds<f64>),
    /// Hit identity range for a BLAST screen
    Blast(BlastFilter, Bounds<f64>),
    Rand(usize),
}

impl FromStr for BaitFilter {
    type Err = ConfigError;

    fn from_str(arg: &str) -> Result<Self, Self::Err> {
        let opts = SubOpts::split(FILTER_B, arg);
        match opts.tag {
            "mask" => opts.proportion_bounds().map(BaitFilter::Mask),
            "gc" => opts.proportion_bounds().map(BaitFilter::Gc),
            "pw" => opts.proportion_bounds().map(BaitFilter::Pairwise),
            "rand" => opts.count().map(BaitFilter::Rand),
            tag => match BlastFilter::from_tag(tag) {
                Some(kind) => {
                    opts.proportion_bounds().map(|b| BaitFilter::Blast(kind, b))
                }
                _ => Err(opts.unknown()),
            },
        }
    }
}

// --------------------------------------------------
/// How conflicting regions within `--dist_r` of each other are resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegionMode {
    /// Keep the region with the most SNPs
    #[default]
    Snp,
    /// Keep the region with the fewest gaps and ambiguities
    Bad,
    /// Keep the most conserved region
    Cons,
    Rand,
}

impl RegionMode {
    pub const CHOICES: &'static [&'static str] = &["snp", "bad", "cons", "rand"];
}

impl FromStr for RegionMode {
    type Err = ConfigError;

    fn from_str(arg: &str) -> Result<Self, Self::Err> {
        let opts = SubOpts::split(SELECT_R, arg);
        let mode = match opts.tag {
            "snp" => RegionMode::Snp,
            "bad" => RegionMode::Bad,
            "cons" => RegionMode::Cons,
            "rand" => RegionMode::Rand,
            tag => {
                return Err(ConfigError::InvalidChoice {
                    flag: SELECT_R,
                    value: tag.to_string(),
                    choices: Self::CHOICES,
                })
            }
        };
        opts.arity(0)?;
        Ok(mode)
    }
}

impl fmt::Display for RegionMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            RegionMode::Snp => "snp",
            RegionMode::Bad => "bad",
            RegionMode::Cons => "cons",
            RegionMode::Rand => "rand",
        };
        write!(f, "{name}")
    }
}

// --------------------------------------------------
/// Where baits are placed within a selected region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaitSelection {
    /// Tile across the whole region
    Tile { overlap: usize },
    /// `count` baits around the region center
    Center { count: usize, overlap: usize },
    /// `count` baits at each end of the region
    Flank { count: usize, overlap: usize },
}

impl BaitSelection {
    pub fn overlap(&self) -> usize {
        match *self {
            BaitSelection::Tile { overlap }
            | BaitSelection::Center { overlap, .. }
            | BaitSelection::Flank { overlap, .. } => overlap,
        }
    }
}

impl FromStr for BaitSelection {
    type Err = ConfigError;

    fn from_str(arg: &str) -> Result<Self, Self::Err> {
        let opts = SubOpts::split(SELECT_B, arg);
        match opts.tag {
            "tile" => {
                opts.arity(1)?;
                Ok(BaitSelection::Tile {
                    overlap: opts.number(0, "non-negative integer")?,
                })
            }
            "center" | "flank" => {
                opts.arity(2)?;
                let count = opts.positive(0)?;
                let overlap = opts.number(1, "non-negative integer")?;
                Ok(if opts.tag == "center" {
                    BaitSelection::Center { count, overlap }
                } else {
                    BaitSelection::Flank { count, overlap }
                })
            }
            _ => Err(opts.unknown()),
        }
    }
}

impl fmt::Display for BaitSelection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BaitSelection::Tile { overlap } => write!(f, "tile,{overlap}"),
            BaitSelection::Center { count, overlap } => {
                write!(f, "center,{count},{overlap}")
            }
            BaitSelection::Flank { count, overlap } => {
                write!(f, "flank,{count},{overlap}")
            }
        }
    }
}

// --------------------------------------------------
/// Developer overrides; rarely needed and not checked for sanity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HackerOpt {
    NoGraph,
    NoWeightGraph,
    Platform(String),
    WeightMax(usize),
}

impl FromStr for HackerOpt {
    type Err = ConfigError;

    fn from_str(arg: &str) -> Result<Self, Self::Err> {
        let opts = SubOpts::split(HACKER, arg);
        match opts.tag {
            "no_graph" => opts.arity(0).map(|_| HackerOpt::NoGraph),
            "no_weight_graph" => opts.arity(0).map(|_| HackerOpt::NoWeightGraph),
            "platform" => {
                opts.arity(1)?;
                Ok(HackerOpt::Platform(opts.values[0].to_string()))
            }
            "weight_max" => opts.count().map(HackerOpt::WeightMax),
            _ => Err(opts.unknown()),
        }
    }
}

// --------------------------------------------------
/// A composite argument split into its tag and positional values
#[derive(Debug)]
struct SubOpts<'a> {
    flag: &'static str,
    tag: &'a str,
    values: Vec<&'a str>,
}

impl<'a> SubOpts<'a> {
    fn split(flag: &'static str, arg: &'a str) -> Self {
        let mut parts = DELIMITERS.split(arg);
        let tag = parts.next().unwrap_or_default();
        SubOpts {
            flag,
            tag,
            values: parts.collect(),
        }
    }

    fn unknown(&self) -> ConfigError {
        ConfigError::UnknownTag {
            flag: self.flag,
            tag: self.tag.to_string(),
        }
    }

    fn arity(&self, expected: usize) -> Result<(), ConfigError> {
        if self.values.len() == expected {
            Ok(())
        } else {
            Err(ConfigError::Arity {
                flag: self.flag,
                tag: self.tag.to_string(),
                expected,
                found: self.values.len(),
            })
        }
    }

    fn number<T: FromStr>(
        &self,
        pos: usize,
        expected: &'static str,
    ) -> Result<T, ConfigError> {
        let value = self.values[pos];
        value.parse().map_err(|_| ConfigError::InvalidNumber {
            flag: self.flag,
            value: format!("{}={value}", self.tag),
            expected,
        })
    }

    fn positive(&self, pos: usize) -> Result<usize, ConfigError> {
        match self.number::<usize>(pos, "positive integer")? {
            0 => Err(ConfigError::InvalidNumber {
                flag: self.flag,
                value: format!("{}=0", self.tag),
                expected: "positive integer",
            }),
            n => Ok(n),
        }
    }

    fn proportion(&self, pos: usize) -> Result<f64, ConfigError> {
        let value: f64 = self.number(pos, "number")?;
        if (0.0..=1.0).contains(&value) {
            Ok(value)
        } else {
            Err(ConfigError::NotProportion {
                flag: self.flag,
                tag: self.tag.to_string(),
                value,
            })
        }
    }

    fn count(&self) -> Result<usize, ConfigError> {
        self.arity(1)?;
        self.number(0, "non-negative integer")
    }

    fn int_bounds(&self) -> Result<Bounds<usize>, ConfigError> {
        self.arity(2)?;
        let min = self.number(0, "non-negative integer")?;
        let max = self.number(1, "non-negative integer")?;
        self.ordered(min, max)
    }

    fn proportion_bounds(&self) -> Result<Bounds<f64>, ConfigError> {
        self.arity(2)?;
        let min = self.proportion(0)?;
        let max = self.proportion(1)?;
        self.ordered(min, max)
    }

    fn ordered<T: PartialOrd + fmt::Display>(
        &self,
        min: T,
        max: T,
    ) -> Result<Bounds<T>, ConfigError> {
        if min < max {
            Ok(Bounds { min, max })
        } else {
            Err(ConfigError::MinNotLessThanMax {
                flag: self.flag,
                tag: self.tag.to_string(),
                min: min.to_string(),
                max: max.to_string(),
            })
        }
    }
}
