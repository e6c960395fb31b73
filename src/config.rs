use crate::{
    cli::{clean, clean_path, Cli, LogLevel},
    error::{ConfigError, ParseError},
    platform::{Environment, Platform, Tool},
    settings::Settings,
    subopts::{BaitFilter, BaitSelection, HackerOpt, RegionFilter, RegionMode},
};
use log::{debug, warn};
use std::{
    fmt,
    io::Write,
    path::{Path, PathBuf},
    str::FromStr,
};

pub const DEFAULT_PREFIX: &str = "mrbait";
const DEFAULT_COV: usize = 1;
const DEFAULT_LEN: usize = 80;
const DEFAULT_THRESH: f64 = 0.1;
const DEFAULT_MASK: f64 = 0.1;
const DEFAULT_BAIT: i64 = 80;
const DEFAULT_WIN_SHIFT: usize = 1;
const DEFAULT_DIST_R: usize = 100;
const DEFAULT_EVALUE: f64 = 0.000001;

const COUNT: &str = "non-negative integer";
const INTEGER: &str = "integer";

// --------------------------------------------------
/// blastn `-task` used to screen targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMethod {
    #[default]
    Blastn,
    BlastnShort,
    Megablast,
    DcMegablast,
}

impl SearchMethod {
    pub const CHOICES: &'static [&'static str] =
        &["blastn", "blastn-short", "megablast", "dc-megablast"];

    pub fn default_word_size(&self) -> usize {
        match self {
            SearchMethod::Megablast => 28,
            _ => 11,
        }
    }

    /// Gap open and extension costs; zero lets megablast use its linear costs
    pub fn default_gap_costs(&self) -> (usize, usize) {
        match self {
            SearchMethod::Megablast => (0, 0),
            _ => (5, 2),
        }
    }
}

impl FromStr for SearchMethod {
    type Err = ();

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "blastn" => Ok(SearchMethod::Blastn),
            "blastn-short" => Ok(SearchMethod::BlastnShort),
            "megablast" => Ok(SearchMethod::Megablast),
            "dc-megablast" => Ok(SearchMethod::DcMegablast),
            _ => Err(()),
        }
    }
}

impl fmt::Display for SearchMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            SearchMethod::Blastn => "blastn",
            SearchMethod::BlastnShort => "blastn-short",
            SearchMethod::Megablast => "megablast",
            SearchMethod::DcMegablast => "dc-megablast",
        };
        write!(f, "{name}")
    }
}

// --------------------------------------------------
#[derive(Debug, Clone, PartialEq)]
pub enum InputSource {
    Maf(PathBuf),
    Loci(PathBuf),
    Assembly(PathBuf),
}

impl InputSource {
    pub fn path(&self) -> &Path {
        match self {
            InputSource::Maf(path)
            | InputSource::Loci(path)
            | InputSource::Assembly(path) => path,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Input {
    pub source: InputSource,
    pub gff: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocusFilter {
    pub min_cov: usize,
    pub min_len: usize,
    pub thresh: f64,
    pub mask: f64,
    pub min_mult: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BaitDesign {
    pub length: usize,
    pub win_width: usize,
    pub win_shift: usize,
    pub selection: BaitSelection,
    pub overlap: usize,
    /// Distance between the starts of neighbouring baits
    pub shift: usize,
    pub filters: Vec<BaitFilter>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionSelection {
    pub mult_reg: bool,
    pub dist_r: usize,
    pub mode: RegionMode,
    pub filters: Vec<RegionFilter>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub method: SearchMethod,
    pub evalue: f64,
    pub gap_open: usize,
    pub gap_extend: usize,
    pub word_size: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tools {
    pub vsearch: PathBuf,
    pub blastn: PathBuf,
    pub makeblastdb: PathBuf,
    pub search: SearchParams,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    pub workdir: PathBuf,
    pub prefix: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hacker {
    pub no_graph: bool,
    pub no_weight_graph: bool,
    pub platform: Option<String>,
    pub weight_max: Option<usize>,
}

impl Hacker {
    fn apply(&mut self, opt: HackerOpt) {
        match opt {
            HackerOpt::NoGraph => self.no_graph = true,
            HackerOpt::NoWeightGraph => self.no_weight_graph = true,
            HackerOpt::Platform(name) => self.platform = Some(name),
            HackerOpt::WeightMax(max) => self.weight_max = Some(max),
        }
    }
}

// --------------------------------------------------
/// A fully resolved run configuration; only `ConfigBuilder` makes one
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    input: Input,
    locus: LocusFilter,
    bait: BaitDesign,
    regions: RegionSelection,
    tools: Tools,
    output: Output,
    hacker: Hacker,
    platform: Platform,
    log: Option<LogLevel>,
}

impl Config {
    pub fn input(&self) -> &Input {
        &self.input
    }

    pub fn locus(&self) -> &LocusFilter {
        &self.locus
    }

    pub fn bait(&self) -> &BaitDesign {
        &self.bait
    }

    pub fn regions(&self) -> &RegionSelection {
        &self.regions
    }

    pub fn tools(&self) -> &Tools {
        &self.tools
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    pub fn hacker(&self) -> &Hacker {
        &self.hacker
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn log(&self) -> Option<LogLevel> {
        self.log
    }
}

// --------------------------------------------------
/// Typed but not yet cross-checked values, gathered from the command line
/// and the optional settings file
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    maf: Option<PathBuf>,
    loci: Option<PathBuf>,
    assembly: Option<PathBuf>,
    gff: Option<PathBuf>,
    min_cov: Option<usize>,
    min_len: Option<usize>,
    thresh: Option<f64>,
    mask: Option<f64>,
    no_mask: bool,
    bait: Option<i64>,
    win_width: Option<usize>,
    win_shift: Option<usize>,
    min_mult: Option<usize>,
    mult_reg: bool,
    dist_r: Option<usize>,
    region_mode: Option<RegionMode>,
    region_filters: Vec<RegionFilter>,
    bait_selection: Option<BaitSelection>,
    bait_filters: Vec<BaitFilter>,
    vsearch: Option<PathBuf>,
    blastn: Option<PathBuf>,
    makeblastdb: Option<PathBuf>,
    bundle_dir: Option<PathBuf>,
    method: Option<SearchMethod>,
    evalue: Option<f64>,
    gap_open: Option<usize>,
    gap_extend: Option<usize>,
    word_size: Option<usize>,
    out: Option<String>,
    hacker: Hacker,
    log: Option<LogLevel>,
    errors: Vec<ConfigError>,
}

impl ConfigBuilder {
    /// Assign every flag to its field, collecting rather than stopping
    /// at the first bad value
    pub fn from_cli(cli: &Cli) -> Self {
        let mut builder = ConfigBuilder::default();

        let settings = match clean_path(&cli.config) {
            Some(path) => Settings::from_path(&path).unwrap_or_else(|e| {
                builder.errors.push(e);
                Settings::default()
            }),
            _ => Settings::default(),
        };

        builder.maf = clean_path(&cli.maf);
        builder.loci = clean_path(&cli.loci);
        builder.assembly = clean_path(&cli.assembly);
        builder.gff = clean_path(&cli.gff);

        builder.min_cov = builder.number("--cov", COUNT, &cli.cov);
        builder.min_len = builder.number("--len", COUNT, &cli.len);
        builder.thresh = builder.proportion("--thresh", &cli.thresh);
        builder.mask = builder.proportion("--mask", &cli.mask);
        builder.no_mask = cli.no_mask;

        builder.bait = builder.number("--bait", INTEGER, &cli.bait);
        builder.win_width = builder.number("--win_width", COUNT, &cli.win_width);
        builder.win_shift = builder.number("--win_shift", COUNT, &cli.win_shift);
        builder.min_mult = builder.number("--min_mult", COUNT, &cli.min_mult);
        builder.bait_selection = builder.subopt(cli.select_b.as_deref());
        builder.bait_filters = builder.subopts(&cli.filter_b);

        builder.mult_reg = cli.mult_reg;
        builder.dist_r = builder.number("--dist_r", COUNT, &cli.dist_r);
        builder.region_mode = builder.subopt(cli.select_r.as_deref());
        builder.region_filters = builder.subopts(&cli.filter_r);

        builder.vsearch = clean_path(&cli.vsearch).or(settings.tools.vsearch);
        builder.blastn = clean_path(&cli.blastn).or(settings.tools.blastn);
        builder.makeblastdb =
            clean_path(&cli.makedb).or(settings.tools.makeblastdb);
        builder.bundle_dir = settings.tools.bundle_dir;

        builder.method = if cli.blast_method.is_some() {
            builder.method("--blast_method", &cli.blast_method)
        } else {
            builder.method("search.method", &settings.search.method)
        };
        builder.evalue = if cli.evalue.is_some() {
            builder.evalue("--evalue", &cli.evalue)
        } else {
            let evalue = settings.search.evalue.map(|e| e.to_string());
            builder.evalue("search.evalue", &evalue)
        };
        builder.gap_open = builder
            .number("--gapopen", COUNT, &cli.gapopen)
            .or(settings.search.gap_open);
        builder.gap_extend = builder
            .number("--gapextend", COUNT, &cli.gapextend)
            .or(settings.search.gap_extend);
        builder.word_size = builder
            .number("--word_size", COUNT, &cli.word_size)
            .or(settings.search.word_size);

        builder.out = cli.out.as_deref().map(clean);
        for opt in builder.subopts::<HackerOpt>(&cli.hacker) {
            builder.hacker.apply(opt);
        }
        builder.log = cli.log;

        builder
    }

    /// Cross-check the fields, fill in dependent defaults and report what
    /// was decided to `out`
    pub fn resolve(
        self,
        env: &Environment,
        out: &mut impl Write,
    ) -> Result<Config, ParseError> {
        if !self.errors.is_empty() {
            return Err(ParseError::Invalid(self.errors));
        }
        let mut errors = vec![];
        let mut report = vec![];

        let mut given: Vec<(&'static str, InputSource)> = [
            ("--maf", self.maf.map(InputSource::Maf)),
            ("--loci", self.loci.map(InputSource::Loci)),
            ("--assembly", self.assembly.map(InputSource::Assembly)),
        ]
        .into_iter()
        .filter_map(|(flag, source)| source.map(|s| (flag, s)))
        .collect();

        let source = match given.len() {
            0 => {
                errors.push(ConfigError::NoInput);
                None
            }
            1 => given.pop().map(|(_, source)| source),
            _ => {
                errors.push(ConfigError::MultipleInputs(
                    given.iter().map(|(flag, _)| *flag).collect(),
                ));
                None
            }
        };

        let requested = self.bait.unwrap_or(DEFAULT_BAIT);
        let bait = usize::try_from(requested).ok().filter(|&b| b > 0);
        if bait.is_none() {
            errors.push(ConfigError::BaitLength(requested));
        }

        let win_width = self.win_width.or(bait).unwrap_or_default();
        if let Some(bait) = bait {
            if self.win_width.is_none() {
                debug!("Window width defaults to bait length {bait}");
            }
            if win_width < bait {
                errors.push(ConfigError::WindowWidth {
                    width: win_width,
                    bait,
                });
            }
        }
        let win_shift = self.win_shift.unwrap_or(DEFAULT_WIN_SHIFT);
        if win_shift == 0 {
            errors.push(ConfigError::WindowShift);
        }

        if self.dist_r.is_some() && !self.mult_reg {
            warn!("--dist_r is ignored without --mult_reg");
            writeln!(report, "Warning: --dist_r is ignored without --mult_reg")?;
        }
        let dist_r = self.dist_r.unwrap_or(DEFAULT_DIST_R);

        let selection = bait.and_then(|bait| {
            let selection = self
                .bait_selection
                .unwrap_or(BaitSelection::Tile { overlap: bait / 2 });
            if selection.overlap() < bait {
                Some(selection)
            } else {
                errors.push(ConfigError::Overlap {
                    overlap: selection.overlap(),
                    bait,
                });
                None
            }
        });

        let mask = if self.no_mask {
            1.0
        } else {
            self.mask.unwrap_or(DEFAULT_MASK)
        };

        let output = split_output(self.out.as_deref(), &env.cwd);
        writeln!(report, "Working directory: {}", output.workdir.display())?;
        writeln!(report, "Prefix: {}", output.prefix)?;

        let mut min_len = self.min_len.unwrap_or(DEFAULT_LEN);
        if let Some(bait) = bait {
            if min_len < bait {
                debug!("Raising minimum length {min_len} to bait length {bait}");
                min_len = bait;
            }
        }
        let min_mult = self.min_mult.unwrap_or(min_len);

        let platform = match &self.hacker.platform {
            Some(name) => Platform::from_name(name),
            _ => env.detector.detect(),
        };
        writeln!(report, "Platform: {platform}")?;
        let bundle_dir = self.bundle_dir.as_deref().unwrap_or(&env.bundle_dir);
        let bundled = |tool: Tool| tool.bundled_path(bundle_dir, platform);
        let vsearch = self.vsearch.unwrap_or_else(|| bundled(Tool::Vsearch));
        let blastn = self.blastn.unwrap_or_else(|| bundled(Tool::Blastn));
        let makeblastdb = self
            .makeblastdb
            .unwrap_or_else(|| bundled(Tool::Makeblastdb));

        let method = self.method.unwrap_or_default();
        let (gap_open, gap_extend) = method.default_gap_costs();
        let search = SearchParams {
            method,
            evalue: self.evalue.unwrap_or(DEFAULT_EVALUE),
            gap_open: self.gap_open.unwrap_or(gap_open),
            gap_extend: self.gap_extend.unwrap_or(gap_extend),
            word_size: self.word_size.unwrap_or(method.default_word_size()),
        };

        for filter in &self.region_filters {
            writeln!(report, "Region filter: {filter}")?;
        }

        match (source, bait, selection) {
            (Some(source), Some(length), Some(selection)) if errors.is_empty() => {
                out.write_all(&report)?;
                let overlap = selection.overlap();
                Ok(Config {
                    input: Input {
                        source,
                        gff: self.gff,
                    },
                    locus: LocusFilter {
                        min_cov: self.min_cov.unwrap_or(DEFAULT_COV),
                        min_len,
                        thresh: self.thresh.unwrap_or(DEFAULT_THRESH),
                        mask,
                        min_mult,
                    },
                    bait: BaitDesign {
                        length,
                        win_width,
                        win_shift,
                        selection,
                        overlap,
                        shift: length - overlap,
                        filters: self.bait_filters,
                    },
                    regions: RegionSelection {
                        mult_reg: self.mult_reg,
                        dist_r,
                        mode: self.region_mode.unwrap_or_default(),
                        filters: self.region_filters,
                    },
                    tools: Tools {
                        vsearch,
                        blastn,
                        makeblastdb,
                        search,
                    },
                    output,
                    hacker: self.hacker,
                    platform,
                    log: self.log,
                })
            }
            _ => Err(ParseError::Invalid(errors)),
        }
    }

    fn number<T: FromStr>(
        &mut self,
        flag: &'static str,
        expected: &'static str,
        value: &Option<String>,
    ) -> Option<T> {
        let value = clean(value.as_deref()?);
        match value.parse() {
            Ok(num) => Some(num),
            _ => {
                self.errors.push(ConfigError::InvalidNumber {
                    flag,
                    value,
                    expected,
                });
                None
            }
        }
    }

    fn proportion(
        &mut self,
        flag: &'static str,
        value: &Option<String>,
    ) -> Option<f64> {
        let value = clean(value.as_deref()?);
        match value.parse::<f64>() {
            Ok(num) if (0.0..=1.0).contains(&num) => Some(num),
            _ => {
                self.errors.push(ConfigError::InvalidNumber {
                    flag,
                    value,
                    expected: "proportion between 0 and 1",
                });
                None
            }
        }
    }

    fn evalue(
        &mut self,
        flag: &'static str,
        value: &Option<String>,
    ) -> Option<f64> {
        let value = clean(value.as_deref()?);
        match value.parse::<f64>() {
            Ok(num) if num.is_finite() && num > 0.0 => Some(num),
            _ => {
                self.errors.push(ConfigError::InvalidNumber {
                    flag,
                    value,
                    expected: "positive number",
                });
                None
            }
        }
    }

    fn method(
        &mut self,
        flag: &'static str,
        value: &Option<String>,
    ) -> Option<SearchMethod> {
        let value = clean(value.as_deref()?);
        match value.parse() {
            Ok(method) => Some(method),
            _ => {
                self.errors.push(ConfigError::InvalidChoice {
                    flag,
                    value,
                    choices: SearchMethod::CHOICES,
                });
                None
            }
        }
    }

    fn subopt<T: FromStr<Err = ConfigError>>(
        &mut self,
        value: Option<&str>,
    ) -> Option<T> {
        match clean(value?).parse() {
            Ok(opt) => Some(opt),
            Err(e) => {
                self.errors.push(e);
                None
            }
        }
    }

    fn subopts<T: FromStr<Err = ConfigError>>(
        &mut self,
        values: &[String],
    ) -> Vec<T> {
        values
            .iter()
            .flat_map(|value| self.subopt(Some(value.as_str())))
            .collect()
    }
}

// --------------------------------------------------
/// Split `--out` into a working directory and a file prefix.
///
/// The split is at the last `/`: an empty directory part means `cwd` and
/// an empty file part means the default prefix.
pub fn split_output(out: Option<&str>, cwd: &Path) -> Output {
    let (head, tail) = match out {
        Some(out) => match out.rfind('/') {
            Some(pos) => (&out[..=pos], &out[pos + 1..]),
            _ => ("", out),
        },
        _ => ("", ""),
    };

    // Keep a bare root ("/", "//") but drop trailing slashes otherwise
    let trimmed = head.trim_end_matches('/');
    let head = if trimmed.is_empty() { head } else { trimmed };

    Output {
        workdir: if head.is_empty() {
            cwd.to_path_buf()
        } else {
            PathBuf::from(head)
        },
        prefix: if tail.is_empty() {
            DEFAULT_PREFIX.to_string()
        } else {
            tail.to_string()
        },
    }
}

// --------------------------------------------------
#[cfg(test)]
mod tests {
    use super::{
        split_output, BaitSelection, Config, ConfigBuilder, InputSource,
        SearchMethod,
    };
    use crate::{
        cli::Cli,
        error::{ConfigError, ParseError},
        platform::{Environment, Platform},
        subopts::{Bounds, RegionFilter, RegionMode},
    };
    use anyhow::Result;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use std::{fs, path::PathBuf};
    use tempfile::tempdir;

    fn resolve_on(
        platform: Platform,
        args: &[&str],
    ) -> Result<(Result<Config, ParseError>, String)> {
        let cli = Cli::try_parse_from(
            std::iter::once("mrbait").chain(args.iter().copied()),
        )?;
        let env = Environment::new("/work", "/opt/mrbait/bin", platform);
        let mut out = vec![];
        let res = ConfigBuilder::from_cli(&cli).resolve(&env, &mut out);
        Ok((res, String::from_utf8(out)?))
    }

    fn resolve(args: &[&str]) -> Result<(Result<Config, ParseError>, String)> {
        resolve_on(Platform::Linux, args)
    }

    fn errors(args: &[&str]) -> Result<Vec<ConfigError>> {
        match resolve(args)?.0 {
            Err(ParseError::Invalid(errors)) => Ok(errors),
            other => panic!("expected invalid configuration, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults() -> Result<()> {
        let (res, stdout) = resolve(&["-M", "in.maf"])?;
        let config = res?;

        assert_eq!(
            config.input().source,
            InputSource::Maf(PathBuf::from("in.maf"))
        );
        assert_eq!(config.locus().min_cov, 1);
        assert_eq!(config.locus().min_len, 80);
        assert_eq!(config.locus().thresh, 0.1);
        assert_eq!(config.locus().mask, 0.1);
        assert_eq!(config.locus().min_mult, 80);

        let bait = config.bait();
        assert_eq!(bait.length, 80);
        assert_eq!(bait.win_width, 80);
        assert_eq!(bait.win_shift, 1);
        assert_eq!(bait.selection, BaitSelection::Tile { overlap: 40 });
        assert_eq!(bait.overlap, 40);
        assert_eq!(bait.shift, 40);

        assert!(!config.regions().mult_reg);
        assert_eq!(config.regions().dist_r, 100);
        assert_eq!(config.regions().mode, RegionMode::Snp);

        assert_eq!(config.output().workdir, PathBuf::from("/work"));
        assert_eq!(config.output().prefix, "mrbait");

        assert_eq!(
            stdout,
            "Working directory: /work\nPrefix: mrbait\nPlatform: linux\n"
        );
        Ok(())
    }

    #[test]
    fn test_overlap_defaults_to_half_bait() -> Result<()> {
        for b in [1usize, 2, 7, 80, 121] {
            let bait = b.to_string();
            let config = resolve(&["-L", "in.loci", "-b", &bait])?.0?;
            assert_eq!(config.bait().overlap, b / 2);
            assert_eq!(config.bait().shift, b - b / 2);
            assert_eq!(config.bait().win_width, b);
        }
        Ok(())
    }

    #[test]
    fn test_overlap_must_be_less_than_bait() -> Result<()> {
        for select in ["tile,60", "tile,61", "center,2,60", "flank,1,100"] {
            let errs = errors(&["-M", "in.maf", "-b", "60", "-s", select])?;
            assert!(matches!(
                errs[..],
                [ConfigError::Overlap { bait: 60, .. }]
            ));
        }

        let config = resolve(&["-M", "in.maf", "-b", "60", "-s", "center,3,59"])?.0?;
        assert_eq!(config.bait().overlap, 59);
        assert_eq!(config.bait().shift, 1);
        Ok(())
    }

    #[test]
    fn test_bait_length() -> Result<()> {
        assert_eq!(
            errors(&["-M", "in.maf", "-b", "0"])?,
            vec![ConfigError::BaitLength(0)]
        );
        assert_eq!(
            errors(&["-M", "in.maf", "--bait", "-5"])?,
            vec![ConfigError::BaitLength(-5)]
        );
        assert!(matches!(
            errors(&["-M", "in.maf", "-b", "long"])?[..],
            [ConfigError::InvalidNumber { flag: "--bait", .. }]
        ));
        Ok(())
    }

    #[test]
    fn test_inputs() -> Result<()> {
        let errs = errors(&["-b", "80"])?;
        assert_eq!(errs, vec![ConfigError::NoInput]);
        assert!(errs[0].to_string().starts_with("Input not specified"));

        assert_eq!(
            errors(&["-M", "a.maf", "-A", "b.fa"])?,
            vec![ConfigError::MultipleInputs(vec!["--maf", "--assembly"])]
        );

        let config = resolve(&["-A", " genome.fa ", "-e", "genes.gff"])?.0?;
        assert_eq!(
            config.input().source,
            InputSource::Assembly(PathBuf::from("genome.fa"))
        );
        assert_eq!(config.input().gff, Some(PathBuf::from("genes.gff")));
        Ok(())
    }

    #[test]
    fn test_errors_are_collected() -> Result<()> {
        let errs = errors(&[
            "-M", "in.maf", "-c", "x", "-F", "gc=0.5,0.3", "-F", "pw=1.2,0.5",
            "-S", "best",
        ])?;
        assert_eq!(errs.len(), 4);
        assert!(matches!(errs[0], ConfigError::InvalidNumber { flag: "--cov", .. }));
        assert!(matches!(errs[1], ConfigError::InvalidChoice { flag: "--select_r", .. }));
        assert!(matches!(errs[2], ConfigError::MinNotLessThanMax { .. }));
        assert!(matches!(errs[3], ConfigError::NotProportion { .. }));

        // Cross-field checks only run on a clean second pass
        let errs = errors(&["-b", "0", "-c", "x"])?;
        assert_eq!(errs.len(), 1);

        // ...and then report everything they find
        let (res, stdout) = resolve(&["-b", "0", "-W", "0"])?;
        assert_eq!(stdout, "");
        let errs = match res {
            Err(ParseError::Invalid(errs)) => errs,
            other => panic!("expected invalid configuration, got {other:?}"),
        };
        assert_eq!(
            errs,
            vec![
                ConfigError::NoInput,
                ConfigError::BaitLength(0),
                ConfigError::WindowShift
            ]
        );
        Ok(())
    }

    #[test]
    fn test_nothing_reported_on_failure() -> Result<()> {
        for args in [
            &["-b", "80"][..],
            &["-M", "a.maf", "-L", "b.loci", "-F", "snp=1,5"],
            &["-M", "in.maf", "-b", "60", "-s", "tile,60", "-D", "10"],
            &["-M", "in.maf", "-c", "x"],
        ] {
            let (res, stdout) = resolve(args)?;
            assert!(res.is_err(), "{args:?} should fail");
            assert_eq!(stdout, "", "{args:?} should report nothing");
        }
        Ok(())
    }

    #[test]
    fn test_evalue() -> Result<()> {
        for bad in ["NaN", "inf", "-1e-5", "0", "tiny"] {
            assert_eq!(
                errors(&["-M", "in.maf", "--evalue", bad])?,
                vec![ConfigError::InvalidNumber {
                    flag: "--evalue",
                    value: bad.to_string(),
                    expected: "positive number",
                }]
            );
        }

        let dir = tempdir()?;
        let path = dir.path().join("mrbait.toml");
        fs::write(&path, "[search]\nevalue = -1.0\n")?;
        let settings = path.to_string_lossy().to_string();
        assert!(matches!(
            errors(&["-M", "in.maf", "--config", &settings])?[..],
            [ConfigError::InvalidNumber { flag: "search.evalue", .. }]
        ));

        // A good value on the command line replaces a bad one in the file
        let config = resolve(&["-M", "in.maf", "--config", &settings, "--evalue", "1e-3"])?.0?;
        assert_eq!(config.tools().search.evalue, 1e-3);
        Ok(())
    }

    #[test]
    fn test_proportions() -> Result<()> {
        assert!(matches!(
            errors(&["-M", "in.maf", "-t", "1.5"])?[..],
            [ConfigError::InvalidNumber { flag: "--thresh", .. }]
        ));

        let config = resolve(&["-M", "in.maf", "-k", "0.25"])?.0?;
        assert_eq!(config.locus().mask, 0.25);

        let config = resolve(&["-M", "in.maf", "-k", "0.25", "--no_mask"])?.0?;
        assert_eq!(config.locus().mask, 1.0);
        Ok(())
    }

    #[test]
    fn test_window() -> Result<()> {
        let config = resolve(&["-M", "in.maf", "-b", "60", "-w", "150", "-W", "10"])?.0?;
        assert_eq!(config.bait().win_width, 150);
        assert_eq!(config.bait().win_shift, 10);

        assert_eq!(
            errors(&["-M", "in.maf", "-b", "60", "-w", "50"])?,
            vec![ConfigError::WindowWidth { width: 50, bait: 60 }]
        );
        Ok(())
    }

    #[test]
    fn test_min_len_follows_bait() -> Result<()> {
        let config = resolve(&["-M", "in.maf", "-b", "120", "-l", "100"])?.0?;
        assert_eq!(config.locus().min_len, 120);
        assert_eq!(config.locus().min_mult, 120);

        let config = resolve(&["-M", "in.maf", "-b", "60", "-l", "100", "-m", "400"])?.0?;
        assert_eq!(config.locus().min_len, 100);
        assert_eq!(config.locus().min_mult, 400);
        Ok(())
    }

    #[test]
    fn test_dist_r_warning() -> Result<()> {
        let (res, stdout) = resolve(&["-M", "in.maf", "-D", "500"])?;
        assert_eq!(res?.regions().dist_r, 500);
        assert!(stdout.starts_with("Warning: --dist_r is ignored"));

        let (res, stdout) = resolve(&["-M", "in.maf", "-D", "500", "-R"])?;
        let config = res?;
        assert!(config.regions().mult_reg);
        assert_eq!(config.regions().dist_r, 500);
        assert!(!stdout.contains("Warning"));
        Ok(())
    }

    #[test]
    fn test_region_filters_are_reported() -> Result<()> {
        let (res, stdout) = resolve(&[
            "-M", "in.maf", "-F", "snp=1,5", "--filter_r", "gc = 0.3, 0.6",
            "-S", "cons",
        ])?;
        let config = res?;
        assert_eq!(
            config.regions().filters,
            vec![
                RegionFilter::Snp(Bounds { min: 1, max: 5 }),
                RegionFilter::Gc(Bounds { min: 0.3, max: 0.6 }),
            ]
        );
        assert_eq!(config.regions().mode, RegionMode::Cons);
        assert!(stdout.ends_with("Region filter: snp=1,5\nRegion filter: gc=0.3,0.6\n"));
        Ok(())
    }

    #[test]
    fn test_tool_paths_per_platform() -> Result<()> {
        let config = resolve_on(Platform::Unknown, &["-M", "in.maf"])?.0?;
        assert_eq!(config.platform(), Platform::Unknown);
        assert!(config.tools().vsearch.ends_with("vsearch_linux"));
        assert!(config.tools().blastn.ends_with("blastn_linux"));
        assert!(config.tools().makeblastdb.ends_with("makeblastdb_linux"));

        let (res, stdout) = resolve_on(Platform::Macos, &["-M", "in.maf"])?;
        let config = res?;
        assert_eq!(
            config.tools().vsearch,
            PathBuf::from("/opt/mrbait/bin/vsearch_macos")
        );
        assert!(config.tools().blastn.ends_with("blastn_macos"));
        assert!(config.tools().makeblastdb.ends_with("makeblastdb_macos"));
        assert!(stdout.contains("Platform: macos\n"));

        // Each tool is resolved on its own
        let config = resolve_on(
            Platform::Macos,
            &["-M", "in.maf", "--blastn", "/usr/bin/blastn"],
        )?
        .0?;
        assert_eq!(config.tools().blastn, PathBuf::from("/usr/bin/blastn"));
        assert!(config.tools().vsearch.ends_with("vsearch_macos"));
        assert!(config.tools().makeblastdb.ends_with("makeblastdb_macos"));
        Ok(())
    }

    #[test]
    fn test_hacker_platform_override() -> Result<()> {
        let config = resolve_on(
            Platform::Linux,
            &["-M", "in.maf", "--hacker", "platform=Darwin", "--hacker", "no_graph"],
        )?
        .0?;
        assert_eq!(config.platform(), Platform::Macos);
        assert!(config.tools().vsearch.ends_with("vsearch_macos"));
        assert!(config.hacker().no_graph);
        assert!(!config.hacker().no_weight_graph);
        assert_eq!(config.hacker().platform.as_deref(), Some("Darwin"));
        Ok(())
    }

    #[test]
    fn test_search_defaults() -> Result<()> {
        let config = resolve(&["-M", "in.maf"])?.0?;
        let search = &config.tools().search;
        assert_eq!(search.method, SearchMethod::Blastn);
        assert_eq!(search.word_size, 11);
        assert_eq!((search.gap_open, search.gap_extend), (5, 2));
        assert_eq!(search.evalue, 0.000001);

        let config = resolve(&["-M", "in.maf", "--blast_method", "megablast"])?.0?;
        let search = &config.tools().search;
        assert_eq!(search.word_size, 28);
        assert_eq!((search.gap_open, search.gap_extend), (0, 0));

        let config = resolve(&[
            "-M", "in.maf", "--blast_method", "megablast", "--word_size", "16",
            "--evalue", "1e-20",
        ])?
        .0?;
        assert_eq!(config.tools().search.word_size, 16);
        assert_eq!(config.tools().search.evalue, 1e-20);

        assert!(matches!(
            errors(&["-M", "in.maf", "--blast_method", "tblastx"])?[..],
            [ConfigError::InvalidChoice { flag: "--blast_method", .. }]
        ));
        Ok(())
    }

    #[test]
    fn test_settings_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("mrbait.toml");
        fs::write(
            &path,
            "[tools]\nvsearch = \"/site/vsearch\"\nbundle_dir = \"/site/bin\"\n\n\
             [search]\nmethod = \"megablast\"\nevalue = 1e-5\n",
        )?;
        let settings = path.to_string_lossy().to_string();

        let config = resolve(&["-M", "in.maf", "--config", &settings])?.0?;
        assert_eq!(config.tools().vsearch, PathBuf::from("/site/vsearch"));
        assert_eq!(
            config.tools().blastn,
            PathBuf::from("/site/bin/blastn_linux")
        );
        assert_eq!(config.tools().search.method, SearchMethod::Megablast);
        assert_eq!(config.tools().search.word_size, 28);
        assert_eq!(config.tools().search.evalue, 1e-5);

        // The command line wins
        let config = resolve(&[
            "-M", "in.maf", "--config", &settings, "--vsearch", "/mine/vsearch",
            "--blast_method", "blastn", "--evalue", "0.01",
        ])?
        .0?;
        assert_eq!(config.tools().vsearch, PathBuf::from("/mine/vsearch"));
        assert_eq!(config.tools().search.method, SearchMethod::Blastn);
        assert_eq!(config.tools().search.evalue, 0.01);

        let missing = dir.path().join("missing.toml").to_string_lossy().to_string();
        assert!(matches!(
            errors(&["-M", "in.maf", "--config", &missing])?[..],
            [ConfigError::Settings { .. }]
        ));
        Ok(())
    }

    #[test]
    fn test_split_output() {
        let cwd = PathBuf::from("/work");
        let split = |out: Option<&str>| {
            let output = split_output(out, &cwd);
            (output.workdir, output.prefix)
        };

        assert_eq!(split(Some("foo/bar")), (PathBuf::from("foo"), "bar".to_string()));
        assert_eq!(split(Some("bar")), (cwd.clone(), "bar".to_string()));
        assert_eq!(split(None), (cwd.clone(), "mrbait".to_string()));
        assert_eq!(split(Some("foo/")), (PathBuf::from("foo"), "mrbait".to_string()));
        assert_eq!(split(Some("/bar")), (PathBuf::from("/"), "bar".to_string()));
        assert_eq!(
            split(Some("/data/run1//baits")),
            (PathBuf::from("/data/run1"), "baits".to_string())
        );

        // Splitting an already split path gives the same parts back
        let (dir, prefix) = split(Some("out/run/baits"));
        let again = format!("{}/{prefix}", dir.display());
        assert_eq!(split(Some(&again)), (dir, prefix));
    }

    #[test]
    fn test_output_is_reported() -> Result<()> {
        let (res, stdout) = resolve(&["-M", "in.maf", "-o", "results/run1"])?;
        let config = res?;
        assert_eq!(config.output().workdir, PathBuf::from("results"));
        assert_eq!(config.output().prefix, "run1");
        assert!(stdout.starts_with("Working directory: results\nPrefix: run1\n"));
        Ok(())
    }
}
