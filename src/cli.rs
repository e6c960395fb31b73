use clap::{builder::PossibleValue, ArgAction, CommandFactory, Parser, ValueEnum};
use std::path::PathBuf;

const SUBOPTIONS: &str = "\
Region filters (-F, repeatable):
  snp=<min>,<max>      Number of SNPs in the target region
  mask=<min>,<max>     Proportion of masked bases
  gc=<min>,<max>       GC content
  len=<min>,<max>      Region length
  pw=<min>,<max>       Pairwise identity
  blast_n=<min>,<max>  Drop regions hitting the reference more than once
  blast_x=<min>,<max>  Drop regions hitting the exclusion database
  blast_a=<min>,<max>  Drop regions with ambiguous hits
  rand,<n>             Keep <n> regions at random
  gap,<n>              Maximum number of gaps
  bad,<n>              Maximum number of ambiguous bases

Bait filters (-f, repeatable): mask, gc, pw, blast_n, blast_x, blast_a, rand

Bait selection (-s):
  tile,<overlap>       Tile baits across the region
  center,<n>,<overlap> <n> baits around the region center
  flank,<n>,<overlap>  <n> baits at each end of the region

Region selection (-S): snp, bad, cons, rand

Hacker options (--hacker, repeatable):
  no_graph, no_weight_graph, platform=<name>, weight_max=<n>";

/// mrbait: select target regions and design baits from genomic alignments
///
/// Every value is kept as the raw string given on the command line; typing
/// and validation happen when the configuration is resolved.
#[derive(Debug, Default, Parser)]
#[command(
    name = "mrbait",
    author,
    version,
    long_about = None,
    allow_hyphen_values = true,
    args_override_self = true,
    disable_help_flag = true,
    after_help = SUBOPTIONS
)]
pub struct Cli {
    /// Multiple genome alignment (MAF)
    #[arg(short = 'M', long, value_name = "MAF")]
    pub maf: Option<String>,

    /// RAD loci alignments (pyRAD .loci)
    #[arg(short = 'L', long, value_name = "LOCI")]
    pub loci: Option<String>,

    /// Genome assembly (FASTA)
    #[arg(short = 'A', long, value_name = "FASTA")]
    pub assembly: Option<String>,

    /// Annotation file (GFF)
    #[arg(short = 'e', long, value_name = "GFF")]
    pub gff: Option<String>,

    /// Minimum number of sequences per alignment [1]
    #[arg(short, long, value_name = "COV")]
    pub cov: Option<String>,

    /// Minimum alignment length [80]
    #[arg(short, long, value_name = "LEN")]
    pub len: Option<String>,

    /// Mismatch threshold for consensus calling [0.1]
    #[arg(short, long, value_name = "THRESH")]
    pub thresh: Option<String>,

    /// Maximum proportion of masked bases [0.1]
    #[arg(short = 'k', long, value_name = "MASK")]
    pub mask: Option<String>,

    /// Ignore masking when filtering
    #[arg(short = 'x', long = "no_mask")]
    pub no_mask: bool,

    /// Bait length [80]
    #[arg(short, long, value_name = "BAIT")]
    pub bait: Option<String>,

    /// Sliding window width [bait length]
    #[arg(short, long = "win_width", value_name = "WIDTH")]
    pub win_width: Option<String>,

    /// Sliding window shift [1]
    #[arg(short = 'W', long = "win_shift", value_name = "SHIFT")]
    pub win_shift: Option<String>,

    /// Minimum length of a multi-locus region [min length]
    #[arg(short, long = "min_mult", value_name = "LEN")]
    pub min_mult: Option<String>,

    /// Allow more than one target region per locus
    #[arg(short = 'R', long = "mult_reg")]
    pub mult_reg: bool,

    /// Minimum distance between target regions [100]
    #[arg(short = 'D', long = "dist_r", value_name = "DIST")]
    pub dist_r: Option<String>,

    /// Region selection mode [snp]
    #[arg(short = 'S', long = "select_r", value_name = "MODE")]
    pub select_r: Option<String>,

    /// Region filter, e.g. gc=0.3,0.6
    #[arg(short = 'F', long = "filter_r", value_name = "FILTER")]
    pub filter_r: Vec<String>,

    /// Bait selection, e.g. tile,40 [tile,<bait/2>]
    #[arg(short = 's', long = "select_b", value_name = "SELECT")]
    pub select_b: Option<String>,

    /// Bait filter, e.g. gc=0.2,0.8
    #[arg(short = 'f', long = "filter_b", value_name = "FILTER")]
    pub filter_b: Vec<String>,

    /// Path to vsearch [bundled]
    #[arg(long, value_name = "PATH")]
    pub vsearch: Option<String>,

    /// Path to blastn [bundled]
    #[arg(long, value_name = "PATH")]
    pub blastn: Option<String>,

    /// Path to makeblastdb [bundled]
    #[arg(long, value_name = "PATH")]
    pub makedb: Option<String>,

    /// blastn task: blastn, blastn-short, megablast, dc-megablast [blastn]
    #[arg(long = "blast_method", value_name = "METHOD")]
    pub blast_method: Option<String>,

    /// blastn e-value [0.000001]
    #[arg(long, value_name = "EVALUE")]
    pub evalue: Option<String>,

    /// blastn gap open penalty [depends on method]
    #[arg(long, value_name = "COST")]
    pub gapopen: Option<String>,

    /// blastn gap extension penalty [depends on method]
    #[arg(long, value_name = "COST")]
    pub gapextend: Option<String>,

    /// blastn word size [28 for megablast, else 11]
    #[arg(long = "word_size", value_name = "SIZE")]
    pub word_size: Option<String>,

    /// Output directory and file prefix [./mrbait]
    #[arg(short, long, value_name = "OUT")]
    pub out: Option<String>,

    /// TOML file of tool locations and search defaults
    #[arg(long, value_name = "CONFIG")]
    pub config: Option<String>,

    /// Developer overrides, e.g. platform=darwin
    #[arg(long, value_name = "OPT")]
    pub hacker: Vec<String>,

    /// Log level
    #[arg(long)]
    pub log: Option<LogLevel>,

    /// Print help
    #[arg(short, long, action = ArgAction::SetTrue)]
    pub help: bool,
}

impl Cli {
    pub fn usage() -> String {
        Cli::command().render_help().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Debug,
}

impl ValueEnum for LogLevel {
    fn value_variants<'a>() -> &'a [Self] {
        &[LogLevel::Info, LogLevel::Debug]
    }

    fn to_possible_value<'a>(&self) -> Option<PossibleValue> {
        Some(match self {
            LogLevel::Info => PossibleValue::new("info"),
            LogLevel::Debug => PossibleValue::new("debug"),
        })
    }
}

/// Arguments of the paused Fst/missing-data filter
#[derive(Debug, Default, Parser)]
#[command(
    name = "fst-filter",
    author,
    version,
    about = "Estimate Fst for RAD loci and SNPs and filter on Fst and missing data",
    long_about = None,
    allow_hyphen_values = true,
    args_override_self = true,
    disable_help_flag = true
)]
pub struct FstArgs {
    /// Full alignments in .loci format (pyRAD output)
    #[arg(short = 'L', long, value_name = "LOCI")]
    pub loci: Option<String>,

    /// SNP alignment (PHYLIP)
    #[arg(short = 'S', long, value_name = "SNPS")]
    pub snps: Option<String>,

    /// Tab-delimited popmap file
    #[arg(short = 'P', long, value_name = "POPMAP")]
    pub popmap: Option<String>,

    /// Log level
    #[arg(long)]
    pub log: Option<LogLevel>,

    /// Print help
    #[arg(short, long, action = ArgAction::SetTrue)]
    pub help: bool,
}

impl FstArgs {
    pub fn usage() -> String {
        FstArgs::command().render_help().to_string()
    }
}

/// Raw values may be written `-b 80`, `-b80` or ` 80 `
pub(crate) fn clean(value: &str) -> String {
    value.split_whitespace().collect()
}

pub(crate) fn clean_path(value: &Option<String>) -> Option<PathBuf> {
    value.as_deref().map(clean).map(PathBuf::from)
}
