use itertools::Itertools;
use std::{fmt, io};
use thiserror::Error;

/// A single problem found while resolving the configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error(r#"{flag}: "{value}" is not a valid {expected}"#)]
    InvalidNumber {
        flag: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error(r#"{flag}: "{value}" must be one of {}"#, .choices.join(", "))]
    InvalidChoice {
        flag: &'static str,
        value: String,
        choices: &'static [&'static str],
    },

    #[error(r#"{flag}: unrecognized sub-option "{tag}""#)]
    UnknownTag { flag: &'static str, tag: String },

    #[error(
        r#"{flag}: sub-option "{tag}" expects {expected} value(s), found {found}"#
    )]
    Arity {
        flag: &'static str,
        tag: String,
        expected: usize,
        found: usize,
    },

    #[error(
        r#"{flag}: sub-option "{tag}": min must be less than max ({min} >= {max})"#
    )]
    MinNotLessThanMax {
        flag: &'static str,
        tag: String,
        min: String,
        max: String,
    },

    #[error(r#"{flag}: "{tag}" value {value} must be between 0 and 1"#)]
    NotProportion {
        flag: &'static str,
        tag: String,
        value: f64,
    },

    #[error(
        "Input not specified: one of --maf, --loci or --assembly is required"
    )]
    NoInput,

    #[error("Only one input may be given, found {}", .0.join(", "))]
    MultipleInputs(Vec<&'static str>),

    #[error("Popmap not specified: --popmap is required")]
    NoPopmap,

    #[error("Bait length must be greater than zero (got {0})")]
    BaitLength(i64),

    #[error("Overlap ({overlap}) must be less than bait length ({bait})")]
    Overlap { overlap: usize, bait: usize },

    #[error("Window width ({width}) must be at least bait length ({bait})")]
    WindowWidth { width: usize, bait: usize },

    #[error("Window shift must be greater than zero")]
    WindowShift,

    #[error(r#"Cannot use settings file "{path}": {reason}"#)]
    Settings { path: String, reason: String },
}

// --------------------------------------------------
/// Every way a parse can stop short of a `Config`
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Unhandled option {0:?}")]
    UnhandledOption(String),

    #[error("{0}")]
    Syntax(String),

    #[error("{}", ErrorList(.0))]
    Invalid(Vec<ConfigError>),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ParseError {
    /// Malformed flag syntax exits with 2, everything else with 1
    pub fn exit_code(&self) -> i32 {
        match self {
            ParseError::UnhandledOption(_) | ParseError::Syntax(_) => 2,
            ParseError::Invalid(_) | ParseError::Io(_) => 1,
        }
    }

    /// Whether the usage text should accompany the message
    pub fn show_usage(&self) -> bool {
        self.exit_code() == 2
    }

    pub fn errors(&self) -> &[ConfigError] {
        match self {
            ParseError::Invalid(errors) => errors,
            _ => &[],
        }
    }
}

struct ErrorList<'a>(&'a Vec<ConfigError>);

impl fmt::Display for ErrorList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.iter().join("\n"))
    }
}
