//! Menu of the Fst/missing-data filter for RAD loci and SNPs.
//!
//! Only the inputs are resolved here; Fst estimation itself is on hold.

use crate::{
    cli::{clean_path, FstArgs, LogLevel},
    error::{ConfigError, ParseError},
    init_logging, tokenize, wants_help, Parsed,
};
use clap::CommandFactory;
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, PartialEq)]
pub enum FstInput {
    /// Full alignments in pyRAD .loci format
    Loci(PathBuf),
    /// SNP-only alignment in PHYLIP format
    Snps(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FstConfig {
    input: FstInput,
    popmap: PathBuf,
    log: Option<LogLevel>,
}

impl FstConfig {
    pub fn from_args(args: &FstArgs) -> Result<Self, ParseError> {
        let mut errors = vec![];

        let input = match (clean_path(&args.loci), clean_path(&args.snps)) {
            (Some(loci), None) => Some(FstInput::Loci(loci)),
            (None, Some(snps)) => Some(FstInput::Snps(snps)),
            (None, None) => {
                errors.push(ConfigError::NoInput);
                None
            }
            _ => {
                errors.push(ConfigError::MultipleInputs(vec!["--loci", "--snps"]));
                None
            }
        };

        let popmap = clean_path(&args.popmap);
        if popmap.is_none() {
            errors.push(ConfigError::NoPopmap);
        }

        match (input, popmap) {
            (Some(input), Some(popmap)) => Ok(FstConfig {
                input,
                popmap,
                log: args.log,
            }),
            _ => Err(ParseError::Invalid(errors)),
        }
    }

    pub fn input(&self) -> &FstInput {
        &self.input
    }

    pub fn popmap(&self) -> &Path {
        &self.popmap
    }

    pub fn log(&self) -> Option<LogLevel> {
        self.log
    }
}

// --------------------------------------------------
/// Same two passes as `parse_args`: help first, then the menu
pub fn parse_fst_args<I, T>(tokens: I) -> Result<Parsed<FstConfig>, ParseError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let tokens: Vec<OsString> = tokens.into_iter().map(Into::into).collect();
    if wants_help::<FstArgs>(&tokens) {
        return Ok(Parsed::Help(FstArgs::usage()));
    }

    let args = match tokenize::<FstArgs>(tokens)? {
        Some(args) if args.help => return Ok(Parsed::Help(FstArgs::usage())),
        Some(args) => args,
        _ => return Ok(Parsed::Version(FstArgs::command().render_version())),
    };
    if let Some(level) = args.log {
        init_logging(level);
    }

    Ok(Parsed::Config(Box::new(FstConfig::from_args(&args)?)))
}
