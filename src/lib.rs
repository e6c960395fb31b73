pub mod cli;
pub mod config;
pub mod error;
pub mod fst;
pub mod platform;
pub mod settings;
pub mod subopts;

pub use cli::{Cli, FstArgs, LogLevel};
pub use config::{Config, ConfigBuilder};
pub use error::{ConfigError, ParseError};
pub use platform::{Environment, Platform, PlatformDetector};

use anyhow::Result;
use clap::{
    error::{ContextKind, ContextValue, ErrorKind},
    CommandFactory, Parser,
};
use log::info;
use std::{ffi::OsString, io::Write};

/// What a successful parse produced
#[derive(Debug)]
pub enum Parsed<T> {
    Help(String),
    Version(String),
    Config(Box<T>),
}

// --------------------------------------------------
/// Turn command-line tokens (program name first) into a resolved `Config`.
///
/// A help flag anywhere wins over everything else. Otherwise the tokens are
/// split into raw flag values, every value is typed and checked, and the
/// cross-field defaults are filled in. Progress lines go to `out`.
pub fn parse_args<I, T>(
    tokens: I,
    env: &Environment,
    out: &mut impl Write,
) -> Result<Parsed<Config>, ParseError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let tokens: Vec<OsString> = tokens.into_iter().map(Into::into).collect();
    if wants_help::<Cli>(&tokens) {
        return Ok(Parsed::Help(Cli::usage()));
    }

    let cli = match tokenize::<Cli>(tokens)? {
        Some(cli) if cli.help => return Ok(Parsed::Help(Cli::usage())),
        Some(cli) => cli,
        _ => return Ok(Parsed::Version(Cli::command().render_version())),
    };
    if let Some(level) = cli.log {
        init_logging(level);
    }

    let config = ConfigBuilder::from_cli(&cli).resolve(env, out)?;
    Ok(Parsed::Config(Box::new(config)))
}

// --------------------------------------------------
/// Hand a resolved configuration on to the run
pub fn run(config: &Config) -> Result<()> {
    info!("config = {config:#?}");

    let bait = config.bait();
    println!(
        r#"Designing {}bp baits ({}) from "{}", output to "{}""#,
        bait.length,
        bait.selection,
        config.input().source.path().display(),
        config
            .output()
            .workdir
            .join(&config.output().prefix)
            .display(),
    );

    Ok(())
}

// --------------------------------------------------
pub fn init_logging(level: LogLevel) {
    // A logger may already be installed, e.g. by an earlier parse
    let _ = env_logger::Builder::new()
        .filter_level(match level {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
        })
        .try_init();
}

// --------------------------------------------------
/// First pass: look for a help flag before anything can fail.
///
/// Tokens are walked as getopt would: `h` anywhere in a short cluster or
/// `--help` asks for help, but the token after a flag that takes a value
/// is that value, so `-o -h` names an output.
pub(crate) fn wants_help<C: CommandFactory>(tokens: &[OsString]) -> bool {
    let mut cmd = C::command();
    cmd.build();
    let takes_value = |short: Option<char>, long: Option<&str>| {
        cmd.get_arguments().any(|arg| {
            arg.get_action().takes_values()
                && (short.is_some() && arg.get_short() == short
                    || long.is_some() && arg.get_long() == long)
        })
    };

    let mut tokens = tokens.iter().skip(1);
    while let Some(token) = tokens.next() {
        let Some(token) = token.to_str() else {
            continue;
        };
        if token == "--" {
            break;
        }

        let value_follows = if let Some(long) = token.strip_prefix("--") {
            if long == "help" {
                return true;
            }
            !long.contains('=') && takes_value(None, Some(long))
        } else if let Some(cluster) = token.strip_prefix('-') {
            let mut value_follows = false;
            for (pos, short) in cluster.char_indices() {
                if short == 'h' {
                    return true;
                }
                if takes_value(Some(short), None) {
                    // The rest of the cluster, if any, is the value
                    value_follows = pos + short.len_utf8() == cluster.len();
                    break;
                }
            }
            value_follows
        } else {
            false
        };

        if value_follows {
            tokens.next();
        }
    }
    false
}

// --------------------------------------------------
/// Split tokens into raw flag values; `None` means a version request
pub(crate) fn tokenize<P: Parser>(
    tokens: Vec<OsString>,
) -> Result<Option<P>, ParseError> {
    match P::try_parse_from(tokens) {
        Ok(args) => Ok(Some(args)),
        Err(e) => match e.kind() {
            ErrorKind::DisplayVersion => Ok(None),
            ErrorKind::UnknownArgument => {
                let token = match e.get(ContextKind::InvalidArg) {
                    Some(ContextValue::String(token)) => token.to_string(),
                    _ => e.to_string(),
                };
                Err(ParseError::UnhandledOption(token))
            }
            _ => Err(ParseError::Syntax(e.to_string())),
        },
    }
}
