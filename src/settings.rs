use crate::error::ConfigError;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Site-wide defaults read from `--config <FILE>`; anything given on the
/// command line wins over these.
///
/// ```toml
/// [tools]
/// vsearch = "/usr/local/bin/vsearch"
/// bundle_dir = "/opt/mrbait/bin"
///
/// [search]
/// method = "megablast"
/// evalue = 1e-10
/// ```
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub tools: ToolSettings,

    #[serde(default)]
    pub search: SearchSettings,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ToolSettings {
    pub vsearch: Option<PathBuf>,
    pub blastn: Option<PathBuf>,
    pub makeblastdb: Option<PathBuf>,
    pub bundle_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SearchSettings {
    pub method: Option<String>,
    pub evalue: Option<f64>,
    pub gap_open: Option<usize>,
    pub gap_extend: Option<usize>,
    pub word_size: Option<usize>,
}

impl Settings {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let failed = |reason: String| ConfigError::Settings {
            path: path.display().to_string(),
            reason,
        };
        let contents = fs::read_to_string(path).map_err(|e| failed(e.to_string()))?;
        toml::from_str(&contents).map_err(|e| failed(e.message().to_string()))
    }
}
