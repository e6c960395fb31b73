use anyhow::Result;
use std::{
    env, fmt,
    path::{Path, PathBuf},
};

/// Host family used to choose between bundled executables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    Macos,
    Unknown,
}

impl Platform {
    /// Classify an OS name such as `std::env::consts::OS` or a
    /// `--hacker platform=<name>` override
    pub fn from_name(name: &str) -> Self {
        let name = name.trim().to_lowercase();
        match name.as_str() {
            "linux" => Platform::Linux,
            "macos" | "mac" | "osx" => Platform::Macos,
            _ if name.starts_with("darwin") => Platform::Macos,
            _ => Platform::Unknown,
        }
    }

    /// Suffix of the bundled executables; unknown hosts get the Linux builds
    pub fn bundle_tag(&self) -> &'static str {
        match self {
            Platform::Linux | Platform::Unknown => "linux",
            Platform::Macos => "macos",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Platform::Linux => "linux",
            Platform::Macos => "macos",
            Platform::Unknown => "unknown",
        };
        write!(f, "{name}")
    }
}

// --------------------------------------------------
pub trait PlatformDetector {
    fn detect(&self) -> Platform;
}

/// Reports the platform this binary was built for
#[derive(Debug, Default)]
pub struct HostPlatform;

impl PlatformDetector for HostPlatform {
    fn detect(&self) -> Platform {
        Platform::from_name(env::consts::OS)
    }
}

/// A fixed platform, e.g. to resolve paths for another host
impl PlatformDetector for Platform {
    fn detect(&self) -> Platform {
        *self
    }
}

// --------------------------------------------------
/// External programs that ship alongside mrbait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Vsearch,
    Blastn,
    Makeblastdb,
}

impl Tool {
    pub fn binary(&self) -> &'static str {
        match self {
            Tool::Vsearch => "vsearch",
            Tool::Blastn => "blastn",
            Tool::Makeblastdb => "makeblastdb",
        }
    }

    /// Location of the bundled build of this tool for `platform`
    pub fn bundled_path(&self, bundle_dir: &Path, platform: Platform) -> PathBuf {
        bundle_dir.join(format!("{}_{}", self.binary(), platform.bundle_tag()))
    }
}

// --------------------------------------------------
/// What the resolver is allowed to know about the host
pub struct Environment {
    /// Default output directory
    pub cwd: PathBuf,
    /// Where the bundled tool builds live
    pub bundle_dir: PathBuf,
    pub detector: Box<dyn PlatformDetector>,
}

impl Environment {
    pub fn new(
        cwd: impl Into<PathBuf>,
        bundle_dir: impl Into<PathBuf>,
        detector: impl PlatformDetector + 'static,
    ) -> Self {
        Environment {
            cwd: cwd.into(),
            bundle_dir: bundle_dir.into(),
            detector: Box::new(detector),
        }
    }

    /// The real host: current directory, `bin/` beside the executable
    pub fn from_host() -> Result<Self> {
        let bundle_dir = env::current_exe()?
            .parent()
            .map(|dir| dir.join("bin"))
            .unwrap_or_else(|| PathBuf::from("bin"));
        Ok(Environment::new(env::current_dir()?, bundle_dir, HostPlatform))
    }
}
