//! Configuration loading and path resolution.
//!
//! Supports HOSTEDIT_HOME env var override for testing.

use anyhow::{Context, Result};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::platform::Privilege;

/// Elevation command used when none is configured.
pub const DEFAULT_ELEVATE_WITH: &str = "pkexec";

/// Paths for hostedit's own files.
#[derive(Debug, Clone)]
pub struct HosteditPaths {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
}

impl HosteditPaths {
    /// Build paths from base directory (e.g. ProjectDirs config dir or HOSTEDIT_HOME).
    pub fn from_base(base: PathBuf) -> Self {
        let config_file = base.join("config.toml");
        Self {
            config_dir: base,
            config_file,
        }
    }

    /// Paths for testing: use a temp dir as base.
    pub fn for_test(base: impl AsRef<Path>) -> Self {
        Self::from_base(base.as_ref().to_path_buf())
    }

    /// Get default paths (respects HOSTEDIT_HOME).
    pub fn default_paths() -> Self {
        let base = if let Some(home) = std::env::var_os("HOSTEDIT_HOME") {
            PathBuf::from(home)
        } else if let Some(dirs) = directories::ProjectDirs::from("org", "hostedit", "hostedit") {
            dirs.config_dir().to_path_buf()
        } else {
            PathBuf::from(".hostedit")
        };
        Self::from_base(base)
    }
}

/// Main config.toml structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Hosts file to edit; the system hosts file when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosts_file: Option<PathBuf>,
    /// Command prefixed to `cp` for privileged writes (e.g. "pkexec", "sudo -n").
    #[serde(default = "default_elevate_with")]
    pub elevate_with: String,
    #[serde(default = "default_require_privilege")]
    pub require_privilege: bool,
}

fn default_elevate_with() -> String {
    DEFAULT_ELEVATE_WITH.to_string()
}

fn default_require_privilege() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hosts_file: None,
            elevate_with: default_elevate_with(),
            require_privilege: default_require_privilege(),
        }
    }
}

/// Path to config.toml (respects HOSTEDIT_HOME).
pub fn config_path() -> PathBuf {
    HosteditPaths::default_paths().config_file
}

impl Config {
    /// Privilege to request for writes.
    pub fn privilege(&self) -> Privilege {
        if self.require_privilege {
            Privilege::Require
        } else {
            Privilege::Unprivileged
        }
    }

    /// Load config from paths (with shared lock when file exists).
    pub fn load(paths: &HosteditPaths) -> Result<Config> {
        if paths.config_file.is_file() {
            let mut file = fs::OpenOptions::new()
                .read(true)
                .open(&paths.config_file)
                .with_context(|| format!("open {}", paths.config_file.display()))?;
            fs2::FileExt::lock_shared(&file)?;
            let mut s = String::new();
            file.read_to_string(&mut s)?;
            let cfg: Config = toml::from_str(&s)
                .with_context(|| format!("parse {}", paths.config_file.display()))?;
            Ok(cfg)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to paths (with exclusive lock). Creates parent dirs if needed.
    pub fn save(&self, paths: &HosteditPaths) -> Result<()> {
        if let Some(p) = paths.config_file.parent() {
            fs::create_dir_all(p)?;
        }
        let mut file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&paths.config_file)
            .with_context(|| format!("open {}", paths.config_file.display()))?;
        fs2::FileExt::lock_exclusive(&file)?;
        let s = toml::to_string_pretty(self)?;
        file.write_all(s.as_bytes())?;
        Ok(())
    }
}
