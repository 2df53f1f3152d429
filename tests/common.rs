//! Shared test helpers.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Create a temp directory for use as HOSTEDIT_HOME or for scratch hosts files.
/// Uses current dir (workspace) so sandbox allows full access.
pub fn temp_home() -> TempDir {
    tempfile::Builder::new()
        .prefix("hostedit_test_")
        .tempdir_in(std::env::current_dir().unwrap_or_else(|_| Path::new(".").into()))
        .expect("temp dir")
}

/// Write `content` to `<dir>/hosts` and return its path.
pub fn write_hosts(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("hosts");
    fs::write(&path, content).unwrap();
    path
}

/// Run a closure with HOSTEDIT_HOME set to the given path.
pub fn with_test_env<F, R>(home: &Path, f: F) -> R
where
    F: FnOnce() -> R,
{
    let prev = std::env::var_os("HOSTEDIT_HOME");
    std::env::set_var("HOSTEDIT_HOME", home);
    let r = f();
    match prev {
        Some(v) => std::env::set_var("HOSTEDIT_HOME", v),
        None => std::env::remove_var("HOSTEDIT_HOME"),
    }
    r
}

#[cfg(unix)]
pub fn is_root() -> bool {
    hostedit::platform::unix::is_root()
}

#[cfg(not(unix))]
pub fn is_root() -> bool {
    false
}
