//! Platform abstraction for hosts file access.

#[cfg(unix)]
pub mod unix;

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::debug;

use crate::config::Config;
use crate::error::{HostsError, WriteFailure};

/// Environment override for the hosts file. Selects [`LocalHostsFile`] (no escalation).
pub const HOSTS_FILE_ENV: &str = "HOSTEDIT_HOSTS_FILE";

/// Privilege requested for a single write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    /// Superuser/administrator is required; escalate if the process lacks it.
    Require,
    Unprivileged,
}

/// Transform applied to the live content during a read-modify-write.
pub type Transform<'a> = dyn FnMut(&str) -> Result<String, HostsError> + 'a;

/// Trait for hosts file access.
pub trait HostsFile: Send + Sync {
    /// Path of the underlying file.
    fn path(&self) -> &Path;
    /// Read the current content.
    fn read(&self) -> Result<String, HostsError>;
    /// Fetch current content, apply `transform`, persist the result.
    fn modify(&self, privilege: Privilege, transform: &mut Transform<'_>) -> Result<(), HostsError>;
}

/// Path of the system hosts file.
pub fn system_hosts_path() -> PathBuf {
    system_hosts_path_impl()
}

#[cfg(unix)]
fn system_hosts_path_impl() -> PathBuf {
    PathBuf::from("/etc/hosts")
}

#[cfg(windows)]
fn system_hosts_path_impl() -> PathBuf {
    match std::env::var_os("SystemRoot") {
        Some(root) => PathBuf::from(root).join(r"System32\drivers\etc\hosts"),
        None => PathBuf::from(r"C:\Windows\System32\drivers\etc\hosts"),
    }
}

/// Get the hosts file implementation for this config.
/// If HOSTEDIT_HOSTS_FILE is set (e.g. in tests), uses LocalHostsFile with that path.
pub fn default_hosts_file(config: &Config) -> Box<dyn HostsFile> {
    if let Some(path) = std::env::var_os(HOSTS_FILE_ENV) {
        return Box::new(LocalHostsFile::new(path));
    }
    let path = config.hosts_file.clone().unwrap_or_else(system_hosts_path);

    #[cfg(unix)]
    return Box::new(unix::ElevatedHostsFile::new(path, &config.elevate_with));

    #[cfg(windows)]
    return Box::new(LocalHostsFile::new(path));
}

/// HostsFile that reads and writes the file directly, under advisory locks.
///
/// Writes replace the file atomically (temp file in the same directory, then
/// rename), so a failed write never leaves it truncated.
///
/// Never escalates: with [`Privilege::Require`] the process must already be
/// privileged.
#[derive(Debug, Clone)]
pub struct LocalHostsFile {
    path: PathBuf,
}

impl LocalHostsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn write_error(&self, privilege: Privilege, err: io::Error) -> HostsError {
        let failure = match (err.kind(), privilege) {
            (io::ErrorKind::PermissionDenied, Privilege::Require) => WriteFailure::PrivilegeDenied(
                format!("{err}; run with superuser or administrator rights"),
            ),
            (io::ErrorKind::PermissionDenied, Privilege::Unprivileged) => {
                WriteFailure::PermissionDenied(err)
            }
            _ => WriteFailure::Io(err),
        };
        HostsError::write(&self.path, failure)
    }
}

impl HostsFile for LocalHostsFile {
    fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<String, HostsError> {
        let mut file = File::open(&self.path).map_err(|e| HostsError::read(&self.path, e))?;
        FileExt::lock_shared(&file).map_err(|e| HostsError::read(&self.path, e))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| HostsError::read(&self.path, e))?;
        Ok(content)
    }

    fn modify(&self, privilege: Privilege, transform: &mut Transform<'_>) -> Result<(), HostsError> {
        let mut file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.path)
            .map_err(|e| self.write_error(privilege, e))?;
        FileExt::lock_exclusive(&file).map_err(|e| self.write_error(privilege, e))?;

        let mut current = String::new();
        file.read_to_string(&mut current)
            .map_err(|e| HostsError::read(&self.path, e))?;

        let updated = transform(&current)?;
        if updated == current {
            debug!(path = %self.path.display(), "content unchanged, skipping write");
            return Ok(());
        }

        // Staged beside the target, then renamed over it. `file` keeps the lock until return.
        let target = fs::canonicalize(&self.path).map_err(|e| self.write_error(privilege, e))?;
        let dir = target.parent().unwrap_or_else(|| Path::new("."));
        let permissions = file
            .metadata()
            .map_err(|e| self.write_error(privilege, e))?
            .permissions();
        let mut staged =
            tempfile::NamedTempFile::new_in(dir).map_err(|e| self.write_error(privilege, e))?;
        staged
            .write_all(updated.as_bytes())
            .and_then(|_| staged.as_file().sync_all())
            .and_then(|_| fs::set_permissions(staged.path(), permissions))
            .map_err(|e| self.write_error(privilege, e))?;
        #[cfg(windows)]
        drop(file);
        staged
            .persist(&target)
            .map_err(|e| self.write_error(privilege, e.error))?;
        debug!(path = %self.path.display(), bytes = updated.len(), "wrote hosts file");
        Ok(())
    }
}
