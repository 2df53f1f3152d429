//! Unix (macOS, Linux) hosts file access with privilege escalation.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, warn};

use super::{HostsFile, LocalHostsFile, Privilege, Transform};
use crate::error::{HostsError, WriteFailure};

/// True when running with effective uid 0.
pub fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

/// HostsFile that installs privileged writes through an elevation command.
///
/// The new content is staged in a temp file and copied over the target with
/// `<elevate_with> cp <staged> <path>`. When already root, or when no
/// privilege is required, writes go through [`LocalHostsFile`].
pub struct ElevatedHostsFile {
    local: LocalHostsFile,
    elevate_with: String,
}

impl ElevatedHostsFile {
    pub fn new(path: impl Into<PathBuf>, elevate_with: &str) -> Self {
        Self {
            local: LocalHostsFile::new(path),
            elevate_with: elevate_with.to_string(),
        }
    }

    fn denied(&self, message: String) -> HostsError {
        warn!(command = %self.elevate_with, "{message}");
        HostsError::write(self.path(), WriteFailure::PrivilegeDenied(message))
    }

    /// Copy `staged` over the target, unless the target no longer holds `expected`.
    fn install(&self, staged: &Path, expected: &str) -> Result<(), HostsError> {
        let live = self.local.read()?;
        if live != expected {
            warn!(path = %self.path().display(), "hosts file changed during edit");
            return Err(HostsError::write(self.path(), WriteFailure::Conflict));
        }

        let mut parts = self.elevate_with.split_whitespace();
        let program = match parts.next() {
            Some(p) => p,
            None => return Err(self.denied("no elevation command configured".to_string())),
        };
        let status = Command::new(program)
            .args(parts)
            .arg("cp")
            .arg(staged)
            .arg(self.path())
            .status()
            .map_err(|e| self.denied(format!("could not run {program}: {e}")))?;
        if !status.success() {
            return Err(self.denied(format!("{program} cp exited with {status}")));
        }
        Ok(())
    }
}

impl HostsFile for ElevatedHostsFile {
    fn path(&self) -> &Path {
        self.local.path()
    }

    fn read(&self) -> Result<String, HostsError> {
        self.local.read()
    }

    fn modify(&self, privilege: Privilege, transform: &mut Transform<'_>) -> Result<(), HostsError> {
        if privilege == Privilege::Unprivileged || is_root() {
            return self.local.modify(privilege, transform);
        }

        let current = self.local.read()?;
        let updated = transform(&current)?;
        if updated == current {
            debug!(path = %self.path().display(), "content unchanged, skipping write");
            return Ok(());
        }

        // Random name, created exclusively; removed when `staged` drops.
        let mut staged = tempfile::NamedTempFile::new()
            .map_err(|e| HostsError::write(self.path(), WriteFailure::Io(e)))?;
        staged
            .write_all(updated.as_bytes())
            .and_then(|_| staged.as_file().sync_all())
            .map_err(|e| HostsError::write(self.path(), WriteFailure::Io(e)))?;
        self.install(staged.path(), &current)
    }
}
