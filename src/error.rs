//! Error types for reading and rewriting hosts files.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A data line that is not `<ip> <hostname>...` once its comment is stripped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected `<ip> <hostname>...`, got {line:?}")]
pub struct ParseError {
    /// The offending line as it appeared in the file.
    pub line: String,
}

/// Why persisting new hosts content failed.
#[derive(Debug, Error)]
pub enum WriteFailure {
    /// The OS refused the write and no escalation was requested.
    #[error("permission denied")]
    PermissionDenied(#[source] io::Error),

    /// Elevated privilege was required but could not be acquired.
    #[error("privilege escalation denied: {0}")]
    PrivilegeDenied(String),

    /// The file changed between reading it and installing the new content.
    #[error("file was modified concurrently")]
    Conflict,

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Errors surfaced by hosts file operations.
#[derive(Debug, Error)]
pub enum HostsError {
    #[error("malformed line {line_number}")]
    Parse {
        line_number: usize,
        #[source]
        source: ParseError,
    },

    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: WriteFailure,
    },

    /// The write went through; only the follow-up read failed.
    #[error("wrote {} but could not re-read it", path.display())]
    Reread {
        path: PathBuf,
        #[source]
        source: Box<HostsError>,
    },

    /// `row` is 1-based, as shown to users.
    #[error("no row {row} (table has {len} rows)")]
    NoSuchRow { row: usize, len: usize },
}

impl HostsError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        HostsError::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: WriteFailure) -> Self {
        HostsError::Write {
            path: path.into(),
            source,
        }
    }

    /// True for malformed-line errors.
    pub fn is_parse(&self) -> bool {
        matches!(self, HostsError::Parse { .. })
    }
}
