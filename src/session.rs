//! Editing session: the in-memory entry table between fetches.

use tracing::{debug, warn};

use crate::error::HostsError;
use crate::hosts::{self, HostsEntry, WriteSummary};
use crate::platform::{HostsFile, Privilege};

/// Entry table read from a hosts file, edited row by row, written back whole.
pub struct HostsSession<'a> {
    file: &'a dyn HostsFile,
    privilege: Privilege,
    entries: Vec<HostsEntry>,
    changed: bool,
}

impl<'a> HostsSession<'a> {
    /// Empty session; call [`fetch`](Self::fetch) to load entries.
    pub fn new(file: &'a dyn HostsFile, privilege: Privilege) -> Self {
        Self {
            file,
            privilege,
            entries: Vec::new(),
            changed: false,
        }
    }

    /// Session loaded with the file's current entries.
    pub fn open(file: &'a dyn HostsFile, privilege: Privilege) -> Result<Self, HostsError> {
        let mut session = Self::new(file, privilege);
        session.fetch()?;
        Ok(session)
    }

    /// Replace the table with fresh entries from the file.
    ///
    /// On error the previous table is kept.
    pub fn fetch(&mut self) -> Result<(), HostsError> {
        self.entries = hosts::read_hosts_file(self.file)?;
        self.changed = false;
        Ok(())
    }

    pub fn entries(&self) -> &[HostsEntry] {
        &self.entries
    }

    /// True once a row differs from what was last fetched.
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Replace row `index` (0-based). Returns false if the entry is unchanged.
    pub fn change(&mut self, index: usize, entry: HostsEntry) -> Result<bool, HostsError> {
        let len = self.entries.len();
        let row = self
            .entries
            .get_mut(index)
            .ok_or(HostsError::NoSuchRow {
                row: index + 1,
                len,
            })?;
        if *row == entry {
            return Ok(false);
        }
        debug!(index, from = ?row, to = ?entry, "row changed");
        *row = entry;
        self.changed = true;
        Ok(true)
    }

    /// Write the full table, then re-read it.
    ///
    /// On a failed write the edited table stays in place. If the write lands
    /// but the re-read fails, the error is [`HostsError::Reread`] and the
    /// table holds what was written.
    pub fn persist(&mut self) -> Result<WriteSummary, HostsError> {
        let summary = hosts::write_hosts_file(self.file, self.privilege, &self.entries)?;
        if let Err(e) = self.fetch() {
            warn!(path = %self.file.path().display(), error = %e, "re-read after write failed");
            self.changed = false;
            return Err(HostsError::Reread {
                path: self.file.path().to_path_buf(),
                source: Box::new(e),
            });
        }
        Ok(summary)
    }

    /// Discard edits by re-reading the file.
    pub fn cancel(&mut self) -> Result<(), HostsError> {
        self.fetch()
    }
}
