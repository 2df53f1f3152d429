//! HostsSession: fetch, change, persist, cancel.

mod common;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use hostedit::error::HostsError;
use hostedit::hosts::HostsEntry;
use hostedit::platform::{HostsFile, LocalHostsFile, Privilege, Transform};
use hostedit::session::HostsSession;

#[test]
fn open_loads_entries_unchanged() {
    let dir = common::temp_home();
    let path = common::write_hosts(dir.path(), "127.0.0.1 localhost\n10.0.0.1 foo bar\n");
    let file = LocalHostsFile::new(&path);

    let session = HostsSession::open(&file, Privilege::Unprivileged).unwrap();
    assert_eq!(session.entries().len(), 3);
    assert!(!session.is_changed());
}

#[test]
fn change_then_persist_rereads_file() {
    let dir = common::temp_home();
    let path = common::write_hosts(dir.path(), "10.0.0.1 foo\n# comment\n\n10.0.0.2 bar\n");
    let file = LocalHostsFile::new(&path);
    let mut session = HostsSession::open(&file, Privilege::Unprivileged).unwrap();

    assert!(session.change(0, HostsEntry::new("10.0.0.1", "baz")).unwrap());
    assert!(session.is_changed());

    session.persist().unwrap();
    assert!(!session.is_changed());
    assert_eq!(session.entries()[0], HostsEntry::new("10.0.0.1", "baz"));
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "10.0.0.1 baz\n# comment\n\n10.0.0.2 bar\n"
    );
}

#[test]
fn identical_change_is_ignored() {
    let dir = common::temp_home();
    let path = common::write_hosts(dir.path(), "10.0.0.1 foo\n");
    let file = LocalHostsFile::new(&path);
    let mut session = HostsSession::open(&file, Privilege::Unprivileged).unwrap();

    assert!(!session.change(0, HostsEntry::new("10.0.0.1", "foo")).unwrap());
    assert!(!session.is_changed());
}

#[test]
fn change_out_of_range_fails() {
    let dir = common::temp_home();
    let path = common::write_hosts(dir.path(), "10.0.0.1 foo\n");
    let file = LocalHostsFile::new(&path);
    let mut session = HostsSession::open(&file, Privilege::Unprivileged).unwrap();

    let err = session.change(1, HostsEntry::new("10.0.0.1", "x")).unwrap_err();
    assert!(matches!(err, HostsError::NoSuchRow { row: 2, len: 1 }));
}

#[test]
fn cancel_discards_edits() {
    let dir = common::temp_home();
    let path = common::write_hosts(dir.path(), "10.0.0.1 foo\n");
    let file = LocalHostsFile::new(&path);
    let mut session = HostsSession::open(&file, Privilege::Unprivileged).unwrap();

    session.change(0, HostsEntry::new("10.0.0.1", "edited")).unwrap();
    session.cancel().unwrap();

    assert!(!session.is_changed());
    assert_eq!(session.entries(), [HostsEntry::new("10.0.0.1", "foo")]);
    assert_eq!(fs::read_to_string(&path).unwrap(), "10.0.0.1 foo\n");
}

#[test]
fn rekeyed_row_disappears_after_persist() {
    // The edited IP has no line, so nothing is written for it; the old IP's
    // line stays as it was and the re-read shows the original row again.
    let dir = common::temp_home();
    let path = common::write_hosts(dir.path(), "10.0.0.1 foo\n");
    let file = LocalHostsFile::new(&path);
    let mut session = HostsSession::open(&file, Privilege::Unprivileged).unwrap();

    session.change(0, HostsEntry::new("10.0.0.9", "foo")).unwrap();
    let summary = session.persist().unwrap();

    assert_eq!(summary.unmatched, ["10.0.0.9"]);
    assert_eq!(session.entries(), [HostsEntry::new("10.0.0.1", "foo")]);
    assert_eq!(fs::read_to_string(&path).unwrap(), "10.0.0.1 foo\n");
}

#[test]
fn failed_persist_keeps_edits() {
    let dir = common::temp_home();
    let path = common::write_hosts(dir.path(), "10.0.0.1 foo\n");
    let file = LocalHostsFile::new(&path);
    let mut session = HostsSession::open(&file, Privilege::Unprivileged).unwrap();

    session.change(0, HostsEntry::new("10.0.0.1", "bar")).unwrap();
    fs::remove_file(&path).unwrap();

    assert!(session.persist().is_err());
    assert!(session.is_changed());
    assert_eq!(session.entries(), [HostsEntry::new("10.0.0.1", "bar")]);
}

#[test]
fn failed_fetch_keeps_previous_table() {
    let dir = common::temp_home();
    let path = common::write_hosts(dir.path(), "10.0.0.1 foo\n");
    let file = LocalHostsFile::new(&path);
    let mut session = HostsSession::open(&file, Privilege::Unprivileged).unwrap();

    fs::write(&path, "10.0.0.1\n").unwrap();
    let err = session.fetch().unwrap_err();

    assert!(err.is_parse());
    assert_eq!(session.entries(), [HostsEntry::new("10.0.0.1", "foo")]);
}

/// Accepts one write, then refuses every read.
struct UnreadableAfterWrite {
    path: PathBuf,
    content: Mutex<String>,
    written: Mutex<bool>,
}

impl HostsFile for UnreadableAfterWrite {
    fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<String, HostsError> {
        if *self.written.lock().unwrap() {
            return Err(HostsError::Read {
                path: self.path.clone(),
                source: io::Error::other("gone"),
            });
        }
        Ok(self.content.lock().unwrap().clone())
    }

    fn modify(&self, _: Privilege, transform: &mut Transform<'_>) -> Result<(), HostsError> {
        let mut content = self.content.lock().unwrap();
        *content = transform(content.as_str())?;
        *self.written.lock().unwrap() = true;
        Ok(())
    }
}

#[test]
fn reread_failure_after_write_is_distinct() {
    let file = UnreadableAfterWrite {
        path: PathBuf::from("/mock/hosts"),
        content: Mutex::new("10.0.0.1 foo\n".to_string()),
        written: Mutex::new(false),
    };
    let mut session = HostsSession::open(&file, Privilege::Unprivileged).unwrap();
    session.change(0, HostsEntry::new("10.0.0.1", "bar")).unwrap();

    let err = session.persist().unwrap_err();

    assert!(matches!(&err, HostsError::Reread { source, .. } if matches!(**source, HostsError::Read { .. })));
    assert_eq!(*file.content.lock().unwrap(), "10.0.0.1 bar\n");
    assert!(!session.is_changed());
    assert_eq!(session.entries(), [HostsEntry::new("10.0.0.1", "bar")]);
}
