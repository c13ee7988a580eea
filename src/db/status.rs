// {{{ Copyright (c) Paul R. Tagliamonte <paultag@debian.org>, 2024
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
// THE SOFTWARE. }}}

// The status snapshot and its crash journal.
//
// Reads never trust `status-new`: the snapshot precedence is `status`,
// then `status-old`, then the empty database, and the journal is
// replayed on top in ascending numeric order. Under that rule every
// crash point of the commit sequence below recovers to either the
// pre-commit or the post-commit state.

use super::pkg::{PkgId, View};
use super::Database;
use crate::cleanup::OnError;
use crate::control::{dump_records, parse_file, ParseTarget, PkgRecord};
use crate::dirs::{AVAILABLE_FILE, LOCK_FILE, STATUS_FILE};
use crate::errors::{Context, Error, ErrorKind, Result};
use nix::errno::Errno;
use nix::fcntl::{Flock, FlockArg};
use std::fs::OpenOptions;
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

/// Journal entries between full rewrites of the status file.
pub const MAX_UPDATES: u32 = 250;

// The journal file name space is 0000..9999.
const MAX_UPDATE_SEQ: u32 = 9999;

fn read_optional(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(Error::io(
            format!("unable to read '{}'", path.display()),
            err,
        )),
    }
}

fn remove_optional(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(Error::io(
            format!("unable to remove '{}'", path.display()),
            err,
        )),
    }
}

impl Database {
    pub(crate) fn lock_database(&mut self, nonblock: bool) -> Result<()> {
        let path = self.dirs.db_path(LOCK_FILE);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .mode(0o600)
            .open(&path)
            .context_with(|| format!("unable to open/create lock file '{}'", path.display()))?;

        let arg = if nonblock {
            FlockArg::LockExclusiveNonblock
        } else {
            FlockArg::LockExclusive
        };
        match Flock::lock(file, arg) {
            Ok(lock) => {
                self.lock = Some(lock);
                Ok(())
            }
            Err((_, errno))
                if nonblock && matches!(errno, Errno::EAGAIN | Errno::EACCES) =>
            {
                Err(Error::new(
                    ErrorKind::LockBusy,
                    "status database area is locked by another process",
                ))
            }
            Err((_, errno)) => Err(Error::new(
                ErrorKind::Io,
                format!("unable to lock status database: {}", errno),
            )),
        }
    }

    /// Release the main database lock, if held. Also happens
    /// implicitly when the handle is dropped.
    pub fn unlock(&mut self) {
        self.lock = None;
    }

    fn install_status_file(&mut self, path: &Path, contents: &str) -> Result<()> {
        let filename = path.display().to_string();
        for paragraph in parse_file(&filename, contents)? {
            let record = PkgRecord::from_paragraph(&filename, &paragraph, ParseTarget::Status)?;
            self.install_record(&record, View::Installed)
                .context_with(|| format!("merging record for package {}", record.name))?;
        }
        Ok(())
    }

    /// Load the committed snapshot and replay the journal. The
    /// snapshot is `status` when present, `status-old` when a crash
    /// interrupted a commit between its renames, and empty otherwise;
    /// `status-new` is never trusted.
    pub(crate) fn load_status(&mut self) -> Result<()> {
        let status = self.dirs.db_path(STATUS_FILE);
        let status_old = self.dirs.db_path(&format!("{}-old", STATUS_FILE));

        if let Some(contents) = read_optional(&status)? {
            self.install_status_file(&status, &contents)?;
        } else if let Some(contents) = read_optional(&status_old)? {
            tracing::debug!(target: "debdb::status", "status missing, recovering from status-old");
            self.install_status_file(&status_old, &contents)?;
        }

        self.load_journal()
    }

    fn journal_entries(&self) -> Result<Vec<(u32, PathBuf)>> {
        let dir = self.dirs.updates_dir();
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(err) => {
                return Err(Error::io(
                    format!("unable to read updates directory '{}'", dir.display()),
                    err,
                ))
            }
        };

        let mut found = vec![];
        for entry in entries {
            let entry = entry
                .context_with(|| format!("unable to read updates directory '{}'", dir.display()))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                return Err(Error::new(
                    ErrorKind::CorruptDatabase,
                    format!("non-text file name in updates directory '{}'", dir.display()),
                ));
            };
            if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
                return Err(Error::new(
                    ErrorKind::CorruptDatabase,
                    format!(
                        "file '{}' in updates directory is not a journal entry",
                        name
                    ),
                ));
            }
            let seq: u32 = name.parse().map_err(|_| {
                Error::new(
                    ErrorKind::CorruptDatabase,
                    format!("journal entry '{}' is out of range", name),
                )
            })?;
            found.push((seq, entry.path()));
        }

        // Ascending numeric order of the integer suffix, regardless of
        // directory order.
        found.sort();
        Ok(found)
    }

    fn load_journal(&mut self) -> Result<()> {
        let entries = self.journal_entries()?;
        self.journal_len = entries.len() as u32;
        self.next_update = entries.last().map_or(0, |(seq, _)| seq + 1);

        for (_, path) in entries {
            let contents = std::fs::read_to_string(&path)
                .context_with(|| format!("unable to read journal entry '{}'", path.display()))?;
            self.install_status_file(&path, &contents)
                .context_with(|| format!("applying journal entry '{}'", path.display()))?;
        }
        Ok(())
    }

    fn assert_writable(&self) {
        if !self.access.writable() {
            crate::errors::internerr!("attempt to modify a read-only status database");
        }
    }

    // A record is worth writing when it carries any information
    // beyond "never heard of it".
    fn record_is_informative(record: &PkgRecord) -> bool {
        record.status != super::pkg::PkgStatus::NotInstalled
            || record.selection != super::pkg::PkgSelection::Unknown
            || record.eflag != super::pkg::PkgEflag::Ok
            || record.version.is_some()
            || !record.depends.is_empty()
            || !record.conffiles.is_empty()
            || !record.arbitrary.is_empty()
    }

    fn status_records(&self) -> Vec<PkgRecord> {
        let mut records: Vec<PkgRecord> = self
            .pkgs()
            .map(|(id, _)| self.export_record(id, View::Installed))
            .filter(Self::record_is_informative)
            .collect();
        records.sort_by(|a, b| (&a.name, &a.arch).cmp(&(&b.name, &b.arch)));
        records
    }

    /// Append the current state of one package to the journal: the
    /// cheap, crash-safe write. Every [MAX_UPDATES] entries (or when
    /// the journal name space runs out) this rolls over into a full
    /// [Database::commit].
    pub fn note(&mut self, pkg: PkgId) -> Result<()> {
        self.assert_writable();

        if self.next_update > MAX_UPDATE_SEQ {
            return self.commit();
        }

        let dir = self.dirs.updates_dir();
        let path = dir.join(format!("{:04}", self.next_update));
        let record = self.export_record(pkg, View::Installed);
        let out = crate::control::dump_record(&record, true);

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o644)
            .open(&path)
            .context_with(|| format!("unable to create journal entry '{}'", path.display()))?;
        let guard = OnError::new(|| {
            let _ = std::fs::remove_file(&path);
        });
        file.write_all(out.as_bytes())
            .context_with(|| format!("unable to write journal entry '{}'", path.display()))?;
        file.sync_all()
            .context_with(|| format!("unable to sync journal entry '{}'", path.display()))?;
        crate::atomic::sync_dir(&dir)?;
        guard.defuse();

        self.next_update += 1;
        self.journal_len += 1;

        if self.journal_len >= MAX_UPDATES {
            return self.commit();
        }
        Ok(())
    }

    /// Rewrite the status snapshot from the merged in-memory state:
    /// the commit point. On return the journal directory is empty and
    /// `status` holds everything. Any crash in between recovers to
    /// the pre- or post-commit state on the next load.
    pub fn commit(&mut self) -> Result<()> {
        self.assert_writable();

        let status = self.dirs.db_path(STATUS_FILE);
        let status_new = self.dirs.db_path(&format!("{}-new", STATUS_FILE));
        let status_old = self.dirs.db_path(&format!("{}-old", STATUS_FILE));
        let admindir = self.dirs.admindir().to_owned();

        let out = dump_records(self.status_records().iter(), true);

        // Write and sync the new snapshot first; everything before the
        // renames below may fail without any visible effect.
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o644)
                .open(&status_new)
                .context_with(|| {
                    format!("unable to create status file '{}'", status_new.display())
                })?;
            let guard = OnError::new(|| {
                let _ = std::fs::remove_file(&status_new);
            });
            file.write_all(out.as_bytes())
                .context_with(|| format!("unable to write '{}'", status_new.display()))?;
            file.sync_all()
                .context_with(|| format!("unable to sync '{}'", status_new.display()))?;
            crate::atomic::sync_dir(&admindir)?;
            guard.defuse();
        }

        match std::fs::rename(&status, &status_old) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                return Err(Error::io(
                    format!("unable to back up '{}'", status.display()),
                    err,
                ))
            }
        }
        std::fs::rename(&status_new, &status)
            .context_with(|| format!("unable to install '{}'", status.display()))?;
        crate::atomic::sync_dir(&admindir)?;

        let updates_dir = self.dirs.updates_dir();
        for (_, path) in self.journal_entries()? {
            remove_optional(&path)?;
        }
        if updates_dir.is_dir() {
            crate::atomic::sync_dir(&updates_dir)?;
        }

        remove_optional(&status_old)?;

        self.next_update = 0;
        self.journal_len = 0;
        tracing::debug!(target: "debdb::status", "status committed");
        Ok(())
    }

    /// Load the `available` snapshot into the available half of the
    /// records. Missing file loads nothing.
    pub fn load_available(&mut self) -> Result<()> {
        let path = self.dirs.db_path(AVAILABLE_FILE);
        let Some(contents) = read_optional(&path)? else {
            return Ok(());
        };
        let filename = path.display().to_string();
        for paragraph in parse_file(&filename, &contents)? {
            let record = PkgRecord::from_paragraph(&filename, &paragraph, ParseTarget::Available)?;
            self.install_record(&record, View::Available)?;
        }
        Ok(())
    }

    /// Rewrite the `available` snapshot from the in-memory available
    /// halves, via the atomic-file primitive.
    pub fn write_available(&mut self) -> Result<()> {
        self.assert_writable();

        let mut records: Vec<PkgRecord> = self
            .pkgs()
            .filter(|(_, pkg)| {
                let bin = pkg.bin(View::Available);
                bin.version.is_some() || bin.description.is_some() || !bin.depends.is_empty()
            })
            .map(|(id, _)| self.export_record(id, View::Available))
            .collect();
        records.sort_by(|a, b| (&a.name, &a.arch).cmp(&(&b.name, &b.arch)));

        let path = self.dirs.db_path(AVAILABLE_FILE);
        let mut file = crate::atomic::AtomicFile::new(&path, Default::default());
        file.open()?;
        file.write_all(dump_records(records.iter(), false).as_bytes())
            .context_with(|| format!("unable to write '{}'", path.display()))?;
        file.sync()?;
        file.close()?;
        file.commit()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::db::{Access, PkgStatus};
    use crate::dirs::Dirs;

    fn seed(dir: &tempfile::TempDir, status: &str) {
        std::fs::write(dir.path().join("status"), status).unwrap();
        std::fs::create_dir_all(dir.path().join("updates")).unwrap();
    }

    fn open(dir: &tempfile::TempDir, access: Access) -> Database {
        let mut db = Database::with_native_arch(Dirs::new(dir.path()), "amd64");
        db.access = access;
        if access.writable() {
            db.lock_database(access == Access::WriteNonBlocking).unwrap();
        }
        db.load_status().unwrap();
        db
    }

    const FOO: &str = "\
Package: foo
Status: install ok installed
Architecture: amd64
Version: 1.2-3
";

    #[test]
    fn load_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        seed(&dir, FOO);
        let mut db = open(&dir, Access::ReadOnly);
        let pkg = db.find_singleton("foo").unwrap();
        assert_eq!(PkgStatus::Installed, db.pkg(pkg).status());
    }

    #[test]
    fn journal_overlays_in_numeric_order() {
        let dir = tempfile::tempdir().unwrap();
        seed(&dir, FOO);
        std::fs::write(
            dir.path().join("updates/0001"),
            "Package: foo\nStatus: install ok half-configured\nArchitecture: amd64\nVersion: 1.2-3\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("updates/0002"),
            "Package: foo\nStatus: install ok installed\nArchitecture: amd64\nVersion: 1.2-3\n",
        )
        .unwrap();

        let mut db = open(&dir, Access::ReadOnly);
        let pkg = db.find_singleton("foo").unwrap();
        assert_eq!(PkgStatus::Installed, db.pkg(pkg).status());
        assert_eq!(1, db.set(db.pkg(pkg).set()).installed_instances());
    }

    #[test]
    fn journal_last_entry_wins() {
        let dir = tempfile::tempdir().unwrap();
        seed(&dir, FOO);
        // Directory order and numeric order disagree; numeric wins.
        std::fs::write(
            dir.path().join("updates/0010"),
            "Package: foo\nStatus: install ok unpacked\nArchitecture: amd64\nVersion: 1.2-3\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("updates/0002"),
            "Package: foo\nStatus: install ok half-installed\nArchitecture: amd64\nVersion: 1.2-3\n",
        )
        .unwrap();

        let mut db = open(&dir, Access::ReadOnly);
        let pkg = db.find_singleton("foo").unwrap();
        assert_eq!(PkgStatus::Unpacked, db.pkg(pkg).status());
    }

    #[test]
    fn non_numeric_journal_name_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        seed(&dir, FOO);
        std::fs::write(dir.path().join("updates/tmp"), "junk").unwrap();

        let mut db = Database::with_native_arch(Dirs::new(dir.path()), "amd64");
        let err = db.load_status().unwrap_err();
        assert_eq!(ErrorKind::CorruptDatabase, err.kind());
    }

    #[test]
    fn corrupt_journal_entry_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        seed(&dir, FOO);
        std::fs::write(dir.path().join("updates/0000"), "Status: install ok installed\n")
            .unwrap();

        let mut db = Database::with_native_arch(Dirs::new(dir.path()), "amd64");
        let err = db.load_status().unwrap_err();
        assert!(err.location().unwrap().file.ends_with("updates/0000"));
    }

    #[test]
    fn recovery_prefers_status_then_status_old() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("updates")).unwrap();
        std::fs::write(
            dir.path().join("status-old"),
            "Package: old\nStatus: install ok installed\nArchitecture: amd64\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("status-new"),
            "Package: untrusted\nStatus: install ok installed\nArchitecture: amd64\n",
        )
        .unwrap();

        let mut db = Database::with_native_arch(Dirs::new(dir.path()), "amd64");
        db.load_status().unwrap();
        assert!(db.table.lookup_set("old").is_some());
        assert!(db.table.lookup_set("untrusted").is_none());
    }

    #[test]
    fn note_appends_and_syncs() {
        let dir = tempfile::tempdir().unwrap();
        seed(&dir, FOO);
        let mut db = open(&dir, Access::Write);
        let pkg = db.find_singleton("foo").unwrap();

        db.set_pkg_status(pkg, PkgStatus::HalfConfigured);
        db.note(pkg).unwrap();

        let entry = std::fs::read_to_string(dir.path().join("updates/0000")).unwrap();
        assert!(entry.contains("Status: install ok half-configured"));

        // Reload sees the journaled state.
        let mut db2 = open(&dir, Access::ReadOnly);
        let pkg2 = db2.find_singleton("foo").unwrap();
        assert_eq!(PkgStatus::HalfConfigured, db2.pkg(pkg2).status());
    }

    #[test]
    fn note_continues_numbering_after_existing_entries() {
        let dir = tempfile::tempdir().unwrap();
        seed(&dir, FOO);
        std::fs::write(
            dir.path().join("updates/0007"),
            "Package: foo\nStatus: install ok unpacked\nArchitecture: amd64\nVersion: 1.2-3\n",
        )
        .unwrap();

        let mut db = open(&dir, Access::Write);
        let pkg = db.find_singleton("foo").unwrap();
        db.note(pkg).unwrap();
        assert!(dir.path().join("updates/0008").exists());
    }

    #[test]
    fn commit_folds_journal_into_status() {
        let dir = tempfile::tempdir().unwrap();
        seed(&dir, FOO);
        let mut db = open(&dir, Access::Write);
        let pkg = db.find_singleton("foo").unwrap();

        db.set_pkg_status(pkg, PkgStatus::HalfConfigured);
        db.note(pkg).unwrap();
        db.commit().unwrap();

        assert!(std::fs::read_dir(dir.path().join("updates"))
            .unwrap()
            .next()
            .is_none());
        assert!(!dir.path().join("status-old").exists());
        assert!(!dir.path().join("status-new").exists());
        let status = std::fs::read_to_string(dir.path().join("status")).unwrap();
        assert!(status.contains("Status: install ok half-configured"));

        let mut db2 = open(&dir, Access::ReadOnly);
        let pkg2 = db2.find_singleton("foo").unwrap();
        assert_eq!(PkgStatus::HalfConfigured, db2.pkg(pkg2).status());
    }

    #[test]
    fn journal_rolls_over_into_full_write() {
        let dir = tempfile::tempdir().unwrap();
        seed(&dir, FOO);
        let mut db = open(&dir, Access::Write);
        let pkg = db.find_singleton("foo").unwrap();

        for _ in 0..MAX_UPDATES {
            db.note(pkg).unwrap();
        }

        // The roll-over committed: journal empty again.
        assert!(std::fs::read_dir(dir.path().join("updates"))
            .unwrap()
            .next()
            .is_none());
        assert_eq!(0, db.journal_len);
    }

    #[test]
    fn sequence_9999_forces_commit_on_next_append() {
        let dir = tempfile::tempdir().unwrap();
        seed(&dir, FOO);
        std::fs::write(
            dir.path().join("updates/9999"),
            "Package: foo\nStatus: install ok unpacked\nArchitecture: amd64\nVersion: 1.2-3\n",
        )
        .unwrap();

        let mut db = open(&dir, Access::Write);
        let pkg = db.find_singleton("foo").unwrap();
        db.note(pkg).unwrap();

        assert!(std::fs::read_dir(dir.path().join("updates"))
            .unwrap()
            .next()
            .is_none());
        assert!(dir.path().join("status").exists());
    }

    #[test]
    fn nonblocking_lock_contention_is_lock_busy() {
        let dir = tempfile::tempdir().unwrap();
        seed(&dir, FOO);

        let _holder = open(&dir, Access::Write);
        let mut second = Database::with_native_arch(Dirs::new(dir.path()), "amd64");
        second.access = Access::WriteNonBlocking;
        let err = second.lock_database(true).unwrap_err();
        assert_eq!(ErrorKind::LockBusy, err.kind());
    }

    #[test]
    fn lock_released_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        seed(&dir, FOO);
        {
            let _holder = open(&dir, Access::Write);
        }
        let mut second = Database::with_native_arch(Dirs::new(dir.path()), "amd64");
        second.access = Access::WriteNonBlocking;
        second.lock_database(true).unwrap();
    }

    #[test]
    fn available_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        seed(&dir, FOO);
        std::fs::write(
            dir.path().join("available"),
            "Package: bar\nArchitecture: amd64\nVersion: 2.0-1\nDescription: a candidate\n",
        )
        .unwrap();

        let mut db = open(&dir, Access::Write);
        db.load_available().unwrap();

        let bar = db.find_pkg("bar", db.arches().native());
        assert_eq!(
            "2.0-1",
            db.pkg(bar)
                .bin(View::Available)
                .version
                .as_ref()
                .unwrap()
                .to_string()
        );

        db.write_available().unwrap();
        let written = std::fs::read_to_string(dir.path().join("available")).unwrap();
        assert!(written.contains("Package: bar\n"));
        assert!(!written.contains("Status:"));
        // The installed-only package does not appear.
        assert!(!written.contains("Package: foo"));
    }
}

// vim: foldmethod=marker
