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

use super::{NodeId, Reload};
use crate::atomic::{AtomicFile, AtomicFileFlags};
use crate::db::{Database, SetId};
use crate::dirs::DIVERSIONS_FILE;
use crate::errors::{Error, ErrorKind, Result};
use std::io::Write;

/// Stable handle to a loaded diversion record.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DivertId(pub(crate) usize);

/// One diversion: the path packages believe they install to
/// (`camefrom`) and the path the file actually lives at
/// (`useinstead`), owned by one package set -- or by nobody, which
/// diverts every package's copy.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Diversion {
    pub(crate) camefrom: NodeId,
    pub(crate) useinstead: NodeId,
    pub(crate) pkgset: Option<SetId>,
}

impl Diversion {
    /// The diverted-away-from path's node.
    pub fn camefrom(&self) -> NodeId {
        self.camefrom
    }

    /// The diverted-to path's node.
    pub fn useinstead(&self) -> NodeId {
        self.useinstead
    }

    /// The owning package set, or `None` for a universal diversion.
    pub fn pkgset(&self) -> Option<SetId> {
        self.pkgset
    }
}

impl Database {
    /// Resolve a diversion id, `None` when it has been removed.
    pub fn diversion(&self, id: DivertId) -> Option<&Diversion> {
        self.diversions.get(id.0)?.as_ref()
    }

    /// Visit every live diversion.
    pub fn diversions(&self) -> impl Iterator<Item = (DivertId, &Diversion)> {
        self.diversions
            .iter()
            .enumerate()
            .filter_map(|(idx, d)| d.as_ref().map(|d| (DivertId(idx), d)))
    }

    fn diversions_clear(&mut self) {
        let live: Vec<Diversion> = self.diversions.drain(..).flatten().collect();
        for diversion in live {
            self.fsys.get_mut(diversion.camefrom).divert = None;
            self.fsys.get_mut(diversion.useinstead).divert = None;
        }
    }

    fn diversion_link(&mut self, diversion: Diversion) -> Result<DivertId> {
        let camefrom_name = self.fsys.get(diversion.camefrom).name().to_owned();
        let useinstead_name = self.fsys.get(diversion.useinstead).name().to_owned();

        if diversion.camefrom == diversion.useinstead {
            return Err(Error::new(
                ErrorKind::ConflictingDiversion,
                format!("cannot divert '{}' to itself", camefrom_name),
            ));
        }
        if self.fsys.get(diversion.camefrom).divert.is_some()
            || self.fsys.get(diversion.useinstead).divert.is_some()
        {
            return Err(Error::new(
                ErrorKind::ConflictingDiversion,
                format!(
                    "conflicting diversions involving '{}' or '{}'",
                    camefrom_name, useinstead_name
                ),
            ));
        }

        let id = DivertId(self.diversions.len());
        self.fsys.get_mut(diversion.camefrom).divert = Some(id);
        self.fsys.get_mut(diversion.useinstead).divert = Some(id);
        self.diversions.push(Some(diversion));
        Ok(id)
    }

    /// Load (or reload) the diversions database. A file unchanged
    /// since the last load is skipped; a vanished file clears the
    /// in-memory view.
    pub fn ensure_diversions(&mut self) -> Result<()> {
        let path = self.dirs.db_path(DIVERSIONS_FILE);
        let contents = match self.diversions_file.reopen(&path)? {
            Reload::Same => return Ok(()),
            Reload::None => {
                self.diversions_clear();
                return Ok(());
            }
            Reload::Load(contents) => contents,
        };

        self.diversions_clear();

        let mut lines = contents.lines();
        loop {
            let Some(camefrom) = lines.next() else {
                break;
            };
            let (Some(useinstead), Some(package)) = (lines.next(), lines.next()) else {
                return Err(Error::new(
                    ErrorKind::CorruptDatabase,
                    format!(
                        "diversions file '{}' ends mid-record (records are three lines)",
                        path.display()
                    ),
                ));
            };

            let camefrom = self.fsys.find(camefrom);
            let useinstead = self.fsys.find(useinstead);
            let pkgset = match package {
                ":" => None,
                name => Some(self.table.find_set(name)),
            };

            self.diversion_link(Diversion {
                camefrom,
                useinstead,
                pkgset,
            })?;
        }

        Ok(())
    }

    /// Add a diversion. `pkg` of `None` records the universal (`:`)
    /// owner. Fails with
    /// [ErrorKind::ConflictingDiversion] when either endpoint is
    /// already part of a diversion.
    pub fn diversion_add(
        &mut self,
        camefrom: &str,
        useinstead: &str,
        pkg: Option<&str>,
    ) -> Result<DivertId> {
        let camefrom = self.fsys.find(camefrom);
        let useinstead = self.fsys.find(useinstead);
        let pkgset = pkg.map(|name| self.table.find_set(name));
        self.diversion_link(Diversion {
            camefrom,
            useinstead,
            pkgset,
        })
    }

    /// Remove the diversion whose `camefrom` endpoint is the given
    /// path. Returns false when no such diversion exists.
    pub fn diversion_remove(&mut self, camefrom: &str) -> Result<bool> {
        let Some(node) = self.fsys.lookup(camefrom) else {
            return Ok(false);
        };
        let Some(id) = self.fsys.get(node).divert else {
            return Ok(false);
        };
        let Some(diversion) = self.diversions[id.0].take() else {
            return Ok(false);
        };
        if diversion.camefrom != node {
            // The path is the diverted-to side; put the record back.
            self.diversions[id.0] = Some(diversion);
            return Ok(false);
        }
        self.fsys.get_mut(diversion.camefrom).divert = None;
        self.fsys.get_mut(diversion.useinstead).divert = None;
        Ok(true)
    }

    /// Rewrite the diversions file from the in-memory view, three
    /// lines per record, via the atomic-file primitive (keeping a
    /// `-old` backup).
    pub fn diversions_save(&mut self) -> Result<()> {
        let path = self.dirs.db_path(DIVERSIONS_FILE);
        let mut file = AtomicFile::new(
            &path,
            AtomicFileFlags {
                backup: true,
                ..Default::default()
            },
        );
        file.open()?;

        for (_, diversion) in self.diversions() {
            let camefrom = self.fsys.get(diversion.camefrom).name();
            let useinstead = self.fsys.get(diversion.useinstead).name();
            let owner = match diversion.pkgset {
                Some(set) => self.table.set(set).name(),
                None => ":",
            };
            writeln!(file, "{}\n{}\n{}", camefrom, useinstead, owner)
                .map_err(|err| Error::io("unable to write diversions file", err))?;
        }

        file.sync()?;
        file.close()?;
        file.commit()
    }
}

#[cfg(test)]
mod test {
    use crate::db::{Access, Database};
    use crate::dirs::Dirs;
    use crate::errors::ErrorKind;

    fn db_in(dir: &tempfile::TempDir) -> Database {
        Database::with_native_arch(Dirs::new(dir.path()), "amd64")
    }

    #[test]
    fn load_three_line_records() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("diversions"),
            "/usr/bin/ls\n/usr/bin/ls.distrib\ncoreutils\n/etc/inittab\n/etc/inittab.real\n:\n",
        )
        .unwrap();

        let mut db = db_in(&dir);
        db.ensure_diversions().unwrap();

        assert_eq!(2, db.diversions().count());
        let node = db.lookup_node("/usr/bin/ls").unwrap();
        let id = db.node(node).diversion().unwrap();
        let diversion = db.diversion(id).unwrap();
        assert_eq!(
            "/usr/bin/ls.distrib",
            db.node(diversion.useinstead()).name()
        );
        assert_eq!("coreutils", db.set(diversion.pkgset().unwrap()).name());

        let inittab = db.lookup_node("/etc/inittab").unwrap();
        let universal = db.diversion(db.node(inittab).diversion().unwrap()).unwrap();
        assert_eq!(None, universal.pkgset());
    }

    #[test]
    fn conflicting_endpoints_fail_load() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("diversions"),
            "/a\n/b\n:\n/a\n/c\n:\n",
        )
        .unwrap();

        let mut db = db_in(&dir);
        let err = db.ensure_diversions().unwrap_err();
        assert_eq!(ErrorKind::ConflictingDiversion, err.kind());
    }

    #[test]
    fn truncated_record_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("diversions"), "/a\n/b\n").unwrap();
        let mut db = db_in(&dir);
        assert_eq!(
            ErrorKind::CorruptDatabase,
            db.ensure_diversions().unwrap_err().kind()
        );
    }

    #[test]
    fn add_save_reload_remove_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("diversions"), "").unwrap();

        let mut db = db_in(&dir);
        db.ensure_diversions().unwrap();
        db.diversion_add("/usr/bin/ls", "/usr/bin/ls.distrib", Some("coreutils"))
            .unwrap();
        db.diversions_save().unwrap();

        assert_eq!(
            "/usr/bin/ls\n/usr/bin/ls.distrib\ncoreutils\n",
            std::fs::read_to_string(dir.path().join("diversions")).unwrap()
        );

        // A second diversion with the same camefrom collides.
        let err = db
            .diversion_add("/usr/bin/ls", "/usr/bin/ls.other", None)
            .unwrap_err();
        assert_eq!(ErrorKind::ConflictingDiversion, err.kind());

        assert!(db.diversion_remove("/usr/bin/ls").unwrap());
        assert!(!db.diversion_remove("/usr/bin/ls").unwrap());
        db.diversions_save().unwrap();
        assert_eq!(
            "",
            std::fs::read_to_string(dir.path().join("diversions")).unwrap()
        );
    }

    #[test]
    fn fresh_reload_after_external_edit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diversions");
        std::fs::write(&path, "/a\n/b\n:\n").unwrap();

        let mut db = db_in(&dir);
        db.ensure_diversions().unwrap();
        assert_eq!(1, db.diversions().count());

        // Unchanged: reload is a no-op.
        db.ensure_diversions().unwrap();
        assert_eq!(1, db.diversions().count());

        // Replaced by rename: reparse.
        let sibling = dir.path().join("diversions-new");
        std::fs::write(&sibling, "/c\n/d\n:\n/e\n/f\n:\n").unwrap();
        std::fs::rename(&sibling, &path).unwrap();
        db.ensure_diversions().unwrap();
        assert_eq!(2, db.diversions().count());
        assert!(db.lookup_node("/c").is_some());
        let old = db.lookup_node("/a").unwrap();
        assert_eq!(None, db.node(old).diversion());

        // Removed: cleared.
        std::fs::remove_file(&path).unwrap();
        db.ensure_diversions().unwrap();
        assert_eq!(0, db.diversions().count());
    }

    #[test]
    fn open_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("status"), "").unwrap();
        std::fs::create_dir(dir.path().join("updates")).unwrap();
        let db = Database::open(Dirs::new(dir.path()), Access::ReadOnly).unwrap();
        assert_eq!(0, db.diversions().count());
    }
}

// vim: foldmethod=marker
