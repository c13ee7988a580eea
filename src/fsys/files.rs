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

// Loading of per-package file lists (`info/<pkg>.list`): one absolute
// path per line, the source of the package/path ownership relation.

use crate::db::{Database, PkgId, PkgStatus};
use crate::errors::Result;

impl Database {
    /// Load a package's file list from its `list` info file, interning
    /// every path and recording the ownership edges both ways. Loads
    /// once per handle; later calls are free. Returns the number of
    /// owned paths, zero when the package has no list file.
    pub fn load_pkg_filelist(&mut self, pkg: PkgId) -> Result<usize> {
        if self.table.pkg(pkg).files_loaded {
            return Ok(self.table.pkg(pkg).files.len());
        }

        let Some(contents) = self.info_read(pkg, "list")? else {
            self.table.pkg_mut(pkg).files_loaded = true;
            return Ok(0);
        };

        for line in contents.lines() {
            let mut path = line.trim_end();
            // The root entry is conventionally spelled "/.".
            if path == "/." {
                path = "/";
            } else if path.len() > 1 {
                path = path.trim_end_matches('/');
            }
            if path.is_empty() {
                continue;
            }
            // Bulk admission: hand the line's buffer over when it is
            // already canonical.
            let node = self.fsys.find_owned(path.to_owned());
            self.add_pkg_file(pkg, node);
        }

        self.table.pkg_mut(pkg).files_loaded = true;
        Ok(self.table.pkg(pkg).files.len())
    }

    /// Load the file lists of every instance that is on the system in
    /// any state beyond configuration leftovers.
    pub fn ensure_all_filelists(&mut self) -> Result<()> {
        let pkgs: Vec<PkgId> = self
            .pkgs()
            .filter(|(_, pkg)| pkg.status() >= PkgStatus::HalfInstalled)
            .map(|(id, _)| id)
            .collect();
        for pkg in pkgs {
            self.load_pkg_filelist(pkg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dirs::Dirs;

    fn db_in(dir: &tempfile::TempDir) -> Database {
        std::fs::create_dir_all(dir.path().join("info")).unwrap();
        Database::with_native_arch(Dirs::new(dir.path()), "amd64")
    }

    #[test]
    fn list_file_populates_ownership() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = db_in(&dir);
        let native = db.arches().native();
        let pkg = db.find_pkg("tool", native);

        std::fs::write(
            dir.path().join("info/tool.list"),
            "/.\n/usr\n/usr/bin\n/usr/bin/tool\n",
        )
        .unwrap();

        let count = db.load_pkg_filelist(pkg).unwrap();
        assert_eq!(4, count);

        let node = db.lookup_node("/usr/bin/tool").unwrap();
        assert_eq!(&[pkg], db.node(node).packages());
        assert!(db.pkg(pkg).files().contains(&node));
        // The root entry canonicalizes to "/".
        assert!(db.lookup_node("/").is_some());
    }

    #[test]
    fn loads_only_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = db_in(&dir);
        let native = db.arches().native();
        let pkg = db.find_pkg("tool", native);

        std::fs::write(dir.path().join("info/tool.list"), "/usr/bin/tool\n").unwrap();
        assert_eq!(1, db.load_pkg_filelist(pkg).unwrap());

        // A second call does not re-read the file.
        std::fs::write(
            dir.path().join("info/tool.list"),
            "/usr/bin/tool\n/usr/bin/other\n",
        )
        .unwrap();
        assert_eq!(1, db.load_pkg_filelist(pkg).unwrap());
    }

    #[test]
    fn missing_list_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = db_in(&dir);
        let native = db.arches().native();
        let pkg = db.find_pkg("ghost", native);
        assert_eq!(0, db.load_pkg_filelist(pkg).unwrap());
        assert!(db.pkg(pkg).files().is_empty());
    }

    #[test]
    fn shared_directories_are_co_owned() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = db_in(&dir);
        let native = db.arches().native();
        let a = db.find_pkg("a", native);
        let b = db.find_pkg("b", native);

        std::fs::write(dir.path().join("info/a.list"), "/usr/share/doc\n/usr/share/doc/a\n")
            .unwrap();
        std::fs::write(dir.path().join("info/b.list"), "/usr/share/doc\n/usr/share/doc/b\n")
            .unwrap();

        db.load_pkg_filelist(a).unwrap();
        db.load_pkg_filelist(b).unwrap();

        let shared = db.lookup_node("/usr/share/doc").unwrap();
        assert_eq!(&[a, b], db.node(shared).packages());
    }
}

// vim: foldmethod=marker
