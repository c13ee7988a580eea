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

use crate::errors::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

/// What a [DbFile::reopen] decided about a single-file database.
#[derive(Debug)]
pub enum Reload {
    /// The file on disk is the one already loaded; keep the in-memory
    /// view.
    Same,

    /// The file is gone; clear the in-memory view.
    None,

    /// The file is new or was replaced; reparse these contents.
    Load(String),
}

/// Change tracking for a single-file database (diversions,
/// statoverride, trigger interests).
///
/// The previously opened file handle is kept so the filesystem cannot
/// reuse its inode while we still compare against it; a same dev/ino
/// pair therefore really is the same file, and the load is skipped.
#[derive(Debug, Default)]
pub struct DbFile {
    file: Option<File>,
    dev_ino: Option<(u64, u64)>,
}

impl DbFile {
    /// Fresh state: the first reopen always loads.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check the file at `path` against what was last loaded.
    pub fn reopen(&mut self, path: &Path) -> Result<Reload> {
        let mut file = match File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                self.file = None;
                self.dev_ino = None;
                return Ok(Reload::None);
            }
            Err(err) => {
                return Err(crate::errors::Error::io(
                    format!("cannot open {} file", path.display()),
                    err,
                ))
            }
        };

        let meta = file
            .metadata()
            .context_with(|| format!("cannot get {} file metadata", path.display()))?;
        let dev_ino = (meta.dev(), meta.ino());

        if self.dev_ino == Some(dev_ino) {
            tracing::debug!(path = %path.display(), "unchanged db, skipping");
            return Ok(Reload::Same);
        }

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .context_with(|| format!("cannot read {} file", path.display()))?;

        self.dev_ino = Some(dev_ino);
        self.file = Some(file);
        tracing::debug!(path = %path.display(), "new db, (re)loading");
        Ok(Reload::Load(contents))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = DbFile::new();
        assert!(matches!(
            state.reopen(&dir.path().join("diversions")).unwrap(),
            Reload::None
        ));
    }

    #[test]
    fn first_open_loads_then_same() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diversions");
        std::fs::write(&path, "contents").unwrap();

        let mut state = DbFile::new();
        match state.reopen(&path).unwrap() {
            Reload::Load(contents) => assert_eq!("contents", contents),
            other => panic!("expected load, got {:?}", other),
        }
        assert!(matches!(state.reopen(&path).unwrap(), Reload::Same));
    }

    #[test]
    fn replaced_file_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diversions");
        std::fs::write(&path, "one").unwrap();

        let mut state = DbFile::new();
        assert!(matches!(state.reopen(&path).unwrap(), Reload::Load(_)));

        // Replace via rename, the way the atomic-file primitive does.
        let sibling = dir.path().join("diversions-new");
        std::fs::write(&sibling, "two").unwrap();
        std::fs::rename(&sibling, &path).unwrap();

        match state.reopen(&path).unwrap() {
            Reload::Load(contents) => assert_eq!("two", contents),
            other => panic!("expected load, got {:?}", other),
        }
    }

    #[test]
    fn deleted_file_goes_back_to_none_then_loads_again() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statoverride");
        std::fs::write(&path, "x").unwrap();

        let mut state = DbFile::new();
        assert!(matches!(state.reopen(&path).unwrap(), Reload::Load(_)));
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(state.reopen(&path).unwrap(), Reload::None));
        std::fs::write(&path, "y").unwrap();
        assert!(matches!(state.reopen(&path).unwrap(), Reload::Load(_)));
    }
}

// vim: foldmethod=marker
