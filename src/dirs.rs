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

//! The `dirs` module knows the admin directory layout and how the
//! database's on-disk names are derived from the environment.
//!
//! Two roots matter: the admin directory (`DPKG_ADMINDIR`, default
//! `/var/lib/dpkg`) holding the database itself, and the filesystem
//! root (`DPKG_ROOT`, default empty) prepended to every path the
//! database tracks on the running system.

use std::path::{Path, PathBuf};

/// Default admin directory when `DPKG_ADMINDIR` is not set.
pub const DEFAULT_ADMINDIR: &str = "/var/lib/dpkg";

/// The committed status snapshot.
pub const STATUS_FILE: &str = "status";

/// The available-view snapshot.
pub const AVAILABLE_FILE: &str = "available";

/// The journal directory of incremental status records.
pub const UPDATES_DIR: &str = "updates";

/// The main database lock file.
pub const LOCK_FILE: &str = "lock";

/// The diversions database.
pub const DIVERSIONS_FILE: &str = "diversions";

/// The statoverride database.
pub const STATOVERRIDE_FILE: &str = "statoverride";

/// The per-package info file directory.
pub const INFO_DIR: &str = "info";

/// The info database format marker, inside [INFO_DIR].
pub const INFO_FORMAT_FILE: &str = "format";

/// The trigger state directory.
pub const TRIGGERS_DIR: &str = "triggers";

/// File-trigger interests, inside [TRIGGERS_DIR].
pub const TRIGGERS_FILE_FILE: &str = "File";

/// Deferred trigger activations, inside [TRIGGERS_DIR].
pub const TRIGGERS_DEFERRED_FILE: &str = "Unincorp";

/// The trigger area lock, inside [TRIGGERS_DIR].
pub const TRIGGERS_LOCK_FILE: &str = "Lock";

/// Resolved directory configuration of a database instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dirs {
    admindir: PathBuf,
    root: PathBuf,
}

impl Dirs {
    /// Use an explicit admin directory, with no filesystem root
    /// prefix.
    pub fn new(admindir: impl Into<PathBuf>) -> Self {
        Self {
            admindir: admindir.into(),
            root: PathBuf::new(),
        }
    }

    /// Use an explicit admin directory and filesystem root.
    pub fn with_root(admindir: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Self {
        Self {
            admindir: admindir.into(),
            root: root.into(),
        }
    }

    /// Resolve from `DPKG_ADMINDIR` and `DPKG_ROOT`, falling back to
    /// the defaults.
    pub fn from_env() -> Self {
        let root = std::env::var_os("DPKG_ROOT")
            .map(PathBuf::from)
            .unwrap_or_default();
        let admindir = match std::env::var_os("DPKG_ADMINDIR") {
            Some(dir) => PathBuf::from(dir),
            None => {
                // The default admindir lives under the root.
                let mut dir = root.clone();
                dir.push(DEFAULT_ADMINDIR.trim_start_matches('/'));
                if root.as_os_str().is_empty() {
                    PathBuf::from(DEFAULT_ADMINDIR)
                } else {
                    dir
                }
            }
        };
        Self { admindir, root }
    }

    /// The admin directory itself.
    pub fn admindir(&self) -> &Path {
        &self.admindir
    }

    /// The filesystem root. Empty by default.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// A file inside the admin directory.
    pub fn db_path(&self, name: &str) -> PathBuf {
        self.admindir.join(name)
    }

    /// A file inside the triggers directory.
    pub fn triggers_path(&self, name: &str) -> PathBuf {
        self.admindir.join(TRIGGERS_DIR).join(name)
    }

    /// The updates (journal) directory.
    pub fn updates_dir(&self) -> PathBuf {
        self.admindir.join(UPDATES_DIR)
    }

    /// The info file directory.
    pub fn info_dir(&self) -> PathBuf {
        self.admindir.join(INFO_DIR)
    }

    /// Prefix a tracked filesystem path with the root, never doubling
    /// the leading slash.
    pub fn root_path(&self, path: &str) -> PathBuf {
        if self.root.as_os_str().is_empty() {
            return PathBuf::from(path);
        }
        self.root.join(path.trim_start_matches('/'))
    }
}

impl Default for Dirs {
    fn default() -> Self {
        Self::new(DEFAULT_ADMINDIR)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn db_paths_are_under_admindir() {
        let dirs = Dirs::new("/srv/db");
        assert_eq!(PathBuf::from("/srv/db/status"), dirs.db_path(STATUS_FILE));
        assert_eq!(
            PathBuf::from("/srv/db/triggers/Unincorp"),
            dirs.triggers_path(TRIGGERS_DEFERRED_FILE)
        );
        assert_eq!(PathBuf::from("/srv/db/updates"), dirs.updates_dir());
    }

    #[test]
    fn empty_root_passes_paths_through() {
        let dirs = Dirs::new("/srv/db");
        assert_eq!(PathBuf::from("/usr/bin/ls"), dirs.root_path("/usr/bin/ls"));
    }

    #[test]
    fn root_prefix_does_not_double_slash() {
        let dirs = Dirs::with_root("/srv/db", "/chroot");
        assert_eq!(
            PathBuf::from("/chroot/usr/bin/ls"),
            dirs.root_path("/usr/bin/ls")
        );
    }
}

// vim: foldmethod=marker
