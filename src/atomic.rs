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

//! The `atomic` module is the one way a persistent database file gets
//! replaced.
//!
//! An [AtomicFile] writes to `<target>-new`, then `sync` flushes and
//! fsyncs, `close` closes, and `commit` renames the sibling over the
//! target (optionally hard-linking the old file to `<target>-old`
//! first) and fsyncs the parent directory. A crash anywhere before the
//! rename leaves the old file intact; after the rename, readers see
//! the new one. Dropping an [AtomicFile] without committing unlinks
//! the half-written sibling.

use crate::errors::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

const NEW_EXT: &str = "-new";
const OLD_EXT: &str = "-old";

/// Behavior switches for an [AtomicFile].
#[derive(Copy, Clone, Debug, Default)]
pub struct AtomicFileFlags {
    /// Keep the previous contents as `<target>-old` on commit.
    pub backup: bool,

    /// Create the file mode 0600 instead of the default 0644.
    pub private: bool,
}

fn sibling(target: &Path, ext: &str) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(ext);
    PathBuf::from(name)
}

/// Fsync a directory, making renames and unlinks inside it durable.
pub fn sync_dir(dir: &Path) -> Result<()> {
    File::open(dir)
        .and_then(|dir| dir.sync_all())
        .context_with(|| format!("unable to sync directory '{}'", dir.display()))
}

/// Write-to-sibling-then-rename replacement of one file.
#[derive(Debug)]
pub struct AtomicFile {
    target: PathBuf,
    name_new: PathBuf,
    flags: AtomicFileFlags,
    writer: Option<BufWriter<File>>,
    committed: bool,
}

impl AtomicFile {
    /// Set up for replacing `target`. Nothing touches the filesystem
    /// until [AtomicFile::open].
    pub fn new(target: impl Into<PathBuf>, flags: AtomicFileFlags) -> Self {
        let target = target.into();
        let name_new = sibling(&target, NEW_EXT);
        Self {
            target,
            name_new,
            flags,
            writer: None,
            committed: false,
        }
    }

    /// The path being replaced.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// The pending sibling path.
    pub fn name_new(&self) -> &Path {
        &self.name_new
    }

    /// Create (or truncate) the pending sibling for writing.
    pub fn open(&mut self) -> Result<()> {
        let mode = if self.flags.private { 0o600 } else { 0o644 };
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(mode)
            .open(&self.name_new)
            .context_with(|| {
                format!("unable to create new file '{}'", self.name_new.display())
            })?;
        self.writer = Some(BufWriter::new(file));
        Ok(())
    }

    fn writer(&mut self) -> &mut BufWriter<File> {
        match self.writer.as_mut() {
            Some(writer) => writer,
            None => crate::errors::internerr!("atomic file used before open"),
        }
    }

    /// Flush buffered writes and fsync the pending sibling. Reports
    /// any write error buffered so far.
    pub fn sync(&mut self) -> Result<()> {
        let name_new = self.name_new.clone();
        let writer = self.writer();
        writer
            .flush()
            .context_with(|| format!("unable to flush new file '{}'", name_new.display()))?;
        writer
            .get_ref()
            .sync_all()
            .context_with(|| format!("unable to sync new file '{}'", name_new.display()))
    }

    /// Close the pending sibling.
    pub fn close(&mut self) -> Result<()> {
        let name_new = self.name_new.clone();
        if let Some(mut writer) = self.writer.take() {
            writer
                .flush()
                .context_with(|| format!("unable to close new file '{}'", name_new.display()))?;
        }
        Ok(())
    }

    /// Rename the sibling over the target and fsync the directory.
    /// With the backup flag, the old target survives as
    /// `<target>-old`.
    pub fn commit(mut self) -> Result<()> {
        if self.writer.is_some() {
            self.close()?;
        }

        if self.flags.backup {
            let name_old = sibling(&self.target, OLD_EXT);
            match std::fs::remove_file(&name_old) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    return Err(crate::errors::Error::io(
                        format!("error removing old backup file '{}'", name_old.display()),
                        err,
                    ))
                }
            }
            match std::fs::hard_link(&self.target, &name_old) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    return Err(crate::errors::Error::io(
                        format!("error creating new backup file '{}'", name_old.display()),
                        err,
                    ))
                }
            }
        }

        std::fs::rename(&self.name_new, &self.target).context_with(|| {
            format!("error installing new file '{}'", self.target.display())
        })?;
        self.committed = true;

        if let Some(dir) = self.target.parent() {
            sync_dir(dir)?;
        }
        Ok(())
    }

    /// Remove both the pending sibling and the target itself.
    pub fn remove(mut self) -> Result<()> {
        self.writer = None;
        self.committed = true;
        match std::fs::remove_file(&self.name_new) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                return Err(crate::errors::Error::io(
                    format!("cannot remove '{}'", self.name_new.display()),
                    err,
                ))
            }
        }
        match std::fs::remove_file(&self.target) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(crate::errors::Error::io(
                format!("cannot remove '{}'", self.target.display()),
                err,
            )),
        }
    }
}

impl Write for AtomicFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer().flush()
    }
}

impl Drop for AtomicFile {
    fn drop(&mut self) {
        // Error path: never leave a half-written sibling behind.
        if !self.committed {
            self.writer = None;
            let _ = std::fs::remove_file(&self.name_new);
        }
    }
}


// vim: foldmethod=marker
