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

// The per-package info file database: `info/<pkg>.<ext>` in the
// legacy format, `info/<pkg>:<arch>.<ext>` for Multi-Arch: same
// instances once the format marker says 1.

use super::pkg::{PkgId, View};
use super::Database;
use crate::architecture::MultiArch;
use crate::atomic::{AtomicFile, AtomicFileFlags};
use crate::dirs::INFO_FORMAT_FILE;
use crate::errors::{Context, Error, ErrorKind, Result};
use std::io::Write;
use std::path::PathBuf;

/// Layout version of the info file database, from `info/format`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum InfoFormat {
    /// Files are named `<pkg>.<ext>` only.
    Legacy,

    /// `Multi-Arch: same` instances use `<pkg>:<arch>.<ext>`.
    MultiArch,
}

impl Database {
    /// The info database format, read from `info/format` on first
    /// use. A missing marker file means the legacy format.
    pub fn infodb_format(&mut self) -> Result<InfoFormat> {
        if let Some(format) = self.info_format {
            return Ok(format);
        }

        let path = self.dirs.info_dir().join(INFO_FORMAT_FILE);
        let format = match std::fs::read_to_string(&path) {
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => InfoFormat::Legacy,
            Err(err) => {
                return Err(Error::io(
                    format!("unable to read info format file '{}'", path.display()),
                    err,
                ))
            }
            Ok(contents) => match contents.trim() {
                "0" => InfoFormat::Legacy,
                "1" => InfoFormat::MultiArch,
                other => {
                    return Err(Error::new(
                        ErrorKind::CorruptDatabase,
                        format!(
                            "unsupported info database format '{}' in '{}'",
                            other,
                            path.display()
                        ),
                    ))
                }
            },
        };

        self.info_format = Some(format);
        Ok(format)
    }

    /// Upgrade the info database format marker to the multi-arch
    /// layout, atomically. The caller is responsible for renaming the
    /// info files themselves.
    pub fn infodb_upgrade_format(&mut self) -> Result<()> {
        let info_dir = self.dirs.info_dir();
        std::fs::create_dir_all(&info_dir)
            .context_with(|| format!("unable to create '{}'", info_dir.display()))?;

        let path = info_dir.join(INFO_FORMAT_FILE);
        let mut file = AtomicFile::new(&path, AtomicFileFlags::default());
        file.open()?;
        file.write_all(b"1\n")
            .context_with(|| format!("unable to write '{}'", path.display()))?;
        file.sync()?;
        file.close()?;
        file.commit()?;

        self.info_format = Some(InfoFormat::MultiArch);
        Ok(())
    }

    /// The on-disk name of one info file of a package, per the
    /// current format and the instance's multi-arch mode.
    pub fn info_path(&mut self, pkg: PkgId, ext: &str) -> Result<PathBuf> {
        let format = self.infodb_format()?;
        let instance = self.table.pkg(pkg);
        let name = self.table.set(instance.set).name();

        let filename = if format >= InfoFormat::MultiArch
            && instance.bin(View::Installed).multiarch == MultiArch::Same
        {
            format!(
                "{}:{}.{}",
                name,
                self.arches.get(instance.arch).name(),
                ext
            )
        } else {
            format!("{}.{}", name, ext)
        };
        Ok(self.dirs.info_dir().join(filename))
    }

    /// Whether a package has the given info file.
    pub fn info_has_file(&mut self, pkg: PkgId, ext: &str) -> Result<bool> {
        Ok(self.info_path(pkg, ext)?.is_file())
    }

    /// Read one info file of a package, `None` when it does not
    /// exist.
    pub fn info_read(&mut self, pkg: PkgId, ext: &str) -> Result<Option<String>> {
        let path = self.info_path(pkg, ext)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Error::io(
                format!("unable to read info file '{}'", path.display()),
                err,
            )),
        }
    }
}


// vim: foldmethod=marker
