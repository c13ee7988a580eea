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

// The triggers/File store: one line per file-trigger interest,
// `<path> <package>[/<await-policy>]`.

use super::{InterestId, TrigInterest, TrigPolicy};
use crate::atomic::{AtomicFile, AtomicFileFlags};
use crate::db::{Database, PkgId};
use crate::dirs::TRIGGERS_FILE_FILE;
use crate::errors::{Error, ErrorKind, Result};
use crate::fsys::Reload;
use std::io::Write;

impl Database {
    fn interests_clear(&mut self) {
        let live: Vec<TrigInterest> = self.interests.drain(..).flatten().collect();
        for interest in live {
            self.fsys.get_mut(interest.node).interests.clear();
            self.table.pkg_mut(interest.pkg).interests.clear();
        }
    }

    fn interest_link(&mut self, interest: TrigInterest) -> bool {
        let exists = self
            .fsys
            .get(interest.node)
            .interests
            .iter()
            .filter_map(|id| self.interest(*id))
            .any(|have| have.pkg == interest.pkg);
        if exists {
            return false;
        }

        let id = InterestId(self.interests.len());
        self.fsys.get_mut(interest.node).interests.push(id);
        self.table.pkg_mut(interest.pkg).interests.push(id);
        self.interests.push(Some(interest));
        true
    }

    /// Load (or reload) the file-trigger interests from
    /// `triggers/File`. Unchanged files are skipped; a vanished file
    /// clears the interests.
    pub fn trig_file_interests_ensure(&mut self) -> Result<()> {
        let path = self.dirs.triggers_path(TRIGGERS_FILE_FILE);
        let contents = match self.interests_file.reopen(&path)? {
            Reload::Same => return Ok(()),
            Reload::None => {
                self.interests_clear();
                return Ok(());
            }
            Reload::Load(contents) => contents,
        };

        self.interests_clear();

        for (idx, line) in contents.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let Some((file, pkgspec)) = line.split_once(' ') else {
                return Err(Error::new(
                    ErrorKind::CorruptDatabase,
                    format!(
                        "syntax error in file triggers file '{}' line {}",
                        path.display(),
                        idx + 1
                    ),
                ));
            };

            let (pkgspec, policy) = match pkgspec.rsplit_once('/') {
                Some((spec, "await")) => (spec, TrigPolicy::Await),
                Some((spec, "noawait")) => (spec, TrigPolicy::NoAwait),
                _ => (pkgspec, TrigPolicy::Await),
            };

            let pkg = match pkgspec.split_once(':') {
                Some((name, arch)) => {
                    let arch = self.arches.find(Some(arch));
                    self.table.find_pkg(name, arch)
                }
                None => self.table.find_singleton(pkgspec, &self.arches)?,
            };

            let node = self.fsys.find(file);
            self.interest_link(TrigInterest { node, pkg, policy });
        }

        Ok(())
    }

    /// Register a file-trigger interest for a package. Returns false
    /// when the package already watches the path.
    pub fn trig_file_interest_add(
        &mut self,
        path: &str,
        pkg: PkgId,
        policy: TrigPolicy,
    ) -> Result<bool> {
        if !path.starts_with('/') {
            return Err(Error::new(
                ErrorKind::Parse(crate::errors::ParseReason::BadControlName),
                format!("file trigger '{}' is not an absolute path", path),
            ));
        }
        let node = self.fsys.find(path);
        Ok(self.interest_link(TrigInterest { node, pkg, policy }))
    }

    /// Drop a package's interest in a path. Returns false when it had
    /// none.
    pub fn trig_file_interest_remove(&mut self, path: &str, pkg: PkgId) -> bool {
        let Some(node) = self.fsys.lookup(path) else {
            return false;
        };
        let found = self
            .fsys
            .get(node)
            .interests
            .iter()
            .copied()
            .find(|id| matches!(self.interest(*id), Some(i) if i.pkg == pkg));
        let Some(id) = found else {
            return false;
        };
        self.interests[id.0] = None;
        self.fsys.get_mut(node).interests.retain(|i| *i != id);
        self.table.pkg_mut(pkg).interests.retain(|i| *i != id);
        true
    }

    /// Rewrite `triggers/File` from the in-memory interests.
    pub fn trig_file_interests_save(&mut self) -> Result<()> {
        let path = self.dirs.triggers_path(TRIGGERS_FILE_FILE);
        let mut file = AtomicFile::new(&path, AtomicFileFlags::default());
        file.open()?;

        let lines: Vec<String> = self
            .interests
            .iter()
            .flatten()
            .map(|interest| {
                let node = self.fsys.get(interest.node).name();
                let pkg = self.pkg_display_name(interest.pkg);
                match interest.policy {
                    TrigPolicy::Await => format!("{} {}", node, pkg),
                    TrigPolicy::NoAwait => format!("{} {}/noawait", node, pkg),
                }
            })
            .collect();
        for line in lines {
            writeln!(file, "{}", line)
                .map_err(|err| Error::io("unable to write file triggers file", err))?;
        }

        file.sync()?;
        file.close()?;
        file.commit()
    }
}


// vim: foldmethod=marker
