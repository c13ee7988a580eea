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
use crate::db::Database;
use crate::dirs::STATOVERRIDE_FILE;
use crate::errors::{Error, ErrorKind, Result};
use std::io::Write;

/// An administrator-imposed (owner, group, mode) triple applied to a
/// tracked path. The numeric ids are resolved from the system user
/// database at load time; a name that did not resolve is kept
/// verbatim so lax loads can carry it through a rewrite.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileStat {
    /// Resolved owner uid.
    pub uid: Option<u32>,

    /// Owner name, kept when the uid did not resolve.
    pub uname: Option<String>,

    /// Resolved group gid.
    pub gid: Option<u32>,

    /// Group name, kept when the gid did not resolve.
    pub gname: Option<String>,

    /// File mode bits, at most `07777`.
    pub mode: u32,
}

impl FileStat {
    fn render_user(&self) -> String {
        match (&self.uname, self.uid) {
            (Some(name), _) => name.clone(),
            (None, Some(uid)) => format!("#{}", uid),
            (None, None) => ":".to_owned(),
        }
    }

    fn render_group(&self) -> String {
        match (&self.gname, self.gid) {
            (Some(name), _) => name.clone(),
            (None, Some(gid)) => format!("#{}", gid),
            (None, None) => ":".to_owned(),
        }
    }
}

/// Missing-user policy when loading the statoverride file.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StatdbParse {
    /// Keep unresolvable names as literals.
    Lax,

    /// Fail on any name the system user database does not know.
    Strict,
}

/// Parse the owner column: `#uid` numeric form or a name resolved via
/// the system user database. An unresolvable name yields
/// `(None, Some(name))`.
pub fn statdb_parse_uid(value: &str) -> Result<(Option<u32>, Option<String>)> {
    if let Some(digits) = value.strip_prefix('#') {
        let uid = digits.parse::<u32>().map_err(|_| {
            Error::new(
                ErrorKind::CorruptDatabase,
                format!("invalid statoverride uid {}", value),
            )
        })?;
        return Ok((Some(uid), None));
    }

    match nix::unistd::User::from_name(value) {
        Ok(Some(user)) => Ok((Some(user.uid.as_raw()), None)),
        _ => Ok((None, Some(value.to_owned()))),
    }
}

/// Parse the group column, like [statdb_parse_uid].
pub fn statdb_parse_gid(value: &str) -> Result<(Option<u32>, Option<String>)> {
    if let Some(digits) = value.strip_prefix('#') {
        let gid = digits.parse::<u32>().map_err(|_| {
            Error::new(
                ErrorKind::CorruptDatabase,
                format!("invalid statoverride gid {}", value),
            )
        })?;
        return Ok((Some(gid), None));
    }

    match nix::unistd::Group::from_name(value) {
        Ok(Some(group)) => Ok((Some(group.gid.as_raw()), None)),
        _ => Ok((None, Some(value.to_owned()))),
    }
}

/// Parse the octal mode column.
pub fn statdb_parse_mode(value: &str) -> Result<u32> {
    match u32::from_str_radix(value, 8) {
        Ok(mode) if mode <= 0o7777 => Ok(mode),
        _ => Err(Error::new(
            ErrorKind::CorruptDatabase,
            format!("invalid statoverride mode {}", value),
        )),
    }
}

impl Database {
    /// Load (or reload) the statoverride database. Unchanged files
    /// are skipped, a vanished file clears every override, and a
    /// replaced file is reparsed from scratch.
    pub fn ensure_statoverrides(&mut self, policy: StatdbParse) -> Result<()> {
        let path = self.dirs.db_path(STATOVERRIDE_FILE);
        let contents = match self.statoverride_file.reopen(&path)? {
            Reload::Same => return Ok(()),
            Reload::None => {
                self.statoverrides_clear();
                return Ok(());
            }
            Reload::Load(contents) => contents,
        };

        self.statoverrides_clear();

        for (idx, line) in contents.lines().enumerate() {
            if line.is_empty() {
                return Err(Error::new(
                    ErrorKind::CorruptDatabase,
                    format!("statoverride file '{}' contains an empty line", path.display()),
                ));
            }

            let mut fields = line.splitn(4, ' ');
            let (Some(user), Some(group), Some(mode), Some(file)) = (
                fields.next(),
                fields.next(),
                fields.next(),
                fields.next(),
            ) else {
                return Err(Error::new(
                    ErrorKind::CorruptDatabase,
                    format!(
                        "syntax error in statoverride file '{}' line {}",
                        path.display(),
                        idx + 1
                    ),
                ));
            };

            let (uid, uname) = statdb_parse_uid(user)?;
            if uid.is_none() && policy == StatdbParse::Strict {
                return Err(Error::new(
                    ErrorKind::OrphanOverride,
                    format!("unknown system user '{}' in statoverride file", user),
                ));
            }
            let (gid, gname) = statdb_parse_gid(group)?;
            if gid.is_none() && policy == StatdbParse::Strict {
                return Err(Error::new(
                    ErrorKind::OrphanOverride,
                    format!("unknown system group '{}' in statoverride file", group),
                ));
            }
            let mode = statdb_parse_mode(mode)?;

            self.statoverride_attach(
                file.to_owned(),
                FileStat {
                    uid,
                    uname,
                    gid,
                    gname,
                    mode,
                },
            )?;
        }

        Ok(())
    }

    fn statoverrides_clear(&mut self) {
        let nodes: Vec<NodeId> = self
            .fsys
            .iter()
            .filter(|(_, node)| node.statoverride.is_some())
            .map(|(id, _)| id)
            .collect();
        for node in nodes {
            self.fsys.get_mut(node).statoverride = None;
        }
    }

    fn statoverride_attach(&mut self, path: String, stat: FileStat) -> Result<NodeId> {
        let node = self.fsys.find_owned(path);
        if self.fsys.get(node).statoverride.is_some() {
            return Err(Error::new(
                ErrorKind::DuplicateStatoverride,
                format!(
                    "multiple statoverrides present for file '{}'",
                    self.fsys.get(node).name()
                ),
            ));
        }
        self.fsys.get_mut(node).statoverride = Some(stat);
        Ok(node)
    }

    /// Add an override for a path. At most one may exist per path.
    pub fn statoverride_add(&mut self, path: &str, stat: FileStat) -> Result<NodeId> {
        self.statoverride_attach(path.to_owned(), stat)
    }

    /// Remove the override for a path. Returns false when none
    /// exists.
    pub fn statoverride_remove(&mut self, path: &str) -> bool {
        let Some(node) = self.fsys.lookup(path) else {
            return false;
        };
        self.fsys.get_mut(node).statoverride.take().is_some()
    }

    /// Look up the override applied to a path.
    pub fn statoverride_lookup(&self, path: &str) -> Option<&FileStat> {
        self.fsys.get(self.fsys.lookup(path)?).statoverride.as_ref()
    }

    /// Rewrite the statoverride file from the in-memory view via the
    /// atomic-file primitive (keeping a `-old` backup).
    pub fn statoverrides_save(&mut self) -> Result<()> {
        let path = self.dirs.db_path(STATOVERRIDE_FILE);
        let mut file = AtomicFile::new(
            &path,
            AtomicFileFlags {
                backup: true,
                ..Default::default()
            },
        );
        file.open()?;

        for (_, node) in self.fsys.iter() {
            let Some(stat) = &node.statoverride else {
                continue;
            };
            writeln!(
                file,
                "{} {} {:o} {}",
                stat.render_user(),
                stat.render_group(),
                stat.mode,
                node.name()
            )
            .map_err(|err| Error::io("unable to write statoverride file", err))?;
        }

        file.sync()?;
        file.close()?;
        file.commit()
    }
}


// vim: foldmethod=marker
