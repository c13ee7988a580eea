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

use crate::db::{Database, PkgId, View};
use crate::errors::{Error, ErrorKind, Result};

// One entry per line: 32 hex digits, exactly two spaces, the path.
fn parse_line(line: &str) -> Option<(&str, &str)> {
    if line.len() < 35 || !line.is_char_boundary(32) {
        return None;
    }
    let (hash, rest) = line.split_at(32);
    if !hash.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let path = rest.strip_prefix("  ")?;
    if path.is_empty() {
        return None;
    }
    Some((hash, path))
}

/// Parse the contents of a per-package `md5sums` file into
/// (hash, path) pairs.
pub fn parse_md5sums(contents: &str) -> Result<Vec<(String, String)>> {
    let mut entries = vec![];
    for (idx, line) in contents.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        let Some((hash, path)) = parse_line(line) else {
            return Err(Error::new(
                ErrorKind::CorruptDatabase,
                format!("malformed md5sums line {}", idx + 1),
            ));
        };
        entries.push((hash.to_owned(), path.to_owned()));
    }
    Ok(entries)
}

impl Database {
    /// Load the md5sums info file of a package, recording each path's
    /// digest on its namenode and the ownership edge both ways.
    /// Returns the number of entries, zero when the package has no
    /// md5sums file.
    pub fn load_pkg_digests(&mut self, pkg: PkgId) -> Result<usize> {
        let Some(contents) = self.info_read(pkg, "md5sums")? else {
            return Ok(0);
        };

        let entries = parse_md5sums(&contents)?;
        let count = entries.len();
        for (hash, path) in entries {
            let node = self.fsys.find_owned(path);
            self.fsys.get_mut(node).current_hash = Some(hash);
            self.add_pkg_file(pkg, node);
        }

        // Conffiles never appear in md5sums; their digests live in the
        // status record.
        let conffiles: Vec<(String, String)> = self
            .pkg(pkg)
            .bin(View::Installed)
            .conffiles
            .iter()
            .map(|c| (c.path.clone(), c.hash.clone()))
            .collect();
        for (path, hash) in conffiles {
            let node = self.fsys.find_owned(path);
            self.fsys.get_mut(node).current_hash = Some(hash);
            self.add_pkg_file(pkg, node);
        }

        Ok(count)
    }
}


// vim: foldmethod=marker
