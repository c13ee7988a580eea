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

use super::statoverride::FileStat;
use super::DivertId;
use crate::db::PkgId;
use crate::triggers::InterestId;
use std::collections::HashMap;

/// Stable handle to an interned filesystem path.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// One tracked filesystem object, keyed by its canonical absolute
/// path. The node is the meeting point of everything the database
/// knows about the path: owning packages, an applied diversion, a
/// stat override, content digests, and file-trigger interests.
#[derive(Clone, Debug, Default)]
pub struct FsysNode {
    pub(crate) name: String,
    pub(crate) divert: Option<DivertId>,
    pub(crate) statoverride: Option<FileStat>,
    pub(crate) packages: Vec<PkgId>,
    pub(crate) current_hash: Option<String>,
    pub(crate) new_hash: Option<String>,
    pub(crate) link_fingerprint: Option<String>,
    pub(crate) interests: Vec<InterestId>,
}

impl FsysNode {
    /// Canonical path: exactly one leading `/`, no `./` runs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The diversion involving this path, if any.
    pub fn diversion(&self) -> Option<DivertId> {
        self.divert
    }

    /// The stat override applied to this path, if any.
    pub fn statoverride(&self) -> Option<&FileStat> {
        self.statoverride.as_ref()
    }

    /// Packages owning this path.
    pub fn packages(&self) -> &[PkgId] {
        &self.packages
    }

    /// Digest of the content currently on disk, as recorded in the
    /// owning package's md5sums file.
    pub fn current_hash(&self) -> Option<&str> {
        self.current_hash.as_deref()
    }

    /// Digest of the incoming content during an unpack.
    pub fn new_hash(&self) -> Option<&str> {
        self.new_hash.as_deref()
    }

    /// Symlink target or device fingerprint, when the object is not a
    /// regular file.
    pub fn link_fingerprint(&self) -> Option<&str> {
        self.link_fingerprint.as_deref()
    }

    /// File-trigger interests attached to this path.
    pub fn interests(&self) -> &[InterestId] {
        &self.interests
    }
}

// Strip leading '/' runs and './' pairs; what remains is the key.
fn skip_slash_dotslash(mut path: &str) -> &str {
    loop {
        let trimmed = path.trim_start_matches('/');
        path = match trimmed.strip_prefix("./") {
            Some(rest) => rest,
            None => return trimmed,
        };
    }
}

/// Interning table of tracked filesystem paths.
///
/// Lookup keys are compared after stripping leading `/` and `./`
/// runs; stored names always begin with exactly one `/`. Interning is
/// idempotent: the same canonical path always resolves to the same
/// [NodeId] until [FsysTable::reset].
#[derive(Clone, Debug, Default)]
pub struct FsysTable {
    nodes: Vec<FsysNode>,
    by_path: HashMap<String, NodeId>,
}

impl FsysTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of interned paths.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Intern a path, creating the node on first sight.
    pub fn find(&mut self, path: &str) -> NodeId {
        let key = skip_slash_dotslash(path);
        if let Some(id) = self.by_path.get(key) {
            return *id;
        }
        self.insert(format!("/{}", key))
    }

    /// Intern a path the caller already owns. When the buffer is
    /// already in canonical form it is adopted without copying, which
    /// matters during bulk list-file loads.
    pub fn find_owned(&mut self, path: String) -> NodeId {
        let key = skip_slash_dotslash(&path);
        if let Some(id) = self.by_path.get(key) {
            return *id;
        }
        // Adoptable iff canonicalization would be a no-op.
        if path.len() == key.len() + 1 && path.starts_with('/') {
            self.insert(path)
        } else {
            self.insert(format!("/{}", key))
        }
    }

    /// Look a path up without creating it.
    pub fn lookup(&self, path: &str) -> Option<NodeId> {
        self.by_path.get(skip_slash_dotslash(path)).copied()
    }

    fn insert(&mut self, canonical: String) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.by_path.insert(canonical[1..].to_owned(), id);
        self.nodes.push(FsysNode {
            name: canonical,
            ..Default::default()
        });
        id
    }

    /// Resolve an id issued by this table.
    pub fn get(&self, id: NodeId) -> &FsysNode {
        &self.nodes[id.0]
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut FsysNode {
        &mut self.nodes[id.0]
    }

    /// Visit every live node exactly once, in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &FsysNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (NodeId(idx), node))
    }

    /// Drop every node.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.by_path.clear();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn canonicalizes_on_intern() {
        let mut table = FsysTable::new();
        let id = table.find("usr/bin/ls");
        assert_eq!("/usr/bin/ls", table.get(id).name());
    }

    #[test]
    fn equivalent_spellings_intern_to_one_node() {
        let mut table = FsysTable::new();
        let a = table.find("/usr/bin/ls");
        let b = table.find("usr/bin/ls");
        let c = table.find("//usr/bin/ls");
        let d = table.find("/./usr/bin/ls");
        let e = table.find("././//./usr/bin/ls");
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a, d);
        assert_eq!(a, e);
        assert_eq!(1, table.len());
    }

    #[test]
    fn find_is_idempotent() {
        let mut table = FsysTable::new();
        let first = table.find("/etc/passwd");
        let second = table.find("/etc/passwd");
        assert_eq!(first, second);
    }

    #[test]
    fn owned_admission_keeps_canonical_buffer() {
        let mut table = FsysTable::new();
        let id = table.find_owned("/etc/hosts".to_owned());
        assert_eq!("/etc/hosts", table.get(id).name());
        assert_eq!(id, table.find("/etc/hosts"));

        let id = table.find_owned("./etc/motd".to_owned());
        assert_eq!("/etc/motd", table.get(id).name());
    }

    #[test]
    fn lookup_does_not_create() {
        let mut table = FsysTable::new();
        assert_eq!(None, table.lookup("/nonexistent"));
        let id = table.find("/present");
        assert_eq!(Some(id), table.lookup("present"));
    }

    #[test]
    fn iter_visits_each_once() {
        let mut table = FsysTable::new();
        table.find("/a");
        table.find("/b");
        table.find("/c");
        let names: Vec<_> = table.iter().map(|(_, n)| n.name().to_owned()).collect();
        assert_eq!(3, names.len());
        assert!(names.contains(&"/a".to_owned()));
    }

    #[test]
    fn reset_drops_everything() {
        let mut table = FsysTable::new();
        table.find("/a");
        table.reset();
        assert!(table.is_empty());
        assert_eq!(None, table.lookup("/a"));
    }
}

// vim: foldmethod=marker
