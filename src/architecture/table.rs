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

use super::{arch_name_is_illegal, Arch, ArchId, ArchKind};
use std::collections::HashMap;

// Builtin slots, in seeding order.
const NONE: ArchId = ArchId(0);
const EMPTY: ArchId = ArchId(1);
const ALL: ArchId = ArchId(2);
const NATIVE: ArchId = ArchId(3);
const ANY: ArchId = ArchId(4);

/// Interning registry of architecture names.
///
/// The table is seeded with the pseudo-entries (`none`, `empty`), the
/// wildcard `any`, `all`, and the native architecture; every other
/// name is interned on first lookup and classified as foreign or
/// illegal. Lookups always succeed -- classification, not rejection, is
/// how bad names surface, so that a specifier error can still name the
/// offending architecture.
#[derive(Clone, Debug)]
pub struct ArchTable {
    arches: Vec<Arch>,
    by_name: HashMap<String, ArchId>,
}

impl ArchTable {
    /// Create a table with the given native architecture name.
    pub fn new(native: &str) -> Self {
        let mut table = Self {
            arches: vec![],
            by_name: HashMap::new(),
        };

        table.seed("", ArchKind::None);
        table.seed("", ArchKind::Empty);
        table.seed("all", ArchKind::All);
        table.seed(native, ArchKind::Native);
        table.seed("any", ArchKind::Wildcard);

        table
    }

    fn seed(&mut self, name: &str, kind: ArchKind) -> ArchId {
        let id = ArchId(self.arches.len());
        self.arches.push(Arch {
            name: name.to_owned(),
            kind,
        });
        if !name.is_empty() {
            self.by_name.insert(name.to_owned(), id);
        }
        id
    }

    /// The "no architecture given" pseudo-entry.
    pub fn none(&self) -> ArchId {
        NONE
    }

    /// The "explicitly empty architecture" pseudo-entry.
    pub fn empty(&self) -> ArchId {
        EMPTY
    }

    /// The `all` architecture.
    pub fn all(&self) -> ArchId {
        ALL
    }

    /// The native architecture of this database instance.
    pub fn native(&self) -> ArchId {
        NATIVE
    }

    /// The `any` wildcard.
    pub fn any(&self) -> ArchId {
        ANY
    }

    /// Intern a name, creating and classifying it on first sight.
    /// `None` means "no architecture given" and maps to the pseudo
    /// entry, as does an explicitly empty name.
    pub fn find(&mut self, name: Option<&str>) -> ArchId {
        let Some(name) = name else {
            return NONE;
        };
        if name.is_empty() {
            return EMPTY;
        }

        if let Some(id) = self.by_name.get(name) {
            return *id;
        }

        let kind = if arch_name_is_illegal(name).is_none() {
            ArchKind::Foreign
        } else {
            ArchKind::Illegal
        };
        let id = ArchId(self.arches.len());
        self.arches.push(Arch {
            name: name.to_owned(),
            kind,
        });
        self.by_name.insert(name.to_owned(), id);
        id
    }

    /// Resolve an id issued by this table.
    pub fn get(&self, id: ArchId) -> &Arch {
        &self.arches[id.0]
    }

    /// Iterate every interned entry, builtins included.
    pub fn iter(&self) -> impl Iterator<Item = (ArchId, &Arch)> {
        self.arches
            .iter()
            .enumerate()
            .map(|(idx, arch)| (ArchId(idx), arch))
    }
}


// vim: foldmethod=marker
