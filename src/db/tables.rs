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

use super::pkg::{Pkg, PkgId, PkgSet, PkgStatus, SetId};
use crate::architecture::{ArchId, ArchKind, ArchTable};
use crate::errors::{Error, ErrorKind, Result};
use std::collections::HashMap;

/// Interning table of package names and their per-architecture
/// instances.
///
/// Names are compared case-insensitively and canonicalized to lower
/// case on first sight. Interning is idempotent: the same name always
/// resolves to the same [SetId], and a (name, architecture) pair to
/// the same [PkgId], until [PkgTable::reset].
#[derive(Clone, Debug, Default)]
pub struct PkgTable {
    sets: Vec<PkgSet>,
    pkgs: Vec<Pkg>,
    by_name: HashMap<String, SetId>,
}

impl PkgTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct package names.
    pub fn set_count(&self) -> usize {
        self.sets.len()
    }

    /// Number of package instances across all names.
    pub fn pkg_count(&self) -> usize {
        self.pkgs.len()
    }

    /// Intern a name, creating its (instance-less) set on first
    /// sight.
    pub fn find_set(&mut self, name: &str) -> SetId {
        let canonical = name.to_ascii_lowercase();
        if let Some(id) = self.by_name.get(&canonical) {
            return *id;
        }
        let id = SetId(self.sets.len());
        self.by_name.insert(canonical.clone(), id);
        self.sets.push(PkgSet::new(canonical));
        id
    }

    /// Look a name up without creating it.
    pub fn lookup_set(&self, name: &str) -> Option<SetId> {
        self.by_name.get(&name.to_ascii_lowercase()).copied()
    }

    /// The per-architecture instance of a name, created if absent.
    pub fn find_pkg(&mut self, name: &str, arch: ArchId) -> PkgId {
        let set = self.find_set(name);
        self.find_pkg_in_set(set, arch)
    }

    /// The per-architecture instance within a known set, created if
    /// absent.
    pub fn find_pkg_in_set(&mut self, set: SetId, arch: ArchId) -> PkgId {
        if let Some(id) = self.sets[set.0]
            .pkgs
            .iter()
            .find(|id| self.pkgs[id.0].arch == arch)
        {
            return *id;
        }

        let id = PkgId(self.pkgs.len());
        self.pkgs.push(Pkg::new(set, arch));
        self.sets[set.0].pkgs.push(id);
        id
    }

    /// The unambiguous instance of a name.
    ///
    /// With one installed instance, that instance. With none, the
    /// candidate whose available half is native or `all` (or, failing
    /// that, the first instance, creating a none-architecture one for
    /// a previously unseen name). With more than one installed
    /// instance the name is ambiguous and this fails.
    pub fn find_singleton(&mut self, name: &str, arches: &ArchTable) -> Result<PkgId> {
        let set_id = self.find_set(name);

        match self.sets[set_id.0].installed_instances {
            0 => {
                for id in &self.sets[set_id.0].pkgs {
                    let available_arch = self.pkgs[id.0].available.arch;
                    if let Some(arch) = available_arch {
                        if matches!(
                            arches.get(arch).kind(),
                            ArchKind::Native | ArchKind::All
                        ) {
                            return Ok(*id);
                        }
                    }
                }
                if let Some(id) = self.sets[set_id.0].pkgs.first() {
                    return Ok(*id);
                }
                Ok(self.find_pkg_in_set(set_id, arches.none()))
            }
            1 => {
                let id = self.sets[set_id.0]
                    .pkgs
                    .iter()
                    .find(|id| self.pkgs[id.0].status != PkgStatus::NotInstalled);
                match id {
                    Some(id) => Ok(*id),
                    None => crate::errors::internerr!(
                        "set '{}' counts an installed instance but has none",
                        name
                    ),
                }
            }
            _ => Err(Error::new(
                ErrorKind::AmbiguousPackage,
                format!(
                    "ambiguous package name '{}' with more than one installed instance",
                    name
                ),
            )),
        }
    }

    /// Resolve a set id.
    pub fn set(&self, id: SetId) -> &PkgSet {
        &self.sets[id.0]
    }

    pub(crate) fn set_mut(&mut self, id: SetId) -> &mut PkgSet {
        &mut self.sets[id.0]
    }

    /// Resolve an instance id.
    pub fn pkg(&self, id: PkgId) -> &Pkg {
        &self.pkgs[id.0]
    }

    pub(crate) fn pkg_mut(&mut self, id: PkgId) -> &mut Pkg {
        &mut self.pkgs[id.0]
    }

    /// Change an instance's status, maintaining the owning set's
    /// installed-instance count.
    pub fn set_status(&mut self, id: PkgId, status: PkgStatus) {
        let pkg = &mut self.pkgs[id.0];
        let was_installed = pkg.status != PkgStatus::NotInstalled;
        let is_installed = status != PkgStatus::NotInstalled;
        pkg.status = status;

        let set = &mut self.sets[pkg.set.0];
        match (was_installed, is_installed) {
            (false, true) => set.installed_instances += 1,
            (true, false) => {
                if set.installed_instances == 0 {
                    crate::errors::internerr!(
                        "installed instance count for '{}' would go negative",
                        set.name
                    );
                }
                set.installed_instances -= 1;
            }
            _ => {}
        }
    }

    // Drop every inbound dependency edge contributed by one view of
    // one instance; used before the view's dependency list changes.
    pub(crate) fn unbind_deps(&mut self, pkg: PkgId, view: super::pkg::View) {
        for set in &mut self.sets {
            match view {
                super::pkg::View::Installed => {
                    set.depended_installed.retain(|rd| rd.pkg != pkg)
                }
                super::pkg::View::Available => {
                    set.depended_available.retain(|rd| rd.pkg != pkg)
                }
            }
        }
    }

    pub(crate) fn bind_dep(&mut self, target: SetId, edge: super::pkg::RevDep) {
        let set = &mut self.sets[target.0];
        match edge.view {
            super::pkg::View::Installed => set.depended_installed.push(edge),
            super::pkg::View::Available => set.depended_available.push(edge),
        }
    }

    /// Visit every set exactly once, in unspecified order.
    pub fn sets(&self) -> impl Iterator<Item = (SetId, &PkgSet)> {
        self.sets
            .iter()
            .enumerate()
            .map(|(idx, set)| (SetId(idx), set))
    }

    /// Visit every instance exactly once, in unspecified order.
    pub fn pkgs(&self) -> impl Iterator<Item = (PkgId, &Pkg)> {
        self.pkgs
            .iter()
            .enumerate()
            .map(|(idx, pkg)| (PkgId(idx), pkg))
    }

    /// Drop every entry.
    pub fn reset(&mut self) {
        self.sets.clear();
        self.pkgs.clear();
        self.by_name.clear();
    }
}


// vim: foldmethod=marker
