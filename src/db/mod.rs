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

//! The `db` module is the database handle itself.
//!
//! A [Database] owns every interning table (packages, architectures,
//! filesystem paths), the loaded status state and its journal, the
//! fsys databases, and the trigger state. All long-lived objects live
//! in slabs on the handle and are addressed by copyable ids; dropping
//! or [Database::reset]ting the handle releases everything at once.
//!
//! ```no_run
//! use debdb::db::{Access, Database};
//! use debdb::dirs::Dirs;
//!
//! let mut db = Database::open(Dirs::from_env(), Access::ReadOnly).unwrap();
//! for (_, set) in db.sets() {
//!     println!("{}: {} installed", set.name(), set.installed_instances());
//! }
//! # drop(db);
//! ```

mod infodb;
mod pkg;
mod spec;
mod status;
mod tables;

pub use pkg::{
    pkg_name_is_illegal, Pkg, PkgBin, PkgEflag, PkgId, PkgPriority, PkgSelection, PkgSet,
    PkgStatus, RevDep, SetId, UnknownName, View,
};
pub use infodb::InfoFormat;
pub use spec::{PkgSpec, SpecFlags};
pub use tables::PkgTable;

use crate::architecture::{arch_satisfied, ArchId, ArchTable, MultiArch};
use crate::control::PkgRecord;
use crate::debug::{ColorMode, DebugFlags};
use crate::dependency::{DepKind, Dependency, Possibility};
use crate::dirs::Dirs;
use crate::errors::Result;
use crate::fsys::{DbFile, Diversion, FsysNode, FsysTable, NodeId};
use crate::triggers::{TrigAw, TrigInterest, TrigPolicy};
use nix::fcntl::Flock;
use std::collections::HashMap;
use std::fs::File;

/// How a database handle is opened: read-only, or holding the main
/// database lock for the whole read-modify-write section. The
/// non-blocking variant surfaces contention as
/// [crate::errors::ErrorKind::LockBusy] instead of waiting.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Access {
    /// Load the state, take no lock, refuse mutating operations.
    ReadOnly,

    /// Take the main lock, waiting for any current holder.
    Write,

    /// Take the main lock, failing fast if somebody else holds it.
    WriteNonBlocking,
}

impl Access {
    /// Whether this access mode may mutate on-disk state.
    pub fn writable(&self) -> bool {
        !matches!(self, Access::ReadOnly)
    }
}

/// Handle to one package database instance.
pub struct Database {
    pub(crate) dirs: Dirs,
    pub(crate) debug: DebugFlags,
    pub(crate) colors: ColorMode,
    pub(crate) access: Access,

    pub(crate) arches: ArchTable,
    pub(crate) table: PkgTable,
    pub(crate) fsys: FsysTable,

    pub(crate) diversions: Vec<Option<Diversion>>,
    pub(crate) diversions_file: DbFile,
    pub(crate) statoverride_file: DbFile,

    pub(crate) trigaws: Vec<Option<TrigAw>>,
    pub(crate) interests: Vec<Option<TrigInterest>>,
    pub(crate) named_interests: HashMap<String, Vec<(PkgId, TrigPolicy)>>,
    pub(crate) interests_file: DbFile,

    pub(crate) lock: Option<Flock<File>>,
    pub(crate) next_update: u32,
    pub(crate) journal_len: u32,

    pub(crate) info_format: Option<InfoFormat>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("dirs", &self.dirs)
            .field("access", &self.access)
            .field("sets", &self.table.set_count())
            .field("pkgs", &self.table.pkg_count())
            .field("nodes", &self.fsys.len())
            .finish()
    }
}

impl Database {
    /// Build an unloaded handle. Mostly useful to tests; ordinary
    /// callers want [Database::open].
    pub fn new(dirs: Dirs) -> Self {
        Self::with_native_arch(dirs, crate::architecture::native_arch_name())
    }

    /// Build an unloaded handle with an explicit native architecture.
    pub fn with_native_arch(dirs: Dirs, native_arch: &str) -> Self {
        Self {
            dirs,
            debug: DebugFlags::from_env(),
            colors: ColorMode::from_env(),
            access: Access::ReadOnly,
            arches: ArchTable::new(native_arch),
            table: PkgTable::new(),
            fsys: FsysTable::new(),
            diversions: vec![],
            diversions_file: DbFile::new(),
            statoverride_file: DbFile::new(),
            trigaws: vec![],
            interests: vec![],
            named_interests: HashMap::new(),
            interests_file: DbFile::new(),
            lock: None,
            next_update: 0,
            journal_len: 0,
            info_format: None,
        }
    }

    /// Open the database: take the lock (for writable access), then
    /// load and validate all persistent state -- the status snapshot
    /// and its journal, the fsys databases, and the file-trigger
    /// interests.
    pub fn open(dirs: Dirs, access: Access) -> Result<Self> {
        let mut db = Self::new(dirs);
        db.access = access;
        if access.writable() {
            db.lock_database(access == Access::WriteNonBlocking)?;
        }
        db.load_status()?;
        db.ensure_diversions()?;
        db.ensure_statoverrides(crate::fsys::StatdbParse::Lax)?;
        db.trig_file_interests_ensure()?;
        Ok(db)
    }

    /// The directory configuration of this handle.
    pub fn dirs(&self) -> &Dirs {
        &self.dirs
    }

    /// The access mode this handle was opened with.
    pub fn access(&self) -> Access {
        self.access
    }

    /// The color mode the surrounding program should use.
    pub fn colors(&self) -> ColorMode {
        self.colors
    }

    /// The selected debug classes.
    pub fn debug_flags(&self) -> DebugFlags {
        self.debug
    }

    /// The architecture registry.
    pub fn arches(&self) -> &ArchTable {
        &self.arches
    }

    /// Intern an architecture name.
    pub fn arch_find(&mut self, name: Option<&str>) -> ArchId {
        self.arches.find(name)
    }

    /// Drop the whole in-memory state: every set, instance, node,
    /// diversion, override and trigger record, in one step. On-disk
    /// state is untouched.
    pub fn reset(&mut self) {
        self.table.reset();
        self.fsys.reset();
        self.diversions.clear();
        self.trigaws.clear();
        self.interests.clear();
        self.named_interests.clear();
        self.next_update = 0;
        self.journal_len = 0;
        self.info_format = None;
    }

    // ---------- package table ----------

    /// Intern a package name.
    pub fn find_set(&mut self, name: &str) -> SetId {
        self.table.find_set(name)
    }

    /// The per-architecture instance of a name, created if absent.
    pub fn find_pkg(&mut self, name: &str, arch: ArchId) -> PkgId {
        self.table.find_pkg(name, arch)
    }

    /// The unambiguous instance of a name; see
    /// [PkgTable::find_singleton].
    pub fn find_singleton(&mut self, name: &str) -> Result<PkgId> {
        self.table.find_singleton(name, &self.arches)
    }

    /// Resolve a set id.
    pub fn set(&self, id: SetId) -> &PkgSet {
        self.table.set(id)
    }

    /// Resolve an instance id.
    pub fn pkg(&self, id: PkgId) -> &Pkg {
        self.table.pkg(id)
    }

    /// Visit every set.
    pub fn sets(&self) -> impl Iterator<Item = (SetId, &PkgSet)> {
        self.table.sets()
    }

    /// Visit every instance.
    pub fn pkgs(&self) -> impl Iterator<Item = (PkgId, &Pkg)> {
        self.table.pkgs()
    }

    /// Change an instance's status, maintaining the set's
    /// installed-instance count.
    pub fn set_pkg_status(&mut self, pkg: PkgId, status: PkgStatus) {
        self.table.set_status(pkg, status);
    }

    /// Change an instance's selection.
    pub fn set_pkg_selection(&mut self, pkg: PkgId, selection: PkgSelection) {
        self.table.pkg_mut(pkg).selection = selection;
    }

    /// The name a package is shown under: architecture-qualified when
    /// the instance is co-installable (`Multi-Arch: same`), bare
    /// otherwise.
    pub fn pkg_display_name(&self, id: PkgId) -> String {
        let pkg = self.table.pkg(id);
        let name = self.table.set(pkg.set).name();
        if pkg.installed.multiarch == MultiArch::Same {
            format!("{}:{}", name, self.arches.get(pkg.arch).name())
        } else {
            name.to_owned()
        }
    }

    // ---------- fsys table ----------

    /// Intern a filesystem path.
    pub fn find_node(&mut self, path: &str) -> NodeId {
        self.fsys.find(path)
    }

    /// Intern a filesystem path, adopting the buffer when possible.
    pub fn find_node_owned(&mut self, path: String) -> NodeId {
        self.fsys.find_owned(path)
    }

    /// Look a path up without creating it.
    pub fn lookup_node(&self, path: &str) -> Option<NodeId> {
        self.fsys.lookup(path)
    }

    /// Resolve a node id.
    pub fn node(&self, id: NodeId) -> &FsysNode {
        self.fsys.get(id)
    }

    /// Visit every interned path.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &FsysNode)> {
        self.fsys.iter()
    }

    /// Record that a package owns a path, keeping both sides of the
    /// ownership relation consistent. Idempotent.
    pub fn add_pkg_file(&mut self, pkg: PkgId, node: NodeId) {
        let node_ref = self.fsys.get_mut(node);
        if !node_ref.packages.contains(&pkg) {
            node_ref.packages.push(pkg);
        }
        let pkg_ref = self.table.pkg_mut(pkg);
        if !pkg_ref.files.contains(&node) {
            pkg_ref.files.push(node);
        }
    }

    /// Remove one package/path ownership edge, both sides.
    pub fn remove_pkg_file(&mut self, pkg: PkgId, node: NodeId) {
        self.fsys.get_mut(node).packages.retain(|p| *p != pkg);
        self.table.pkg_mut(pkg).files.retain(|n| *n != node);
    }

    // ---------- records ----------

    /// Merge a parsed record into the database, creating the instance
    /// as needed. `view` selects which binary half the record
    /// describes; status, selection and trigger state are only taken
    /// from [View::Installed] records.
    pub fn install_record(&mut self, record: &PkgRecord, view: View) -> Result<PkgId> {
        let arch = self.arches.find(record.arch.as_deref());
        let pkg_id = self.table.find_pkg(&record.name, arch);

        let bin = PkgBin {
            arch: record.arch.as_ref().map(|_| arch),
            multiarch: record.multiarch,
            essential: record.essential,
            version: record.version.clone(),
            maintainer: record.maintainer.clone(),
            description: record.description.clone(),
            source: record.source.clone(),
            installed_size: record.installed_size.clone(),
            origin: record.origin.clone(),
            bugs: record.bugs.clone(),
            conffiles: record.conffiles.clone(),
            depends: record.depends.clone(),
            arbitrary: record.arbitrary.clone(),
        };

        {
            let pkg = self.table.pkg_mut(pkg_id);
            *pkg.bin_mut(view) = bin;
        }
        self.rebind_deps(pkg_id, view);

        if view == View::Installed {
            {
                let pkg = self.table.pkg_mut(pkg_id);
                pkg.selection = record.selection;
                pkg.eflag = record.eflag;
                pkg.priority = record.priority.clone();
                pkg.section = record.section.clone();
                pkg.config_version = record.config_version.clone();
                pkg.trigpend = record.triggers_pending.clone();
            }
            self.table.set_status(pkg_id, record.status);

            // The record's awaited list replaces whatever this
            // instance awaited before.
            self.trig_drop_awaits_of(pkg_id);
            for spec in &record.triggers_awaited {
                let pend = match spec.split_once(':') {
                    Some((name, arch)) => {
                        let arch = self.arches.find(Some(arch));
                        self.table.find_pkg(name, arch)
                    }
                    None => self.table.find_singleton(spec, &self.arches)?,
                };
                self.trig_note_aw(pend, pkg_id);
            }
        }

        Ok(pkg_id)
    }

    /// Reconstruct the serializable record of one view of an
    /// instance.
    pub fn export_record(&self, id: PkgId, view: View) -> PkgRecord {
        let pkg = self.table.pkg(id);
        let bin = pkg.bin(view);

        let arch = bin
            .arch
            .or_else(|| match view {
                View::Installed => Some(pkg.arch),
                View::Available => None,
            })
            .map(|arch| self.arches.get(arch).name().to_owned())
            .filter(|name| !name.is_empty());

        let triggers_awaited = pkg
            .trigaw
            .iter()
            .filter_map(|id| self.trigaw(*id))
            .map(|aw| self.pkg_display_name(aw.pend))
            .collect();

        PkgRecord {
            name: self.table.set(pkg.set).name().to_owned(),
            arch,
            selection: pkg.selection,
            eflag: pkg.eflag,
            status: pkg.status,
            has_status: true,
            essential: bin.essential,
            multiarch: bin.multiarch,
            priority: pkg.priority.clone(),
            section: pkg.section.clone(),
            installed_size: bin.installed_size.clone(),
            origin: bin.origin.clone(),
            maintainer: bin.maintainer.clone(),
            bugs: bin.bugs.clone(),
            source: bin.source.clone(),
            version: bin.version.clone(),
            config_version: pkg.config_version.clone(),
            depends: bin.depends.clone(),
            conffiles: bin.conffiles.clone(),
            description: bin.description.clone(),
            triggers_pending: pkg.trigpend.clone(),
            triggers_awaited,
            arbitrary: bin.arbitrary.clone(),
        }
    }

    fn rebind_deps(&mut self, pkg: PkgId, view: View) {
        self.table.unbind_deps(pkg, view);
        let targets: Vec<(String, usize, usize)> = {
            let bin = self.table.pkg(pkg).bin(view);
            bin.depends
                .iter()
                .enumerate()
                .flat_map(|(dep_idx, dep)| {
                    dep.alternatives
                        .iter()
                        .enumerate()
                        .map(move |(alt_idx, alt)| (alt.package.clone(), dep_idx, alt_idx))
                })
                .collect()
        };
        for (name, dep, alt) in targets {
            let target = self.table.find_set(&name);
            self.table.bind_dep(
                target,
                RevDep {
                    pkg,
                    view,
                    dep,
                    alt,
                },
            );
        }
    }

    // ---------- dependency satisfaction ----------

    /// Evaluate one dependency possibility against one candidate
    /// instance: the name, the version constraint and the
    /// architecture qualification must all hold.
    pub fn possibility_satisfied(
        &self,
        poss: &Possibility,
        kind: DepKind,
        candidate: PkgId,
        view: View,
    ) -> bool {
        let pkg = self.table.pkg(candidate);
        let set = self.table.set(pkg.set);
        if !set.name().eq_ignore_ascii_case(&poss.package) {
            return false;
        }

        match (&poss.constraint, &pkg.bin(view).version) {
            (Some(_), None) => return false,
            (Some(constraint), Some(version)) => {
                if !constraint.satisfied_by(version) {
                    return false;
                }
            }
            (None, _) => {}
        }

        let dep_arch = poss.arch.as_deref().map(|name| {
            // The possibility's qualifier is classified against this
            // database's registry; unknown names were interned when
            // the record was bound.
            self.arches
                .iter()
                .find(|(_, arch)| arch.name() == name)
                .map(|(id, _)| id)
        });
        let dep_arch = match dep_arch {
            None => None,
            Some(Some(id)) => Some(id),
            // A qualifier we have never interned cannot match.
            Some(None) => return false,
        };

        let bin = pkg.bin(view);
        arch_satisfied(
            &self.arches,
            bin.arch.unwrap_or(pkg.arch),
            bin.multiarch,
            dep_arch,
            kind.is_negative(),
        )
    }

    /// Find an installed instance satisfying the possibility, if any.
    /// Instances that are on the system only as leftover
    /// configuration files do not count.
    pub fn possibility_provider(&self, poss: &Possibility, kind: DepKind) -> Option<PkgId> {
        let set = self.table.lookup_set(&poss.package)?;
        self.table
            .set(set)
            .instances()
            .iter()
            .copied()
            .find(|id| {
                let status = self.table.pkg(*id).status;
                status >= PkgStatus::Unpacked
                    && self.possibility_satisfied(poss, kind, *id, View::Installed)
            })
    }

    /// Evaluate a whole dependency: satisfied when any alternative
    /// has a provider.
    pub fn dependency_satisfied(&self, dep: &Dependency) -> bool {
        dep.alternatives
            .iter()
            .any(|poss| self.possibility_provider(poss, dep.kind).is_some())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::control::{parse_file, ParseTarget};

    fn db() -> Database {
        Database::with_native_arch(Dirs::new("/nonexistent"), "amd64")
    }

    fn record(input: &str) -> PkgRecord {
        let paragraphs = parse_file("status", input).unwrap();
        PkgRecord::from_paragraph("status", &paragraphs[0], ParseTarget::Status).unwrap()
    }

    #[test]
    fn install_record_creates_instance() {
        let mut db = db();
        let r = record(
            "Package: foo\nStatus: install ok installed\nArchitecture: amd64\nVersion: 1.0-1\n",
        );
        let pkg = db.install_record(&r, View::Installed).unwrap();

        assert_eq!(PkgStatus::Installed, db.pkg(pkg).status());
        let set = db.pkg(pkg).set();
        assert_eq!(1, db.set(set).installed_instances());
        assert_eq!(
            "1.0-1",
            db.pkg(pkg)
                .bin(View::Installed)
                .version
                .as_ref()
                .unwrap()
                .to_string()
        );
    }

    #[test]
    fn install_record_is_an_overlay() {
        let mut db = db();
        let pkg = db
            .install_record(
                &record("Package: foo\nStatus: install ok installed\nArchitecture: amd64\n"),
                View::Installed,
            )
            .unwrap();
        let again = db
            .install_record(
                &record("Package: foo\nStatus: deinstall ok config-files\nArchitecture: amd64\n"),
                View::Installed,
            )
            .unwrap();

        assert_eq!(pkg, again);
        assert_eq!(PkgStatus::ConfigFiles, db.pkg(pkg).status());
        assert_eq!(PkgSelection::Deinstall, db.pkg(pkg).selection());
        assert_eq!(1, db.set(db.pkg(pkg).set()).installed_instances());
    }

    #[test]
    fn export_inverts_install() {
        let mut db = db();
        let r = record(
            "\
Package: foo
Status: install ok installed
Priority: optional
Architecture: amd64
Version: 2:1.0-1
Depends: libc6 (>= 2.36)
X-Keep: me
",
        );
        let pkg = db.install_record(&r, View::Installed).unwrap();
        let exported = db.export_record(pkg, View::Installed);
        assert_eq!(r, exported);
    }

    #[test]
    fn reverse_dep_edges_bind() {
        let mut db = db();
        let r = record(
            "Package: foo\nStatus: install ok installed\nArchitecture: amd64\nDepends: libc6\n",
        );
        let pkg = db.install_record(&r, View::Installed).unwrap();

        let libc6 = db.find_set("libc6");
        let edges = db.set(libc6).depended(View::Installed);
        assert_eq!(1, edges.len());
        assert_eq!(pkg, edges[0].pkg);
    }

    #[test]
    fn ownership_relation_is_mutual() {
        let mut db = db();
        let pkg = db.find_pkg("foo", db.arches().native());
        let node = db.find_node("/usr/bin/foo");

        db.add_pkg_file(pkg, node);
        db.add_pkg_file(pkg, node);
        assert_eq!(&[pkg], db.node(node).packages());
        assert_eq!(&[node], db.pkg(pkg).files());

        db.remove_pkg_file(pkg, node);
        assert!(db.node(node).packages().is_empty());
        assert!(db.pkg(pkg).files().is_empty());
    }

    #[test]
    fn satisfaction_name_version_arch() {
        let mut db = db();
        let r = record(
            "Package: libc6\nStatus: install ok installed\nArchitecture: amd64\nVersion: 2.36-9\n",
        );
        let candidate = db.install_record(&r, View::Installed).unwrap();

        let poss = |s: &str| s.parse::<Possibility>().unwrap();

        assert!(db.possibility_satisfied(
            &poss("libc6 (>= 2.36)"),
            DepKind::Depends,
            candidate,
            View::Installed
        ));
        assert!(!db.possibility_satisfied(
            &poss("libc6 (>> 3)"),
            DepKind::Depends,
            candidate,
            View::Installed
        ));
        assert!(!db.possibility_satisfied(
            &poss("libc7"),
            DepKind::Depends,
            candidate,
            View::Installed
        ));
        assert!(db.possibility_satisfied(
            &poss("libc6:amd64"),
            DepKind::Depends,
            candidate,
            View::Installed
        ));
    }

    #[test]
    fn wildcard_arch_needs_allowed_unless_negative() {
        let mut db = db();
        let r = record(
            "Package: libc6\nStatus: install ok installed\nArchitecture: amd64\nVersion: 2.36-9\n",
        );
        let candidate = db.install_record(&r, View::Installed).unwrap();
        let poss: Possibility = "libc6:any".parse().unwrap();

        assert!(!db.possibility_satisfied(&poss, DepKind::Depends, candidate, View::Installed));
        assert!(db.possibility_satisfied(&poss, DepKind::Breaks, candidate, View::Installed));

        let r = record(
            "Package: libc6\nStatus: install ok installed\nArchitecture: amd64\nMulti-Arch: allowed\nVersion: 2.36-9\n",
        );
        let candidate = db.install_record(&r, View::Installed).unwrap();
        assert!(db.possibility_satisfied(&poss, DepKind::Depends, candidate, View::Installed));
    }

    #[test]
    fn provider_skips_config_files_leftovers() {
        let mut db = db();
        db.install_record(
            &record("Package: old\nStatus: deinstall ok config-files\nArchitecture: amd64\nVersion: 1\n"),
            View::Installed,
        )
        .unwrap();
        let poss: Possibility = "old".parse().unwrap();
        assert_eq!(None, db.possibility_provider(&poss, DepKind::Depends));
    }

    #[test]
    fn dependency_satisfied_via_alternative() {
        let mut db = db();
        db.install_record(
            &record("Package: gawk\nStatus: install ok installed\nArchitecture: amd64\nVersion: 1\n"),
            View::Installed,
        )
        .unwrap();
        let deps = Dependency::parse_list(DepKind::Depends, "mawk | gawk").unwrap();
        assert!(db.dependency_satisfied(&deps[0]));
    }

    #[test]
    fn display_name_qualifies_multiarch_same() {
        let mut db = db();
        let pkg = db
            .install_record(
                &record(
                    "Package: libx\nStatus: install ok installed\nArchitecture: amd64\nMulti-Arch: same\nVersion: 1\n",
                ),
                View::Installed,
            )
            .unwrap();
        assert_eq!("libx:amd64", db.pkg_display_name(pkg));

        let plain = db
            .install_record(
                &record("Package: tool\nStatus: install ok installed\nArchitecture: amd64\nVersion: 1\n"),
                View::Installed,
            )
            .unwrap();
        assert_eq!("tool", db.pkg_display_name(plain));
    }

    #[test]
    fn triggers_awaited_links_records() {
        let mut db = db();
        db.install_record(
            &record("Package: pend\nStatus: install ok triggers-pending\nArchitecture: amd64\nTriggers-Pending: ldconfig\n"),
            View::Installed,
        )
        .unwrap();
        let aw = db
            .install_record(
                &record("Package: waiter\nStatus: install ok triggers-awaited\nArchitecture: amd64\nTriggers-Awaited: pend\n"),
                View::Installed,
            )
            .unwrap();

        assert_eq!(1, db.pkg(aw).awaited_triggers().len());
        let exported = db.export_record(aw, View::Installed);
        assert_eq!(vec!["pend".to_owned()], exported.triggers_awaited);
    }

    #[test]
    fn reset_drops_all_state() {
        let mut db = db();
        db.install_record(
            &record("Package: foo\nStatus: install ok installed\nArchitecture: amd64\n"),
            View::Installed,
        )
        .unwrap();
        db.find_node("/usr/bin/foo");
        db.reset();
        assert_eq!(0, db.sets().count());
        assert_eq!(0, db.nodes().count());
    }
}

// vim: foldmethod=marker
