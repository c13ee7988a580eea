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

//! The `triggers` module implements the deferred-work machinery by
//! which one package asks another to run post-install processing.
//!
//! A trigger is either a name (`ldconfig`) or an absolute path prefix
//! (`/usr/share/man`). Packages declare *interests*; activating a
//! trigger marks every interested package `triggers-pending` and,
//! unless the interest is `noawait`, makes the activating package an
//! *awaiter* that stays `triggers-awaited` until the interested
//! package's processing completes.
//!
//! Two stores persist across runs: the file-trigger interests
//! (`triggers/File`) and the deferred activations
//! (`triggers/Unincorp`), both rewritten atomically under the
//! dedicated triggers lock.

mod ci;
mod deferred;
mod interests;

pub use ci::{parse_ci, TrigCiCommand};
pub use deferred::{
    trigdef_update_start, DeferredFlags, DeferredHandler, DeferredStart, DeferredUpdate,
    DeferredWriter,
};

use crate::db::{Database, PkgId, PkgStatus};
use crate::errors::Result;
use crate::fsys::NodeId;

/// Stable handle to an awaited-trigger record.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TrigAwId(pub(crate) usize);

/// Record that package `pend` has a trigger whose completion package
/// `aw` must wait for. Linked from both sides: `aw`'s awaited list
/// and `pend`'s awaiter list.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TrigAw {
    /// The awaiter: fully configured except for this wait.
    pub aw: PkgId,

    /// The package that has the trigger queued.
    pub pend: PkgId,
}

/// Stable handle to a file-trigger interest record.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct InterestId(pub(crate) usize);

/// Whether activating an interest makes the activator wait.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum TrigPolicy {
    /// The activating package awaits the processing (the default).
    #[default]
    Await,

    /// Fire and forget.
    NoAwait,
}

impl TrigPolicy {
    /// The `/await` / `/noawait` suffix spelling.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Await => "await",
            Self::NoAwait => "noawait",
        }
    }
}

/// One file-trigger interest: a package watching a path prefix.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TrigInterest {
    /// The watched path's node.
    pub node: NodeId,

    /// The interested package.
    pub pkg: PkgId,

    /// Await policy for activators.
    pub policy: TrigPolicy,
}

/// Check a trigger name for legality: non-empty, printable ASCII, no
/// spaces or control characters. Returns a human-readable reason when
/// the name may not be used. File triggers are absolute paths and are
/// not subject to this rule.
pub fn trig_name_is_illegal(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        return Some("empty trigger names are not permitted");
    }
    for byte in name.bytes() {
        if byte <= b' ' || byte >= 0x7f {
            return Some("trigger name contains invalid character");
        }
    }
    None
}

impl Database {
    /// The package a maintainer-script invocation is acting for,
    /// resolved from the `DPKG_MAINTSCRIPT_PACKAGE` and
    /// `DPKG_MAINTSCRIPT_ARCH` environment the package manager sets.
    /// This is the awaiter a trigger tool running from such a script
    /// should record. `None` when the environment is not set.
    pub fn maintscript_awaiter(&mut self) -> Result<Option<PkgId>> {
        let Ok(name) = std::env::var("DPKG_MAINTSCRIPT_PACKAGE") else {
            return Ok(None);
        };
        let pkg = match std::env::var("DPKG_MAINTSCRIPT_ARCH") {
            Ok(arch) if !arch.is_empty() => {
                let arch = self.arches.find(Some(arch.as_str()));
                self.table.find_pkg(&name, arch)
            }
            _ => self.table.find_singleton(&name, &self.arches)?,
        };
        Ok(Some(pkg))
    }

    /// Resolve an awaited-trigger record, `None` when it has been
    /// cancelled.
    pub fn trigaw(&self, id: TrigAwId) -> Option<&TrigAw> {
        self.trigaws.get(id.0)?.as_ref()
    }

    /// Resolve a file-trigger interest, `None` when removed.
    pub fn interest(&self, id: InterestId) -> Option<&TrigInterest> {
        self.interests.get(id.0)?.as_ref()
    }

    /// Note that `trig` is pending on `pend`, transitioning its
    /// status. Idempotent: returns false when already noted.
    pub fn trig_note_pend(&mut self, pend: PkgId, trig: &str) -> bool {
        if self.pkg(pend).trigpend.iter().any(|t| t == trig) {
            return false;
        }
        self.table.pkg_mut(pend).trigpend.push(trig.to_owned());

        let status = if self.pkg(pend).trigaw.is_empty() {
            PkgStatus::TriggersPending
        } else {
            PkgStatus::TriggersAwaited
        };
        self.table.set_status(pend, status);
        tracing::debug!(target: "debdb::triggers", pend = pend.0, trig, "noted pending trigger");
        true
    }

    /// Note that `aw` awaits trigger processing by `pend`, linking
    /// the record into both sides' lists. Idempotent: returns false
    /// when already noted.
    pub fn trig_note_aw(&mut self, pend: PkgId, aw: PkgId) -> bool {
        // Search through aw's list because that's probably shorter.
        if self
            .pkg(aw)
            .trigaw
            .iter()
            .filter_map(|id| self.trigaw(*id))
            .any(|rec| rec.pend == pend)
        {
            return false;
        }

        let id = TrigAwId(self.trigaws.len());
        self.trigaws.push(Some(TrigAw { aw, pend }));
        self.table.pkg_mut(aw).trigaw.push(id);
        self.table.pkg_mut(pend).othertrigaw.push(id);
        true
    }

    /// Cancel at most one awaited-trigger relation between `aw` and
    /// `pend`, leaving every other relation of either package
    /// untouched. Returns false when none existed.
    pub fn trig_del_aw(&mut self, aw: PkgId, pend: PkgId) -> bool {
        let found = self
            .pkg(aw)
            .trigaw
            .iter()
            .copied()
            .find(|id| matches!(self.trigaw(*id), Some(rec) if rec.pend == pend));
        let Some(id) = found else {
            return false;
        };
        self.trigaws[id.0] = None;
        self.table.pkg_mut(aw).trigaw.retain(|t| *t != id);
        self.table.pkg_mut(pend).othertrigaw.retain(|t| *t != id);
        true
    }

    // Remove every record where `aw` is the awaiter; used when a
    // record overlay replaces the awaited list wholesale.
    pub(crate) fn trig_drop_awaits_of(&mut self, aw: PkgId) {
        let ids: Vec<TrigAwId> = self.pkg(aw).trigaw.clone();
        for id in ids {
            if let Some(rec) = self.trigaws[id.0].take() {
                self.table.pkg_mut(rec.pend).othertrigaw.retain(|t| *t != id);
            }
        }
        self.table.pkg_mut(aw).trigaw.clear();
    }

    /// Release every awaiter of `notpend`, which has no pending
    /// triggers left. Each awaiter whose last await this was
    /// transitions out of `triggers-awaited`.
    pub fn trig_clear_awaiters(&mut self, notpend: PkgId) {
        if !self.pkg(notpend).trigpend.is_empty() {
            crate::errors::internerr!(
                "clearing awaiters of a package that still has pending triggers"
            );
        }

        let ids: Vec<TrigAwId> = self.pkg(notpend).othertrigaw.clone();
        for id in ids {
            let Some(rec) = self.trigaws[id.0].take() else {
                continue;
            };
            self.table.pkg_mut(rec.aw).trigaw.retain(|t| *t != id);

            let aw = self.pkg(rec.aw);
            if aw.trigaw.is_empty() && aw.status() == PkgStatus::TriggersAwaited {
                let status = if aw.trigpend.is_empty() {
                    PkgStatus::Installed
                } else {
                    PkgStatus::TriggersPending
                };
                self.table.set_status(rec.aw, status);
            }
        }
        self.table.pkg_mut(notpend).othertrigaw.clear();
    }

    /// Mark one pending trigger of `pend` as processed. When it was
    /// the last one, the package leaves `triggers-pending` and its
    /// awaiters are released.
    pub fn trig_pend_done(&mut self, pend: PkgId, trig: &str) -> bool {
        let had = {
            let pkg = self.table.pkg_mut(pend);
            let before = pkg.trigpend.len();
            pkg.trigpend.retain(|t| t != trig);
            before != pkg.trigpend.len()
        };
        if !had {
            return false;
        }
        if self.pkg(pend).trigpend.is_empty() {
            let status = if self.pkg(pend).trigaw.is_empty() {
                PkgStatus::Installed
            } else {
                PkgStatus::TriggersAwaited
            };
            self.table.set_status(pend, status);
            self.trig_clear_awaiters(pend);
        }
        true
    }

    fn trig_record_activation(
        &mut self,
        pend: PkgId,
        aw: Option<PkgId>,
        trig: &str,
        policy: TrigPolicy,
    ) {
        if policy == TrigPolicy::Await {
            if let Some(aw) = aw {
                self.trig_note_aw(pend, aw);
                if self.pkg(aw).status() > PkgStatus::TriggersAwaited {
                    self.table.set_status(aw, PkgStatus::TriggersAwaited);
                }
            }
        }
        self.trig_note_pend(pend, trig);
    }

    /// Activate a trigger in memory: a named trigger fires the
    /// packages interested in that name, an absolute path fires the
    /// file-trigger interests of the path and of every ancestor
    /// prefix. Returns how many interested packages were activated.
    pub fn trig_activate(&mut self, trig: &str, aw: Option<PkgId>) -> Result<usize> {
        if trig.starts_with('/') {
            return Ok(self.trig_path_activate(trig, aw));
        }

        if let Some(reason) = trig_name_is_illegal(trig) {
            return Err(crate::errors::Error::new(
                crate::errors::ErrorKind::Parse(crate::errors::ParseReason::BadControlName),
                format!("invalid trigger name '{}': {}", trig, reason),
            ));
        }

        let interested = self
            .named_interests
            .get(trig)
            .cloned()
            .unwrap_or_default();
        for (pend, policy) in &interested {
            self.trig_record_activation(*pend, aw, trig, *policy);
        }
        Ok(interested.len())
    }

    /// Activate the file-trigger interests matching a path or any of
    /// its ancestor prefixes. The trigger recorded on the interested
    /// package is the interest's own path, not the activating one.
    pub fn trig_path_activate(&mut self, path: &str, aw: Option<PkgId>) -> usize {
        let mut activated = 0;

        let mut prefix = path.trim_end_matches('/');
        loop {
            if let Some(node) = self.fsys.lookup(prefix) {
                let matches: Vec<(PkgId, TrigPolicy, String)> = self
                    .fsys
                    .get(node)
                    .interests
                    .iter()
                    .filter_map(|id| self.interest(*id))
                    .map(|interest| {
                        (
                            interest.pkg,
                            interest.policy,
                            self.fsys.get(interest.node).name().to_owned(),
                        )
                    })
                    .collect();
                for (pend, policy, trig) in matches {
                    self.trig_record_activation(pend, aw, &trig, policy);
                    activated += 1;
                }
            }

            let Some(cut) = prefix.rfind('/') else {
                break;
            };
            if cut == 0 {
                break;
            }
            prefix = &prefix[..cut];
        }

        activated
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::db::Database;
    use crate::dirs::Dirs;

    macro_rules! check_trig_name {
        ($name:ident, $trig:expr, $legal:expr) => {
            #[test]
            fn $name() {
                assert_eq!($legal, trig_name_is_illegal($trig).is_none());
            }
        };
    }

    check_trig_name!(simple_name, "ldconfig", true);
    check_trig_name!(with_slash_colon, "lib:dir/updates", true);
    check_trig_name!(empty_name, "", false);
    check_trig_name!(with_space, "a b", false);
    check_trig_name!(with_control, "a\tb", false);
    check_trig_name!(with_high_bit, "caf\u{e9}", false);

    fn db() -> Database {
        Database::with_native_arch(Dirs::new("/nonexistent"), "amd64")
    }

    fn installed(db: &mut Database, name: &str) -> PkgId {
        let native = db.arches().native();
        let pkg = db.find_pkg(name, native);
        db.set_pkg_status(pkg, PkgStatus::Installed);
        pkg
    }

    #[test]
    fn note_pend_transitions_and_is_idempotent() {
        let mut db = db();
        let pend = installed(&mut db, "interested");

        assert!(db.trig_note_pend(pend, "ldconfig"));
        assert!(!db.trig_note_pend(pend, "ldconfig"));
        assert_eq!(PkgStatus::TriggersPending, db.pkg(pend).status());
        assert_eq!(&["ldconfig".to_owned()], db.pkg(pend).pending_triggers());
    }

    #[test]
    fn note_aw_links_both_sides() {
        let mut db = db();
        let pend = installed(&mut db, "processor");
        let aw = installed(&mut db, "waiter");

        assert!(db.trig_note_aw(pend, aw));
        assert!(!db.trig_note_aw(pend, aw));

        assert_eq!(1, db.pkg(aw).awaited_triggers().len());
        assert_eq!(1, db.pkg(pend).awaiters().len());
        let rec = db.trigaw(db.pkg(aw).awaited_triggers()[0]).unwrap();
        assert_eq!(aw, rec.aw);
        assert_eq!(pend, rec.pend);
    }

    #[test]
    fn del_aw_cancels_exactly_one_relation() {
        let mut db = db();
        let pend_a = installed(&mut db, "a");
        let pend_b = installed(&mut db, "b");
        let aw = installed(&mut db, "waiter");

        db.trig_note_aw(pend_a, aw);
        db.trig_note_aw(pend_b, aw);

        assert!(db.trig_del_aw(aw, pend_a));
        assert!(!db.trig_del_aw(aw, pend_a));
        assert_eq!(1, db.pkg(aw).awaited_triggers().len());
        assert!(db.pkg(pend_a).awaiters().is_empty());
        assert_eq!(1, db.pkg(pend_b).awaiters().len());
    }

    #[test]
    fn clear_awaiters_releases_waiters() {
        let mut db = db();
        let pend = installed(&mut db, "processor");
        let aw = installed(&mut db, "waiter");

        db.trig_record_activation(pend, Some(aw), "ldconfig", TrigPolicy::Await);
        assert_eq!(PkgStatus::TriggersAwaited, db.pkg(aw).status());
        assert_eq!(PkgStatus::TriggersPending, db.pkg(pend).status());

        // Processing completes.
        assert!(db.trig_pend_done(pend, "ldconfig"));
        assert_eq!(PkgStatus::Installed, db.pkg(pend).status());
        assert_eq!(PkgStatus::Installed, db.pkg(aw).status());
        assert!(db.pkg(aw).awaited_triggers().is_empty());
    }

    #[test]
    fn awaiter_with_own_pending_goes_to_pending() {
        let mut db = db();
        let pend = installed(&mut db, "processor");
        let aw = installed(&mut db, "waiter");

        db.trig_note_pend(aw, "self-trigger");
        db.trig_record_activation(pend, Some(aw), "ldconfig", TrigPolicy::Await);
        assert_eq!(PkgStatus::TriggersAwaited, db.pkg(aw).status());

        db.trig_pend_done(pend, "ldconfig");
        assert_eq!(PkgStatus::TriggersPending, db.pkg(aw).status());
    }

    #[test]
    fn noawait_activation_leaves_activator_alone() {
        let mut db = db();
        let pend = installed(&mut db, "processor");
        let aw = installed(&mut db, "activator");

        db.trig_record_activation(pend, Some(aw), "ldconfig", TrigPolicy::NoAwait);
        assert_eq!(PkgStatus::Installed, db.pkg(aw).status());
        assert_eq!(PkgStatus::TriggersPending, db.pkg(pend).status());
        assert!(db.pkg(aw).awaited_triggers().is_empty());
    }

    #[test]
    fn path_activation_matches_ancestor_prefixes() {
        let mut db = db();
        let interested = installed(&mut db, "doc-tool");
        let aw = installed(&mut db, "shipper");

        db.trig_file_interest_add("/usr/share/help", interested, TrigPolicy::Await)
            .unwrap();

        let hits = db.trig_path_activate("/usr/share/help/foo", Some(aw));
        assert_eq!(1, hits);
        assert_eq!(PkgStatus::TriggersPending, db.pkg(interested).status());
        assert_eq!(PkgStatus::TriggersAwaited, db.pkg(aw).status());
        assert_eq!(
            &["/usr/share/help".to_owned()],
            db.pkg(interested).pending_triggers()
        );
    }

    #[test]
    fn named_activation_uses_interest_table() {
        let mut db = db();
        let interested = installed(&mut db, "glibc");
        db.named_interests
            .insert("ldconfig".to_owned(), vec![(interested, TrigPolicy::NoAwait)]);

        assert_eq!(1, db.trig_activate("ldconfig", None).unwrap());
        assert_eq!(PkgStatus::TriggersPending, db.pkg(interested).status());
    }

    #[test]
    fn bad_named_trigger_errors() {
        let mut db = db();
        assert!(db.trig_activate("bad name", None).is_err());
    }
}

// vim: foldmethod=marker
