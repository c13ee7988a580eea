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

use crate::architecture::{ArchId, MultiArch};
use crate::control::Conffile;
use crate::dependency::Dependency;
use crate::fsys::NodeId;
use crate::triggers::{InterestId, TrigAwId};
use crate::version::Version;
use std::str::FromStr;

/// Stable handle to a package set (the architecture-independent
/// identity of a package name).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SetId(pub(crate) usize);

/// Stable handle to one architectural instance of a package.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PkgId(pub(crate) usize);

/// Which half of a package's binary metadata an operation refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum View {
    /// The metadata of the unpacked/installed artifact.
    Installed,

    /// The metadata from the `available` file.
    Available,
}

/// Raised by the `FromStr` impls of the package enumerations when the
/// value is not in the respective name table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UnknownName;
crate::errors::error_enum!(UnknownName);

macro_rules! name_table {
    ($type:ident, $( ($variant:ident, $name:expr) ),* ) => {
        impl $type {
            /// Canonical on-disk spelling.
            pub fn as_str(&self) -> &str {
                match self {
                    $( Self::$variant => $name, )*
                }
            }
        }

        impl FromStr for $type {
            type Err = UnknownName;

            fn from_str(value: &str) -> Result<Self, UnknownName> {
                match value {
                    $( $name => Ok(Self::$variant), )*
                    _ => Err(UnknownName),
                }
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }
    };
}

/// What the administrator wants done with a package; the first token
/// of the `Status:` field.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PkgSelection {
    /// No selection has been recorded.
    #[default]
    Unknown,

    /// The package is selected for installation.
    Install,

    /// The package is held at its current version.
    Hold,

    /// The package is selected for removal, configuration kept.
    Deinstall,

    /// The package is selected for removal including configuration.
    Purge,
}
name_table!(
    PkgSelection,
    (Unknown, "unknown"),
    (Install, "install"),
    (Hold, "hold"),
    (Deinstall, "deinstall"),
    (Purge, "purge")
);

/// Error condition of a package; the second token of the `Status:`
/// field.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PkgEflag {
    /// Nothing is wrong.
    #[default]
    Ok,

    /// The package is broken and must be reinstalled before anything
    /// else can be done with it.
    Reinstreq,
}
name_table!(PkgEflag, (Ok, "ok"), (Reinstreq, "reinstreq"));

/// Installation state of a package; the third token of the `Status:`
/// field.
///
/// The variants are ordered by how installed the package is, so
/// comparisons like `status >= PkgStatus::Unpacked` read naturally.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum PkgStatus {
    /// Not on the system at all.
    #[default]
    NotInstalled,

    /// Only the configuration files remain.
    ConfigFiles,

    /// Installation was started but not completed.
    HalfInstalled,

    /// Unpacked, not configured.
    Unpacked,

    /// Configuration was started but not completed.
    HalfConfigured,

    /// Fully configured except that some other package's trigger
    /// processing has to finish first.
    TriggersAwaited,

    /// At least one trigger is queued and nothing blocks running it.
    TriggersPending,

    /// Fully installed and configured.
    Installed,
}
name_table!(
    PkgStatus,
    (NotInstalled, "not-installed"),
    (ConfigFiles, "config-files"),
    (HalfInstalled, "half-installed"),
    (Unpacked, "unpacked"),
    (HalfConfigured, "half-configured"),
    (TriggersAwaited, "triggers-awaited"),
    (TriggersPending, "triggers-pending"),
    (Installed, "installed")
);

/// Archive priority of a package.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum PkgPriority {
    /// Necessary for the system to function at all.
    Required,

    /// Expected on any Unix-like system.
    Important,

    /// The default character-mode system.
    Standard,

    /// The bulk of the archive.
    Optional,

    /// Deprecated alias for optional.
    Extra,

    /// A priority string this library has no name for; preserved
    /// verbatim.
    Other(String),

    /// No priority recorded.
    #[default]
    Unset,
}

impl PkgPriority {
    /// Parse a priority value. Unknown strings are preserved, not
    /// rejected; the status file is not the place to invalidate the
    /// archive's vocabulary.
    pub fn parse(value: &str) -> Self {
        match value {
            "required" => Self::Required,
            "important" => Self::Important,
            "standard" => Self::Standard,
            "optional" => Self::Optional,
            "extra" => Self::Extra,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Canonical field value, or `None` when unset.
    pub fn as_str(&self) -> Option<&str> {
        Some(match self {
            Self::Required => "required",
            Self::Important => "important",
            Self::Standard => "standard",
            Self::Optional => "optional",
            Self::Extra => "extra",
            Self::Other(value) => value,
            Self::Unset => return None,
        })
    }
}

/// Check a package name for legality, returning a human-readable
/// reason when it may not be used.
pub fn pkg_name_is_illegal(name: &str) -> Option<&'static str> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Some("may not be empty");
    };
    if !first.is_ascii_alphanumeric() {
        return Some("must start with an alphanumeric character");
    }
    for ch in chars {
        if !ch.is_ascii_alphanumeric() && !matches!(ch, '+' | '-' | '.') {
            return Some("character not allowed (only letters, digits and + - . are)");
        }
    }
    None
}

/// The architecture-specific half of a package record. Each package
/// instance carries two: the `installed` one, describing what is on
/// the system, and the `available` one from the available file.
#[derive(Clone, Debug, Default)]
pub struct PkgBin {
    /// Architecture this binary was built for.
    pub arch: Option<ArchId>,

    /// Multi-arch mode.
    pub multiarch: MultiArch,

    /// Whether the package is essential and protected from casual
    /// removal.
    pub essential: bool,

    /// Binary version.
    pub version: Option<Version>,

    /// `Maintainer:` field.
    pub maintainer: Option<String>,

    /// `Description:` field, synopsis and extended lines joined by
    /// newlines.
    pub description: Option<String>,

    /// `Source:` field, when the source package name differs.
    pub source: Option<String>,

    /// `Installed-Size:` field, preserved as written.
    pub installed_size: Option<String>,

    /// `Origin:` field.
    pub origin: Option<String>,

    /// `Bugs:` field.
    pub bugs: Option<String>,

    /// Tracked configuration files.
    pub conffiles: Vec<Conffile>,

    /// Every relationship field, in parse order.
    pub depends: Vec<Dependency>,

    /// Fields this library has no handler for, preserved verbatim in
    /// (name, value) form.
    pub arbitrary: Vec<(String, String)>,
}

/// One architectural instance of a package.
#[derive(Clone, Debug)]
pub struct Pkg {
    pub(crate) set: SetId,
    pub(crate) arch: ArchId,
    pub(crate) selection: PkgSelection,
    pub(crate) eflag: PkgEflag,
    pub(crate) status: PkgStatus,
    pub(crate) priority: PkgPriority,
    pub(crate) section: Option<String>,
    pub(crate) config_version: Option<Version>,
    pub(crate) installed: PkgBin,
    pub(crate) available: PkgBin,
    pub(crate) files: Vec<NodeId>,
    pub(crate) files_loaded: bool,
    pub(crate) trigpend: Vec<String>,
    pub(crate) trigaw: Vec<TrigAwId>,
    pub(crate) othertrigaw: Vec<TrigAwId>,
    pub(crate) interests: Vec<InterestId>,
}

impl Pkg {
    pub(crate) fn new(set: SetId, arch: ArchId) -> Self {
        Self {
            set,
            arch,
            selection: PkgSelection::default(),
            eflag: PkgEflag::default(),
            status: PkgStatus::default(),
            priority: PkgPriority::default(),
            section: None,
            config_version: None,
            installed: PkgBin::default(),
            available: PkgBin::default(),
            files: vec![],
            files_loaded: false,
            trigpend: vec![],
            trigaw: vec![],
            othertrigaw: vec![],
            interests: vec![],
        }
    }

    /// The set this instance belongs to.
    pub fn set(&self) -> SetId {
        self.set
    }

    /// The architecture that identifies this instance within its set.
    pub fn arch(&self) -> ArchId {
        self.arch
    }

    /// Current selection.
    pub fn selection(&self) -> PkgSelection {
        self.selection
    }

    /// Current error flag.
    pub fn eflag(&self) -> PkgEflag {
        self.eflag
    }

    /// Current installation status.
    pub fn status(&self) -> PkgStatus {
        self.status
    }

    /// Archive priority.
    pub fn priority(&self) -> &PkgPriority {
        &self.priority
    }

    /// Archive section, if recorded.
    pub fn section(&self) -> Option<&str> {
        self.section.as_deref()
    }

    /// Version of the configuration files on disk, when it differs
    /// from the installed version.
    pub fn config_version(&self) -> Option<&Version> {
        self.config_version.as_ref()
    }

    /// Binary metadata for one [View].
    pub fn bin(&self, view: View) -> &PkgBin {
        match view {
            View::Installed => &self.installed,
            View::Available => &self.available,
        }
    }

    pub(crate) fn bin_mut(&mut self, view: View) -> &mut PkgBin {
        match view {
            View::Installed => &mut self.installed,
            View::Available => &mut self.available,
        }
    }

    /// Paths this instance owns.
    pub fn files(&self) -> &[NodeId] {
        &self.files
    }

    /// Trigger names queued against this package.
    pub fn pending_triggers(&self) -> &[String] {
        &self.trigpend
    }

    /// Awaited-trigger records where this package is the awaiter.
    pub fn awaited_triggers(&self) -> &[TrigAwId] {
        &self.trigaw
    }

    /// Awaited-trigger records where this package is the processor.
    pub fn awaiters(&self) -> &[TrigAwId] {
        &self.othertrigaw
    }
}

/// One inbound dependency edge on a [PkgSet]: the package, view,
/// dependency index and alternative index of a possibility that names
/// this set.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RevDep {
    /// The depending package.
    pub pkg: PkgId,

    /// Which of its binary halves carries the dependency.
    pub view: View,

    /// Index into that half's dependency list.
    pub dep: usize,

    /// Index of the possibility inside the dependency's alternatives.
    pub alt: usize,
}

/// The architecture-independent identity of a package name, holding
/// its per-architecture instances.
#[derive(Clone, Debug)]
pub struct PkgSet {
    pub(crate) name: String,
    pub(crate) pkgs: Vec<PkgId>,
    pub(crate) installed_instances: usize,
    pub(crate) depended_installed: Vec<RevDep>,
    pub(crate) depended_available: Vec<RevDep>,
}

impl PkgSet {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            pkgs: vec![],
            installed_instances: 0,
            depended_installed: vec![],
            depended_available: vec![],
        }
    }

    /// The canonical (lower-cased) package name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Instances of this name, in creation order.
    pub fn instances(&self) -> &[PkgId] {
        &self.pkgs
    }

    /// How many instances are in any state other than not-installed.
    pub fn installed_instances(&self) -> usize {
        self.installed_instances
    }

    /// Inbound dependency edges for one view.
    pub fn depended(&self, view: View) -> &[RevDep] {
        match view {
            View::Installed => &self.depended_installed,
            View::Available => &self.depended_available,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    macro_rules! check_name_roundtrip {
        ($name:ident, $type:ident, $text:expr) => {
            #[test]
            fn $name() {
                let parsed: $type = $text.parse().unwrap();
                assert_eq!($text, parsed.as_str());
            }
        };
    }

    check_name_roundtrip!(selection_install, PkgSelection, "install");
    check_name_roundtrip!(selection_purge, PkgSelection, "purge");
    check_name_roundtrip!(eflag_ok, PkgEflag, "ok");
    check_name_roundtrip!(eflag_reinstreq, PkgEflag, "reinstreq");
    check_name_roundtrip!(status_not_installed, PkgStatus, "not-installed");
    check_name_roundtrip!(status_triggers_awaited, PkgStatus, "triggers-awaited");
    check_name_roundtrip!(status_installed, PkgStatus, "installed");

    #[test]
    fn unknown_values_fail() {
        assert!("installed?".parse::<PkgStatus>().is_err());
        assert!("OK".parse::<PkgEflag>().is_err());
        assert!("".parse::<PkgSelection>().is_err());
    }

    #[test]
    fn status_ordering() {
        assert!(PkgStatus::NotInstalled < PkgStatus::HalfInstalled);
        assert!(PkgStatus::TriggersAwaited < PkgStatus::TriggersPending);
        assert!(PkgStatus::TriggersPending < PkgStatus::Installed);
    }

    #[test]
    fn priority_preserves_unknown() {
        assert_eq!(PkgPriority::Optional, PkgPriority::parse("optional"));
        let other = PkgPriority::parse("source");
        assert_eq!(Some("source"), other.as_str());
        assert_eq!(None, PkgPriority::Unset.as_str());
    }

    macro_rules! check_pkg_name {
        ($name:ident, $pkg:expr, $ok:expr) => {
            #[test]
            fn $name() {
                assert_eq!($ok, pkg_name_is_illegal($pkg).is_none());
            }
        };
    }

    check_pkg_name!(name_simple, "coreutils", true);
    check_pkg_name!(name_plus, "g++", true);
    check_pkg_name!(name_dotted, "libstdc++.6", true);
    check_pkg_name!(name_numeric_start, "0ad", true);
    check_pkg_name!(name_empty, "", false);
    check_pkg_name!(name_leading_dash, "-foo", false);
    check_pkg_name!(name_underscore, "foo_bar", false);
    check_pkg_name!(name_space, "foo bar", false);
}

// vim: foldmethod=marker
