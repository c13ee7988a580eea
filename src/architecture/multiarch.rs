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

use super::{ArchId, ArchKind, ArchTable};
use std::str::FromStr;

/// Multi-arch mode of a package instance: the policy for how its
/// architecture qualifies its identity when other packages depend on
/// it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum MultiArch {
    /// The package is unique per name; architecture does not qualify.
    #[default]
    No,

    /// Instances for several architectures may be co-installed.
    Same,

    /// The package may be depended on without an architecture
    /// qualifier, and satisfies `pkg:any` dependencies.
    Allowed,

    /// One instance satisfies dependencies of every architecture.
    Foreign,
}

/// Error parsing a `Multi-Arch:` field value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MultiArchError {
    /// The value is not one of `no`, `same`, `allowed`, `foreign`.
    Unknown,
}
crate::errors::error_enum!(MultiArchError);

impl MultiArch {
    /// Canonical field value.
    pub fn as_str(&self) -> &str {
        match self {
            Self::No => "no",
            Self::Same => "same",
            Self::Allowed => "allowed",
            Self::Foreign => "foreign",
        }
    }
}

impl FromStr for MultiArch {
    type Err = MultiArchError;

    fn from_str(value: &str) -> Result<Self, MultiArchError> {
        Ok(match value {
            "no" => Self::No,
            "same" => Self::Same,
            "allowed" => Self::Allowed,
            "foreign" => Self::Foreign,
            _ => return Err(MultiArchError::Unknown),
        })
    }
}

impl std::fmt::Display for MultiArch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Decide whether an installed instance's architecture satisfies a
/// dependency possibility's architecture qualifier.
///
/// `negative` is true for the inverted relationship kinds (conflicts,
/// breaks, replaces), which match `:any` regardless of the candidate's
/// multi-arch mode. `dep_arch` of `None` means the possibility had no
/// qualifier at all.
pub fn arch_satisfied(
    table: &ArchTable,
    pkg_arch: ArchId,
    pkg_multiarch: MultiArch,
    dep_arch: Option<ArchId>,
    negative: bool,
) -> bool {
    if pkg_multiarch == MultiArch::Foreign {
        return true;
    }

    let dep_arch = dep_arch.unwrap_or_else(|| table.none());

    if table.get(dep_arch).kind() == ArchKind::Wildcard {
        return pkg_multiarch == MultiArch::Allowed || negative;
    }

    // `all` and "no architecture" both stand in for the native
    // architecture on either side of the comparison.
    let normalize = |arch: ArchId| match table.get(arch).kind() {
        ArchKind::All | ArchKind::None => table.native(),
        _ => arch,
    };

    normalize(pkg_arch) == normalize(dep_arch)
}


// vim: foldmethod=marker
