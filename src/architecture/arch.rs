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

/// Stable handle to an interned architecture entry. Ids are only
/// meaningful against the [crate::architecture::ArchTable] that issued
/// them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArchId(pub(crate) usize);

/// Classification of an interned architecture name.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArchKind {
    /// No architecture was specified at all. Compares as the native
    /// architecture during dependency satisfaction.
    None,

    /// An explicitly empty architecture name (`pkg:` with nothing
    /// after the colon). Never valid.
    Empty,

    /// A name that fails [arch_name_is_illegal]. Interned so it can be
    /// reported, never valid.
    Illegal,

    /// The `any` wildcard.
    Wildcard,

    /// The architecture-independent `all`.
    All,

    /// The architecture this database instance considers native.
    Native,

    /// Any other well-formed architecture name.
    Foreign,
}

/// One interned architecture entry.
#[derive(Clone, Debug)]
pub struct Arch {
    pub(crate) name: String,
    pub(crate) kind: ArchKind,
}

impl Arch {
    /// The architecture name, as it appears in control data. Empty for
    /// [ArchKind::None] and [ArchKind::Empty] entries.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Classification of this entry.
    pub fn kind(&self) -> ArchKind {
        self.kind
    }

    /// Whether a package instance may carry this architecture:
    /// wildcards and the none/empty/illegal pseudo-entries may not.
    pub fn is_usable(&self) -> bool {
        matches!(
            self.kind,
            ArchKind::Native | ArchKind::Foreign | ArchKind::All
        )
    }
}

impl std::fmt::Display for Arch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Check an architecture name for legality. Returns a human-readable
/// reason when the name may not be used, or `None` when it is fine.
pub fn arch_name_is_illegal(name: &str) -> Option<&'static str> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Some("may not be empty");
    };
    if !first.is_ascii_alphanumeric() {
        return Some("must start with an alphanumeric");
    }
    for ch in chars {
        if !ch.is_ascii_alphanumeric() && ch != '-' {
            return Some("character is not alphanumeric or hyphen");
        }
    }
    None
}

/// Best-effort mapping from the running machine to its conventional
/// Debian architecture name. Used as the default native architecture
/// when the caller does not pick one.
pub fn native_arch_name() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "x86" => "i386",
        "aarch64" => "arm64",
        "arm" => "armhf",
        "powerpc64" => "ppc64el",
        "loongarch64" => "loong64",
        other => other,
    }
}


// vim: foldmethod=marker
