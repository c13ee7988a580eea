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

/// Kind of a package relationship, one per dependency field of a
/// package record.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DepKind {
    /// `Pre-Depends:` -- must be configured before the depending
    /// package is even unpacked.
    PreDepends,

    /// `Depends:` -- required for the package to be configured.
    Depends,

    /// `Recommends:` -- found together in all but unusual installs.
    Recommends,

    /// `Suggests:` -- enhances the package's usefulness.
    Suggests,

    /// `Enhances:` -- the inverse of a suggests, declared by the
    /// enhancing package.
    Enhances,

    /// `Conflicts:` -- may not be unpacked at the same time.
    Conflicts,

    /// `Breaks:` -- renders the named versions broken; they must be
    /// deconfigured first.
    Breaks,

    /// `Replaces:` -- overwrites files belonging to the named package.
    Replaces,

    /// `Provides:` -- supplies a virtual package name.
    Provides,
}

impl DepKind {
    /// The control field this kind is parsed from and serialized to.
    pub fn field_name(&self) -> &str {
        match self {
            Self::PreDepends => "Pre-Depends",
            Self::Depends => "Depends",
            Self::Recommends => "Recommends",
            Self::Suggests => "Suggests",
            Self::Enhances => "Enhances",
            Self::Conflicts => "Conflicts",
            Self::Breaks => "Breaks",
            Self::Replaces => "Replaces",
            Self::Provides => "Provides",
        }
    }

    /// True for the inverted relationship kinds, which affect how the
    /// `any` architecture wildcard matches.
    pub fn is_negative(&self) -> bool {
        matches!(self, Self::Conflicts | Self::Breaks | Self::Replaces)
    }
}

impl std::fmt::Display for DepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.field_name())
    }
}


// vim: foldmethod=marker
