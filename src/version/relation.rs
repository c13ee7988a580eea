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

use super::Version;
use std::cmp::Ordering;

/// Comparison a dependency may impose on a [Version], plus the
/// [VersionRelation::None] sentinel for an unversioned dependency,
/// which every candidate satisfies.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum VersionRelation {
    /// No constraint; always satisfied.
    #[default]
    None,

    /// Strictly earlier (`<<`).
    Earlier,

    /// Earlier or equal (`<=`).
    EarlierEqual,

    /// Exactly equal (`=`).
    Exact,

    /// Later or equal (`>=`).
    LaterEqual,

    /// Strictly later (`>>`).
    Later,
}

impl VersionRelation {
    /// Canonical operator spelling, as rendered in dependency fields.
    /// [VersionRelation::None] has no spelling; it never appears in a
    /// serialized dependency.
    pub fn as_str(&self) -> &str {
        match self {
            Self::None => "",
            Self::Earlier => "<<",
            Self::EarlierEqual => "<=",
            Self::Exact => "=",
            Self::LaterEqual => ">=",
            Self::Later => ">>",
        }
    }

    /// Decode an operator token. The bare `<` and `>` spellings are
    /// obsolete aliases for `<=` and `>=`; the second tuple member is
    /// true when one was used, so the caller can warn.
    pub fn from_token(token: &str) -> Option<(Self, bool)> {
        Some(match token {
            "<<" => (Self::Earlier, false),
            "<=" => (Self::EarlierEqual, false),
            "=" => (Self::Exact, false),
            ">=" => (Self::LaterEqual, false),
            ">>" => (Self::Later, false),
            "<" => (Self::EarlierEqual, true),
            ">" => (Self::LaterEqual, true),
            _ => return None,
        })
    }

    /// Evaluate `candidate <relation> reference`.
    pub fn satisfied_by(&self, candidate: &Version, reference: &Version) -> bool {
        let ord = candidate.cmp(reference);
        match self {
            Self::None => true,
            Self::Earlier => ord == Ordering::Less,
            Self::EarlierEqual => ord != Ordering::Greater,
            Self::Exact => ord == Ordering::Equal,
            Self::LaterEqual => ord != Ordering::Less,
            Self::Later => ord == Ordering::Greater,
        }
    }
}

impl std::fmt::Display for VersionRelation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    macro_rules! check_satisfied {
        ($name:ident, $candidate:expr, $relation:ident, $reference:expr, $check:expr) => {
            #[test]
            fn $name() {
                let candidate: Version = $candidate.parse().unwrap();
                let reference: Version = $reference.parse().unwrap();
                assert_eq!(
                    $check,
                    VersionRelation::$relation.satisfied_by(&candidate, &reference)
                );
            }
        };
    }

    check_satisfied!(none_always, "0.1", None, "999", true);
    check_satisfied!(earlier_hit, "1.0", Earlier, "1.1", true);
    check_satisfied!(earlier_miss_on_equal, "1.1", Earlier, "1.1", false);
    check_satisfied!(earlier_equal_hit, "1.1", EarlierEqual, "1.1", true);
    check_satisfied!(exact_hit, "1.0-1", Exact, "1.0-1", true);
    check_satisfied!(exact_epoch_normalized, "0:1.0", Exact, "1.0", true);
    check_satisfied!(exact_miss, "1.0-1", Exact, "1.0-2", false);
    check_satisfied!(later_equal_hit, "2.0", LaterEqual, "1.9", true);
    check_satisfied!(later_miss_on_equal, "1.9", Later, "1.9", false);

    #[test]
    fn obsolete_aliases_map_to_inclusive() {
        assert_eq!(
            Some((VersionRelation::EarlierEqual, true)),
            VersionRelation::from_token("<")
        );
        assert_eq!(
            Some((VersionRelation::LaterEqual, true)),
            VersionRelation::from_token(">")
        );
        assert_eq!(
            Some((VersionRelation::Earlier, false)),
            VersionRelation::from_token("<<")
        );
        assert_eq!(None, VersionRelation::from_token("=="));
    }
}

// vim: foldmethod=marker
