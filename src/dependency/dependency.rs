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

use super::{
    pest::{DependencyParser, Rule},
    DepKind, Possibility,
};
use crate::version;
use pest::{error::Error as PestError, iterators::Pair, Parser};

/// One dependency of a package: an OR-list of [Possibility] values of
/// a single [DepKind]. The dependency is satisfied when any one of the
/// alternatives is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dependency {
    /// Which relationship field this dependency came from.
    pub kind: DepKind,

    /// The alternatives, in field order. At least one.
    pub alternatives: Vec<Possibility>,
}

/// Error conditions which may be encountered parsing a dependency
/// field.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error tokenizing the field. Carries the underlying grammar
    /// message and input location.
    Parse((String, pest::error::InputLocation)),

    /// The field structure decoded to something impossible (an empty
    /// possibility, a constraint with no operator).
    Malformed,

    /// A possibility carried more than one version constraint.
    TooManyConstraints,

    /// A version inside a constraint did not parse.
    InvalidVersion(version::Error),
}
crate::errors::error_enum!(Error);

impl From<PestError<Rule>> for Error {
    fn from(err: PestError<Rule>) -> Self {
        Error::Parse((err.variant.message().into(), err.location))
    }
}

impl Dependency {
    /// Parse a whole relationship field value (everything after the
    /// colon of e.g. `Depends:`) into its comma-separated
    /// dependencies. An empty or whitespace-only value is an empty
    /// list.
    pub fn parse_list(kind: DepKind, value: &str) -> Result<Vec<Dependency>, Error> {
        let Some(field) = DependencyParser::parse(Rule::dep_field, value)?.next() else {
            return Ok(vec![]);
        };

        let mut ret = vec![];
        for alternative in field.into_inner() {
            match alternative.as_rule() {
                Rule::alternative => ret.push(decode_alternative(kind, alternative)?),
                _ => continue,
            }
        }
        Ok(ret)
    }
}

fn decode_alternative(kind: DepKind, token: Pair<'_, Rule>) -> Result<Dependency, Error> {
    let mut alternatives = vec![];
    for possibility in token.into_inner() {
        match possibility.as_rule() {
            Rule::possibility => alternatives.push(possibility.try_into()?),
            _ => continue,
        }
    }
    if alternatives.is_empty() {
        return Err(Error::Malformed);
    }
    Ok(Dependency { kind, alternatives })
}

impl std::fmt::Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(
            f,
            "{}",
            self.alternatives
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" | ")
        )
    }
}

/// Render a list of dependencies back into canonical field-value form:
/// a single space after each comma, spaces around `|`.
pub fn render_field(deps: &[Dependency]) -> String {
    deps.iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(feature = "serde")]
mod serde {
    use super::Dependency;
    use serde::{Serialize, Serializer};

    impl Serialize for Dependency {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            String::serialize(&self.to_string(), serializer)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    macro_rules! check_field {
        ($name:ident, $input:expr, |$deps:ident| $block:tt) => {
            #[test]
            fn $name() {
                let $deps = Dependency::parse_list(DepKind::Depends, $input).unwrap();
                $block;
            }
        };
    }

    check_field!(empty, "", |deps| {
        assert!(deps.is_empty());
    });

    check_field!(whitespace_only, "   ", |deps| {
        assert!(deps.is_empty());
    });

    check_field!(single, "foo", |deps| {
        assert_eq!(1, deps.len());
        assert_eq!("foo", deps[0].alternatives[0].package);
    });

    check_field!(list, "foo, bar (>= 1.0), baz:amd64", |deps| {
        assert_eq!(3, deps.len());
        assert_eq!("bar", deps[1].alternatives[0].package);
        assert!(deps[1].alternatives[0].constraint.is_some());
        assert_eq!(Some("amd64".to_owned()), deps[2].alternatives[0].arch);
    });

    check_field!(alternatives, "mawk | gawk | awk", |deps| {
        assert_eq!(1, deps.len());
        assert_eq!(3, deps[0].alternatives.len());
        assert_eq!("gawk", deps[0].alternatives[1].package);
    });

    check_field!(multiline_continuation, "foo,\n bar", |deps| {
        assert_eq!(2, deps.len());
    });

    check_field!(mixed, "a (<< 2) | b:any, c", |deps| {
        assert_eq!(2, deps.len());
        assert_eq!(2, deps[0].alternatives.len());
    });

    macro_rules! check_field_fails {
        ($name:ident, $input:expr) => {
            #[test]
            fn $name() {
                assert!(Dependency::parse_list(DepKind::Depends, $input).is_err());
            }
        };
    }

    check_field_fails!(dangling_comma_head, ", foo");
    check_field_fails!(dangling_pipe, "foo |");
    check_field_fails!(unclosed_paren, "foo (>= 1.0");
    check_field_fails!(missing_version, "foo (>=)");
    check_field_fails!(bad_chars, "foo!bar");

    #[test]
    fn renders_canonically() {
        let deps =
            Dependency::parse_list(DepKind::Depends, "foo(>=1.0),bar|baz:i386 , qux").unwrap();
        assert_eq!("foo (>= 1.0), bar | baz:i386, qux", render_field(&deps));
    }

    #[test]
    fn kind_is_attached() {
        let deps = Dependency::parse_list(DepKind::Breaks, "foo (<< 2)").unwrap();
        assert_eq!(DepKind::Breaks, deps[0].kind);
        assert!(deps[0].kind.is_negative());
    }
}

// vim: foldmethod=marker
