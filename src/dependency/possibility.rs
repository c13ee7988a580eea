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
    Error,
};
use crate::version::{Version, VersionRelation};
use pest::{iterators::Pair, Parser};
use std::str::FromStr;

/// One way to satisfy a [crate::dependency::Dependency]: a package
/// name, an optional architecture qualifier, an optional version
/// constraint.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Possibility {
    /// Name of the package which may satisfy the dependency.
    pub package: String,

    /// Architecture qualifier, when the possibility was written
    /// `name:arch`. The name is kept as written; classification
    /// against the database's architecture registry happens when the
    /// possibility is evaluated.
    pub arch: Option<String>,

    /// Version constraint, when the possibility was written with a
    /// parenthesized `(relation version)` suffix.
    pub constraint: Option<VersionConstraint>,
}

/// A (relation, version) pair constraining a [Possibility].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionConstraint {
    /// Comparison operator. Never [VersionRelation::None] on a parsed
    /// possibility; an unconstrained possibility has no
    /// [VersionConstraint] at all.
    pub relation: VersionRelation,

    /// Reference version the candidate is compared against.
    pub version: Version,
}

impl VersionConstraint {
    /// Evaluate the constraint against a candidate version.
    pub fn satisfied_by(&self, candidate: &Version) -> bool {
        self.relation.satisfied_by(candidate, &self.version)
    }
}

impl std::fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.relation, self.version)
    }
}

impl Possibility {
    /// Version-check a candidate against this possibility. True when
    /// there is no constraint.
    pub fn version_satisfied_by(&self, candidate: &Version) -> bool {
        match &self.constraint {
            None => true,
            Some(constraint) => constraint.satisfied_by(candidate),
        }
    }
}

impl std::fmt::Display for Possibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.package)?;
        if let Some(arch) = &self.arch {
            write!(f, ":{}", arch)?;
        }
        if let Some(constraint) = &self.constraint {
            write!(f, " ({})", constraint)?;
        }
        Ok(())
    }
}

impl TryFrom<Pair<'_, Rule>> for Possibility {
    type Error = Error;

    fn try_from(token: Pair<'_, Rule>) -> Result<Self, Error> {
        let mut ret = Possibility::default();

        for part in token.into_inner() {
            match part.as_rule() {
                Rule::pkg_spec => {
                    for name in part.into_inner() {
                        match name.as_rule() {
                            Rule::package_name => ret.package = name.as_str().to_owned(),
                            Rule::arch_name => ret.arch = Some(name.as_str().to_owned()),
                            _ => continue,
                        }
                    }
                }
                Rule::constraint => {
                    if ret.constraint.is_some() {
                        return Err(Error::TooManyConstraints);
                    }
                    ret.constraint = Some(decode_constraint(part)?);
                }
                _ => continue,
            }
        }

        if ret.package.is_empty() {
            return Err(Error::Malformed);
        }

        Ok(ret)
    }
}

fn decode_constraint(token: Pair<'_, Rule>) -> Result<VersionConstraint, Error> {
    let mut relation: Option<VersionRelation> = None;
    let mut version: Option<Version> = None;

    for part in token.into_inner() {
        match part.as_rule() {
            Rule::relation => {
                let Some((decoded, obsolete)) = VersionRelation::from_token(part.as_str()) else {
                    return Err(Error::Malformed);
                };
                if obsolete {
                    tracing::warn!(
                        operator = part.as_str(),
                        "obsolete relation operator, treating as inclusive"
                    );
                }
                relation = Some(decoded);
            }
            Rule::version => {
                version = Some(part.as_str().parse().map_err(Error::InvalidVersion)?);
            }
            _ => continue,
        }
    }

    match (relation, version) {
        (Some(relation), Some(version)) => Ok(VersionConstraint { relation, version }),
        _ => Err(Error::Malformed),
    }
}

impl FromStr for Possibility {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Error> {
        let Some(token) = DependencyParser::parse(Rule::possibility, value.trim())?.next() else {
            return Err(Error::Malformed);
        };
        token.try_into()
    }
}


// vim: foldmethod=marker
