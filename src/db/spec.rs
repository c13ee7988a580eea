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

// Package specifiers: `name[:arch]`, optionally with fnmatch-style
// patterns in either half.

use super::pkg::{pkg_name_is_illegal, PkgId};
use super::Database;
use crate::architecture::{arch_name_is_illegal, ArchKind};
use crate::errors::{Error, ErrorKind, ParseReason, Result};

/// Behavior switches for a [PkgSpec].
#[derive(Copy, Clone, Debug, Default)]
pub struct SpecFlags {
    /// Recognize `*`, `?`, `[` and `\` as pattern characters.
    pub patterns: bool,

    /// When the architecture is omitted, match every instance instead
    /// of requiring an unambiguous single one.
    pub arch_def_wildcard: bool,
}

/// A parsed package specifier.
#[derive(Debug)]
pub struct PkgSpec {
    name: String,
    arch: Option<String>,
    name_pattern: Option<glob::Pattern>,
    arch_pattern: Option<glob::Pattern>,
    flags: SpecFlags,
}

fn is_pattern(text: &str) -> bool {
    text.contains(['*', '?', '[', '\\'])
}

fn compile_pattern(text: &str) -> Result<glob::Pattern> {
    glob::Pattern::new(text).map_err(|err| {
        Error::new(
            ErrorKind::Parse(ParseReason::BadValue),
            format!("invalid pattern '{}': {}", text, err),
        )
    })
}

impl PkgSpec {
    /// Parse a `name[:arch]` specifier. Illegal names surface with a
    /// human-readable reason; pattern halves (when enabled by the
    /// flags) skip the legality check.
    pub fn parse(spec: &str, flags: SpecFlags) -> Result<Self> {
        let (name, arch) = match spec.split_once(':') {
            None => (spec, None),
            Some((name, arch)) => (name, Some(arch)),
        };

        let name_is_pattern = flags.patterns && is_pattern(name);
        if !name_is_pattern {
            if let Some(reason) = pkg_name_is_illegal(name) {
                return Err(Error::new(
                    ErrorKind::Parse(ParseReason::BadControlName),
                    format!("illegal package name in specifier '{}': {}", spec, reason),
                ));
            }
        }

        let arch_is_pattern = match arch {
            Some(arch) => flags.patterns && is_pattern(arch),
            None => false,
        };
        if let Some(arch) = arch {
            if !arch_is_pattern {
                if let Some(reason) = arch_name_is_illegal(arch) {
                    return Err(Error::new(
                        ErrorKind::UnknownArch,
                        format!(
                            "illegal architecture name in specifier '{}': {}",
                            spec, reason
                        ),
                    ));
                }
            }
        }

        Ok(Self {
            name: name.to_ascii_lowercase(),
            arch: arch.map(str::to_owned),
            name_pattern: if name_is_pattern {
                Some(compile_pattern(name)?)
            } else {
                None
            },
            arch_pattern: match (arch, arch_is_pattern) {
                (Some(arch), true) => Some(compile_pattern(arch)?),
                _ => None,
            },
            flags,
        })
    }

    /// The name half, lower-cased.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The architecture half, as written.
    pub fn arch(&self) -> Option<&str> {
        self.arch.as_deref()
    }

    /// Whether either half is a pattern.
    pub fn is_pattern(&self) -> bool {
        self.name_pattern.is_some() || self.arch_pattern.is_some()
    }

    fn match_name(&self, name: &str) -> bool {
        match &self.name_pattern {
            Some(pattern) => pattern.matches(name),
            None => self.name == name,
        }
    }

    fn match_arch(&self, db: &Database, pkg: PkgId) -> bool {
        let arch_name = db.arches.get(db.pkg(pkg).arch()).name();
        if let Some(pattern) = &self.arch_pattern {
            return pattern.matches(arch_name);
        }
        match &self.arch {
            Some(arch) => arch == arch_name,
            None => {
                if self.flags.arch_def_wildcard {
                    true
                } else {
                    // Single-instance default: only match when the
                    // name is unambiguous.
                    db.set(db.pkg(pkg).set()).installed_instances() <= 1
                }
            }
        }
    }

    /// Whether one instance matches this specifier.
    pub fn match_pkg(&self, db: &Database, pkg: PkgId) -> bool {
        self.match_name(db.set(db.pkg(pkg).set()).name()) && self.match_arch(db, pkg)
    }

    /// Every instance matching this specifier. A name pattern walks
    /// the whole package table; a literal name walks only that set's
    /// instance chain.
    pub fn matches(&self, db: &Database) -> Vec<PkgId> {
        if self.name_pattern.is_some() {
            return db
                .pkgs()
                .map(|(id, _)| id)
                .filter(|id| self.match_pkg(db, *id))
                .collect();
        }

        let Some(set) = db.table.lookup_set(&self.name) else {
            return vec![];
        };
        db.set(set)
            .instances()
            .iter()
            .copied()
            .filter(|id| self.match_arch(db, *id))
            .collect()
    }

    /// Resolve a non-pattern specifier to a single instance: the
    /// named architecture's instance, or the unambiguous default.
    pub fn find_pkg(&self, db: &mut Database) -> Result<PkgId> {
        if self.is_pattern() {
            return Err(Error::new(
                ErrorKind::Parse(ParseReason::BadValue),
                format!("pattern specifier '{}' cannot name a single package", self.name),
            ));
        }

        match &self.arch {
            Some(arch) => {
                let arch = db.arches.find(Some(arch.as_str()));
                if !matches!(
                    db.arches.get(arch).kind(),
                    ArchKind::Native | ArchKind::Foreign | ArchKind::All
                ) {
                    return Err(Error::new(
                        ErrorKind::UnknownArch,
                        format!(
                            "architecture '{}' cannot name a package instance",
                            db.arches.get(arch).name()
                        ),
                    ));
                }
                Ok(db.table.find_pkg(&self.name, arch))
            }
            None => db.find_singleton(&self.name),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::db::PkgStatus;
    use crate::dirs::Dirs;

    fn db() -> Database {
        Database::with_native_arch(Dirs::new("/nonexistent"), "amd64")
    }

    fn seed(db: &mut Database) -> (PkgId, PkgId, PkgId) {
        let amd64 = db.arches().native();
        let i386 = db.arch_find(Some("i386"));
        let foo_amd64 = db.find_pkg("foo", amd64);
        let foo_i386 = db.find_pkg("foo", i386);
        let bar = db.find_pkg("bar", amd64);
        db.set_pkg_status(foo_amd64, PkgStatus::Installed);
        db.set_pkg_status(bar, PkgStatus::Installed);
        (foo_amd64, foo_i386, bar)
    }

    #[test]
    fn literal_name_with_arch() {
        let mut db = db();
        let (foo_amd64, foo_i386, _) = seed(&mut db);

        let spec = PkgSpec::parse("foo:i386", SpecFlags::default()).unwrap();
        assert_eq!(vec![foo_i386], spec.matches(&db));
        assert!(!spec.match_pkg(&db, foo_amd64));
    }

    #[test]
    fn singleton_default_resolves_unambiguous() {
        let mut db = db();
        let (foo_amd64, _, _) = seed(&mut db);

        let spec = PkgSpec::parse("foo", SpecFlags::default()).unwrap();
        assert_eq!(foo_amd64, spec.find_pkg(&mut db).unwrap());
    }

    #[test]
    fn singleton_default_ambiguous_fails() {
        let mut db = db();
        let (_, foo_i386, _) = seed(&mut db);
        db.set_pkg_status(foo_i386, PkgStatus::Installed);

        let spec = PkgSpec::parse("foo", SpecFlags::default()).unwrap();
        let err = spec.find_pkg(&mut db).unwrap_err();
        assert_eq!(ErrorKind::AmbiguousPackage, err.kind());
    }

    #[test]
    fn wildcard_default_matches_all_instances() {
        let mut db = db();
        let (foo_amd64, foo_i386, _) = seed(&mut db);

        let spec = PkgSpec::parse(
            "foo",
            SpecFlags {
                arch_def_wildcard: true,
                ..Default::default()
            },
        )
        .unwrap();
        let matches = spec.matches(&db);
        assert!(matches.contains(&foo_amd64));
        assert!(matches.contains(&foo_i386));
    }

    #[test]
    fn name_pattern_walks_table() {
        let mut db = db();
        let (foo_amd64, _, bar) = seed(&mut db);

        let spec = PkgSpec::parse(
            "f*",
            SpecFlags {
                patterns: true,
                arch_def_wildcard: true,
            },
        )
        .unwrap();
        let matches = spec.matches(&db);
        assert!(matches.contains(&foo_amd64));
        assert!(!matches.contains(&bar));
    }

    #[test]
    fn arch_pattern_matches() {
        let mut db = db();
        let (foo_amd64, foo_i386, _) = seed(&mut db);

        let spec = PkgSpec::parse(
            "foo:i*",
            SpecFlags {
                patterns: true,
                ..Default::default()
            },
        )
        .unwrap();
        let matches = spec.matches(&db);
        assert_eq!(vec![foo_i386], matches);
        assert!(!matches.contains(&foo_amd64));
    }

    #[test]
    fn case_insensitive_literal_name() {
        let mut db = db();
        let (foo_amd64, _, _) = seed(&mut db);
        let spec = PkgSpec::parse("FOO", SpecFlags::default()).unwrap();
        assert!(spec.match_pkg(&db, foo_amd64));
    }

    #[test]
    fn illegal_names_are_rejected_with_reason() {
        let err = PkgSpec::parse("_foo", SpecFlags::default()).unwrap_err();
        assert!(err.to_string().contains("illegal package name"));

        let err = PkgSpec::parse("foo:bad_arch", SpecFlags::default()).unwrap_err();
        assert_eq!(ErrorKind::UnknownArch, err.kind());
    }

    #[test]
    fn pattern_chars_without_flag_are_illegal() {
        assert!(PkgSpec::parse("f*", SpecFlags::default()).is_err());
    }

    #[test]
    fn wildcard_arch_cannot_name_instance() {
        let mut db = db();
        seed(&mut db);
        let spec = PkgSpec::parse("foo:any", SpecFlags::default()).unwrap();
        assert_eq!(
            ErrorKind::UnknownArch,
            spec.find_pkg(&mut db).unwrap_err().kind()
        );
    }
}

// vim: foldmethod=marker
