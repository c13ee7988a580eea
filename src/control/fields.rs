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

use super::{Conffile, RawField, RawParagraph};
use crate::architecture::{arch_name_is_illegal, MultiArch};
use crate::db::{pkg_name_is_illegal, PkgEflag, PkgPriority, PkgSelection, PkgStatus};
use crate::dependency::{DepKind, Dependency};
use crate::errors::{Error, Location, ParseReason, Result};
use crate::triggers::trig_name_is_illegal;
use crate::version::Version;
use std::collections::HashSet;

/// Which database file a stanza is being interpreted for. The status
/// file requires a `Status:` field and accepts the trigger bookkeeping
/// fields; the available file has neither.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ParseTarget {
    /// The `status` snapshot or one of its `updates/*` journal
    /// entries.
    Status,

    /// The `available` snapshot.
    Available,
}

/// One package stanza, interpreted: every known field decoded into a
/// typed attribute, unknown fields preserved verbatim.
///
/// A record is a plain value. Installing it into a database -- interning
/// the names, binding dependencies, linking trigger records -- is the
/// database's business, not the parser's.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PkgRecord {
    /// `Package:` name.
    pub name: String,

    /// `Architecture:` value, as written. Empty means the field was
    /// absent.
    pub arch: Option<String>,

    /// First `Status:` token.
    pub selection: PkgSelection,

    /// Second `Status:` token.
    pub eflag: PkgEflag,

    /// Third `Status:` token.
    pub status: PkgStatus,

    /// Whether a `Status:` field was present at all.
    pub has_status: bool,

    /// `Essential:` flag.
    pub essential: bool,

    /// `Multi-Arch:` mode.
    pub multiarch: MultiArch,

    /// `Priority:` value.
    pub priority: PkgPriority,

    /// `Section:` value.
    pub section: Option<String>,

    /// `Installed-Size:` value, preserved as written.
    pub installed_size: Option<String>,

    /// `Origin:` value.
    pub origin: Option<String>,

    /// `Maintainer:` value.
    pub maintainer: Option<String>,

    /// `Bugs:` value.
    pub bugs: Option<String>,

    /// `Source:` value.
    pub source: Option<String>,

    /// `Version:` value.
    pub version: Option<Version>,

    /// `Config-Version:` value.
    pub config_version: Option<Version>,

    /// Every relationship field, in parse order.
    pub depends: Vec<Dependency>,

    /// `Conffiles:` entries.
    pub conffiles: Vec<Conffile>,

    /// `Description:` synopsis plus extended lines, newline-joined.
    pub description: Option<String>,

    /// `Triggers-Pending:` trigger names.
    pub triggers_pending: Vec<String>,

    /// `Triggers-Awaited:` package names this package awaits.
    pub triggers_awaited: Vec<String>,

    /// Unknown fields, preserved verbatim in stanza order.
    pub arbitrary: Vec<(String, String)>,
}

fn location(filename: &str, field: &RawField) -> Location {
    Location {
        file: filename.to_owned(),
        line: field.line,
        column: 1,
        offset: field.offset,
    }
}

fn bad_value(filename: &str, field: &RawField, message: String) -> Error {
    Error::parse(ParseReason::BadValue, location(filename, field), message)
}

impl PkgRecord {
    /// Interpret one stanza. `filename` is used in diagnostics only.
    pub fn from_paragraph(
        filename: &str,
        paragraph: &RawParagraph,
        target: ParseTarget,
    ) -> Result<Self> {
        let mut record = PkgRecord::default();
        let mut seen: HashSet<String> = HashSet::new();

        for field in &paragraph.fields {
            let key = field.name.to_ascii_lowercase();
            if !seen.insert(key.clone()) {
                return Err(Error::parse(
                    ParseReason::DuplicateField,
                    location(filename, field),
                    format!("duplicate field {}", field.name),
                ));
            }
            record.take_field(filename, field, &key, target)?;
        }

        if record.name.is_empty() {
            return Err(Error::parse(
                ParseReason::MissingField,
                Location {
                    file: filename.to_owned(),
                    line: paragraph.line,
                    column: 1,
                    offset: 0,
                },
                "stanza has no Package field",
            ));
        }

        if target == ParseTarget::Status && !record.has_status {
            return Err(Error::parse(
                ParseReason::MissingField,
                Location {
                    file: filename.to_owned(),
                    line: paragraph.line,
                    column: 1,
                    offset: 0,
                },
                format!("package {} has no Status field", record.name),
            ));
        }

        Ok(record)
    }

    fn take_field(
        &mut self,
        filename: &str,
        field: &RawField,
        key: &str,
        target: ParseTarget,
    ) -> Result<()> {
        let value = field.value.as_str();

        match key {
            "package" => {
                if let Some(reason) = pkg_name_is_illegal(value) {
                    return Err(Error::parse(
                        ParseReason::BadControlName,
                        location(filename, field),
                        format!("illegal package name '{}': {}", value, reason),
                    ));
                }
                self.name = value.to_owned();
            }
            "architecture" => self.arch = Some(value.to_owned()),
            "status" => {
                let tokens: Vec<&str> = value.split_ascii_whitespace().collect();
                let &[selection, eflag, status] = tokens.as_slice() else {
                    return Err(bad_value(
                        filename,
                        field,
                        "Status field needs exactly three tokens".to_owned(),
                    ));
                };
                self.selection = selection.parse().map_err(|_| {
                    bad_value(filename, field, format!("unknown want state '{}'", selection))
                })?;
                self.eflag = eflag.parse().map_err(|_| {
                    bad_value(filename, field, format!("unknown error flag '{}'", eflag))
                })?;
                self.status = status.parse().map_err(|_| {
                    bad_value(filename, field, format!("unknown status '{}'", status))
                })?;
                self.has_status = true;
            }
            "essential" => {
                self.essential = match value {
                    "yes" => true,
                    "no" => false,
                    _ => {
                        return Err(bad_value(
                            filename,
                            field,
                            format!("Essential must be yes or no, not '{}'", value),
                        ))
                    }
                };
            }
            "multi-arch" => {
                self.multiarch = value.parse().map_err(|_| {
                    bad_value(filename, field, format!("unknown Multi-Arch mode '{}'", value))
                })?;
            }
            "priority" => self.priority = PkgPriority::parse(value),
            "section" => self.section = Some(value.to_owned()),
            "installed-size" => self.installed_size = Some(value.to_owned()),
            "origin" => self.origin = Some(value.to_owned()),
            "maintainer" => self.maintainer = Some(value.to_owned()),
            "bugs" => self.bugs = Some(value.to_owned()),
            "source" => self.source = Some(value.to_owned()),
            "version" => self.version = Some(parse_version(filename, field, value)?),
            "config-version" => {
                self.config_version = Some(parse_version(filename, field, value)?)
            }
            "description" => self.description = Some(value.to_owned()),
            "replaces" => self.take_deps(filename, field, DepKind::Replaces)?,
            "provides" => self.take_deps(filename, field, DepKind::Provides)?,
            "depends" => self.take_deps(filename, field, DepKind::Depends)?,
            "pre-depends" => self.take_deps(filename, field, DepKind::PreDepends)?,
            "recommends" => self.take_deps(filename, field, DepKind::Recommends)?,
            "suggests" => self.take_deps(filename, field, DepKind::Suggests)?,
            "breaks" => self.take_deps(filename, field, DepKind::Breaks)?,
            "conflicts" => self.take_deps(filename, field, DepKind::Conflicts)?,
            "enhances" => self.take_deps(filename, field, DepKind::Enhances)?,
            "conffiles" => {
                for line in value.split('\n') {
                    if line.is_empty() {
                        continue;
                    }
                    let conffile = line.parse().map_err(|err| {
                        bad_value(filename, field, format!("bad Conffiles entry: {}", err))
                    })?;
                    self.conffiles.push(conffile);
                }
            }
            "triggers-pending" if target == ParseTarget::Status => {
                for trig in value.split_ascii_whitespace() {
                    if let Some(reason) = trig_name_is_illegal(trig) {
                        return Err(bad_value(
                            filename,
                            field,
                            format!("illegal pending trigger '{}': {}", trig, reason),
                        ));
                    }
                    self.triggers_pending.push(trig.to_owned());
                }
            }
            "triggers-awaited" if target == ParseTarget::Status => {
                // Entries may be architecture-qualified, the way
                // co-installable instances are named everywhere else.
                for spec in value.split_ascii_whitespace() {
                    let (name, arch) = match spec.split_once(':') {
                        Some((name, arch)) => (name, Some(arch)),
                        None => (spec, None),
                    };
                    if let Some(reason) = pkg_name_is_illegal(name) {
                        return Err(bad_value(
                            filename,
                            field,
                            format!("illegal awaited package name '{}': {}", name, reason),
                        ));
                    }
                    if let Some(arch) = arch {
                        if let Some(reason) = arch_name_is_illegal(arch) {
                            return Err(bad_value(
                                filename,
                                field,
                                format!("illegal awaited architecture '{}': {}", arch, reason),
                            ));
                        }
                    }
                    self.triggers_awaited.push(spec.to_owned());
                }
            }
            _ => {
                self.arbitrary
                    .push((field.name.clone(), field.value.clone()));
            }
        }

        Ok(())
    }

    fn take_deps(&mut self, filename: &str, field: &RawField, kind: DepKind) -> Result<()> {
        let deps = Dependency::parse_list(kind, &field.value).map_err(|err| {
            Error::parse(
                ParseReason::BadDependency,
                location(filename, field),
                format!("bad {} field: {}", kind.field_name(), err),
            )
        })?;
        self.depends.extend(deps);
        Ok(())
    }

    /// The dependencies of one kind, in field order.
    pub fn deps_of(&self, kind: DepKind) -> impl Iterator<Item = &Dependency> {
        self.depends.iter().filter(move |dep| dep.kind == kind)
    }
}

fn parse_version(filename: &str, field: &RawField, value: &str) -> Result<Version> {
    value.parse().map_err(|err: crate::version::Error| {
        Error::parse(
            ParseReason::BadVersion,
            location(filename, field),
            format!("bad version '{}': {}", value, err),
        )
    })
}


// vim: foldmethod=marker
