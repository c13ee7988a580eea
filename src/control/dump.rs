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

// The serializer half of the stanza machinery. Fields come out in one
// fixed canonical order regardless of how the input was arranged;
// re-serializing an unchanged record may therefore produce different
// bytes than were read, deliberately.

use super::fields::PkgRecord;
use crate::dependency::{render_field, DepKind};

// Relationship fields, in canonical emission order.
const DEP_ORDER: [DepKind; 9] = [
    DepKind::Replaces,
    DepKind::Provides,
    DepKind::Depends,
    DepKind::PreDepends,
    DepKind::Recommends,
    DepKind::Suggests,
    DepKind::Breaks,
    DepKind::Conflicts,
    DepKind::Enhances,
];

// Emit one field, folding embedded newlines back into continuation
// lines. An empty logical line becomes the ` .` marker.
fn write_field(out: &mut String, name: &str, value: &str) {
    let mut lines = value.split('\n');
    out.push_str(name);
    out.push(':');
    if let Some(first) = lines.next() {
        if !first.is_empty() {
            out.push(' ');
            out.push_str(first);
        }
    }
    out.push('\n');
    for line in lines {
        if line.is_empty() {
            out.push_str(" .\n");
        } else {
            out.push(' ');
            out.push_str(line);
            out.push('\n');
        }
    }
}

/// Serialize one record into canonical stanza form, without a
/// trailing blank line. `include_status` selects whether the
/// `Status:` and trigger bookkeeping fields are written (they are for
/// the status file, not for available).
pub fn dump_record(record: &PkgRecord, include_status: bool) -> String {
    let mut out = String::new();

    write_field(&mut out, "Package", &record.name);

    if record.essential {
        write_field(&mut out, "Essential", "yes");
    }

    if include_status {
        let status = format!(
            "{} {} {}",
            record.selection, record.eflag, record.status
        );
        write_field(&mut out, "Status", &status);
    }

    if let Some(priority) = record.priority.as_str() {
        write_field(&mut out, "Priority", priority);
    }
    if let Some(section) = &record.section {
        write_field(&mut out, "Section", section);
    }
    if let Some(installed_size) = &record.installed_size {
        write_field(&mut out, "Installed-Size", installed_size);
    }
    if let Some(origin) = &record.origin {
        write_field(&mut out, "Origin", origin);
    }
    if let Some(maintainer) = &record.maintainer {
        write_field(&mut out, "Maintainer", maintainer);
    }
    if let Some(bugs) = &record.bugs {
        write_field(&mut out, "Bugs", bugs);
    }
    if let Some(arch) = &record.arch {
        write_field(&mut out, "Architecture", arch);
    }
    if record.multiarch != crate::architecture::MultiArch::No {
        write_field(&mut out, "Multi-Arch", record.multiarch.as_str());
    }
    if let Some(source) = &record.source {
        write_field(&mut out, "Source", source);
    }
    if let Some(version) = &record.version {
        write_field(&mut out, "Version", &version.to_string());
    }
    if let Some(config_version) = &record.config_version {
        write_field(&mut out, "Config-Version", &config_version.to_string());
    }

    for kind in DEP_ORDER {
        let deps: Vec<_> = record.deps_of(kind).cloned().collect();
        if deps.is_empty() {
            continue;
        }
        write_field(&mut out, kind.field_name(), &render_field(&deps));
    }

    if !record.conffiles.is_empty() {
        out.push_str("Conffiles:\n");
        for conffile in &record.conffiles {
            out.push(' ');
            out.push_str(&conffile.to_string());
            out.push('\n');
        }
    }

    if let Some(description) = &record.description {
        write_field(&mut out, "Description", description);
    }

    if include_status {
        if !record.triggers_pending.is_empty() {
            write_field(
                &mut out,
                "Triggers-Pending",
                &record.triggers_pending.join(" "),
            );
        }
        if !record.triggers_awaited.is_empty() {
            write_field(
                &mut out,
                "Triggers-Awaited",
                &record.triggers_awaited.join(" "),
            );
        }
    }

    for (name, value) in &record.arbitrary {
        write_field(&mut out, name, value);
    }

    out
}

/// Serialize a sequence of records, blank-line separated, ready to be
/// written as a whole database file.
pub fn dump_records<'a>(
    records: impl IntoIterator<Item = &'a PkgRecord>,
    include_status: bool,
) -> String {
    let mut out = String::new();
    for (idx, record) in records.into_iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        out.push_str(&dump_record(record, include_status));
    }
    out
}


// vim: foldmethod=marker
