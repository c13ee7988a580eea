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

// The triggers/Unincorp deferred-activations file and its update
// protocol: lock, read old, stream through user callbacks into
// Unincorp.new, append, fsync, rename.

use crate::atomic::sync_dir;
use crate::db::{Database, PkgId};
use crate::dirs::{Dirs, TRIGGERS_DEFERRED_FILE, TRIGGERS_DIR, TRIGGERS_LOCK_FILE};
use crate::errors::{Context, Error, ErrorKind, Location, ParseReason, Result};
use nix::fcntl::{Flock, FlockArg};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::PathBuf;

/// Behavior switches for [trigdef_update_start].
#[derive(Copy, Clone, Debug, Default)]
pub struct DeferredFlags {
    /// Take the triggers lock and open `Unincorp.new` for rewrite.
    pub write: bool,

    /// Proceed even when the deferred file is empty.
    pub write_if_empty: bool,

    /// Proceed even when the deferred file does not exist.
    pub write_if_enoent: bool,

    /// A missing triggers directory is reported as
    /// [DeferredStart::ErrorNoDir] instead of an error.
    pub no_lock_ok: bool,
}

/// Outcome of [trigdef_update_start].
#[derive(Debug)]
pub enum DeferredStart {
    /// The triggers directory does not exist.
    ErrorNoDir,

    /// The deferred file is empty and the flags did not ask to
    /// proceed anyway.
    ErrorEmptyDeferred,

    /// The deferred file does not exist and the flags did not ask to
    /// proceed anyway.
    ErrorNoDeferred,

    /// Processing may begin. The update must be driven to
    /// [DeferredUpdate::finish] to take effect.
    Started(DeferredUpdate),
}

/// Sink the parse callbacks write the new deferred file through. All
/// writes are no-ops in a read-only update.
pub struct DeferredWriter<'a> {
    writer: Option<&'a mut BufWriter<File>>,
}

impl DeferredWriter<'_> {
    /// Append text to the new deferred file.
    pub fn emit(&mut self, text: &str) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer
                .write_all(text.as_bytes())
                .context_with(|| "unable to write new triggers deferred file".to_owned())?;
        }
        Ok(())
    }
}

/// Callbacks invoked for each record of the old deferred file. The
/// callbacks decide what, if anything, reaches the new file through
/// the [DeferredWriter].
pub trait DeferredHandler {
    /// A record starts, naming its trigger.
    fn trig_begin(&mut self, out: &mut DeferredWriter<'_>, trig: &str) -> Result<()>;

    /// One package listed on the current record.
    fn package(&mut self, out: &mut DeferredWriter<'_>, pkg: &str) -> Result<()>;

    /// The current record ends.
    fn trig_end(&mut self, out: &mut DeferredWriter<'_>) -> Result<()>;
}

/// An in-flight deferred-file update. Holds the triggers lock (when
/// writing) until finished or dropped; dropping without
/// [DeferredUpdate::finish] discards the half-written new file.
#[derive(Debug)]
pub struct DeferredUpdate {
    triggers_dir: PathBuf,
    deferred_path: PathBuf,
    new_path: PathBuf,
    old: Option<String>,
    had_deferred: bool,
    writer: Option<BufWriter<File>>,
    _lock: Option<Flock<File>>,
}

/// Start processing the deferred file, per the given flags. See
/// [DeferredStart] for the non-started outcomes.
pub fn trigdef_update_start(dirs: &Dirs, flags: DeferredFlags) -> Result<DeferredStart> {
    let triggers_dir = dirs.admindir().join(TRIGGERS_DIR);
    let deferred_path = dirs.triggers_path(TRIGGERS_DEFERRED_FILE);
    let new_path = dirs.triggers_path(format!("{}.new", TRIGGERS_DEFERRED_FILE).as_str());

    let mut lock = None;
    if flags.write {
        let lock_path = dirs.triggers_path(TRIGGERS_LOCK_FILE);
        let lock_file = match OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(&lock_path)
        {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound && flags.no_lock_ok => {
                return Ok(DeferredStart::ErrorNoDir);
            }
            Err(err) => {
                return Err(Error::io(
                    format!(
                        "unable to open/create triggers lockfile '{}'",
                        lock_path.display()
                    ),
                    err,
                ))
            }
        };

        lock = match Flock::lock(lock_file, FlockArg::LockExclusive) {
            Ok(lock) => Some(lock),
            Err((_, errno)) => {
                return Err(Error::new(
                    ErrorKind::Io,
                    format!("unable to lock triggers area: {}", errno),
                ))
            }
        };
    }

    let (old, had_deferred) = match std::fs::read_to_string(&deferred_path) {
        Ok(contents) => {
            if contents.is_empty() && !flags.write_if_empty {
                return Ok(DeferredStart::ErrorEmptyDeferred);
            }
            (Some(contents), true)
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            if !flags.write_if_enoent {
                return Ok(DeferredStart::ErrorNoDeferred);
            }
            (None, false)
        }
        Err(err) => {
            return Err(Error::io(
                format!(
                    "unable to open triggers deferred file '{}'",
                    deferred_path.display()
                ),
                err,
            ))
        }
    };

    let writer = if flags.write {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o644)
            .open(&new_path)
            .context_with(|| {
                format!(
                    "unable to open/create new triggers deferred file '{}'",
                    new_path.display()
                )
            })?;
        Some(BufWriter::new(file))
    } else {
        None
    };

    Ok(DeferredStart::Started(DeferredUpdate {
        triggers_dir,
        deferred_path,
        new_path,
        old,
        had_deferred,
        writer,
        _lock: lock,
    }))
}

fn pkg_token_is_valid(token: &str) -> bool {
    // "-" alone marks a noawait activation.
    if token == "-" {
        return true;
    }
    let mut bytes = token.bytes();
    let Some(first) = bytes.next() else {
        return false;
    };
    if !(first.is_ascii_lowercase() || first.is_ascii_digit()) {
        return false;
    }
    bytes.all(|b| {
        b.is_ascii_lowercase() || b.is_ascii_digit() || matches!(b, b'-' | b':' | b'+' | b'.')
    })
}

impl DeferredUpdate {
    /// Whether an old deferred file existed at start.
    pub fn had_deferred(&self) -> bool {
        self.had_deferred
    }

    /// The sink for appending wholly new activations.
    pub fn writer(&mut self) -> DeferredWriter<'_> {
        DeferredWriter {
            writer: self.writer.as_mut(),
        }
    }

    /// Parse the old deferred file, invoking the handler per record.
    /// Comment (`#`) and blank lines are skipped. Trigger directives
    /// must be printable ASCII; package tokens must look like package
    /// names (or the `-` noawait marker).
    pub fn parse(&mut self, handler: &mut dyn DeferredHandler) -> Result<()> {
        let Some(old) = self.old.take() else {
            return Ok(());
        };

        let file = self.deferred_path.display().to_string();
        for (idx, line) in old.lines().enumerate() {
            let line = line.trim_start();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let syntax_error = |column: usize| {
                Error::parse(
                    ParseReason::Syntax,
                    Location {
                        file: file.clone(),
                        line: idx + 1,
                        column,
                        offset: 0,
                    },
                    "syntax error in triggers deferred file",
                )
            };

            let mut tokens = line.split_ascii_whitespace();
            let Some(trig) = tokens.next() else {
                return Err(syntax_error(1));
            };
            if trig.bytes().any(|b| !(0x21..0x7f).contains(&b)) {
                return Err(syntax_error(1));
            }

            handler.trig_begin(
                &mut DeferredWriter {
                    writer: self.writer.as_mut(),
                },
                trig,
            )?;

            for token in tokens {
                if !pkg_token_is_valid(token) {
                    return Err(syntax_error(line.find(token).map_or(1, |c| c + 1)));
                }
                handler.package(
                    &mut DeferredWriter {
                        writer: self.writer.as_mut(),
                    },
                    token,
                )?;
            }

            handler.trig_end(&mut DeferredWriter {
                writer: self.writer.as_mut(),
            })?;
        }

        Ok(())
    }

    /// Flush and fsync the new file, rename it over the deferred
    /// file, fsync the directory, and release the lock.
    pub fn finish(mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer
                .flush()
                .context_with(|| "unable to write new triggers deferred file".to_owned())?;
            writer
                .get_ref()
                .sync_all()
                .context_with(|| "unable to sync new triggers deferred file".to_owned())?;
            drop(writer);

            std::fs::rename(&self.new_path, &self.deferred_path).context_with(|| {
                format!(
                    "unable to install new triggers deferred file '{}'",
                    self.deferred_path.display()
                )
            })?;
            sync_dir(&self.triggers_dir)?;
        }
        Ok(())
    }
}

impl Drop for DeferredUpdate {
    fn drop(&mut self) {
        // Abandoned update: discard the half-written file.
        if self.writer.take().is_some() {
            let _ = std::fs::remove_file(&self.new_path);
        }
    }
}

// Re-emits every old record unchanged.
struct PassThrough;

impl DeferredHandler for PassThrough {
    fn trig_begin(&mut self, out: &mut DeferredWriter<'_>, trig: &str) -> Result<()> {
        out.emit(trig)
    }

    fn package(&mut self, out: &mut DeferredWriter<'_>, pkg: &str) -> Result<()> {
        out.emit(" ")?;
        out.emit(pkg)
    }

    fn trig_end(&mut self, out: &mut DeferredWriter<'_>) -> Result<()> {
        out.emit("\n")
    }
}

// Applies each old record to the database and emits nothing, so the
// rewritten file starts empty.
struct Incorporate<'db> {
    db: &'db mut Database,
    trig: Option<String>,
}

impl DeferredHandler for Incorporate<'_> {
    fn trig_begin(&mut self, _out: &mut DeferredWriter<'_>, trig: &str) -> Result<()> {
        self.trig = Some(trig.to_owned());
        Ok(())
    }

    fn package(&mut self, _out: &mut DeferredWriter<'_>, pkg: &str) -> Result<()> {
        let Some(trig) = self.trig.clone() else {
            crate::errors::internerr!("package token outside a deferred record");
        };
        let aw = if pkg == "-" {
            None
        } else {
            Some(match pkg.split_once(':') {
                Some((name, arch)) => {
                    let arch = self.db.arches.find(Some(arch));
                    self.db.table.find_pkg(name, arch)
                }
                None => self.db.table.find_singleton(pkg, &self.db.arches)?,
            })
        };
        self.db.trig_activate(&trig, aw)?;
        Ok(())
    }

    fn trig_end(&mut self, _out: &mut DeferredWriter<'_>) -> Result<()> {
        self.trig = None;
        Ok(())
    }
}

impl Database {
    /// Record a trigger activation durably: the deferred file gains a
    /// `<trigger> <awaiter>` line (`-` when nobody awaits), and the
    /// in-memory pending/await state is updated. Returns how many
    /// interested packages were activated.
    pub fn trig_deferred_activate(&mut self, trig: &str, aw: Option<PkgId>) -> Result<usize> {
        let start = trigdef_update_start(
            &self.dirs,
            DeferredFlags {
                write: true,
                write_if_empty: true,
                write_if_enoent: true,
                no_lock_ok: false,
            },
        )?;
        let DeferredStart::Started(mut update) = start else {
            crate::errors::internerr!("deferred start refused despite write-if flags");
        };

        update.parse(&mut PassThrough)?;

        let awaiter = match aw {
            Some(aw) => self.pkg_display_name(aw),
            None => "-".to_owned(),
        };
        update.writer().emit(&format!("{} {}\n", trig, awaiter))?;

        let count = self.trig_activate(trig, aw)?;
        update.finish()?;
        Ok(count)
    }

    /// Incorporate every deferred activation into package state and
    /// truncate the deferred file. Returns false when there was
    /// nothing to incorporate (no directory, no file, empty file).
    pub fn trig_incorporate(&mut self) -> Result<bool> {
        let start = trigdef_update_start(
            &self.dirs,
            DeferredFlags {
                write: true,
                write_if_empty: false,
                write_if_enoent: false,
                no_lock_ok: true,
            },
        )?;
        let mut update = match start {
            DeferredStart::Started(update) => update,
            DeferredStart::ErrorNoDir
            | DeferredStart::ErrorNoDeferred
            | DeferredStart::ErrorEmptyDeferred => return Ok(false),
        };

        let mut handler = Incorporate {
            db: self,
            trig: None,
        };
        update.parse(&mut handler)?;
        update.finish()?;
        Ok(true)
    }
}


// vim: foldmethod=marker
