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

#![deny(missing_docs)]
#![deny(missing_copy_implementations)]
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
#![deny(unused_import_braces)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

//! The `debdb` crate maintains the on-disk state of a Debian-style
//! package manager: an authoritative, crash-consistent database of
//! installed packages, the files they own, overrides and diversions
//! applied to those files, and the trigger system by which packages
//! request deferred work from each other.
//!
//! The center of the crate is the [db::Database] handle. Opening one
//! loads and validates all persistent state -- the `status` snapshot
//! with its `updates/` crash journal, the `diversions` and
//! `statoverride` databases, and the file-trigger interests -- behind
//! the main database lock. All long-lived objects are interned into
//! tables on the handle and addressed by small copyable ids, so
//! lookups are insertion-idempotent and the whole state tears down in
//! one step.
//!
//! Mutations that must survive crashes go through the status journal
//! ([db::Database::note] / [db::Database::commit]) or the
//! [atomic::AtomicFile] write-to-sibling-then-rename primitive;
//! every commit sequence is ordered so that a crash at any point
//! recovers to either the previous or the new state, never an
//! intermediate one.
//!
//! The supporting cast: [version] implements the `deb-version(5)`
//! ordering used by every dependency check, [dependency] the
//! relationship fields with architecture qualification, [control] the
//! RFC2822-style stanza format, [architecture] the interned
//! architecture registry, [triggers] the pending/awaited machinery,
//! and [archives] the tar/ar header decoding for the `.deb` reader
//! living above this crate.
//!
//! This crate deliberately stops at the database: dependency
//! *planning*, archive unpacking, maintainer-script execution and all
//! interactive surfaces belong to the tools built on top of it.
//!
//! # Feature Flags
//!
//! | Flag    | Description                                                   |
//! | ------- | ------------------------------------------------------------- |
//! | `full`  | Enable all optional features.                                 |
//! | `hex`   | Decode stored MD5 digests to bytes using the [hex] crate.     |
//! | `serde` | Encode the string-shaped types (versions, dependencies) using [serde]. |

pub mod architecture;
pub mod archives;
pub mod atomic;
pub mod cleanup;
pub mod control;
pub mod db;
pub mod debug;
pub mod dependency;
pub mod dirs;
pub mod errors;
pub mod fsys;
pub mod triggers;
pub mod version;

// vim: foldmethod=marker
