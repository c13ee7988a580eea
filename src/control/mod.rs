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

//! The `control` module parses and serializes the RFC2822-style
//! stanza format of the status and available databases.
//!
//! Parsing happens in two layers. [parse_file] tokenizes a whole file
//! into [RawParagraph] stanzas of [RawField] pairs, reassembling
//! continuation lines, normalizing CR-LF and lone CR to LF, and
//! stopping cleanly at an MS-DOS `^Z`. [PkgRecord::from_paragraph]
//! then interprets one stanza: known fields (case-insensitive) are
//! decoded into typed attributes with duplicate detection, unknown
//! fields are preserved verbatim, and every diagnostic carries the
//! file, line and offset it came from.
//!
//! [dump_record] is the inverse: it emits fields in one canonical
//! order with normalized dependency rendering. Byte-for-byte fidelity
//! with the input is *not* a goal; semantic fidelity is.

mod conffile;
mod dump;
mod fields;
mod paragraph;
mod pest;

pub use conffile::{Conffile, Error as ConffileError, NEW_CONFFILE_HASH};
pub use dump::{dump_record, dump_records};
pub use fields::{ParseTarget, PkgRecord};
pub use paragraph::{parse_file, RawField, RawParagraph};

// vim: foldmethod=marker
