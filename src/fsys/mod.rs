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

//! The `fsys` module tracks the filesystem objects the database knows
//! about: the interned path table, the diversions and statoverride
//! databases attached to those paths, and the per-package content
//! digests.
//!
//! Every path is interned once into a [FsysNode] and addressed by
//! [NodeId]; diversions and overrides hang off the node, so a single
//! lookup answers "is this path diverted, overridden, owned, and by
//! whom". The two on-disk databases reload themselves only when the
//! file actually changed, detected by device/inode comparison
//! ([DbFile]).

mod digest;
mod divert;
mod files;
mod nodes;
mod reload;
mod statoverride;

pub use digest::parse_md5sums;
pub use divert::{Diversion, DivertId};
pub use nodes::{FsysNode, FsysTable, NodeId};
pub use reload::{DbFile, Reload};
pub use statoverride::{
    statdb_parse_gid, statdb_parse_mode, statdb_parse_uid, FileStat, StatdbParse,
};

// vim: foldmethod=marker
