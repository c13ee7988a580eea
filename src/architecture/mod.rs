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

//! The `architecture` module keeps the registry of architecture names
//! a database instance knows about.
//!
//! Architecture names are interned: the registry hands out a stable,
//! copyable [ArchId] for each distinct name, and classifies every entry
//! as the native architecture, `all`, the `any` wildcard, a foreign
//! (valid but non-native) architecture, or an illegal name. Package
//! instances, dependency possibilities and specifiers all refer to
//! architectures through their [ArchId].
//!
//! The [MultiArch] mode lives here too: it is the per-package policy
//! deciding how an architecture qualifies package identity when
//! dependencies are matched across architectures.

mod arch;
mod multiarch;
mod table;

pub use arch::{arch_name_is_illegal, native_arch_name, Arch, ArchId, ArchKind};
pub use multiarch::{arch_satisfied, MultiArch};
pub use table::ArchTable;

// vim: foldmethod=marker
