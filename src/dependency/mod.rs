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

//! The `dependency` module parses and renders the package relationship
//! fields of the status database.
//!
//! A field such as `Depends: foo (>= 1.0), bar | baz:i386` carries a
//! list of [Dependency] values of one [DepKind]. Each [Dependency] is
//! an OR-list of [Possibility] values; the dependency is satisfied when
//! any one possibility is. A [Possibility] names a package, optionally
//! qualified by architecture, optionally constrained by a
//! ([crate::version::VersionRelation], [crate::version::Version]) pair.
//!
//! ```
//! use debdb::dependency::{DepKind, Dependency};
//!
//! let deps = Dependency::parse_list(DepKind::Depends, "foo (>= 1.0), bar | baz").unwrap();
//! assert_eq!(2, deps.len());
//! assert_eq!("bar | baz", deps[1].to_string());
//! ```
//!
//! The obsolete bare `<` and `>` operators are accepted as `<=` and
//! `>=`, with a warning event emitted through `tracing`.

mod kind;
#[allow(clippy::module_inception)]
mod dependency;
mod pest;
mod possibility;

pub use dependency::{render_field, Dependency, Error};
pub use kind::DepKind;
pub use possibility::{Possibility, VersionConstraint};

// vim: foldmethod=marker
