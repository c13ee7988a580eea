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

//! The `version` module implements the `deb-version(5)` version syntax
//! used by every dependency and upgrade check in the package database.
//!
//! A [Version] takes the form `[epoch:]upstream[-revision]`; the parts
//! compare under the verrevcmp rules, where `~` sorts before everything
//! including the empty string, letters sort before non-letters, and
//! digit runs compare numerically.
//!
//! ```
//! use debdb::version::Version;
//!
//! let a: Version = "1.0~rc1".parse().unwrap();
//! let b: Version = "1.0".parse().unwrap();
//! assert!(a < b);
//! ```
//!
//! The module also carries the [VersionRelation] algebra: the five
//! comparison operators a dependency may impose, plus
//! [VersionRelation::None] meaning "no constraint, always satisfied".
//!
//! # Feature `serde`
//!
//! This feature will enable derives or explicit implementations of
//! [serde::Deserialize] and [serde::Serialize] for types in this module.

mod compare;
mod relation;
mod tests_dpkg;
#[allow(clippy::module_inception)]
mod version;

pub use relation::VersionRelation;
pub use version::{Error, Version};

// vim: foldmethod=marker
