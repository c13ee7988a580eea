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

//! The `debug` module decodes the `DPKG_DEBUG` octal bitmask and the
//! `DPKG_COLORS` mode.
//!
//! Debug output itself goes through `tracing`; this module only
//! decides which classes of events a database instance should emit.
//! The library never installs a subscriber -- that is the host
//! program's call.

/// Selected debug classes, decoded from an octal bitmask.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct DebugFlags(u32);

impl DebugFlags {
    /// General progress information.
    pub const GENERAL: u32 = 0o1;

    /// Invocation and status of maintainer scripts.
    pub const SCRIPTS: u32 = 0o2;

    /// Output for each file processed.
    pub const EACHFILE: u32 = 0o10;

    /// Output for each configuration file.
    pub const CONFF: u32 = 0o20;

    /// Dependencies and conflicts.
    pub const DEPCON: u32 = 0o40;

    /// Lots of output for each file processed.
    pub const EACHFILE_DETAIL: u32 = 0o100;

    /// Lots of output for each configuration file.
    pub const CONFF_DETAIL: u32 = 0o200;

    /// Lots of dependencies/conflicts output.
    pub const DEPCON_DETAIL: u32 = 0o400;

    /// Lots of drivel about e.g. the status database.
    pub const VERY_VERBOSE: u32 = 0o1000;

    /// Insane amounts of drivel.
    pub const STUPIDLY_VERBOSE: u32 = 0o2000;

    /// Trigger activation and processing.
    pub const TRIGGERS: u32 = 0o10000;

    /// Lots of output regarding triggers.
    pub const TRIGGERS_DETAIL: u32 = 0o20000;

    /// Silly amounts of output regarding triggers.
    pub const TRIGGERS_STUPID: u32 = 0o40000;

    /// Decode an octal bitmask string, as found in `DPKG_DEBUG`.
    pub fn parse(value: &str) -> Option<Self> {
        u32::from_str_radix(value.trim(), 8).ok().map(Self)
    }

    /// Decode `DPKG_DEBUG`, empty mask when unset or malformed.
    pub fn from_env() -> Self {
        std::env::var("DPKG_DEBUG")
            .ok()
            .and_then(|mask| Self::parse(&mask))
            .unwrap_or_default()
    }

    /// Build from a raw mask.
    pub fn from_mask(mask: u32) -> Self {
        Self(mask)
    }

    /// Whether any of the given classes is selected.
    pub fn enabled(&self, class: u32) -> bool {
        self.0 & class != 0
    }
}

/// When a front-end built on this database should color its output.
/// The library itself never emits color; this is plumbing for the
/// programs above it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Color when standard output is a terminal.
    #[default]
    Auto,

    /// Always color.
    Always,

    /// Never color.
    Never,
}

impl ColorMode {
    /// Decode a `DPKG_COLORS` value. Unknown values fall back to
    /// auto.
    pub fn parse(value: &str) -> Self {
        match value {
            "always" => Self::Always,
            "never" => Self::Never,
            _ => Self::Auto,
        }
    }

    /// Decode `DPKG_COLORS`, auto when unset.
    pub fn from_env() -> Self {
        std::env::var("DPKG_COLORS")
            .map(|mode| Self::parse(&mode))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn octal_mask_decodes() {
        let flags = DebugFlags::parse("01").unwrap();
        assert!(flags.enabled(DebugFlags::GENERAL));
        assert!(!flags.enabled(DebugFlags::TRIGGERS));

        let flags = DebugFlags::parse("30001").unwrap();
        assert!(flags.enabled(DebugFlags::GENERAL));
        assert!(flags.enabled(DebugFlags::TRIGGERS));
        assert!(flags.enabled(DebugFlags::TRIGGERS_DETAIL));
        assert!(!flags.enabled(DebugFlags::SCRIPTS));
    }

    #[test]
    fn bad_mask_is_none() {
        assert_eq!(None, DebugFlags::parse("9"));
        assert_eq!(None, DebugFlags::parse("colors"));
    }

    #[test]
    fn color_modes() {
        assert_eq!(ColorMode::Always, ColorMode::parse("always"));
        assert_eq!(ColorMode::Never, ColorMode::parse("never"));
        assert_eq!(ColorMode::Auto, ColorMode::parse("auto"));
        assert_eq!(ColorMode::Auto, ColorMode::parse("sometimes"));
    }
}

// vim: foldmethod=marker
