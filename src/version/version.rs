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

use std::str::FromStr;

/// Package version number, in the `[epoch:]upstream[-revision]` form.
///
/// The epoch is a small unsigned integer that exists to correct past
/// versioning mistakes; an absent epoch is the same value as epoch `0`
/// and is never printed. The upstream part is mandatory, must start
/// with a digit, and the revision -- everything after the *last* hyphen,
/// if any hyphen is present -- is the packaging revision. An absent
/// revision compares as the empty string, which sorts before any
/// non-tilde revision.
#[derive(Clone, Debug, Eq, PartialEq, Default, Hash)]
pub struct Version {
    epoch: u32,
    upstream: String,
    revision: Option<String>,
}

/// Error conditions which may be encountered when parsing a String
/// into a [Version].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The version string is empty, or whitespace only.
    Empty,

    /// The epoch before the `:` is empty.
    EmptyEpoch,

    /// The epoch before the `:` is not an unsigned decimal integer in
    /// range.
    BadEpoch,

    /// The upstream component is empty.
    EmptyUpstream,

    /// The upstream component does not start with a digit.
    UpstreamNoDigit,

    /// The upstream component contains a character outside
    /// `A-Za-z0-9.+~` (`:` needs an epoch, `-` needs a revision).
    BadUpstreamChar,

    /// The revision after the final `-` is empty.
    EmptyRevision,

    /// The revision contains a character outside `A-Za-z0-9.+~`.
    BadRevisionChar,
}
crate::errors::error_enum!(Error);

impl Version {
    /// Assemble a [Version] from parts, validating the result.
    pub fn from_parts(epoch: u32, upstream: &str, revision: Option<&str>) -> Result<Self, Error> {
        let version = Version {
            epoch,
            upstream: upstream.to_owned(),
            revision: revision.map(str::to_owned),
        };
        version.check()?;
        Ok(version)
    }

    /// The epoch. `0` both for an explicit `0:` prefix and for an
    /// absent one; the two forms are the same version.
    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    /// The upstream component.
    pub fn upstream(&self) -> &str {
        &self.upstream
    }

    /// The revision component, if one was present.
    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }

    fn check(&self) -> Result<(), Error> {
        let Some(first) = self.upstream.chars().next() else {
            return Err(Error::EmptyUpstream);
        };
        if !first.is_ascii_digit() {
            return Err(Error::UpstreamNoDigit);
        }

        for ch in self.upstream.chars() {
            if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '+' | '~') {
                continue;
            }
            // A colon is only meaningful when an epoch was given, and a
            // hyphen only when a revision was split off.
            if ch == ':' && self.epoch > 0 {
                continue;
            }
            if ch == '-' && self.revision.is_some() {
                continue;
            }
            return Err(Error::BadUpstreamChar);
        }

        if let Some(revision) = &self.revision {
            if revision.is_empty() {
                return Err(Error::EmptyRevision);
            }
            for ch in revision.chars() {
                if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '+' | '~') {
                    continue;
                }
                return Err(Error::BadRevisionChar);
            }
        }

        Ok(())
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Error> {
        let input = input.trim();
        if input.is_empty() {
            return Err(Error::Empty);
        }

        let (epoch, rest) = match input.split_once(':') {
            None => (0, input),
            Some((epoch, rest)) => {
                if epoch.is_empty() {
                    return Err(Error::EmptyEpoch);
                }
                if !epoch.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(Error::BadEpoch);
                }
                // An i32-sized bound, matching what the original
                // database tooling will accept back.
                let epoch: u32 = epoch.parse().map_err(|_| Error::BadEpoch)?;
                if epoch > i32::MAX as u32 {
                    return Err(Error::BadEpoch);
                }
                (epoch, rest)
            }
        };

        let (upstream, revision) = match rest.rsplit_once('-') {
            None => (rest, None),
            Some((upstream, revision)) => (upstream, Some(revision)),
        };

        if upstream.is_empty() {
            return Err(Error::EmptyUpstream);
        }

        Version::from_parts(epoch, upstream, revision)
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.epoch > 0 {
            write!(f, "{}:", self.epoch)?;
        }
        write!(f, "{}", self.upstream)?;
        if let Some(revision) = &self.revision {
            write!(f, "-{}", revision)?;
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
mod serde {
    use super::Version;
    use serde::{de::Error as DeError, Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for Version {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            String::serialize(&self.to_string(), serializer)
        }
    }

    impl<'de> Deserialize<'de> for Version {
        fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
            let s = String::deserialize(d)?;
            s.parse().map_err(|e| D::Error::custom(format!("{:?}", e)))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    macro_rules! check_parses {
        ($name:ident, $version:expr, $epoch:expr, $upstream:expr, $revision:expr) => {
            #[test]
            fn $name() {
                let v: Version = $version.parse().unwrap();
                assert_eq!($epoch, v.epoch());
                assert_eq!($upstream, v.upstream());
                assert_eq!($revision, v.revision());
            }
        };
    }

    macro_rules! check_parse_fails {
        ($name:ident, $version:expr, $err:expr) => {
            #[test]
            fn $name() {
                assert_eq!(Err($err), $version.parse::<Version>());
            }
        };
    }

    check_parses!(plain, "1.0", 0, "1.0", None);
    check_parses!(with_revision, "1.0-1", 0, "1.0", Some("1"));
    check_parses!(with_epoch, "1:1.0-1", 1, "1.0", Some("1"));
    check_parses!(zero_epoch, "0:1.0", 0, "1.0", None);
    check_parses!(surrounding_space, "  1.0-1 ", 0, "1.0", Some("1"));
    check_parses!(colons_after_epoch, "2:1:0", 2, "1:0", None);
    check_parses!(last_hyphen_splits, "1.0-2-3", 0, "1.0-2", Some("3"));
    check_parses!(tilde_rc, "1.0~rc1", 0, "1.0~rc1", None);

    check_parse_fails!(empty, "", Error::Empty);
    check_parse_fails!(only_space, "   ", Error::Empty);
    check_parse_fails!(empty_epoch, ":1.0", Error::EmptyEpoch);
    check_parse_fails!(alpha_epoch, "a:1.0", Error::BadEpoch);
    check_parse_fails!(negative_epoch, "-1:1.0", Error::BadEpoch);
    check_parse_fails!(huge_epoch, "99999999999:1.0", Error::BadEpoch);
    check_parse_fails!(nothing_after_colon, "1:", Error::EmptyUpstream);
    check_parse_fails!(empty_upstream, "-1", Error::EmptyUpstream);
    check_parse_fails!(no_leading_digit, "abc-1", Error::UpstreamNoDigit);
    check_parse_fails!(bad_upstream_char, "1.0@2", Error::BadUpstreamChar);
    check_parse_fails!(empty_revision, "1.0-", Error::EmptyRevision);
    check_parse_fails!(bad_revision_char, "1.0-1!2", Error::BadRevisionChar);
    check_parse_fails!(embedded_space, "1.0 2", Error::BadUpstreamChar);

    #[test]
    fn colon_needs_epoch() {
        // A bare colon with no epoch prefix splits as epoch, so the
        // only way to get a colon into upstream is via from_parts.
        assert_eq!(
            Err(Error::BadUpstreamChar),
            Version::from_parts(0, "1:0", None)
        );
        assert!(Version::from_parts(1, "1:0", None).is_ok());
    }

    #[test]
    fn hyphen_needs_revision() {
        assert_eq!(
            Err(Error::BadUpstreamChar),
            Version::from_parts(0, "1-0", None)
        );
        assert!(Version::from_parts(0, "1-0", Some("1")).is_ok());
    }

    macro_rules! check_roundtrip {
        ($name:ident, $version:expr) => {
            #[test]
            fn $name() {
                let v: Version = $version.parse().unwrap();
                assert_eq!($version, v.to_string());
                let again: Version = v.to_string().parse().unwrap();
                assert_eq!(v, again);
            }
        };
    }

    check_roundtrip!(roundtrip_plain, "1.0");
    check_roundtrip!(roundtrip_revision, "1.2-3");
    check_roundtrip!(roundtrip_epoch, "2:4.1~beta+b2-0ubuntu1");

    #[test]
    fn zero_epoch_formats_bare() {
        let v: Version = "0:1.0".parse().unwrap();
        assert_eq!("1.0", v.to_string());
        // Semantic round-trip: the reparse is equal even though the
        // bytes changed.
        assert_eq!(v, v.to_string().parse().unwrap());
    }
}

// vim: foldmethod=marker
