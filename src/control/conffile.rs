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

/// Sentinel hash recorded for a conffile that has just been installed
/// and not yet had its real digest taken.
pub const NEW_CONFFILE_HASH: &str = "newconffile";

/// One tracked configuration file of a package: a path, the MD5 hash
/// of the pristine packaged version (so upgrades can detect
/// administrator edits), and the removal-tracking flags.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Conffile {
    /// Absolute path of the configuration file.
    pub path: String,

    /// Hex MD5 of the shipped version, or [NEW_CONFFILE_HASH].
    pub hash: String,

    /// The file is no longer shipped and is kept only until purged.
    pub obsolete: bool,

    /// The file is to be removed on the next upgrade.
    pub remove_on_upgrade: bool,
}

/// Error conditions which may be encountered parsing a `Conffiles:`
/// entry line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The line does not have two or three fields.
    BadFieldCount,

    /// The path is not absolute.
    RelativePath,

    /// The hash is neither hex nor the new-conffile sentinel.
    BadHash,

    /// The trailing flag is not one of the known markers.
    BadFlag,
}
crate::errors::error_enum!(Error);

fn hash_is_valid(hash: &str) -> bool {
    if hash == NEW_CONFFILE_HASH {
        return true;
    }
    hash.len() == 32 && hash.bytes().all(|b| b.is_ascii_hexdigit())
}

impl Conffile {
    /// The decoded digest bytes, when the hash is a real digest and
    /// not the new-conffile sentinel.
    #[cfg(feature = "hex")]
    pub fn digest(&self) -> Option<Vec<u8>> {
        if self.hash == NEW_CONFFILE_HASH {
            return None;
        }
        hex::decode(&self.hash).ok()
    }
}

impl FromStr for Conffile {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self, Error> {
        let mut fields = line.split_ascii_whitespace();
        let (Some(path), Some(hash)) = (fields.next(), fields.next()) else {
            return Err(Error::BadFieldCount);
        };
        let flag = fields.next();
        if fields.next().is_some() {
            return Err(Error::BadFieldCount);
        }

        if !path.starts_with('/') {
            return Err(Error::RelativePath);
        }
        if !hash_is_valid(hash) {
            return Err(Error::BadHash);
        }

        let mut conffile = Conffile {
            path: path.to_owned(),
            hash: hash.to_owned(),
            ..Default::default()
        };
        match flag {
            None => {}
            Some("obsolete") => conffile.obsolete = true,
            Some("remove-on-upgrade") => conffile.remove_on_upgrade = true,
            Some(_) => return Err(Error::BadFlag),
        }

        Ok(conffile)
    }
}

impl std::fmt::Display for Conffile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.path, self.hash)?;
        if self.obsolete {
            write!(f, " obsolete")?;
        }
        if self.remove_on_upgrade {
            write!(f, " remove-on-upgrade")?;
        }
        Ok(())
    }
}


// vim: foldmethod=marker
