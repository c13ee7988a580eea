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

// The per-package triggers control file: `interest` and `activate`
// directives, one per line, with optional -await/-noawait suffixes.

use super::{trig_name_is_illegal, TrigPolicy};
use crate::db::{Database, PkgId};
use crate::errors::{Error, ErrorKind, ParseReason, Result};

/// One directive of a package's triggers control file.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TrigCiCommand {
    /// Declare an interest in a trigger.
    Interest(TrigPolicy),

    /// Activate a trigger when this package is unpacked or removed.
    Activate(TrigPolicy),
}

fn directive(word: &str) -> Option<TrigCiCommand> {
    Some(match word {
        "interest" | "interest-await" => TrigCiCommand::Interest(TrigPolicy::Await),
        "interest-noawait" => TrigCiCommand::Interest(TrigPolicy::NoAwait),
        "activate" | "activate-await" => TrigCiCommand::Activate(TrigPolicy::Await),
        "activate-noawait" => TrigCiCommand::Activate(TrigPolicy::NoAwait),
        _ => return None,
    })
}

/// Parse a triggers control file into its directives. Blank lines and
/// `#` comments are skipped.
pub fn parse_ci(contents: &str) -> Result<Vec<(TrigCiCommand, String)>> {
    let mut directives = vec![];

    for (idx, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((word, argument)) = line.split_once(char::is_whitespace) else {
            return Err(Error::new(
                ErrorKind::Parse(ParseReason::Syntax),
                format!("triggers ci file line {} has no argument", idx + 1),
            ));
        };
        let Some(command) = directive(word) else {
            return Err(Error::new(
                ErrorKind::Parse(ParseReason::BadValue),
                format!("unknown triggers ci directive '{}' on line {}", word, idx + 1),
            ));
        };

        let argument = argument.trim();
        if !argument.starts_with('/') {
            if let Some(reason) = trig_name_is_illegal(argument) {
                return Err(Error::new(
                    ErrorKind::Parse(ParseReason::BadControlName),
                    format!("invalid trigger name '{}': {}", argument, reason),
                ));
            }
        }

        directives.push((command, argument.to_owned()));
    }

    Ok(directives)
}

impl Database {
    /// Load a package's triggers control file, registering its
    /// interests (file interests on the path table, named interests
    /// in the per-name table). Returns the `activate` directives for
    /// the caller to fire at the appropriate point, and an empty list
    /// when the package ships no triggers file.
    pub fn trig_parse_ci(&mut self, pkg: PkgId) -> Result<Vec<(String, TrigPolicy)>> {
        let Some(contents) = self.info_read(pkg, "triggers")? else {
            return Ok(vec![]);
        };

        let mut activations = vec![];
        for (command, argument) in parse_ci(&contents)? {
            match command {
                TrigCiCommand::Interest(policy) => {
                    if argument.starts_with('/') {
                        self.trig_file_interest_add(&argument, pkg, policy)?;
                    } else {
                        let entries = self.named_interests.entry(argument).or_default();
                        if !entries.iter().any(|(have, _)| *have == pkg) {
                            entries.push((pkg, policy));
                        }
                    }
                }
                TrigCiCommand::Activate(policy) => {
                    activations.push((argument, policy));
                }
            }
        }
        Ok(activations)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_directives() {
        let directives = parse_ci(
            "\
# comment
interest /usr/share/help
interest-noawait ldconfig

activate-await /usr/share/icons
activate other-trigger
",
        )
        .unwrap();

        assert_eq!(4, directives.len());
        assert_eq!(
            (
                TrigCiCommand::Interest(TrigPolicy::Await),
                "/usr/share/help".to_owned()
            ),
            directives[0]
        );
        assert_eq!(
            (
                TrigCiCommand::Interest(TrigPolicy::NoAwait),
                "ldconfig".to_owned()
            ),
            directives[1]
        );
        assert_eq!(
            (
                TrigCiCommand::Activate(TrigPolicy::Await),
                "/usr/share/icons".to_owned()
            ),
            directives[2]
        );
    }

    #[test]
    fn unknown_directive_fails() {
        assert!(parse_ci("wait /usr/share/help\n").is_err());
    }

    #[test]
    fn missing_argument_fails() {
        assert!(parse_ci("interest\n").is_err());
    }

    #[test]
    fn bad_named_trigger_fails() {
        assert!(parse_ci("interest bad trigger name\n").is_err());
    }
}

// vim: foldmethod=marker
