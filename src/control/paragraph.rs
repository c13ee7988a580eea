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

use super::pest::{Deb822Parser, Rule};
use crate::errors::{Error, Location, ParseReason, Result};
use pest::Parser;

/// One stanza of a control-format file: the fields in file order,
/// values reassembled from their continuation lines.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawParagraph {
    /// Fields in the order they were seen.
    pub fields: Vec<RawField>,

    /// 1-based line the stanza starts on, for diagnostics.
    pub line: usize,
}

/// Minimally processed `Name: value` pair. Multi-line values carry
/// embedded newlines, one per continuation line, with each line's
/// leading whitespace removed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawField {
    /// Field name, as written (case preserved).
    pub name: String,

    /// Reassembled value, trailing whitespace trimmed.
    pub value: String,

    /// 1-based line the field starts on.
    pub line: usize,

    /// 0-based byte offset of the field name in the normalized input.
    pub offset: usize,
}

impl RawParagraph {
    /// First field with the given name, compared case-insensitively.
    pub fn field(&self, name: &str) -> Option<&RawField> {
        self.fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// Value of the named field, if present.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.field(name).map(|f| f.value.as_str())
    }
}

// CR-LF and lone CR both read as LF, and an MS-DOS ^Z ends the input
// cleanly.
fn normalize(input: &str) -> String {
    let mut input = input.replace("\r\n", "\n").replace('\r', "\n");
    if let Some(cut) = input.find('\x1a') {
        input.truncate(cut);
    }
    input
}

/// Parse a whole control-format file into its stanzas. `filename` is
/// only used in diagnostics.
pub fn parse_file(filename: &str, input: &str) -> Result<Vec<RawParagraph>> {
    let input = normalize(input);

    let mut pairs = Deb822Parser::parse(Rule::file, &input).map_err(|err| {
        let (line, column) = match err.line_col {
            pest::error::LineColLocation::Pos((line, column)) => (line, column),
            pest::error::LineColLocation::Span((line, column), _) => (line, column),
        };
        let offset = match err.location {
            pest::error::InputLocation::Pos(offset) => offset,
            pest::error::InputLocation::Span((offset, _)) => offset,
        };
        Error::parse(
            ParseReason::Syntax,
            Location {
                file: filename.to_owned(),
                line,
                column,
                offset,
            },
            "control data is not in field/value stanza form",
        )
    })?;

    let Some(file) = pairs.next() else {
        return Ok(vec![]);
    };

    let mut paragraphs = vec![];
    for paragraph in file.into_inner() {
        if paragraph.as_rule() != Rule::paragraph {
            continue;
        }

        let (line, _) = paragraph.line_col();
        let mut fields = vec![];
        for field in paragraph.into_inner() {
            if field.as_rule() != Rule::field {
                continue;
            }
            fields.push(decode_field(field));
        }
        paragraphs.push(RawParagraph { fields, line });
    }

    Ok(paragraphs)
}

fn decode_field(token: pest::iterators::Pair<'_, Rule>) -> RawField {
    let (line, _) = token.line_col();
    let offset = token.as_span().start();
    let mut name = String::new();
    let mut lines: Vec<&str> = vec![];

    for part in token.into_inner() {
        match part.as_rule() {
            Rule::field_name => name = part.as_str().to_owned(),
            Rule::value => lines.push(part.as_str()),
            Rule::cont_line => lines.push(part.as_str().trim_start_matches([' ', '\t'])),
            _ => continue,
        }
    }

    RawField {
        name,
        value: lines.join("\n").trim_end().to_owned(),
        line,
        offset,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    macro_rules! check_parse {
        ($name:ident, $input:expr, |$paras:ident| $block:tt) => {
            #[test]
            fn $name() {
                let $paras = parse_file("test", $input).unwrap();
                $block;
            }
        };
    }

    macro_rules! check_parse_fails {
        ($name:ident, $input:expr) => {
            #[test]
            fn $name() {
                assert!(parse_file("test", $input).is_err());
            }
        };
    }

    check_parse!(
        single_stanza,
        "\
Package: foo
Version: 1.0-1
",
        |p| {
            assert_eq!(1, p.len());
            assert_eq!("foo", p[0].value("Package").unwrap());
            assert_eq!("1.0-1", p[0].value("Version").unwrap());
        }
    );

    check_parse!(
        two_stanzas,
        "\
Package: foo

Package: bar
",
        |p| {
            assert_eq!(2, p.len());
            assert_eq!("bar", p[1].value("Package").unwrap());
            assert_eq!(3, p[1].line);
        }
    );

    check_parse!(
        continuation_lines,
        "\
Package: foo
Description: short
 extended line one
 extended line two
",
        |p| {
            assert_eq!(
                "short\nextended line one\nextended line two",
                p[0].value("Description").unwrap()
            );
        }
    );

    check_parse!(
        empty_first_line_value,
        "\
Package: foo
Conffiles:
 /etc/foo 0123456789abcdef0123456789abcdef
",
        |p| {
            assert_eq!(
                "\n/etc/foo 0123456789abcdef0123456789abcdef",
                p[0].value("Conffiles").unwrap()
            );
        }
    );

    check_parse!(
        case_insensitive_lookup,
        "\
PACKAGE: foo
",
        |p| {
            assert_eq!("foo", p[0].value("package").unwrap());
            assert_eq!("PACKAGE", p[0].fields[0].name);
        }
    );

    check_parse!(
        crlf_and_lone_cr,
        "Package: foo\r\nVersion: 1.0\rArchitecture: all\r\n",
        |p| {
            assert_eq!(1, p.len());
            assert_eq!("1.0", p[0].value("Version").unwrap());
            assert_eq!("all", p[0].value("Architecture").unwrap());
        }
    );

    check_parse!(msdos_eof, "Package: foo\n\x1aPackage: bar\n", |p| {
        assert_eq!(1, p.len());
    });

    check_parse!(empty_input, "", |p| {
        assert!(p.is_empty());
    });

    check_parse!(blank_lines_only, "\n\n\n", |p| {
        assert!(p.is_empty());
    });

    check_parse!(no_trailing_newline, "Package: foo", |p| {
        assert_eq!("foo", p[0].value("Package").unwrap());
    });

    check_parse!(
        extra_blank_lines_between,
        "Package: foo\n\n\n\nPackage: bar\n\n",
        |p| {
            assert_eq!(2, p.len());
        }
    );

    check_parse!(colon_in_value, "Key:Name: Value?\n", |p| {
        assert_eq!("Name: Value?", p[0].value("Key").unwrap());
    });

    check_parse_fails!(bare_word_line, "Package: foo\nnonsense\n");
    check_parse_fails!(space_in_field_name, "Bad Name: x\n");

    #[test]
    fn error_carries_position() {
        let err = parse_file("status", "Package: foo\nbroken line\n").unwrap_err();
        let location = err.location().expect("location");
        assert_eq!("status", location.file);
        assert_eq!(2, location.line);
    }

    #[test]
    fn field_lines_are_recorded() {
        let paragraphs = parse_file("t", "Package: foo\nVersion: 1\n").unwrap();
        assert_eq!(1, paragraphs[0].fields[0].line);
        assert_eq!(2, paragraphs[0].fields[1].line);
    }
}

// vim: foldmethod=marker
