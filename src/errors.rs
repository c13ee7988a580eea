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

//! The `errors` module contains the structured error type returned by
//! every fallible database operation, plus small helpers shared by the
//! per-module parse error enums.
//!
//! Recoverable failures travel as an [Error]: a tagged [ErrorKind], an
//! optional underlying [std::io::Error], a formatted message, and a stack
//! of context frames pushed by callers on the way out. Invariant
//! violations are not recoverable and panic instead; library users are
//! not expected to catch them.

/// Implement [std::fmt::Display] and [std::error::Error] for a simple
/// parse-error enum in terms of its [std::fmt::Debug] output.
macro_rules! error_enum {
    ($name:ident) => {
        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:?}", self)
            }
        }
        impl std::error::Error for $name {}
    };
}
pub(crate) use error_enum;

/// Panic on an internal inconsistency. These indicate a bug in this
/// crate, never bad input, and are deliberately not catchable through
/// the [Error] machinery.
macro_rules! internerr {
    ($($arg:tt)*) => {
        panic!("internal inconsistency: {}", format!($($arg)*))
    };
}
pub(crate) use internerr;

/// Specific reason a control file, database file or specifier failed
/// to parse. Carried inside [ErrorKind::Parse].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseReason {
    /// A required field (such as `Package:`) was absent from a stanza.
    MissingField,

    /// A field is not valid in the file being parsed.
    UnknownField,

    /// A known field appeared twice within one stanza.
    DuplicateField,

    /// A field or record value failed validation.
    BadValue,

    /// A version string violated the `deb-version(5)` grammar.
    BadVersion,

    /// A dependency field could not be parsed into alternatives.
    BadDependency,

    /// A package, architecture or trigger name was not legal.
    BadControlName,

    /// The file structure itself was malformed (stray bytes, missing
    /// separators, bad line structure).
    Syntax,
}

/// The coarse classification of an [Error], per the database's error
/// contract. Matching on this is how callers distinguish "try again
/// later" ([ErrorKind::LockBusy]) from "the database is damaged"
/// ([ErrorKind::CorruptDatabase]).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A system call failed; the underlying errno is preserved in the
    /// [Error]'s source.
    Io,

    /// A file failed to parse; the [ParseReason] and, where known, the
    /// file/line/column are preserved.
    Parse(ParseReason),

    /// An internal assertion failed. Errors of this kind are only ever
    /// observed by tests; library code panics instead.
    InvariantViolation,

    /// A non-blocking lock attempt collided with another holder.
    LockBusy,

    /// A specifier without an architecture matched more than one
    /// installed instance.
    AmbiguousPackage,

    /// A specifier named a package not present in the database.
    UnknownPackage,

    /// A specifier named an architecture that is not legal or not
    /// known.
    UnknownArch,

    /// A diversion shares an endpoint with an existing diversion.
    ConflictingDiversion,

    /// More than one statoverride exists for a single path.
    DuplicateStatoverride,

    /// A statoverride refers to a path or user that cannot be
    /// resolved.
    OrphanOverride,

    /// A database file has an unrecognized format marker or an entry
    /// that cannot belong to it.
    CorruptDatabase,
}

/// Position inside a file, for parse diagnostics. Lines and columns
/// are 1-based; `offset` is the 0-based byte offset into the
/// (newline-normalized) input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    /// Path of the file being parsed, as opened.
    pub file: String,

    /// 1-based line number.
    pub line: usize,

    /// 1-based column.
    pub column: usize,

    /// 0-based byte offset.
    pub offset: usize,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Structured error returned by the fallible operations of this crate.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: String,
    location: Option<Location>,
    source: Option<std::io::Error>,
    context: Vec<String>,
}

impl Error {
    /// Create a new [Error] of the given kind with a formatted message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            location: None,
            source: None,
            context: vec![],
        }
    }

    /// Create an [ErrorKind::Io] error wrapping a [std::io::Error].
    pub fn io(message: impl Into<String>, err: std::io::Error) -> Self {
        Self {
            kind: ErrorKind::Io,
            message: message.into(),
            location: None,
            source: Some(err),
            context: vec![],
        }
    }

    /// Create an [ErrorKind::Parse] error pinned to a [Location].
    pub fn parse(reason: ParseReason, location: Location, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Parse(reason),
            message: message.into(),
            location: Some(location),
            source: None,
            context: vec![],
        }
    }

    /// Kind of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Message of this error, without context frames.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Source position, if this error was produced by a parser.
    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    /// Context frames, outermost last.
    pub fn context_frames(&self) -> &[String] {
        &self.context
    }

    /// Push a context frame describing what the caller was doing.
    /// Frames accumulate in call order and are all printed by
    /// [std::fmt::Display].
    #[must_use]
    pub fn context(mut self, frame: impl Into<String>) -> Self {
        self.context.push(frame.into());
        self
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(location) = &self.location {
            write!(f, "{}: ", location)?;
        }
        write!(f, "{}", self.message)?;
        if let Some(source) = &self.source {
            write!(f, ": {}", source)?;
        }
        for frame in &self.context {
            write!(f, "\n  while {}", frame)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|err| -> &(dyn std::error::Error + 'static) { err })
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::io("i/o error", err)
    }
}

/// Conventional result alias for database operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Extension adding context frames to a [Result] on the way up the
/// call stack, mirroring the push/pop context discipline of the
/// underlying database design.
pub trait Context<T> {
    /// Push a lazily-built context frame onto the error, if any.
    fn context_with(self, frame: impl FnOnce() -> String) -> Result<T>;
}

impl<T> Context<T> for Result<T> {
    fn context_with(self, frame: impl FnOnce() -> String) -> Result<T> {
        self.map_err(|err| err.context(frame()))
    }
}

impl<T> Context<T> for std::result::Result<T, std::io::Error> {
    fn context_with(self, frame: impl FnOnce() -> String) -> Result<T> {
        self.map_err(|err| Error::io(frame(), err))
    }
}


// vim: foldmethod=marker
