//! Errors raised while lexing, parsing, lowering, and evaluating

use crate::runtime::Value;
use std::fmt::{self, Write as _};
use thiserror::Error;

/// Position in host source; line and column count from 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
    /// Byte offset from the start of the source
    pub offset: usize,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The lines around `location` with a caret under its column. Empty when
/// the location lies outside `source`.
pub fn format_error_context(source: &str, location: &SourceLocation) -> String {
    let target = location.line as usize;
    if target == 0 || target > source.lines().count() {
        return String::new();
    }
    let gutter = (target + 1).to_string().len().max(3);
    let caret_indent = " ".repeat(location.column.saturating_sub(1) as usize);

    let mut out = String::new();
    let window = source
        .lines()
        .enumerate()
        .map(|(i, text)| (i + 1, text))
        .skip(target.saturating_sub(2))
        .take_while(|&(number, _)| number <= target + 1);
    for (number, text) in window {
        let _ = writeln!(out, "{:>gutter$} | {}", number, text);
        if number == target {
            let _ = writeln!(out, "{:>gutter$} | {}^", "", caret_indent);
        }
    }
    out
}

fn on_new_line(context: &str) -> String {
    if context.is_empty() {
        String::new()
    } else {
        format!("\n{}", context)
    }
}

#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    /// Character the tokenizer cannot start a token with, or unterminated input
    #[error("SyntaxError: {message} at {location}{}", on_new_line(.source_context))]
    LexerError {
        message: String,
        location: SourceLocation,
        source_context: String,
    },

    /// Malformed host syntax or pattern syntax
    #[error("SyntaxError: {message} at {location}{}", on_new_line(.source_context))]
    ParseError {
        message: String,
        /// What the parser was looking for, when it wanted one specific thing
        expected: Option<String>,
        location: SourceLocation,
        source_context: String,
    },

    /// A pattern node reached the compiler in a shape the parser never produces
    #[error("CompileInvariantError: {0}")]
    CompileInvariant(String),

    /// A rest filter was asked to exclude an empty key set
    #[error("RestSpecError: {0}")]
    RestSpec(String),

    /// No clause of a match expression accepted the scrutinee
    #[error("MatchError: {message} at {location}")]
    MatchFailure {
        message: String,
        location: SourceLocation,
    },

    /// Host-visible failure raised by the evaluator itself
    #[error("{kind}: {message}")]
    RuntimeError { kind: ErrorKind, message: String },

    /// A value thrown by host code and not caught
    #[error("Uncaught {}", .0.to_display_string())]
    Thrown(Value),

    #[error("InternalError: {0}")]
    InternalError(String),

    #[error("IOError: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

/// Class of a [`Error::RuntimeError`], as host code sees it in `catch`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::enum_variant_names)]
pub enum ErrorKind {
    TypeError,
    ReferenceError,
    RangeError,
    /// Detected while evaluating, such as a duplicate `let`
    SyntaxError,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorKind::TypeError => "TypeError",
            ErrorKind::ReferenceError => "ReferenceError",
            ErrorKind::RangeError => "RangeError",
            ErrorKind::SyntaxError => "SyntaxError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    pub fn lexer_error_with_context(message: impl Into<String>, location: SourceLocation, source: &str) -> Self {
        Error::LexerError {
            message: message.into(),
            location,
            source_context: format_error_context(source, &location),
        }
    }

    /// Parse error without a source excerpt; see [`Error::with_source_context`]
    pub fn parse_error(message: impl Into<String>, location: SourceLocation) -> Self {
        Error::ParseError {
            message: message.into(),
            expected: None,
            location,
            source_context: String::new(),
        }
    }

    pub fn parse_error_with_context(message: impl Into<String>, location: SourceLocation, source: &str) -> Self {
        Error::parse_error(message, location).with_source_context(source)
    }

    /// "Expected `expected`, found `found`", remembering what was expected
    pub fn unexpected_token(
        expected: impl Into<String>,
        found: impl fmt::Display,
        location: SourceLocation,
        source: &str,
    ) -> Self {
        let expected = expected.into();
        let message = format!("{} {}, found {}", messages::UNEXPECTED_TOKEN_EXPECTED, expected, found);
        Error::ParseError {
            message,
            expected: Some(expected),
            location,
            source_context: String::new(),
        }
        .with_source_context(source)
    }

    /// Attach the source excerpt to a syntax error; other errors pass through
    pub fn with_source_context(mut self, source: &str) -> Self {
        if let Error::LexerError { location, source_context, .. }
        | Error::ParseError { location, source_context, .. } = &mut self
        {
            *source_context = format_error_context(source, location);
        }
        self
    }

    pub fn compile_invariant(message: impl Into<String>) -> Self {
        Error::CompileInvariant(message.into())
    }

    fn runtime(kind: ErrorKind, message: impl Into<String>) -> Self {
        Error::RuntimeError { kind, message: message.into() }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Error::runtime(ErrorKind::TypeError, message)
    }

    pub fn reference_error(message: impl Into<String>) -> Self {
        Error::runtime(ErrorKind::ReferenceError, message)
    }

    pub fn range_error(message: impl Into<String>) -> Self {
        Error::runtime(ErrorKind::RangeError, message)
    }

    /// A syntax error found while evaluating rather than parsing
    pub fn syntax_error(message: impl Into<String>) -> Self {
        Error::runtime(ErrorKind::SyntaxError, message)
    }

    /// The runtime "no clause matched" failure
    pub fn match_failure(message: impl Into<String>, location: SourceLocation) -> Self {
        Error::MatchFailure { message: message.into(), location }
    }

    pub fn rest_spec(message: impl Into<String>) -> Self {
        Error::RestSpec(message.into())
    }

    pub fn is_match_failure(&self) -> bool {
        matches!(self, Error::MatchFailure { .. })
    }

    /// Whether host `try`/`catch` may intercept this error
    pub fn is_catchable(&self) -> bool {
        matches!(self, Error::MatchFailure { .. } | Error::RuntimeError { .. } | Error::Thrown(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Message fragments shared by the parser and evaluator
pub mod messages {
    pub const NOT_A_FUNCTION: &str = "is not a function";
    pub const NOT_A_CONSTRUCTOR: &str = "is not a constructor";
    pub const CANNOT_READ_PROPERTY: &str = "Cannot read properties of";
    pub const IS_NOT_DEFINED: &str = "is not defined";
    pub const ALREADY_DECLARED: &str = "has already been declared";
    pub const ASSIGNMENT_TO_CONSTANT: &str = "Assignment to constant variable";
    pub const MAXIMUM_CALL_STACK: &str = "Maximum call stack size exceeded";

    pub const UNEXPECTED_TOKEN_EXPECTED: &str = "Expected";
    pub const UNEXPECTED_END: &str = "Unexpected end of input";

    /// Default message of the runtime match failure
    pub const NO_PATTERN_MATCHED: &str = "No patterns are matched";

    pub fn not_a_function(name: &str) -> String {
        format!("{} {}", name, NOT_A_FUNCTION)
    }

    pub fn not_a_constructor(name: &str) -> String {
        format!("{} {}", name, NOT_A_CONSTRUCTOR)
    }

    /// "Cannot read properties of undefined (reading 'x')"
    pub fn cannot_read_property(prop: &str, of: &str) -> String {
        format!("{} {} (reading '{}')", CANNOT_READ_PROPERTY, of, prop)
    }

    pub fn not_defined(name: &str) -> String {
        format!("{} {}", name, IS_NOT_DEFINED)
    }

    pub fn already_declared(name: &str) -> String {
        format!("Identifier '{}' {}", name, ALREADY_DECLARED)
    }
}
