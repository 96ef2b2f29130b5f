//! Parse error types and error reporting

use super::lexer::LexError;
use super::token::{Span, Token};
use std::fmt;
use thiserror::Error;

/// A parse error with location and contextual information.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// The kind of error that occurred
    pub kind: ParseErrorKind,

    /// Source location of the error
    pub span: Span,

    /// Human-readable error message
    pub message: String,
}

/// The kind of parse error.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// Unexpected token found
    UnexpectedToken { expected: String, found: Token },

    /// Unexpected end of file
    UnexpectedEof { expected: String },

    /// An opening delimiter was never closed
    UnclosedDelimiter { open: Token },

    /// A closing delimiter does not match the innermost open one
    MismatchedDelimiter { open: Token, found: Token },

    /// A closing delimiter with nothing open
    UnmatchedDelimiter { found: Token },

    /// Invalid syntax
    InvalidSyntax { reason: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parse error at {}:{}: {}",
            self.span.line, self.span.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}

impl ParseError {
    /// Create an "unexpected token" error.
    pub fn unexpected_token(expected: impl Into<String>, found: Token, span: Span) -> Self {
        let expected = expected.into();
        if found == Token::Eof {
            return Self::unexpected_eof(expected, span);
        }
        let message = format!("Expected {}, found '{}'", expected, found);
        Self {
            kind: ParseErrorKind::UnexpectedToken { expected, found },
            span,
            message,
        }
    }

    /// Create an "unexpected EOF" error.
    pub fn unexpected_eof(expected: impl Into<String>, span: Span) -> Self {
        let expected = expected.into();
        let message = format!("Unexpected end of file, expected {}", expected);
        Self {
            kind: ParseErrorKind::UnexpectedEof { expected },
            span,
            message,
        }
    }

    /// Create an "unclosed delimiter" error.
    pub fn unclosed_delimiter(open: Token, span: Span) -> Self {
        let message = format!("Unclosed delimiter '{}'", open);
        Self {
            kind: ParseErrorKind::UnclosedDelimiter { open },
            span,
            message,
        }
    }

    /// Create a "mismatched delimiter" error.
    pub fn mismatched_delimiter(open: Token, found: Token, span: Span) -> Self {
        let message = format!("Delimiter '{}' does not close '{}'", found, open);
        Self {
            kind: ParseErrorKind::MismatchedDelimiter { open, found },
            span,
            message,
        }
    }

    /// Create an "unmatched delimiter" error.
    pub fn unmatched_delimiter(found: Token, span: Span) -> Self {
        let message = format!("Unmatched closing delimiter '{}'", found);
        Self {
            kind: ParseErrorKind::UnmatchedDelimiter { found },
            span,
            message,
        }
    }

    /// Create an "invalid syntax" error.
    pub fn invalid_syntax(reason: impl Into<String>, span: Span) -> Self {
        let reason = reason.into();
        let message = format!("Invalid syntax: {}", reason);
        Self {
            kind: ParseErrorKind::InvalidSyntax { reason },
            span,
            message,
        }
    }
}

/// Why a module's source could not be turned into a syntax tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyntaxError {
    #[error("{}", join_errors(.0))]
    Lex(Vec<LexError>),

    #[error("{}", join_errors(.0))]
    Parse(Vec<ParseError>),
}

impl SyntaxError {
    /// Location of the first reported error.
    pub fn span(&self) -> Option<Span> {
        match self {
            SyntaxError::Lex(errors) => errors.first().map(|e| *e.span()),
            SyntaxError::Parse(errors) => errors.first().map(|e| e.span),
        }
    }
}

fn join_errors<E: fmt::Display>(errors: &[E]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
