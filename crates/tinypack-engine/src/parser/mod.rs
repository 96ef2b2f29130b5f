//! Lexer and statement-level parser for JavaScript modules.
//!
//! The parser only looks as deep as module linking needs: import
//! declarations, default exports, and load calls at the top level. Other
//! statements are kept as verbatim source text.
//!
//! # Example
//!
//! ```ignore
//! use tinypack_engine::parser::{parse_module, Statement};
//!
//! let module = parse_module("import b from './b.js';\nconsole.log(b);").unwrap();
//! assert!(matches!(module.body[0], Statement::Import(_)));
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod statement;
pub mod token;

pub use ast::*;
pub use error::{ParseError, ParseErrorKind, SyntaxError};
pub use lexer::{LexError, Lexer};
pub use statement::Parser;
pub use token::{Span, Token};

/// Parse a module's source into its syntax tree.
pub fn parse_module(source: &str) -> Result<Module, SyntaxError> {
    let parser = Parser::new(source).map_err(SyntaxError::Lex)?;
    parser.parse().map_err(SyntaxError::Parse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lex_errors_are_reported() {
        let err = parse_module("const s = 'open").unwrap_err();
        assert!(matches!(err, SyntaxError::Lex(_)));
        assert_eq!(err.span().map(|s| s.line), Some(1));
    }

    #[test]
    fn test_parse_errors_are_reported() {
        let err = parse_module("const x = 1;\nfoo(]\n").unwrap_err();
        assert!(matches!(err, SyntaxError::Parse(_)));
        assert!(err.to_string().contains("2:"), "got: {}", err);
    }

    #[test]
    fn test_empty_source() {
        let module = parse_module("").unwrap();
        assert!(module.body.is_empty());
    }
}
