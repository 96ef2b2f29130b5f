//! Lexer for JavaScript module sources.
//!
//! Regular tokens are produced by logos. Whitespace, comments, template
//! literals and regular expression literals are scanned by hand around it,
//! because where they end depends on context logos cannot see: a `/` is a
//! division or the start of a regex depending on the statement around it, and a
//! template substitution ends at the `}` that balances its `${`.

use super::token::{Span, Token};
use logos::Logos;
use thiserror::Error;

/// Logos-based token enum for lexing.
///
/// Converted to [`Token`] right after lexing.
#[derive(Logos, Debug, Clone, PartialEq)]
enum LogosToken {
    #[token("function")]
    Function,

    #[token("class")]
    Class,

    #[token("const")]
    Const,

    #[token("let")]
    Let,

    #[token("var")]
    Var,

    #[token("async")]
    Async,

    #[token("extends")]
    Extends,

    #[token("import")]
    Import,

    #[token("export")]
    Export,

    #[token("default")]
    Default,

    #[token("if")]
    If,

    #[token("else")]
    Else,

    #[token("for")]
    For,

    #[token("while")]
    While,

    #[token("do")]
    Do,

    #[token("return")]
    Return,

    #[token("throw")]
    Throw,

    #[token("case")]
    Case,

    #[token("catch")]
    Catch,

    #[token("finally")]
    Finally,

    #[token("typeof")]
    Typeof,

    #[token("instanceof")]
    Instanceof,

    #[token("in")]
    In,

    #[token("new")]
    New,

    #[token("delete")]
    Delete,

    #[token("void")]
    Void,

    #[token("yield")]
    Yield,

    #[token("await")]
    Await,

    #[token("this")]
    This,

    #[token("super")]
    Super,

    #[token("true")]
    True,

    #[token("false")]
    False,

    #[token("null")]
    Null,

    // Identifiers (must come after keywords)
    #[regex(r"[a-zA-Z_$\x{80}-\x{10FFFF}][a-zA-Z0-9_$\x{80}-\x{10FFFF}]*", |lex| lex.slice().to_string())]
    Identifier(String),

    #[regex(r"#[a-zA-Z_$\x{80}-\x{10FFFF}][a-zA-Z0-9_$\x{80}-\x{10FFFF}]*", |lex| lex.slice()[1..].to_string())]
    PrivateName(String),

    // Numbers keep their source spelling; the bundler never evaluates them
    #[regex(r"0[xX][0-9a-fA-F][0-9a-fA-F_]*n?", |lex| lex.slice().to_string())]
    #[regex(r"0[bB][01][01_]*n?", |lex| lex.slice().to_string())]
    #[regex(r"0[oO][0-7][0-7_]*n?", |lex| lex.slice().to_string())]
    #[regex(r"[0-9][0-9_]*n", |lex| lex.slice().to_string())]
    #[regex(r"[0-9][0-9_]*(\.[0-9_]*)?([eE][+-]?[0-9][0-9_]*)?", |lex| lex.slice().to_string())]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9][0-9_]*)?", |lex| lex.slice().to_string())]
    Number(String),

    // Strings
    #[regex(r#""([^"\\\r\n]|\\[^\r\n]|\\\r?\n)*""#, parse_string)]
    #[regex(r#"'([^'\\\r\n]|\\[^\r\n]|\\\r?\n)*'"#, parse_string)]
    StringLiteral(String),

    // Operators (longest match wins)
    #[token(">>>=")]
    GreaterGreaterGreaterEqual,

    #[token("===")]
    EqualEqualEqual,

    #[token("!==")]
    BangEqualEqual,

    #[token(">>>")]
    GreaterGreaterGreater,

    #[token("**=")]
    StarStarEqual,

    #[token("<<=")]
    LessLessEqual,

    #[token(">>=")]
    GreaterGreaterEqual,

    #[token("&&=")]
    AmpAmpEqual,

    #[token("||=")]
    PipePipeEqual,

    #[token("??=")]
    QuestionQuestionEqual,

    #[token("...")]
    DotDotDot,

    #[token("**")]
    StarStar,

    #[token("==")]
    EqualEqual,

    #[token("!=")]
    BangEqual,

    #[token("<=")]
    LessEqual,

    #[token(">=")]
    GreaterEqual,

    #[token("&&")]
    AmpAmp,

    #[token("||")]
    PipePipe,

    #[token("??")]
    QuestionQuestion,

    #[token("++")]
    PlusPlus,

    #[token("--")]
    MinusMinus,

    #[token("<<")]
    LessLess,

    #[token(">>")]
    GreaterGreater,

    #[token("?.")]
    QuestionDot,

    #[token("=>")]
    Arrow,

    #[token("+=")]
    PlusEqual,

    #[token("-=")]
    MinusEqual,

    #[token("*=")]
    StarEqual,

    #[token("/=")]
    SlashEqual,

    #[token("%=")]
    PercentEqual,

    #[token("&=")]
    AmpEqual,

    #[token("|=")]
    PipeEqual,

    #[token("^=")]
    CaretEqual,

    // Single-character tokens
    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("%")]
    Percent,

    #[token("!")]
    Bang,

    #[token("~")]
    Tilde,

    #[token("<")]
    Less,

    #[token(">")]
    Greater,

    #[token("&")]
    Amp,

    #[token("|")]
    Pipe,

    #[token("^")]
    Caret,

    #[token("=")]
    Equal,

    #[token("?")]
    Question,

    #[token(".")]
    Dot,

    #[token(":")]
    Colon,

    #[token("@")]
    At,

    #[token("(")]
    LeftParen,

    #[token(")")]
    RightParen,

    #[token("{")]
    LeftBrace,

    #[token("}")]
    RightBrace,

    #[token("[")]
    LeftBracket,

    #[token("]")]
    RightBracket,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,
}

fn parse_string(lex: &mut logos::Lexer<'_, LogosToken>) -> String {
    let s = lex.slice();
    unescape_string(&s[1..s.len() - 1])
}

/// Decode the escape sequences of a string literal body.
///
/// Malformed escapes decode to the escaped character itself.
fn unescape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('t') => result.push('\t'),
            Some('b') => result.push('\u{8}'),
            Some('f') => result.push('\u{c}'),
            Some('v') => result.push('\u{b}'),
            Some('0') => result.push('\0'),
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => result.push(decoded),
                    None => result.push_str(&hex),
                }
            }
            Some('u') => {
                let hex: String = if chars.peek() == Some(&'{') {
                    chars.next();
                    chars.by_ref().take_while(|&c| c != '}').collect()
                } else {
                    chars.by_ref().take(4).collect()
                };
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => result.push(decoded),
                    None => result.push_str(&hex),
                }
            }
            // Line continuation
            Some('\r') => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            Some('\n') | Some('\u{2028}') | Some('\u{2029}') => {}
            Some(other) => result.push(other),
            None => break,
        }
    }

    result
}

/// Lexer error types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("Unexpected character '{char}' at {}:{}", .span.line, .span.column)]
    UnexpectedCharacter { char: char, span: Span },

    #[error("Unterminated string literal at {}:{}", .span.line, .span.column)]
    UnterminatedString { span: Span },

    #[error("Unterminated template literal at {}:{}", .span.line, .span.column)]
    UnterminatedTemplate { span: Span },

    #[error("Unterminated regular expression at {}:{}", .span.line, .span.column)]
    UnterminatedRegex { span: Span },

    #[error("Unterminated block comment at {}:{}", .span.line, .span.column)]
    UnterminatedComment { span: Span },
}

impl LexError {
    /// Get the span of this error
    pub fn span(&self) -> &Span {
        match self {
            LexError::UnexpectedCharacter { span, .. }
            | LexError::UnterminatedString { span }
            | LexError::UnterminatedTemplate { span }
            | LexError::UnterminatedRegex { span }
            | LexError::UnterminatedComment { span } => span,
        }
    }
}

/// Maps byte offsets to 1-based line and column numbers.
#[derive(Debug, Clone)]
pub(crate) struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub(crate) fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        Self { line_starts }
    }

    pub(crate) fn span(&self, source: &str, start: usize, end: usize) -> Span {
        let line = self.line_starts.partition_point(|&s| s <= start);
        let line_start = self.line_starts[line - 1];
        let column = source[line_start..start].chars().count() + 1;
        Span::new(start, end, line as u32, column as u32)
    }
}

/// What an open `(`, `[` or `{` belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Opener {
    /// The head of `if (...)`, `for (...)` and the like
    ControlHead,
    /// A block or declaration body; its `}` ends a statement
    Block,
    Group,
}

/// Statement context carried from token to token.
///
/// A `/` after `)` or `}` is a division inside an expression but starts a
/// regex after a control head or at the start of the next statement, so the
/// lexer tracks what each open delimiter belongs to.
#[derive(Debug, Default)]
struct SlashContext {
    open: Vec<Opener>,
    prev: Option<Token>,
    /// The next token begins a statement
    statement_start: bool,
    /// The previous token was a keyword whose `(` opens a control head
    control_keyword: bool,
    /// Nesting depth at which a declaration body `{` is expected
    pending_body: Option<usize>,
}

impl SlashContext {
    fn module() -> Self {
        Self {
            statement_start: true,
            ..Self::default()
        }
    }

    /// Context for the expression of a `${ ... }` substitution.
    fn substitution() -> Self {
        Self {
            prev: Some(Token::LeftBrace),
            ..Self::default()
        }
    }

    fn regex_allowed(&self) -> bool {
        self.statement_start || self.prev.as_ref().map_or(true, Token::allows_regex_after)
    }

    fn advance(&mut self, token: &Token, line_break_before: bool) {
        // Automatic semicolon insertion starts a statement here
        let statement_start = self.statement_start
            || (line_break_before
                && self.prev.as_ref().is_some_and(Token::ends_expression)
                && !token.continues_expression());

        let mut next_start = false;
        match token {
            Token::LeftParen => self.open.push(if self.control_keyword {
                Opener::ControlHead
            } else {
                Opener::Group
            }),
            Token::LeftBracket => self.open.push(Opener::Group),
            Token::LeftBrace => {
                let body = self.pending_body == Some(self.open.len());
                if body {
                    self.pending_body = None;
                }
                let block = body || statement_start || self.prev == Some(Token::Arrow);
                self.open.push(if block { Opener::Block } else { Opener::Group });
                next_start = block;
            }
            Token::RightParen => next_start = self.open.pop() == Some(Opener::ControlHead),
            Token::RightBrace => next_start = self.open.pop() == Some(Opener::Block),
            Token::RightBracket => {
                self.open.pop();
            }
            Token::Semicolon | Token::Else | Token::Do | Token::Finally => next_start = true,
            Token::Identifier(word) if word == "try" => next_start = true,
            Token::Export | Token::Default | Token::Async => next_start = statement_start,
            Token::Function | Token::Class if statement_start => {
                self.pending_body = Some(self.open.len());
            }
            _ => {}
        }

        // `for await (` keeps the head pending
        self.control_keyword = token.opens_control_head()
            || (*token == Token::Await && self.control_keyword);
        self.statement_start = next_start;
        self.prev = Some(token.clone());
    }
}

/// Main lexer structure.
pub struct Lexer<'a> {
    source: &'a str,
    lines: LineIndex,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            lines: LineIndex::new(source),
        }
    }

    /// Tokenize the whole source, appending an `Eof` token.
    ///
    /// Lexing continues past an unexpected character so that every such
    /// character is reported; unterminated constructs end the scan.
    pub fn tokenize(self) -> Result<Vec<(Token, Span)>, Vec<LexError>> {
        let mut tokens: Vec<(Token, Span)> = Vec::new();
        let mut errors = Vec::new();
        let mut context = SlashContext::module();
        let mut pos = 0;

        loop {
            match self.next_token(pos, context.regex_allowed()) {
                Ok(Some((token, start, end))) => {
                    context.advance(&token, self.line_break_between(pos, start));
                    tokens.push((token, self.span(start, end)));
                    pos = end;
                }
                Ok(None) => break,
                Err(err) => {
                    pos = match &err {
                        LexError::UnexpectedCharacter { span, .. } => span.end,
                        _ => self.source.len(),
                    };
                    errors.push(err);
                }
            }
        }

        let len = self.source.len();
        tokens.push((Token::Eof, self.span(len, len)));

        if errors.is_empty() {
            Ok(tokens)
        } else {
            Err(errors)
        }
    }

    fn span(&self, start: usize, end: usize) -> Span {
        self.lines.span(self.source, start, end)
    }

    fn line_break_between(&self, from: usize, to: usize) -> bool {
        self.source[from..to].contains(['\n', '\r', '\u{2028}', '\u{2029}'])
    }

    /// Lex one token starting at or after `pos`.
    ///
    /// Returns the token with its start and end offsets, or `None` at end of input.
    fn next_token(
        &self,
        pos: usize,
        regex_allowed: bool,
    ) -> Result<Option<(Token, usize, usize)>, LexError> {
        let start = self.skip_trivia(pos)?;
        let rest = &self.source[start..];
        let Some(first) = rest.chars().next() else {
            return Ok(None);
        };

        if first == '`' {
            let end = self.scan_template(start)?;
            return Ok(Some((Token::Template, start, end)));
        }

        if first == '/' && regex_allowed {
            let end = self.scan_regex(start)?;
            return Ok(Some((Token::Regex, start, end)));
        }

        let mut logos_lexer = LogosToken::lexer(rest);
        match logos_lexer.next() {
            Some(Ok(logos_token)) => {
                let end = start + logos_lexer.span().end;
                Ok(Some((convert_token(logos_token), start, end)))
            }
            Some(Err(())) => {
                let span = self.span(start, start + first.len_utf8());
                if first == '"' || first == '\'' {
                    Err(LexError::UnterminatedString { span })
                } else {
                    Err(LexError::UnexpectedCharacter { char: first, span })
                }
            }
            None => Ok(None),
        }
    }

    /// Skip whitespace, comments and a leading hashbang line.
    fn skip_trivia(&self, mut pos: usize) -> Result<usize, LexError> {
        let source = self.source;

        if pos == 0 && source.starts_with("#!") {
            pos = source.find('\n').unwrap_or(source.len());
        }

        while let Some(c) = source[pos..].chars().next() {
            if c.is_whitespace() || c == '\u{feff}' {
                pos += c.len_utf8();
            } else if source[pos..].starts_with("//") {
                pos = source[pos..]
                    .find('\n')
                    .map_or(source.len(), |offset| pos + offset);
            } else if source[pos..].starts_with("/*") {
                match source[pos + 2..].find("*/") {
                    Some(offset) => pos += offset + 4,
                    None => {
                        return Err(LexError::UnterminatedComment {
                            span: self.span(pos, source.len()),
                        })
                    }
                }
            } else {
                break;
            }
        }

        Ok(pos)
    }

    /// Scan a template literal starting at the opening backtick.
    ///
    /// Returns the offset just past the closing backtick.
    fn scan_template(&self, start: usize) -> Result<usize, LexError> {
        let bytes = self.source.as_bytes();
        let mut pos = start + 1;

        while pos < bytes.len() {
            match bytes[pos] {
                b'\\' => pos += 2,
                b'`' => return Ok(pos + 1),
                b'$' if bytes.get(pos + 1) == Some(&b'{') => {
                    pos = self.scan_substitution(start, pos + 2)?;
                }
                _ => pos += 1,
            }
        }

        Err(LexError::UnterminatedTemplate {
            span: self.span(start, self.source.len()),
        })
    }

    /// Scan the expression of a `${ ... }` substitution.
    ///
    /// Returns the offset just past the `}` that closes it.
    fn scan_substitution(&self, template_start: usize, mut pos: usize) -> Result<usize, LexError> {
        let mut depth = 0usize;
        let mut context = SlashContext::substitution();

        while let Some((token, start, end)) = self.next_token(pos, context.regex_allowed())? {
            match token {
                Token::LeftBrace => depth += 1,
                Token::RightBrace if depth == 0 => return Ok(end),
                Token::RightBrace => depth -= 1,
                _ => {}
            }
            context.advance(&token, self.line_break_between(pos, start));
            pos = end;
        }

        Err(LexError::UnterminatedTemplate {
            span: self.span(template_start, self.source.len()),
        })
    }

    /// Scan a regular expression literal starting at the opening slash.
    ///
    /// Returns the offset just past its flags.
    fn scan_regex(&self, start: usize) -> Result<usize, LexError> {
        let bytes = self.source.as_bytes();
        let mut pos = start + 1;
        let mut in_class = false;

        loop {
            match bytes.get(pos) {
                None | Some(b'\n') | Some(b'\r') => {
                    return Err(LexError::UnterminatedRegex {
                        span: self.span(start, pos),
                    })
                }
                Some(b'\\') => pos += 2,
                Some(b'[') => {
                    in_class = true;
                    pos += 1;
                }
                Some(b']') => {
                    in_class = false;
                    pos += 1;
                }
                Some(b'/') if !in_class => {
                    pos += 1;
                    break;
                }
                Some(_) => pos += 1,
            }
        }

        while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_') {
            pos += 1;
        }

        Ok(pos)
    }
}

fn convert_token(logos_token: LogosToken) -> Token {
    match logos_token {
        LogosToken::Function => Token::Function,
        LogosToken::Class => Token::Class,
        LogosToken::Const => Token::Const,
        LogosToken::Let => Token::Let,
        LogosToken::Var => Token::Var,
        LogosToken::Async => Token::Async,
        LogosToken::Extends => Token::Extends,
        LogosToken::Import => Token::Import,
        LogosToken::Export => Token::Export,
        LogosToken::Default => Token::Default,
        LogosToken::If => Token::If,
        LogosToken::Else => Token::Else,
        LogosToken::For => Token::For,
        LogosToken::While => Token::While,
        LogosToken::Do => Token::Do,
        LogosToken::Return => Token::Return,
        LogosToken::Throw => Token::Throw,
        LogosToken::Case => Token::Case,
        LogosToken::Catch => Token::Catch,
        LogosToken::Finally => Token::Finally,
        LogosToken::Typeof => Token::Typeof,
        LogosToken::Instanceof => Token::Instanceof,
        LogosToken::In => Token::In,
        LogosToken::New => Token::New,
        LogosToken::Delete => Token::Delete,
        LogosToken::Void => Token::Void,
        LogosToken::Yield => Token::Yield,
        LogosToken::Await => Token::Await,
        LogosToken::This => Token::This,
        LogosToken::Super => Token::Super,
        LogosToken::True => Token::True,
        LogosToken::False => Token::False,
        LogosToken::Null => Token::Null,
        LogosToken::Identifier(s) => Token::Identifier(s),
        LogosToken::PrivateName(s) => Token::PrivateName(s),
        LogosToken::Number(s) => Token::Number(s),
        LogosToken::StringLiteral(s) => Token::StringLiteral(s),
        LogosToken::GreaterGreaterGreaterEqual => Token::GreaterGreaterGreaterEqual,
        LogosToken::EqualEqualEqual => Token::EqualEqualEqual,
        LogosToken::BangEqualEqual => Token::BangEqualEqual,
        LogosToken::GreaterGreaterGreater => Token::GreaterGreaterGreater,
        LogosToken::StarStarEqual => Token::StarStarEqual,
        LogosToken::LessLessEqual => Token::LessLessEqual,
        LogosToken::GreaterGreaterEqual => Token::GreaterGreaterEqual,
        LogosToken::AmpAmpEqual => Token::AmpAmpEqual,
        LogosToken::PipePipeEqual => Token::PipePipeEqual,
        LogosToken::QuestionQuestionEqual => Token::QuestionQuestionEqual,
        LogosToken::DotDotDot => Token::DotDotDot,
        LogosToken::StarStar => Token::StarStar,
        LogosToken::EqualEqual => Token::EqualEqual,
        LogosToken::BangEqual => Token::BangEqual,
        LogosToken::LessEqual => Token::LessEqual,
        LogosToken::GreaterEqual => Token::GreaterEqual,
        LogosToken::AmpAmp => Token::AmpAmp,
        LogosToken::PipePipe => Token::PipePipe,
        LogosToken::QuestionQuestion => Token::QuestionQuestion,
        LogosToken::PlusPlus => Token::PlusPlus,
        LogosToken::MinusMinus => Token::MinusMinus,
        LogosToken::LessLess => Token::LessLess,
        LogosToken::GreaterGreater => Token::GreaterGreater,
        LogosToken::QuestionDot => Token::QuestionDot,
        LogosToken::Arrow => Token::Arrow,
        LogosToken::PlusEqual => Token::PlusEqual,
        LogosToken::MinusEqual => Token::MinusEqual,
        LogosToken::StarEqual => Token::StarEqual,
        LogosToken::SlashEqual => Token::SlashEqual,
        LogosToken::PercentEqual => Token::PercentEqual,
        LogosToken::AmpEqual => Token::AmpEqual,
        LogosToken::PipeEqual => Token::PipeEqual,
        LogosToken::CaretEqual => Token::CaretEqual,
        LogosToken::Plus => Token::Plus,
        LogosToken::Minus => Token::Minus,
        LogosToken::Star => Token::Star,
        LogosToken::Slash => Token::Slash,
        LogosToken::Percent => Token::Percent,
        LogosToken::Bang => Token::Bang,
        LogosToken::Tilde => Token::Tilde,
        LogosToken::Less => Token::Less,
        LogosToken::Greater => Token::Greater,
        LogosToken::Amp => Token::Amp,
        LogosToken::Pipe => Token::Pipe,
        LogosToken::Caret => Token::Caret,
        LogosToken::Equal => Token::Equal,
        LogosToken::Question => Token::Question,
        LogosToken::Dot => Token::Dot,
        LogosToken::Colon => Token::Colon,
        LogosToken::At => Token::At,
        LogosToken::LeftParen => Token::LeftParen,
        LogosToken::RightParen => Token::RightParen,
        LogosToken::LeftBrace => Token::LeftBrace,
        LogosToken::RightBrace => Token::RightBrace,
        LogosToken::LeftBracket => Token::LeftBracket,
        LogosToken::RightBracket => Token::RightBracket,
        LogosToken::Semicolon => Token::Semicolon,
        LogosToken::Comma => Token::Comma,
    }
}
