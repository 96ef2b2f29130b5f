//! Token definitions for JavaScript module sources.
//!
//! Only the words that matter for statement boundaries, regular expression
//! detection and module syntax are keywords here. Contextual words such as
//! `from`, `as` and `of` stay identifiers and are matched by text.

use std::fmt;

/// A JavaScript token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Declarations
    Function,
    Class,
    Const,
    Let,
    Var,
    Async,
    Extends,

    // Modules
    Import,
    Export,
    Default,

    // Control flow
    If,
    Else,
    For,
    While,
    Do,
    Return,
    Throw,
    Case,
    Catch,
    Finally,

    // Operators spelled as words
    Typeof,
    Instanceof,
    In,
    New,
    Delete,
    Void,
    Yield,
    Await,

    // Values spelled as words
    This,
    Super,
    True,
    False,
    Null,

    // Literals
    Number(String),
    StringLiteral(String),
    /// Template literal, substitutions included. The raw text is recovered from the span.
    Template,
    /// Regular expression literal, flags included.
    Regex,

    // Names
    Identifier(String),
    PrivateName(String),

    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    StarStar,

    // Unary
    PlusPlus,
    MinusMinus,
    Bang,
    Tilde,

    // Comparison
    EqualEqual,
    BangEqual,
    EqualEqualEqual,
    BangEqualEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,

    // Logical
    AmpAmp,
    PipePipe,
    QuestionQuestion,

    // Bitwise
    Amp,
    Pipe,
    Caret,
    LessLess,
    GreaterGreater,
    GreaterGreaterGreater,

    // Assignment
    Equal,
    PlusEqual,
    MinusEqual,
    StarEqual,
    SlashEqual,
    PercentEqual,
    StarStarEqual,
    AmpEqual,
    PipeEqual,
    CaretEqual,
    LessLessEqual,
    GreaterGreaterEqual,
    GreaterGreaterGreaterEqual,
    AmpAmpEqual,
    PipePipeEqual,
    QuestionQuestionEqual,

    // Other
    Question,
    QuestionDot,
    DotDotDot,
    Dot,
    Colon,
    Arrow,
    At,

    // Delimiters
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Semicolon,
    Comma,

    // Special
    Eof,
}

/// Source location information for a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    /// Span covering `self` through `other`, keeping `self`'s line and column.
    pub fn to(&self, other: &Span) -> Span {
        Span {
            start: self.start,
            end: other.end.max(self.end),
            line: self.line,
            column: self.column,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(word) = self.keyword_str() {
            return write!(f, "{}", word);
        }
        match self {
            Token::Number(raw) => write!(f, "{}", raw),
            Token::StringLiteral(_) => write!(f, "<string>"),
            Token::Template => write!(f, "`...`"),
            Token::Regex => write!(f, "/.../"),
            Token::Identifier(name) => write!(f, "{}", name),
            Token::PrivateName(name) => write!(f, "#{}", name),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::StarStar => write!(f, "**"),
            Token::PlusPlus => write!(f, "++"),
            Token::MinusMinus => write!(f, "--"),
            Token::Bang => write!(f, "!"),
            Token::Tilde => write!(f, "~"),
            Token::EqualEqual => write!(f, "=="),
            Token::BangEqual => write!(f, "!="),
            Token::EqualEqualEqual => write!(f, "==="),
            Token::BangEqualEqual => write!(f, "!=="),
            Token::Less => write!(f, "<"),
            Token::LessEqual => write!(f, "<="),
            Token::Greater => write!(f, ">"),
            Token::GreaterEqual => write!(f, ">="),
            Token::AmpAmp => write!(f, "&&"),
            Token::PipePipe => write!(f, "||"),
            Token::QuestionQuestion => write!(f, "??"),
            Token::Amp => write!(f, "&"),
            Token::Pipe => write!(f, "|"),
            Token::Caret => write!(f, "^"),
            Token::LessLess => write!(f, "<<"),
            Token::GreaterGreater => write!(f, ">>"),
            Token::GreaterGreaterGreater => write!(f, ">>>"),
            Token::Equal => write!(f, "="),
            Token::PlusEqual => write!(f, "+="),
            Token::MinusEqual => write!(f, "-="),
            Token::StarEqual => write!(f, "*="),
            Token::SlashEqual => write!(f, "/="),
            Token::PercentEqual => write!(f, "%="),
            Token::StarStarEqual => write!(f, "**="),
            Token::AmpEqual => write!(f, "&="),
            Token::PipeEqual => write!(f, "|="),
            Token::CaretEqual => write!(f, "^="),
            Token::LessLessEqual => write!(f, "<<="),
            Token::GreaterGreaterEqual => write!(f, ">>="),
            Token::GreaterGreaterGreaterEqual => write!(f, ">>>="),
            Token::AmpAmpEqual => write!(f, "&&="),
            Token::PipePipeEqual => write!(f, "||="),
            Token::QuestionQuestionEqual => write!(f, "??="),
            Token::Question => write!(f, "?"),
            Token::QuestionDot => write!(f, "?."),
            Token::DotDotDot => write!(f, "..."),
            Token::Dot => write!(f, "."),
            Token::Colon => write!(f, ":"),
            Token::Arrow => write!(f, "=>"),
            Token::At => write!(f, "@"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::Semicolon => write!(f, ";"),
            Token::Comma => write!(f, ","),
            Token::Eof => write!(f, "EOF"),
            _ => unreachable!("keywords are written above"),
        }
    }
}

impl Token {
    /// The source spelling of a keyword token.
    pub fn keyword_str(&self) -> Option<&'static str> {
        let word = match self {
            Token::Function => "function",
            Token::Class => "class",
            Token::Const => "const",
            Token::Let => "let",
            Token::Var => "var",
            Token::Async => "async",
            Token::Extends => "extends",
            Token::Import => "import",
            Token::Export => "export",
            Token::Default => "default",
            Token::If => "if",
            Token::Else => "else",
            Token::For => "for",
            Token::While => "while",
            Token::Do => "do",
            Token::Return => "return",
            Token::Throw => "throw",
            Token::Case => "case",
            Token::Catch => "catch",
            Token::Finally => "finally",
            Token::Typeof => "typeof",
            Token::Instanceof => "instanceof",
            Token::In => "in",
            Token::New => "new",
            Token::Delete => "delete",
            Token::Void => "void",
            Token::Yield => "yield",
            Token::Await => "await",
            Token::This => "this",
            Token::Super => "super",
            Token::True => "true",
            Token::False => "false",
            Token::Null => "null",
            _ => return None,
        };
        Some(word)
    }

    /// Returns true if this token is a keyword.
    pub fn is_keyword(&self) -> bool {
        self.keyword_str().is_some()
    }

    /// The text of a token usable as a property name after `.` (identifiers and keywords).
    pub fn identifier_name(&self) -> Option<&str> {
        match self {
            Token::Identifier(name) => Some(name),
            other => other.keyword_str(),
        }
    }

    /// Returns true if this token is the identifier `word`.
    pub fn is_word(&self, word: &str) -> bool {
        matches!(self, Token::Identifier(name) if name == word)
    }

    /// Returns true if this token is a literal.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Token::Number(_)
                | Token::StringLiteral(_)
                | Token::Template
                | Token::Regex
                | Token::True
                | Token::False
                | Token::Null
        )
    }

    /// Returns true if an expression may end with this token.
    ///
    /// Used together with [`Token::continues_expression`] to decide where a
    /// line break terminates a statement.
    pub fn ends_expression(&self) -> bool {
        self.is_literal()
            || matches!(
                self,
                Token::Identifier(_)
                    | Token::PrivateName(_)
                    | Token::This
                    | Token::Super
                    | Token::RightParen
                    | Token::RightBracket
                    | Token::RightBrace
                    | Token::PlusPlus
                    | Token::MinusMinus
            )
    }

    /// Returns true if this token, at the start of a line, continues the previous statement.
    pub fn continues_expression(&self) -> bool {
        matches!(
            self,
            Token::Dot
                | Token::QuestionDot
                | Token::LeftParen
                | Token::LeftBracket
                | Token::Template
                | Token::Comma
                | Token::Question
                | Token::Colon
                | Token::Arrow
                | Token::Plus
                | Token::Minus
                | Token::Star
                | Token::Slash
                | Token::Percent
                | Token::StarStar
                | Token::EqualEqual
                | Token::BangEqual
                | Token::EqualEqualEqual
                | Token::BangEqualEqual
                | Token::Less
                | Token::LessEqual
                | Token::Greater
                | Token::GreaterEqual
                | Token::AmpAmp
                | Token::PipePipe
                | Token::QuestionQuestion
                | Token::Amp
                | Token::Pipe
                | Token::Caret
                | Token::LessLess
                | Token::GreaterGreater
                | Token::GreaterGreaterGreater
                | Token::Instanceof
                | Token::In
                | Token::Else
                | Token::Catch
                | Token::Finally
                | Token::Extends
        ) || self.is_assignment()
    }

    /// Returns true if this token is an assignment operator.
    pub fn is_assignment(&self) -> bool {
        matches!(
            self,
            Token::Equal
                | Token::PlusEqual
                | Token::MinusEqual
                | Token::StarEqual
                | Token::SlashEqual
                | Token::PercentEqual
                | Token::StarStarEqual
                | Token::AmpEqual
                | Token::PipeEqual
                | Token::CaretEqual
                | Token::LessLessEqual
                | Token::GreaterGreaterEqual
                | Token::GreaterGreaterGreaterEqual
                | Token::AmpAmpEqual
                | Token::PipePipeEqual
                | Token::QuestionQuestionEqual
        )
    }

    /// Returns true if this keyword is followed by a parenthesized head and then a body.
    pub fn opens_control_head(&self) -> bool {
        matches!(self, Token::If | Token::For | Token::While | Token::Catch)
            || self.is_word("with")
            || self.is_word("switch")
    }

    /// Returns true if a `/` following this token starts a regular expression
    /// rather than a division.
    ///
    /// `)` and `}` need statement context the token alone does not carry; the
    /// lexer handles those.
    pub fn allows_regex_after(&self) -> bool {
        match self {
            Token::Return
            | Token::Throw
            | Token::Case
            | Token::Do
            | Token::Else
            | Token::Typeof
            | Token::Instanceof
            | Token::In
            | Token::New
            | Token::Delete
            | Token::Void
            | Token::Yield
            | Token::Await => true,
            other => !other.ends_expression(),
        }
    }
}
