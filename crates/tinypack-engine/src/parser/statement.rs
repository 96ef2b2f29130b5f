//! Top-level statement parser.
//!
//! Statements are delimited first (balanced delimiters, `;`, and automatic
//! semicolon insertion at line breaks) and classified second. Module syntax
//! is parsed strictly; other statements become verbatim text.

use super::ast::*;
use super::error::ParseError;
use super::lexer::{LexError, Lexer};
use super::token::{Span, Token};

/// Parser over a pre-tokenized module source.
pub struct Parser<'a> {
    source: &'a str,

    /// Pre-tokenized input, terminated by `Eof`
    tokens: Vec<(Token, Span)>,

    /// Current position in token stream
    pos: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser from source code.
    pub fn new(source: &'a str) -> Result<Self, Vec<LexError>> {
        let tokens = Lexer::new(source).tokenize()?;
        Ok(Self {
            source,
            tokens,
            pos: 0,
        })
    }

    /// Parse the entire source into a [`Module`].
    ///
    /// Statements that fail to parse are skipped so that every error is
    /// reported; any error fails the whole module.
    pub fn parse(mut self) -> Result<Module, Vec<ParseError>> {
        let mut body = Vec::new();
        let mut errors = Vec::new();

        while !self.at_eof() {
            let start = self.pos;
            let end = match self.statement_end(start) {
                Ok(end) => end,
                Err(err) => {
                    errors.push(err);
                    break;
                }
            };
            match self.parse_statement(start, end) {
                Ok(Some(stmt)) => body.push(stmt),
                Ok(None) => {}
                Err(err) => errors.push(err),
            }
            self.pos = end;
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Module {
            body,
            span: Span::new(0, self.source.len(), 1, 1),
        })
    }

    // ========================================================================
    // Token Management
    // ========================================================================

    #[inline]
    fn token(&self, index: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[index.min(last)].0
    }

    #[inline]
    fn span_at(&self, index: usize) -> Span {
        let last = self.tokens.len() - 1;
        self.tokens[index.min(last)].1
    }

    #[inline]
    fn at_eof(&self) -> bool {
        matches!(self.token(self.pos), Token::Eof)
    }

    /// Span from the first token of `start..end` through the last.
    fn range_span(&self, start: usize, end: usize) -> Span {
        self.span_at(start).to(&self.span_at(end.max(start + 1) - 1))
    }

    fn verbatim(&self, start: usize, end: usize) -> Verbatim {
        let span = self.range_span(start, end);
        Verbatim {
            text: span.slice(self.source).to_string(),
            span,
        }
    }

    /// Whether a line terminator separates token `index` from the one after it.
    fn line_break_after(&self, index: usize) -> bool {
        let between = &self.source[self.span_at(index).end..self.span_at(index + 1).start];
        between.contains(['\n', '\r', '\u{2028}', '\u{2029}'])
    }

    // ========================================================================
    // Statement Boundaries
    // ========================================================================

    /// Find the index one past the last token of the statement at `start`.
    fn statement_end(&self, start: usize) -> Result<usize, ParseError> {
        let block_declaration = self.is_block_declaration(start);
        let do_while = *self.token(start) == Token::Do;
        let mut open: Vec<usize> = Vec::new();
        // Top-level `(` of a control head; the statement goes on to its body
        let mut head: Option<usize> = None;
        let mut index = start;

        loop {
            let token = self.token(index);
            let mut closes_head = false;
            match token {
                Token::Eof => {
                    return match open.last() {
                        Some(&at) => Err(ParseError::unclosed_delimiter(
                            self.token(at).clone(),
                            self.span_at(at),
                        )),
                        None => Ok(index),
                    };
                }
                Token::LeftParen if open.is_empty() && self.is_control_head(start, index, do_while) => {
                    head = Some(index);
                    open.push(index);
                }
                Token::LeftParen | Token::LeftBracket | Token::LeftBrace => open.push(index),
                Token::RightParen | Token::RightBracket | Token::RightBrace => {
                    let Some(at) = open.pop() else {
                        return Err(ParseError::unmatched_delimiter(
                            token.clone(),
                            self.span_at(index),
                        ));
                    };
                    let opener = self.token(at);
                    let matched = matches!(
                        (opener, token),
                        (Token::LeftParen, Token::RightParen)
                            | (Token::LeftBracket, Token::RightBracket)
                            | (Token::LeftBrace, Token::RightBrace)
                    );
                    if !matched {
                        return Err(ParseError::mismatched_delimiter(
                            opener.clone(),
                            token.clone(),
                            self.span_at(index),
                        ));
                    }
                    // A declaration body ends the declaration
                    if block_declaration && open.is_empty() && *token == Token::RightBrace {
                        return Ok(index + 1);
                    }
                    if head == Some(at) {
                        head = None;
                        closes_head = true;
                    }
                }
                Token::Semicolon if open.is_empty() => return Ok(index + 1),
                _ => {}
            }

            let next = self.token(index + 1);
            if open.is_empty()
                && !closes_head
                && !(do_while && *next == Token::While)
                && *next != Token::Eof
                && token.ends_expression()
                && !next.continues_expression()
                && self.line_break_after(index)
            {
                return Ok(index + 1);
            }

            index += 1;
        }
    }

    /// Whether the `(` at `index` opens the head of `if`, `for`, `while` and the like.
    ///
    /// The `while` closing a `do` statement has no body after its head.
    fn is_control_head(&self, start: usize, index: usize, do_while: bool) -> bool {
        if index == start {
            return false;
        }
        let keyword = match self.token(index - 1) {
            Token::Await if index - 1 > start => self.token(index - 2),
            token => token,
        };
        if *keyword == Token::While && do_while {
            return false;
        }
        keyword.opens_control_head()
    }

    /// `function`, `class` and their `export`/`export default`/`async` forms end at their body.
    fn is_block_declaration(&self, start: usize) -> bool {
        let mut index = start;
        if *self.token(index) == Token::Export {
            index += 1;
            if *self.token(index) == Token::Default {
                index += 1;
            }
        }
        match self.token(index) {
            Token::Function | Token::Class => true,
            Token::Async => *self.token(index + 1) == Token::Function,
            _ => false,
        }
    }

    /// Split `start..end` at top-level `separator` tokens.
    fn split_top_level(&self, start: usize, end: usize, separator: &Token) -> Vec<(usize, usize)> {
        let mut parts = Vec::new();
        let mut depth = 0usize;
        let mut part_start = start;

        for index in start..end {
            match self.token(index) {
                Token::LeftParen | Token::LeftBracket | Token::LeftBrace => depth += 1,
                Token::RightParen | Token::RightBracket | Token::RightBrace => {
                    depth = depth.saturating_sub(1)
                }
                token if depth == 0 && token == separator => {
                    parts.push((part_start, index));
                    part_start = index + 1;
                }
                _ => {}
            }
        }
        parts.push((part_start, end));
        parts
    }

    /// First top-level `=` in `start..end`.
    fn find_top_level_equal(&self, start: usize, end: usize) -> Option<usize> {
        let mut depth = 0usize;
        for index in start..end {
            match self.token(index) {
                Token::LeftParen | Token::LeftBracket | Token::LeftBrace => depth += 1,
                Token::RightParen | Token::RightBracket | Token::RightBrace => {
                    depth = depth.saturating_sub(1)
                }
                Token::Equal if depth == 0 => return Some(index),
                _ => {}
            }
        }
        None
    }

    // ========================================================================
    // Statements
    // ========================================================================

    /// Classify and parse the statement spanning tokens `start..end`.
    ///
    /// Returns `None` for an empty statement.
    fn parse_statement(&self, start: usize, end: usize) -> Result<Option<Statement>, ParseError> {
        let content_end = if *self.token(end - 1) == Token::Semicolon {
            end - 1
        } else {
            end
        };
        if content_end == start {
            return Ok(None);
        }
        let span = self.range_span(start, end);

        let stmt = match self.token(start) {
            Token::Import if !matches!(self.token(start + 1), Token::LeftParen | Token::Dot) => {
                Statement::Import(self.parse_import(start, content_end, span)?)
            }
            Token::Export if *self.token(start + 1) == Token::Default => {
                if start + 2 >= content_end {
                    return Err(ParseError::unexpected_token(
                        "an expression after 'export default'",
                        self.token(start + 2).clone(),
                        self.span_at(start + 2),
                    ));
                }
                Statement::ExportDefault(ExportDefaultDeclaration {
                    declaration: self.parse_expression(start + 2, content_end)?,
                    span,
                })
            }
            Token::Const | Token::Let | Token::Var => {
                Statement::Variable(self.parse_variable(start, content_end, span)?)
            }
            _ => match self.parse_expression(start, content_end)? {
                Expression::Verbatim(_) => Statement::Verbatim(self.verbatim(start, end)),
                expression => Statement::Expression(ExpressionStatement { expression, span }),
            },
        };

        Ok(Some(stmt))
    }

    /// Parse `import ...` over `start..end` (semicolon excluded).
    fn parse_import(&self, start: usize, end: usize, span: Span) -> Result<ImportDeclaration, ParseError> {
        let mut index = start + 1;
        let mut specifiers = Vec::new();

        if !matches!(self.token(index), Token::StringLiteral(_)) {
            if let Some(local) = self.binding_name(index) {
                specifiers.push(ImportSpecifier::Default(local));
                index += 1;
                if *self.token(index) == Token::Comma {
                    index += 1;
                    if !matches!(self.token(index), Token::Star | Token::LeftBrace) {
                        return Err(ParseError::unexpected_token(
                            "'*' or '{' after default import",
                            self.token(index).clone(),
                            self.span_at(index),
                        ));
                    }
                }
            }

            match self.token(index) {
                Token::Star => {
                    index += 1;
                    if !self.token(index).is_word("as") {
                        return Err(ParseError::unexpected_token(
                            "'as'",
                            self.token(index).clone(),
                            self.span_at(index),
                        ));
                    }
                    index += 1;
                    let local = self.expect_binding(index)?;
                    specifiers.push(ImportSpecifier::Namespace(local));
                    index += 1;
                }
                Token::LeftBrace => {
                    index = self.parse_named_imports(index, &mut specifiers)?;
                }
                _ if !specifiers.is_empty() => {}
                other => {
                    return Err(ParseError::unexpected_token(
                        "an import binding",
                        other.clone(),
                        self.span_at(index),
                    ))
                }
            }

            if !self.token(index).is_word("from") {
                return Err(ParseError::unexpected_token(
                    "'from'",
                    self.token(index).clone(),
                    self.span_at(index),
                ));
            }
            index += 1;
        }

        let source = match self.token(index) {
            Token::StringLiteral(value) => StringLiteral {
                value: value.clone(),
                span: self.span_at(index),
            },
            other => {
                return Err(ParseError::unexpected_token(
                    "a module specifier string",
                    other.clone(),
                    self.span_at(index),
                ))
            }
        };
        index += 1;

        // Import attributes: `with { type: "json" }`
        if index < end
            && (self.token(index).is_word("with") || self.token(index).is_word("assert"))
            && *self.token(index + 1) == Token::LeftBrace
        {
            index = end;
        }

        if index != end {
            return Err(ParseError::unexpected_token(
                "end of import declaration",
                self.token(index).clone(),
                self.span_at(index),
            ));
        }

        Ok(ImportDeclaration {
            specifiers,
            source,
            span,
        })
    }

    /// Parse `{ a, b as c, "d" as e }` starting at `{`; returns the index after `}`.
    fn parse_named_imports(
        &self,
        open: usize,
        specifiers: &mut Vec<ImportSpecifier>,
    ) -> Result<usize, ParseError> {
        let mut index = open + 1;

        while *self.token(index) != Token::RightBrace {
            let imported = match self.token(index) {
                Token::StringLiteral(value) => value.clone(),
                token => match token.identifier_name() {
                    Some(name) => name.to_string(),
                    None => {
                        return Err(ParseError::unexpected_token(
                            "an imported name",
                            token.clone(),
                            self.span_at(index),
                        ))
                    }
                },
            };
            let imported_span = self.span_at(index);
            index += 1;

            let local = if self.token(index).is_word("as") {
                index += 1;
                let local = self.expect_binding(index)?;
                index += 1;
                local
            } else {
                Identifier::new(imported.clone(), imported_span)
            };
            specifiers.push(ImportSpecifier::Named { imported, local });

            match self.token(index) {
                Token::Comma => index += 1,
                Token::RightBrace => {}
                other => {
                    return Err(ParseError::unexpected_token(
                        "',' or '}'",
                        other.clone(),
                        self.span_at(index),
                    ))
                }
            }
        }

        Ok(index + 1)
    }

    fn binding_name(&self, index: usize) -> Option<Identifier> {
        let name = match self.token(index) {
            Token::Identifier(name) => name.as_str(),
            Token::Async => "async",
            Token::Let => "let",
            _ => return None,
        };
        Some(Identifier::new(name, self.span_at(index)))
    }

    fn expect_binding(&self, index: usize) -> Result<Identifier, ParseError> {
        self.binding_name(index).ok_or_else(|| {
            ParseError::unexpected_token(
                "a binding name",
                self.token(index).clone(),
                self.span_at(index),
            )
        })
    }

    /// Parse `const|let|var declarator, ...` over `start..end` (semicolon excluded).
    fn parse_variable(&self, start: usize, end: usize, span: Span) -> Result<VariableDeclaration, ParseError> {
        let kind = match self.token(start) {
            Token::Const => VariableKind::Const,
            Token::Let => VariableKind::Let,
            _ => VariableKind::Var,
        };

        let mut declarations = Vec::new();
        for (part_start, part_end) in self.split_top_level(start + 1, end, &Token::Comma) {
            if part_start == part_end {
                return Err(ParseError::unexpected_token(
                    "a variable declarator",
                    self.token(part_start).clone(),
                    self.span_at(part_start),
                ));
            }
            let (id_end, init) = match self.find_top_level_equal(part_start, part_end) {
                Some(equal) if equal + 1 < part_end => {
                    (equal, Some(self.parse_expression(equal + 1, part_end)?))
                }
                Some(equal) => {
                    return Err(ParseError::unexpected_token(
                        "an initializer",
                        self.token(equal + 1).clone(),
                        self.span_at(equal + 1),
                    ))
                }
                None => (part_end, None),
            };
            if id_end == part_start {
                return Err(ParseError::invalid_syntax(
                    "missing binding name",
                    self.span_at(part_start),
                ));
            }
            declarations.push(VariableDeclarator {
                id: self.verbatim(part_start, id_end),
                init,
            });
        }

        Ok(VariableDeclaration {
            kind,
            declarations,
            span,
        })
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Parse `start..end` as an expression, falling back to verbatim text.
    fn parse_expression(&self, start: usize, end: usize) -> Result<Expression, ParseError> {
        if start >= end {
            return Err(ParseError::unexpected_token(
                "an expression",
                self.token(start).clone(),
                self.span_at(start),
            ));
        }
        Ok(self
            .parse_chain(start, end)
            .unwrap_or_else(|| Expression::Verbatim(self.verbatim(start, end))))
    }

    /// Recognize identifiers, string literals, and call/member chains over them.
    fn parse_chain(&self, start: usize, end: usize) -> Option<Expression> {
        let span = self.range_span(start, end);

        if end - start == 1 {
            return match self.token(start) {
                Token::Identifier(name) => Some(Expression::Identifier(Identifier::new(name.clone(), span))),
                Token::StringLiteral(value) => Some(Expression::StringLiteral(StringLiteral {
                    value: value.clone(),
                    span,
                })),
                _ => None,
            };
        }

        match self.token(end - 1) {
            Token::RightParen => {
                let open = self.matching_paren(start, end - 1)?;
                if open == start {
                    return None;
                }
                let callee = self.parse_chain(start, open)?;
                if matches!(callee, Expression::StringLiteral(_)) {
                    return None;
                }
                let mut arguments = Vec::new();
                for (arg_start, arg_end) in self.split_top_level(open + 1, end - 1, &Token::Comma) {
                    // Trailing comma
                    if arg_start == arg_end && arg_end == end - 1 && !arguments.is_empty() {
                        break;
                    }
                    if arg_start == arg_end && open + 1 == end - 1 {
                        break;
                    }
                    arguments.push(self.parse_expression(arg_start, arg_end).ok()?);
                }
                Some(Expression::call(callee, arguments, span))
            }
            token if end - start >= 3 && *self.token(end - 2) == Token::Dot => {
                let property = token.identifier_name()?.to_string();
                let object = self.parse_chain(start, end - 2)?;
                Some(Expression::Member(MemberExpression {
                    object: Box::new(object),
                    property: Identifier::new(property, self.span_at(end - 1)),
                    span,
                }))
            }
            _ => None,
        }
    }

    /// Index of the `(` matching the `)` at `close`, searching no earlier than `start`.
    fn matching_paren(&self, start: usize, close: usize) -> Option<usize> {
        let mut depth = 0usize;
        for index in (start..=close).rev() {
            match self.token(index) {
                Token::RightParen => depth += 1,
                Token::LeftParen => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(index);
                    }
                }
                _ => {}
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::error::ParseErrorKind;

    fn parse(source: &str) -> Module {
        Parser::new(source).unwrap().parse().unwrap()
    }

    fn parse_err(source: &str) -> Vec<ParseError> {
        Parser::new(source).unwrap().parse().unwrap_err()
    }

    #[test]
    fn test_default_import() {
        let module = parse("import b from './b.js';");
        let Statement::Import(decl) = &module.body[0] else {
            panic!("expected import, got {:?}", module.body[0]);
        };
        assert_eq!(decl.source.value, "./b.js");
        assert_eq!(decl.single_default().map(|i| i.name.as_str()), Some("b"));
    }

    #[test]
    fn test_import_forms() {
        let module = parse(
            "import './side.js'\nimport * as ns from './ns'\nimport a, { b, c as d } from \"./m\"\nimport {} from './e'",
        );
        assert_eq!(module.body.len(), 4);

        let imports: Vec<&ImportDeclaration> = module
            .body
            .iter()
            .map(|stmt| match stmt {
                Statement::Import(decl) => decl,
                other => panic!("expected import, got {:?}", other),
            })
            .collect();

        assert!(imports[0].specifiers.is_empty());
        assert!(matches!(&imports[1].specifiers[..], [ImportSpecifier::Namespace(ns)] if ns.name == "ns"));
        assert_eq!(imports[2].specifiers.len(), 3);
        assert!(matches!(
            &imports[2].specifiers[2],
            ImportSpecifier::Named { imported, local } if imported == "c" && local.name == "d"
        ));
        assert!(imports[2].single_default().is_none());
        assert!(imports[3].specifiers.is_empty());
    }

    #[test]
    fn test_dynamic_import_is_not_a_declaration() {
        let module = parse("import('./lazy.js').then(run);");
        assert!(matches!(module.body[0], Statement::Expression(_) | Statement::Verbatim(_)));
    }

    #[test]
    fn test_export_default_expression() {
        let module = parse("export default 42;");
        let Statement::ExportDefault(decl) = &module.body[0] else {
            panic!("expected export default");
        };
        assert!(matches!(&decl.declaration, Expression::Verbatim(v) if v.text == "42"));
    }

    #[test]
    fn test_export_default_function_ends_at_body() {
        let module = parse("export default function greet(name) {\n  return `hi ${name}`;\n}\n(function () {})();");
        assert_eq!(module.body.len(), 2);
        let Statement::ExportDefault(decl) = &module.body[0] else {
            panic!("expected export default");
        };
        let Expression::Verbatim(text) = &decl.declaration else {
            panic!("expected verbatim declaration");
        };
        assert!(text.text.starts_with("function greet(name)"));
        assert!(text.text.ends_with('}'));
    }

    #[test]
    fn test_require_declarations() {
        let module = parse("const a = require('./a'), { b } = require(\"./b\");\nlet c;");
        let Statement::Variable(decl) = &module.body[0] else {
            panic!("expected variable declaration");
        };
        assert_eq!(decl.kind, VariableKind::Const);
        assert_eq!(decl.declarations.len(), 2);
        assert_eq!(decl.declarations[1].id.text, "{ b }");
        let specifiers: Vec<_> = decl
            .declarations
            .iter()
            .filter_map(|d| d.init.as_ref().and_then(Expression::load_call_specifier))
            .collect();
        assert_eq!(specifiers, vec!["./a", "./b"]);

        let Statement::Variable(decl) = &module.body[1] else {
            panic!("expected variable declaration");
        };
        assert!(decl.declarations[0].init.is_none());
    }

    #[test]
    fn test_member_of_call() {
        let module = parse("const x = require('./x').default");
        let Statement::Variable(decl) = &module.body[0] else {
            panic!("expected variable declaration");
        };
        let Some(Expression::Member(member)) = &decl.declarations[0].init else {
            panic!("expected member expression");
        };
        assert_eq!(member.property.name, "default");
        assert_eq!(member.object.load_call_specifier(), Some("./x"));
    }

    #[test]
    fn test_bare_load_call_statement() {
        let module = parse("require('./polyfill')\nconsole.log(1)");
        assert_eq!(module.body.len(), 2);
        let Statement::Expression(stmt) = &module.body[0] else {
            panic!("expected expression statement");
        };
        assert_eq!(stmt.expression.load_call_specifier(), Some("./polyfill"));
    }

    #[test]
    fn test_asi_respects_continuation() {
        let module = parse("const a = b\n  .c()\nconst d = 1");
        assert_eq!(module.body.len(), 2);
    }

    #[test]
    fn test_control_body_on_next_line() {
        let source = "if (process.env.DEV)\n  require('./devtools');\nconst a = require('./a');";
        let module = parse(source);
        assert_eq!(module.body.len(), 2);
        assert!(matches!(&module.body[0], Statement::Verbatim(v) if v.text.ends_with("require('./devtools');")));

        let module = parse("for (const x of xs)\n  if (x)\n    load(x)\nnext()");
        assert_eq!(module.body.len(), 2);
    }

    #[test]
    fn test_do_while_is_one_statement() {
        let module = parse("do {\n  step()\n} while (more())\nrequire('./after')");
        assert_eq!(module.body.len(), 2);
        assert!(matches!(&module.body[0], Statement::Verbatim(v) if v.text.ends_with("while (more())")));
    }

    #[test]
    fn test_control_flow_is_verbatim() {
        let source = "if (ok) {\n  run();\n} else {\n  stop();\n}";
        let module = parse(source);
        assert_eq!(module.body.len(), 1);
        assert!(matches!(&module.body[0], Statement::Verbatim(v) if v.text == source));
    }

    #[test]
    fn test_empty_statements_dropped() {
        let module = parse(";;x();;");
        assert_eq!(module.body.len(), 1);
    }

    #[test]
    fn test_unclosed_delimiter() {
        let errors = parse_err("function f() {\n  return 1;\n");
        assert!(matches!(errors[0].kind, ParseErrorKind::UnclosedDelimiter { .. }));
    }

    #[test]
    fn test_mismatched_delimiter() {
        let errors = parse_err("call(a];");
        assert!(matches!(errors[0].kind, ParseErrorKind::MismatchedDelimiter { .. }));
    }

    #[test]
    fn test_malformed_import() {
        let errors = parse_err("import from;");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].span.line, 1);
    }

    #[test]
    fn test_errors_from_several_statements() {
        let errors = parse_err("import a './a';\nimport b from;\n");
        assert_eq!(errors.len(), 2);
    }
}
