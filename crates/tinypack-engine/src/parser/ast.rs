//! Syntax tree for the top level of a JavaScript module.
//!
//! The tree models the statement shapes that take part in module linking:
//! import declarations, default exports, variable declarations and
//! expression statements built from load calls. Everything else is kept as
//! [`Verbatim`] source text, so nested scopes are never inspected.

use super::token::Span;

/// Name of the runtime function that loads a module.
pub const LOAD_FUNCTION: &str = "require";

/// A parsed module: its top-level statements in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub body: Vec<Statement>,
    pub span: Span,
}

/// A top-level statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `import ... from "s"` or `import "s"`
    Import(ImportDeclaration),
    /// `export default <expression or declaration>`
    ExportDefault(ExportDefaultDeclaration),
    /// `const|let|var` declaration
    Variable(VariableDeclaration),
    /// An expression followed by an optional semicolon
    Expression(ExpressionStatement),
    /// Any other statement, kept as written
    Verbatim(Verbatim),
}

impl Statement {
    pub fn span(&self) -> &Span {
        match self {
            Statement::Import(decl) => &decl.span,
            Statement::ExportDefault(decl) => &decl.span,
            Statement::Variable(decl) => &decl.span,
            Statement::Expression(stmt) => &stmt.span,
            Statement::Verbatim(verbatim) => &verbatim.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportDeclaration {
    pub specifiers: Vec<ImportSpecifier>,
    pub source: StringLiteral,
    pub span: Span,
}

impl ImportDeclaration {
    /// The bound name when this import binds exactly one default name.
    pub fn single_default(&self) -> Option<&Identifier> {
        match self.specifiers.as_slice() {
            [ImportSpecifier::Default(local)] => Some(local),
            _ => None,
        }
    }
}

/// One binding of an import declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportSpecifier {
    /// `import x from "s"`
    Default(Identifier),
    /// `import * as ns from "s"`
    Namespace(Identifier),
    /// `import { imported as local } from "s"`
    Named { imported: String, local: Identifier },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportDefaultDeclaration {
    pub declaration: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Const,
    Let,
    Var,
}

impl VariableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableKind::Const => "const",
            VariableKind::Let => "let",
            VariableKind::Var => "var",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    pub kind: VariableKind,
    pub declarations: Vec<VariableDeclarator>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclarator {
    /// Binding target as written; may be a destructuring pattern.
    pub id: Verbatim,
    pub init: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    pub expression: Expression,
    pub span: Span,
}

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(Identifier),
    StringLiteral(StringLiteral),
    Call(CallExpression),
    Member(MemberExpression),
    Assignment(AssignmentExpression),
    /// Any other expression, kept as written
    Verbatim(Verbatim),
}

impl Expression {
    /// `callee(arguments...)`
    pub fn call(callee: Expression, arguments: Vec<Expression>, span: Span) -> Self {
        Expression::Call(CallExpression {
            callee: Box::new(callee),
            arguments,
            span,
        })
    }

    /// `object.property`
    pub fn member(object: Expression, property: &str, span: Span) -> Self {
        Expression::Member(MemberExpression {
            object: Box::new(object),
            property: Identifier::new(property, span),
            span,
        })
    }

    /// The specifier of a load call `require("s")`.
    pub fn load_call_specifier(&self) -> Option<&str> {
        match self {
            Expression::Call(call) => call.load_specifier(),
            _ => None,
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            Expression::Identifier(ident) => &ident.span,
            Expression::StringLiteral(lit) => &lit.span,
            Expression::Call(call) => &call.span,
            Expression::Member(member) => &member.span,
            Expression::Assignment(assign) => &assign.span,
            Expression::Verbatim(verbatim) => &verbatim.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

impl Identifier {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    /// Decoded value
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    pub callee: Box<Expression>,
    pub arguments: Vec<Expression>,
    pub span: Span,
}

impl CallExpression {
    /// The specifier if this is a load call with a string literal first argument.
    pub fn load_specifier(&self) -> Option<&str> {
        match (self.callee.as_ref(), self.arguments.first()) {
            (Expression::Identifier(callee), Some(Expression::StringLiteral(lit)))
                if callee.name == LOAD_FUNCTION =>
            {
                Some(&lit.value)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpression {
    pub object: Box<Expression>,
    pub property: Identifier,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentExpression {
    pub target: Box<Expression>,
    pub value: Box<Expression>,
    pub span: Span,
}

/// Source text kept exactly as written.
#[derive(Debug, Clone, PartialEq)]
pub struct Verbatim {
    pub text: String,
    pub span: Span,
}
