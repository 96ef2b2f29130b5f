//! Import/export rewriting
//!
//! Rewrites the two module-syntax shapes the bundle runtime understands:
//!
//! ```text
//! import X from "s";      =>  const X = require("s").default;
//! export default D;       =>  module.exports.default = D;
//! ```
//!
//! Every other import form is left untouched and reported, so the caller can
//! warn about code that will not run inside a module wrapper.

use crate::parser::ast::*;
use crate::parser::Span;

/// Import forms that were left as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedImport {
    /// Module specifier of the import
    pub specifier: String,
    /// Which form the import takes
    pub form: ImportForm,
    /// Location of the import statement
    pub span: Span,
}

/// Shape of an import declaration that is not a single default binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportForm {
    /// `import "s"`
    SideEffect,
    /// `import * as ns from "s"`
    Namespace,
    /// `import { a, b as c } from "s"`
    Named,
    /// `import a, { b } from "s"` or `import a, * as ns from "s"`
    Mixed,
}

impl ImportForm {
    pub fn describe(&self) -> &'static str {
        match self {
            ImportForm::SideEffect => "side-effect import",
            ImportForm::Namespace => "namespace import",
            ImportForm::Named => "named import",
            ImportForm::Mixed => "mixed default and named import",
        }
    }

    fn of(decl: &ImportDeclaration) -> Self {
        let has_default = decl
            .specifiers
            .iter()
            .any(|s| matches!(s, ImportSpecifier::Default(_)));
        match decl.specifiers.first() {
            None => ImportForm::SideEffect,
            Some(_) if has_default => ImportForm::Mixed,
            Some(ImportSpecifier::Namespace(_)) => ImportForm::Namespace,
            Some(_) => ImportForm::Named,
        }
    }
}

/// What a transform pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformSummary {
    pub rewritten_imports: usize,
    pub rewritten_exports: usize,
    pub unsupported: Vec<UnsupportedImport>,
}

/// Rewrite default imports and default exports of `module` in place.
pub fn transform_module(module: &mut Module) -> TransformSummary {
    let mut summary = TransformSummary::default();

    for stmt in module.body.iter_mut() {
        let replacement = match stmt {
            Statement::Import(decl) => match decl.single_default() {
                Some(local) => {
                    summary.rewritten_imports += 1;
                    Some(rewrite_default_import(local, decl))
                }
                None => {
                    summary.unsupported.push(UnsupportedImport {
                        specifier: decl.source.value.clone(),
                        form: ImportForm::of(decl),
                        span: decl.span,
                    });
                    None
                }
            },
            Statement::ExportDefault(decl) => {
                summary.rewritten_exports += 1;
                Some(rewrite_default_export(decl))
            }
            _ => None,
        };

        if let Some(replacement) = replacement {
            *stmt = replacement;
        }
    }

    summary
}

/// `const X = require(S).default;`
fn rewrite_default_import(local: &Identifier, decl: &ImportDeclaration) -> Statement {
    let span = decl.span;
    let load = Expression::call(
        Expression::Identifier(Identifier::new(LOAD_FUNCTION, span)),
        vec![Expression::StringLiteral(decl.source.clone())],
        span,
    );

    Statement::Variable(VariableDeclaration {
        kind: VariableKind::Const,
        declarations: vec![VariableDeclarator {
            id: Verbatim {
                text: local.name.clone(),
                span: local.span,
            },
            init: Some(Expression::member(load, "default", span)),
        }],
        span,
    })
}

/// `module.exports.default = D;`
fn rewrite_default_export(decl: &ExportDefaultDeclaration) -> Statement {
    let span = decl.span;
    let target = Expression::member(
        Expression::member(
            Expression::Identifier(Identifier::new("module", span)),
            "exports",
            span,
        ),
        "default",
        span,
    );

    Statement::Expression(ExpressionStatement {
        expression: Expression::Assignment(AssignmentExpression {
            target: Box::new(target),
            value: Box::new(decl.declaration.clone()),
            span,
        }),
        span,
    })
}
