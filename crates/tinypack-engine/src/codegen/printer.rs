//! Source printing for module syntax trees
//!
//! Rebuilt statements use a canonical spacing; verbatim statements are
//! written back exactly as they appeared in the source.

use crate::parser::ast::*;

/// Trait for turning syntax back into JavaScript source
pub trait PrintSource {
    fn print_source(&self) -> String;
}

impl PrintSource for Module {
    fn print_source(&self) -> String {
        self.body
            .iter()
            .map(PrintSource::print_source)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl PrintSource for Statement {
    fn print_source(&self) -> String {
        match self {
            Statement::Import(decl) => format_import(decl),
            Statement::ExportDefault(decl) => {
                format!("export default {};", format_expression(&decl.declaration))
            }
            Statement::Variable(decl) => {
                let declarators: Vec<String> = decl
                    .declarations
                    .iter()
                    .map(|d| match &d.init {
                        Some(init) => format!("{} = {}", d.id.text, format_expression(init)),
                        None => d.id.text.clone(),
                    })
                    .collect();
                format!("{} {};", decl.kind.as_str(), declarators.join(", "))
            }
            Statement::Expression(stmt) => format!("{};", format_expression(&stmt.expression)),
            Statement::Verbatim(verbatim) => verbatim.text.clone(),
        }
    }
}

impl PrintSource for Expression {
    fn print_source(&self) -> String {
        format_expression(self)
    }
}

/// Print a module's statements, one per line.
pub fn print_module(module: &Module) -> String {
    module.print_source()
}

fn format_import(decl: &ImportDeclaration) -> String {
    let source = quote_string(&decl.source.value);
    if decl.specifiers.is_empty() {
        return format!("import {};", source);
    }

    let mut bindings = Vec::new();
    let mut named = Vec::new();
    for specifier in &decl.specifiers {
        match specifier {
            ImportSpecifier::Default(local) => bindings.push(local.name.clone()),
            ImportSpecifier::Namespace(local) => bindings.push(format!("* as {}", local.name)),
            ImportSpecifier::Named { imported, local } if *imported == local.name => {
                named.push(imported.clone())
            }
            ImportSpecifier::Named { imported, local } => {
                let imported = if is_identifier_name(imported) {
                    imported.clone()
                } else {
                    quote_string(imported)
                };
                named.push(format!("{} as {}", imported, local.name))
            }
        }
    }
    if !named.is_empty() {
        bindings.push(format!("{{ {} }}", named.join(", ")));
    }

    format!("import {} from {};", bindings.join(", "), source)
}

fn format_expression(expr: &Expression) -> String {
    match expr {
        Expression::Identifier(ident) => ident.name.clone(),
        Expression::StringLiteral(lit) => quote_string(&lit.value),
        Expression::Call(call) => {
            let args: Vec<String> = call.arguments.iter().map(format_expression).collect();
            format!("{}({})", format_expression(&call.callee), args.join(", "))
        }
        Expression::Member(member) => {
            format!("{}.{}", format_expression(&member.object), member.property.name)
        }
        Expression::Assignment(assign) => format!(
            "{} = {}",
            format_expression(&assign.target),
            format_expression(&assign.value)
        ),
        Expression::Verbatim(verbatim) => verbatim.text.clone(),
    }
}

/// Double-quoted JavaScript string literal for `value`.
pub fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn is_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c == '$' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c == '$' || c.is_alphanumeric())
}
