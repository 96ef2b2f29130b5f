//! Dependency extraction from transformed modules

use crate::parser::ast::*;

/// Collect module specifiers referenced at the top level of `module`, in order.
///
/// Recognized shapes:
/// - import declarations that survived rewriting
/// - variable initializers `require("s")` and `require("s").<property>`
/// - bare expression statements `require("s")`
///
/// Load calls with a non-literal argument are ignored.
pub fn extract_dependencies(module: &Module) -> Vec<String> {
    let mut specifiers = Vec::new();

    for stmt in &module.body {
        match stmt {
            Statement::Import(decl) => specifiers.push(decl.source.value.clone()),
            Statement::Variable(decl) => {
                for declarator in &decl.declarations {
                    if let Some(specifier) = declarator.init.as_ref().and_then(initializer_specifier) {
                        specifiers.push(specifier.to_string());
                    }
                }
            }
            Statement::Expression(stmt) => {
                if let Some(specifier) = stmt.expression.load_call_specifier() {
                    specifiers.push(specifier.to_string());
                }
            }
            Statement::ExportDefault(_) | Statement::Verbatim(_) => {}
        }
    }

    specifiers
}

fn initializer_specifier(init: &Expression) -> Option<&str> {
    match init {
        Expression::Member(member) => member.object.load_call_specifier(),
        other => other.load_call_specifier(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_module;
    use crate::transform::transform_module;

    fn deps(source: &str) -> Vec<String> {
        let mut module = parse_module(source).unwrap();
        transform_module(&mut module);
        extract_dependencies(&module)
    }

    #[test]
    fn test_source_order() {
        let source = "import a from './a';\nrequire('./side');\nconst b = require('./b'), c = require('lodash').default;\nimport './d';";
        assert_eq!(deps(source), vec!["./a", "./side", "./b", "lodash", "./d"]);
    }

    #[test]
    fn test_non_literal_load_ignored() {
        let source = "const name = './x';\nconst x = require(name);\nrequire(`./y`);";
        assert!(deps(source).is_empty());
    }

    #[test]
    fn test_nested_loads_ignored() {
        let source = "function load() {\n  return require('./lazy');\n}\nconst v = cond ? require('./a') : null;";
        assert!(deps(source).is_empty());
    }

    #[test]
    fn test_other_callee_ignored() {
        assert!(deps("const x = load('./x');\nconst y = obj.require('./y');").is_empty());
    }
}
