//! Bundle emission
//!
//! Every resolved module is embedded in a factory wrapper:
//!
//! ```text
//! // src/util.js
//! (function (exports, require, module, __filename, __dirname) {
//! ...transformed source...
//! })(module.exports, require, module, __filename, __dirname);
//! ```
//!
//! The artifact is not a standalone module loader. Each wrapper is invoked
//! immediately with bindings taken from the scope the artifact runs in, so
//! the host must provide `module`, `module.exports`, `require`,
//! `__filename` and `__dirname` there (as a CommonJS environment does).
//! Load calls left in the transformed source go to that host `require`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::module::{ModuleResolver, Resolution};

/// Parameters of each module factory, in order
pub const FACTORY_PARAMS: &str = "exports, require, module, __filename, __dirname";

/// Arguments each factory is invoked with
pub const FACTORY_ARGS: &str = "module.exports, require, module, __filename, __dirname";

/// Order in which module wrappers appear in the artifact
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmitOrder {
    /// The order modules were first entered, starting with the entry
    #[default]
    Discovery,
    /// Dependencies before the modules that import them
    DependenciesFirst,
}

/// Rendered bundle text and what went into it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedBundle {
    pub code: String,
    /// Modules with a wrapper, in output order
    pub modules: Vec<PathBuf>,
}

/// Render all resolved modules into one artifact.
///
/// Modules that failed to resolve are left out.
pub fn emit_bundle(resolution: &Resolution, resolver: &ModuleResolver, order: EmitOrder) -> EmittedBundle {
    let paths = match order {
        EmitOrder::Discovery => resolution.graph.modules().cloned().collect(),
        EmitOrder::DependenciesFirst => resolution.graph.dependencies_first_order(&resolution.entry),
    };

    let mut code = String::new();
    let mut modules = Vec::new();
    for path in paths {
        let Some(source) = resolution.cache.transformed(&path) else {
            continue;
        };
        code.push_str(&render_wrapper(&resolver.display_path(&path), source));
        modules.push(path);
    }

    EmittedBundle { code, modules }
}

/// Render one module factory wrapper, newline-terminated.
///
/// Source lines are embedded as-is: multi-line template literals must keep
/// their contents.
pub fn render_wrapper(name: &str, source: &str) -> String {
    let mut out = String::with_capacity(source.len() + 128);
    out.push_str("// ");
    out.push_str(name);
    out.push('\n');
    out.push_str("(function (");
    out.push_str(FACTORY_PARAMS);
    out.push_str(") {\n");
    if !source.is_empty() {
        out.push_str(source);
        if !source.ends_with('\n') {
            out.push('\n');
        }
    }
    out.push_str("})(");
    out.push_str(FACTORY_ARGS);
    out.push_str(");\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_wrapper() {
        let wrapper = render_wrapper("a.js", "const b = require(\"./b.js\").default;\n\nconsole.log(b);");
        assert_eq!(
            wrapper,
            "// a.js\n\
             (function (exports, require, module, __filename, __dirname) {\n\
             const b = require(\"./b.js\").default;\n\
             \n\
             console.log(b);\n\
             })(module.exports, require, module, __filename, __dirname);\n"
        );
    }

    #[test]
    fn test_render_empty_module() {
        let wrapper = render_wrapper("empty.js", "");
        assert_eq!(
            wrapper,
            "// empty.js\n(function (exports, require, module, __filename, __dirname) {\n})(module.exports, require, module, __filename, __dirname);\n"
        );
    }

    #[test]
    fn test_template_literal_kept_intact() {
        let source = "const s = `a\nb`;";
        assert!(render_wrapper("t.js", source).contains("`a\nb`"));
    }

    #[test]
    fn test_emit_order_names() {
        #[derive(Deserialize)]
        struct Settings {
            order: EmitOrder,
        }
        let settings: Settings = toml::from_str("order = \"dependencies-first\"").unwrap();
        assert_eq!(settings.order, EmitOrder::DependenciesFirst);
    }
}
