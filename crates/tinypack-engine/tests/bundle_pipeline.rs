//! Integration tests for the bundle pipeline
//!
//! Tests bundling from on-disk module trees: graph discovery, rewriting,
//! wrapper emission, failure handling and determinism.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tinypack_engine::{
    ArtifactWriter, BundleConfig, BundleError, Bundler, Diagnostic, EmitOrder, FsLoader, LoadError,
    SourceLoader, WriteError,
};

const WRAPPER_OPEN: &str = "(function (exports, require, module, __filename, __dirname) {";
const WRAPPER_CLOSE: &str = "})(module.exports, require, module, __filename, __dirname);";

fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (name, source) in files {
        let path = root.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, source).unwrap();
    }
}

fn config_for(root: &Path, entry: &str) -> BundleConfig {
    BundleConfig {
        entry: PathBuf::from(entry),
        output: root.join("dist").join("bundle.js"),
        base_dir: root.to_path_buf(),
        ..BundleConfig::default()
    }
}

/// Loader that counts how often each module is read
#[derive(Default)]
struct CountingLoader {
    loads: Vec<PathBuf>,
}

impl SourceLoader for CountingLoader {
    fn load(&mut self, path: &Path) -> Result<String, LoadError> {
        self.loads.push(path.to_path_buf());
        FsLoader.load(path)
    }
}

/// Writer that keeps the artifact in memory
#[derive(Default)]
struct MemoryWriter {
    written: Vec<(PathBuf, String)>,
}

impl ArtifactWriter for MemoryWriter {
    fn write(&mut self, path: &Path, contents: &str) -> Result<(), WriteError> {
        self.written.push((path.to_path_buf(), contents.to_string()));
        Ok(())
    }
}

/// Writer that always fails
struct FailingWriter;

impl ArtifactWriter for FailingWriter {
    fn write(&mut self, path: &Path, _contents: &str) -> Result<(), WriteError> {
        Err(WriteError::Write {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        })
    }
}

#[test]
fn test_two_module_bundle() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_files(
        root,
        &[
            ("a.js", "import b from './b.js';\nconsole.log(b);\n"),
            ("b.js", "export default 'b';\n"),
        ],
    );

    let report = Bundler::new(config_for(root, "a.js")).bundle().unwrap();
    let bundle = fs::read_to_string(root.join("dist").join("bundle.js")).unwrap();

    let expected = format!(
        "// a.js\n{open}\nconst b = require(\"./b.js\").default;\nconsole.log(b);\n{close}\n\
         // b.js\n{open}\nmodule.exports.default = \"b\";\n{close}\n",
        open = WRAPPER_OPEN,
        close = WRAPPER_CLOSE
    );
    assert_eq!(bundle, expected);
    assert!(!bundle.contains("import "));
    assert!(!bundle.contains("export "));

    assert_eq!(report.modules, vec![root.join("a.js"), root.join("b.js")]);
    assert_eq!(report.bytes, bundle.len());
    assert!(report.diagnostics.is_empty());
    assert!(report.unresolved.is_empty());
}

#[test]
fn test_cycle_terminates_with_one_warning() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_files(
        root,
        &[
            ("a.js", "import b from './b';\nexport default 'a';"),
            ("b.js", "import a from './a';\nexport default 'b';"),
        ],
    );

    let report = Bundler::new(config_for(root, "a.js")).bundle().unwrap();

    let cycles: Vec<&Diagnostic> = report
        .diagnostics
        .iter()
        .filter(|d| matches!(d, Diagnostic::Cycle { .. }))
        .collect();
    assert_eq!(cycles.len(), 1);
    assert_eq!(
        cycles[0],
        &Diagnostic::Cycle {
            chain: vec![root.join("a.js"), root.join("b.js"), root.join("a.js")]
        }
    );
    assert_eq!(report.modules.len(), 2);
    assert_eq!(report.warning_count(), 1);
}

#[test]
fn test_unreadable_module_is_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_files(
        root,
        &[(
            "main.js",
            "import missing from './missing';\nimport ok from './ok';\nconsole.log(missing, ok);",
        ),
        ("ok.js", "export default 1;")],
    );

    let report = Bundler::new(config_for(root, "main.js")).bundle().unwrap();
    let bundle = fs::read_to_string(&report.output).unwrap();

    assert_eq!(report.modules, vec![root.join("main.js"), root.join("ok.js")]);
    assert_eq!(report.unresolved, vec![root.join("missing.js")]);
    assert_eq!(bundle.matches(WRAPPER_OPEN).count(), 2);
    assert!(!bundle.contains("// missing.js"));
    assert_eq!(report.error_count(), 1);
    assert!(report.diagnostics[0].to_string().contains("missing.js"));
}

#[test]
fn test_unreadable_entry_still_writes_artifact() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    let report = Bundler::new(config_for(root, "index.js")).bundle().unwrap();

    assert!(report.modules.is_empty());
    assert_eq!(report.unresolved, vec![root.join("index.js")]);
    assert_eq!(fs::read_to_string(&report.output).unwrap(), "");
}

#[test]
fn test_runs_are_deterministic() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_files(
        root,
        &[
            ("index.js", "import a from './lib/a';\nimport b from './lib/b';\nrequire('./side');"),
            ("lib/a.js", "import c from './c';\nexport default c + 1;"),
            ("lib/b.js", "import c from './c';\nexport default c + 2;"),
            ("lib/c.js", "export default 40;"),
            ("side.js", "globalThis.loaded = true;"),
        ],
    );

    let bundler = Bundler::new(config_for(root, "index.js"));
    let mut first = MemoryWriter::default();
    let mut second = MemoryWriter::default();
    bundler.bundle_with(&mut FsLoader, &mut first).unwrap();
    bundler.bundle_with(&mut FsLoader, &mut second).unwrap();

    assert_eq!(first.written.len(), 1);
    assert_eq!(first.written, second.written);
}

#[test]
fn test_each_module_loaded_once() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_files(
        root,
        &[
            ("index.js", "import a from './a';\nimport b from './b';\nimport a2 from './a.js';"),
            ("a.js", "import shared from './shared';"),
            ("b.js", "import shared from './nested/../shared.js';"),
            ("shared.js", "export default {};"),
        ],
    );

    let mut loader = CountingLoader::default();
    let report = Bundler::new(config_for(root, "index.js"))
        .bundle_with(&mut loader, &mut MemoryWriter::default())
        .unwrap();

    let mut loads = loader.loads.clone();
    loads.sort();
    loads.dedup();
    assert_eq!(loads.len(), loader.loads.len());
    assert_eq!(report.modules.len(), 4);
}

#[test]
fn test_bare_specifiers_stay_runtime_loads() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_files(
        root,
        &[("index.js", "import React from 'react';\nconst path = require('path');")],
    );

    let mut writer = MemoryWriter::default();
    let report = Bundler::new(config_for(root, "index.js"))
        .bundle_with(&mut FsLoader, &mut writer)
        .unwrap();

    assert_eq!(report.modules, vec![root.join("index.js")]);
    assert_eq!(report.externals, vec!["react", "path"]);
    let bundle = &writer.written[0].1;
    assert!(bundle.contains("const React = require(\"react\").default;"));
    assert!(bundle.contains("const path = require(\"path\");"));
}

#[test]
fn test_dependencies_first_order() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_files(
        root,
        &[
            ("index.js", "import a from './a';"),
            ("a.js", "import b from './b';"),
            ("b.js", "export default 'b';"),
        ],
    );

    let config = BundleConfig {
        order: EmitOrder::DependenciesFirst,
        ..config_for(root, "index.js")
    };
    let mut writer = MemoryWriter::default();
    let report = Bundler::new(config)
        .bundle_with(&mut FsLoader, &mut writer)
        .unwrap();

    assert_eq!(
        report.modules,
        vec![root.join("b.js"), root.join("a.js"), root.join("index.js")]
    );
    let bundle = &writer.written[0].1;
    let b_at = bundle.find("// b.js").unwrap();
    let index_at = bundle.find("// index.js").unwrap();
    assert!(b_at < index_at);
}

#[test]
fn test_write_failure_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_files(root, &[("index.js", "console.log(1);")]);

    let result = Bundler::new(config_for(root, "index.js")).bundle_with(&mut FsLoader, &mut FailingWriter);
    assert!(matches!(result, Err(BundleError::Write(_))));
}

#[test]
fn test_invalid_config_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let config = BundleConfig {
        extension: ".js".to_string(),
        ..config_for(temp_dir.path(), "index.js")
    };

    let result = Bundler::new(config).bundle_with(&mut FsLoader, &mut MemoryWriter::default());
    assert!(matches!(result, Err(BundleError::Config(_))));
}
