//! Integration tests for the tinypack binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn tinypack(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tinypack"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run tinypack")
}

fn write_project(dir: &Path) {
    fs::write(dir.join("index.js"), "import b from './b';\nconsole.log(b);\n").unwrap();
    fs::write(dir.join("b.js"), "export default 'b';\n").unwrap();
}

#[test]
fn test_bundle_with_defaults() {
    let temp_dir = TempDir::new().unwrap();
    write_project(temp_dir.path());

    let output = tinypack(temp_dir.path(), &["bundle"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Bundled 2 modules to ./dist/bundle.js"), "stdout: {}", stdout);

    let bundle = fs::read_to_string(temp_dir.path().join("dist").join("bundle.js")).unwrap();
    assert!(bundle.starts_with("// index.js\n"));
    assert!(bundle.contains("// b.js\n"));
}

#[test]
fn test_bundle_reads_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let src = temp_dir.path().join("src");
    fs::create_dir_all(&src).unwrap();
    write_project(&src);
    fs::write(
        temp_dir.path().join("tinypack.toml"),
        "entry = \"src/index.js\"\noutput = \"build/app.js\"\norder = \"dependencies-first\"\n",
    )
    .unwrap();

    let output = tinypack(temp_dir.path(), &["bundle"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let bundle = fs::read_to_string(temp_dir.path().join("build").join("app.js")).unwrap();
    assert!(bundle.starts_with("// src/b.js\n"), "bundle: {}", bundle);
}

#[test]
fn test_cycle_warning_on_stderr() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.js"), "import b from './b.js';").unwrap();
    fs::write(temp_dir.path().join("b.js"), "import a from './a.js';").unwrap();

    let output = tinypack(temp_dir.path(), &["bundle", "a.js", "-o", "out.js"]);
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("Circular dependency detected: a.js -> b.js -> a.js").count(), 1, "stderr: {}", stderr);
}

#[test]
fn test_graph_json() {
    let temp_dir = TempDir::new().unwrap();
    write_project(temp_dir.path());

    let output = tinypack(temp_dir.path(), &["graph", "--json"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"entry\": \"index.js\""), "stdout: {}", stdout);
    assert!(!temp_dir.path().join("dist").exists());
}

#[test]
fn test_invalid_config_fails() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("tinypack.toml"), "entry = 42\n").unwrap();

    let output = tinypack(temp_dir.path(), &["bundle"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("error"));
}
