//! End-to-end tests for the `bale` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const MANIFEST: &str = r#"
dist_dir = "dist"

[[bundle]]
input = "index.js"
output = "index.js"
target = "node"

[[bundle]]
input = "standalone.js"
output = "standalone.js"
target = "universal"
name = "bale"
"#;

fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    write_project(temp.path(), MANIFEST);
    temp
}

fn write_project(dir: &Path, manifest: &str) {
    fs::write(dir.join("bale.toml"), manifest).unwrap();
    fs::write(
        dir.join("package.json"),
        r#"{ "name": "bale-fixture", "version": "1.0.0" }"#,
    )
    .unwrap();
    fs::write(dir.join("index.js"), "module.exports = 1;\n").unwrap();
    fs::write(dir.join("standalone.js"), "export default 1;\n").unwrap();
}

fn bale() -> Command {
    let mut cmd = Command::cargo_bin("bale").unwrap();
    cmd.env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("BALE_MINIFY")
        .env_remove("BALE_DOWNLEVEL")
        .env_remove("BALE_PLAYGROUND");
    cmd
}

#[test]
fn help_lists_subcommands() {
    bale()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("list"));
}

#[test]
fn list_prints_every_variant() {
    let temp = project();

    bale()
        .args(["list", "--cwd"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"index\.js\s+cjs\s+minify=false").unwrap())
        .stdout(predicate::str::is_match(r"standalone\.js\s+umd\s+minify=true").unwrap())
        .stdout(predicate::str::is_match(r"esm/standalone\.mjs\s+esm\s+minify=true").unwrap());
}

#[test]
fn list_marks_filtered_variants() {
    let temp = project();

    bale()
        .args(["list", "--file", "index.js", "--no-minify", "--cwd"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"standalone\.js\s+umd\s+minify=false\s+\(skipped\)").unwrap())
        .stdout(predicate::str::is_match(r"index\.js\s+cjs\s+minify=false\n").unwrap());
}

#[test]
fn list_uses_environment_layer() {
    let temp = project();

    bale()
        .env("BALE_MINIFY", "true")
        .args(["list", "--cwd"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"index\.js\s+cjs\s+minify=true").unwrap());
}

#[test]
fn list_with_explicit_config() {
    let temp = TempDir::new().unwrap();
    write_project(temp.path(), "");
    fs::write(
        temp.path().join("release.json"),
        r#"{ "bundle": [{ "input": "index.js", "output": "doc.js", "target": "node" }] }"#,
    )
    .unwrap();

    bale()
        .args(["list", "--config", "release.json", "--cwd"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("doc.js"))
        .stdout(predicate::str::contains("standalone").not());
}

#[test]
fn missing_manifest_fails() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("package.json"), r#"{ "version": "1.0.0" }"#).unwrap();

    bale()
        .args(["build", "--cwd"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no bale.toml or bale.json found"));
}

#[test]
fn invalid_descriptor_fails_before_building() {
    let temp = TempDir::new().unwrap();
    write_project(
        temp.path(),
        r#"
[[bundle]]
input = "standalone.js"
output = "standalone.js"
target = "universal"
name = "not valid"
"#,
    );

    bale()
        .args(["build", "--cwd"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("identifier"));
    assert!(!temp.path().join("dist").exists());
}

#[test]
fn playground_build_skips_node_bundles() {
    let temp = TempDir::new().unwrap();
    write_project(
        temp.path(),
        r#"
[[bundle]]
input = "index.js"
output = "index.js"
target = "node"
"#,
    );

    bale()
        .args(["build", "--playground", "--cwd"])
        .arg(temp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Skipped index.js"))
        .stderr(predicate::str::contains("Built 0 file(s), skipped 1"));
    assert!(!temp.path().join("dist").exists());
}

#[test]
fn conflicting_minify_flags_are_rejected() {
    bale()
        .args(["build", "--minify", "--no-minify"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
