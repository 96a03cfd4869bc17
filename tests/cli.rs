// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 gradeflow contributors

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn gradeflow(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("gradeflow").unwrap();
    cmd.current_dir(dir.path()).env("NO_COLOR", "1");
    cmd
}

fn write(dir: &TempDir, name: &str, content: &str) {
    std::fs::write(dir.path().join(name), content).unwrap();
}

#[test]
fn test_init_creates_valid_document() {
    let dir = TempDir::new().unwrap();

    gradeflow(&dir)
        .args(["init", "--lang", "cpp/g++:9"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created assignment.yaml"));

    let yaml = std::fs::read_to_string(dir.path().join("assignment.yaml")).unwrap();
    assert!(yaml.contains("cpp/g++:9"));
    assert!(yaml.contains("stdioTest"));

    gradeflow(&dir).arg("check").assert().success();

    gradeflow(&dir)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_check_reports_errors() {
    let dir = TempDir::new().unwrap();
    write(&dir, "bad.yaml", "compile:all:\n  input: []\nscore:\n  minScore: 10\n  maxScore: 1\n");

    gradeflow(&dir)
        .args(["check", "bad.yaml"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("compile:all/input"));
}

#[test]
fn test_check_json_output() {
    let dir = TempDir::new().unwrap();
    write(&dir, "ok.yaml", "lintCheck:\n  strict: true\n");

    let output = gradeflow(&dir)
        .args(["check", "ok.yaml", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["diagnostics"][0]["error_type"], "UNSUPPORTED_STAGE");
    assert_eq!(report["diagnostics"][0]["severity"], "warning");
}

#[test]
fn test_check_missing_document() {
    let dir = TempDir::new().unwrap();

    gradeflow(&dir)
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("gradeflow init"));
}

#[test]
fn test_fmt_check_and_rewrite() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.yaml", "compile:\n  input: ['*.cpp']\n");

    gradeflow(&dir).args(["fmt", "a.yaml", "--check"]).assert().failure();
    gradeflow(&dir).args(["fmt", "a.yaml"]).assert().success();
    gradeflow(&dir)
        .args(["fmt", "a.yaml", "--check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already formatted"));
}

#[test]
fn test_fmt_keeps_unsupported_stage_keys() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.yaml", "compile:\n  input: ['*.cpp']\nlint_check:\n  strict: true\n");

    gradeflow(&dir).args(["fmt", "a.yaml"]).assert().success();

    let yaml = std::fs::read_to_string(dir.path().join("a.yaml")).unwrap();
    assert!(yaml.contains("lint_check:"));
    assert!(!yaml.contains("lintCheck"));
}

#[test]
fn test_graph_formats() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.yaml", "diffWithSkeleton:\ncompile:all:\n  input: ['*.c']\n");

    gradeflow(&dir)
        .args(["graph", "a.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2. compile:all"));

    gradeflow(&dir)
        .args(["graph", "a.yaml", "--format", "dot"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"diffWithSkeleton\" -> \"compile:all\";"));

    gradeflow(&dir)
        .args(["graph", "a.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("x=").not());

    gradeflow(&dir)
        .args(["-v", "graph", "a.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Layout:"))
        .stdout(predicate::str::contains("y=  130.0"));

    gradeflow(&dir)
        .args(["graph", "--palette"])
        .assert()
        .success()
        .stdout(predicate::str::contains("StdioTest"));
}

#[test]
fn test_edit_script() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.yaml", "compile:\nscore:\n");
    write(
        &dir,
        "script.yaml",
        "- action: insert\n  type: StdioTest\n  after: compile\n  label: public\n",
    );

    gradeflow(&dir)
        .args(["edit", "script.yaml", "--file", "a.yaml", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stdioTest:public"));

    let unchanged = std::fs::read_to_string(dir.path().join("a.yaml")).unwrap();
    assert_eq!(unchanged, "compile:\nscore:\n");

    gradeflow(&dir)
        .args(["edit", "script.yaml", "--file", "a.yaml"])
        .assert()
        .success();
    gradeflow(&dir)
        .args(["graph", "a.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2. stdioTest:public"));
}

#[test]
fn test_edit_leaving_stage_disconnected_fails() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.yaml", "compile:\n");
    write(&dir, "script.yaml", "- action: insert\n  type: Score\n");

    gradeflow(&dir)
        .args(["edit", "script.yaml", "--file", "a.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("single chain"));
}

#[test]
fn test_save_create_then_update() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("store");
    write(&dir, "a.yaml", "compile:\n  input: ['*.cpp']\n");

    gradeflow(&dir)
        .args(["save", "a.yaml"])
        .env("GRADEFLOW_STORE", &store)
        .assert()
        .success()
        .stdout(predicate::str::contains("as config 1"));
    assert!(store.join("1.yaml").exists());

    gradeflow(&dir)
        .args(["save", "a.yaml", "--config-id", "1"])
        .env("GRADEFLOW_STORE", &store)
        .assert()
        .success()
        .stdout(predicate::str::contains("up to date"));

    gradeflow(&dir)
        .args(["save", "a.yaml", "--config-id", "9"])
        .env("GRADEFLOW_STORE", &store)
        .assert()
        .failure();
}

#[test]
fn test_save_rejects_invalid_document() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("store");
    write(&dir, "a.yaml", "compile:\n  input: []\n");

    gradeflow(&dir)
        .args(["save", "a.yaml", "--store"])
        .arg(&store)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Save rejected"));
    assert!(!store.join("1.yaml").exists());
}
