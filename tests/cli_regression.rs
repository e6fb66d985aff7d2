// Regression tests for the `splice` binary.
// Requires: assert_cmd, predicates crates in [dev-dependencies]

mod common;

use std::fs;

use assert_cmd::Command;
use common::scratch_dir;
use predicates::{prelude::PredicateBooleanExt, str::contains};

fn splice() -> Command {
    Command::cargo_bin("splice").unwrap()
}

#[test]
fn expand_prints_expanded_source() {
    let dir = scratch_dir("cli-expand");
    let file = dir.join("input.rb");
    fs::write(&file, "x = delay(work)\n").unwrap();
    splice()
        .arg("expand")
        .arg(&file)
        .assert()
        .success()
        .stdout(contains("x = lambda { work }"));
}

#[test]
fn expand_writes_output_file() {
    let dir = scratch_dir("cli-output");
    let file = dir.join("input.rb");
    let out = dir.join("out.rb");
    fs::write(&file, "ntimes(2, tick)\n").unwrap();
    splice()
        .args(["expand", "--output"])
        .arg(&out)
        .arg(&file)
        .assert()
        .success();
    assert_eq!(fs::read_to_string(&out).unwrap(), "2.times { tick }\n");
}

#[test]
fn expand_diff_marks_changed_lines() {
    let dir = scratch_dir("cli-diff");
    let file = dir.join("input.rb");
    fs::write(&file, "a = 1\ndelay(a)").unwrap();
    splice()
        .args(["expand", "--diff"])
        .arg(&file)
        .assert()
        .success()
        .stdout(contains("-delay(a)").and(contains("+lambda { a }")));
}

#[test]
fn trace_lists_each_step() {
    let dir = scratch_dir("cli-trace");
    let file = dir.join("input.rb");
    fs::write(&file, "time(delay(work))\n").unwrap();
    splice()
        .arg("trace")
        .arg(&file)
        .assert()
        .success()
        .stdout(contains("Step 0: delay").and(contains("Step 1: time")));
}

#[test]
fn ast_prints_sexp_or_json() {
    let dir = scratch_dir("cli-ast");
    let file = dir.join("input.rb");
    fs::write(&file, "a = 3\n").unwrap();
    splice()
        .arg("ast")
        .arg(&file)
        .assert()
        .success()
        .stdout(contains("(lasgn a (lit 3))"));
    splice()
        .args(["ast", "--json"])
        .arg(&file)
        .assert()
        .success()
        .stdout(contains("\"Symbol\": \"lasgn\""));
}

#[test]
fn encode_then_decode_restores_source() {
    let dir = scratch_dir("cli-codec");
    let file = dir.join("input.rb");
    fs::write(&file, "puts(1 + 2)\n").unwrap();
    let encoded = splice().arg("encode").arg(&file).output().unwrap();
    assert!(encoded.status.success());
    let markup = dir.join("tree.xml");
    fs::write(&markup, &encoded.stdout).unwrap();
    splice()
        .arg("decode")
        .arg(&markup)
        .assert()
        .success()
        .stdout("puts(1 + 2)\n");
}

#[test]
fn expand_dir_writes_prefixed_siblings() {
    let dir = scratch_dir("cli-dir");
    fs::write(dir.join("one.rb"), "delay(1)\n").unwrap();
    splice()
        .arg("expand-dir")
        .arg(&dir)
        .assert()
        .success()
        .stdout(contains("expanded 1 file(s)"));
    assert_eq!(
        fs::read_to_string(dir.join("macroexpanded_one.rb")).unwrap(),
        "lambda { 1 }"
    );
}

#[test]
fn macros_lists_the_standard_library() {
    splice()
        .arg("macros")
        .assert()
        .success()
        .stdout(contains("destructuring_bind").and(contains("progn")));
}

#[test]
fn cli_reports_miette_diagnostics_on_error() {
    let dir = scratch_dir("cli-error");
    let file = dir.join("bad.rb");
    fs::write(&file, "foo(1, 2").unwrap();
    splice()
        .arg("expand")
        .arg(&file)
        .assert()
        .failure()
        .stderr(contains("splice::parse").or(contains("syntax error")));
}

#[test]
fn bad_config_is_reported() {
    let dir = scratch_dir("cli-config");
    let config = dir.join("splice.yaml");
    fs::write(&config, "keep_expanded: [oops\n").unwrap();
    splice()
        .arg("--config")
        .arg(&config)
        .arg("macros")
        .assert()
        .failure()
        .stderr(contains("splice::config").or(contains("Configuration error")));
}
