mod common;

use common::GoModule;
use predicates::str::contains;

#[test]
fn writes_html_for_a_module() {
    let m = GoModule::new("example.com/cli");
    m.file("pkg/p.go", "package p\n\n// Hello greets.\nfunc Hello(name string) string { return name }\n");
    let out = m.path().join("site").join("doc.html");

    m.cmd()
        .arg(m.path())
        .arg("--output")
        .arg(&out)
        .args(["--offline", "--mod-version", "v1.0.0"])
        .assert()
        .success()
        .stdout(contains("doc.html"));

    let html = std::fs::read_to_string(&out).unwrap();
    assert!(html.contains("example.com/cli"));
    assert!(html.contains("v1.0.0"));
    assert!(html.contains("func Hello(name string) string"));
    assert!(html.contains("Hello greets."));
}

#[test]
fn default_output_is_out_html() {
    let m = GoModule::new("example.com/cli");
    m.cmd()
        .current_dir(m.path())
        .args([".", "--offline"])
        .assert()
        .success();
    assert!(m.path().join("out.html").is_file());
}

#[test]
fn missing_manifest_fails_without_output() {
    let m = GoModule::empty();
    m.file("a.go", "package a\n");
    let out = m.path().join("out.html");

    m.cmd()
        .arg(m.path())
        .arg("-o")
        .arg(&out)
        .arg("--offline")
        .assert()
        .failure()
        .stderr(contains("error:"))
        .stderr(contains("go.mod"));
    assert!(!out.exists());
}

#[test]
fn syntax_error_is_reported_with_position() {
    let m = GoModule::new("example.com/cli");
    m.file("bad/bad.go", "package bad\n\nvar = 1\n");
    m.cmd()
        .arg(m.path())
        .arg("-o")
        .arg(m.path().join("o.html"))
        .arg("--offline")
        .assert()
        .failure()
        .stderr(contains("bad.go: 3:5:"));
}

#[test]
fn help_lists_flags() {
    let m = GoModule::empty();
    m.cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("--output"))
        .stdout(contains("--mod-version"));
}

#[test]
fn deeply_nested_types_fail_cleanly() {
    let m = GoModule::new("example.com/cli");
    m.file("deep/deep.go", &format!("package deep\n\nvar X {}int\n", "*".repeat(20_000)));
    let out = m.path().join("o.html");
    m.cmd()
        .arg(m.path())
        .arg("-o")
        .arg(&out)
        .arg("--offline")
        .assert()
        .code(1)
        .stderr(contains("deep.go: 3:"))
        .stderr(contains("exceeded max nesting depth"));
    assert!(!out.exists());
}

#[test]
fn vendor_is_documented_unless_go_ignored_dirs_are_skipped() {
    let m = GoModule::new("example.com/cli");
    m.file("vendor/dep/dep.go", "package dep\n\nfunc Vendored() {}\n");
    let out = m.path().join("o.html");

    m.cmd()
        .arg(m.path())
        .arg("-o")
        .arg(&out)
        .arg("--offline")
        .assert()
        .success();
    assert!(std::fs::read_to_string(&out).unwrap().contains("func Vendored()"));

    m.cmd()
        .arg(m.path())
        .arg("-o")
        .arg(&out)
        .args(["--offline", "--skip-go-ignored"])
        .assert()
        .success();
    assert!(!std::fs::read_to_string(&out).unwrap().contains("Vendored"));
}
