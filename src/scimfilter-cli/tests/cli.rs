//! Integration tests for the scimfilter binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// The binary, isolated from any configuration on the host
fn scimfilter(workdir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("scimfilter").unwrap();
    cmd.current_dir(workdir.path())
        .env("HOME", workdir.path())
        .env("XDG_CONFIG_HOME", workdir.path().join(".config"))
        .env_remove("SCIMFILTER_MAX_DEPTH")
        .env_remove("SCIMFILTER_PRETTY")
        .env_remove("SCIMFILTER_VERBOSITY")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_parse_compact() {
    let workdir = TempDir::new().unwrap();
    scimfilter(&workdir)
        .args(["parse", "--compact", r#"userName eq "bjensen" and title pr"#])
        .assert()
        .success()
        .stdout(r#"[{"userName":["eq","bjensen"],"title":["pr"]}]"#.to_owned() + "\n");
}

#[test]
fn test_parse_pretty_by_default() {
    let workdir = TempDir::new().unwrap();
    scimfilter(&workdir)
        .args(["parse", "a eq 1 or b eq 2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[\n  {\n    \"a\": ["));
}

#[test]
fn test_parse_canonical() {
    let workdir = TempDir::new().unwrap();
    scimfilter(&workdir)
        .args(["parse", "--canonical", "NOT (a PR) AND B Eq true"])
        .assert()
        .success()
        .stdout("B eq true and not (a pr)\n");
}

#[test]
fn test_parse_from_stdin() {
    let workdir = TempDir::new().unwrap();
    scimfilter(&workdir)
        .args(["parse", "--compact"])
        .write_stdin("emails[type eq \"work\"]\n")
        .assert()
        .success()
        .stdout("[{\"emails\":{\"type\":[\"eq\",\"work\"]}}]\n");
}

#[test]
fn test_parse_from_file() {
    let workdir = TempDir::new().unwrap();
    let path = workdir.path().join("filter.txt");
    fs::write(&path, "not (title pr)\n").unwrap();

    scimfilter(&workdir)
        .args(["parse", "-c", "--file"])
        .arg(&path)
        .assert()
        .success()
        .stdout("[{\"!!\":{\"title\":[\"pr\"]}}]\n");

    scimfilter(&workdir)
        .args(["parse", "--file", "missing.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read filter file"));
}

#[test]
fn test_invalid_filter_reports_scim_error() {
    let workdir = TempDir::new().unwrap();
    scimfilter(&workdir)
        .args(["parse", "(userName eq \"bjensen\""])
        .assert()
        .code(1)
        .stdout("")
        .stderr(
            predicate::str::contains(r#""scimType":"invalidFilter""#)
                .and(predicate::str::contains(r#""status":"400""#))
                .and(predicate::str::contains("Missing closing ')'")),
        );
}

#[test]
fn test_check() {
    let workdir = TempDir::new().unwrap();
    scimfilter(&workdir)
        .args(["check", "title pr"])
        .assert()
        .success()
        .stdout("Filter is valid\n");

    scimfilter(&workdir)
        .args(["check", "userName eq"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Expected a comparison value"));
}

#[test]
fn test_max_depth_flag() {
    let workdir = TempDir::new().unwrap();
    scimfilter(&workdir)
        .args(["check", "--max-depth", "1", "((a pr))"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("nested deeper than 1"));

    scimfilter(&workdir)
        .args(["check", "--max-depth", "0", "a pr"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Max depth must be greater than 0"));
}

#[test]
fn test_id() {
    let workdir = TempDir::new().unwrap();
    scimfilter(&workdir)
        .args(["id", "--canonical", "2819c223-7f76"])
        .assert()
        .success()
        .stdout("id eq \"2819c223-7f76\"\n");
}

#[test]
fn test_config_file_discovery_and_env() {
    let workdir = TempDir::new().unwrap();
    fs::write(
        workdir.path().join("scimfilter.toml"),
        "[output]\npretty = false\n",
    )
    .unwrap();

    scimfilter(&workdir)
        .args(["parse", "a pr"])
        .assert()
        .success()
        .stdout("[{\"a\":[\"pr\"]}]\n");

    scimfilter(&workdir)
        .env("SCIMFILTER_MAX_DEPTH", "1")
        .args(["check", "((a pr))"])
        .assert()
        .code(1);
}

#[test]
fn test_explicit_config_file() {
    let workdir = TempDir::new().unwrap();
    let path = workdir.path().join("custom.yaml");
    fs::write(&path, "output:\n  canonical: true\n").unwrap();

    scimfilter(&workdir)
        .arg("--config")
        .arg(&path)
        .args(["parse", "a EQ 1"])
        .assert()
        .success()
        .stdout("a eq 1\n");
}

#[test]
fn test_config_init_and_show() {
    let workdir = TempDir::new().unwrap();

    scimfilter(&workdir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config file"));
    assert!(workdir.path().join("scimfilter.toml").exists());

    scimfilter(&workdir)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    scimfilter(&workdir)
        .args(["config", "init", "--force"])
        .assert()
        .success();

    scimfilter(&workdir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("max_depth: 64"));
}
