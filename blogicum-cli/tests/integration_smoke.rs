//! Smoke tests to verify command wiring

use assert_cmd::Command;
use predicates::prelude::*;

fn blogicum() -> Command {
    let mut cmd = Command::cargo_bin("blogicum").unwrap();
    // Keep the developer's environment out of the tests
    cmd.env_remove("BLOGICUM_CONFIG")
        .env_remove("BLOGICUM_SECRET_KEY")
        .env_remove("BLOGICUM_POSTS_PER_PAGE")
        .env("HOME", std::env::temp_dir());
    cmd
}

#[test]
fn test_help_lists_commands() {
    blogicum()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("category"))
        .stdout(predicate::str::contains("location"));
}

#[test]
fn test_serve_help() {
    blogicum()
        .arg("serve")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Address to bind to"));
}

#[test]
fn test_category_add_help() {
    blogicum()
        .arg("category")
        .arg("add")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("URL identifier"));
}

#[test]
fn test_location_list_help() {
    blogicum()
        .arg("location")
        .arg("list")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Output format"));
}

#[test]
fn test_config_show_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blog.toml");
    std::fs::write(
        &path,
        "posts_per_page = 7\nsecret_key = \"0123456789abcdef0123456789abcdef\"\n",
    )
    .unwrap();

    blogicum()
        .arg("--config")
        .arg(&path)
        .arg("config")
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("posts_per_page = 7"))
        .stdout(predicate::str::contains("<redacted>"))
        .stdout(predicate::str::contains("0123456789abcdef").not());
}

#[test]
fn test_config_validate_rejects_missing_secret() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blog.toml");
    std::fs::write(&path, "posts_per_page = 7\n").unwrap();

    blogicum()
        .arg("--config")
        .arg(&path)
        .arg("config")
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("secret_key"));
}
