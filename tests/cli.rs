//! CLI behaviour that needs no browser: exit codes, HTML-only builds and
//! config generation.

mod common;

use common::project;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn cv_forge(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cv-forge"))
        .arg("--root")
        .arg(root)
        .args(args)
        .output()
        .expect("failed to run cv-forge")
}

#[test]
fn gen_config_prints_stock_file() {
    let tmp = TempDir::new().unwrap();
    let out = cv_forge(tmp.path(), &["gen-config"]);
    assert!(out.status.success());
    let text = String::from_utf8(out.stdout).unwrap();
    assert!(text.contains("[pdf.margins.cv]"));
    assert!(text.contains("api_key_var"));
}

#[test]
fn html_only_cv_succeeds_without_browser() {
    let tmp = project();
    let out = cv_forge(tmp.path(), &["--html-only", "cv", "es"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    assert!(tmp.path().join("CV_español.html").is_file());
    assert!(!tmp.path().join("CV_english.html").exists());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("==> Generating HTML files"));
    assert!(stdout.contains("==> Build complete"));
}

#[test]
fn unknown_profile_warns_and_exits_zero() {
    let tmp = project();
    let out = cv_forge(tmp.path(), &["--html-only", "--profile", "astronaut", "cv"]);
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("warning: unknown profile \"astronaut\""));
    assert!(stdout.contains("ai-engineer"));
}

#[test]
fn missing_letter_exits_nonzero_with_hint() {
    let tmp = project();
    std::fs::remove_file(tmp.path().join("data/cover_letter.json")).unwrap();

    let out = cv_forge(tmp.path(), &["--html-only", "letter"]);

    assert!(!out.status.success());
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("error: Cover letter data not found"));
    assert!(stderr.contains("hint:"));
}

#[test]
fn invalid_config_exits_nonzero() {
    let tmp = project();
    std::fs::write(tmp.path().join("cv-forge.toml"), "[pdf]\nformat = \"a5\"\n").unwrap();

    let out = cv_forge(tmp.path(), &["--html-only", "cv"]);

    assert!(!out.status.success());
    assert!(String::from_utf8(out.stderr).unwrap().starts_with("error:"));
}

#[test]
fn portfolio_publishes_site() {
    let tmp = project();
    std::fs::write(
        tmp.path().join("cv-forge.toml"),
        "[site]\nbase_url = \"https://ada.example\"\n",
    )
    .unwrap();

    let out = cv_forge(tmp.path(), &["portfolio"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let docs = tmp.path().join("docs");
    assert!(docs.join("index.html").is_file());
    assert!(docs.join("en/index.html").is_file());
    assert!(docs.join(".nojekyll").is_file());
    let robots = std::fs::read_to_string(docs.join("robots.txt")).unwrap();
    assert!(robots.contains("Sitemap: https://ada.example/sitemap.xml"));
}
