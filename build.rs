use std::process::{Command, Output};

/// Run git in the crate directory; `None` if git is missing or fails.
fn git(args: &[&str]) -> Option<Output> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
}

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");

    // Short commit hash for `cv-forge --version` on untagged builds.
    let hash = git(&["rev-parse", "--short", "HEAD"])
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .unwrap_or_default();
    let on_release_tag = git(&["describe", "--exact-match", "--tags", "HEAD"]).is_some();

    println!("cargo:rustc-env=CV_FORGE_GIT_HASH={hash}");
    println!("cargo:rustc-env=CV_FORGE_ON_RELEASE_TAG={on_release_tag}");
}
