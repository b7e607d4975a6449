//! Fixture setup shared by the integration suites.

use cv_forge::publish::mirror_dir;
use std::path::PathBuf;
use tempfile::TempDir;

/// A fresh temp copy of `fixtures/project/`.
pub fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/project");
    mirror_dir(&fixtures, tmp.path()).unwrap();
    tmp
}
