//! Copying artifacts into the publish tree.
//!
//! The publish directory is what a static host serves. It receives:
//!
//! ```text
//! docs/
//! ├── .nojekyll              # Serve files as-is on GitHub Pages
//! ├── index.html             # Portfolio (es)
//! ├── en/index.html          # Portfolio (en)
//! ├── CV_español.pdf         # Published CV PDFs (download targets)
//! ├── CV_english.pdf
//! ├── profile.jpg            # Optional photo
//! └── static/                # Mirror of the project's static/
//! ```
//!
//! Every operation overwrites existing destination files. Nothing is ever
//! deleted from the publish tree.

use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Copy `src` to `dst`, creating parent directories and overwriting.
///
/// When both name the same file (the output directory is the publish
/// directory) the artifact is already in place and nothing is copied.
pub fn publish(src: &Path, dst: &Path) -> Result<(), PublishError> {
    let copy_err = |source| PublishError::Copy {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source,
    };
    if same_file(src, dst) {
        return Ok(());
    }
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(copy_err)?;
    }
    fs::copy(src, dst).map_err(copy_err)?;
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Recursively copy the files under `src` into `dst`.
///
/// A missing `src` copies nothing. Returns the number of files copied.
pub fn mirror_dir(src: &Path, dst: &Path) -> Result<usize, PublishError> {
    if !src.is_dir() {
        return Ok(0);
    }
    let mut copied = 0;
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry.map_err(|source| PublishError::Walk {
            path: src.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(src) else {
            continue;
        };
        publish(entry.path(), &dst.join(rel))?;
        copied += 1;
    }
    Ok(copied)
}

/// Write the empty `.nojekyll` marker at the publish root.
pub fn write_nojekyll(publish_root: &Path) -> Result<PathBuf, PublishError> {
    fs::create_dir_all(publish_root)?;
    let marker = publish_root.join(".nojekyll");
    fs::write(&marker, "")?;
    Ok(marker)
}

/// Copy the optional profile photo. `Ok(false)` when it does not exist.
pub fn publish_photo(photo: &Path, dst: &Path) -> Result<bool, PublishError> {
    if !photo.is_file() {
        return Ok(false);
    }
    publish(photo, dst)?;
    Ok(true)
}

/// Link from one publish-relative page to another publish-relative file.
///
/// ```text
/// relative_href("index.html",    "en/index.html")  → "en/index.html"
/// relative_href("en/index.html", "CV_english.pdf") → "../CV_english.pdf"
/// ```
pub fn relative_href(from_page: &Path, target: &Path) -> String {
    let depth = from_page
        .parent()
        .map(|p| {
            p.components()
                .filter(|c| matches!(c, Component::Normal(_)))
                .count()
        })
        .unwrap_or(0);
    let target = url_path(target);
    format!("{}{}", "../".repeat(depth), target)
}

/// Forward-slash form of a relative path, as used in URLs.
pub fn url_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn publish_creates_parents_and_overwrites() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("CV_english.pdf");
        let dst = tmp.path().join("docs/CV_english.pdf");
        fs::write(&src, "v1").unwrap();
        publish(&src, &dst).unwrap();
        fs::write(&src, "v2").unwrap();
        publish(&src, &dst).unwrap();
        assert_eq!(fs::read_to_string(&dst).unwrap(), "v2");
    }

    #[test]
    fn publish_onto_itself_keeps_contents() {
        let tmp = TempDir::new().unwrap();
        let docs = tmp.path().join("docs");
        fs::create_dir_all(&docs).unwrap();
        let pdf = docs.join("CV_english.pdf");
        fs::write(&pdf, "%PDF-1.4 printed").unwrap();

        // Same file reached through a different spelling
        publish(&pdf, &tmp.path().join("docs/./CV_english.pdf")).unwrap();

        assert_eq!(fs::read_to_string(&pdf).unwrap(), "%PDF-1.4 printed");
    }

    #[test]
    fn publish_missing_source_names_paths() {
        let tmp = TempDir::new().unwrap();
        let err = publish(&tmp.path().join("nope.pdf"), &tmp.path().join("docs/x.pdf"))
            .unwrap_err();
        assert!(err.to_string().contains("nope.pdf"));
    }

    #[test]
    fn mirror_copies_nested_files() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("static");
        fs::create_dir_all(src.join("js")).unwrap();
        fs::write(src.join("site.css"), "body{}").unwrap();
        fs::write(src.join("js/ai-suite.js"), "//").unwrap();

        let dst = tmp.path().join("docs/static");
        assert_eq!(mirror_dir(&src, &dst).unwrap(), 2);
        assert!(dst.join("site.css").is_file());
        assert!(dst.join("js/ai-suite.js").is_file());
    }

    #[test]
    fn mirror_missing_source_is_noop() {
        let tmp = TempDir::new().unwrap();
        let dst = tmp.path().join("docs/static");
        assert_eq!(mirror_dir(&tmp.path().join("static"), &dst).unwrap(), 0);
        assert!(!dst.exists());
    }

    #[test]
    fn mirror_keeps_unrelated_destination_files() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("static");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("a.css"), "").unwrap();
        let dst = tmp.path().join("out");
        fs::create_dir_all(&dst).unwrap();
        fs::write(dst.join("keep.txt"), "").unwrap();

        mirror_dir(&src, &dst).unwrap();
        assert!(dst.join("keep.txt").is_file());
        assert!(dst.join("a.css").is_file());
    }

    #[test]
    fn nojekyll_marker_is_empty() {
        let tmp = TempDir::new().unwrap();
        let marker = write_nojekyll(&tmp.path().join("docs")).unwrap();
        assert!(marker.ends_with(".nojekyll"));
        assert_eq!(fs::read(&marker).unwrap().len(), 0);
    }

    #[test]
    fn photo_optional() {
        let tmp = TempDir::new().unwrap();
        let dst = tmp.path().join("docs/profile.jpg");
        assert!(!publish_photo(&tmp.path().join("profile.jpg"), &dst).unwrap());
        assert!(!dst.exists());

        fs::write(tmp.path().join("profile.jpg"), [0xFF, 0xD8]).unwrap();
        assert!(publish_photo(&tmp.path().join("profile.jpg"), &dst).unwrap());
        assert!(dst.is_file());
    }

    #[test]
    fn relative_href_from_root_and_subdir() {
        assert_eq!(
            relative_href(Path::new("index.html"), Path::new("en/index.html")),
            "en/index.html"
        );
        assert_eq!(
            relative_href(Path::new("en/index.html"), Path::new("index.html")),
            "../index.html"
        );
        assert_eq!(
            relative_href(Path::new("en/index.html"), Path::new("CV_english.pdf")),
            "../CV_english.pdf"
        );
    }
}
