//! Variant label derivation and filename suffixing.
//!
//! Profile variants are keyed by lowercase, hyphenated names in the data
//! source (`ai-engineer`, `mlops`). Artifact filenames carry a display label
//! derived from that name:
//!
//! - `ai-engineer` → `AI-Engineer` (acronym upper-cased, other tokens title-cased)
//! - `mlops` → `MLOPS`
//! - `data-science` → `Data-Science`
//!
//! The label is ASCII-only so it is safe in filenames and URLs on every
//! filesystem. The `default` variant never gets a label: it owns the
//! canonical, unsuffixed filenames.

use std::path::{Path, PathBuf};

/// Derive the display label for a variant name.
///
/// Splits on `-`, upper-cases tokens found in `acronyms` (compared
/// case-insensitively), title-cases the rest and rejoins with `-`. The
/// input is first sanitized with [`sanitize_label`].
pub fn variant_label(name: &str, acronyms: &[String]) -> String {
    sanitize_label(name)
        .split('-')
        .map(|token| {
            let lower = token.to_ascii_lowercase();
            if acronyms.iter().any(|a| a.eq_ignore_ascii_case(&lower)) {
                token.to_ascii_uppercase()
            } else {
                title_case(&lower)
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

fn title_case(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Reduce a name to ASCII alphanumerics separated by single dashes.
///
/// - Replaces every other character (including `_`, spaces, non-ASCII) with `-`
/// - Collapses consecutive dashes
/// - Strips leading and trailing dashes
pub fn sanitize_label(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_dash = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
            prev_dash = false;
        } else if !prev_dash {
            out.push('-');
            prev_dash = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// Insert `_<label>` before the extension of the final path component.
///
/// `en/index.html` + `AI-Engineer` → `en/index_AI-Engineer.html`.
pub fn suffixed_path(path: &Path, label: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match path.extension() {
        Some(ext) => format!("{stem}_{label}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{label}"),
    };
    path.with_file_name(file_name)
}
