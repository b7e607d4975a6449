//! CLI output formatting for the build pipeline.
//!
//! # Output Format
//!
//! ```text
//! ==> Generating HTML files
//!     CV (es) → CV_español.html
//!     CV (en) → CV_english.html
//! ==> Generating PDF files
//!     PDF → CV_español.pdf
//!     PDF → CV_english.pdf
//!     Metadata → CV_español.pdf
//! ==> Publishing
//!     Published → docs/CV_español.pdf
//! ==> Build complete: 2 HTML, 2 PDF, 2 published (profile: default)
//! ```
//!
//! Warnings and notes are interleaved with progress:
//!
//! ```text
//! warning: unknown profile "astronaut", building "default" instead
//!     Known profiles: ai-engineer, default, mlops
//! note: optional asset not found: static/profile.jpg
//! ```
//!
//! Fatal errors go to stderr with an indented hint when one exists:
//!
//! ```text
//! error: Could not start the rendering engine: ...
//!     hint: Install Google Chrome or Chromium, ...
//! ```
//!
//! # Architecture
//!
//! Each format function returns `Vec<String>` for testability; `print_*`
//! wrappers write them out. Format functions are pure.

use crate::pipeline::{BuildEvent, BuildReport};
use crate::types::DEFAULT_VARIANT;
use std::path::Path;

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn arrow_line(label: &str, path: &Path) -> String {
    format!("{}{} \u{2192} {}", indent(1), label, path.display())
}

/// Format a single progress event as display lines.
pub fn format_build_event(event: &BuildEvent) -> Vec<String> {
    match event {
        BuildEvent::StageStarted { stage } => vec![format!("==> {}", stage.label())],
        BuildEvent::HtmlWritten { kind, lang, path } => {
            vec![arrow_line(&format!("{kind} ({lang})"), path)]
        }
        BuildEvent::PdfWritten { path } => vec![arrow_line("PDF", path)],
        BuildEvent::MetadataWritten { path } => vec![arrow_line("Metadata", path)],
        BuildEvent::Published { path } => vec![arrow_line("Published", path)],
        BuildEvent::VariantFallback { requested, known } => vec![
            format!("warning: unknown profile {requested:?}, building {DEFAULT_VARIANT:?} instead"),
            format!("{}Known profiles: {}", indent(1), known.join(", ")),
        ],
        BuildEvent::AssetMissing { path } => {
            vec![format!("note: optional asset not found: {}", path.display())]
        }
        BuildEvent::SiteIndexWritten { sitemap, robots } => vec![
            arrow_line("Sitemap", sitemap),
            arrow_line("Robots", robots),
        ],
    }
}

/// Summary line for a finished build.
pub fn format_report(report: &BuildReport) -> Vec<String> {
    let mut parts = vec![format!("{} HTML", report.html.len())];
    if !report.pdfs.is_empty() {
        parts.push(format!("{} PDF", report.pdfs.len()));
    }
    if !report.published.is_empty() {
        parts.push(format!("{} published", report.published.len()));
    }
    if !report.manifest.is_empty() && report.published.is_empty() {
        parts.push(format!("{} pages", report.manifest.pages().len()));
    }
    vec![format!(
        "==> Build complete: {} (profile: {})",
        parts.join(", "),
        report.variant
    )]
}

/// Error message plus optional remediation hint.
pub fn format_error(error: &dyn std::error::Error, hint: Option<&str>) -> Vec<String> {
    let mut lines = vec![format!("error: {error}")];
    if let Some(hint) = hint {
        lines.push(format!("{}hint: {hint}", indent(1)));
    }
    lines
}

pub fn print_build_event(event: &BuildEvent) {
    for line in format_build_event(event) {
        println!("{}", line);
    }
}

pub fn print_report(report: &BuildReport) {
    for line in format_report(report) {
        println!("{}", line);
    }
}

pub fn print_error(error: &dyn std::error::Error, hint: Option<&str>) {
    for line in format_error(error, hint) {
        eprintln!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::BuildStage;
    use crate::types::{ArtifactManifest, DocumentKind, Language};
    use std::path::PathBuf;

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn stage_header() {
        let lines = format_build_event(&BuildEvent::StageStarted {
            stage: BuildStage::Pdf,
        });
        assert_eq!(lines, vec!["==> Generating PDF files"]);
    }

    #[test]
    fn html_written_shows_kind_and_language() {
        let lines = format_build_event(&BuildEvent::HtmlWritten {
            kind: DocumentKind::Cv,
            lang: Language::Es,
            path: PathBuf::from("CV_español.html"),
        });
        assert_eq!(lines, vec!["    CV (es) \u{2192} CV_español.html"]);
    }

    #[test]
    fn fallback_is_a_warning_listing_known() {
        let lines = format_build_event(&BuildEvent::VariantFallback {
            requested: "astronaut".into(),
            known: vec!["ai-engineer".into(), "default".into()],
        });
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("warning: "));
        assert!(lines[0].contains("\"astronaut\""));
        assert!(lines[1].contains("ai-engineer, default"));
    }

    #[test]
    fn missing_asset_is_a_note() {
        let lines = format_build_event(&BuildEvent::AssetMissing {
            path: PathBuf::from("static/profile.jpg"),
        });
        assert_eq!(lines, vec!["note: optional asset not found: static/profile.jpg"]);
    }

    #[test]
    fn site_index_lists_both_files() {
        let lines = format_build_event(&BuildEvent::SiteIndexWritten {
            sitemap: PathBuf::from("docs/sitemap.xml"),
            robots: PathBuf::from("docs/robots.txt"),
        });
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with("docs/robots.txt"));
    }

    #[test]
    fn report_counts() {
        let report = BuildReport {
            variant: "ai-engineer".into(),
            html: vec![PathBuf::from("a.html"), PathBuf::from("b.html")],
            pdfs: vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")],
            published: vec![PathBuf::from("docs/a.pdf")],
            manifest: ArtifactManifest::new(),
        };
        assert_eq!(
            format_report(&report),
            vec!["==> Build complete: 2 HTML, 2 PDF, 1 published (profile: ai-engineer)"]
        );
    }

    #[test]
    fn report_html_only() {
        let report = BuildReport {
            variant: "default".into(),
            html: vec![PathBuf::from("a.html")],
            ..BuildReport::default()
        };
        assert_eq!(
            format_report(&report),
            vec!["==> Build complete: 1 HTML (profile: default)"]
        );
    }

    #[test]
    fn report_portfolio_pages() {
        let mut manifest = ArtifactManifest::new();
        manifest.push("index.html");
        manifest.push("en/index.html");
        let report = BuildReport {
            variant: "default".into(),
            html: vec![PathBuf::from("docs/index.html"), PathBuf::from("docs/en/index.html")],
            manifest,
            ..BuildReport::default()
        };
        assert_eq!(
            format_report(&report),
            vec!["==> Build complete: 2 HTML, 2 pages (profile: default)"]
        );
    }

    #[test]
    fn error_with_hint() {
        let err = std::io::Error::other("boom");
        let lines = format_error(&err, Some("try again"));
        assert_eq!(lines, vec!["error: boom", "    hint: try again"]);
    }

    #[test]
    fn error_without_hint() {
        let err = std::io::Error::other("boom");
        assert_eq!(format_error(&err, None), vec!["error: boom"]);
    }
}
