//! Shared types used across the build pipeline.
//!
//! Every value here lives for exactly one invocation: the resolver produces
//! [`OutputPaths`], the dispatcher turns them into [`BuildJob`]s, and the
//! publisher records pages into an [`ArtifactManifest`]. Nothing is persisted
//! between runs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Sentinel name of the canonical profile variant.
pub const DEFAULT_VARIANT: &str = "default";

/// Supported output languages. The set is closed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Es,
    En,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Es, Language::En];

    /// BCP-47 tag used in `<html lang>` and as the key of localized data fields.
    pub fn tag(self) -> &'static str {
        match self {
            Language::Es => "es",
            Language::En => "en",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Language> {
        Self::ALL.into_iter().find(|l| l.tag() == tag)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// The category of artifact being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Cv,
    CoverLetter,
    Portfolio,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 3] = [
        DocumentKind::Cv,
        DocumentKind::CoverLetter,
        DocumentKind::Portfolio,
    ];

    /// Name of the template that renders this kind.
    pub fn template_name(self) -> &'static str {
        match self {
            DocumentKind::Cv => "cv.html",
            DocumentKind::CoverLetter => "cover_letter.html",
            DocumentKind::Portfolio => "portfolio.html",
        }
    }

    /// Canonical (default-variant) output filenames per language.
    ///
    /// A language missing from this table is skipped for the kind, not an
    /// error. A `None` PDF means the kind is HTML-only.
    pub fn outputs(self) -> &'static [(Language, &'static str, Option<&'static str>)] {
        match self {
            DocumentKind::Cv => &[
                (Language::Es, "CV_español.html", Some("CV_español.pdf")),
                (Language::En, "CV_english.html", Some("CV_english.pdf")),
            ],
            DocumentKind::CoverLetter => &[
                (
                    Language::Es,
                    "Carta_presentación.html",
                    Some("Carta_presentación.pdf"),
                ),
                (Language::En, "Cover_letter.html", Some("Cover_letter.pdf")),
            ],
            DocumentKind::Portfolio => &[
                (Language::Es, "index.html", None),
                (Language::En, "en/index.html", None),
            ],
        }
    }

    /// Margin preset applied when this kind is printed to PDF.
    pub fn margin_preset(self) -> MarginPreset {
        match self {
            DocumentKind::CoverLetter => MarginPreset::Letter,
            DocumentKind::Cv | DocumentKind::Portfolio => MarginPreset::Cv,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DocumentKind::Cv => "CV",
            DocumentKind::CoverLetter => "cover letter",
            DocumentKind::Portfolio => "portfolio",
        })
    }
}

/// Resolved output locations for one (kind, variant, language) triple,
/// relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub html: PathBuf,
    pub pdf: Option<PathBuf>,
}

/// Tag selecting a margin set from `[pdf.margins]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarginPreset {
    Cv,
    Letter,
}

/// One HTML → PDF conversion request within a batch.
///
/// Only created for HTML written during the current invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildJob {
    pub html: PathBuf,
    pub pdf: PathBuf,
    pub preset: MarginPreset,
}

/// Published page paths (relative to the publish root), in insertion order,
/// without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactManifest {
    pages: Vec<String>,
}

impl ArtifactManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a published page. Returns `false` if it was already listed.
    pub fn push(&mut self, page: impl Into<String>) -> bool {
        let page = page.into();
        if self.pages.contains(&page) {
            return false;
        }
        self.pages.push(page);
        true
    }

    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
