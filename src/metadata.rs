//! PDF document-information metadata.
//!
//! After a PDF is printed, its Info dictionary is rewritten with a title,
//! author, subject, keywords and the generator tag (as both `Creator` and
//! `Producer`). Search engines and PDF readers show these instead of the
//! browser's defaults.
//!
//! ## Field resolution
//!
//! Each field takes the first non-empty value from its sources:
//!
//! ```text
//! author:   resolve(&[config.metadata.author, identity.name])
//! title:    "<author> - <document title>"   (or just the document title)
//! ```
//!
//! ## Best effort
//!
//! Metadata is an enhancement. [`finalize_artifact`] swallows every failure
//! and leaves the PDF exactly as printed; a build is never failed by it. When
//! the crate is built without the `pdf-metadata` feature, [`default_editor`]
//! returns `None` and the step is skipped entirely.
//!
//! Edits are idempotent: no modification timestamp is written, so running the
//! step twice yields the same Info dictionary.

use crate::config::MetadataConfig;
use crate::types::{DocumentKind, Language};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF error: {0}")]
    Pdf(String),
}

/// Values written into a PDF's Info dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdfMetadata {
    pub title: String,
    pub author: String,
    pub subject: String,
    pub keywords: Vec<String>,
    pub generator: String,
}

impl PdfMetadata {
    /// Metadata for one printed document.
    pub fn for_document(
        kind: DocumentKind,
        lang: Language,
        identity_name: Option<&str>,
        config: &MetadataConfig,
    ) -> Self {
        let author = resolve(&[config.author.as_deref(), identity_name]).unwrap_or_default();
        let doc_title = document_title(kind, lang);
        let title = if author.is_empty() {
            doc_title.to_string()
        } else {
            format!("{author} - {doc_title}")
        };
        Self {
            title,
            author,
            subject: doc_title.to_string(),
            keywords: config.keywords.clone(),
            generator: config.generator.clone(),
        }
    }
}

fn document_title(kind: DocumentKind, lang: Language) -> &'static str {
    match (kind, lang) {
        (DocumentKind::Cv, Language::Es) => "Currículum Vitae",
        (DocumentKind::Cv, Language::En) => "Curriculum Vitae",
        (DocumentKind::CoverLetter, Language::Es) => "Carta de presentación",
        (DocumentKind::CoverLetter, Language::En) => "Cover Letter",
        (DocumentKind::Portfolio, Language::Es) => "Portafolio",
        (DocumentKind::Portfolio, Language::En) => "Portfolio",
    }
}

/// First non-empty (after trimming) value among `sources`.
pub fn resolve(sources: &[Option<&str>]) -> Option<String> {
    sources
        .iter()
        .filter_map(|opt| {
            opt.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .next()
}

/// Rewrites the metadata of a PDF file in place.
pub trait MetadataEditor {
    fn apply(&self, pdf: &Path, meta: &PdfMetadata) -> Result<(), MetadataError>;
}

/// The editor compiled into this build, if any.
pub fn default_editor() -> Option<Box<dyn MetadataEditor>> {
    #[cfg(feature = "pdf-metadata")]
    {
        Some(Box::new(LopdfEditor))
    }
    #[cfg(not(feature = "pdf-metadata"))]
    {
        None
    }
}

/// Inject metadata into `pdf`. Returns whether the file was updated.
///
/// Never fails: a missing editor, an unreadable file or a malformed PDF all
/// leave the artifact untouched and return `false`.
pub fn finalize_artifact(
    editor: Option<&dyn MetadataEditor>,
    pdf: &Path,
    meta: &PdfMetadata,
) -> bool {
    match editor {
        Some(editor) => editor.apply(pdf, meta).is_ok(),
        None => false,
    }
}

/// [`MetadataEditor`] backed by `lopdf`.
#[cfg(feature = "pdf-metadata")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfEditor;

#[cfg(feature = "pdf-metadata")]
impl MetadataEditor for LopdfEditor {
    fn apply(&self, pdf: &Path, meta: &PdfMetadata) -> Result<(), MetadataError> {
        use lopdf::{Dictionary, Document, Object};

        let pdf_err = |e: lopdf::Error| MetadataError::Pdf(e.to_string());
        let mut doc = Document::load(pdf).map_err(pdf_err)?;

        let entries = [
            ("Title", meta.title.as_str()),
            ("Author", meta.author.as_str()),
            ("Subject", meta.subject.as_str()),
            ("Creator", meta.generator.as_str()),
            ("Producer", meta.generator.as_str()),
        ];
        let keywords = meta.keywords.join(", ");

        let fill = |info: &mut Dictionary| {
            for (key, value) in entries {
                if !value.is_empty() {
                    info.set(key, text_string(value));
                }
            }
            if !keywords.is_empty() {
                info.set("Keywords", text_string(&keywords));
            }
        };

        let existing = doc
            .trailer
            .get(b"Info")
            .and_then(Object::as_reference)
            .ok();
        match existing {
            Some(id) => {
                let info = doc
                    .get_object_mut(id)
                    .and_then(Object::as_dict_mut)
                    .map_err(pdf_err)?;
                fill(info);
            }
            None => {
                let mut info = Dictionary::new();
                fill(&mut info);
                let id = doc.add_object(info);
                doc.trailer.set("Info", Object::Reference(id));
            }
        }

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|e| MetadataError::Pdf(e.to_string()))?;
        crate::render::write_atomic(pdf, &bytes)?;
        Ok(())
    }
}

/// PDF text string: literal for ASCII, UTF-16BE with BOM otherwise.
#[cfg(feature = "pdf-metadata")]
fn text_string(value: &str) -> lopdf::Object {
    if value.is_ascii() {
        return lopdf::Object::string_literal(value);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in value.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    lopdf::Object::String(bytes, lopdf::StringFormat::Hexadecimal)
}
