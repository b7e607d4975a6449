//! Render dispatch: data record → HTML artifact on disk (+ queued PDF job).
//!
//! For each resolved (kind, variant, language) combination the dispatcher
//! merges the base record with the variant overrides, hands it to the
//! [`TemplateEngine`], and writes the returned text verbatim to the resolved
//! HTML path. Writes go through a temporary file in the destination directory
//! that is renamed into place, so a failed render never leaves a truncated
//! HTML file behind.
//!
//! When the run produces PDFs, every written HTML file with a PDF mapping is
//! appended to the shared [`JobList`]. Jobs are only ever created here, from
//! HTML written in the same invocation.

use crate::data::{CvData, with_letter};
use crate::templates::{RenderParams, TemplateEngine, TemplateError};
use crate::types::{BuildJob, DocumentKind, Language, OutputPaths};
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Template resolution failed: {0}")]
    TemplateResolution(#[from] TemplateError),
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// PDF jobs collected during the HTML phase, in render order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobList {
    jobs: Vec<BuildJob>,
}

impl JobList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, job: BuildJob) {
        self.jobs.push(job);
    }

    pub fn jobs(&self) -> &[BuildJob] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// An HTML file written by [`render_and_write`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenArtifact {
    pub kind: DocumentKind,
    pub lang: Language,
    pub html: PathBuf,
    /// PDF destination, if a job was queued for it.
    pub pdf: Option<PathBuf>,
}

/// One combination to render. Paths are absolute (already joined with the
/// output root).
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub kind: DocumentKind,
    pub lang: Language,
    pub variant: &'a str,
    pub paths: &'a OutputPaths,
    pub api_key: &'a str,
    /// Overrides the filename hint derived from `paths`.
    pub filename_hint: Option<&'a str>,
    pub photo: Option<&'a str>,
    pub alternates: &'a [(Language, String)],
}

impl RenderRequest<'_> {
    /// Filename hint for the template: explicit override, else the PDF
    /// filename, else the HTML filename.
    fn filename_hint(&self) -> String {
        if let Some(hint) = self.filename_hint {
            return hint.to_string();
        }
        self.paths
            .pdf
            .as_deref()
            .unwrap_or(&self.paths.html)
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Render one combination and write its HTML.
///
/// `letter` is merged into the record under `letter` for cover letters.
/// Pass `jobs: None` for HTML-only runs; no job is queued then.
pub fn render_and_write(
    engine: &dyn TemplateEngine,
    data: &CvData,
    letter: Option<&Value>,
    request: &RenderRequest<'_>,
    jobs: Option<&mut JobList>,
) -> Result<WrittenArtifact, RenderError> {
    let mut record = data.record_for(request.variant);
    if let Some(letter) = letter {
        record = with_letter(record, letter.clone());
    }

    let filename = request.filename_hint();
    let params = RenderParams {
        lang: request.lang,
        api_key: request.api_key,
        filename: &filename,
        profile: request.variant,
        photo: request.photo,
        alternates: request.alternates,
    };
    let html = engine.render(request.kind.template_name(), &record, &params)?;

    write_atomic(&request.paths.html, html.as_bytes()).map_err(|source| RenderError::Write {
        path: request.paths.html.clone(),
        source,
    })?;

    let pdf = match (jobs, &request.paths.pdf) {
        (Some(jobs), Some(pdf)) => {
            jobs.push(BuildJob {
                html: request.paths.html.clone(),
                pdf: pdf.clone(),
                preset: request.kind.margin_preset(),
            });
            Some(pdf.clone())
        }
        _ => None,
    };

    Ok(WrittenArtifact {
        kind: request.kind,
        lang: request.lang,
        html: request.paths.html.clone(),
        pdf,
    })
}

/// Write `contents` to `path` all-or-nothing, creating parent directories.
///
/// The result is readable by everyone (`0644` on unix) like a plain
/// `fs::write`, since the publish tree is served by other users.
pub fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
