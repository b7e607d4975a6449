//! Build orchestration: one target per invocation, top to bottom.
//!
//! ```text
//! data → resolve → render HTML (+ jobs) → PDF batch → metadata → publish → site index
//! ```
//!
//! Every stage runs once and never re-enters an earlier one. Which stages run
//! depends on the target:
//!
//! | Target | HTML | PDF | Publish | Site index |
//! |---|---|---|---|---|
//! | `cv` | output dir | unless HTML-only | PDFs → publish dir | - |
//! | `letter` | output dir | unless HTML-only | - | - |
//! | `portfolio` | publish dir | - | static, photo, `.nojekyll` | if `base_url` |
//!
//! Collaborators are injected: the [`Builder`] borrows a [`TemplateEngine`], a
//! [`PdfEngine`] and an optional [`MetadataEditor`]. Progress goes out as
//! [`BuildEvent`]s over an optional channel; the CLI prints them on its own
//! thread, rendering stays on the caller's thread.

use crate::config::BuildConfig;
use crate::data::{CvData, DataError, load_cv_data, load_letter_data};
use crate::metadata::{MetadataEditor, PdfMetadata, finalize_artifact};
use crate::pdf::{PdfEngine, PdfError, render_pdf_batch};
use crate::publish::{
    PublishError, mirror_dir, publish, publish_photo, relative_href, url_path, write_nojekyll,
};
use crate::render::{JobList, RenderError, RenderRequest, WrittenArtifact, render_and_write};
use crate::resolve::{Resolution, resolve_outputs};
use crate::sitemap::write_site_index;
use crate::templates::TemplateEngine;
use crate::types::{ArtifactManifest, DocumentKind, Language, OutputPaths};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Pdf(#[from] PdfError),
    #[error(transparent)]
    Publish(#[from] PublishError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BuildError {
    /// What the user should do about it, if anything is actionable.
    pub fn remediation(&self) -> Option<&'static str> {
        match self {
            BuildError::Pdf(e) => e.remediation(),
            BuildError::Data(DataError::MissingLetter(_)) => Some(
                "Create the cover letter JSON file, or point paths.cover_letter in \
                 cv-forge.toml at an existing one.",
            ),
            BuildError::Data(DataError::LabelCollision(..) | DataError::EmptyLabel(_)) => {
                Some("Rename one of the profile variants in the data file.")
            }
            _ => None,
        }
    }
}

/// What to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// CV in one language, or all of them.
    Cv { lang: Option<Language> },
    /// Cover letter in one language, or all of them.
    Letter { lang: Option<Language> },
    /// Public portfolio pages, published with the site index.
    Portfolio,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub target: Target,
    /// Requested profile variant. Unknown names fall back to `default`.
    pub profile: String,
    /// Skip the PDF phase entirely.
    pub html_only: bool,
}

impl BuildRequest {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            profile: crate::types::DEFAULT_VARIANT.to_string(),
            html_only: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    Html,
    Pdf,
    Publish,
}

impl BuildStage {
    pub fn label(self) -> &'static str {
        match self {
            BuildStage::Html => "Generating HTML files",
            BuildStage::Pdf => "Generating PDF files",
            BuildStage::Publish => "Publishing",
        }
    }
}

/// Progress events. Paths are relative to the project root when possible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    StageStarted {
        stage: BuildStage,
    },
    HtmlWritten {
        kind: DocumentKind,
        lang: Language,
        path: PathBuf,
    },
    PdfWritten {
        path: PathBuf,
    },
    MetadataWritten {
        path: PathBuf,
    },
    Published {
        path: PathBuf,
    },
    VariantFallback {
        requested: String,
        known: Vec<String>,
    },
    AssetMissing {
        path: PathBuf,
    },
    SiteIndexWritten {
        sitemap: PathBuf,
        robots: PathBuf,
    },
}

/// Outcome of a successful build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Variant actually built.
    pub variant: String,
    pub html: Vec<PathBuf>,
    pub pdfs: Vec<PathBuf>,
    pub published: Vec<PathBuf>,
    pub manifest: ArtifactManifest,
}

/// Runs builds against one project root and configuration.
pub struct Builder<'a> {
    config: &'a BuildConfig,
    root: PathBuf,
    templates: &'a dyn TemplateEngine,
    engine: &'a dyn PdfEngine,
    editor: Option<&'a dyn MetadataEditor>,
    events: Option<Sender<BuildEvent>>,
    api_key: String,
}

impl<'a> Builder<'a> {
    pub fn new(
        config: &'a BuildConfig,
        root: impl Into<PathBuf>,
        templates: &'a dyn TemplateEngine,
        engine: &'a dyn PdfEngine,
    ) -> Self {
        Self {
            config,
            root: root.into(),
            templates,
            engine,
            editor: None,
            events: None,
            api_key: String::new(),
        }
    }

    pub fn with_editor(mut self, editor: Option<&'a dyn MetadataEditor>) -> Self {
        self.editor = editor;
        self
    }

    /// Send progress events to `tx`. The sender is dropped when the build
    /// finishes, which ends the receiver's iteration.
    pub fn with_events(mut self, tx: Sender<BuildEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn build(self, request: &BuildRequest) -> Result<BuildReport, BuildError> {
        match request.target {
            Target::Cv { lang } => self.build_cv(request, lang),
            Target::Letter { lang } => self.build_letter(request, lang),
            Target::Portfolio => self.build_portfolio(request),
        }
    }

    // ------------------------------------------------------------------------
    // Targets
    // ------------------------------------------------------------------------

    fn build_cv(
        &self,
        request: &BuildRequest,
        lang: Option<Language>,
    ) -> Result<BuildReport, BuildError> {
        let data = self.load_data()?;
        let resolution = self.resolve(DocumentKind::Cv, &data, &request.profile);
        let mut report = BuildReport {
            variant: resolution.variant.clone(),
            ..BuildReport::default()
        };

        let out = self.path(&self.config.paths.output_dir);
        let photo = self.photo_href(&out);
        let written = self.render_all(
            &data,
            None,
            &resolution,
            lang,
            &out,
            request.html_only,
            photo.as_deref(),
            &mut report,
        )?;
        if request.html_only {
            return Ok(report);
        }
        self.print_pdfs(&data, &written, &mut report)?;

        self.emit(BuildEvent::StageStarted {
            stage: BuildStage::Publish,
        });
        let publish_dir = self.path(&self.config.paths.publish_dir);
        for pdf in report.pdfs.clone() {
            let Some(name) = pdf.file_name() else {
                continue;
            };
            let dst = publish_dir.join(name);
            publish(&pdf, &dst)?;
            report.manifest.push(url_path(Path::new(name)));
            self.emit(BuildEvent::Published {
                path: self.display_path(&dst),
            });
            report.published.push(dst);
        }
        Ok(report)
    }

    fn build_letter(
        &self,
        request: &BuildRequest,
        lang: Option<Language>,
    ) -> Result<BuildReport, BuildError> {
        let letter = load_letter_data(&self.path(&self.config.paths.cover_letter))?;
        let data = self.load_data()?;
        let resolution = self.resolve(DocumentKind::CoverLetter, &data, &request.profile);
        let mut report = BuildReport {
            variant: resolution.variant.clone(),
            ..BuildReport::default()
        };

        let out = self.path(&self.config.paths.output_dir);
        let written = self.render_all(
            &data,
            Some(&letter),
            &resolution,
            lang,
            &out,
            request.html_only,
            None,
            &mut report,
        )?;
        if !request.html_only {
            self.print_pdfs(&data, &written, &mut report)?;
        }
        Ok(report)
    }

    fn build_portfolio(&self, request: &BuildRequest) -> Result<BuildReport, BuildError> {
        let data = self.load_data()?;
        let resolution = self.resolve(DocumentKind::Portfolio, &data, &request.profile);
        // Download links point at the published CV of the same variant.
        let cv = resolve_outputs(
            DocumentKind::Cv,
            &resolution.variant,
            &data.variant_names(),
            &self.config.naming.acronyms,
        );
        let mut report = BuildReport {
            variant: resolution.variant.clone(),
            ..BuildReport::default()
        };
        let publish_dir = self.path(&self.config.paths.publish_dir);

        self.emit(BuildEvent::StageStarted {
            stage: BuildStage::Html,
        });
        // Copied first: pages only reference the photo when it exists.
        let photo_src = self.path(&self.config.paths.photo);
        let photo = match photo_src.file_name() {
            Some(name) => publish_photo(&photo_src, &publish_dir.join(name))?
                .then(|| PathBuf::from(name)),
            None => None,
        };
        if photo.is_none() {
            self.emit(BuildEvent::AssetMissing {
                path: self.display_path(&photo_src),
            });
        }

        for (lang, paths) in resolution.select(None) {
            let alternates: Vec<(Language, String)> = resolution
                .outputs
                .iter()
                .filter(|(other, _)| **other != lang)
                .map(|(other, p)| (*other, relative_href(&paths.html, &p.html)))
                .collect();
            let download = cv
                .outputs
                .get(&lang)
                .and_then(|p| p.pdf.as_deref())
                .map(|pdf| relative_href(&paths.html, pdf));
            let photo_href = photo.as_deref().map(|p| relative_href(&paths.html, p));
            let target = OutputPaths {
                html: publish_dir.join(&paths.html),
                pdf: None,
            };

            let written = render_and_write(
                self.templates,
                &data,
                None,
                &RenderRequest {
                    kind: DocumentKind::Portfolio,
                    lang,
                    variant: &resolution.variant,
                    paths: &target,
                    api_key: &self.api_key,
                    filename_hint: Some(download.as_deref().unwrap_or("")),
                    photo: photo_href.as_deref(),
                    alternates: &alternates,
                },
                None,
            )?;
            report.manifest.push(url_path(&paths.html));
            self.record_html(&written, &mut report);
        }

        self.emit(BuildEvent::StageStarted {
            stage: BuildStage::Publish,
        });
        let static_src = self.path(&self.config.paths.static_dir);
        mirror_dir(&static_src, &publish_dir.join("static"))?;
        write_nojekyll(&publish_dir)?;

        if let Some(index) =
            write_site_index(&publish_dir, &self.config.site.base_url, &report.manifest)?
        {
            self.emit(BuildEvent::SiteIndexWritten {
                sitemap: self.display_path(&index.sitemap),
                robots: self.display_path(&index.robots),
            });
        }
        Ok(report)
    }

    // ------------------------------------------------------------------------
    // Shared stages
    // ------------------------------------------------------------------------

    fn load_data(&self) -> Result<CvData, BuildError> {
        Ok(load_cv_data(
            &self.path(&self.config.paths.data),
            &self.config.naming.acronyms,
        )?)
    }

    fn resolve(&self, kind: DocumentKind, data: &CvData, profile: &str) -> Resolution {
        let resolution = resolve_outputs(
            kind,
            profile,
            &data.variant_names(),
            &self.config.naming.acronyms,
        );
        if let Some(fallback) = &resolution.fallback {
            self.emit(BuildEvent::VariantFallback {
                requested: fallback.requested.clone(),
                known: fallback.known.clone(),
            });
        }
        resolution
    }

    /// Render every selected language into `out`, queueing PDF jobs unless
    /// `html_only`.
    #[allow(clippy::too_many_arguments)]
    fn render_all(
        &self,
        data: &CvData,
        letter: Option<&Value>,
        resolution: &Resolution,
        lang: Option<Language>,
        out: &Path,
        html_only: bool,
        photo: Option<&str>,
        report: &mut BuildReport,
    ) -> Result<(JobList, Vec<WrittenArtifact>), BuildError> {
        self.emit(BuildEvent::StageStarted {
            stage: BuildStage::Html,
        });
        let mut jobs = JobList::new();
        let mut written = Vec::new();
        for (lang, paths) in resolution.select(lang) {
            let target = OutputPaths {
                html: out.join(&paths.html),
                pdf: paths.pdf.as_ref().map(|p| out.join(p)),
            };
            let artifact = render_and_write(
                self.templates,
                data,
                letter,
                &RenderRequest {
                    kind: resolution.kind,
                    lang,
                    variant: &resolution.variant,
                    paths: &target,
                    api_key: &self.api_key,
                    filename_hint: None,
                    photo,
                    alternates: &[],
                },
                if html_only { None } else { Some(&mut jobs) },
            )?;
            self.record_html(&artifact, report);
            written.push(artifact);
        }
        Ok((jobs, written))
    }

    /// One PDF batch for everything queued, then metadata per PDF.
    fn print_pdfs(
        &self,
        data: &CvData,
        (jobs, written): &(JobList, Vec<WrittenArtifact>),
        report: &mut BuildReport,
    ) -> Result<(), BuildError> {
        if jobs.is_empty() {
            return Ok(());
        }
        self.emit(BuildEvent::StageStarted {
            stage: BuildStage::Pdf,
        });
        render_pdf_batch(self.engine, jobs.jobs(), &self.config.pdf, |job| {
            self.emit(BuildEvent::PdfWritten {
                path: self.display_path(&job.pdf),
            });
        })?;

        for artifact in written {
            let Some(pdf) = &artifact.pdf else {
                continue;
            };
            let meta = PdfMetadata::for_document(
                artifact.kind,
                artifact.lang,
                data.identity_name(),
                &self.config.metadata,
            );
            if finalize_artifact(self.editor, pdf, &meta) {
                self.emit(BuildEvent::MetadataWritten {
                    path: self.display_path(pdf),
                });
            }
            report.pdfs.push(pdf.clone());
        }
        Ok(())
    }

    fn record_html(&self, artifact: &WrittenArtifact, report: &mut BuildReport) {
        self.emit(BuildEvent::HtmlWritten {
            kind: artifact.kind,
            lang: artifact.lang,
            path: self.display_path(&artifact.html),
        });
        report.html.push(artifact.html.clone());
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn path(&self, configured: &Path) -> PathBuf {
        self.root.join(configured)
    }

    fn display_path(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }

    /// Photo href for pages written to `page_dir`, when the photo exists and
    /// lives below it.
    fn photo_href(&self, page_dir: &Path) -> Option<String> {
        let photo = self.path(&self.config.paths.photo);
        if !photo.is_file() {
            return None;
        }
        photo.strip_prefix(page_dir).ok().map(url_path)
    }

    fn emit(&self, event: BuildEvent) {
        if let Some(tx) = &self.events {
            tx.send(event).ok();
        }
    }
}
