//! Batch HTML → PDF conversion against one browser session.
//!
//! Launching Chrome dominates runtime for small batches, so the whole job list
//! is printed through a single session: [`render_pdf_batch`] launches the
//! engine once, opens a fresh page per job, and closes everything on the way
//! out.
//!
//! ## Resource scoping
//!
//! Two nested scopes, each released on its own exit path:
//!
//! ```text
//! session  ── launched once per batch, closed after the last job (or the first failure)
//!   page   ── opened per job, closed after that job (success or failure)
//! ```
//!
//! A failing job aborts the rest of the batch; the session is still closed.
//! HTML already written stays on disk.
//!
//! ## Readiness
//!
//! A page is only printed once it is settled:
//!
//! 1. [`PdfPage::open`] returns after navigation completes. For
//!    [`ChromeEngine`] that is `Tab::wait_until_navigated`, which waits for
//!    the `networkAlmostIdle` lifecycle event, so stylesheets, scripts and
//!    images referenced by the page have finished loading.
//! 2. [`PdfPage::wait_ready`] then waits for `readyState === "complete"` and
//!    for `document.fonts.ready` to resolve. Text metrics are wrong until web
//!    fonts settle, so printing earlier produces different line breaks.
//!
//! ## Engines
//!
//! [`PdfEngine`] is the seam: [`ChromeEngine`] drives a real headless
//! Chrome/Chromium through `headless_chrome`; tests substitute a recording
//! engine.

use crate::config::{Margins, PaperFormat, PdfConfig};
use crate::render::write_atomic;
use crate::types::{BuildJob, MarginPreset};
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Could not start the rendering engine: {0}")]
    EngineUnavailable(String),
    #[error("Rendering engine error: {0}")]
    Engine(String),
    #[error("PDF job for {html} failed: {source}")]
    Job {
        html: PathBuf,
        source: Box<PdfError>,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl PdfError {
    /// What the user should do about it, if anything is actionable.
    pub fn remediation(&self) -> Option<&'static str> {
        match self {
            PdfError::EngineUnavailable(_) => Some(
                "Install Google Chrome or Chromium, or point the CHROME environment \
                 variable at an existing binary. Use --html-only to skip PDFs.",
            ),
            PdfError::Job { source, .. } => source.remediation(),
            _ => None,
        }
    }
}

/// Print settings for one page, in the units Chrome expects (inches).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrintSettings {
    pub paper_width: f64,
    pub paper_height: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    pub print_background: bool,
    /// Emit a tagged PDF with a document outline.
    pub structured: bool,
}

const MM_PER_INCH: f64 = 25.4;

impl PrintSettings {
    pub fn new(format: PaperFormat, margins: &Margins) -> Self {
        let (paper_width, paper_height) = format.size_inches();
        Self {
            paper_width,
            paper_height,
            margin_top: margins.top / MM_PER_INCH,
            margin_bottom: margins.bottom / MM_PER_INCH,
            margin_left: margins.left / MM_PER_INCH,
            margin_right: margins.right / MM_PER_INCH,
            print_background: true,
            structured: true,
        }
    }

    /// Settings for a job's margin preset.
    pub fn for_preset(config: &PdfConfig, preset: MarginPreset) -> Self {
        let margins = match preset {
            MarginPreset::Cv => &config.margins.cv,
            MarginPreset::Letter => &config.margins.letter,
        };
        Self::new(config.format, margins)
    }
}

/// Launches browser sessions.
pub trait PdfEngine {
    fn launch(&self) -> Result<Box<dyn PdfSession>, PdfError>;
}

/// One running browser. Closed exactly once via [`PdfSession::close`].
pub trait PdfSession {
    fn new_page(&self) -> Result<Box<dyn PdfPage>, PdfError>;
    fn close(self: Box<Self>) -> Result<(), PdfError>;
}

/// One page context within a session.
pub trait PdfPage {
    /// Navigate to `url` and wait until the network is idle.
    fn open(&self, url: &str) -> Result<(), PdfError>;
    /// Wait until the document is complete and fonts have loaded.
    fn wait_ready(&self) -> Result<(), PdfError>;
    fn print(&self, settings: &PrintSettings) -> Result<Vec<u8>, PdfError>;
    fn close(self: Box<Self>) -> Result<(), PdfError>;
}

/// `file://` URL for a local HTML artifact. Relative paths resolve against
/// the working directory.
pub fn file_url(path: &Path) -> Result<String, PdfError> {
    let absolute = std::path::absolute(path).map_err(|source| PdfError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Url::from_file_path(&absolute)
        .map(String::from)
        .map_err(|()| PdfError::Engine(format!("not a file path: {}", absolute.display())))
}

/// Convert every job's HTML into its PDF using one engine session.
///
/// An empty job list launches nothing. The first failing job aborts the
/// batch; the session is closed regardless.
pub fn render_pdf_batch(
    engine: &dyn PdfEngine,
    jobs: &[BuildJob],
    config: &PdfConfig,
    mut on_written: impl FnMut(&BuildJob),
) -> Result<(), PdfError> {
    if jobs.is_empty() {
        return Ok(());
    }

    let session = engine.launch()?;
    let result = jobs.iter().try_for_each(|job| {
        let settings = PrintSettings::for_preset(config, job.preset);
        render_job(session.as_ref(), job, &settings).map_err(|e| PdfError::Job {
            html: job.html.clone(),
            source: Box::new(e),
        })?;
        on_written(job);
        Ok(())
    });
    let closed = session.close();
    result?;
    closed
}

fn render_job(
    session: &dyn PdfSession,
    job: &BuildJob,
    settings: &PrintSettings,
) -> Result<(), PdfError> {
    let page = session.new_page()?;
    let result = print_page(page.as_ref(), job, settings);
    let closed = page.close();
    result?;
    closed
}

fn print_page(page: &dyn PdfPage, job: &BuildJob, settings: &PrintSettings) -> Result<(), PdfError> {
    page.open(&file_url(&job.html)?)?;
    page.wait_ready()?;
    let bytes = page.print(settings)?;
    write_atomic(&job.pdf, &bytes).map_err(|source| PdfError::Write {
        path: job.pdf.clone(),
        source,
    })
}

// ============================================================================
// headless_chrome engine
// ============================================================================

/// Resolves once the document is complete and all font faces have loaded.
const READY_SCRIPT: &str = r#"new Promise((resolve) => {
    const fontsThenResolve = () => document.fonts.ready.then(() => resolve(document.fonts.status));
    if (document.readyState === "complete") {
        fontsThenResolve();
    } else {
        window.addEventListener("load", fontsThenResolve, { once: true });
    }
})"#;

/// Headless Chrome/Chromium via the DevTools protocol.
#[derive(Debug, Clone)]
pub struct ChromeEngine {
    /// Upper bound on waiting for navigation and readiness.
    pub idle_timeout: Duration,
}

impl Default for ChromeEngine {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(30),
        }
    }
}

impl ChromeEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PdfEngine for ChromeEngine {
    fn launch(&self) -> Result<Box<dyn PdfSession>, PdfError> {
        let options = LaunchOptions {
            idle_browser_timeout: self.idle_timeout,
            ..Default::default()
        };
        let browser =
            Browser::new(options).map_err(|e| PdfError::EngineUnavailable(e.to_string()))?;
        Ok(Box::new(ChromeSession {
            browser,
            timeout: self.idle_timeout,
        }))
    }
}

struct ChromeSession {
    browser: Browser,
    timeout: Duration,
}

impl PdfSession for ChromeSession {
    fn new_page(&self) -> Result<Box<dyn PdfPage>, PdfError> {
        let tab = self.browser.new_tab().map_err(engine_error)?;
        tab.set_default_timeout(self.timeout);
        Ok(Box::new(ChromePage { tab }))
    }

    fn close(self: Box<Self>) -> Result<(), PdfError> {
        // Dropping the Browser terminates the Chrome process.
        drop(self.browser);
        Ok(())
    }
}

struct ChromePage {
    tab: Arc<Tab>,
}

impl PdfPage for ChromePage {
    fn open(&self, url: &str) -> Result<(), PdfError> {
        self.tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map(|_| ())
            .map_err(engine_error)
    }

    fn wait_ready(&self) -> Result<(), PdfError> {
        self.tab
            .evaluate(READY_SCRIPT, true)
            .map(|_| ())
            .map_err(engine_error)
    }

    fn print(&self, settings: &PrintSettings) -> Result<Vec<u8>, PdfError> {
        let options = PrintToPdfOptions {
            paper_width: Some(settings.paper_width),
            paper_height: Some(settings.paper_height),
            margin_top: Some(settings.margin_top),
            margin_bottom: Some(settings.margin_bottom),
            margin_left: Some(settings.margin_left),
            margin_right: Some(settings.margin_right),
            print_background: Some(settings.print_background),
            generate_tagged_pdf: Some(settings.structured),
            generate_document_outline: Some(settings.structured),
            ..Default::default()
        };
        self.tab.print_to_pdf(Some(options)).map_err(engine_error)
    }

    fn close(self: Box<Self>) -> Result<(), PdfError> {
        self.tab.close(false).map(|_| ()).map_err(engine_error)
    }
}

fn engine_error(e: impl std::fmt::Display) -> PdfError {
    PdfError::Engine(e.to_string())
}
