//! Shared test utilities for the cv-forge test suite.
//!
//! Provides the fixture project, a parsed sample data source, and recording
//! stand-ins for every injected collaborator (template engine, PDF engine,
//! metadata editor).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_project();
//! let engine = RecordingEngine::new();
//! // ... build against tmp.path() with &engine ...
//! assert_eq!(engine.launches(), 1);
//! assert_eq!(engine.ops().last(), Some(&EngineOp::CloseSession));
//! ```

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::TempDir;

use crate::data::CvData;
use crate::metadata::{MetadataEditor, MetadataError, PdfMetadata};
use crate::pdf::{PdfEngine, PdfError, PdfPage, PdfSession, PrintSettings};
use crate::publish::mirror_dir;
use crate::templates::{RenderParams, TemplateEngine, TemplateError};

// =========================================================================
// Fixture setup
// =========================================================================

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/project")
}

/// Copy `fixtures/project/` into a fresh temp directory.
pub fn setup_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_project(tmp.path());
    tmp
}

/// Copy `fixtures/project/` into `root`.
pub fn write_project(root: &Path) {
    mirror_dir(&fixtures_dir(), root).unwrap();
}

/// The fixture `cv.json`, parsed. Variants: `default`, `ai-engineer`, `mlops`.
pub fn sample_data() -> CvData {
    let path = fixtures_dir().join("data/cv.json");
    let value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    CvData::from_value(&path, value).unwrap()
}

// =========================================================================
// Template engine
// =========================================================================

/// Template engine that knows no templates.
pub struct FailingTemplates;

impl TemplateEngine for FailingTemplates {
    fn render(
        &self,
        name: &str,
        _record: &serde_json::Value,
        _params: &RenderParams<'_>,
    ) -> Result<String, TemplateError> {
        Err(TemplateError::UnknownTemplate(name.to_string()))
    }
}

// =========================================================================
// PDF engine
// =========================================================================

/// One call made against the recording engine, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineOp {
    NewPage,
    Open(String),
    WaitReady,
    Print(PrintSettings),
    ClosePage,
    CloseSession,
}

#[derive(Default)]
struct EngineState {
    launches: usize,
    prints: usize,
    ops: Vec<EngineOp>,
}

/// PDF engine that records every call and prints a tiny fake PDF.
#[derive(Clone, Default)]
pub struct RecordingEngine {
    state: Rc<RefCell<EngineState>>,
    unavailable: bool,
    fail_print_on: Option<usize>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Launch fails as if no browser were installed.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// The `n`th print (0-based) fails.
    pub fn failing_print_on(n: usize) -> Self {
        Self {
            fail_print_on: Some(n),
            ..Self::default()
        }
    }

    pub fn launches(&self) -> usize {
        self.state.borrow().launches
    }

    pub fn ops(&self) -> Vec<EngineOp> {
        self.state.borrow().ops.clone()
    }
}

impl PdfEngine for RecordingEngine {
    fn launch(&self) -> Result<Box<dyn PdfSession>, PdfError> {
        if self.unavailable {
            return Err(PdfError::EngineUnavailable("no browser found".into()));
        }
        self.state.borrow_mut().launches += 1;
        Ok(Box::new(self.clone()))
    }
}

impl PdfSession for RecordingEngine {
    fn new_page(&self) -> Result<Box<dyn PdfPage>, PdfError> {
        self.state.borrow_mut().ops.push(EngineOp::NewPage);
        Ok(Box::new(self.clone()))
    }

    fn close(self: Box<Self>) -> Result<(), PdfError> {
        self.state.borrow_mut().ops.push(EngineOp::CloseSession);
        Ok(())
    }
}

impl PdfPage for RecordingEngine {
    fn open(&self, url: &str) -> Result<(), PdfError> {
        self.state
            .borrow_mut()
            .ops
            .push(EngineOp::Open(url.to_string()));
        Ok(())
    }

    fn wait_ready(&self) -> Result<(), PdfError> {
        self.state.borrow_mut().ops.push(EngineOp::WaitReady);
        Ok(())
    }

    fn print(&self, settings: &PrintSettings) -> Result<Vec<u8>, PdfError> {
        let mut state = self.state.borrow_mut();
        state.ops.push(EngineOp::Print(*settings));
        let index = state.prints;
        state.prints += 1;
        if self.fail_print_on == Some(index) {
            return Err(PdfError::Engine("page crashed".into()));
        }
        Ok(b"%PDF-1.4\n% fake\n%%EOF\n".to_vec())
    }

    fn close(self: Box<Self>) -> Result<(), PdfError> {
        self.state.borrow_mut().ops.push(EngineOp::ClosePage);
        Ok(())
    }
}

// =========================================================================
// Metadata editor
// =========================================================================

/// Metadata editor that records calls and never touches the file.
#[derive(Default)]
pub struct RecordingEditor {
    calls: RefCell<Vec<(PathBuf, PdfMetadata)>>,
    fail: bool,
}

impl RecordingEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(PathBuf, PdfMetadata)> {
        self.calls.borrow().clone()
    }
}

impl MetadataEditor for RecordingEditor {
    fn apply(&self, pdf: &Path, meta: &PdfMetadata) -> Result<(), MetadataError> {
        self.calls
            .borrow_mut()
            .push((pdf.to_path_buf(), meta.clone()));
        if self.fail {
            return Err(MetadataError::Pdf("corrupt".into()));
        }
        Ok(())
    }
}
