//! # cv-forge
//!
//! A deterministic builder for a personal CV, cover letter and portfolio
//! site. One JSON data file holds a base record plus named profile variants;
//! one invocation turns it into a matrix of HTML and PDF artifacts across
//! languages, prints PDFs through a single headless-browser session, stamps
//! their metadata, and mirrors the public pieces into a static-hosting tree.
//!
//! # Architecture: One Pass, Top to Bottom
//!
//! ```text
//! data/cv.json
//!   → resolve     (kind, variant) → per-language HTML/PDF paths      pure
//!   → render      HTML on disk + PDF job list                        templates
//!   → pdf         one browser session, one page per job              headless Chrome
//!   → metadata    Info dictionary per PDF (best effort)              lopdf
//!   → publish     PDFs / portfolio / static into docs/
//!   → sitemap     sitemap.xml + robots.txt from published pages
//! ```
//!
//! Nothing is cached between runs. Every artifact is regenerated from the
//! data file on each invocation, and a PDF job only exists for HTML written
//! in the same invocation.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | Languages, document kinds, output paths, jobs, manifest |
//! | [`naming`] | Variant name → filename label (`ai-engineer` → `AI-Engineer`) |
//! | [`resolve`] | Pure output-path resolution with soft fallback for unknown variants |
//! | [`data`] | Loading `cv.json` / `cover_letter.json`, variant merging, typed record view |
//! | [`templates`] | Maud templates behind the [`templates::TemplateEngine`] trait |
//! | [`render`] | Render one combination, write it atomically, queue its PDF job |
//! | [`pdf`] | Batch HTML → PDF over one scoped browser session |
//! | [`metadata`] | PDF Info-dictionary injection (optional `pdf-metadata` feature) |
//! | [`publish`] | Copying into the publish tree, `.nojekyll`, relative links |
//! | [`sitemap`] | `sitemap.xml` / `robots.txt` generation |
//! | [`pipeline`] | [`pipeline::Builder`]: per-target orchestration and progress events |
//! | [`config`] | `cv-forge.toml` loading, merging, validation, credentials |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Explicit Collaborators
//!
//! The template engine, the PDF engine and the metadata editor are traits
//! passed into [`pipeline::Builder`]. There are no globals. Tests drive the
//! whole pipeline with recording fakes and never need a browser.
//!
//! ## One Browser Session Per Batch
//!
//! Starting Chrome costs more than printing a two-page CV. All PDF jobs of a
//! run go through a single session; each job gets its own page, and both
//! scopes are closed on every exit path (see [`pdf`]).
//!
//! ## Soft Failure Where It Is Safe
//!
//! An unknown profile falls back to `default` with a warning. A missing photo
//! is a note. Metadata injection never fails a build. Everything else (missing
//! letter data, template errors, no browser) stops the run with a hint.

pub mod config;
pub mod data;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod pdf;
pub mod pipeline;
pub mod publish;
pub mod render;
pub mod resolve;
pub mod sitemap;
pub mod templates;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
