//! Project configuration module.
//!
//! Handles loading, validating, and merging `cv-forge.toml`. The file is
//! optional: stock defaults describe the conventional project layout, and a
//! user file only needs the keys it wants to change.
//!
//! ## Project Layout
//!
//! ```text
//! project/
//! ├── cv-forge.toml            # Optional overrides
//! ├── .env                     # Optional credential fallback
//! ├── data/
//! │   ├── cv.json              # Profile data (base record + variants)
//! │   └── cover_letter.json    # Only needed for `letter`
//! ├── static/                  # Mirrored into docs/static by `portfolio`
//! │   └── profile.jpg
//! └── docs/                    # Publish tree
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [paths]
//! data = "data/cv.json"
//! cover_letter = "data/cover_letter.json"
//! output_dir = "."
//! publish_dir = "docs"
//! static_dir = "static"
//! photo = "static/profile.jpg"
//!
//! [site]
//! base_url = ""             # Empty disables sitemap.xml / robots.txt
//!
//! [naming]
//! acronyms = ["ai", "ml", "mlops", "llm", "nlp"]
//!
//! [pdf]
//! format = "a4"             # "a4" or "letter"
//!
//! [pdf.margins.cv]          # Millimetres
//! top = 15.0
//! bottom = 10.0
//! left = 0.0
//! right = 0.0
//!
//! [pdf.margins.letter]
//! top = 20.0
//! bottom = 20.0
//! left = 20.0
//! right = 20.0
//!
//! [metadata]
//! generator = "cv-forge"
//! # author = "..."          # Defaults to the identity name in the data
//! keywords = []
//!
//! [credentials]
//! api_key_var = "GEMINI_API_KEY"
//! ```
//!
//! ## Merge Order
//!
//! ```text
//! stock defaults  →  cv-forge.toml  →  validate()
//! ```
//!
//! Merging happens on raw `toml::Value` tables ([`merge_toml`]) before
//! deserializing, so a partial `[pdf.margins.cv]` table keeps the default
//! values of the sides it does not mention.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// File name looked up in the project root.
pub const CONFIG_FILE: &str = "cv-forge.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Project configuration loaded from `cv-forge.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    pub paths: PathsConfig,
    pub site: SiteConfig,
    pub naming: NamingConfig,
    pub pdf: PdfConfig,
    pub metadata: MetadataConfig,
    pub credentials: CredentialsConfig,
}

impl BuildConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (preset, margins) in [
            ("cv", &self.pdf.margins.cv),
            ("letter", &self.pdf.margins.letter),
        ] {
            for (side, value) in margins.sides() {
                if !value.is_finite() || value < 0.0 {
                    return Err(ConfigError::Validation(format!(
                        "pdf.margins.{preset}.{side} must be a non-negative number of millimetres"
                    )));
                }
            }
        }

        let base = self.site.base_url.trim();
        if !base.is_empty() {
            match Url::parse(base) {
                Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
                _ => {
                    return Err(ConfigError::Validation(format!(
                        "site.base_url must be an absolute http:// or https:// URL, got {base:?}"
                    )));
                }
            }
        }

        if let Some(bad) = self.naming.acronyms.iter().find(|a| {
            a.is_empty()
                || !a
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        }) {
            return Err(ConfigError::Validation(format!(
                "naming.acronyms entry {bad:?} must be lowercase ASCII letters or digits"
            )));
        }

        if self.metadata.generator.trim().is_empty() {
            return Err(ConfigError::Validation(
                "metadata.generator must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Where inputs are read from and artifacts are written to, relative to the
/// project root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub data: PathBuf,
    pub cover_letter: PathBuf,
    /// Directory receiving CV and cover letter artifacts.
    pub output_dir: PathBuf,
    /// Static-hosting tree (portfolio pages, published PDFs).
    pub publish_dir: PathBuf,
    pub static_dir: PathBuf,
    /// Optional profile photo. A missing file is reported, not fatal.
    pub photo: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data: PathBuf::from("data/cv.json"),
            cover_letter: PathBuf::from("data/cover_letter.json"),
            output_dir: PathBuf::from("."),
            publish_dir: PathBuf::from("docs"),
            static_dir: PathBuf::from("static"),
            photo: PathBuf::from("static/profile.jpg"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Public URL of the publish tree. Empty disables the site index.
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NamingConfig {
    /// Variant-name segments rendered fully uppercase in filename labels.
    pub acronyms: Vec<String>,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            acronyms: ["ai", "ml", "mlops", "llm", "nlp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Page format for printed documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperFormat {
    #[default]
    A4,
    Letter,
}

impl PaperFormat {
    /// Paper (width, height) in inches.
    pub fn size_inches(self) -> (f64, f64) {
        match self {
            PaperFormat::A4 => (210.0 / 25.4, 297.0 / 25.4),
            PaperFormat::Letter => (8.5, 11.0),
        }
    }
}

/// Page margins in millimetres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Margins {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Margins {
    pub fn uniform(mm: f64) -> Self {
        Self {
            top: mm,
            bottom: mm,
            left: mm,
            right: mm,
        }
    }

    fn sides(&self) -> [(&'static str, f64); 4] {
        [
            ("top", self.top),
            ("bottom", self.bottom),
            ("left", self.left),
            ("right", self.right),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarginsConfig {
    pub cv: Margins,
    pub letter: Margins,
}

impl Default for MarginsConfig {
    fn default() -> Self {
        Self {
            cv: Margins {
                top: 15.0,
                bottom: 10.0,
                left: 0.0,
                right: 0.0,
            },
            letter: Margins::uniform(20.0),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PdfConfig {
    pub format: PaperFormat,
    pub margins: MarginsConfig,
}

/// Values written into the PDF document-information dictionary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetadataConfig {
    pub generator: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub keywords: Vec<String>,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            generator: "cv-forge".to_string(),
            author: None,
            keywords: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CredentialsConfig {
    /// Environment variable (or `.env` key) holding the assistant API key.
    pub api_key_var: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            api_key_var: "GEMINI_API_KEY".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(BuildConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value. `Ok(None)` if it does not exist.
pub fn load_raw_config(file: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !file.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(file)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<BuildConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: BuildConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `cv-forge.toml` from the project root.
pub fn load_config(root: &Path) -> Result<BuildConfig, ConfigError> {
    load_config_file(&root.join(CONFIG_FILE))
}

/// Load an explicit config file, merged over stock defaults.
pub fn load_config_file(file: &Path) -> Result<BuildConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(file)?)
}

/// Resolve the assistant API key.
///
/// The environment variable `var` wins when set and non-empty; otherwise the
/// same key is looked up in `root/.env` without touching the process
/// environment. Returns an empty string when neither has it.
pub fn load_api_key(root: &Path, var: &str) -> String {
    api_key_from(std::env::var(var).ok(), &root.join(".env"), var)
}

fn api_key_from(env_value: Option<String>, dotenv: &Path, var: &str) -> String {
    if let Some(value) = env_value.filter(|v| !v.is_empty()) {
        return value;
    }
    let Ok(entries) = dotenvy::from_path_iter(dotenv) else {
        return String::new();
    };
    entries
        .filter_map(Result::ok)
        .find(|(key, _)| key == var)
        .map(|(_, value)| value)
        .unwrap_or_default()
}

/// Returns a fully-commented stock `cv-forge.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# cv-forge Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Relative paths resolve against the
# project root (--root). Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Paths
# ---------------------------------------------------------------------------
[paths]
# Profile data: a base record plus named variant overrides under "profiles".
data = "data/cv.json"

# Cover letter body. Only required by the `letter` command.
cover_letter = "data/cover_letter.json"

# Where CV and cover letter HTML/PDF files are written.
output_dir = "."

# Static-hosting tree. Portfolio pages, CV PDFs, sitemap.xml and robots.txt
# end up here.
publish_dir = "docs"

# Mirrored into <publish_dir>/static by the `portfolio` command.
static_dir = "static"

# Profile photo shown on the portfolio page. Optional.
photo = "static/profile.jpg"

# ---------------------------------------------------------------------------
# Site
# ---------------------------------------------------------------------------
[site]
# Public URL of the publish tree, e.g. "https://jane.github.io/".
# Leave empty to skip sitemap.xml and robots.txt.
base_url = ""

# ---------------------------------------------------------------------------
# Variant naming
# ---------------------------------------------------------------------------
[naming]
# Segments of a variant name written fully uppercase in filenames:
# "ai-engineer" -> CV_english_AI-Engineer.pdf
acronyms = ["ai", "ml", "mlops", "llm", "nlp"]

# ---------------------------------------------------------------------------
# PDF output
# ---------------------------------------------------------------------------
[pdf]
# Paper format: "a4" or "letter".
format = "a4"

# Margins in millimetres. The CV stylesheet handles its own side padding.
[pdf.margins.cv]
top = 15.0
bottom = 10.0
left = 0.0
right = 0.0

[pdf.margins.letter]
top = 20.0
bottom = 20.0
left = 20.0
right = 20.0

# ---------------------------------------------------------------------------
# PDF document information
# ---------------------------------------------------------------------------
[metadata]
# Written as Creator and Producer.
generator = "cv-forge"

# Defaults to identity.name from the data file.
# author = "Jane Doe"

keywords = []

# ---------------------------------------------------------------------------
# Credentials
# ---------------------------------------------------------------------------
[credentials]
# Environment variable holding the API key embedded in the CV page.
# Falls back to the same key in <root>/.env; empty is allowed.
api_key_var = "GEMINI_API_KEY"
"##
}
