//! Profile data source: loading, variant merging, and the typed record view.
//!
//! ## File format
//!
//! `data/cv.json` holds one personal-profile record plus a `profiles` map of
//! variant name → override fields:
//!
//! ```json
//! {
//!   "identity": { "name": "Ada Lovelace", "title": { "es": "Ingeniera", "en": "Engineer" },
//!                 "email": "ada@example.com", "portfolio_url": "https://ada.dev/" },
//!   "summary": { "es": "…", "en": "…" },
//!   "experience": [ … ],
//!   "profiles": {
//!     "default": {},
//!     "ai-engineer": { "identity": { "title": { "en": "AI Engineer" } } }
//!   }
//! }
//! ```
//!
//! `profiles` must contain `default`. A variant's record is the base record
//! with the override deep-merged on top ([`merge_json`]): objects merge
//! key-by-key, everything else (strings, arrays) is replaced wholesale.
//!
//! ## Localized text
//!
//! Any text field may be a plain string or an object keyed by language tag.
//! [`Localized::get`] picks the active language and falls back to the first
//! available translation, so partially translated data still renders.
//!
//! ## Cover letters
//!
//! `data/cover_letter.json` is optional input. When present it is merged into
//! the variant record under the `letter` key.

use crate::naming::variant_label;
use crate::types::{DEFAULT_VARIANT, Language};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{0}: top level must be a JSON object")]
    NotAnObject(PathBuf),
    #[error("{0}: `profiles` must contain a \"default\" entry")]
    NoDefaultProfile(PathBuf),
    #[error("Cover letter data not found: {0}")]
    MissingLetter(PathBuf),
    #[error("Profile variants {0:?} and {1:?} both produce the filename label {2:?}")]
    LabelCollision(String, String, String),
    #[error("Profile variant {0:?} has no usable filename label")]
    EmptyLabel(String),
}

/// The loaded data source, split into the shared base record and the
/// per-variant overrides.
#[derive(Debug, Clone)]
pub struct CvData {
    pub base: Value,
    pub profiles: BTreeMap<String, Value>,
}

impl CvData {
    /// Parse a data source from an in-memory JSON value.
    pub fn from_value(path: &Path, value: Value) -> Result<Self, DataError> {
        let Value::Object(mut base) = value else {
            return Err(DataError::NotAnObject(path.to_path_buf()));
        };
        let profiles: BTreeMap<String, Value> = match base.remove("profiles") {
            Some(Value::Object(map)) => map.into_iter().collect(),
            _ => BTreeMap::new(),
        };
        if !profiles.contains_key(DEFAULT_VARIANT) {
            return Err(DataError::NoDefaultProfile(path.to_path_buf()));
        }
        Ok(Self {
            base: Value::Object(base),
            profiles,
        })
    }

    /// Variant names in sorted order.
    pub fn variant_names(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }

    /// Base record merged with the variant's overrides.
    ///
    /// Unknown variants yield the base record unchanged; callers resolve the
    /// variant first (see [`crate::resolve`]).
    pub fn record_for(&self, variant: &str) -> Value {
        match self.profiles.get(variant) {
            Some(overlay) => merge_json(self.base.clone(), overlay.clone()),
            None => self.base.clone(),
        }
    }

    /// Display name from `identity.name`, if set.
    pub fn identity_name(&self) -> Option<&str> {
        self.base
            .get("identity")
            .and_then(|i| i.get("name"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

fn read_json(path: &Path) -> Result<Value, DataError> {
    let content = fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| DataError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load `cv.json` and check that variant labels cannot collide.
pub fn load_cv_data(path: &Path, acronyms: &[String]) -> Result<CvData, DataError> {
    let data = CvData::from_value(path, read_json(path)?)?;
    check_label_collisions(&data.variant_names(), acronyms)?;
    Ok(data)
}

/// Load the cover letter record. A missing file is a [`DataError::MissingLetter`].
pub fn load_letter_data(path: &Path) -> Result<Value, DataError> {
    if !path.is_file() {
        return Err(DataError::MissingLetter(path.to_path_buf()));
    }
    read_json(path)
}

/// Attach a cover letter record under the `letter` key.
pub fn with_letter(record: Value, letter: Value) -> Value {
    let mut overlay = serde_json::Map::new();
    overlay.insert("letter".to_string(), letter);
    merge_json(record, Value::Object(overlay))
}

/// Fail if two non-default variants derive the same filename label, or a
/// variant derives an empty one.
pub fn check_label_collisions(variants: &[String], acronyms: &[String]) -> Result<(), DataError> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for name in variants.iter().filter(|v| *v != DEFAULT_VARIANT) {
        let label = variant_label(name, acronyms);
        if label.is_empty() {
            return Err(DataError::EmptyLabel(name.clone()));
        }
        if let Some(other) = seen.insert(label.clone(), name.as_str()) {
            return Err(DataError::LabelCollision(other.to_string(), name.clone(), label));
        }
    }
    Ok(())
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Objects are merged key-by-key (overlay keys override base keys).
/// - Non-object values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_json(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_val) => merge_json(base_val, overlay_val),
                    None => overlay_val,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

// =============================================================================
// Typed record view (what the templates read)
// =============================================================================

/// A text field that is either language-neutral or translated.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Localized {
    Text(String),
    ByLang(BTreeMap<String, String>),
}

impl Default for Localized {
    fn default() -> Self {
        Localized::Text(String::new())
    }
}

impl Localized {
    /// The text for `lang`, falling back to the first translation present.
    pub fn get(&self, lang: Language) -> &str {
        match self {
            Localized::Text(s) => s,
            Localized::ByLang(map) => map
                .get(lang.tag())
                .or_else(|| map.values().next())
                .map(String::as_str)
                .unwrap_or(""),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Localized::Text(s) => s.is_empty(),
            Localized::ByLang(map) => map.values().all(String::is_empty),
        }
    }
}

/// Typed view over a merged record. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Record {
    pub identity: Identity,
    pub summary: Localized,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: Vec<SkillGroup>,
    pub languages: Vec<SpokenLanguage>,
    pub projects: Vec<Project>,
    pub letter: Option<Letter>,
}

impl Record {
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        Record::deserialize(value)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Identity {
    pub name: String,
    pub title: Localized,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<Localized>,
    pub portfolio_url: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Experience {
    pub role: Localized,
    pub company: String,
    pub location: Option<Localized>,
    pub period: Localized,
    pub highlights: Vec<Localized>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Education {
    pub degree: Localized,
    pub institution: String,
    pub period: Localized,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SkillGroup {
    pub name: Localized,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SpokenLanguage {
    pub name: Localized,
    pub level: Localized,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Project {
    pub name: String,
    pub description: Localized,
    pub url: Option<String>,
    pub tags: Vec<String>,
}

/// Cover letter fields. `body` is markdown.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Letter {
    pub recipient: Option<String>,
    pub company: Option<String>,
    pub date: Option<Localized>,
    pub subject: Option<Localized>,
    pub greeting: Option<Localized>,
    pub body: Localized,
    pub closing: Option<Localized>,
}
