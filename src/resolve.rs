//! Axis resolution: which (language, path) pairs a build produces.
//!
//! Given a document kind and a requested profile variant, [`resolve_outputs`]
//! computes the output paths for every language the kind defines. It is a
//! pure function with no I/O, so the naming rules can be tested in isolation.
//!
//! ## Naming rules
//!
//! | Variant | HTML | PDF |
//! |---|---|---|
//! | `default` | `CV_english.html` | `CV_english.pdf` |
//! | `ai-engineer` | `CV_english_AI-Engineer.html` | `CV_english_AI-Engineer.pdf` |
//!
//! Canonical names are distinct per (kind, language) and every non-default
//! variant inserts its label into both paths, so two triples can only share a
//! path if two variants share a label. Label uniqueness
//! across the variant set is checked when the data source is loaded
//! ([`crate::data::check_label_collisions`]).
//!
//! ## Unknown variants
//!
//! An unknown variant never aborts the build. The resolver substitutes
//! `default` and records the miss in [`Resolution::fallback`] so the caller can
//! warn with the list of known variants.

use crate::naming::{suffixed_path, variant_label};
use crate::types::{DEFAULT_VARIANT, DocumentKind, Language, OutputPaths};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A requested variant that was not found in the data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub requested: String,
    pub known: Vec<String>,
}

/// Output plan for one document kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub kind: DocumentKind,
    /// The variant actually built (after any fallback).
    pub variant: String,
    /// Filename label; `None` for the default variant.
    pub label: Option<String>,
    pub fallback: Option<UnknownVariant>,
    pub outputs: BTreeMap<Language, OutputPaths>,
}

impl Resolution {
    /// Output paths restricted to one language, or all of them.
    pub fn select(&self, lang: Option<Language>) -> Vec<(Language, &OutputPaths)> {
        self.outputs
            .iter()
            .filter(|(l, _)| lang.is_none_or(|wanted| **l == wanted))
            .map(|(l, p)| (*l, p))
            .collect()
    }
}

/// Resolve output paths for `kind` built with the `requested` variant.
///
/// `known` is the set of variant names present in the data source.
/// `default` is always accepted, even when `known` does not list it.
pub fn resolve_outputs(
    kind: DocumentKind,
    requested: &str,
    known: &[String],
    acronyms: &[String],
) -> Resolution {
    let is_known = requested == DEFAULT_VARIANT || known.iter().any(|k| k == requested);

    let (variant, fallback) = if is_known {
        (requested.to_string(), None)
    } else {
        let mut known = known.to_vec();
        known.sort();
        (
            DEFAULT_VARIANT.to_string(),
            Some(UnknownVariant {
                requested: requested.to_string(),
                known,
            }),
        )
    };

    let label = (variant != DEFAULT_VARIANT).then(|| variant_label(&variant, acronyms));

    let outputs = kind
        .outputs()
        .iter()
        .map(|(lang, html, pdf)| {
            let apply = |name: &str| -> PathBuf {
                match &label {
                    Some(label) => suffixed_path(Path::new(name), label),
                    None => PathBuf::from(name),
                }
            };
            (
                *lang,
                OutputPaths {
                    html: apply(html),
                    pdf: pdf.map(|p| apply(p)),
                },
            )
        })
        .collect();

    Resolution {
        kind,
        variant,
        label,
        fallback,
        outputs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn known() -> Vec<String> {
        ["default", "ai-engineer", "mlops", "data-science"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn acronyms() -> Vec<String> {
        ["ai", "ml", "mlops"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn default_variant_uses_canonical_names() {
        let r = resolve_outputs(DocumentKind::Cv, "default", &known(), &acronyms());
        assert_eq!(r.variant, "default");
        assert_eq!(r.label, None);
        assert!(r.fallback.is_none());
        let en = &r.outputs[&Language::En];
        assert_eq!(en.html, PathBuf::from("CV_english.html"));
        assert_eq!(en.pdf, Some(PathBuf::from("CV_english.pdf")));
        let es = &r.outputs[&Language::Es];
        assert_eq!(es.html, PathBuf::from("CV_español.html"));
    }

    #[test]
    fn named_variant_suffixes_both_paths() {
        let r = resolve_outputs(DocumentKind::Cv, "ai-engineer", &known(), &acronyms());
        assert_eq!(r.label.as_deref(), Some("AI-Engineer"));
        let en = &r.outputs[&Language::En];
        assert_eq!(en.html, PathBuf::from("CV_english_AI-Engineer.html"));
        assert_eq!(en.pdf, Some(PathBuf::from("CV_english_AI-Engineer.pdf")));
    }

    #[test]
    fn unknown_variant_falls_back_to_default() {
        let r = resolve_outputs(DocumentKind::Cv, "astronaut", &known(), &acronyms());
        assert_eq!(r.variant, "default");
        assert_eq!(r.label, None);
        let fb = r.fallback.expect("fallback recorded");
        assert_eq!(fb.requested, "astronaut");
        assert_eq!(fb.known, vec!["ai-engineer", "data-science", "default", "mlops"]);
        // Still a complete artifact set
        assert_eq!(r.outputs.len(), Language::ALL.len());
    }

    #[test]
    fn default_accepted_without_being_listed() {
        let r = resolve_outputs(DocumentKind::Cv, "default", &[], &acronyms());
        assert!(r.fallback.is_none());
    }

    #[test]
    fn one_path_pair_per_defined_language() {
        for kind in DocumentKind::ALL {
            let r = resolve_outputs(kind, "default", &known(), &acronyms());
            assert_eq!(r.outputs.len(), kind.outputs().len(), "{kind}");
        }
    }

    #[test]
    fn no_two_triples_share_a_path() {
        let mut html = HashSet::new();
        let mut pdf = HashSet::new();
        for kind in DocumentKind::ALL {
            for variant in known() {
                let r = resolve_outputs(kind, &variant, &known(), &acronyms());
                for paths in r.outputs.values() {
                    assert!(html.insert(paths.html.clone()), "dup {:?}", paths.html);
                    if let Some(p) = &paths.pdf {
                        assert!(pdf.insert(p.clone()), "dup {:?}", p);
                    }
                }
            }
        }
    }

    #[test]
    fn portfolio_variant_keeps_language_directory() {
        let r = resolve_outputs(DocumentKind::Portfolio, "mlops", &known(), &acronyms());
        assert_eq!(
            r.outputs[&Language::En].html,
            PathBuf::from("en/index_MLOPS.html")
        );
        assert_eq!(r.outputs[&Language::En].pdf, None);
    }

    #[test]
    fn select_restricts_to_one_language() {
        let r = resolve_outputs(DocumentKind::CoverLetter, "default", &known(), &acronyms());
        let only_en = r.select(Some(Language::En));
        assert_eq!(only_en.len(), 1);
        assert_eq!(only_en[0].0, Language::En);
        assert_eq!(r.select(None).len(), 2);
    }
}
