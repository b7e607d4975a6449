//! HTML templates for every document kind.
//!
//! Templates are compiled into the binary with [maud](https://maud.lambda.xyz/)
//! and looked up by name through the [`TemplateEngine`] trait. The engine is an
//! ordinary value: the build constructs one [`Templates`] and passes it down
//! explicitly, so tests can substitute their own implementation.
//!
//! | Name | Kind |
//! |---|---|
//! | `cv.html` | CV (printable, A4) |
//! | `cover_letter.html` | Cover letter (printable, A4) |
//! | `portfolio.html` | Public portfolio page |
//!
//! Every template receives the merged data record plus [`RenderParams`]. The
//! record is read through the lenient [`Record`] view, so fields a template
//! does not know about are ignored.

use crate::data::{Localized, Record};
use crate::types::Language;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    UnknownTemplate(String),
    #[error("Data record does not match template {template}: {source}")]
    Record {
        template: String,
        source: serde_json::Error,
    },
}

/// Per-render parameters passed alongside the data record.
#[derive(Debug, Clone, Copy)]
pub struct RenderParams<'a> {
    pub lang: Language,
    /// Opaque credential forwarded to client-side scripts. May be empty.
    pub api_key: &'a str,
    /// Filename hint: the PDF this page is printed to (CV, letter) or
    /// links to (portfolio).
    pub filename: &'a str,
    /// Active profile variant.
    pub profile: &'a str,
    /// Profile photo href relative to the page, if the asset exists.
    pub photo: Option<&'a str>,
    /// Hrefs of the same page in other languages, relative to the page.
    pub alternates: &'a [(Language, String)],
}

/// Renders a named template into an HTML string.
pub trait TemplateEngine {
    fn render(
        &self,
        name: &str,
        record: &Value,
        params: &RenderParams<'_>,
    ) -> Result<String, TemplateError>;
}

const PRINT_CSS: &str = include_str!("../static/print.css");
const SITE_CSS: &str = include_str!("../static/site.css");

/// The built-in template set.
#[derive(Debug, Default, Clone, Copy)]
pub struct Templates;

impl Templates {
    pub fn new() -> Self {
        Templates
    }
}

impl TemplateEngine for Templates {
    fn render(
        &self,
        name: &str,
        record: &Value,
        params: &RenderParams<'_>,
    ) -> Result<String, TemplateError> {
        let render: fn(&Record, &RenderParams<'_>) -> Markup = match name {
            "cv.html" => render_cv,
            "cover_letter.html" => render_cover_letter,
            "portfolio.html" => render_portfolio,
            other => return Err(TemplateError::UnknownTemplate(other.to_string())),
        };
        let record = Record::from_value(record).map_err(|source| TemplateError::Record {
            template: name.to_string(),
            source,
        })?;
        Ok(render(&record, params).into_string())
    }
}

// ============================================================================
// Localized UI strings
// ============================================================================

struct Strings {
    summary: &'static str,
    experience: &'static str,
    education: &'static str,
    skills: &'static str,
    languages: &'static str,
    projects: &'static str,
    download_cv: &'static str,
    generating: &'static str,
    pdf_error: &'static str,
}

fn strings(lang: Language) -> &'static Strings {
    const ES: Strings = Strings {
        summary: "Perfil",
        experience: "Experiencia",
        education: "Formación",
        skills: "Habilidades",
        languages: "Idiomas",
        projects: "Proyectos",
        download_cv: "Descargar CV",
        generating: "Generando…",
        pdf_error: "No se pudo generar el PDF",
    };
    const EN: Strings = Strings {
        summary: "Profile",
        experience: "Experience",
        education: "Education",
        skills: "Skills",
        languages: "Languages",
        projects: "Projects",
        download_cv: "Download CV",
        generating: "Generating…",
        pdf_error: "Could not generate the PDF",
    };
    match lang {
        Language::Es => &ES,
        Language::En => &EN,
    }
}

fn language_name(lang: Language) -> &'static str {
    match lang {
        Language::Es => "Español",
        Language::En => "English",
    }
}

// ============================================================================
// Shared components
// ============================================================================

fn base_document(lang: Language, title: &str, css: &str, head_extra: Markup, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(lang.tag()) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(css)) }
                (head_extra)
            }
            body {
                (body)
            }
        }
    }
}

fn markdown(text: &str) -> Markup {
    let mut out = String::new();
    md_html::push_html(&mut out, Parser::new(text));
    PreEscaped(out)
}

fn contact_list(record: &Record, lang: Language) -> Markup {
    let id = &record.identity;
    html! {
        ul.contact {
            @if let Some(email) = &id.email {
                li { a href={ "mailto:" (email) } { (email) } }
            }
            @if let Some(phone) = &id.phone {
                li { (phone) }
            }
            @if let Some(location) = &id.location {
                li { (location.get(lang)) }
            }
            @if let Some(url) = &id.portfolio_url {
                li { a href=(url) { (url.trim_end_matches('/')) } }
            }
            @if let Some(linkedin) = &id.linkedin {
                li { a href=(linkedin) { "LinkedIn" } }
            }
            @if let Some(github) = &id.github {
                li { a href=(github) { "GitHub" } }
            }
        }
    }
}

fn doc_header(record: &Record, params: &RenderParams<'_>) -> Markup {
    let lang = params.lang;
    html! {
        header.doc-header {
            @if let Some(photo) = params.photo {
                img.photo src=(photo) alt=(record.identity.name);
            }
            div {
                h1 { (record.identity.name) }
                @if !record.identity.title.is_empty() {
                    p.subtitle { (record.identity.title.get(lang)) }
                }
                (contact_list(record, lang))
            }
        }
    }
}

/// Inline `window.CV_CONFIG` object read by the client-side scripts.
fn page_config(params: &RenderParams<'_>) -> Markup {
    let s = strings(params.lang);
    let config = serde_json::json!({
        "apiKey": params.api_key,
        "lang": params.lang.tag(),
        "profile": params.profile,
        "pdfFilename": params.filename,
        "pdfUrl": params.filename,
        "i18n": {
            "generating": s.generating,
            "pdfError": s.pdf_error,
        },
    });
    // `</` would terminate the inline script early
    let json = config.to_string().replace("</", "<\\/");
    html! {
        script { (PreEscaped(format!("window.CV_CONFIG = {json};"))) }
    }
}

fn section_if(title: &str, show: bool, body: Markup) -> Markup {
    html! {
        @if show {
            section {
                h2 { (title) }
                (body)
            }
        }
    }
}

fn localized_list(items: &[Localized], lang: Language) -> Markup {
    html! {
        @if !items.is_empty() {
            ul {
                @for item in items {
                    li { (item.get(lang)) }
                }
            }
        }
    }
}

// ============================================================================
// Page renderers
// ============================================================================

fn render_cv(record: &Record, params: &RenderParams<'_>) -> Markup {
    let lang = params.lang;
    let s = strings(lang);
    let title = format!("CV - {}", record.identity.name);

    let head_extra = html! {
        (page_config(params))
        @if !params.api_key.is_empty() {
            script src="static/ai-suite.js" defer {}
        }
    };

    let body = html! {
        main id="cvContent" {
            (doc_header(record, params))
            (section_if(s.summary, !record.summary.is_empty(), html! {
                (markdown(record.summary.get(lang)))
            }))
            (section_if(s.experience, !record.experience.is_empty(), html! {
                @for job in &record.experience {
                    section.entry {
                        div.entry-head {
                            h3 { (job.role.get(lang)) " · " (job.company) }
                            span.entry-meta { (job.period.get(lang)) }
                        }
                        @if let Some(location) = &job.location {
                            div.entry-meta { (location.get(lang)) }
                        }
                        (localized_list(&job.highlights, lang))
                    }
                }
            }))
            (section_if(s.education, !record.education.is_empty(), html! {
                @for edu in &record.education {
                    section.entry {
                        div.entry-head {
                            h3 { (edu.degree.get(lang)) }
                            span.entry-meta { (edu.period.get(lang)) }
                        }
                        div { (edu.institution) }
                    }
                }
            }))
            (section_if(s.skills, !record.skills.is_empty(), html! {
                dl.skills {
                    @for group in &record.skills {
                        dt { (group.name.get(lang)) }
                        dd { (group.items.join(", ")) }
                    }
                }
            }))
            (section_if(s.languages, !record.languages.is_empty(), html! {
                dl.skills {
                    @for spoken in &record.languages {
                        dt { (spoken.name.get(lang)) }
                        dd { (spoken.level.get(lang)) }
                    }
                }
            }))
        }
    };

    base_document(lang, &title, PRINT_CSS, head_extra, body)
}

fn render_cover_letter(record: &Record, params: &RenderParams<'_>) -> Markup {
    let lang = params.lang;
    let letter = record.letter.clone().unwrap_or_default();
    let title = match &letter.company {
        Some(company) => format!("{} - {}", record.identity.name, company),
        None => record.identity.name.clone(),
    };

    let body = html! {
        main.letter {
            (doc_header(record, params))
            @if letter.recipient.is_some() || letter.company.is_some() {
                div.recipient {
                    @if let Some(recipient) = &letter.recipient {
                        div { (recipient) }
                    }
                    @if let Some(company) = &letter.company {
                        div { (company) }
                    }
                }
            }
            @if let Some(date) = &letter.date {
                div.date { (date.get(lang)) }
            }
            @if let Some(subject) = &letter.subject {
                p { strong { (subject.get(lang)) } }
            }
            @if let Some(greeting) = &letter.greeting {
                p { (greeting.get(lang)) }
            }
            (markdown(letter.body.get(lang)))
            div.signature {
                @if let Some(closing) = &letter.closing {
                    p { (closing.get(lang)) }
                }
                p { strong { (record.identity.name) } }
            }
        }
    };

    base_document(lang, &title, PRINT_CSS, html! {}, body)
}

fn render_portfolio(record: &Record, params: &RenderParams<'_>) -> Markup {
    let lang = params.lang;
    let s = strings(lang);
    let id = &record.identity;
    let title = if id.title.is_empty() {
        id.name.clone()
    } else {
        format!("{} - {}", id.name, id.title.get(lang))
    };

    let head_extra = html! {
        meta name="description" content=(record.summary.get(lang));
        @for (alt_lang, href) in params.alternates {
            link rel="alternate" hreflang=(alt_lang.tag()) href=(href);
        }
    };

    let body = html! {
        @if !params.alternates.is_empty() {
            nav.lang-switch {
                span.current { (language_name(lang)) }
                @for (alt_lang, href) in params.alternates {
                    a href=(href) { (language_name(*alt_lang)) }
                }
            }
        }
        header.hero {
            @if let Some(photo) = params.photo {
                img.photo src=(photo) alt=(id.name);
            }
            div {
                h1 { (id.name) }
                @if !id.title.is_empty() {
                    p.subtitle { (id.title.get(lang)) }
                }
                div.actions {
                    @if !params.filename.is_empty() {
                        a.primary href=(params.filename) download { (s.download_cv) }
                    }
                    @if let Some(email) = &id.email {
                        a href={ "mailto:" (email) } { (email) }
                    }
                    @if let Some(github) = &id.github {
                        a href=(github) { "GitHub" }
                    }
                    @if let Some(linkedin) = &id.linkedin {
                        a href=(linkedin) { "LinkedIn" }
                    }
                }
            }
        }
        main.portfolio {
            (section_if(s.summary, !record.summary.is_empty(), html! {
                (markdown(record.summary.get(lang)))
            }))
            (section_if(s.projects, !record.projects.is_empty(), html! {
                div.projects {
                    @for project in &record.projects {
                        article.project {
                            h3 {
                                @if let Some(url) = &project.url {
                                    a href=(url) { (project.name) }
                                } @else {
                                    (project.name)
                                }
                            }
                            p { (project.description.get(lang)) }
                            @if !project.tags.is_empty() {
                                ul.tags {
                                    @for tag in &project.tags {
                                        li { (tag) }
                                    }
                                }
                            }
                        }
                    }
                }
            }))
        }
        footer { "© " (id.name) }
    };

    base_document(lang, &title, SITE_CSS, head_extra, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> Value {
        json!({
            "identity": {
                "name": "Ada Lovelace",
                "title": { "es": "Ingeniera", "en": "Engineer" },
                "email": "ada@example.com",
                "github": "https://github.com/ada"
            },
            "summary": { "es": "Hola **mundo**", "en": "Hello **world**" },
            "experience": [{
                "role": { "es": "Analista", "en": "Analyst" },
                "company": "Analytical Engines Ltd",
                "period": "1842 - 1843",
                "highlights": [{ "en": "Wrote the first program" }]
            }],
            "projects": [{ "name": "Note G", "description": "Bernoulli numbers", "tags": ["math"] }]
        })
    }

    fn params(lang: Language) -> RenderParams<'static> {
        RenderParams {
            lang,
            api_key: "",
            filename: "CV_english.pdf",
            profile: "default",
            photo: None,
            alternates: &[],
        }
    }

    #[test]
    fn unknown_template_is_error() {
        let err = Templates::new()
            .render("resume.html", &record(), &params(Language::En))
            .unwrap_err();
        assert!(matches!(err, TemplateError::UnknownTemplate(n) if n == "resume.html"));
    }

    #[test]
    fn cv_renders_in_requested_language() {
        let html = Templates::new()
            .render("cv.html", &record(), &params(Language::En))
            .unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<html lang="en">"#));
        assert!(html.contains("Engineer"));
        assert!(html.contains("Experience"));
        assert!(html.contains("<strong>world</strong>"));
        assert!(html.contains("Wrote the first program"));
    }

    #[test]
    fn cv_spanish_headings() {
        let html = Templates::new()
            .render("cv.html", &record(), &params(Language::Es))
            .unwrap();
        assert!(html.contains("Experiencia"));
        assert!(html.contains("Analista"));
    }

    #[test]
    fn cv_embeds_page_config() {
        let mut p = params(Language::En);
        p.api_key = "secret-key";
        let html = Templates::new().render("cv.html", &record(), &p).unwrap();
        assert!(html.contains("window.CV_CONFIG"));
        assert!(html.contains(r#""apiKey":"secret-key""#));
        assert!(html.contains(r#""pdfFilename":"CV_english.pdf""#));
        assert!(html.contains("static/ai-suite.js"));
    }

    #[test]
    fn cv_without_key_skips_ai_script() {
        let html = Templates::new()
            .render("cv.html", &record(), &params(Language::En))
            .unwrap();
        assert!(!html.contains("ai-suite.js"));
    }

    #[test]
    fn page_config_cannot_close_script() {
        let mut p = params(Language::En);
        p.api_key = "</script><script>alert(1)";
        let html = Templates::new().render("cv.html", &record(), &p).unwrap();
        assert!(!html.contains("</script><script>alert"));
    }

    #[test]
    fn cv_escapes_record_text() {
        let value = json!({ "identity": { "name": "<b>Ada</b>" } });
        let html = Templates::new()
            .render("cv.html", &value, &params(Language::En))
            .unwrap();
        assert!(html.contains("&lt;b&gt;Ada&lt;/b&gt;"));
    }

    #[test]
    fn cv_includes_photo_when_present() {
        let mut p = params(Language::En);
        p.photo = Some("static/profile.jpg");
        let html = Templates::new().render("cv.html", &record(), &p).unwrap();
        assert!(html.contains(r#"src="static/profile.jpg""#));
    }

    #[test]
    fn letter_renders_markdown_body() {
        let mut value = record();
        value["letter"] = json!({
            "company": "Babbage & Co",
            "greeting": { "en": "Dear team," },
            "body": { "en": "I am *thrilled*.\n\nSecond paragraph." },
            "closing": "Regards,"
        });
        let html = Templates::new()
            .render("cover_letter.html", &value, &params(Language::En))
            .unwrap();
        assert!(html.contains("Dear team,"));
        assert!(html.contains("<em>thrilled</em>"));
        assert!(html.contains("Babbage &amp; Co"));
        assert!(html.contains("Regards,"));
    }

    #[test]
    fn portfolio_links_cv_and_alternates() {
        let alternates = vec![(Language::En, "en/index.html".to_string())];
        let p = RenderParams {
            lang: Language::Es,
            api_key: "",
            filename: "CV_español.pdf",
            profile: "default",
            photo: None,
            alternates: &alternates,
        };
        let html = Templates::new().render("portfolio.html", &record(), &p).unwrap();
        assert!(html.contains(r#"href="CV_español.pdf""#));
        assert!(html.contains("Descargar CV"));
        assert!(html.contains(r#"hreflang="en""#));
        assert!(html.contains("Note G"));
    }

    #[test]
    fn record_type_mismatch_is_error() {
        let value = json!({ "experience": "not a list" });
        let err = Templates::new()
            .render("cv.html", &value, &params(Language::En))
            .unwrap_err();
        assert!(matches!(err, TemplateError::Record { .. }));
    }
}
