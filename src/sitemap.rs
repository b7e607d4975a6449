//! `sitemap.xml` and `robots.txt` for the publish tree.
//!
//! Both files are derived from the [`ArtifactManifest`] of published pages
//! and the configured base URL. Without a base URL there is no way to write
//! absolute URLs, so nothing is generated.
//!
//! The sitemap is a flat `<urlset>`: one `<url><loc>` per page in manifest
//! order, no priority or change-frequency hints. `robots.txt` allows
//! everything and points at the sitemap.

use crate::render::write_atomic;
use crate::types::ArtifactManifest;
use maud::html;
use std::path::{Path, PathBuf};
use url::Url;

pub const SITEMAP_FILE: &str = "sitemap.xml";
pub const ROBOTS_FILE: &str = "robots.txt";

/// Generated contents of both index files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteIndex {
    pub sitemap: String,
    pub robots: String,
}

/// Paths written by [`write_site_index`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenSiteIndex {
    pub sitemap: PathBuf,
    pub robots: PathBuf,
}

/// Build the site index, or `None` when `base_url` is empty or not an
/// absolute URL.
///
/// Page paths are resolved against the base as a directory, so
/// `https://example.com/cv` and `https://example.com/cv/` give the same
/// locations. Non-ASCII path segments come out percent-encoded.
pub fn generate_site_index(base_url: &str, pages: &[String]) -> Option<SiteIndex> {
    let base = base_dir_url(base_url)?;
    let locs: Vec<Url> = pages
        .iter()
        .filter_map(|page| base.join(page.trim_start_matches('/')).ok())
        .collect();

    let urlset = html! {
        urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9" {
            @for loc in &locs {
                url { loc { (loc.as_str()) } }
            }
        }
    };
    let sitemap = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}\n",
        urlset.into_string()
    );

    let sitemap_url = base.join(SITEMAP_FILE).ok()?;
    let robots = format!("User-agent: *\nAllow: /\n\nSitemap: {sitemap_url}\n");

    Some(SiteIndex { sitemap, robots })
}

/// Generate and write both files into `publish_root`.
///
/// Returns `Ok(None)` without touching the filesystem when `base_url` is
/// empty.
pub fn write_site_index(
    publish_root: &Path,
    base_url: &str,
    manifest: &ArtifactManifest,
) -> std::io::Result<Option<WrittenSiteIndex>> {
    let Some(index) = generate_site_index(base_url, manifest.pages()) else {
        return Ok(None);
    };
    let written = WrittenSiteIndex {
        sitemap: publish_root.join(SITEMAP_FILE),
        robots: publish_root.join(ROBOTS_FILE),
    };
    write_atomic(&written.sitemap, index.sitemap.as_bytes())?;
    write_atomic(&written.robots, index.robots.as_bytes())?;
    Ok(Some(written))
}

/// Parse `base_url` and make sure its path ends in `/`, so joins append
/// instead of replacing the last segment.
fn base_dir_url(base_url: &str) -> Option<Url> {
    let base = base_url.trim();
    if base.is_empty() {
        return None;
    }
    let mut url = Url::parse(base).ok()?;
    if url.cannot_be_a_base() {
        return None;
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Some(url)
}
