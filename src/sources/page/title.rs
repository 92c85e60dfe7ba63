use scraper::Html;
use url::Url;

use super::meta::{first_text, meta_content};
use super::strategy::StrategyChain;
use crate::normalize;

/// Shorter `<title>` text (after the site suffix is gone) is usually just a site name
const MIN_TITLE_TAG_CHARS: usize = 10;

const SITE_SEPARATORS: &[&str] = &[" | ", " - "];

pub fn title_chain(url: &str) -> StrategyChain<'_, String> {
    StrategyChain::new("title")
        .then("title_tag", title_tag)
        .then("og_title", |doc| meta_content(doc, "og:title"))
        .then("h1", |doc| first_text(doc, "h1"))
        .then("url", move |_| title_from_url(url))
}

fn title_tag(document: &Html) -> Option<String> {
    let title = first_text(document, "title")?;
    let title = strip_site_suffix(&title);

    if title.chars().count() > MIN_TITLE_TAG_CHARS {
        Some(title.to_string())
    } else {
        None
    }
}

/// "Post name | Site" and "Post name - Site" become "Post name"
pub fn strip_site_suffix(title: &str) -> &str {
    SITE_SEPARATORS
        .iter()
        .filter_map(|sep| title.rfind(sep))
        .max()
        .map(|idx| title[..idx].trim())
        .filter(|head| !head.is_empty())
        .unwrap_or(title)
}

/// Derive a readable title from the last path segment, or the host for bare domains
pub fn title_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;

    let segment = parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(strip_extension)
        .map(|s| s.replace(['-', '_', '+'], " "))
        .map(|s| normalize::title_case(&s))
        .filter(|s| !s.is_empty());

    segment.or_else(|| {
        parsed
            .host_str()
            .map(|host| host.trim_start_matches("www.").to_string())
    })
}

fn strip_extension(segment: &str) -> &str {
    match segment.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && (1..=5).contains(&ext.len())
                && ext.chars().all(|c| c.is_ascii_alphabetic()) =>
        {
            stem
        }
        _ => segment,
    }
}
