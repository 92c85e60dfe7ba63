//! Lookups shared by the metadata strategies: `<meta>` tags and JSON-LD.

use scraper::{Html, Selector};
use serde_json::Value;

/// Parse a built-in selector, dropping ones the engine rejects
pub(crate) fn css(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::debug!(selector, error = %e, "skipping unparseable selector");
            None
        }
    }
}

/// Content of the first `<meta>` whose `property` or `name` equals `key`
pub fn meta_content(document: &Html, key: &str) -> Option<String> {
    let selector = css("meta[content]")?;

    document
        .select(&selector)
        .filter(|element| {
            let attrs = element.value();
            [attrs.attr("property"), attrs.attr("name")]
                .into_iter()
                .flatten()
                .any(|k| k.trim().eq_ignore_ascii_case(key))
        })
        .filter_map(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string())
        .find(|content| !content.is_empty())
}

/// Every parseable JSON-LD block in the document
pub fn json_ld_blocks(document: &Html) -> Vec<Value> {
    let Some(selector) = css(r#"script[type="application/ld+json"]"#) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|script| {
            let raw = script.text().collect::<String>();
            match serde_json::from_str::<Value>(raw.trim()) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::debug!(error = %e, "ignoring malformed JSON-LD block");
                    None
                }
            }
        })
        .collect()
}

/// Depth-first search for `key` through nested objects and arrays (`@graph` included)
pub fn find_key<'v>(value: &'v Value, key: &str) -> Option<&'v Value> {
    match value {
        Value::Object(map) => map
            .get(key)
            .or_else(|| map.values().find_map(|v| find_key(v, key))),
        Value::Array(items) => items.iter().find_map(|v| find_key(v, key)),
        _ => None,
    }
}

/// First non-empty text of an element matching `selector`
pub(crate) fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = css(selector)?;
    document
        .select(&selector)
        .map(crate::normalize::element_text)
        .find(|text| !text.is_empty())
}
