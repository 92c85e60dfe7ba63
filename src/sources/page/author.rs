use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use serde_json::Value;

use super::meta::{css, find_key, json_ld_blocks, meta_content};
use super::strategy::StrategyChain;
use crate::normalize;

const MAX_BYLINE_CHARS: usize = 100;

static BYLINE_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:by\s+|author:\s*)").unwrap());

pub fn author_chain(byline_selectors: &[String]) -> StrategyChain<'_, String> {
    StrategyChain::new("author")
        .then("meta_author", |doc| meta_content(doc, "author"))
        .then("json_ld", json_ld_author)
        .then("byline", move |doc| byline(doc, byline_selectors))
}

fn json_ld_author(document: &Html) -> Option<String> {
    json_ld_blocks(document)
        .iter()
        .filter_map(|block| find_key(block, "author"))
        .find_map(author_name)
}

/// `author` may be a Person object, a plain string, or a list of either
fn author_name(value: &Value) -> Option<String> {
    let name = match value {
        Value::String(name) => Some(name.as_str()),
        Value::Object(person) => person.get("name").and_then(Value::as_str),
        Value::Array(authors) => return authors.first().and_then(author_name),
        _ => None,
    }?;

    let name = normalize::collapse_whitespace(name);
    (!name.is_empty()).then_some(name)
}

fn byline(document: &Html, selectors: &[String]) -> Option<String> {
    selectors
        .iter()
        .filter_map(|selector| css(selector))
        .find_map(|selector| {
            document
                .select(&selector)
                .map(normalize::element_text)
                .map(|text| strip_byline_prefix(&text))
                .find(|text| {
                    let len = text.chars().count();
                    len > 0 && len < MAX_BYLINE_CHARS
                })
        })
}

pub fn strip_byline_prefix(text: &str) -> String {
    BYLINE_PREFIX_RE.replace(text.trim(), "").trim().to_string()
}
