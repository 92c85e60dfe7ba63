//! Text cleanup shared by the feed and page extractors.
//!
//! [`clean`] runs a fixed sequence of passes. The order matters: boilerplate
//! and ellipsis patterns are written against single-spaced text, so whitespace
//! is collapsed first.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};

pub const EMAIL_PLACEHOLDER: &str = "[email redacted]";

static BOILERPLATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:share (?:this|on|via)(?: (?:article|post|story|page))?(?: on)?(?: (?:facebook|twitter|linkedin|email|whatsapp|reddit|pinterest))?|follow us(?: on (?:facebook|twitter|instagram|linkedin|youtube))?|advertisement|sponsored content|(?:sign up|subscribe) (?:for|to) our newsletter|click here to subscribe)\b[.!:;,]*",
    )
    .unwrap()
});

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

static ELLIPSIS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.{3,}").unwrap());

/// Run every cleaning pass over extracted text
pub fn clean(text: &str) -> String {
    let text = collapse_whitespace(text);
    let text = strip_boilerplate(&text);
    let text = redact_emails(&text);
    let text = normalize_ellipsis(&text);

    // Removals above can leave double spaces behind
    collapse_whitespace(&text)
}

/// Collapse every whitespace run to a single space and trim
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove boilerplate phrases along with the punctuation that closes them
pub fn strip_boilerplate(text: &str) -> String {
    BOILERPLATE_RE.replace_all(text, "").into_owned()
}

pub fn redact_emails(text: &str) -> String {
    EMAIL_RE.replace_all(text, EMAIL_PLACEHOLDER).into_owned()
}

pub fn normalize_ellipsis(text: &str) -> String {
    ELLIPSIS_RE.replace_all(text, "...").into_owned()
}

/// Extract plain text from an HTML fragment, keeping word boundaries between blocks
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_fragment(html);
    element_text(document.root_element())
}

/// Visible text of an element and its descendants, whitespace collapsed
pub fn element_text(element: ElementRef) -> String {
    let mut text = String::new();

    for node in element.descendants() {
        if let Some(text_node) = node.value().as_text() {
            let in_code = node
                .parent()
                .and_then(|p| p.value().as_element().map(|e| e.name()))
                .is_some_and(|name| matches!(name, "script" | "style" | "noscript"));
            if !in_code {
                text.push_str(text_node);
            }
        }
        if let Some(element) = node.value().as_element() {
            match element.name() {
                "p" | "br" | "div" | "li" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
                | "blockquote" | "tr" | "td" | "section" | "article" => text.push(' '),
                _ => {}
            }
        }
    }

    collapse_whitespace(&text)
}

/// Uppercase the first letter of each word, lowercase the rest
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(|c| c.to_lowercase()))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Truncate to at most `max_chars` characters, respecting char boundaries
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
