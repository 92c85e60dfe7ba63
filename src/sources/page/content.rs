use scraper::{ElementRef, Html, Selector};

use super::meta::css;
use super::strategy::StrategyChain;
use crate::normalize;

/// A semantic container must hold more than this to count as the article
const SEMANTIC_MIN_CHARS: usize = 200;

const BLOCK_SELECTOR: &str = "p, div, section, article, td, blockquote, li";
const BLOCK_MIN_CHARS: usize = 50;
const MAX_BLOCKS: usize = 10;
const MAX_BLOCK_TEXT_CHARS: usize = 10_000;

/// Content chain over a noise-stripped document.
///
/// The caller-supplied selector is only tried when one was given.
pub fn content_chain<'a>(
    selector: Option<&'a Selector>,
    content_selectors: &'a [String],
) -> StrategyChain<'a, String> {
    let mut chain = StrategyChain::new("content");

    if let Some(selector) = selector {
        chain = chain.then("selector", move |doc| selected_text(doc, selector));
    }

    chain
        .then("semantic", move |doc| semantic(doc, content_selectors))
        .then("text_blocks", text_blocks)
}

/// Remove every element matching the noise selectors
pub fn strip_noise(document: &mut Html, noise_selectors: &[String]) {
    for selector in noise_selectors.iter().filter_map(|s| css(s)) {
        let ids: Vec<_> = document
            .root_element()
            .select(&selector)
            .map(|element| element.id())
            .collect();

        for id in ids {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }
    }
}

// Detached nodes stay in the arena and `Html::select` would still see them,
// so everything below walks from the root element.

fn selected_text(document: &Html, selector: &Selector) -> Option<String> {
    let text = document
        .root_element()
        .select(selector)
        .map(normalize::element_text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    (!text.is_empty()).then_some(text)
}

fn semantic(document: &Html, content_selectors: &[String]) -> Option<String> {
    content_selectors
        .iter()
        .filter_map(|s| css(s))
        .find_map(|selector| {
            document
                .root_element()
                .select(&selector)
                .map(normalize::element_text)
                .max_by_key(|text| text.chars().count())
                .filter(|text| text.chars().count() > SEMANTIC_MIN_CHARS)
        })
}

fn text_blocks(document: &Html) -> Option<String> {
    let selector = css(BLOCK_SELECTOR)?;

    let mut candidates: Vec<(usize, ElementRef, String)> = document
        .root_element()
        .select(&selector)
        .map(|element| (element, normalize::element_text(element)))
        .filter(|(_, text)| text.chars().count() > BLOCK_MIN_CHARS)
        .enumerate()
        .map(|(position, (element, text))| (position, element, text))
        .collect();

    // Longest first; the sort is stable so containers precede equal-length children
    candidates.sort_by_key(|(_, _, text)| std::cmp::Reverse(text.chars().count()));

    let mut chosen: Vec<(usize, ElementRef, String)> = Vec::new();
    for candidate in candidates {
        if chosen.len() == MAX_BLOCKS {
            break;
        }
        let nested = candidate
            .1
            .ancestors()
            .any(|ancestor| chosen.iter().any(|(_, block, _)| block.id() == ancestor.id()));
        if !nested {
            chosen.push(candidate);
        }
    }

    if chosen.is_empty() {
        return None;
    }

    // Back to reading order
    chosen.sort_by_key(|(position, _, _)| *position);

    let joined = chosen
        .into_iter()
        .map(|(_, _, text)| text)
        .collect::<Vec<_>>()
        .join(" ");

    Some(normalize::truncate_chars(&joined, MAX_BLOCK_TEXT_CHARS).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorConfig;

    fn paragraph(words: usize, word: &str) -> String {
        format!("<p>{}</p>", vec![word; words].join(" "))
    }

    fn resolve(html: &str, selector: Option<&str>) -> Option<(String, &'static str)> {
        let config = ExtractorConfig::default();
        let mut doc = Html::parse_document(html);
        strip_noise(&mut doc, &config.noise_selectors);

        let selector = selector.map(|s| Selector::parse(s).unwrap());
        let resolved = content_chain(selector.as_ref(), &config.content_selectors)
            .resolve(&doc)
            .map(|r| (r.value, r.strategy));
        resolved
    }

    #[test]
    fn test_user_selector_joins_all_matches() {
        let html = r#"<body><div class="txt">First part</div><div class="txt">Second part</div></body>"#;
        assert_eq!(
            resolve(html, Some(".txt")),
            Some(("First part Second part".to_string(), "selector"))
        );
    }

    #[test]
    fn test_user_selector_without_matches_falls_through() {
        let html = format!("<body><article>{}</article></body>", paragraph(60, "body"));
        let (_, strategy) = resolve(&html, Some(".missing")).unwrap();
        assert_eq!(strategy, "semantic");
    }

    #[test]
    fn test_semantic_picks_largest_match() {
        let html = format!(
            "<body><article>{}</article><article>{}</article></body>",
            paragraph(10, "short"),
            paragraph(60, "long"),
        );
        let (content, strategy) = resolve(&html, None).unwrap();
        assert_eq!(strategy, "semantic");
        assert!(content.starts_with("long long"));
    }

    #[test]
    fn test_semantic_requires_substantial_text() {
        let html = format!("<body><article>{}</article></body>", paragraph(12, "tiny"));
        let (_, strategy) = resolve(&html, None).unwrap();
        assert_eq!(strategy, "text_blocks");
    }

    #[test]
    fn test_noise_is_stripped_before_extraction() {
        let html = format!(
            "<body><nav>{}</nav><div class='sidebar'>{}</div><p>{}</p></body>",
            paragraph(30, "menu"),
            paragraph(30, "aside"),
            vec!["story"; 15].join(" "),
        );
        let (content, _) = resolve(&html, None).unwrap();
        assert!(!content.contains("menu"));
        assert!(!content.contains("aside"));
        assert!(content.contains("story"));
    }

    #[test]
    fn test_text_blocks_skip_nested_and_keep_reading_order() {
        let first = vec!["alpha"; 20].join(" ");
        let second = vec!["beta"; 30].join(" ");
        let html = format!("<body><section><p>{first}</p></section><p>{second}</p></body>");

        let (content, strategy) = resolve(&html, None).unwrap();
        assert_eq!(strategy, "text_blocks");
        assert_eq!(content, format!("{first} {second}"));
    }

    #[test]
    fn test_text_blocks_are_capped() {
        let blocks: String = (0..20)
            .map(|i| format!("<p>{} {}</p>", i, vec!["word"; 200].join(" ")))
            .collect();
        let html = format!("<body>{blocks}</body>");

        let (content, _) = resolve(&html, None).unwrap();
        assert_eq!(content.chars().count(), MAX_BLOCK_TEXT_CHARS);
    }

    #[test]
    fn test_nothing_usable() {
        assert_eq!(resolve("<body><p>Too short.</p></body>", None), None);
    }
}
