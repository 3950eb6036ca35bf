use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

use crate::extractor::errors::ExtractorError;

static BLOCK_ELEMENTS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div, section, article, pre").unwrap());

pub(crate) fn parse_selectors(selectors: &[String]) -> Result<Vec<Selector>, ExtractorError> {
    selectors
        .iter()
        .map(|raw| {
            Selector::parse(raw).map_err(|e| ExtractorError::InvalidSelector {
                selector: raw.clone(),
                reason: format!("{e:?}"),
            })
        })
        .collect()
}

/// Known lyrics containers. The first selector with a non-empty match wins;
/// with `merge` every non-empty match of that selector is joined.
pub fn structured_container(document: &Html, selectors: &[Selector], merge: bool) -> Option<String> {
    for selector in selectors {
        let mut matches = document.select(selector).filter(has_visible_text);

        let Some(first) = matches.next() else {
            continue;
        };

        if !merge {
            return Some(first.inner_html());
        }

        let parts: Vec<String> = std::iter::once(first)
            .chain(matches)
            .map(|element| element.inner_html())
            .collect();
        return Some(parts.join("<br>"));
    }

    None
}

/// Any generic block whose class attribute mentions one of `patterns`.
/// Patterns must be lowercase.
pub fn heuristic_class_name(document: &Html, patterns: &[String]) -> Option<String> {
    if patterns.is_empty() {
        return None;
    }

    document
        .select(&BLOCK_ELEMENTS)
        .filter(|element| {
            element.value().attr("class").is_some_and(|class| {
                let class = class.to_lowercase();
                patterns.iter().any(|pattern| class.contains(pattern.as_str()))
            })
        })
        .find(has_visible_text)
        .map(|element| element.inner_html())
}

fn has_visible_text(element: &ElementRef<'_>) -> bool {
    element.text().any(|text| !text.trim().is_empty())
}
