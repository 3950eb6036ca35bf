//! Last-resort strategy: treat the page as plain text and keep only the lines
//! that read like lyrics.

use linkify::LinkFinder;
use regex::Regex;
use scraper::{ElementRef, Html, Node};
use std::sync::LazyLock;

static SECTION_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[^\]\n]+\]").unwrap());

const SKIPPED: &[&str] = &["script", "style", "noscript", "template", "head", "svg"];

const BLOCKS: &[&str] = &[
    "p", "div", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "td", "section",
    "article", "header", "footer", "nav", "aside", "main", "blockquote", "pre", "table", "form",
    "figure", "figcaption", "dd", "dt",
];

/// Rules deciding whether a line of visible text is plausibly a lyric.
#[derive(Debug, Clone)]
pub struct LineFilter {
    min_chars: usize,
    boilerplate: Vec<String>,
}

impl LineFilter {
    pub fn new(min_chars: usize, boilerplate: &[String]) -> Self {
        Self {
            min_chars,
            boilerplate: boilerplate
                .iter()
                .map(|phrase| phrase.trim().to_lowercase())
                .filter(|phrase| !phrase.is_empty())
                .collect(),
        }
    }

    pub fn qualifies(&self, line: &str) -> bool {
        if line.chars().count() <= self.min_chars {
            return false;
        }

        // contact addresses and ads
        if line.contains('@') || looks_like_url(line) {
            return false;
        }

        let lowered = line.to_lowercase();
        if self
            .boilerplate
            .iter()
            .any(|phrase| lowered.contains(phrase.as_str()))
        {
            return false;
        }

        SECTION_TAG.is_match(line) || starts_capitalized(line)
    }
}

fn looks_like_url(line: &str) -> bool {
    if LinkFinder::new().links(line).next().is_some() {
        return true;
    }
    let lowered = line.to_lowercase();
    lowered.contains("www.") || lowered.contains("://")
}

fn starts_capitalized(line: &str) -> bool {
    line.chars().next().is_some_and(char::is_uppercase)
}

/// Qualifying lines as an HTML fragment, or `None` when fewer than
/// `min_lines` survive.
pub fn plain_text_fallback(document: &Html, filter: &LineFilter, min_lines: usize) -> Option<String> {
    let text = visible_text(document);

    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| filter.qualifies(line))
        .collect();

    if lines.is_empty() || lines.len() < min_lines {
        return None;
    }

    Some(
        lines
            .iter()
            .map(|line| html_escape::encode_text(line))
            .collect::<Vec<_>>()
            .join("<br>"),
    )
}

/// Text a reader would see: no scripts or styles, with a line break at every
/// block boundary and `<br>`.
pub fn visible_text(document: &Html) -> String {
    let mut out = String::new();
    collect_visible(document.root_element(), &mut out);
    out
}

fn collect_visible(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED.contains(&name) {
                    continue;
                }
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                let Some(child_ref) = ElementRef::wrap(child) else {
                    continue;
                };
                let block = BLOCKS.contains(&name);
                if block {
                    out.push('\n');
                }
                collect_visible(child_ref, out);
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}
