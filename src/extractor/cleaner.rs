//! Turns a lyrics HTML fragment into plain text with stable line and
//! paragraph structure.

use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;

use crate::extractor::{errors::ExtractorError, reader::parse_selectors};

static INLINE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\S\n]+").unwrap());
static SPACE_AROUND_NEWLINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" *\n *").unwrap());
static EXCESS_NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());
static SECTION_LABEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[^\]\n]+\]").unwrap());
static LITERAL_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[A-Za-z][A-Za-z0-9-]*(?:\s[^<>]*)?/?>").unwrap());

/// Subtrees whose content must never reach the output.
const REMOVED: &[&str] = &["script", "style", "noscript", "template"];

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    strip: Vec<Selector>,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also drop every subtree matching one of `selectors` (share widgets,
    /// related-post blocks and other per-source clutter).
    pub fn with_strip_selectors(selectors: &[String]) -> Result<Self, ExtractorError> {
        Ok(Self {
            strip: parse_selectors(selectors)?,
        })
    }

    /// Never fails; empty or markup-only input yields an empty string.
    ///
    /// Escaped markup in the page text (`&lt;b&gt;`, `&amp;amp;`) is decoded
    /// and stripped as well, so the output holds no tags or entities and
    /// normalizing it again returns it unchanged.
    pub fn normalize(&self, fragment: &str) -> String {
        if fragment.trim().is_empty() {
            return String::new();
        }

        let document = Html::parse_fragment(fragment);
        let stripped: Vec<ElementRef<'_>> = self
            .strip
            .iter()
            .flat_map(|selector| document.select(selector))
            .collect();

        let mut raw = String::with_capacity(fragment.len());
        render_children(document.root_element(), &stripped, &mut raw);
        tidy_text(&raw)
    }
}

/// Normalizes with the default removal rules.
pub fn normalize(fragment: &str) -> String {
    Normalizer::default().normalize(fragment)
}

fn is_removed<'a>(element: ElementRef<'a>, stripped: &[ElementRef<'a>]) -> bool {
    REMOVED.contains(&element.value().name()) || stripped.contains(&element)
}

fn render_children<'a>(element: ElementRef<'a>, stripped: &[ElementRef<'a>], out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                let Some(child_ref) = ElementRef::wrap(child) else {
                    continue;
                };
                if is_removed(child_ref, stripped) {
                    continue;
                }
                render_element(child_ref, stripped, out);
            }
            _ => {}
        }
    }
}

fn render_element<'a>(element: ElementRef<'a>, stripped: &[ElementRef<'a>], out: &mut String) {
    match element.value().name() {
        // annotation links keep their label
        "a" => plain_text(element, stripped, out),
        "br" => out.push('\n'),
        "p" => {
            render_children(element, stripped, out);
            out.push_str("\n\n");
        }
        "div" => {
            let mut inner = String::new();
            render_children(element, stripped, &mut inner);
            let inner = inner.trim();
            if !inner.is_empty() {
                out.push_str(inner);
                out.push('\n');
            }
        }
        _ => render_children(element, stripped, out),
    }
}

fn plain_text<'a>(element: ElementRef<'a>, stripped: &[ElementRef<'a>], out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child_ref) = ElementRef::wrap(child)
                    && !is_removed(child_ref, stripped)
                {
                    plain_text(child_ref, stripped, out);
                }
            }
            _ => {}
        }
    }
}

fn tidy_text(raw: &str) -> String {
    let text = strip_escaped_markup(raw);
    let text = INLINE_WHITESPACE.replace_all(&text, " ");
    let text = SPACE_AROUND_NEWLINE.replace_all(&text, "\n");
    let text = EXCESS_NEWLINES.replace_all(&text, "\n\n");
    let text = isolate_section_labels(&text);
    let text = EXCESS_NEWLINES.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Decodes leftover entities and drops tag-shaped text until neither
/// changes anything. Each pass that changes the text shortens it.
fn strip_escaped_markup(text: &str) -> String {
    let mut text = text.to_string();
    loop {
        let decoded = html_escape::decode_html_entities(&text);
        let cleaned = LITERAL_TAG.replace_all(&decoded, "");
        if cleaned == text.as_str() {
            return text;
        }
        text = cleaned.into_owned();
    }
}

/// Puts every `[...]` label on its own line. Labels that already are on
/// their own line are left alone, so this is idempotent.
pub fn isolate_section_labels(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut last = 0;
    let mut after_label = false;

    for label in SECTION_LABEL.find_iter(text) {
        push_segment(&mut out, &text[last..label.start()], after_label);

        let kept = out.trim_end_matches([' ', '\t']).len();
        out.truncate(kept);
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }

        out.push_str(label.as_str());
        after_label = true;
        last = label.end();
    }

    push_segment(&mut out, &text[last..], after_label);
    out
}

fn push_segment(out: &mut String, segment: &str, after_label: bool) {
    if !after_label {
        out.push_str(segment);
        return;
    }

    let segment = segment.trim_start_matches([' ', '\t']);
    if !segment.is_empty() && !segment.starts_with('\n') {
        out.push('\n');
    }
    out.push_str(segment);
}
