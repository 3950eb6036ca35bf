use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use std::sync::LazyLock;
use tracing::debug;

use crate::extractor::{
    config::{ScriptPattern, ScriptPayload},
    errors::ExtractorError,
};

static SCRIPT: LazyLock<Selector> = LazyLock::new(|| Selector::parse("script").unwrap());

#[derive(Debug, Clone)]
pub struct CompiledScriptPattern {
    regex: Regex,
    payload: ScriptPayload,
}

pub(crate) fn compile_patterns(
    patterns: &[ScriptPattern],
) -> Result<Vec<CompiledScriptPattern>, ExtractorError> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(&p.pattern)
                .map(|regex| CompiledScriptPattern {
                    regex,
                    payload: p.payload,
                })
                .map_err(|source| ExtractorError::InvalidPattern {
                    pattern: p.pattern.clone(),
                    source,
                })
        })
        .collect()
}

pub(crate) fn split_key_paths(paths: &[String]) -> Vec<Vec<String>> {
    paths
        .iter()
        .map(|path| path.split('.').map(str::to_string).collect())
        .collect()
}

/// Lyrics HTML hidden in a page's `<script>` tags, either as an escaped
/// string or inside a serialized state object.
pub fn embedded_script(
    document: &Html,
    patterns: &[CompiledScriptPattern],
    key_paths: &[Vec<String>],
) -> Option<String> {
    for script in document.select(&SCRIPT) {
        let body: String = script.text().collect();
        if body.trim().is_empty() {
            continue;
        }

        for pattern in patterns {
            let Some(capture) = pattern.regex.captures(&body).and_then(|c| c.get(1)) else {
                continue;
            };

            match decode_payload(capture.as_str(), pattern.payload, key_paths) {
                Some(html) if !html.trim().is_empty() => return Some(html),
                _ => debug!(payload = ?pattern.payload, "script pattern matched but held no html"),
            }
        }
    }

    None
}

fn decode_payload(raw: &str, payload: ScriptPayload, key_paths: &[Vec<String>]) -> Option<String> {
    match payload {
        ScriptPayload::EscapedHtml => Some(unescape_js(raw)),
        ScriptPayload::JsonObject => {
            let value: Value = serde_json::from_str(raw).ok()?;
            html_from_json(&value, key_paths)
        }
        ScriptPayload::JsonStringLiteral => {
            let inner = strip_quotes(raw)?;
            let value: Value = serde_json::from_str(&unescape_js(inner)).ok()?;
            html_from_json(&value, key_paths)
        }
    }
}

fn strip_quotes(raw: &str) -> Option<&str> {
    let raw = raw.trim();
    ['\'', '"', '`']
        .into_iter()
        .find_map(|quote| raw.strip_prefix(quote)?.strip_suffix(quote))
}

fn html_from_json(value: &Value, key_paths: &[Vec<String>]) -> Option<String> {
    for path in key_paths {
        let found = path
            .iter()
            .try_fold(value, |node, key| node.get(key.as_str()))
            .and_then(Value::as_str)
            .filter(|html| !html.trim().is_empty());
        if let Some(html) = found {
            return Some(html.to_string());
        }
    }

    find_body_html(value)
}

/// Depth-first search for any `{"body": {"html": "..."}}`. serde_json caps
/// nesting depth, which bounds the recursion.
fn find_body_html(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => {
            let direct = map
                .get("body")
                .and_then(|body| body.get("html"))
                .and_then(Value::as_str)
                .filter(|html| !html.trim().is_empty());
            if let Some(html) = direct {
                return Some(html.to_string());
            }
            map.values().find_map(find_body_html)
        }
        Value::Array(items) => items.iter().find_map(find_body_html),
        _ => None,
    }
}

/// Decodes JS/JSON string escapes. Strict JSON goes through serde_json; the
/// manual path covers what JS allows and JSON doesn't (`\'`, `\xHH`, raw
/// control characters).
pub fn unescape_js(raw: &str) -> String {
    if let Ok(decoded) = serde_json::from_str::<String>(&format!("\"{raw}\"")) {
        return decoded;
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('0') => out.push('\0'),
            Some('u') => {
                let high = read_hex(&mut chars, 4);
                match high {
                    Some(h @ 0xD800..=0xDBFF) => {
                        // high surrogate: only valid when a low one follows
                        let mut lookahead = chars.clone();
                        let low = match (lookahead.next(), lookahead.next()) {
                            (Some('\\'), Some('u')) => read_hex(&mut lookahead, 4)
                                .filter(|l| (0xDC00..=0xDFFF).contains(l)),
                            _ => None,
                        };
                        match low {
                            Some(l) => {
                                chars = lookahead;
                                let combined = 0x10000 + ((h - 0xD800) << 10) + (l - 0xDC00);
                                out.push(char::from_u32(combined).unwrap_or('\u{FFFD}'));
                            }
                            None => out.push('\u{FFFD}'),
                        }
                    }
                    Some(code) => out.push(char::from_u32(code).unwrap_or('\u{FFFD}')),
                    None => out.push_str("\\u"),
                }
            }
            Some('x') => match read_hex(&mut chars, 2) {
                Some(code) => out.push(char::from_u32(code).unwrap_or('\u{FFFD}')),
                None => out.push_str("\\x"),
            },
            // \" \' \\ \/ and anything unknown: keep the escaped character
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}

fn read_hex<I>(chars: &mut std::iter::Peekable<I>, digits: usize) -> Option<u32>
where
    I: Iterator<Item = char> + Clone,
{
    let snapshot = chars.clone();
    let mut value = 0u32;
    for _ in 0..digits {
        match chars.next().and_then(|c| c.to_digit(16)) {
            Some(d) => value = value * 16 + d,
            None => {
                *chars = snapshot;
                return None;
            }
        }
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::config::ExtractionConfig;

    fn defaults() -> (Vec<CompiledScriptPattern>, Vec<Vec<String>>) {
        let config = ExtractionConfig::default();
        (
            compile_patterns(&config.script_patterns).unwrap(),
            split_key_paths(&config.json_html_paths),
        )
    }

    #[test]
    fn test_unescape_common_sequences() {
        assert_eq!(
            unescape_js(r#"<p>Say \"hi\"<br>\nnext\tline</p>"#),
            "<p>Say \"hi\"<br>\nnext\tline</p>"
        );
    }

    #[test]
    fn test_unescape_unicode_and_js_only_escapes() {
        assert_eq!(unescape_js(r"café it\'s"), "café it's");
        assert_eq!(unescape_js(r"🎵 \x41"), "🎵 A");
        assert_eq!(unescape_js(r"සඳ"), "සඳ");
    }

    #[test]
    fn test_unescape_tolerates_broken_escapes() {
        assert_eq!(unescape_js(r"\uZZ it\'s"), "\\uZZ it's");
        assert_eq!(unescape_js("trailing\\"), "trailing\\");
    }

    #[test]
    fn test_escaped_body_html() {
        let (patterns, paths) = defaults();
        let document = Html::parse_document(
            r#"<html><body><script>var data = {"song":{"body":{"html":"<p>First line<br>\nSecond \"line\"</p>"}}};</script></body></html>"#,
        );
        let html = embedded_script(&document, &patterns, &paths).unwrap();
        assert_eq!(html, "<p>First line<br>\nSecond \"line\"</p>");
    }

    #[test]
    fn test_preloaded_state_json_parse() {
        let (patterns, paths) = defaults();
        let document = Html::parse_document(
            r#"<script>window.__PRELOADED_STATE__ = JSON.parse('{\"songPage\":{\"lyricsData\":{\"body\":{\"html\":\"<p>It\'s a state line<\/p>\"}}}}');</script>"#,
        );
        let html = embedded_script(&document, &patterns, &paths).unwrap();
        assert_eq!(html, "<p>It's a state line</p>");
    }

    #[test]
    fn test_preloaded_state_object() {
        let (patterns, paths) = defaults();
        let document = Html::parse_document(
            r#"<script>window.__PRELOADED_STATE__ = {"entities":{"songs":{"1":{"lyrics":{"body":{"html":"<p>Deep html</p>"}}}}}};</script>"#,
        );
        let html = embedded_script(&document, &patterns, &paths).unwrap();
        assert_eq!(html, "<p>Deep html</p>");
    }

    #[test]
    fn test_scripts_without_patterns_are_ignored() {
        let (patterns, paths) = defaults();
        let document = Html::parse_document(r#"<script>console.log("hello")</script>"#);
        assert!(embedded_script(&document, &patterns, &paths).is_none());
    }

    #[test]
    fn test_invalid_pattern_reported() {
        let err = compile_patterns(&[ScriptPattern {
            pattern: "(unclosed".to_string(),
            payload: ScriptPayload::EscapedHtml,
        }])
        .unwrap_err();
        assert!(matches!(err, ExtractorError::InvalidPattern { .. }));
    }
}
