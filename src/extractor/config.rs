use serde::{Deserialize, Serialize};

use crate::extractor::model::Strategy;

/// How a script-pattern capture should be turned into lyrics HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptPayload {
    /// JSON-escaped HTML string contents (without the surrounding quotes)
    EscapedHtml,
    /// A JSON object literal
    JsonObject,
    /// A quoted JS string whose contents are JSON, as in `JSON.parse('...')`
    JsonStringLiteral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptPattern {
    /// Regex with the payload in capture group 1
    pub pattern: String,
    pub payload: ScriptPayload,
}

/// Selector and pattern knowledge for one source. Everything here is
/// empirically tuned against live markup and is expected to drift, so it is
/// data rather than code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Strategies to run, in priority order
    pub strategies: Vec<Strategy>,

    /// CSS selectors for known lyrics containers, in priority order
    pub container_selectors: Vec<String>,

    /// Join every element matched by the winning container selector instead
    /// of taking the first
    pub merge_containers: bool,

    /// Case-insensitive class-name substrings for the heuristic strategy
    pub class_name_patterns: Vec<String>,

    /// Patterns tried against each `<script>` body
    pub script_patterns: Vec<ScriptPattern>,

    /// Dotted key paths to a lyrics HTML string inside embedded JSON state
    pub json_html_paths: Vec<String>,

    /// Lines containing any of these (case-insensitive) are page chrome
    pub boilerplate_phrases: Vec<String>,

    /// A fallback line must be longer than this many characters
    pub min_line_chars: usize,

    /// Fewer qualifying lines than this and the fallback gives up
    pub min_fallback_lines: usize,

    /// Extra selectors whose subtrees the normalizer drops
    pub strip_selectors: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            strategies: Strategy::ALL.to_vec(),
            container_selectors: vec![
                "[data-lyrics-container=\"true\"]".to_string(),
                ".lyrics".to_string(),
                "#lyrics".to_string(),
                ".song-lyrics".to_string(),
            ],
            merge_containers: false,
            class_name_patterns: vec![
                "lyrics".to_string(),
                "lyric".to_string(),
                "songtext".to_string(),
            ],
            script_patterns: vec![
                ScriptPattern {
                    pattern: r#""body"\s*:\s*\{\s*"html"\s*:\s*"((?:[^"\\]|\\.)*)""#.to_string(),
                    payload: ScriptPayload::EscapedHtml,
                },
                ScriptPattern {
                    pattern: r#"__PRELOADED_STATE__\s*=\s*JSON\.parse\(\s*('(?:[^'\\]|\\.)*')\s*\)"#
                        .to_string(),
                    payload: ScriptPayload::JsonStringLiteral,
                },
                ScriptPattern {
                    pattern: r#"(?s)__PRELOADED_STATE__\s*=\s*(\{.*\})\s*;?\s*$"#.to_string(),
                    payload: ScriptPayload::JsonObject,
                },
            ],
            json_html_paths: vec![
                "songPage.lyricsData.body.html".to_string(),
                "lyricsData.body.html".to_string(),
                "song.lyrics.body.html".to_string(),
            ],
            boilerplate_phrases: vec![
                "advertisement".to_string(),
                "cookie".to_string(),
                "privacy policy".to_string(),
                "all rights reserved".to_string(),
                "subscribe".to_string(),
                "sign up".to_string(),
                "log in".to_string(),
                "share this".to_string(),
                "related posts".to_string(),
                "you might also like".to_string(),
                "embed".to_string(),
            ],
            min_line_chars: 20,
            min_fallback_lines: 10,
            strip_selectors: Vec::new(),
        }
    }
}
