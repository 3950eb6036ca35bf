use serde::{Deserialize, Serialize};
use std::fmt;

/// One self-contained way of locating lyrics inside a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    StructuredContainer,
    HeuristicClassName,
    EmbeddedScript,
    PlainTextFallback,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::StructuredContainer,
        Strategy::HeuristicClassName,
        Strategy::EmbeddedScript,
        Strategy::PlainTextFallback,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::StructuredContainer => "structured_container",
            Strategy::HeuristicClassName => "heuristic_class_name",
            Strategy::EmbeddedScript => "embedded_script",
            Strategy::PlainTextFallback => "plain_text_fallback",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a cascade run: the winning fragment, or `None` when every
/// strategy came up empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionResult {
    pub html: Option<String>,
    pub strategy: Option<Strategy>,
}

impl ExtractionResult {
    pub fn found(html: String, strategy: Strategy) -> Self {
        Self {
            html: Some(html),
            strategy: Some(strategy),
        }
    }

    pub fn not_found() -> Self {
        Self::default()
    }

    pub fn is_found(&self) -> bool {
        self.html.is_some()
    }
}
