pub mod cleaner;
pub mod config;
pub mod errors;
pub mod fallback;
pub mod model;
pub mod reader;
pub mod script;

#[cfg(test)]
mod tests;

pub use cleaner::{Normalizer, normalize};
pub use config::{ExtractionConfig, ScriptPattern, ScriptPayload};
pub use errors::ExtractorError;
pub use model::{ExtractionResult, Strategy};

use scraper::{Html, Selector};
use tracing::debug;

use crate::extractor::{fallback::LineFilter, script::CompiledScriptPattern};

/// Ordered list of extraction strategies, compiled from an
/// `ExtractionConfig`. Strategies run one at a time; the first to produce
/// content wins and the rest are skipped.
#[derive(Debug, Clone)]
pub struct ExtractionCascade {
    strategies: Vec<Strategy>,
    containers: Vec<Selector>,
    merge_containers: bool,
    class_patterns: Vec<String>,
    script_patterns: Vec<CompiledScriptPattern>,
    json_paths: Vec<Vec<String>>,
    line_filter: LineFilter,
    min_fallback_lines: usize,
}

impl ExtractionCascade {
    pub fn new(config: &ExtractionConfig) -> Result<Self, ExtractorError> {
        Ok(Self {
            strategies: config.strategies.clone(),
            containers: reader::parse_selectors(&config.container_selectors)?,
            merge_containers: config.merge_containers,
            class_patterns: config
                .class_name_patterns
                .iter()
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
            script_patterns: script::compile_patterns(&config.script_patterns)?,
            json_paths: script::split_key_paths(&config.json_html_paths),
            line_filter: LineFilter::new(config.min_line_chars, &config.boilerplate_phrases),
            min_fallback_lines: config.min_fallback_lines,
        })
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    /// Runs the strategies in order over `raw_html`.
    pub fn extract(&self, raw_html: &str) -> ExtractionResult {
        let document = Html::parse_document(raw_html);
        self.extract_from(&document)
    }

    pub fn extract_from(&self, document: &Html) -> ExtractionResult {
        for &strategy in &self.strategies {
            match self.run(strategy, document) {
                Some(html) if !html.trim().is_empty() => {
                    debug!(%strategy, "strategy produced content");
                    return ExtractionResult::found(html, strategy);
                }
                _ => debug!(%strategy, "strategy found nothing"),
            }
        }

        ExtractionResult::not_found()
    }

    fn run(&self, strategy: Strategy, document: &Html) -> Option<String> {
        match strategy {
            Strategy::StructuredContainer => {
                reader::structured_container(document, &self.containers, self.merge_containers)
            }
            Strategy::HeuristicClassName => {
                reader::heuristic_class_name(document, &self.class_patterns)
            }
            Strategy::EmbeddedScript => {
                script::embedded_script(document, &self.script_patterns, &self.json_paths)
            }
            Strategy::PlainTextFallback => {
                fallback::plain_text_fallback(document, &self.line_filter, self.min_fallback_lines)
            }
        }
    }
}
