use std::fs;

use crate::extractor::{ExtractionCascade, ExtractionConfig, Normalizer, Strategy, normalize};

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("src/extractor/tests/fixtures/{name}"))
        .expect("Failed to read test fixture")
}

fn cascade(config: ExtractionConfig) -> ExtractionCascade {
    ExtractionCascade::new(&config).expect("default config compiles")
}

#[test]
fn test_default_config_compiles() {
    let cascade = cascade(ExtractionConfig::default());
    assert_eq!(cascade.strategies(), &Strategy::ALL);
}

#[test]
fn test_structured_container_beats_embedded_script() {
    // The aggregator page carries lyrics both in containers and in its
    // preloaded state; the container must win.
    let result = cascade(ExtractionConfig::default()).extract(&fixture("aggregator_song.html"));

    assert_eq!(result.strategy, Some(Strategy::StructuredContainer));
    let text = normalize(result.html.as_deref().unwrap());
    assert_eq!(
        text,
        "[Verse 1]\nHeadlights cutting through the rain\nRadio low, I call your name\n\n[Chorus]\nWe drive all night"
    );
    assert!(!text.contains("Script copy"));
}

#[test]
fn test_merged_containers() {
    let config = ExtractionConfig {
        merge_containers: true,
        ..ExtractionConfig::default()
    };
    let result = cascade(config).extract(&fixture("aggregator_song.html"));

    let text = normalize(result.html.as_deref().unwrap());
    assert!(text.starts_with("[Verse 1]\nHeadlights cutting through the rain"));
    assert!(text.ends_with("[Verse 2]\nCity sleeping, we're awake\nEvery mile a small mistake"));
    assert!(!text.contains("Advertisement"));
    assert!(!text.contains("/12345/"));
}

#[test]
fn test_embedded_script_when_containers_disabled() {
    let config = ExtractionConfig {
        strategies: vec![Strategy::EmbeddedScript],
        ..ExtractionConfig::default()
    };
    let result = cascade(config).extract(&fixture("aggregator_song.html"));

    assert_eq!(result.strategy, Some(Strategy::EmbeddedScript));
    assert_eq!(normalize(result.html.as_deref().unwrap()), "Script copy of the lyrics");
}

#[test]
fn test_script_only_page() {
    let result = cascade(ExtractionConfig::default()).extract(&fixture("script_only.html"));

    assert_eq!(result.strategy, Some(Strategy::EmbeddedScript));
    assert_eq!(
        normalize(result.html.as_deref().unwrap()),
        "[Intro]\nOnly in the script\nNowhere in the markup"
    );
}

#[test]
fn test_heuristic_class_name_on_regional_page() {
    let result = cascade(ExtractionConfig::default()).extract(&fixture("regional_song.html"));

    assert_eq!(result.strategy, Some(Strategy::HeuristicClassName));
    assert_eq!(
        normalize(result.html.as_deref().unwrap()),
        "සඳ එළියේ ඔබ එනවා\nමල් සුවඳින් හද පිරෙනවා\n\nගී හඬකින් රෑ ගෙවෙනවා"
    );
}

#[test]
fn test_regional_profile_uses_entry_content() {
    let config = ExtractionConfig {
        container_selectors: vec![".entry-content".to_string()],
        strip_selectors: vec![".sharedaddy".to_string(), ".jp-relatedposts".to_string()],
        ..ExtractionConfig::default()
    };
    let result = cascade(config.clone()).extract(&fixture("regional_song.html"));
    assert_eq!(result.strategy, Some(Strategy::StructuredContainer));

    let normalizer = Normalizer::with_strip_selectors(&config.strip_selectors).unwrap();
    let text = normalizer.normalize(result.html.as_deref().unwrap());
    assert!(text.starts_with("Singer: Sample Artist"));
    assert!(text.contains("සඳ එළියේ ඔබ එනවා"));
    assert!(!text.contains("Share this"));
    assert!(!text.contains("Facebook"));
}

#[test]
fn test_plain_text_fallback_page() {
    let result = cascade(ExtractionConfig::default()).extract(&fixture("plain_text.html"));

    assert_eq!(result.strategy, Some(Strategy::PlainTextFallback));
    let text = normalize(result.html.as_deref().unwrap());
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.first(), Some(&"Morning light upon the harbour wall"));
    assert_eq!(lines.last(), Some(&"Sail away and never look behind"));
    assert!(text.contains("[Chorus]\nSail away where the cold winds blow"));
    assert!(!text.contains("Home"));
    assert!(!text.contains("www."));
    assert!(!text.contains("archive@example.com"));
    assert!(!text.contains("Advertisement"));
}

#[test]
fn test_plain_text_fallback_with_literal_markup_normalizes_stably() {
    let body: String = (0..10)
        .map(|i| format!("<p>She wrote &lt;b&gt;goodbye&lt;/b&gt; on wall number {i}</p>"))
        .collect();
    let html = format!("<html><body>{body}</body></html>");

    let result = cascade(ExtractionConfig::default()).extract(&html);
    assert_eq!(result.strategy, Some(Strategy::PlainTextFallback));

    let text = normalize(result.html.as_deref().unwrap());
    assert_eq!(text.lines().next(), Some("She wrote goodbye on wall number 0"));
    assert!(!text.contains('<'));
    assert_eq!(normalize(&text), text);
}

#[test]
fn test_page_without_lyrics() {
    let result = cascade(ExtractionConfig::default()).extract(&fixture("no_lyrics.html"));

    assert!(!result.is_found());
    assert_eq!(result.strategy, None);
}

#[test]
fn test_malformed_html() {
    let html = "<html><head><title>Broken</title><body><div class=\"lyrics\"><p>Unclosed tags<p>More content";
    let result = cascade(ExtractionConfig::default()).extract(html);

    assert_eq!(result.strategy, Some(Strategy::StructuredContainer));
    assert_eq!(
        normalize(result.html.as_deref().unwrap()),
        "Unclosed tags\n\nMore content"
    );
}

#[test]
fn test_invalid_config_rejected_at_construction() {
    let config = ExtractionConfig {
        container_selectors: vec!["div[".to_string()],
        ..ExtractionConfig::default()
    };
    assert!(ExtractionCascade::new(&config).is_err());
}

#[test]
fn test_config_deserializes_with_defaults() {
    let config: ExtractionConfig = serde_json::from_str(
        r#"{"strategies":["heuristic_class_name","plain_text_fallback"],"merge_containers":true}"#,
    )
    .unwrap();

    assert_eq!(
        config.strategies,
        vec![Strategy::HeuristicClassName, Strategy::PlainTextFallback]
    );
    assert!(config.merge_containers);
    assert_eq!(config.min_fallback_lines, 10);
    assert_eq!(config.min_line_chars, 20);
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_extract_never_panics(html in ".*") {
            let result = cascade(ExtractionConfig::default()).extract(&html);
            if let Some(fragment) = result.html {
                let _ = normalize(&fragment);
            }
        }

        #[test]
        fn test_normalized_output_has_no_script_content(
            lines in proptest::collection::vec("[A-Z][a-z ]{25,40}", 10..14)
        ) {
            let html = format!(
                "<html><body><script>var secret = 1;</script><div class=\"lyrics\">{}</div></body></html>",
                lines.join("<br>")
            );
            let result = cascade(ExtractionConfig::default()).extract(&html);
            let text = normalize(result.html.as_deref().unwrap_or_default());
            prop_assert!(!text.contains("secret"));
            prop_assert!(!text.contains('<'));
        }
    }
}
