#![no_main]

use libfuzzer_sys::fuzz_target;
use std::sync::LazyLock;

use lyrics_engine::extractor::{ExtractionCascade, ExtractionConfig, normalize};

static CASCADE: LazyLock<ExtractionCascade> =
    LazyLock::new(|| ExtractionCascade::new(&ExtractionConfig::default()).unwrap());

fuzz_target!(|data: &[u8]| {
    let html = String::from_utf8_lossy(data);

    // Neither the cascade nor the normalizer may panic on arbitrary markup
    let result = CASCADE.extract(&html);
    if let Some(found) = result.html {
        let _ = normalize(&found);
    }
});
