use thiserror::Error;

/// Raised while compiling an `ExtractionConfig`; extraction itself never fails.
#[derive(Error, Debug)]
pub enum ExtractorError {
    #[error("invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("invalid script pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
