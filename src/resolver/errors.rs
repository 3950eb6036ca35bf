use thiserror::Error;

/// Failures that reach the caller once every source has been tried.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("song not found: {query}")]
    NotFound { query: String },

    #[error("could not extract lyrics from {url}: {reason}")]
    ExtractionFailed { url: String, reason: String },

    #[error("unsupported url: {url}")]
    UnsupportedUrl { url: String },

    #[error("missing parameter: provide either \"url\" or \"song\"")]
    MissingParameter,

    #[error("internal error: {0}")]
    Internal(String),
}
