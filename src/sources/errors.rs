use thiserror::Error;

use crate::fetcher::FetchError;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("no results for {query:?}")]
    SearchEmpty { query: String },

    #[error("malformed source response: {reason}")]
    Malformed { reason: String },

    #[error("no lyrics found at {url}")]
    LyricsNotFound { url: String },

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl SourceError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        SourceError::Malformed {
            reason: reason.into(),
        }
    }

    /// Expected outcomes that say nothing about source health.
    pub fn is_miss(&self) -> bool {
        matches!(
            self,
            SourceError::SearchEmpty { .. } | SourceError::LyricsNotFound { .. }
        )
    }
}
