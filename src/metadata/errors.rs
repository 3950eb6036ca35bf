use thiserror::Error;

/// Why an enrichment lookup produced nothing. Never surfaces to callers of
/// `MetadataEnricher::enrich`; it only feeds the logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataUnavailable {
    #[error("invalid or missing API access token")]
    Unauthorized,

    #[error("access forbidden, the token may lack permissions")]
    Forbidden,

    #[error("song not found")]
    NotFound,

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("no API access token configured")]
    MissingCredential,

    #[error("no song id in {0}")]
    UnresolvableKey(String),
}

impl MetadataUnavailable {
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        match status.as_u16() {
            401 => MetadataUnavailable::Unauthorized,
            403 => MetadataUnavailable::Forbidden,
            404 => MetadataUnavailable::NotFound,
            429 => MetadataUnavailable::RateLimited,
            other => MetadataUnavailable::Status(other),
        }
    }
}
