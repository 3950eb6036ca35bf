//! JSON bodies for whatever HTTP layer fronts the resolver, and the status
//! code each resolver error maps to.

use serde::Serialize;

use crate::metadata::ApiMetadata;
use crate::model::{SongRecord, SourceCandidate, SourceName};
use crate::resolver::{MultiSearch, ResolveError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricsResponse {
    pub success: bool,
    pub source: SourceName,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    pub lyrics: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_metadata: Option<ApiMetadata>,
}

impl From<SongRecord> for LyricsResponse {
    fn from(record: SongRecord) -> Self {
        Self {
            success: true,
            source: record.source,
            url: record.url.to_string(),
            title: record.title,
            artist: record.artist,
            thumbnail: record.thumbnail,
            release_date: record.release_date,
            lyrics: record.lyrics.into_inner(),
            api_metadata: record.api_metadata,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<&ResolveError> for ErrorResponse {
    fn from(err: &ResolveError) -> Self {
        let mut response = Self {
            success: false,
            error: summary(err).to_string(),
            query: None,
            url: None,
            message: None,
        };

        match err {
            ResolveError::NotFound { query } => response.query = Some(query.clone()),
            ResolveError::ExtractionFailed { url, reason } => {
                response.url = Some(url.clone());
                response.message = Some(reason.clone());
            }
            ResolveError::UnsupportedUrl { url } => response.url = Some(url.clone()),
            ResolveError::MissingParameter => {}
            ResolveError::Internal(message) => response.message = Some(message.clone()),
        }

        response
    }
}

fn summary(err: &ResolveError) -> &'static str {
    match err {
        ResolveError::NotFound { .. } => "Song not found",
        ResolveError::ExtractionFailed { .. } => "Lyrics not found",
        ResolveError::UnsupportedUrl { .. } => "Unsupported URL",
        ResolveError::MissingParameter => "Missing parameter: provide either \"url\" or \"song\"",
        ResolveError::Internal(_) => "Internal server error",
    }
}

/// HTTP status for a resolver failure.
pub fn status_for(err: &ResolveError) -> u16 {
    match err {
        ResolveError::MissingParameter | ResolveError::UnsupportedUrl { .. } => 400,
        ResolveError::NotFound { .. } | ResolveError::ExtractionFailed { .. } => 404,
        ResolveError::Internal(_) => 500,
    }
}

#[derive(Debug, Serialize)]
pub struct SourceCounts {
    pub aggregator: usize,
    pub regional: usize,
}

#[derive(Debug, Serialize)]
pub struct MultiSearchResponse {
    pub query: String,
    pub count: usize,
    pub sources: SourceCounts,
    pub results: Vec<SourceCandidate>,
}

impl From<MultiSearch> for MultiSearchResponse {
    fn from(search: MultiSearch) -> Self {
        Self {
            sources: SourceCounts {
                aggregator: search.count_for(SourceName::Aggregator),
                regional: search.count_for(SourceName::Regional),
            },
            count: search.candidates.len(),
            query: search.query,
            results: search.candidates,
        }
    }
}
