use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use crate::extractor::Strategy;
use crate::metadata::ApiMetadata;

/// --- Sources ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceName {
    Aggregator,
    Regional,
}

impl SourceName {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceName::Aggregator => "aggregator",
            SourceName::Regional => "regional",
        }
    }
}

impl fmt::Display for SourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A search hit pointing at a page that may hold lyrics. Only `url` is
/// guaranteed; everything else is whatever the source's listing exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCandidate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    pub url: Url,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub source: SourceName,
}

/// --- Lyrics ---

/// Normalized lyrics. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LyricsText(String);

impl LyricsText {
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            None
        } else {
            Some(Self(text))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for LyricsText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LyricsText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Everything scraped from one lyrics page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricsPage {
    /// Final URL after redirects
    pub url: Url,
    pub lyrics: LyricsText,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub thumbnail: Option<String>,
    /// Release label as the page displays it
    pub release_date: Option<String>,
    /// Aggregator song id when the page advertises one
    pub song_id: Option<u64>,
    pub strategy: Strategy,
}

/// A resolved song. Constructing one requires lyrics, so a record without
/// them cannot exist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SongRecord {
    pub source: SourceName,
    pub url: Url,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub thumbnail: Option<String>,
    pub release_date: Option<String>,
    pub lyrics: LyricsText,
    pub api_metadata: Option<ApiMetadata>,
}

impl SongRecord {
    /// Candidate fields win; the page fills whatever the listing lacked.
    pub fn from_page(source: SourceName, candidate: Option<&SourceCandidate>, page: LyricsPage) -> Self {
        let pick = |listed: Option<&String>, scraped: Option<String>| {
            listed
                .filter(|value| !value.trim().is_empty())
                .cloned()
                .or(scraped)
        };

        Self {
            source,
            title: pick(candidate.map(|c| &c.title), page.title),
            artist: pick(candidate.and_then(|c| c.artist.as_ref()), page.artist),
            thumbnail: pick(candidate.and_then(|c| c.thumbnail.as_ref()), page.thumbnail),
            release_date: page.release_date,
            url: candidate.map(|c| c.url.clone()).unwrap_or(page.url),
            lyrics: page.lyrics,
            api_metadata: None,
        }
    }
}
