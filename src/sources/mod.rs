pub mod aggregator;
pub mod errors;
pub mod regional;

pub use aggregator::AggregatorSource;
pub use errors::SourceError;
pub use regional::RegionalSource;

use async_trait::async_trait;
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

use crate::model::{LyricsPage, SourceCandidate, SourceName};

/// Searches are truncated to this many candidates.
pub const MAX_CANDIDATES: usize = 5;

/// One lyrics site: how to find candidate pages for a song name and how to
/// pull lyrics out of one of those pages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn source(&self) -> SourceName;

    /// Whether `url` belongs to this source.
    fn handles(&self, url: &Url) -> bool;

    /// Candidates in the source's own ranking, at most `MAX_CANDIDATES`.
    /// Zero hits is `SourceError::SearchEmpty`, never an empty list.
    async fn search(&self, query: &str) -> Result<Vec<SourceCandidate>, SourceError>;

    async fn extract_lyrics(&self, url: &str) -> Result<LyricsPage, SourceError>;
}

/// Endpoint and pacing knobs shared by every adapter.
#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub base_url: Url,
    pub search_timeout: Duration,
    pub page_timeout: Duration,
    /// Pause before every lyrics-page fetch
    pub courtesy_delay: Duration,
}

impl SourceSettings {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            search_timeout: Duration::from_secs(10),
            page_timeout: Duration::from_secs(15),
            courtesy_delay: Duration::from_secs(1),
        }
    }

    pub fn with_courtesy_delay(mut self, delay: Duration) -> Self {
        self.courtesy_delay = delay;
        self
    }

    pub fn with_timeouts(mut self, search: Duration, page: Duration) -> Self {
        self.search_timeout = search;
        self.page_timeout = page;
        self
    }

    /// Host match ignoring a leading `www.`.
    pub fn same_site(&self, url: &Url) -> bool {
        fn bare(host: &str) -> &str {
            host.strip_prefix("www.").unwrap_or(host)
        }

        match (self.base_url.host_str(), url.host_str()) {
            (Some(base), Some(other)) => {
                bare(base).eq_ignore_ascii_case(bare(other))
                    && self.base_url.port_or_known_default() == url.port_or_known_default()
            }
            _ => false,
        }
    }

    pub(crate) async fn courtesy_pause(&self) {
        if !self.courtesy_delay.is_zero() {
            tokio::time::sleep(self.courtesy_delay).await;
        }
    }
}

/// Text of the first element matched by any of `selectors`, tried in order.
pub(crate) fn first_text(document: &Html, selectors: &[&Selector]) -> Option<String> {
    selectors.iter().find_map(|selector| {
        document
            .select(selector)
            .find_map(|element| non_empty(Some(element.text().collect())))
    })
}

pub(crate) fn first_attr(document: &Html, selectors: &[(&Selector, &str)]) -> Option<String> {
    selectors.iter().find_map(|(selector, attr)| {
        document
            .select(selector)
            .find_map(|element| non_empty(element.value().attr(attr).map(str::to_string)))
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|v| !v.is_empty())
}
