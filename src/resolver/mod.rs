//! Orchestrates the source adapters: name lookups with fallback across
//! sources, direct URL lookups and the parallel multi-source search.

pub mod errors;

pub use errors::ResolveError;

use futures::future::join_all;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use url::Url;

use crate::config::Config;
use crate::fetcher::{HttpFetcher, IdentityPool, RotatingFetcher};
use crate::metadata::{MetadataEnricher, SongKey};
use crate::model::{SongRecord, SourceCandidate, SourceName};
use crate::sources::{
    AggregatorSource, RegionalSource, SourceAdapter, SourceError, SourceSettings,
};

/// Either a song name to search for or a page URL to read directly.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LookupRequest {
    pub song: Option<String>,
    pub url: Option<String>,
}

/// Per-source hit counts from a multi-source search. Failed sources count
/// as zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCount {
    pub source: SourceName,
    pub count: usize,
}

#[derive(Debug, Clone)]
pub struct MultiSearch {
    pub query: String,
    pub candidates: Vec<SourceCandidate>,
    pub per_source: Vec<SourceCount>,
}

impl MultiSearch {
    pub fn count_for(&self, source: SourceName) -> usize {
        self.per_source
            .iter()
            .find(|c| c.source == source)
            .map_or(0, |c| c.count)
    }
}

pub struct Resolver {
    /// In priority order
    sources: Vec<Arc<dyn SourceAdapter>>,
    enricher: Option<MetadataEnricher>,
}

impl Resolver {
    pub fn new(sources: Vec<Arc<dyn SourceAdapter>>) -> Self {
        Self {
            sources,
            enricher: None,
        }
    }

    /// Both sources behind one shared rotating fetcher, aggregator first,
    /// plus the metadata enricher.
    pub fn from_config(config: &Config) -> Result<Self, ResolveError> {
        let fetcher = RotatingFetcher::new(
            HttpFetcher::new().map_err(internal)?,
            Arc::new(IdentityPool::default()),
        )
        .with_retry_timeout(config.page_timeout());

        let settings = |base: &Url| {
            SourceSettings::new(base.clone())
                .with_timeouts(config.search_timeout(), config.page_timeout())
                .with_courtesy_delay(config.courtesy_delay())
        };

        let aggregator = AggregatorSource::new(fetcher.clone(), settings(config.aggregator_url()))
            .map_err(internal)?;
        let regional = RegionalSource::new(fetcher, settings(config.regional_url()))
            .map_err(internal)?;

        let enricher = MetadataEnricher::new(
            config.aggregator_api_url().clone(),
            config.access_token(),
            config.metadata_timeout(),
            config.sample_metadata(),
        )
        .map_err(internal)?;

        let sources: Vec<Arc<dyn SourceAdapter>> = vec![Arc::new(aggregator), Arc::new(regional)];
        Ok(Self::new(sources).with_enricher(enricher))
    }

    pub fn with_enricher(mut self, enricher: MetadataEnricher) -> Self {
        self.enricher = Some(enricher);
        self
    }

    pub fn sources(&self) -> impl Iterator<Item = SourceName> + '_ {
        self.sources.iter().map(|s| s.source())
    }

    pub async fn resolve(&self, request: &LookupRequest) -> Result<SongRecord, ResolveError> {
        let url = request.url.as_deref().map(str::trim).filter(|u| !u.is_empty());
        let song = request.song.as_deref().map(str::trim).filter(|s| !s.is_empty());

        match (url, song) {
            (Some(url), _) => self.resolve_by_url(url).await,
            (None, Some(song)) => self.resolve_by_name(song).await,
            (None, None) => Err(ResolveError::MissingParameter),
        }
    }

    /// First source, in priority order, that both finds the song and yields
    /// lyrics from its top candidate.
    #[instrument(skip(self))]
    pub async fn resolve_by_name(&self, name: &str) -> Result<SongRecord, ResolveError> {
        for adapter in &self.sources {
            let source = adapter.source();

            let candidates = match adapter.search(name).await {
                Ok(candidates) => candidates,
                Err(err) => {
                    log_source_error(source, &err, "search failed");
                    continue;
                }
            };
            let Some(best) = candidates.into_iter().next() else {
                info!(%source, "search returned no candidates");
                continue;
            };

            match adapter.extract_lyrics(best.url.as_str()).await {
                Ok(page) => {
                    info!(%source, url = %best.url, "resolved");
                    let key = best
                        .id
                        .or(page.song_id)
                        .map(SongKey::Id)
                        .or_else(|| {
                            (source == SourceName::Aggregator)
                                .then(|| SongKey::Url(best.url.to_string()))
                        });
                    let record = SongRecord::from_page(source, Some(&best), page);
                    return Ok(self.enrich(record, key).await);
                }
                Err(err) => log_source_error(source, &err, "lyrics extraction failed"),
            }
        }

        Err(ResolveError::NotFound {
            query: name.to_string(),
        })
    }

    #[instrument(skip(self))]
    pub async fn resolve_by_url(&self, url: &str) -> Result<SongRecord, ResolveError> {
        let parsed = Url::parse(url).map_err(|_| ResolveError::UnsupportedUrl {
            url: url.to_string(),
        })?;

        let Some(adapter) = self.sources.iter().find(|s| s.handles(&parsed)) else {
            return Err(ResolveError::UnsupportedUrl {
                url: url.to_string(),
            });
        };
        let source = adapter.source();

        let page = adapter.extract_lyrics(parsed.as_str()).await.map_err(|err| {
            log_source_error(source, &err, "lyrics extraction failed");
            ResolveError::ExtractionFailed {
                url: url.to_string(),
                reason: err.to_string(),
            }
        })?;

        let key = page.song_id.map(SongKey::Id).or_else(|| {
            (source == SourceName::Aggregator).then(|| SongKey::Url(parsed.to_string()))
        });
        let record = SongRecord::from_page(source, None, page);
        Ok(self.enrich(record, key).await)
    }

    /// Searches every source concurrently. One source failing never affects
    /// the others; only all of them coming up empty is an error.
    #[instrument(skip(self))]
    pub async fn search_all(&self, name: &str) -> Result<MultiSearch, ResolveError> {
        let searches = self.sources.iter().map(|adapter| async move {
            let outcome = adapter.search(name).await;
            (adapter.source(), outcome)
        });

        let mut candidates = Vec::new();
        let mut per_source = Vec::with_capacity(self.sources.len());

        for (source, outcome) in join_all(searches).await {
            let count = match outcome {
                Ok(found) => {
                    let count = found.len();
                    candidates.extend(found);
                    count
                }
                Err(err) => {
                    log_source_error(source, &err, "search failed");
                    0
                }
            };
            per_source.push(SourceCount { source, count });
        }

        if candidates.is_empty() {
            return Err(ResolveError::NotFound {
                query: name.to_string(),
            });
        }

        Ok(MultiSearch {
            query: name.to_string(),
            candidates,
            per_source,
        })
    }

    async fn enrich(&self, mut record: SongRecord, key: Option<SongKey>) -> SongRecord {
        if let (Some(enricher), Some(key)) = (&self.enricher, key) {
            record.api_metadata = enricher.enrich(&key).await;
        }
        record
    }
}

fn internal(err: impl std::fmt::Display) -> ResolveError {
    ResolveError::Internal(err.to_string())
}

fn log_source_error(source: SourceName, err: &SourceError, message: &str) {
    if err.is_miss() {
        info!(%source, error = %err, "{message}");
    } else {
        warn!(%source, error = %err, "{message}");
    }
}
