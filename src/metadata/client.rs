use reqwest::{
    Client, ClientBuilder,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue},
};
use std::time::Duration;
use tracing::{Instrument, Span, debug, info_span, warn};
use url::Url;

use crate::fetcher::FetchError;
use crate::metadata::{
    errors::MetadataUnavailable,
    types::{ApiMetadata, SongEnvelope, SongKey},
};

const USER_AGENT: &str = concat!("lyrics-engine/", env!("CARGO_PKG_VERSION"));

/// Client for the aggregator's official API, used only to decorate an
/// already-resolved song. Lookups never fail from the caller's view: any
/// problem is logged and the answer is `None`.
#[derive(Debug, Clone)]
pub struct MetadataEnricher {
    client: Client,
    api_base: Url,
    has_token: bool,
    sample_when_unconfigured: bool,
    span: Span,
}

impl MetadataEnricher {
    pub fn new(
        api_base: Url,
        token: Option<&str>,
        timeout: Duration,
        sample_when_unconfigured: bool,
    ) -> Result<Self, FetchError> {
        let span = info_span!("metadata_enricher", api = %api_base);
        let token = token.map(str::trim).filter(|t| !t.is_empty());

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| FetchError::Client(format!("invalid access token: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        } else {
            span.in_scope(|| {
                warn!("GENIUS_ACCESS_TOKEN is not set, song metadata will not be fetched")
            });
        }

        let client = ClientBuilder::new()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            api_base,
            has_token: token.is_some(),
            sample_when_unconfigured,
            span,
        })
    }

    pub fn has_credential(&self) -> bool {
        self.has_token
    }

    pub async fn enrich(&self, key: &SongKey) -> Option<ApiMetadata> {
        let span = tracing::debug_span!(parent: &self.span, "enrich", key = %key);

        async move {
            match self.lookup(key).await {
                Ok(metadata) => Some(metadata),
                Err(MetadataUnavailable::MissingCredential) if self.sample_when_unconfigured => {
                    debug!("no credential, returning sample metadata");
                    Some(ApiMetadata::sample())
                }
                // already announced once at construction
                Err(MetadataUnavailable::MissingCredential) => None,
                Err(err) => {
                    warn!(error = %err, "metadata unavailable");
                    None
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn lookup(&self, key: &SongKey) -> Result<ApiMetadata, MetadataUnavailable> {
        if !self.has_token {
            return Err(MetadataUnavailable::MissingCredential);
        }

        let id = key
            .song_id()
            .ok_or_else(|| MetadataUnavailable::UnresolvableKey(key.to_string()))?;

        let url = self
            .api_base
            .join(&format!("songs/{id}"))
            .map_err(|e| MetadataUnavailable::Transport(e.to_string()))?;

        let response = self
            .client
            .get(url)
            .query(&[("text_format", "plain")])
            .send()
            .await
            .map_err(|e| MetadataUnavailable::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetadataUnavailable::from_status(status));
        }

        let envelope: SongEnvelope = response
            .json()
            .await
            .map_err(|e| MetadataUnavailable::Decode(e.to_string()))?;

        Ok(envelope.response.song.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MetadataOrigin;

    fn enricher(token: Option<&str>, sample: bool) -> MetadataEnricher {
        MetadataEnricher::new(
            Url::parse("https://api.genius.com/").unwrap(),
            token,
            Duration::from_secs(1),
            sample,
        )
        .unwrap()
    }

    #[test]
    fn test_blank_token_counts_as_missing() {
        assert!(!enricher(Some("   "), false).has_credential());
        assert!(enricher(Some("abc"), false).has_credential());
    }

    #[tokio::test]
    async fn test_no_credential_yields_none() {
        assert_eq!(enricher(None, false).enrich(&SongKey::Id(1)).await, None);
    }

    #[tokio::test]
    async fn test_no_credential_with_sample_flag() {
        let metadata = enricher(None, true).enrich(&SongKey::Id(1)).await.unwrap();
        assert_eq!(metadata.origin, MetadataOrigin::Sample);
        assert_eq!(metadata.title, "Not Like Us");
    }

    #[tokio::test]
    async fn test_unresolvable_url_yields_none() {
        let enricher = enricher(Some("token"), false);
        let key = SongKey::Url("https://genius.com/Artist-song-lyrics".to_string());
        assert_eq!(enricher.enrich(&key).await, None);
    }
}
