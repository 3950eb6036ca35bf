use crate::fetcher::{
    client::HttpFetcher,
    errors::FetchError,
    identity::{Identity, IdentityPool},
    types::RawDocument,
};
use std::{sync::Arc, time::Duration};
use tracing::{info, instrument, warn};

const DEFAULT_RETRY_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug)]
pub struct Fetched {
    pub document: RawDocument,
    pub identity: Identity,
    pub attempts: u8,
}

/// Fetcher plus identity pool, implementing the retry-on-block policy: a
/// block page or 403 earns exactly one more attempt under a different
/// identity. Anything else surfaces immediately.
#[derive(Debug, Clone)]
pub struct RotatingFetcher {
    fetcher: HttpFetcher,
    identities: Arc<IdentityPool>,
    retry_timeout: Duration,
}

impl RotatingFetcher {
    pub fn new(fetcher: HttpFetcher, identities: Arc<IdentityPool>) -> Self {
        Self {
            fetcher,
            identities,
            retry_timeout: DEFAULT_RETRY_TIMEOUT,
        }
    }

    /// The rotated attempt gets at least this long, whatever the caller's
    /// first-attempt timeout was.
    pub fn with_retry_timeout(mut self, retry_timeout: Duration) -> Self {
        self.retry_timeout = retry_timeout;
        self
    }

    pub fn identities(&self) -> &IdentityPool {
        &self.identities
    }

    #[instrument(skip(self, timeout))]
    pub async fn fetch(&self, url: &str, timeout: Duration) -> Result<Fetched, FetchError> {
        let first = self.identities.next(None).clone();

        match self.fetcher.fetch(url, &first, timeout).await {
            Ok(document) => Ok(Fetched {
                document,
                identity: first,
                attempts: 1,
            }),
            Err(err) if err.is_blocked() => {
                let rotated = self.identities.next(Some(&first)).clone();
                warn!(error = %err, "blocked, retrying once with rotated identity");

                let document = self
                    .fetcher
                    .fetch(url, &rotated, timeout.max(self.retry_timeout))
                    .await
                    .inspect_err(|e| warn!(error = %e, "retry with rotated identity failed"))?;

                info!("rotated identity accepted");
                Ok(Fetched {
                    document,
                    identity: rotated,
                    attempts: 2,
                })
            }
            Err(err) => Err(err),
        }
    }
}
