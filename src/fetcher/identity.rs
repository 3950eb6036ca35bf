//! Browser identities presented to sources, and the pool that rotates them.

use crate::fetcher::errors::FetchError;
use once_cell::sync::Lazy;
use rand::Rng;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

/// The outbound header set that makes a request look like a real browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_agent: String,
    pub accept_language: String,
    #[serde(default)]
    pub referer: Option<String>,
}

impl Identity {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            accept_language: "en-US,en;q=0.9".to_string(),
            referer: Some("https://www.google.com/".to_string()),
        }
    }

    pub fn with_accept_language(mut self, accept_language: impl Into<String>) -> Self {
        self.accept_language = accept_language.into();
        self
    }

    pub fn header_map(&self) -> Result<HeaderMap, FetchError> {
        let mut headers = HeaderMap::new();
        insert(&mut headers, header::USER_AGENT, &self.user_agent)?;
        insert(&mut headers, header::ACCEPT, ACCEPT_HTML)?;
        insert(&mut headers, header::ACCEPT_LANGUAGE, &self.accept_language)?;
        if let Some(referer) = &self.referer {
            insert(&mut headers, header::REFERER, referer)?;
        }
        headers.insert(header::DNT, HeaderValue::from_static("1"));
        headers.insert(
            header::UPGRADE_INSECURE_REQUESTS,
            HeaderValue::from_static("1"),
        );
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        Ok(headers)
    }
}

fn insert(headers: &mut HeaderMap, name: HeaderName, value: &str) -> Result<(), FetchError> {
    let value = HeaderValue::from_str(value)
        .map_err(|e| FetchError::InvalidIdentity(format!("{name}: {e}")))?;
    headers.insert(name, value);
    Ok(())
}

/// Fixed, read-only pool of identities.
#[derive(Debug, Clone)]
pub struct IdentityPool {
    identities: Vec<Identity>,
}

impl IdentityPool {
    /// Duplicates are dropped so that `next(Some(x))` can always return
    /// something other than `x` once there are two members.
    pub fn new(identities: Vec<Identity>) -> Result<Self, FetchError> {
        let mut unique: Vec<Identity> = Vec::with_capacity(identities.len());
        for identity in identities {
            if identity.user_agent.trim().is_empty() {
                return Err(FetchError::InvalidIdentity(
                    "empty user-agent".to_string(),
                ));
            }
            identity.header_map()?;
            if !unique.contains(&identity) {
                unique.push(identity);
            }
        }

        if unique.is_empty() {
            return Err(FetchError::InvalidIdentity(
                "identity pool is empty".to_string(),
            ));
        }

        Ok(Self { identities: unique })
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    pub fn identities(&self) -> &[Identity] {
        &self.identities
    }

    /// Random pick without `previous`; with it, the member after `previous`
    /// in pool order. A `previous` from outside the pool gets a random pick.
    pub fn next(&self, previous: Option<&Identity>) -> &Identity {
        let position = previous.and_then(|prev| self.identities.iter().position(|i| i == prev));

        let index = match position {
            Some(current) => (current + 1) % self.identities.len(),
            None => rand::thread_rng().gen_range(0..self.identities.len()),
        };

        &self.identities[index]
    }
}

impl Default for IdentityPool {
    fn default() -> Self {
        DEFAULT_POOL.clone()
    }
}

static DEFAULT_POOL: Lazy<IdentityPool> = Lazy::new(|| IdentityPool {
    identities: DEFAULT_USER_AGENTS
        .iter()
        .map(|ua| Identity::new(*ua))
        .collect(),
});

const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14.4; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36 Edg/124.0.2478.67",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Mobile/15E148 Safari/604.1",
];
