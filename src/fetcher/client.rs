use crate::fetcher::{
    errors::FetchError, identity::Identity, pipeline::process_response, types::RawDocument,
};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::{debug, instrument};

const MAX_BODY_SIZE: u64 = 5 * 1024 * 1024; // 5MB
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub const DEFAULT_BLOCK_MARKERS: &[&str] = &["captcha", "access denied", "blocked"];

/// Single-shot page fetcher. Applies one identity per call and never retries.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    block_markers: Vec<String>,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_block_markers(DEFAULT_BLOCK_MARKERS.iter().map(|m| m.to_string()).collect())
    }

    pub fn with_block_markers(block_markers: Vec<String>) -> Result<Self, FetchError> {
        let client = ClientBuilder::new()
            .connect_timeout(CONNECT_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            block_markers: block_markers
                .into_iter()
                .map(|m| m.trim().to_lowercase())
                .filter(|m| !m.is_empty())
                .collect(),
        })
    }

    pub fn block_markers(&self) -> &[String] {
        &self.block_markers
    }

    #[instrument(skip_all, fields(url = %url))]
    pub async fn fetch(
        &self,
        url: &str,
        identity: &Identity,
        timeout: Duration,
    ) -> Result<RawDocument, FetchError> {
        let parsed_url = url::Url::parse(url)?;

        let response = self
            .client
            .get(parsed_url)
            .headers(identity.header_map()?)
            .timeout(timeout)
            .send()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        // Check content length before downloading
        if let Some(content_length) = response.content_length()
            && content_length > MAX_BODY_SIZE
        {
            return Err(FetchError::BodyTooLarge(content_length));
        }

        let final_url = response.url().clone();
        let status = response.status();
        let headers = response.headers().clone();

        if !status.is_success() {
            debug!(status = status.as_u16(), "non-success status");
            return Err(FetchError::Http { status });
        }

        let content_type = headers
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or("text/html")
            .to_string();

        if !is_supported_content_type(&content_type) {
            return Err(FetchError::UnsupportedContentType(content_type));
        }

        let body_bytes = response
            .bytes()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        // Content-Length may be missing or wrong
        if body_bytes.len() as u64 > MAX_BODY_SIZE {
            return Err(FetchError::BodyTooLarge(body_bytes.len() as u64));
        }

        process_response(
            final_url,
            status,
            headers,
            body_bytes,
            &content_type,
            &self.block_markers,
        )
    }
}

fn is_supported_content_type(content_type: &str) -> bool {
    content_type.starts_with("text/")
        || content_type.contains("application/xhtml")
        || content_type.contains("application/json")
}
