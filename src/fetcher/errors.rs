use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("request timeout")]
    Timeout,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("http error {status}")]
    Http { status: reqwest::StatusCode },

    #[error("blocked by source (matched {marker:?})")]
    Blocked { marker: String },

    #[error("body too large ({0} bytes)")]
    BodyTooLarge(u64),

    #[error("unsupported content-type: {0}")]
    UnsupportedContentType(String),

    #[error("charset error: {0}")]
    Charset(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("failed to build http client: {0}")]
    Client(String),

    #[error("invalid identity: {0}")]
    InvalidIdentity(String),

    #[error("unknown: {0}")]
    Unknown(String),
}

impl FetchError {
    /// True when the source refused us rather than failed: a challenge page
    /// served with 200, or an explicit 403. These are the only failures that
    /// earn a retry with a rotated identity.
    pub fn is_blocked(&self) -> bool {
        match self {
            Self::Blocked { .. } => true,
            Self::Http { status } => *status == reqwest::StatusCode::FORBIDDEN,
            _ => false,
        }
    }

    pub fn from_reqwest_error(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if let Some(status) = err.status() {
            Self::Http { status }
        } else if err.is_connect() || err.is_request() || err.is_redirect() {
            // DNS, refused connections, redirect loops
            Self::Connection(err.to_string())
        } else if err.is_body() || err.is_decode() {
            Self::Io(err.to_string())
        } else {
            Self::Unknown(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_blocked_classification() {
        assert!(
            FetchError::Blocked {
                marker: "captcha".to_string()
            }
            .is_blocked()
        );
        assert!(FetchError::Http { status: StatusCode::FORBIDDEN }.is_blocked());

        assert!(!FetchError::Http { status: StatusCode::NOT_FOUND }.is_blocked());
        assert!(!FetchError::Timeout.is_blocked());
        assert!(!FetchError::Connection("refused".to_string()).is_blocked());
    }
}
