#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Response body is not valid JSON: {0}")]
    BodyParse(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),

    #[error("Cannot resolve relative URI '{0}': session has no host configured")]
    MissingHost(String),

    #[error("Redirect chain exceeded {limit} hops")]
    TooManyRedirects { limit: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store backend error: {0}")]
    Backend(#[from] redis::RedisError),

    #[error("Stored session record is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}
