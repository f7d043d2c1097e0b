use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid response from {backend}: {details}")]
    BackendResponse { backend: String, details: String },

    #[error("{service} call failed: {details}")]
    Service {
        service: &'static str,
        details: String,
    },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("request failed: {0}")]
    Request(String),
}

impl StoreError {
    pub fn service(service: &'static str, details: impl Into<String>) -> Self {
        Self::Service {
            service,
            details: details.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("invalid storage event: {0}")]
    InvalidEvent(String),

    #[error("cannot read object s3://{bucket}/{key}: {source}")]
    ObjectUnavailable {
        bucket: String,
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("label detection failed: {0}")]
    LabelDetection(#[source] StoreError),

    #[error("indexing failed: {0}")]
    Index(#[source] StoreError),
}
