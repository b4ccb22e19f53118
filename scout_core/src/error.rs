// src/error.rs

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("Upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Empty response from {0}")]
    EmptyResponse(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("All {0} providers failed")]
    AllProvidersExhausted(usize),

    #[error("Insufficient content to summarize")]
    InsufficientContent,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl ProviderError {
    pub fn code_str(&self) -> &'static str {
        match self {
            ProviderError::Unavailable(_) => "unavailable",
            ProviderError::HttpRequest(e) if e.is_timeout() => "timeout",
            ProviderError::HttpRequest(_) => "upstream_error",
            ProviderError::Upstream { status, .. } if *status == 401 || *status == 403 => {
                "auth_failed"
            }
            ProviderError::Upstream { status, .. } if *status == 429 => "rate_limited",
            ProviderError::Upstream { .. } => "upstream_error",
            ProviderError::Timeout(_) => "timeout",
            ProviderError::EmptyResponse(_) => "empty_response",
            ProviderError::MalformedResponse(_) => "malformed_response",
            ProviderError::AllProvidersExhausted(_) => "exhausted",
            ProviderError::InsufficientContent => "insufficient_content",
            ProviderError::Io(_) => "io_error",
            ProviderError::SerdeJson(_) | ProviderError::Yaml(_) => "parse_error",
            ProviderError::Cache(_) => "cache_error",
            ProviderError::Config(_) => "invalid_config",
            ProviderError::Other(_) => "internal_error",
        }
    }

    /// True for failures that belong to a single provider call and should
    /// move the chain on to the next provider.
    pub fn is_call_failure(&self) -> bool {
        matches!(
            self,
            ProviderError::HttpRequest(_)
                | ProviderError::Upstream { .. }
                | ProviderError::Timeout(_)
                | ProviderError::EmptyResponse(_)
                | ProviderError::MalformedResponse(_)
                | ProviderError::SerdeJson(_)
        )
    }
}
