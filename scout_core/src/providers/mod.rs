//! HTTP-backed provider clients.
//!
//! Each vendor module translates one API into `NormalizedResult`,
//! `SearchHit` or `HistoricalSeries`. Shared request plumbing lives here.

pub mod anthropic;
pub mod chat_completions;
pub mod cohere;
pub mod exa;
pub mod gemini;
pub mod historical;
pub mod huggingface;
pub mod images;
pub mod ollama;
pub mod searchapi;
pub mod serpapi;
pub mod tavily;
pub mod you;

use crate::error::ProviderError;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("scout/", env!("CARGO_PKG_VERSION"));

/// Maximum body length kept in upstream error messages.
const ERROR_BODY_LIMIT: usize = 300;

/// Build the shared HTTP client used by every provider.
pub fn http_client() -> Result<Client, ProviderError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| ProviderError::Config(format!("failed to build HTTP client: {}", e)))
}

/// Send a request and decode a JSON body, mapping non-2xx statuses to
/// `ProviderError::Upstream`.
pub(crate) async fn send_json(
    provider: &str,
    request: RequestBuilder,
    timeout: Duration,
) -> Result<Value, ProviderError> {
    let resp = request.timeout(timeout).send().await.map_err(|e| {
        if e.is_timeout() {
            ProviderError::Timeout(format!("{} after {}s", provider, timeout.as_secs()))
        } else {
            ProviderError::HttpRequest(e)
        }
    })?;

    let status = resp.status();
    let body = resp.text().await.map_err(ProviderError::HttpRequest)?;
    debug!(
        target: "scout.providers",
        provider,
        status = status.as_u16(),
        bytes = body.len(),
        "provider response"
    );

    if !status.is_success() {
        return Err(ProviderError::Upstream {
            status: status.as_u16(),
            body: truncate_chars(&body, ERROR_BODY_LIMIT),
        });
    }

    serde_json::from_str(&body)
        .map_err(|e| ProviderError::MalformedResponse(format!("{}: {}", provider, e)))
}

/// Pull a non-empty string out of a JSON value by pointer.
pub(crate) fn required_text(
    provider: &str,
    value: &Value,
    pointer: &str,
) -> Result<String, ProviderError> {
    match value.pointer(pointer) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Value::String(_)) => Err(ProviderError::EmptyResponse(provider.to_string())),
        Some(_) | None => Err(ProviderError::MalformedResponse(format!(
            "{}: missing {}",
            provider, pointer
        ))),
    }
}

pub(crate) fn str_field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(|v| v.as_str()).unwrap_or("")
}

/// Host of a url without a leading `www.`; empty when the url doesn't parse.
pub fn extract_domain(raw: &str) -> String {
    url::Url::parse(raw)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        .unwrap_or_default()
}

/// Decode HTML entities and collapse whitespace in provider text.
pub fn clean_text(raw: &str) -> String {
    let decoded = html_escape::decode_html_entities(raw);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `max` characters on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_domain() {
        assert_eq!(extract_domain("https://www.nature.com/articles/x"), "nature.com");
        assert_eq!(extract_domain("http://data.gov"), "data.gov");
        assert_eq!(extract_domain("not a url"), "");
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(
            clean_text("Rust &amp; Go\n\n  compared"),
            "Rust & Go compared"
        );
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn test_required_text() {
        let value = json!({"choices": [{"message": {"content": " hi "}}], "empty": ""});
        assert_eq!(
            required_text("X", &value, "/choices/0/message/content").unwrap(),
            "hi"
        );
        assert!(matches!(
            required_text("X", &value, "/empty"),
            Err(ProviderError::EmptyResponse(_))
        ));
        assert!(matches!(
            required_text("X", &value, "/missing"),
            Err(ProviderError::MalformedResponse(_))
        ));
    }
}
