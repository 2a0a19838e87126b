use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::core::models::usage::normalize_reset_at;
use crate::core::providers::Provider;

/// Undocumented internal endpoints only answer to a browser-like agent.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Everything that can go wrong inside an adapter. All members stop at the
/// adapter boundary; the coordinator turns them into an empty provider slot.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Not a fault: the resolver found no usable credential source.
    #[error("no usable credential")]
    CredentialAbsent,
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    AuthRejected { status: u16, body: String },
    #[error("response body did not parse as JSON")]
    Parse,
    #[error("local tool unavailable: {0}")]
    ToolUnavailable(String),
}

/// Send a prepared request and return the parsed JSON body.
///
/// Non-success statuses become `AuthRejected` with the body captured for the
/// debug stream; there is no retry within a pass.
pub async fn execute(
    request: reqwest::RequestBuilder,
    provider: Provider,
    debug: bool,
) -> Result<Value, FetchError> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if !status.is_success() {
        if debug {
            eprintln!(
                "[{}] HTTP {}: {}",
                provider.id(),
                status.as_u16(),
                body.chars().take(300).collect::<String>()
            );
        }
        return Err(FetchError::AuthRejected {
            status: status.as_u16(),
            body,
        });
    }

    if debug {
        eprintln!("[{}] response: {}", provider.id(), body);
    }
    serde_json::from_str(&body).map_err(|_| FetchError::Parse)
}

/// Look up a reset timestamp under a primary field name, then an alias.
/// First field present wins; both absent (or unparseable) yields None.
pub fn reset_from(window: &Value, primary: &str, alias: &str) -> Option<DateTime<Utc>> {
    window
        .get(primary)
        .and_then(normalize_reset_at)
        .or_else(|| window.get(alias).and_then(normalize_reset_at))
}
