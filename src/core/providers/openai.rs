use chrono::Utc;
use serde_json::Value;

use crate::core::credentials::ResolvedCredential;
use crate::core::models::usage::UsageRecord;
use crate::core::providers::fetch::{execute, reset_from, FetchError, BROWSER_USER_AGENT};
use crate::core::providers::Provider;

const INTERNAL_USAGE_URL: &str = "https://chatgpt.com/backend-api/codex/usage";

/// Fetch OpenAI/Codex usage.
///
/// The endpoint is chosen by credential *shape*, not configuration: an
/// `sk-` secret goes to the official organization usage API, anything else
/// (OAuth tokens, locally discovered CLI tokens) goes to the undocumented
/// ChatGPT backend endpoint, which requires a browser-like User-Agent.
pub async fn fetch(
    client: &reqwest::Client,
    credential: &ResolvedCredential,
    debug: bool,
) -> Result<UsageRecord, FetchError> {
    let token = match credential {
        ResolvedCredential::Secret(s) => s,
        ResolvedCredential::LocalToken(t) => t,
        _ => return Err(FetchError::CredentialAbsent),
    };

    let is_api_key = token.starts_with("sk-");
    let mut request = if is_api_key {
        let today = Utc::now().format("%Y-%m-%d");
        client.get(format!(
            "https://api.openai.com/v1/organization/usage?date={}",
            today
        ))
    } else {
        client
            .get(INTERNAL_USAGE_URL)
            .header("User-Agent", BROWSER_USER_AGENT)
    };
    request = request
        .header("Authorization", format!("Bearer {}", token))
        .header("Content-Type", "application/json");

    let body = execute(request, Provider::OpenAi, debug).await?;
    Ok(parse_usage(&body))
}

/// Match known response shapes in descending specificity. An answered but
/// unrecognized body yields the degraded "connected" record, keeping
/// "reachable" distinct from "unreachable".
pub fn parse_usage(body: &Value) -> UsageRecord {
    parse_rate_limit_shape(body)
        .or_else(|| parse_legacy_shape(body))
        .or_else(|| parse_generic_shape(body))
        .unwrap_or_else(UsageRecord::connected)
}

/// Primary shape:
/// `{ "rate_limit": { "primary_window": { "used_percent": 2, "reset_at": ... },
///                    "secondary_window": { "used_percent": 12, ... } } }`
fn parse_rate_limit_shape(body: &Value) -> Option<UsageRecord> {
    let rate_limit = body.get("rate_limit")?;
    let primary = rate_limit.get("primary_window")?;
    let session_percent = primary.get("used_percent")?.as_f64()?;
    let session_reset = reset_from(primary, "reset_at", "resets_at");

    let secondary = rate_limit.get("secondary_window");
    let period_percent =
        secondary.and_then(|w| w.get("used_percent")).and_then(Value::as_f64);
    // A secondary window without its own reset inherits the primary's.
    let period_reset = secondary
        .and_then(|w| reset_from(w, "reset_at", "resets_at"))
        .or(session_reset);

    Some(UsageRecord::from_windows(
        session_percent,
        period_percent,
        session_reset,
        period_percent.and_then(|_| period_reset),
    ))
}

/// Legacy shape: `{ "five_hour_limit": { "remaining_percent": 60 } }`
fn parse_legacy_shape(body: &Value) -> Option<UsageRecord> {
    let remaining = body
        .get("five_hour_limit")?
        .get("remaining_percent")?
        .as_f64()?;
    Some(UsageRecord::from_windows(100.0 - remaining, None, None, None))
}

/// Generic shape: `{ "usage": { "percent": 12 } }`
fn parse_generic_shape(body: &Value) -> Option<UsageRecord> {
    let percent = body.get("usage")?.get("percent")?.as_f64()?;
    Some(UsageRecord::from_windows(percent, None, None, None))
}
