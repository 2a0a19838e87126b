use serde_json::Value;

use crate::core::credentials::ResolvedCredential;
use crate::core::models::usage::UsageRecord;
use crate::core::providers::fetch::{execute, reset_from, FetchError, BROWSER_USER_AGENT};
use crate::core::providers::Provider;

/// Longer-window keys the internal usage endpoint has been seen returning,
/// in descending preference.
const PERIOD_KEYS: [&str; 5] = ["month", "monthly", "seven_day", "week", "daily"];

/// Fetch Anthropic usage.
///
/// Web sessions hit the undocumented claude.ai usage endpoint (the only
/// place utilization percentages are exposed). A direct API key has no
/// public metering endpoint, so it only yields a "connected" marker.
pub async fn fetch(
    client: &reqwest::Client,
    credential: &ResolvedCredential,
    debug: bool,
) -> Result<UsageRecord, FetchError> {
    match credential {
        ResolvedCredential::Secret(_) => Ok(UsageRecord::connected()),
        ResolvedCredential::WebSession { cookie, org_id } => {
            fetch_web_usage(client, cookie, org_id, debug).await
        }
        _ => Err(FetchError::CredentialAbsent),
    }
}

async fn fetch_web_usage(
    client: &reqwest::Client,
    cookie: &str,
    org_id: &str,
    debug: bool,
) -> Result<UsageRecord, FetchError> {
    let url = format!("https://claude.ai/api/organizations/{}/usage", org_id);
    let request = client
        .get(&url)
        .header("Cookie", cookie)
        .header("User-Agent", BROWSER_USER_AGENT);

    let body = execute(request, Provider::Anthropic, debug).await?;
    Ok(parse_usage(&body))
}

/// Match the response against known shapes, most specific first. A body
/// that matches nothing still means the endpoint answered, so the degraded
/// "connected" record keeps that state distinct from an outage.
pub fn parse_usage(body: &Value) -> UsageRecord {
    parse_window_shape(body)
        .or_else(|| parse_generic_shape(body))
        .unwrap_or_else(UsageRecord::connected)
}

/// Primary shape: `{ "five_hour": { "utilization": 26, "resets_at": ... }, ... }`
fn parse_window_shape(body: &Value) -> Option<UsageRecord> {
    let five_hour = body.get("five_hour")?;
    let session_percent = five_hour.get("utilization")?.as_f64()?;
    let session_reset = reset_from(five_hour, "resets_at", "reset_at");

    let period = PERIOD_KEYS.iter().find_map(|key| {
        let window = body.get(key)?;
        let percent = window.get("utilization")?.as_f64()?;
        Some((percent, reset_from(window, "resets_at", "reset_at")))
    });

    let (period_percent, period_reset) = match period {
        Some((percent, reset)) => (Some(percent), reset),
        None => (None, None),
    };

    Some(UsageRecord::from_windows(
        session_percent,
        period_percent,
        session_reset,
        period_reset,
    ))
}

/// Generic fallback shape: `{ "usage": { "percent": 12 } }`
fn parse_generic_shape(body: &Value) -> Option<UsageRecord> {
    let percent = body.get("usage")?.get("percent")?.as_f64()?;
    Some(UsageRecord::from_windows(percent, None, None, None))
}
