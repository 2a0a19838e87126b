use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::providers::Provider;

/// Epoch values at or above this are milliseconds; below, seconds.
const EPOCH_MILLIS_THRESHOLD: i64 = 1_000_000_000_000;

/// Fixed values for the demonstration placeholder record, so tests (and
/// humans) can tell it apart from live data.
pub const DEMO_PERCENT: f64 = 45.0;

/// Normalized usage for one provider.
///
/// Serialized camelCase because the snapshot consumer speaks the legacy
/// wire format (`sessionPercent`, `periodResetAt`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    /// Utilization of the short rolling window (0.0 - 100.0).
    pub session_percent: f64,
    /// Utilization of the longer window; equals `session_percent` when the
    /// provider exposes no longer window.
    pub period_percent: f64,
    pub session_reset_at: Option<DateTime<Utc>>,
    pub period_reset_at: Option<DateTime<Utc>>,
    /// Legacy scalar view kept for older consumers: `percent == used`,
    /// `limit` is always 100 (providers report percentages, not quotas).
    pub percent: f64,
    pub used: f64,
    pub limit: f64,
}

impl UsageRecord {
    /// Build a record from a session window and an optional period window,
    /// clamping percentages and applying the period-defaults-to-session rule.
    pub fn from_windows(
        session_percent: f64,
        period_percent: Option<f64>,
        session_reset_at: Option<DateTime<Utc>>,
        period_reset_at: Option<DateTime<Utc>>,
    ) -> Self {
        let session = session_percent.clamp(0.0, 100.0);
        let period = period_percent
            .map(|p| p.clamp(0.0, 100.0))
            .unwrap_or(session);
        let period_reset_at = match period_percent {
            Some(_) => period_reset_at,
            None => session_reset_at,
        };
        Self {
            session_percent: session,
            period_percent: period,
            session_reset_at,
            period_reset_at,
            percent: session,
            used: session,
            limit: 100.0,
        }
    }

    /// "Reachable, but no consumption data available" — a valid state,
    /// distinct from a missing (`None`) slot.
    pub fn connected() -> Self {
        Self::from_windows(0.0, Some(0.0), None, None)
    }

    /// Static placeholder so a first run is never fully empty.
    /// Only substituted when the `demo_data` config flag is set.
    pub fn demo() -> Self {
        Self::from_windows(DEMO_PERCENT, Some(DEMO_PERCENT), None, None)
    }
}

/// Convert a provider-native reset value into an absolute instant.
///
/// Accepts RFC 3339 strings and epoch numbers; epoch seconds and
/// milliseconds are disambiguated by magnitude.
pub fn normalize_reset_at(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) if !s.trim().is_empty() => s.parse::<DateTime<Utc>>().ok(),
        Value::Number(n) => {
            let epoch = n.as_f64().filter(|f| f.is_finite())? as i64;
            let millis = if epoch.abs() >= EPOCH_MILLIS_THRESHOLD {
                epoch
            } else {
                epoch.checked_mul(1000)?
            };
            Utc.timestamp_millis_opt(millis).single()
        }
        _ => None,
    }
}

/// The complete per-provider result set from one aggregation pass.
///
/// `None` means "no usable credential or fetch failed" for that provider.
/// A snapshot always reflects a single pass in full.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedSnapshot {
    pub anthropic: Option<UsageRecord>,
    pub openai: Option<UsageRecord>,
    pub gemini: Option<UsageRecord>,
    pub fetched_at: DateTime<Utc>,
}

impl AggregatedSnapshot {
    pub fn new(
        anthropic: Option<UsageRecord>,
        openai: Option<UsageRecord>,
        gemini: Option<UsageRecord>,
    ) -> Self {
        Self {
            anthropic,
            openai,
            gemini,
            fetched_at: Utc::now(),
        }
    }

    pub fn get(&self, provider: Provider) -> Option<&UsageRecord> {
        match provider {
            Provider::Anthropic => self.anthropic.as_ref(),
            Provider::OpenAi => self.openai.as_ref(),
            Provider::Gemini => self.gemini.as_ref(),
        }
    }
}
