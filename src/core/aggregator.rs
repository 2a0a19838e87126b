use std::time::Duration;

use crate::core::config::AppConfig;
use crate::core::credentials::{self, ResolvedCredential};
use crate::core::models::usage::{AggregatedSnapshot, UsageRecord};
use crate::core::providers::fetch::FetchError;
use crate::core::providers::{anthropic, gemini, openai, Provider};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Fans out to all provider adapters concurrently and assembles their
/// results into one snapshot. One misbehaving provider never blocks or
/// corrupts the others' slots.
pub struct Aggregator {
    client: reqwest::Client,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregator {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { client }
    }

    /// One aggregation pass: resolve credentials, fetch all three providers
    /// in parallel, assemble the snapshot.
    pub async fn run_pass_with(&self, config: &AppConfig) -> AggregatedSnapshot {
        let debug = config.debug;

        let anthropic_cred = credentials::resolve(Provider::Anthropic, config);
        let openai_cred = credentials::resolve(Provider::OpenAi, config);
        let gemini_cred = credentials::resolve(Provider::Gemini, config);
        let openai_unconfigured = openai_cred.is_none();

        let (anthropic_slot, openai_slot, gemini_slot) = tokio::join!(
            self.fetch_one(Provider::Anthropic, anthropic_cred, debug),
            self.fetch_one(Provider::OpenAi, openai_cred, debug),
            self.fetch_one(Provider::Gemini, gemini_cred, debug),
        );

        let mut snapshot = AggregatedSnapshot::new(anthropic_slot, openai_slot, gemini_slot);
        apply_demo_fallback(&mut snapshot, openai_unconfigured, config);
        snapshot
    }

    async fn fetch_one(
        &self,
        provider: Provider,
        credential: Option<ResolvedCredential>,
        debug: bool,
    ) -> Option<UsageRecord> {
        let outcome = match &credential {
            None => Err(FetchError::CredentialAbsent),
            Some(cred) => match provider {
                Provider::Anthropic => anthropic::fetch(&self.client, cred, debug).await,
                Provider::OpenAi => openai::fetch(&self.client, cred, debug).await,
                Provider::Gemini => gemini::fetch(cred, debug).await,
            },
        };
        slot(provider, outcome, debug)
    }
}

/// Convert an adapter outcome into a snapshot slot. Every taxonomy member
/// is absorbed here; nothing propagates upward as a hard failure.
pub fn slot(
    provider: Provider,
    outcome: Result<UsageRecord, FetchError>,
    debug: bool,
) -> Option<UsageRecord> {
    match outcome {
        Ok(record) => Some(record),
        Err(FetchError::CredentialAbsent) => {
            if debug {
                eprintln!("[{}] no usable credential", provider.id());
            }
            None
        }
        Err(err) => {
            if debug {
                eprintln!("[{}] fetch failed: {}", provider.id(), err);
            }
            None
        }
    }
}

/// Substitute the fixed demonstration record for OpenAI when the slot is
/// empty, no credential of any kind was resolvable, and the `demo_data`
/// flag opts in. Gated off by default so live `None` is never faked.
fn apply_demo_fallback(
    snapshot: &mut AggregatedSnapshot,
    openai_unconfigured: bool,
    config: &AppConfig,
) {
    if config.demo_data && openai_unconfigured && snapshot.openai.is_none() {
        snapshot.openai = Some(UsageRecord::demo());
    }
}
