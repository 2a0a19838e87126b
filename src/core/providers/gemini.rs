use serde_json::Value;
use std::time::Duration;

use crate::core::credentials::ResolvedCredential;
use crate::core::models::usage::UsageRecord;
use crate::core::process::run_command;
use crate::core::providers::fetch::FetchError;

/// Services whose presence means Gemini is usable from this machine:
/// Gemini Code Assist, or the Vertex AI Gemini API.
const SERVICE_FILTER: &str =
    "config.name:(cloudaicompanion.googleapis.com OR aiplatform.googleapis.com)";

const GCLOUD_TIMEOUT: Duration = Duration::from_secs(5);

/// Fetch Gemini usage.
///
/// There is no metering endpoint reachable with either credential kind, so
/// both paths produce at most a "connected" marker: a configured key is
/// taken at face value, and the credential-less path asks the local gcloud
/// CLI whether a Gemini service is enabled in the active project.
pub async fn fetch(
    credential: &ResolvedCredential,
    debug: bool,
) -> Result<UsageRecord, FetchError> {
    match credential {
        ResolvedCredential::Secret(_) => Ok(UsageRecord::connected()),
        ResolvedCredential::CliProbe => probe_gcloud(debug).await,
        _ => Err(FetchError::CredentialAbsent),
    }
}

async fn probe_gcloud(debug: bool) -> Result<UsageRecord, FetchError> {
    if debug {
        eprintln!("[gemini] probing gcloud for enabled Gemini services");
    }
    let filter = format!("--filter={}", SERVICE_FILTER);
    let stdout = run_command(
        "gcloud",
        &["services", "list", "--enabled", &filter, "--format=json"],
        GCLOUD_TIMEOUT,
    )
    .await?;

    match parse_service_list(&stdout) {
        Some(true) => Ok(UsageRecord::connected()),
        Some(false) => Err(FetchError::ToolUnavailable(
            "no Gemini service enabled in the active gcloud project".to_string(),
        )),
        None => Err(FetchError::ToolUnavailable(
            "unreadable gcloud service list output".to_string(),
        )),
    }
}

/// Whether the `gcloud services list` JSON output names at least one service.
fn parse_service_list(stdout: &str) -> Option<bool> {
    if stdout.trim().is_empty() {
        return Some(false);
    }
    let value: Value = serde_json::from_str(stdout).ok()?;
    value.as_array().map(|services| !services.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_list_with_entries_means_connected() {
        let stdout = r#"[{"config": {"name": "cloudaicompanion.googleapis.com"}}]"#;
        assert_eq!(parse_service_list(stdout), Some(true));
    }

    #[test]
    fn empty_service_list_means_not_enabled() {
        assert_eq!(parse_service_list("[]"), Some(false));
        assert_eq!(parse_service_list("   "), Some(false));
    }

    #[test]
    fn garbage_output_is_unreadable() {
        assert_eq!(parse_service_list("ERROR: not logged in"), None);
        assert_eq!(parse_service_list(r#"{"not": "an array"}"#), None);
    }

    #[tokio::test]
    async fn secret_credential_yields_connected_marker() {
        let cred = ResolvedCredential::Secret("g-key".into());
        let record = fetch(&cred, false).await.unwrap();
        assert_eq!(record, UsageRecord::connected());
    }

    #[tokio::test]
    async fn web_session_credential_is_rejected() {
        let cred = ResolvedCredential::WebSession {
            cookie: "c".into(),
            org_id: "o".into(),
        };
        let err = fetch(&cred, false).await.unwrap_err();
        assert!(matches!(err, FetchError::CredentialAbsent));
    }
}
