use regex::Regex;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::core::config::AppConfig;
use crate::core::process::which;
use crate::core::providers::Provider;

/// One usable credential source, selected by deterministic priority.
/// Only one source is active per poll; sources are never merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedCredential {
    /// Explicit secret entered by the user.
    Secret(String),
    /// Cookie + org id captured once through the external login flow.
    WebSession { cookie: String, org_id: String },
    /// Token discovered in the local Codex CLI directory.
    LocalToken(String),
    /// No application-level credential; probe the local gcloud CLI instead.
    CliProbe,
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Resolve the credential for one provider, first match wins:
/// direct secret, then session pair, then local CLI token, then CLI probe.
/// Filesystem and parse failures degrade to "source absent" — this layer
/// never errors.
pub fn resolve(provider: Provider, config: &AppConfig) -> Option<ResolvedCredential> {
    match provider {
        Provider::Anthropic => non_empty(&config.anthropic_key)
            .map(ResolvedCredential::Secret)
            .or_else(|| {
                if config.anthropic_mode != "web" {
                    return None;
                }
                let cookie = non_empty(&config.anthropic_web_cookie)?;
                let org_id = non_empty(&config.anthropic_org_id)?;
                Some(ResolvedCredential::WebSession { cookie, org_id })
            }),
        Provider::OpenAi => non_empty(&config.openai_key)
            .map(ResolvedCredential::Secret)
            .or_else(|| read_codex_token().map(ResolvedCredential::LocalToken)),
        Provider::Gemini => non_empty(&config.gemini_key)
            .map(ResolvedCredential::Secret)
            .or_else(|| which("gcloud").map(|_| ResolvedCredential::CliProbe)),
    }
}

fn codex_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("~"))
        .join(".codex")
}

/// Discover a token managed by the local Codex CLI: auth.json first (the
/// primary auth artifact), then config.toml as a generic fallback.
pub fn read_codex_token() -> Option<String> {
    read_codex_token_from(&codex_dir())
}

fn read_codex_token_from(dir: &Path) -> Option<String> {
    read_auth_json_token(&dir.join("auth.json"))
        .or_else(|| read_config_toml_token(&dir.join("config.toml")))
}

/// Nested locations an access/session token may live at inside auth.json,
/// in priority order.
fn read_auth_json_token(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    let json: Value = serde_json::from_str(&content).ok()?;

    let candidates = [
        &json["access_token"],
        &json["session_token"],
        &json["tokens"]["access_token"],
        &json["default"]["access_token"],
    ];
    let token = candidates
        .into_iter()
        .find_map(|v| v.as_str().and_then(non_empty));
    token
}

/// Best-effort textual extraction of `api_key = "..."` or
/// `access_token = "..."` from the CLI's TOML config. Deliberately lossy:
/// it only recognizes single-line string assignments and ignores sections,
/// which is enough for the files the CLI actually writes.
fn read_config_toml_token(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    for key in ["api_key", "access_token"] {
        let pattern = format!(r#"(?m)^\s*{}\s*=\s*["']([^"']+)["']"#, key);
        let re = Regex::new(&pattern).ok()?;
        if let Some(caps) = re.captures(&content) {
            if let Some(token) = non_empty(&caps[1]) {
                return Some(token);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_with(f: impl FnOnce(&mut AppConfig)) -> AppConfig {
        let mut config = AppConfig::default();
        f(&mut config);
        config
    }

    #[test]
    fn direct_secret_wins_for_anthropic() {
        let config = config_with(|c| {
            c.anthropic_key = "sk-ant-xyz".into();
            c.anthropic_mode = "web".into();
            c.anthropic_web_cookie = "sessionKey=abc".into();
            c.anthropic_org_id = "org-1".into();
        });
        assert_eq!(
            resolve(Provider::Anthropic, &config),
            Some(ResolvedCredential::Secret("sk-ant-xyz".into()))
        );
    }

    #[test]
    fn session_pair_requires_both_parts() {
        let config = config_with(|c| {
            c.anthropic_mode = "web".into();
            c.anthropic_web_cookie = "sessionKey=abc".into();
        });
        assert_eq!(resolve(Provider::Anthropic, &config), None);
    }

    #[test]
    fn session_pair_resolves_in_web_mode() {
        let config = config_with(|c| {
            c.anthropic_mode = "web".into();
            c.anthropic_web_cookie = "sessionKey=abc".into();
            c.anthropic_org_id = "org-1".into();
        });
        assert_eq!(
            resolve(Provider::Anthropic, &config),
            Some(ResolvedCredential::WebSession {
                cookie: "sessionKey=abc".into(),
                org_id: "org-1".into(),
            })
        );
    }

    #[test]
    fn whitespace_secret_counts_as_absent() {
        let config = config_with(|c| c.anthropic_key = "   ".into());
        assert_eq!(resolve(Provider::Anthropic, &config), None);
    }

    #[test]
    fn openai_secret_beats_local_token() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("auth.json"),
            r#"{"access_token": "local-tok"}"#,
        )
        .unwrap();
        // Resolver checks the secret before ever touching the filesystem.
        let config = config_with(|c| c.openai_key = "sk-direct".into());
        assert_eq!(
            resolve(Provider::OpenAi, &config),
            Some(ResolvedCredential::Secret("sk-direct".into()))
        );
    }

    #[test]
    fn auth_json_direct_token() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("auth.json"),
            r#"{"access_token": "tok-direct"}"#,
        )
        .unwrap();
        assert_eq!(
            read_codex_token_from(dir.path()),
            Some("tok-direct".into())
        );
    }

    #[test]
    fn auth_json_nested_tokens_object() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("auth.json"),
            r#"{"tokens": {"access_token": "tok-nested", "account_id": "acc-1"}}"#,
        )
        .unwrap();
        assert_eq!(
            read_codex_token_from(dir.path()),
            Some("tok-nested".into())
        );
    }

    #[test]
    fn auth_json_session_token_before_nested() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("auth.json"),
            r#"{"session_token": "tok-session", "tokens": {"access_token": "tok-nested"}}"#,
        )
        .unwrap();
        assert_eq!(
            read_codex_token_from(dir.path()),
            Some("tok-session".into())
        );
    }

    #[test]
    fn auth_json_default_entry_fallback() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("auth.json"),
            r#"{"default": {"access_token": "tok-old-cli"}}"#,
        )
        .unwrap();
        assert_eq!(
            read_codex_token_from(dir.path()),
            Some("tok-old-cli".into())
        );
    }

    #[test]
    fn corrupt_auth_json_falls_through_to_toml() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("auth.json"), "{not json").unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "api_key = \"tok-from-toml\"\n",
        )
        .unwrap();
        assert_eq!(
            read_codex_token_from(dir.path()),
            Some("tok-from-toml".into())
        );
    }

    #[test]
    fn config_toml_access_token_single_quotes() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "model = \"gpt\"\naccess_token = 'tok-sq'\n",
        )
        .unwrap();
        assert_eq!(read_codex_token_from(dir.path()), Some("tok-sq".into()));
    }

    #[test]
    fn config_toml_api_key_beats_access_token() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "access_token = \"tok-b\"\napi_key = \"tok-a\"\n",
        )
        .unwrap();
        assert_eq!(read_codex_token_from(dir.path()), Some("tok-a".into()));
    }

    #[test]
    fn missing_directory_is_source_absent() {
        assert_eq!(
            read_codex_token_from(Path::new("/nonexistent/limitmon-test")),
            None
        );
    }

    #[test]
    fn empty_dir_is_source_absent() {
        let dir = TempDir::new().unwrap();
        assert_eq!(read_codex_token_from(dir.path()), None);
    }
}
