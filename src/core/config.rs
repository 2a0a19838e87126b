use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

const DEFAULT_POLL_INTERVAL_MINUTES: u64 = 5;

fn default_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_MINUTES
}
fn default_anthropic_mode() -> String {
    "api".to_string()
}

/// The external key-value configuration store.
///
/// Re-read from disk at the start of every aggregation pass so that saved
/// settings take effect on the next cycle without an adapter restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub openai_key: String,
    #[serde(default)]
    pub gemini_key: String,
    #[serde(default)]
    pub anthropic_key: String,
    /// Credential mode for Anthropic: "api" (direct key) or "web"
    /// (browser-session-derived cookie + org id).
    #[serde(default = "default_anthropic_mode")]
    pub anthropic_mode: String,
    #[serde(default)]
    pub anthropic_web_cookie: String,
    #[serde(default)]
    pub anthropic_org_id: String,
    #[serde(default = "default_interval")]
    pub poll_interval_minutes: u64,
    #[serde(default)]
    pub debug: bool,
    /// Substitute a fixed placeholder record for OpenAI when nothing is
    /// configured, so a first run is never fully empty. Off by default.
    #[serde(default)]
    pub demo_data: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openai_key: String::new(),
            gemini_key: String::new(),
            anthropic_key: String::new(),
            anthropic_mode: default_anthropic_mode(),
            anthropic_web_cookie: String::new(),
            anthropic_org_id: String::new(),
            poll_interval_minutes: default_interval(),
            debug: false,
            demo_data: false,
        }
    }
}

impl AppConfig {
    /// Get the config file path, respecting XDG_CONFIG_HOME
    pub fn config_path() -> PathBuf {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("~"))
                    .join(".config")
            });
        config_dir.join("limitmon").join("config.toml")
    }

    /// Load config from the default path, falling back to defaults if not found
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Serialize and write this config to the config file path.
    pub fn save(&self) -> Result<PathBuf, std::io::Error> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Write path for the external interactive capture flow: persist the
    /// session pair and switch Anthropic into web mode.
    pub fn store_web_session(
        &mut self,
        cookie: &str,
        org_id: &str,
    ) -> Result<PathBuf, std::io::Error> {
        self.anthropic_web_cookie = cookie.to_string();
        self.anthropic_org_id = org_id.to_string();
        self.anthropic_mode = "web".to_string();
        self.save()
    }

    /// Poll cadence in minutes; invalid stored values fall back to the default.
    pub fn effective_poll_interval(&self) -> u64 {
        if self.poll_interval_minutes < 1 {
            DEFAULT_POLL_INTERVAL_MINUTES
        } else {
            self.poll_interval_minutes
        }
    }

    /// Validate the config
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !["api", "web"].contains(&self.anthropic_mode.as_str()) {
            issues.push(format!(
                "Invalid anthropic_mode: '{}' (must be 'api' or 'web')",
                self.anthropic_mode
            ));
        }
        if self.poll_interval_minutes < 1 {
            issues.push(format!(
                "Invalid poll_interval_minutes: {} (must be >= 1)",
                self.poll_interval_minutes
            ));
        }
        if self.anthropic_mode == "web"
            && (self.anthropic_web_cookie.trim().is_empty()
                != self.anthropic_org_id.trim().is_empty())
        {
            issues.push(
                "Anthropic web mode needs both anthropic_web_cookie and anthropic_org_id"
                    .to_string(),
            );
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        let issues = config.validate();
        assert!(issues.is_empty(), "Default config should be valid, got: {:?}", issues);
    }

    #[test]
    fn default_interval_is_five_minutes() {
        assert_eq!(AppConfig::default().effective_poll_interval(), 5);
    }

    #[test]
    fn zero_interval_falls_back_to_default() {
        let config = AppConfig {
            poll_interval_minutes: 0,
            ..Default::default()
        };
        assert_eq!(config.effective_poll_interval(), 5);
    }

    #[test]
    fn validate_catches_bad_mode() {
        let config = AppConfig {
            anthropic_mode: "magic".to_string(),
            ..Default::default()
        };
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("anthropic_mode")));
    }

    #[test]
    fn validate_catches_half_configured_web_session() {
        let config = AppConfig {
            anthropic_mode: "web".to_string(),
            anthropic_web_cookie: "sessionKey=abc".to_string(),
            ..Default::default()
        };
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("anthropic_org_id")));
    }

    #[test]
    fn parse_minimal_toml_gives_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.poll_interval_minutes, 5);
        assert_eq!(config.anthropic_mode, "api");
        assert!(!config.debug);
        assert!(!config.demo_data);
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
openai_key = "sk-test"
anthropic_mode = "web"
anthropic_web_cookie = "sessionKey=abc"
anthropic_org_id = "org-123"
poll_interval_minutes = 1
debug = true
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.openai_key, "sk-test");
        assert_eq!(config.anthropic_mode, "web");
        assert_eq!(config.effective_poll_interval(), 1);
        assert!(config.debug);
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = AppConfig::default();
        config.gemini_key = "g-key".to_string();
        config.poll_interval_minutes = 10;
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.gemini_key, "g-key");
        assert_eq!(parsed.poll_interval_minutes, 10);
    }
}
