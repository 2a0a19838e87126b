pub mod anthropic;
pub mod fetch;
pub mod gemini;
pub mod openai;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Anthropic,
    OpenAi,
    Gemini,
}

impl Provider {
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_lowercase().as_str() {
            "anthropic" | "claude" => Some(Self::Anthropic),
            "openai" | "open_ai" | "codex" => Some(Self::OpenAi),
            "gemini" | "google" => Some(Self::Gemini),
            _ => None,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Anthropic => "Claude",
            Self::OpenAi => "Codex",
            Self::Gemini => "Gemini",
        }
    }

    /// The three fixed providers, in display order.
    pub fn all() -> &'static [Provider] {
        &[Provider::Anthropic, Provider::OpenAi, Provider::Gemini]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_id_accepts_aliases() {
        assert_eq!(Provider::from_id("claude"), Some(Provider::Anthropic));
        assert_eq!(Provider::from_id("OpenAI"), Some(Provider::OpenAi));
        assert_eq!(Provider::from_id("codex"), Some(Provider::OpenAi));
        assert_eq!(Provider::from_id("gemini"), Some(Provider::Gemini));
        assert_eq!(Provider::from_id("notareal"), None);
    }

    #[test]
    fn id_roundtrips() {
        for provider in Provider::all() {
            assert_eq!(Provider::from_id(provider.id()), Some(*provider));
        }
    }
}
