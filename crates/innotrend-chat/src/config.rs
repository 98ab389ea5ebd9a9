//! LLM configuration loading and provider selection.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::types::{LLMProvider, ResolvedProvider};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";
/// Upper bound on generated tokens; Anthropic requires one.
pub const DEFAULT_MAX_TOKENS: usize = 4096;

/// Stored LLM configuration (llm-config.json).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    #[serde(default = "default_preferred")]
    pub preferred_provider: String,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub anthropic_api_key: Option<String>,
    #[serde(default)]
    pub groq_api_key: Option<String>,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    #[serde(default = "default_anthropic_model")]
    pub anthropic_model: String,
    #[serde(default = "default_groq_model")]
    pub groq_model: String,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    /// Path the config was loaded from.
    #[serde(skip)]
    pub config_path: PathBuf,
}

fn default_preferred() -> String {
    "auto".into()
}
fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.into()
}
fn default_anthropic_model() -> String {
    DEFAULT_ANTHROPIC_MODEL.into()
}
fn default_groq_model() -> String {
    DEFAULT_GROQ_MODEL.into()
}
fn default_max_tokens() -> usize {
    DEFAULT_MAX_TOKENS
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            preferred_provider: "auto".into(),
            openai_api_key: None,
            anthropic_api_key: None,
            groq_api_key: None,
            openai_model: DEFAULT_OPENAI_MODEL.into(),
            anthropic_model: DEFAULT_ANTHROPIC_MODEL.into(),
            groq_model: DEFAULT_GROQ_MODEL.into(),
            temperature: 0.0,
            max_tokens: DEFAULT_MAX_TOKENS,
            config_path: PathBuf::new(),
        }
    }
}

impl LLMConfig {
    /// Load config from file, falling back to env vars and defaults.
    pub fn load(config_path: &Path) -> Self {
        let mut config: LLMConfig = match std::fs::read_to_string(config_path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
                warn!("Ignoring malformed {}: {}", config_path.display(), e);
                LLMConfig::default()
            }),
            Err(_) => LLMConfig::default(),
        };

        config.config_path = config_path.to_path_buf();

        // Env vars as fallback for API keys
        if config.openai_api_key.is_none() {
            config.openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        }
        if config.anthropic_api_key.is_none() {
            config.anthropic_api_key = std::env::var("ANTHROPIC_API_KEY").ok();
        }
        if config.groq_api_key.is_none() {
            config.groq_api_key = std::env::var("GROQ_API_KEY").ok();
        }

        if let Some(resolved) = config.resolve_provider() {
            info!("LLM provider: {} ({})", resolved.provider, resolved.model);
        }
        config
    }

    /// Resolve which provider and model to use.
    pub fn resolve_provider(&self) -> Option<ResolvedProvider> {
        let pick = |provider: LLMProvider, model: &str, key: &Option<String>| {
            key.as_ref().map(|k| ResolvedProvider {
                provider,
                model: model.to_string(),
                api_key: k.clone(),
            })
        };

        // Explicit preference
        if self.preferred_provider != "auto" {
            return match self.preferred_provider.parse::<LLMProvider>().ok()? {
                LLMProvider::OpenAI => pick(LLMProvider::OpenAI, &self.openai_model, &self.openai_api_key),
                LLMProvider::Anthropic => pick(
                    LLMProvider::Anthropic,
                    &self.anthropic_model,
                    &self.anthropic_api_key,
                ),
                LLMProvider::Groq => pick(LLMProvider::Groq, &self.groq_model, &self.groq_api_key),
            };
        }

        // Auto mode: OpenAI > Anthropic > Groq
        pick(LLMProvider::OpenAI, &self.openai_model, &self.openai_api_key)
            .or_else(|| pick(LLMProvider::Anthropic, &self.anthropic_model, &self.anthropic_api_key))
            .or_else(|| pick(LLMProvider::Groq, &self.groq_model, &self.groq_api_key))
    }
}
