//! Single-prompt completion over the configured provider.

use std::future::Future;

use innotrend_core::{Error, Result};
use reqwest::Client;
use tracing::debug;

use crate::config::LLMConfig;
use crate::providers::{collect_stream, stream_llm, StreamRequest};
use crate::types::{ChatMessage, LLMProvider, ResolvedProvider};

/// Anything that turns a prompt into a completion.
pub trait CompletionBackend {
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send;
}

impl<T: CompletionBackend> CompletionBackend for &T {
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send {
        (**self).complete(prompt)
    }
}

/// Streaming client for one resolved provider.
pub struct LlmClient {
    http: Client,
    provider: LLMProvider,
    request: StreamRequest,
}

impl LlmClient {
    pub fn new(resolved: ResolvedProvider, temperature: f64, max_tokens: usize) -> Self {
        Self {
            http: Client::new(),
            provider: resolved.provider,
            request: StreamRequest {
                model: resolved.model,
                api_key: resolved.api_key,
                temperature,
                max_tokens,
            },
        }
    }

    /// Build a client from config; fails when no provider has an API key.
    pub fn from_config(config: &LLMConfig) -> Result<Self> {
        let resolved = config.resolve_provider().ok_or_else(|| {
            Error::Config(
                "no LLM provider configured; set OPENAI_API_KEY, ANTHROPIC_API_KEY or GROQ_API_KEY"
                    .into(),
            )
        })?;
        Ok(Self::new(resolved, config.temperature, config.max_tokens))
    }

    pub fn provider(&self) -> LLMProvider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.request.model
    }
}

impl CompletionBackend for LlmClient {
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send {
        debug!(
            "Completion request to {} ({} chars)",
            self.provider,
            prompt.len()
        );
        let stream = stream_llm(
            &self.http,
            self.provider,
            vec![ChatMessage::user(prompt)],
            self.request.clone(),
        );
        collect_stream(stream)
    }
}
