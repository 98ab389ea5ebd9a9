//! External LLM provider streaming implementations.
//!
//! Each provider streams tokens via SSE from their respective APIs.
//! OpenAI and Groq use the same format. Anthropic uses a different one.

use std::pin::Pin;

use futures::Stream;
use innotrend_core::{Error, Result};
use reqwest::Client;
use serde_json::json;
use tokio_stream::StreamExt;
use tracing::{debug, error};

use crate::types::{ChatMessage, LLMProvider};

const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const GROQ_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";

/// Boxed stream type for returning different stream implementations.
pub type BoxedStream = Pin<Box<dyn Stream<Item = StreamChunk> + Send>>;

/// A single streamed token or error.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamChunk {
    Token(String),
    Done { tokens_used: usize },
    Error(String),
}

/// Request knobs shared by every provider.
#[derive(Debug, Clone)]
pub struct StreamRequest {
    pub model: String,
    pub api_key: String,
    pub temperature: f64,
    pub max_tokens: usize,
}

/// Stream tokens from the appropriate provider.
pub fn stream_llm(
    client: &Client,
    provider: LLMProvider,
    messages: Vec<ChatMessage>,
    request: StreamRequest,
) -> BoxedStream {
    match provider {
        LLMProvider::OpenAI => Box::pin(stream_openai_compat(
            client.clone(),
            OPENAI_URL,
            messages,
            request,
        )),
        LLMProvider::Groq => Box::pin(stream_openai_compat(
            client.clone(),
            GROQ_URL,
            messages,
            request,
        )),
        LLMProvider::Anthropic => Box::pin(stream_anthropic(client.clone(), messages, request)),
    }
}

/// Drain a token stream into the full response text.
///
/// An error chunk, or a stream that ends without any token, fails the call.
pub async fn collect_stream(mut stream: BoxedStream) -> Result<String> {
    let mut text = String::new();
    while let Some(chunk) = stream.next().await {
        match chunk {
            StreamChunk::Token(t) => text.push_str(&t),
            StreamChunk::Done { tokens_used } => {
                debug!("Stream finished after {} chunks", tokens_used);
                break;
            }
            StreamChunk::Error(e) => return Err(Error::Llm(e)),
        }
    }
    if text.is_empty() {
        return Err(Error::Llm("empty response".into()));
    }
    Ok(text)
}

/// Splits a byte stream into complete SSE lines.
///
/// Bytes are decoded only once a whole line has arrived, so a character
/// split across network chunks survives intact.
#[derive(Default)]
struct SseLines {
    buffer: Vec<u8>,
}

impl SseLines {
    fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Next complete `data:` payload, skipping blanks, comments and `event:` lines.
    fn next_data(&mut self) -> Option<String> {
        while let Some(line_end) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=line_end).collect();
            let line = String::from_utf8_lossy(&raw).trim().to_string();

            if line.is_empty() || line.starts_with(':') {
                continue;
            }
            if let Some(data) = line.strip_prefix("data:") {
                return Some(data.trim_start().to_string());
            }
        }
        None
    }
}

/// Parsed payload of one SSE `data:` line.
#[derive(Debug, PartialEq)]
enum SseEvent {
    Token(String),
    Done,
    Error(String),
    Ignore,
}

fn parse_openai_data(data: &str) -> SseEvent {
    if data.trim() == "[DONE]" {
        return SseEvent::Done;
    }
    let Ok(parsed) = serde_json::from_str::<serde_json::Value>(data) else {
        return SseEvent::Ignore;
    };
    if let Some(msg) = parsed["error"]["message"].as_str() {
        return SseEvent::Error(msg.to_string());
    }
    match parsed["choices"][0]["delta"]["content"].as_str() {
        Some(content) if !content.is_empty() => SseEvent::Token(content.to_string()),
        _ => SseEvent::Ignore,
    }
}

fn parse_anthropic_data(data: &str) -> SseEvent {
    let Ok(parsed) = serde_json::from_str::<serde_json::Value>(data) else {
        return SseEvent::Ignore;
    };
    match parsed["type"].as_str() {
        Some("content_block_delta") => match parsed["delta"]["text"].as_str() {
            Some(text) if !text.is_empty() => SseEvent::Token(text.to_string()),
            _ => SseEvent::Ignore,
        },
        Some("message_stop") => SseEvent::Done,
        Some("error") => SseEvent::Error(
            parsed["error"]["message"]
                .as_str()
                .unwrap_or("Unknown error")
                .to_string(),
        ),
        _ => SseEvent::Ignore,
    }
}

/// Send `request` and turn the SSE response into chunks using `parse`.
fn sse_stream(
    request: reqwest::RequestBuilder,
    parse: fn(&str) -> SseEvent,
) -> impl Stream<Item = StreamChunk> + Send + 'static {
    async_stream::stream! {
        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                yield StreamChunk::Error(format!("Request failed: {}", e));
                return;
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            yield StreamChunk::Error(format!("API error {}: {}", status, body));
            return;
        }

        let mut stream = response.bytes_stream();
        let mut lines = SseLines::default();
        let mut token_count = 0usize;

        while let Some(chunk) = stream.next().await {
            let bytes = match chunk {
                Ok(b) => b,
                Err(e) => {
                    yield StreamChunk::Error(format!("Stream read error: {}", e));
                    return;
                }
            };
            lines.push(&bytes);

            while let Some(data) = lines.next_data() {
                match parse(&data) {
                    SseEvent::Token(t) => {
                        token_count += 1;
                        yield StreamChunk::Token(t);
                    }
                    SseEvent::Done => {
                        yield StreamChunk::Done { tokens_used: token_count };
                        return;
                    }
                    SseEvent::Error(msg) => {
                        error!("Provider error: {}", msg);
                        yield StreamChunk::Error(msg);
                        return;
                    }
                    SseEvent::Ignore => {}
                }
            }
        }

        yield StreamChunk::Done { tokens_used: token_count };
    }
}

/// Stream from OpenAI-compatible APIs (OpenAI, Groq).
fn stream_openai_compat(
    client: Client,
    url: &str,
    messages: Vec<ChatMessage>,
    request: StreamRequest,
) -> impl Stream<Item = StreamChunk> + Send + 'static {
    let msgs: Vec<serde_json::Value> = messages
        .iter()
        .map(|m| json!({"role": m.role, "content": m.content}))
        .collect();
    let body = json!({
        "model": request.model,
        "messages": msgs,
        "temperature": request.temperature,
        "max_tokens": request.max_tokens,
        "stream": true,
    });

    debug!("Streaming from {} with model {}", url, request.model);

    let builder = client
        .post(url)
        .header("Authorization", format!("Bearer {}", request.api_key))
        .header("Content-Type", "application/json")
        .json(&body);
    sse_stream(builder, parse_openai_data)
}

/// Stream from Anthropic's Messages API.
fn stream_anthropic(
    client: Client,
    messages: Vec<ChatMessage>,
    request: StreamRequest,
) -> impl Stream<Item = StreamChunk> + Send + 'static {
    // Separate system message from conversation
    let system_msg: Option<String> = messages
        .iter()
        .find(|m| m.role == "system")
        .map(|m| m.content.clone());

    let conv_msgs: Vec<serde_json::Value> = messages
        .iter()
        .filter(|m| m.role != "system")
        .map(|m| json!({"role": m.role, "content": m.content}))
        .collect();

    let mut body = json!({
        "model": request.model,
        "messages": conv_msgs,
        "temperature": request.temperature,
        "max_tokens": request.max_tokens,
        "stream": true,
    });
    if let Some(sys) = system_msg {
        body["system"] = json!(sys);
    }

    debug!("Streaming from Anthropic with model {}", request.model);

    let builder = client
        .post(ANTHROPIC_URL)
        .header("x-api-key", &request.api_key)
        .header("anthropic-version", "2023-06-01")
        .header("Content-Type", "application/json")
        .json(&body);
    sse_stream(builder, parse_anthropic_data)
}
