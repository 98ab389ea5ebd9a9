//! LLM stages of the pipeline with external streaming (OpenAI/Anthropic/Groq).
//!
//! `TechnologyLabeler` picks technology terms out of component bigram lists;
//! `TrendNarrator` retrieves the most trend-aligned abstracts per month and
//! asks for natural-language summaries. Calls go to external APIs, one
//! request at a time, without retry.

pub mod client;
pub mod config;
pub mod labeler;
pub mod narrator;
pub mod prompts;
pub mod providers;
pub mod types;

#[cfg(test)]
mod testing;

pub use client::{CompletionBackend, LlmClient};
pub use config::LLMConfig;
pub use labeler::{parse_technology_terms, LabelReport, TechnologyLabeler};
pub use narrator::{month_range, TrendNarrator};
pub use types::*;
