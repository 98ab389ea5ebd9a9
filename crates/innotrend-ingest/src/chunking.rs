//! Semantic chunking of patent abstracts.
//!
//! Sentences are embedded together with their neighbours, and the abstract
//! is cut wherever the cosine distance between consecutive windows exceeds
//! a percentile of all such distances. Short, single-topic abstracts come
//! back as one chunk.

use innotrend_core::math::{cosine_similarity, quantile};
use innotrend_core::Result;
use ndarray::Array1;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Default breakpoint percentile.
pub const DEFAULT_BREAKPOINT_PERCENTILE: f64 = 95.0;
/// Sentences on each side included in a window.
pub const DEFAULT_BUFFER_SIZE: usize = 1;

static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.?!]\s+").unwrap());

/// Split text after `.`, `?` or `!` followed by whitespace.
///
/// Empty sentences are dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END.find_iter(text) {
        let sentence = text[start..m.start() + 1].trim();
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
        start = m.end();
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

/// Embedding-distance chunker.
#[derive(Debug, Clone)]
pub struct SemanticChunker {
    pub breakpoint_percentile: f64,
    pub buffer_size: usize,
}

impl Default for SemanticChunker {
    fn default() -> Self {
        Self {
            breakpoint_percentile: DEFAULT_BREAKPOINT_PERCENTILE,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl SemanticChunker {
    pub fn new(breakpoint_percentile: f64, buffer_size: usize) -> Self {
        Self {
            breakpoint_percentile,
            buffer_size,
        }
    }

    /// Sentence windows: each sentence joined with `buffer_size` neighbours per side.
    fn windows(&self, sentences: &[&str]) -> Vec<String> {
        (0..sentences.len())
            .map(|i| {
                let lo = i.saturating_sub(self.buffer_size);
                let hi = (i + self.buffer_size + 1).min(sentences.len());
                sentences[lo..hi].join(" ")
            })
            .collect()
    }

    /// Split `text` into chunks, embedding sentence windows with `embed`.
    ///
    /// Errors from `embed` propagate.
    pub fn chunk<F>(&self, text: &str, mut embed: F) -> Result<Vec<String>>
    where
        F: FnMut(&str) -> Result<Array1<f32>>,
    {
        let sentences = split_sentences(text);
        if sentences.len() <= 1 {
            let whole = text.trim();
            return Ok(if whole.is_empty() {
                Vec::new()
            } else {
                vec![whole.to_string()]
            });
        }

        let embeddings = self
            .windows(&sentences)
            .iter()
            .map(|w| embed(w.as_str()).map(|e| e.mapv(f64::from)))
            .collect::<Result<Vec<Array1<f64>>>>()?;

        let distances: Vec<f64> = embeddings
            .windows(2)
            .map(|pair| 1.0 - cosine_similarity(pair[0].view(), pair[1].view()))
            .collect();

        let breakpoints = match quantile(&distances, self.breakpoint_percentile / 100.0) {
            Some(threshold) => distances
                .iter()
                .enumerate()
                .filter(|(_, &d)| d > threshold)
                .map(|(i, _)| i)
                .collect(),
            None => Vec::new(),
        };

        let mut chunks = Vec::with_capacity(breakpoints.len() + 1);
        let mut start = 0;
        for end in breakpoints {
            chunks.push(sentences[start..=end].join(" "));
            start = end + 1;
        }
        if start < sentences.len() {
            chunks.push(sentences[start..].join(" "));
        }
        debug!(
            "Chunked {} sentences into {} chunks",
            sentences.len(),
            chunks.len()
        );
        Ok(chunks)
    }
}
