//! Embedding engine trait and the fallback used when no model is loaded.
//!
//! Implementations:
//! - `OnnxEmbedder`: ONNX Runtime sentence-transformer (feature `onnx`)
//! - `CachedEmbedder`: memoizing wrapper around any backend
//! - `UnavailableEmbedder`: fails every call, so a run without a model stops early

use innotrend_core::{Error, Result};
use ndarray::Array1;

/// Result of an embedding operation.
#[derive(Debug, Clone)]
pub struct EmbeddingResult {
    /// Float32 embedding vector (768-dim for all-mpnet-base-v2).
    pub embedding: Array1<f32>,
    /// Whether this was served from cache.
    pub cached: bool,
}

/// Trait for embedding backends.
pub trait EmbedderBackend: Send + Sync {
    /// Generate an embedding for a text string.
    fn embed(&self, text: &str) -> Result<EmbeddingResult>;

    /// Generate embeddings for a batch of texts, stopping at the first error.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<EmbeddingResult>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Get the embedding dimension.
    fn dimension(&self) -> usize;

    /// Check if the embedder is available (model loaded).
    fn is_available(&self) -> bool;
}

/// Backend used when no model could be loaded.
pub struct UnavailableEmbedder {
    dim: usize,
    reason: String,
}

impl UnavailableEmbedder {
    pub fn new(dim: usize, reason: impl Into<String>) -> Self {
        Self {
            dim,
            reason: reason.into(),
        }
    }
}

impl EmbedderBackend for UnavailableEmbedder {
    fn embed(&self, _text: &str) -> Result<EmbeddingResult> {
        Err(Error::Inference(format!("no embedding model: {}", self.reason)))
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn is_available(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_embedder_errors() {
        let embedder = UnavailableEmbedder::new(768, "model.onnx missing");
        assert!(!embedder.is_available());
        assert_eq!(embedder.dimension(), 768);
        let err = embedder.embed("text").unwrap_err();
        assert!(err.to_string().contains("model.onnx missing"));
        assert!(embedder.embed_batch(&["a", "b"]).is_err());
    }
}
