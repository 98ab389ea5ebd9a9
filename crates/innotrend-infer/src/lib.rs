//! Innotrend Infer — sentence-embedding engine and embedding cache.
//!
//! Provides the `EmbedderBackend` trait for generating embeddings.
//! When the `onnx` feature is enabled and model files are present,
//! `OnnxEmbedder` loads all-mpnet-base-v2 for 768-dim embeddings.
//! Without it, `UnavailableEmbedder` is returned and the embed stage fails
//! on its first call.

pub mod cache;
pub mod embedder;
pub mod onnx_embedder;

pub use cache::{CachedEmbedder, EmbeddingCache, DEFAULT_CACHE_SIZE};
pub use embedder::{EmbedderBackend, EmbeddingResult, UnavailableEmbedder};
pub use onnx_embedder::OnnxOptions;

#[cfg(feature = "onnx")]
pub use onnx_embedder::OnnxEmbedder;

use std::path::Path;
use std::sync::Arc;

/// Create the best available embedder for the given model directory.
///
/// Tries ONNX first (if feature enabled and model files present), wrapped
/// in an embedding cache; otherwise returns an `UnavailableEmbedder`.
pub fn create_embedder(
    model_dir: &Path,
    options: OnnxOptions,
    expected_dim: usize,
) -> Arc<dyn EmbedderBackend> {
    #[cfg(feature = "onnx")]
    let embedder: Arc<dyn EmbedderBackend> = match OnnxEmbedder::load(model_dir, options) {
        Ok(embedder) => {
            if embedder.dimension() != expected_dim {
                tracing::warn!(
                    "Model dimension {} differs from configured {}",
                    embedder.dimension(),
                    expected_dim
                );
            }
            tracing::info!("Using ONNX embedder (dim={})", embedder.dimension());
            Arc::new(CachedEmbedder::new(embedder, DEFAULT_CACHE_SIZE))
        }
        Err(e) => {
            tracing::warn!("ONNX embedder unavailable: {}", e);
            Arc::new(UnavailableEmbedder::new(expected_dim, e.to_string()))
        }
    };

    #[cfg(not(feature = "onnx"))]
    let embedder: Arc<dyn EmbedderBackend> = {
        let _ = (model_dir, options);
        tracing::warn!("ONNX feature disabled; embeddings unavailable");
        Arc::new(UnavailableEmbedder::new(
            expected_dim,
            "built without the `onnx` feature",
        ))
    };

    embedder
}
