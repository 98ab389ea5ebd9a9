//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Embedding dimension of all-mpnet-base-v2.
pub const DEFAULT_EMBEDDING_DIM: usize = 768;

/// Paths to every flat file the pipeline reads or writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Granted patents with abstracts (`data/all_g_patents.csv`).
    pub patents_file: PathBuf,
    /// Per-year vector archives (`data/zip_vectors/`).
    pub vectors_dir: PathBuf,
    /// Principal-component summaries (`data/technological_areas.csv`).
    pub results_file: PathBuf,
    /// Monthly cosine-similarity deltas (`data/cosine_similarity_12_60.csv`).
    pub alignment_file: PathBuf,
    /// ONNX model and tokenizer (`data/models/`).
    pub models_dir: PathBuf,
    /// LLM configuration (`data/llm-config.json`).
    pub llm_config_file: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let paths = Self {
            patents_file: root.join("all_g_patents.csv"),
            vectors_dir: root.join("zip_vectors"),
            results_file: root.join("technological_areas.csv"),
            alignment_file: root.join("cosine_similarity_12_60.csv"),
            models_dir: root.join("models"),
            llm_config_file: root.join("llm-config.json"),
            root,
        };
        paths.ensure_dirs()?;
        Ok(paths)
    }

    fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.vectors_dir)?;
        Ok(())
    }

    /// Archive path for one filing year (`zip_vectors/<year>.zip`).
    pub fn vector_archive(&self, year: i32) -> PathBuf {
        self.vectors_dir.join(format!("{}.zip", year))
    }
}

/// Numeric knobs of the trend analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisParams {
    /// Embedding dimension; archives carry `column_1..column_<dim>`.
    pub embedding_dim: usize,
    /// First filing year covered by the bins.
    pub start_year: i32,
    /// Last filing year covered by the bins (inclusive).
    pub end_year: i32,
    /// Years per bin.
    pub bin_width: usize,
    /// Principal components fitted per bin.
    pub n_components: usize,
    /// Quantile above which patents count as aligned.
    pub top_quantile: f64,
    /// Bigrams kept per component.
    pub top_bigrams: usize,
    /// Words dropped from abstracts on top of the English stopwords.
    #[serde(default)]
    pub extra_stopwords: Vec<String>,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            start_year: 1970,
            end_year: 2024,
            bin_width: 5,
            n_components: 3,
            top_quantile: 0.95,
            top_bigrams: 100,
            extra_stopwords: Vec::new(),
        }
    }
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Data directory paths.
    pub data_paths: DataPaths,
    /// Analysis parameters.
    pub params: AnalysisParams,
}

impl PipelineConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let mut params = AnalysisParams::default();
        if let Some(dim) = std::env::var("INNOTREND_EMBEDDING_DIM")
            .ok()
            .and_then(|d| d.parse().ok())
        {
            params.embedding_dim = dim;
        }

        Ok(Self {
            data_paths: DataPaths::new(data_dir)?,
            params,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_paths_layout() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(dir.path()).unwrap();
        assert!(paths.vectors_dir.is_dir());
        assert_eq!(
            paths.vector_archive(1999),
            dir.path().join("zip_vectors").join("1999.zip")
        );
        assert!(paths.patents_file.ends_with("all_g_patents.csv"));
    }

    #[test]
    fn test_default_params() {
        let params = AnalysisParams::default();
        assert_eq!(params.embedding_dim, 768);
        assert_eq!(params.n_components, 3);
        assert_eq!(params.top_bigrams, 100);
        assert!(params.extra_stopwords.is_empty());
    }
}
