//! Runtime types.

use std::ops::Range;

use innotrend_chat::labeler::DEFAULT_ROWS;
use serde::Serialize;

/// Pipeline stage that can be executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Patents → semantic chunks → embeddings → yearly archives.
    Embed,
    /// Yearly archives → per-bin PCA → component bigrams.
    Extract,
    /// Component bigrams → LLM technology terms.
    Label,
    /// Monthly alignments → LLM narratives.
    Narrate,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Embed => "embed",
            Stage::Extract => "extract",
            Stage::Label => "label",
            Stage::Narrate => "narrate",
        };
        f.write_str(name)
    }
}

/// Summary of one stage run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    /// Units visited: years, bins, rows or months.
    pub processed: usize,
    /// Records written: vectors, components, labels or narratives.
    pub produced: usize,
    pub skipped: usize,
    pub failed: usize,
    #[serde(rename = "elapsedMs")]
    pub elapsed_ms: u64,
}

impl StageReport {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            processed: 0,
            produced: 0,
            skipped: 0,
            failed: 0,
            elapsed_ms: 0,
        }
    }
}

/// Embed stage settings.
#[derive(Debug, Clone)]
pub struct EmbedOptions {
    /// Restrict to these filing years; all years when None.
    pub years: Option<Vec<i32>>,
    /// Split abstracts semantically; otherwise each abstract is chunk 0.
    pub chunking: bool,
    pub breakpoint_percentile: f64,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self {
            years: None,
            chunking: true,
            breakpoint_percentile: innotrend_ingest::chunking::DEFAULT_BREAKPOINT_PERCENTILE,
        }
    }
}

/// Narrate stage settings.
#[derive(Debug, Clone)]
pub struct NarrateOptions {
    /// First month, `YYYY-MM`.
    pub from: String,
    /// Last month, `YYYY-MM`, inclusive.
    pub to: String,
    /// Run the second pass over all monthly summaries.
    pub aggregate: bool,
}

/// Label stage settings.
#[derive(Debug, Clone)]
pub struct LabelOptions {
    /// Half-open row range of the component table.
    pub rows: Range<usize>,
}

impl Default for LabelOptions {
    fn default() -> Self {
        Self { rows: DEFAULT_ROWS }
    }
}
