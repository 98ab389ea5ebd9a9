//! Orchestrator — runs pipeline stages against the configured data directory.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use innotrend_analysis::TrendExtractor;
use innotrend_chat::{month_range, CompletionBackend, TechnologyLabeler, TrendNarrator};
use innotrend_core::{
    CompositeId, EmbeddingRow, Narrative, PatentRecord, PipelineConfig, Result,
};
use innotrend_infer::EmbedderBackend;
use innotrend_ingest::SemanticChunker;
use innotrend_store::{
    load_alignments, read_results, write_results, write_year_archive, PatentTable,
};
use tracing::{debug, info, warn};

use crate::types::*;

/// Top-level orchestrator that coordinates the pipeline stages.
pub struct Orchestrator {
    config: PipelineConfig,
}

impl Orchestrator {
    pub fn new(config: PipelineConfig) -> Self {
        info!(
            "Orchestrator initialized: data_dir={}, dim={}",
            config.data_paths.root.display(),
            config.params.embedding_dim
        );
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Stage: embed — patents → chunks → vectors → one archive per year.
    ///
    /// Embedding errors abort the run; archives already written stay on disk.
    pub fn embed(
        &self,
        embedder: &Arc<dyn EmbedderBackend>,
        options: &EmbedOptions,
    ) -> Result<StageReport> {
        let started = Instant::now();
        let paths = &self.config.data_paths;
        let dim = self.config.params.embedding_dim;
        if embedder.dimension() != dim {
            warn!(
                "Embedder dimension {} differs from configured {}",
                embedder.dimension(),
                dim
            );
        }

        let patents = PatentTable::load(&paths.patents_file)?;
        let chunker = options
            .chunking
            .then(|| SemanticChunker::new(options.breakpoint_percentile, 1));
        let wanted: Option<HashSet<i32>> = options.years.as_ref().map(|y| y.iter().copied().collect());

        let mut report = StageReport::new(Stage::Embed);
        for (year, records) in patents.by_year() {
            if wanted.as_ref().is_some_and(|w| !w.contains(&year)) {
                continue;
            }
            report.processed += 1;

            let mut rows = Vec::new();
            for record in records {
                rows.extend(embed_record(embedder.as_ref(), chunker.as_ref(), record)?);
            }
            if rows.is_empty() {
                warn!("No abstracts to embed for {}", year);
                report.skipped += 1;
                continue;
            }

            write_year_archive(&paths.vector_archive(year), year, &rows, dim)?;
            report.produced += rows.len();
        }

        if let Some(wanted) = &wanted {
            let present: HashSet<i32> = patents.records().iter().map(|r| r.year).collect();
            for year in wanted.difference(&present) {
                warn!("No patents filed in {}", year);
            }
        }

        report.elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            "Embed complete: {} years, {} vectors",
            report.processed, report.produced
        );
        Ok(report)
    }

    /// Stage: extract — per-bin PCA and component bigrams into the results table.
    pub fn extract(&self) -> Result<StageReport> {
        let started = Instant::now();
        let paths = &self.config.data_paths;
        let patents = PatentTable::load(&paths.patents_file)?;
        let extractor = TrendExtractor::new(self.config.params.clone(), &patents);

        let components = extractor.run(paths)?;
        let records: Vec<_> = components.into_iter().map(|c| c.record).collect();
        write_results(&paths.results_file, &records)?;

        let bins_done: HashSet<&str> = records.iter().map(|r| r.years.as_str()).collect();
        let mut report = StageReport::new(Stage::Extract);
        report.processed = extractor.bins().len();
        report.produced = records.len();
        report.skipped = report.processed - bins_done.len();
        report.elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            "Extract complete: {} components from {} bins",
            report.produced,
            bins_done.len()
        );
        Ok(report)
    }

    /// Stage: label — technology terms for a row range of the results table.
    pub async fn label<B: CompletionBackend>(
        &self,
        backend: B,
        options: &LabelOptions,
    ) -> Result<StageReport> {
        let started = Instant::now();
        let path = &self.config.data_paths.results_file;
        let mut records = read_results(path)?;

        let outcome = TechnologyLabeler::new(backend)
            .with_rows(options.rows.clone())
            .label(&mut records)
            .await;
        write_results(path, &records)?;

        let mut report = StageReport::new(Stage::Label);
        report.processed = outcome.labeled + outcome.skipped + outcome.failed.len();
        report.produced = outcome.labeled;
        report.skipped = outcome.skipped;
        report.failed = outcome.failed.len();
        report.elapsed_ms = started.elapsed().as_millis() as u64;
        Ok(report)
    }

    /// Stage: narrate — monthly summaries, plus the aggregate when requested
    /// (appended last).
    pub async fn narrate<B: CompletionBackend>(
        &self,
        backend: B,
        options: &NarrateOptions,
    ) -> Result<(StageReport, Vec<Narrative>)> {
        let started = Instant::now();
        let paths = &self.config.data_paths;
        let months = month_range(&options.from, &options.to)?;
        let patents = PatentTable::load(&paths.patents_file)?;
        let alignments = load_alignments(&paths.alignment_file)?;

        let narrator = TrendNarrator::new(
            backend,
            &patents,
            &alignments,
            self.config.params.top_quantile,
        );
        let mut narratives = narrator.narrate(&options.from, &options.to).await?;

        let mut report = StageReport::new(Stage::Narrate);
        report.processed = months.len();
        report.skipped = months.len() - narratives.len();

        if options.aggregate {
            if narratives.is_empty() {
                warn!("No monthly summaries; skipping aggregate");
            } else {
                let overall = narrator.aggregate(&narratives).await?;
                narratives.push(overall);
            }
        }

        report.produced = narratives.len();
        report.elapsed_ms = started.elapsed().as_millis() as u64;
        Ok((report, narratives))
    }
}

/// Chunk and embed one patent abstract.
fn embed_record(
    embedder: &dyn EmbedderBackend,
    chunker: Option<&SemanticChunker>,
    record: &PatentRecord,
) -> Result<Vec<EmbeddingRow>> {
    let chunks = match chunker {
        Some(chunker) => chunker.chunk(&record.abstract_text, |text| {
            embedder.embed(text).map(|r| r.embedding)
        })?,
        None => {
            let text = record.abstract_text.trim();
            if text.is_empty() {
                Vec::new()
            } else {
                vec![text.to_string()]
            }
        }
    };

    let rows = chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let result = embedder.embed(chunk)?;
            Ok(EmbeddingRow {
                id: CompositeId::new(&record.owner_id, &record.patent_id, i).to_string(),
                vector: result.embedding.to_vec(),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    debug!("Patent {}: {} chunks", record.patent_id, rows.len());
    Ok(rows)
}
