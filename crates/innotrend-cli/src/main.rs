//! Innotrend — patent innovation-trend pipeline.

use std::ops::Range;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use innotrend_chat::{LLMConfig, LlmClient};
use innotrend_core::PipelineConfig;
use innotrend_infer::{create_embedder, OnnxOptions};
use innotrend_runtime::{EmbedOptions, LabelOptions, NarrateOptions, Orchestrator, StageReport};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "innotrend", about = "Innovation trends from patent abstracts")]
struct Cli {
    /// Data directory holding the patent table, archives and results
    #[arg(long, env = "INNOTREND_DATA_DIR", default_value = "data", global = true)]
    data_dir: PathBuf,

    /// Embedding dimension of the vector archives
    #[arg(long, env = "INNOTREND_EMBEDDING_DIM", global = true)]
    embedding_dim: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Chunk and embed patent abstracts into per-year archives
    Embed {
        /// Only these filing years (comma-separated)
        #[arg(long, value_delimiter = ',')]
        years: Vec<i32>,
        /// Embed each abstract whole instead of splitting it semantically
        #[arg(long)]
        no_chunking: bool,
        /// Directory with model.onnx and tokenizer.json (default: <data-dir>/models)
        #[arg(long)]
        models_dir: Option<PathBuf>,
        /// Feed token_type_ids (BERT-style exports)
        #[arg(long)]
        token_type_ids: bool,
    },
    /// Fit per-bin PCA and write component bigrams to the results table
    Extract {
        #[arg(long)]
        start_year: Option<i32>,
        #[arg(long)]
        end_year: Option<i32>,
        #[arg(long)]
        bin_width: Option<usize>,
        #[arg(long)]
        components: Option<usize>,
        #[arg(long)]
        top_quantile: Option<f64>,
        #[arg(long)]
        top_bigrams: Option<usize>,
        /// Extra words to drop before counting bigrams (comma-separated)
        #[arg(long, value_delimiter = ',')]
        extra_stopwords: Vec<String>,
    },
    /// Ask the LLM for technology terms in a row range of the results table
    Label {
        /// Half-open row range, e.g. 1..34
        #[arg(long, default_value = "1..34", value_parser = parse_rows)]
        rows: Range<usize>,
    },
    /// Summarize the most trend-aligned patents month by month
    Narrate {
        /// First month (YYYY-MM)
        #[arg(long)]
        from: String,
        /// Last month, inclusive (YYYY-MM)
        #[arg(long)]
        to: String,
        /// Also describe persistent themes across all months
        #[arg(long)]
        aggregate: bool,
        /// Write narratives as JSON to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn parse_rows(raw: &str) -> Result<Range<usize>, String> {
    let (start, end) = raw
        .split_once("..")
        .ok_or_else(|| format!("expected START..END, got {:?}", raw))?;
    let start: usize = start.trim().parse().map_err(|e| format!("bad start: {}", e))?;
    let end: usize = end.trim().parse().map_err(|e| format!("bad end: {}", e))?;
    if start > end {
        return Err(format!("empty range {}..{}", start, end));
    }
    Ok(start..end)
}

fn log_report(report: &StageReport) {
    info!(
        "{} finished: processed={} produced={} skipped={} failed={} ({} ms)",
        report.stage,
        report.processed,
        report.produced,
        report.skipped,
        report.failed,
        report.elapsed_ms
    );
}

fn llm_client(config: &PipelineConfig) -> anyhow::Result<LlmClient> {
    let llm = LLMConfig::load(&config.data_paths.llm_config_file);
    Ok(LlmClient::from_config(&llm)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = PipelineConfig::from_env(&cli.data_dir)
        .with_context(|| format!("preparing data dir {}", cli.data_dir.display()))?;
    if let Some(dim) = cli.embedding_dim {
        config.params.embedding_dim = dim;
    }

    match cli.command {
        Command::Embed {
            years,
            no_chunking,
            models_dir,
            token_type_ids,
        } => {
            let models_dir = models_dir.unwrap_or_else(|| config.data_paths.models_dir.clone());
            let options = OnnxOptions {
                token_type_ids,
                ..OnnxOptions::default()
            };
            let embedder = create_embedder(&models_dir, options, config.params.embedding_dim);
            if !embedder.is_available() {
                anyhow::bail!("no embedding model available in {}", models_dir.display());
            }

            let orchestrator = Orchestrator::new(config);
            let options = EmbedOptions {
                years: (!years.is_empty()).then_some(years),
                chunking: !no_chunking,
                ..EmbedOptions::default()
            };
            log_report(&orchestrator.embed(&embedder, &options)?);
        }
        Command::Extract {
            start_year,
            end_year,
            bin_width,
            components,
            top_quantile,
            top_bigrams,
            extra_stopwords,
        } => {
            let params = &mut config.params;
            if let Some(v) = start_year {
                params.start_year = v;
            }
            if let Some(v) = end_year {
                params.end_year = v;
            }
            if let Some(v) = bin_width {
                params.bin_width = v;
            }
            if let Some(v) = components {
                params.n_components = v;
            }
            if let Some(v) = top_quantile {
                params.top_quantile = v;
            }
            if let Some(v) = top_bigrams {
                params.top_bigrams = v;
            }
            params.extra_stopwords = extra_stopwords;
            let orchestrator = Orchestrator::new(config);
            log_report(&orchestrator.extract()?);
        }
        Command::Label { rows } => {
            let client = llm_client(&config)?;
            let orchestrator = Orchestrator::new(config);
            log_report(&orchestrator.label(client, &LabelOptions { rows }).await?);
        }
        Command::Narrate {
            from,
            to,
            aggregate,
            output,
        } => {
            let client = llm_client(&config)?;
            let orchestrator = Orchestrator::new(config);
            let options = NarrateOptions {
                from,
                to,
                aggregate,
            };
            let (report, narratives) = orchestrator.narrate(client, &options).await?;

            for narrative in &narratives {
                println!("## {}\n\n{}\n", narrative.period, narrative.text);
            }
            if let Some(path) = output {
                std::fs::write(&path, serde_json::to_string_pretty(&narratives)?)
                    .with_context(|| format!("writing {}", path.display()))?;
                info!("Wrote {} narratives to {}", narratives.len(), path.display());
            }
            log_report(&report);
        }
    }

    Ok(())
}
