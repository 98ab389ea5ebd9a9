//! Trend-component extraction per five-year bin.

use std::collections::HashSet;

use innotrend_core::math::{row_cosine_similarities, top_quantile_indices};
use innotrend_core::{
    AnalysisParams, ComponentRecord, CompositeId, DataPaths, Error, Result, YearBin,
};
use innotrend_ingest::{clean_and_tokenize, top_bigrams, StopWords};
use innotrend_store::{read_year_archive, PatentTable};
use ndarray::{Array2, Axis};
use tracing::{debug, info, warn};

use crate::pca::Pca;

/// Stacked vectors of one bin.
#[derive(Debug, Clone)]
pub struct BinVectors {
    /// Patent id recovered from each row's composite id; None when the id
    /// does not follow the numeric `<owner>_<patent>_<chunk>` pattern.
    pub patent_ids: Vec<Option<String>>,
    /// One row per embedded chunk.
    pub matrix: Array2<f64>,
}

impl BinVectors {
    pub fn len(&self) -> usize {
        self.patent_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patent_ids.is_empty()
    }
}

/// One component's result row plus the patents that produced its terms.
#[derive(Debug, Clone)]
pub struct ComponentAnalysis {
    pub record: ComponentRecord,
    /// Distinct patent ids at or above the alignment quantile, in row order.
    pub aligned_patents: Vec<String>,
}

/// Fits per-bin PCA and describes each component by its aligned patents.
pub struct TrendExtractor<'a> {
    params: AnalysisParams,
    patents: &'a PatentTable,
    stopwords: StopWords,
}

impl<'a> TrendExtractor<'a> {
    /// Tokens are filtered by the English stopwords plus `params.extra_stopwords`.
    pub fn new(params: AnalysisParams, patents: &'a PatentTable) -> Self {
        let stopwords = StopWords::with_extra(&params.extra_stopwords);
        Self {
            params,
            patents,
            stopwords,
        }
    }

    pub fn bins(&self) -> Vec<YearBin> {
        YearBin::split(
            self.params.start_year,
            self.params.end_year,
            self.params.bin_width,
        )
    }

    /// Stack every year archive of `bin` that exists on disk.
    ///
    /// Returns None when no year of the bin has vectors.
    pub fn load_bin(&self, paths: &DataPaths, bin: YearBin) -> Result<Option<BinVectors>> {
        let dim = self.params.embedding_dim;
        let mut patent_ids = Vec::new();
        let mut values = Vec::new();

        for year in bin.years() {
            let Some(rows) = read_year_archive(&paths.vector_archive(year), year, dim)? else {
                debug!("Skipping {}: no vectors", year);
                continue;
            };
            for row in rows {
                patent_ids.push(CompositeId::numeric_patent_id(&row.id).map(str::to_string));
                values.extend(row.vector.iter().map(|&v| f64::from(v)));
            }
        }

        if patent_ids.is_empty() {
            return Ok(None);
        }
        let matrix = Array2::from_shape_vec((patent_ids.len(), dim), values)
            .map_err(|e| Error::Analysis(e.to_string()))?;
        Ok(Some(BinVectors { patent_ids, matrix }))
    }

    /// Fit the bin's components and extract their top bigrams.
    ///
    /// Bins too small or too flat to decompose yield no components.
    pub fn extract_bin(&self, bin: YearBin, vectors: &BinVectors) -> Result<Vec<ComponentAnalysis>> {
        let k = self.params.n_components;
        if vectors.len() < k.max(2) {
            warn!(
                "Skipping {}: {} vectors for {} components",
                bin.label(),
                vectors.len(),
                k
            );
            return Ok(Vec::new());
        }
        let pca = match Pca::fit(vectors.matrix.view(), k) {
            Ok(pca) => pca,
            Err(e) => {
                warn!("Skipping {}: {}", bin.label(), e);
                return Ok(Vec::new());
            }
        };

        let mut out = Vec::with_capacity(k);
        for (i, component) in pca.components.axis_iter(Axis(0)).enumerate() {
            let similarities = row_cosine_similarities(vectors.matrix.view(), component);
            let selected = top_quantile_indices(&similarities, self.params.top_quantile);

            let mut seen = HashSet::new();
            let aligned_patents: Vec<String> = selected
                .iter()
                .filter_map(|&row| vectors.patent_ids[row].as_deref())
                .filter(|id| seen.insert(*id))
                .map(str::to_string)
                .collect();

            let wanted: HashSet<&str> = aligned_patents.iter().map(String::as_str).collect();
            let text = self.patents.abstracts_for(&wanted).join(" ");
            let tokens = clean_and_tokenize(&text, &self.stopwords);
            let top_terms = top_bigrams(&tokens, self.params.top_bigrams);

            debug!(
                "{} PC{}: {} rows selected, {} patents, {} tokens",
                bin.label(),
                i + 1,
                selected.len(),
                aligned_patents.len(),
                tokens.len()
            );

            out.push(ComponentAnalysis {
                record: ComponentRecord {
                    pc_name: format!("PC{}", i + 1),
                    variance_explained: pca.explained_variance_ratio[i],
                    years: bin.label(),
                    top_terms,
                    technology: None,
                },
                aligned_patents,
            });
        }
        Ok(out)
    }

    /// Run every bin in order.
    pub fn run(&self, paths: &DataPaths) -> Result<Vec<ComponentAnalysis>> {
        let mut results = Vec::new();
        for bin in self.bins() {
            let Some(vectors) = self.load_bin(paths, bin)? else {
                debug!("No vectors for {}", bin.label());
                continue;
            };
            let components = self.extract_bin(bin, &vectors)?;
            info!(
                "Processed years {}: {} vectors, {} components",
                bin.label(),
                vectors.len(),
                components.len()
            );
            results.extend(components);
        }
        Ok(results)
    }
}
