//! Technology labeling of component bigram lists.

use std::ops::Range;

use innotrend_core::ComponentRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::client::CompletionBackend;
use crate::prompts;

/// Rows labeled when no range is given.
pub const DEFAULT_ROWS: Range<usize> = 1..34;

static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#""(.*?)""#).unwrap());

/// Extract the double-quoted terms of an LLM list response.
///
/// Commas are removed before matching, so `["a", "b"]` and a response
/// split across lines both yield `a`, `b`.
pub fn parse_technology_terms(response: &str) -> Vec<String> {
    let combined: String = response.split(',').collect();
    QUOTED
        .captures_iter(&combined)
        .map(|c| c[1].to_string())
        .collect()
}

/// Outcome of one labeling pass.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LabelReport {
    pub labeled: usize,
    /// Rows in range with no bigrams.
    pub skipped: usize,
    /// Row indices whose request failed.
    pub failed: Vec<usize>,
}

/// Sends each row's bigram list to the LLM and stores the returned terms.
pub struct TechnologyLabeler<B> {
    backend: B,
    rows: Range<usize>,
}

impl<B: CompletionBackend> TechnologyLabeler<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            rows: DEFAULT_ROWS,
        }
    }

    pub fn with_rows(mut self, rows: Range<usize>) -> Self {
        self.rows = rows;
        self
    }

    /// Label rows in the configured range, clamped to `records`.
    ///
    /// A failed request leaves that row's technology absent and moves on.
    pub async fn label(&self, records: &mut [ComponentRecord]) -> LabelReport {
        let end = self.rows.end.min(records.len());
        let start = self.rows.start.min(end);
        let mut report = LabelReport::default();

        for idx in start..end {
            let terms = records[idx].top_terms.trim();
            if terms.is_empty() {
                debug!("Row {} has no terms", idx);
                report.skipped += 1;
                continue;
            }
            let prompt = prompts::technology_terms(terms);

            match self.backend.complete(&prompt).await {
                Ok(response) => {
                    let technology = parse_technology_terms(&response);
                    debug!("Row {}: {} technology terms", idx, technology.len());
                    records[idx].technology = Some(technology);
                    report.labeled += 1;
                }
                Err(e) => {
                    warn!("Error processing row {}: {}", idx, e);
                    records[idx].technology = None;
                    report.failed.push(idx);
                }
            }
        }

        info!(
            "Labeled {} rows ({} skipped, {} failed)",
            report.labeled,
            report.skipped,
            report.failed.len()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedBackend;
    use innotrend_core::Error;

    fn record(terms: &str) -> ComponentRecord {
        ComponentRecord {
            pc_name: "PC1".into(),
            variance_explained: 0.1,
            years: "1970-1974".into(),
            top_terms: terms.into(),
            technology: None,
        }
    }

    #[test]
    fn test_parse_technology_terms() {
        assert_eq!(
            parse_technology_terms(r#"```python\n["solar cell", "lithium battery"]\n```"#),
            vec!["solar cell", "lithium battery"]
        );
        // quotes spanning a comma are joined once the comma is gone
        assert_eq!(parse_technology_terms(r#"["a, b"]"#), vec!["a b"]);
        assert!(parse_technology_terms("No relevant terms.").is_empty());
    }

    #[tokio::test]
    async fn test_labels_range_and_records_failures() {
        let backend = ScriptedBackend::new(vec![
            Ok(r#"["gear train"]"#.into()),
            Err(Error::Llm("API error 500".into())),
        ]);
        let mut records = vec![
            record("outside range"),
            record("gear train,train wheel"),
            record("   "),
            record("fuel cell,cell stack"),
            record("also outside"),
        ];
        let labeler = TechnologyLabeler::new(&backend).with_rows(1..4);
        let report = labeler.label(&mut records).await;

        assert_eq!(report.labeled, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, vec![3]);
        assert!(records[0].technology.is_none());
        assert_eq!(records[1].technology, Some(vec!["gear train".to_string()]));
        assert!(records[2].technology.is_none());
        assert!(records[3].technology.is_none());

        let prompts = backend.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].contains("List of Terms: gear train,train wheel"));
    }

    #[tokio::test]
    async fn test_range_clamped_to_table() {
        let backend = ScriptedBackend::new(vec![Ok(r#"["x"]"#.into())]);
        let mut records = vec![record("a b"), record("c d")];
        let report = TechnologyLabeler::new(&backend).label(&mut records).await;
        // default 1..34 covers only row 1 here
        assert_eq!(report.labeled, 1);
        assert!(records[0].technology.is_none());
        assert_eq!(records[1].technology, Some(vec!["x".to_string()]));
    }
}
