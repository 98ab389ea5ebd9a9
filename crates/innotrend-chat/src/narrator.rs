//! Monthly innovation narratives over the most trend-aligned patents.

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, NaiveDate};
use innotrend_core::math::top_quantile_indices;
use innotrend_core::{Error, Narrative, Result, TrendAlignment};
use innotrend_store::PatentTable;
use tracing::{debug, info, warn};

use crate::client::CompletionBackend;
use crate::prompts;

/// Separator between abstracts in the monthly context.
pub const ABSTRACT_SEPARATOR: &str = "|";

fn parse_month(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", raw.trim()), "%Y-%m-%d")
        .map_err(|_| Error::Parse(format!("expected YYYY-MM, got {:?}", raw)))
}

/// Every `YYYY-MM` from `from` through `to`, inclusive.
pub fn month_range(from: &str, to: &str) -> Result<Vec<String>> {
    let first = parse_month(from)?;
    let last = parse_month(to)?;
    if first > last {
        return Err(Error::Config(format!("month range {}..{} is empty", from, to)));
    }
    let (mut year, mut month) = (first.year(), first.month());
    let mut months = Vec::new();
    while (year, month) <= (last.year(), last.month()) {
        months.push(format!("{:04}-{:02}", year, month));
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    Ok(months)
}

/// Retrieves top-aligned abstracts per month and asks the LLM to describe them.
pub struct TrendNarrator<'a, B> {
    backend: B,
    patents: &'a PatentTable,
    by_month: BTreeMap<String, Vec<&'a TrendAlignment>>,
    top_quantile: f64,
}

impl<'a, B: CompletionBackend> TrendNarrator<'a, B> {
    pub fn new(
        backend: B,
        patents: &'a PatentTable,
        alignments: &'a [TrendAlignment],
        top_quantile: f64,
    ) -> Self {
        let mut by_month: BTreeMap<String, Vec<&TrendAlignment>> = BTreeMap::new();
        for row in alignments {
            by_month.entry(row.year_month()).or_default().push(row);
        }
        Self {
            backend,
            patents,
            by_month,
            top_quantile,
        }
    }

    /// Abstracts of the month's patents at or above the quantile, in table order.
    ///
    /// None when the month has no alignment rows.
    pub fn retrieve(&self, year_month: &str) -> Option<Vec<&'a str>> {
        let rows = self.by_month.get(year_month)?;
        let deltas: Vec<f64> = rows.iter().map(|r| r.cos_sim_delta).collect();
        let ids: HashSet<&str> = top_quantile_indices(&deltas, self.top_quantile)
            .into_iter()
            .map(|i| rows[i].patent_id.as_str())
            .collect();
        debug!("{}: {} of {} patents selected", year_month, ids.len(), rows.len());
        Some(self.patents.abstracts_for(&ids))
    }

    /// Summarize one month. Months without data are skipped.
    pub async fn summarize_month(&self, year_month: &str) -> Result<Option<Narrative>> {
        let Some(abstracts) = self.retrieve(year_month) else {
            warn!("No alignment rows for {}", year_month);
            return Ok(None);
        };
        if abstracts.is_empty() {
            warn!("No abstracts found for the top patents of {}", year_month);
            return Ok(None);
        }

        let context = abstracts.join(ABSTRACT_SEPARATOR);
        let prompt = prompts::monthly_summary(year_month, abstracts.len(), &context);
        let text = self.backend.complete(&prompt).await?;
        info!("Summarized {} from {} abstracts", year_month, abstracts.len());

        Ok(Some(Narrative {
            period: year_month.to_string(),
            patent_count: abstracts.len(),
            text,
        }))
    }

    /// Summarize every month from `from` through `to`, one request each.
    pub async fn narrate(&self, from: &str, to: &str) -> Result<Vec<Narrative>> {
        let mut narratives = Vec::new();
        for month in month_range(from, to)? {
            if let Some(narrative) = self.summarize_month(&month).await? {
                narratives.push(narrative);
            }
        }
        Ok(narratives)
    }

    /// Persistent themes and future trajectory across monthly summaries.
    pub async fn aggregate(&self, monthly: &[Narrative]) -> Result<Narrative> {
        let (Some(first), Some(last)) = (monthly.first(), monthly.last()) else {
            return Err(Error::Analysis("no monthly summaries to aggregate".into()));
        };
        let context = monthly
            .iter()
            .map(|n| n.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let text = self
            .backend
            .complete(&prompts::aggregate_trends(&context))
            .await?;
        info!("Aggregated {} monthly summaries", monthly.len());

        Ok(Narrative {
            period: format!("{}..{}", first.period, last.period),
            patent_count: monthly.iter().map(|n| n.patent_count).sum(),
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedBackend;
    use innotrend_core::PatentRecord;

    fn table() -> PatentTable {
        let rec = |id: &str, text: &str| PatentRecord {
            patent_id: id.into(),
            abstract_text: text.into(),
            year: 2023,
            filing_date: None,
            owner_id: "7".into(),
        };
        PatentTable::from_records(vec![
            rec("1", "Low relevance widget."),
            rec("2", "Solid state battery."),
            rec("3", "Quantum error correction."),
            rec("4", "March patent."),
        ])
    }

    fn alignment(id: &str, date: &str, delta: f64) -> TrendAlignment {
        TrendAlignment {
            patent_id: id.into(),
            filing_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            cos_sim_delta: delta,
        }
    }

    #[test]
    fn test_month_range() {
        assert_eq!(
            month_range("2022-11", "2023-02").unwrap(),
            vec!["2022-11", "2022-12", "2023-01", "2023-02"]
        );
        assert_eq!(month_range("2023-05", "2023-05").unwrap(), vec!["2023-05"]);
        assert!(month_range("2023-05", "2023-01").is_err());
        assert!(month_range("2023/05", "2023-06").is_err());
    }

    #[tokio::test]
    async fn test_ties_at_threshold_are_all_sent() {
        let patents = table();
        let alignments = vec![
            alignment("1", "2023-01-03", 0.1),
            alignment("3", "2023-01-10", 0.9),
            alignment("2", "2023-01-20", 0.9),
        ];
        let backend = ScriptedBackend::new(vec![Ok("Summary of innovations ...".into())]);
        let narrator = TrendNarrator::new(&backend, &patents, &alignments, 0.95);

        let narrative = narrator.summarize_month("2023-01").await.unwrap().unwrap();
        assert_eq!(narrative.patent_count, 2);
        assert_eq!(narrative.period, "2023-01");

        let prompts = backend.prompts();
        assert!(prompts[0].contains("There are 2 patent abstracts in the list."));
        // table order, not alignment order
        assert!(prompts[0].contains("\nSolid state battery.|Quantum error correction.\n"));
        assert!(!prompts[0].contains("Low relevance"));
    }

    #[tokio::test]
    async fn test_narrate_skips_empty_months_and_aggregates() {
        let patents = table();
        let alignments = vec![
            alignment("2", "2023-01-20", 0.5),
            alignment("4", "2023-03-02", 0.4),
        ];
        let backend = ScriptedBackend::new(vec![
            Ok("January text".into()),
            Ok("March text".into()),
            Ok("Overall themes".into()),
        ]);
        let narrator = TrendNarrator::new(&backend, &patents, &alignments, 0.95);

        let monthly = narrator.narrate("2023-01", "2023-03").await.unwrap();
        let periods: Vec<&str> = monthly.iter().map(|n| n.period.as_str()).collect();
        assert_eq!(periods, vec!["2023-01", "2023-03"]);

        let overall = narrator.aggregate(&monthly).await.unwrap();
        assert_eq!(overall.period, "2023-01..2023-03");
        assert_eq!(overall.patent_count, 2);
        assert_eq!(overall.text, "Overall themes");

        let prompts = backend.prompts();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[2].contains("January text\n\nMarch text"));
        assert!(prompts[2].contains("persistent over the period"));
    }

    #[tokio::test]
    async fn test_llm_failure_propagates() {
        let patents = table();
        let alignments = vec![alignment("2", "2023-01-20", 0.5)];
        let backend = ScriptedBackend::new(vec![Err(Error::Llm("API error 401".into()))]);
        let narrator = TrendNarrator::new(&backend, &patents, &alignments, 0.95);
        assert!(narrator.narrate("2023-01", "2023-01").await.is_err());
        assert!(narrator.aggregate(&[]).await.is_err());
    }
}
