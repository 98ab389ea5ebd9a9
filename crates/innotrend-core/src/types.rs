//! Data model shared by every pipeline stage.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A granted patent as loaded from the patent table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatentRecord {
    pub patent_id: String,
    #[serde(rename = "patent_abstract", default)]
    pub abstract_text: String,
    pub year: i32,
    #[serde(default)]
    pub filing_date: Option<String>,
    /// Owning company identifier (CRSP `PERMNO`).
    #[serde(rename = "PERMNO")]
    pub owner_id: String,
}

/// Embedding row key of the form `<owner>_<patent>_<chunk-index>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeId {
    pub owner: String,
    pub patent: String,
    pub chunk: usize,
}

impl CompositeId {
    pub fn new(owner: impl Into<String>, patent: impl Into<String>, chunk: usize) -> Self {
        Self {
            owner: owner.into(),
            patent: patent.into(),
            chunk,
        }
    }

    /// Patent id recovered with the fixed `^\d+_(\d+)_\d+$` pattern.
    ///
    /// Returns None for ids whose parts are not all numeric.
    pub fn numeric_patent_id(raw: &str) -> Option<&str> {
        let mut parts = raw.split('_');
        let (owner, patent, chunk) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }
        let numeric = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if numeric(owner) && numeric(patent) && numeric(chunk) {
            Some(patent)
        } else {
            None
        }
    }
}

impl fmt::Display for CompositeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.owner, self.patent, self.chunk)
    }
}

/// One embedded chunk: composite id plus its dense vector.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingRow {
    pub id: String,
    pub vector: Vec<f32>,
}

/// A non-overlapping group of consecutive filing years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearBin {
    pub first: i32,
    pub last: i32,
}

impl YearBin {
    /// Split `start..=end` into bins of `width` years; the last bin may be short.
    pub fn split(start: i32, end: i32, width: usize) -> Vec<YearBin> {
        let width = width.max(1) as i32;
        let mut bins = Vec::new();
        let mut first = start;
        while first <= end {
            let last = (first + width - 1).min(end);
            bins.push(YearBin { first, last });
            first += width;
        }
        bins
    }

    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.first..=self.last
    }

    /// Label used in the results table, e.g. `1970-1974`.
    pub fn label(&self) -> String {
        format!("{}-{}", self.first, self.last)
    }
}

/// Per-bin, per-component summary row of the results table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRecord {
    /// `PC1`, `PC2`, ...
    pub pc_name: String,
    pub variance_explained: f64,
    /// Bin label, e.g. `1970-1974`.
    pub years: String,
    /// Comma-joined representative bigrams.
    pub top_terms: String,
    /// Technology terms extracted by the labeler; None until labeled or on failure.
    pub technology: Option<Vec<String>>,
}

/// Precomputed alignment of one patent with the monthly trend vector.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendAlignment {
    pub patent_id: String,
    pub filing_date: NaiveDate,
    pub cos_sim_delta: f64,
}

impl TrendAlignment {
    /// Month key in `YYYY-MM` format.
    pub fn year_month(&self) -> String {
        self.filing_date.format("%Y-%m").to_string()
    }
}

/// Free-text LLM output for a month or an aggregate period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Narrative {
    /// `YYYY-MM` for monthly summaries, `from..to` for the aggregate.
    pub period: String,
    /// Number of patent abstracts supplied as context.
    pub patent_count: usize,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_id_format() {
        let id = CompositeId::new("10107", "4000123", 2);
        assert_eq!(id.to_string(), "10107_4000123_2");
        assert_eq!(CompositeId::numeric_patent_id(&id.to_string()), Some("4000123"));
    }

    #[test]
    fn test_numeric_patent_id() {
        assert_eq!(CompositeId::numeric_patent_id("10107_4000123_0"), Some("4000123"));
        assert_eq!(CompositeId::numeric_patent_id("10107_RE123_0"), None);
        assert_eq!(CompositeId::numeric_patent_id("10107_4000123"), None);
        assert_eq!(CompositeId::numeric_patent_id("1_2_3_4"), None);
    }

    #[test]
    fn test_year_bins() {
        let bins = YearBin::split(1970, 2024, 5);
        assert_eq!(bins.len(), 11);
        assert_eq!(bins[0].label(), "1970-1974");
        assert_eq!(bins[10].label(), "2020-2024");

        let short = YearBin::split(2000, 2006, 5);
        assert_eq!(short[1], YearBin { first: 2005, last: 2006 });
    }

    #[test]
    fn test_year_month() {
        let row = TrendAlignment {
            patent_id: "1".into(),
            filing_date: NaiveDate::from_ymd_opt(2023, 1, 17).unwrap(),
            cos_sim_delta: 0.1,
        };
        assert_eq!(row.year_month(), "2023-01");
    }
}
