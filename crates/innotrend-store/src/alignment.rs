//! Monthly trend-alignment table (per-patent cosine-similarity deltas).

use std::path::Path;

use chrono::NaiveDate;
use innotrend_core::{Error, Result, TrendAlignment};
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct RawAlignment {
    patent_id: String,
    filing_date: String,
    cos_sim_delta: Option<f64>,
}

/// Parse `YYYY-MM-DD`, tolerating a trailing time part.
fn parse_filing_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|e| Error::Parse(format!("bad filing_date {:?}: {}", raw, e)))
}

/// Load the alignment table. Rows without a `cos_sim_delta` are dropped.
pub fn load_alignments(path: &Path) -> Result<Vec<TrendAlignment>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    let mut missing = 0usize;
    for raw in reader.deserialize::<RawAlignment>() {
        let raw = raw?;
        let Some(cos_sim_delta) = raw.cos_sim_delta.filter(|v| !v.is_nan()) else {
            missing += 1;
            continue;
        };
        rows.push(TrendAlignment {
            patent_id: raw.patent_id.trim().to_string(),
            filing_date: parse_filing_date(&raw.filing_date)?,
            cos_sim_delta,
        });
    }
    if missing > 0 {
        warn!("Dropped {} alignment rows without cos_sim_delta", missing);
    }
    info!("Loaded {} alignment rows from {}", rows.len(), path.display());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_alignments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cos.csv");
        std::fs::write(
            &path,
            "patent_id,filing_date,cos_sim_delta,permno\n\
             100,2023-01-05,0.12,1\n\
             200,2023-02-11 00:00:00,-0.3,1\n\
             300,2023-02-12,,2\n",
        )
        .unwrap();
        let rows = load_alignments(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].year_month(), "2023-01");
        assert_eq!(rows[1].year_month(), "2023-02");
        assert_eq!(rows[1].cos_sim_delta, -0.3);
    }

    #[test]
    fn test_bad_date_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cos.csv");
        std::fs::write(&path, "patent_id,filing_date,cos_sim_delta\n1,January,0.1\n").unwrap();
        assert!(load_alignments(&path).is_err());
    }
}
