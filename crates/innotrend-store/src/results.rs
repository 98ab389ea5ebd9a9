//! Principal-component results table (`technological_areas.csv`).

use std::path::Path;

use innotrend_core::{ComponentRecord, Error, Result};
use tracing::info;

const HEADER: [&str; 5] = ["pc_name", "variance_explained", "years", "top_terms", "technology"];

/// Write the results table. Technology terms are stored as a JSON array;
/// absent labels are written as an empty cell.
pub fn write_results(path: &Path, rows: &[ComponentRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(HEADER)?;
    for row in rows {
        let technology = match &row.technology {
            Some(terms) => serde_json::to_string(terms)?,
            None => String::new(),
        };
        let variance = row.variance_explained.to_string();
        writer.write_record([
            row.pc_name.as_str(),
            variance.as_str(),
            row.years.as_str(),
            row.top_terms.as_str(),
            technology.as_str(),
        ])?;
    }
    writer.flush()?;
    info!("Wrote {} component rows to {}", rows.len(), path.display());
    Ok(())
}

/// Read a results table written by [`write_results`].
pub fn read_results(path: &Path) -> Result<Vec<ComponentRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::Parse(format!("{} is missing column {}", path.display(), name)))
    };
    let pc_idx = column("pc_name")?;
    let var_idx = column("variance_explained")?;
    let years_idx = column("years")?;
    let terms_idx = column("top_terms")?;
    let tech_idx = headers.iter().position(|h| h == "technology");

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let field = |i: usize| record.get(i).unwrap_or_default();
        let variance_explained = field(var_idx)
            .trim()
            .parse::<f64>()
            .map_err(|_| Error::Parse(format!("bad variance_explained {:?}", field(var_idx))))?;
        let technology = match tech_idx.map(|i| field(i).trim()) {
            Some(raw) if !raw.is_empty() => Some(serde_json::from_str::<Vec<String>>(raw)?),
            _ => None,
        };
        rows.push(ComponentRecord {
            pc_name: field(pc_idx).to_string(),
            variance_explained,
            years: field(years_idx).to_string(),
            top_terms: field(terms_idx).to_string(),
            technology,
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("technological_areas.csv");
        let rows = vec![
            ComponentRecord {
                pc_name: "PC1".into(),
                variance_explained: 0.125,
                years: "1970-1974".into(),
                top_terms: "semiconductor device,control unit".into(),
                technology: Some(vec!["semiconductor device".into()]),
            },
            ComponentRecord {
                pc_name: "PC2".into(),
                variance_explained: 0.0625,
                years: "1970-1974".into(),
                top_terms: String::new(),
                technology: None,
            },
        ];
        write_results(&path, &rows).unwrap();
        assert_eq!(read_results(&path).unwrap(), rows);
    }

    #[test]
    fn test_read_without_technology_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.csv");
        std::fs::write(&path, "pc_name,variance_explained,years,top_terms\nPC3,0.01,1975-1979,a b\n")
            .unwrap();
        let rows = read_results(&path).unwrap();
        assert_eq!(rows[0].pc_name, "PC3");
        assert!(rows[0].technology.is_none());
    }
}
