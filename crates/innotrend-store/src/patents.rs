//! Granted-patent table (`all_g_patents.csv`).

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use innotrend_core::{PatentRecord, Result};
use tracing::info;

/// In-memory patent table, kept in file order.
pub struct PatentTable {
    records: Vec<PatentRecord>,
}

impl PatentTable {
    /// Load the patent table from CSV.
    ///
    /// Required columns: `patent_id`, `patent_abstract`, `year`, `PERMNO`;
    /// `filing_date` is optional and extra columns are ignored.
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut records = Vec::new();
        for row in reader.deserialize() {
            let mut record: PatentRecord = row?;
            record.patent_id = record.patent_id.trim().to_string();
            records.push(record);
        }
        info!("Loaded {} patents from {}", records.len(), path.display());
        Ok(Self { records })
    }

    pub fn from_records(records: Vec<PatentRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[PatentRecord] {
        &self.records
    }

    /// Records grouped by filing year, years ascending, file order within a year.
    pub fn by_year(&self) -> BTreeMap<i32, Vec<&PatentRecord>> {
        let mut groups: BTreeMap<i32, Vec<&PatentRecord>> = BTreeMap::new();
        for record in &self.records {
            groups.entry(record.year).or_default().push(record);
        }
        groups
    }

    /// Non-empty abstracts of the given patents, in table order.
    pub fn abstracts_for(&self, patent_ids: &HashSet<&str>) -> Vec<&str> {
        self.records
            .iter()
            .filter(|r| patent_ids.contains(r.patent_id.as_str()))
            .map(|r| r.abstract_text.as_str())
            .filter(|a| !a.trim().is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_csv(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("patents.csv");
        std::fs::write(
            &path,
            "patent_id,patent_abstract,year,filing_date,PERMNO,extra\n\
             100,A battery cell.,1990,1989-03-01,11,x\n\
             200,,1990,1989-04-01,11,y\n\
             300,A neural network.,1991,1990-01-09,12,z\n",
        )
        .unwrap();
        path
    }

    #[test]
    fn test_load_and_group() {
        let dir = tempfile::tempdir().unwrap();
        let table = PatentTable::load(&write_csv(dir.path())).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.records()[0].owner_id, "11");
        assert_eq!(table.records()[0].filing_date.as_deref(), Some("1989-03-01"));

        let groups = table.by_year();
        assert_eq!(groups[&1990].len(), 2);
        assert_eq!(groups[&1991][0].patent_id, "300");
    }

    #[test]
    fn test_abstracts_in_table_order() {
        let dir = tempfile::tempdir().unwrap();
        let table = PatentTable::load(&write_csv(dir.path())).unwrap();
        let ids: HashSet<&str> = ["300", "200", "100"].into_iter().collect();
        assert_eq!(
            table.abstracts_for(&ids),
            vec!["A battery cell.", "A neural network."]
        );
    }
}
