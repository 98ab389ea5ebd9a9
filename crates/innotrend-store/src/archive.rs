//! Per-year embedding archives (`zip_vectors/<year>.zip`).
//!
//! Each archive holds a single `<year>.csv` with the header
//! `patent_id,column_1,...,column_<dim>`. Floats are written in their
//! shortest round-trip form, so reading back yields identical bits.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use innotrend_core::{EmbeddingRow, Error, Result};
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

/// Name of the composite-id column.
pub const ID_COLUMN: &str = "patent_id";

fn entry_name(year: i32) -> String {
    format!("{}.csv", year)
}

fn vector_column(i: usize) -> String {
    format!("column_{}", i + 1)
}

/// Write one year's embedding rows to a deflated ZIP archive.
pub fn write_year_archive(path: &Path, year: i32, rows: &[EmbeddingRow], dim: usize) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = BufWriter::new(File::create(path)?);
    let mut zip = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file(entry_name(year), options)?;

    {
        let mut writer = csv::Writer::from_writer(&mut zip);
        let mut header = Vec::with_capacity(dim + 1);
        header.push(ID_COLUMN.to_string());
        header.extend((0..dim).map(vector_column));
        writer.write_record(&header)?;

        let mut record = Vec::with_capacity(dim + 1);
        for row in rows {
            if row.vector.len() != dim {
                return Err(Error::Parse(format!(
                    "row {} has {} values, expected {}",
                    row.id,
                    row.vector.len(),
                    dim
                )));
            }
            record.clear();
            record.push(row.id.clone());
            record.extend(row.vector.iter().map(|v| v.to_string()));
            writer.write_record(&record)?;
        }
        writer.flush()?;
    }

    let mut inner = zip.finish()?;
    inner.flush()?;
    info!("Wrote {} vectors for {} to {}", rows.len(), year, path.display());
    Ok(())
}

/// Read one year's archive.
///
/// Returns None when the archive or its `<year>.csv` entry does not exist.
/// Errors when any of the `dim` vector columns is missing or a value does
/// not parse.
pub fn read_year_archive(path: &Path, year: i32, dim: usize) -> Result<Option<Vec<EmbeddingRow>>> {
    if !path.exists() {
        debug!("No archive for {} at {}", year, path.display());
        return Ok(None);
    }
    let mut archive = zip::ZipArchive::new(File::open(path)?)?;
    let entry = match archive.by_name(&entry_name(year)) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => {
            debug!("Archive {} has no {}", path.display(), entry_name(year));
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let mut reader = csv::Reader::from_reader(entry);
    let headers = reader.headers()?.clone();
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::Parse(format!("{} is missing column {}", path.display(), name)))
    };
    let id_idx = find(ID_COLUMN)?;
    let value_idx = (0..dim)
        .map(|i| find(&vector_column(i)))
        .collect::<Result<Vec<_>>>()?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let id = record.get(id_idx).unwrap_or_default().to_string();
        let vector = value_idx
            .iter()
            .map(|&i| {
                let raw = record.get(i).unwrap_or_default();
                raw.trim()
                    .parse::<f32>()
                    .map_err(|_| Error::Parse(format!("bad vector value {:?} for {}", raw, id)))
            })
            .collect::<Result<Vec<f32>>>()?;
        rows.push(EmbeddingRow { id, vector });
    }
    debug!("Read {} vectors for {}", rows.len(), year);
    Ok(Some(rows))
}
