//! CSV writing operations.

use std::{fs::File, path::Path};

use anyhow::{Context, Result};
use polars::{frame::DataFrame, io::SerWriter, prelude::{CsvWriter, NamedFrom}, series::Series};

/// Write a DataFrame to a CSV file.
pub(crate) fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("[io::csv::write] Failed to create CSV file: {}", path.display()))?;
    CsvWriter::new(file)
        .finish(df)
        .with_context(|| format!("[io::csv::write] Failed to write CSV to {:?}", path))
}

/// Write a DataFrame to a CSV string.
pub(crate) fn write_csv_string(df: &mut DataFrame) -> Result<String> {
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer)
        .finish(df)
        .context("[io::csv::write] Failed to write CSV to string")?;
    String::from_utf8(buffer).context("[io::csv::write] CSV output is not valid UTF-8")
}

/// Two-column `geo_id,district` frame, one row per unit.
pub(crate) fn assignments_frame(geo_ids: &[String], districts: &[u32]) -> Result<DataFrame> {
    anyhow::ensure!(geo_ids.len() == districts.len(),
        "[io::csv::write] {} geo ids for {} assignments", geo_ids.len(), districts.len());

    Ok(DataFrame::new(vec![
        Series::new("geo_id".into(), geo_ids).into(),
        Series::new("district".into(), districts).into(),
    ])?)
}
