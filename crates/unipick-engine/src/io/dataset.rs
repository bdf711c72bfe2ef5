//! Normalized dataset CSV.
use std::path::Path;

use anyhow::{Context, Result};

use crate::record::{CollegeRecord, Dataset};

/// Write `dataset` with the same column names as the raw source.
pub fn write_dataset_csv<P: AsRef<Path>>(dataset: &Dataset, path: P) -> Result<()> {
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("Failed to create dataset file: {}", path.as_ref().display()))?;
    for record in dataset {
        writer
            .serialize(record)
            .with_context(|| format!("Failed to write college '{}'", record.name))?;
    }
    writer.flush().context("Failed to flush dataset file")?;
    log::info!(
        "Wrote {} colleges to {}",
        dataset.len(),
        path.as_ref().display()
    );
    Ok(())
}

/// Read a dataset previously written by [`write_dataset_csv`].
///
/// The table is expected to be clean already: any missing or malformed value
/// is an error here rather than being repaired.
pub fn read_dataset_csv<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(&path)
        .with_context(|| format!("Failed to open dataset file: {}", path.as_ref().display()))?;

    let mut records = Vec::new();
    for (row_idx, result) in reader.deserialize::<CollegeRecord>().enumerate() {
        let record = result.with_context(|| format!("Invalid college at row {}", row_idx + 1))?;
        records.push(record);
    }

    let dataset = Dataset::from_records(records)
        .with_context(|| format!("Invalid dataset file: {}", path.as_ref().display()))?;
    log::info!(
        "Loaded {} colleges from {}",
        dataset.len(),
        path.as_ref().display()
    );
    Ok(dataset)
}
