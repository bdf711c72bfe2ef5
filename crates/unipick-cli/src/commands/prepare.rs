//! Offline preparation: normalize the raw table, then fit the scaler.
use std::path::Path;

use anyhow::{Context, Result};
use unipick_engine::io::{read_dataset_csv, write_dataset_csv, write_scaling_parameters};
use unipick_engine::{fit_scaler, normalize_path, NormalizationReport, NormalizerConfig, ScalingParameters};

use crate::util::validate_csv_file;

/// Normalize `raw` and write the cleaned dataset to `output`.
pub fn run_prepare(raw: &Path, output: &Path, config: &NormalizerConfig) -> Result<NormalizationReport> {
    validate_csv_file(raw)?;
    let normalized = normalize_path(raw, config)
        .with_context(|| format!("Failed to normalize {}", raw.display()))?;
    write_dataset_csv(&normalized.dataset, output)?;
    Ok(normalized.report)
}

/// Fit scaling parameters over a cleaned dataset and write them to `output`.
pub fn run_fit(dataset: &Path, output: &Path) -> Result<ScalingParameters> {
    let dataset = read_dataset_csv(dataset)?;
    let params = fit_scaler(&dataset);
    write_scaling_parameters(&params, output)?;
    Ok(params)
}
