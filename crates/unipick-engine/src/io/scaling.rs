//! Scaling parameters JSON.
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::preprocessing::ScalingParameters;

pub fn write_scaling_parameters<P: AsRef<Path>>(params: &ScalingParameters, path: P) -> Result<()> {
    let file = File::create(&path)
        .with_context(|| format!("Failed to create scaler file: {}", path.as_ref().display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, params).context("Failed to serialize scaler")?;
    writer.flush().context("Failed to flush scaler file")?;
    log::info!("Wrote scaling parameters to {}", path.as_ref().display());
    Ok(())
}

/// Load and validate parameters against the current feature layout.
pub fn read_scaling_parameters<P: AsRef<Path>>(path: P) -> Result<ScalingParameters> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open scaler file: {}", path.as_ref().display()))?;
    let params: ScalingParameters = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse scaler file: {}", path.as_ref().display()))?;
    params
        .validate()
        .with_context(|| format!("Invalid scaler file: {}", path.as_ref().display()))?;
    log::debug!(
        "Loaded scaling parameters fitted on {} rows at {}",
        params.n_samples,
        params.fitted_at
    );
    Ok(params)
}
