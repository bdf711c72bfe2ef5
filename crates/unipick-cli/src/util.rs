use std::path::{Path, PathBuf};

use anyhow::Result;
use unipick_engine::config::{load_config, UnipickConfig};

pub fn validate_csv_file(path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());
    match ext.as_deref() {
        Some("csv") | Some("tsv") | Some("txt") => {}
        _ => anyhow::bail!("File must have a .csv, .tsv or .txt extension: {}", path.display()),
    }

    if !path.exists() {
        anyhow::bail!("File does not exist: {}", path.display());
    }

    Ok(())
}

/// Load the JSON config if one was given, otherwise fall back to defaults.
pub fn load_config_or_default(path: Option<&PathBuf>) -> Result<UnipickConfig> {
    match path {
        Some(path) => {
            log::info!("[unipick] Using config: {:?}", path);
            load_config(path)
        }
        None => {
            log::debug!("[unipick] No config provided; using defaults.");
            Ok(UnipickConfig::default())
        }
    }
}
