use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Settings for the record normalizer.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Cell values treated as absent (compared trimmed, case-insensitively).
    pub missing_markers: Vec<String>,
    /// Field delimiter of the raw table.
    pub delimiter: char,
    /// Fail the whole load on a quality score that is neither numeric nor a
    /// missing marker, instead of dropping the row.
    pub strict_scores: bool,
}

impl NormalizerConfig {
    pub fn is_missing(&self, value: &str) -> bool {
        let value = value.trim();
        self.missing_markers
            .iter()
            .any(|marker| marker.trim().eq_ignore_ascii_case(value))
    }

    /// The delimiter as the single byte the CSV reader expects; non-ASCII
    /// delimiters fall back to a comma.
    pub fn delimiter_byte(&self) -> u8 {
        if self.delimiter.is_ascii() {
            self.delimiter as u8
        } else {
            log::warn!(
                "Non-ASCII delimiter {:?} is not supported, using ','",
                self.delimiter
            );
            b','
        }
    }
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            missing_markers: ["--", "", "NA", "N/A", "nan", "null"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            delimiter: ',',
            strict_scores: false,
        }
    }
}

/// Settings for recommendation queries.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RecommenderConfig {
    /// Number of colleges to return, also the minimum candidate count.
    pub k: usize,
    /// Target value for Academic, Faculty, Infrastructure and Social_Life,
    /// which a preference query does not expose.
    pub default_score: f64,
    /// Accommodation target when the query gives no lower bound.
    pub default_accommodation: f64,
    /// Placement target when the query gives no lower bound.
    pub default_placement: f64,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            k: 5,
            default_score: 8.0,
            default_accommodation: 7.5,
            default_placement: 7.5,
        }
    }
}

/// Top-level configuration file layout.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct UnipickConfig {
    pub normalizer: NormalizerConfig,
    pub recommender: RecommenderConfig,
}

/// Load a configuration from a JSON file. Missing keys take their defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<UnipickConfig> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
    let config: UnipickConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
    Ok(config)
}
