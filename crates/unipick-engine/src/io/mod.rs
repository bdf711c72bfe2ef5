//! Reading and writing the prepared artifacts: the normalized dataset (CSV)
//! and the fitted scaling parameters (JSON).

pub mod dataset;
pub mod scaling;

use std::path::Path;

use anyhow::{Context, Result};

use crate::config::RecommenderConfig;
use crate::recommend::RecommendationContext;

pub use dataset::{read_dataset_csv, write_dataset_csv};
pub use scaling::{read_scaling_parameters, write_scaling_parameters};

/// Load both artifacts and build a ready-to-query context.
pub fn load_context<P: AsRef<Path>, Q: AsRef<Path>>(
    dataset_path: P,
    scaling_path: Q,
    config: RecommenderConfig,
) -> Result<RecommendationContext> {
    let dataset = read_dataset_csv(&dataset_path)?;
    let params = read_scaling_parameters(&scaling_path)?;
    RecommendationContext::new(dataset, params, config).with_context(|| {
        format!(
            "Scaling parameters {} cannot be used",
            scaling_path.as_ref().display()
        )
    })
}
