//! unipick-engine: college recommendations by nearest-neighbour search.
//!
//! This crate turns a loosely typed table of colleges into a clean numeric
//! dataset, fits a per-feature standard scaler over it, and ranks the
//! colleges that match a student's stream, state and rating floor by their
//! Euclidean distance to the student's preferences in scaled feature space.
//!
//! The usual flow is `normalize` once offline, `fit_scaler` once, persist
//! both with the `io` helpers, then build a `RecommendationContext` at
//! start-up and call `recommend` per request.
pub mod config;
pub mod error;
pub mod io;
pub mod neighbors;
pub mod normalize;
pub mod preprocessing;
pub mod recommend;
pub mod record;
pub mod stats;

pub use config::{NormalizerConfig, RecommenderConfig, UnipickConfig};
pub use error::{IndexError, NormalizationError, RecommendError, ScalerError};
pub use normalize::{normalize, normalize_path, NormalizationReport, NormalizedDataset};
pub use preprocessing::{fit_scaler, Scaler, ScalingParameters};
pub use recommend::{
    recommend, PreferenceQuery, RankedCollege, Recommendation, RecommendationContext,
    RecommendationResult,
};
pub use record::{CollegeRecord, Dataset, Feature};
