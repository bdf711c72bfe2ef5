//! Error types for loading, scaling and querying.

use thiserror::Error;

/// Fatal failures while turning a raw college table into a `Dataset`.
#[derive(Debug, Error)]
pub enum NormalizationError {
    /// The source could not be opened or read.
    #[error("failed to read source: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed delimited text (unbalanced quotes, ragged rows, bad UTF-8).
    #[error("malformed CSV at row {row}: {source}")]
    Csv {
        row: usize,
        #[source]
        source: csv::Error,
    },

    /// No header row, or a header with no data rows beneath it.
    #[error("source is empty")]
    Empty,

    /// A required column is absent from the header.
    #[error("required column '{0}' not found in source header")]
    MissingColumn(String),

    /// A quality score that is neither a number nor a missing marker
    /// (only raised when strict score checking is enabled).
    #[error("invalid {column} value '{value}' at row {row}")]
    InvalidScore {
        row: usize,
        column: &'static str,
        value: String,
    },

    /// Two records share an identifier in an already-normalized table.
    #[error("duplicate college identifier '{0}'")]
    DuplicateIdentifier(String),

    /// A normalized table contains a missing or non-finite feature value.
    #[error("non-finite {column} value at row {row}")]
    NonFiniteValue { row: usize, column: &'static str },

    /// Every row was dropped during normalization.
    #[error("no usable rows remain after normalization ({dropped} dropped)")]
    NoUsableRows { dropped: usize },
}

/// Misuse of the feature scaler.
#[derive(Debug, Error, PartialEq)]
pub enum ScalerError {
    #[error("scaler has not been fit")]
    NotFitted,

    /// The input vector lacks a value for a feature (too short, or non-finite).
    #[error("feature '{0}' is missing from the input vector")]
    MissingFeature(&'static str),

    #[error("expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Persisted parameters disagree with the fixed feature layout.
    #[error("invalid scaling parameters: {0}")]
    InvalidParameters(String),
}

/// Failures of the nearest-neighbour index.
#[derive(Debug, Error, PartialEq)]
pub enum IndexError {
    #[error("query has {actual} dimensions, index expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("{points} indexed points but {tags} record references")]
    TagMismatch { points: usize, tags: usize },
}

/// Failures of a recommendation call. An insufficient candidate set is not an
/// error; see `Recommendation::InsufficientCandidates`.
#[derive(Debug, Error, PartialEq)]
pub enum RecommendError {
    #[error("invalid preference query: {0}")]
    InvalidQuery(String),

    #[error(transparent)]
    Scaler(#[from] ScalerError),

    #[error(transparent)]
    Index(#[from] IndexError),
}
