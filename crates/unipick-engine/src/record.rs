//! College records, the fixed feature layout, and the immutable `Dataset`.
//!
//! Every numeric vector in the crate (dataset rows, user queries, scaled
//! points in the neighbour index) uses the column order defined by
//! [`Feature::ALL`].
use std::collections::HashSet;
use std::fmt;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::NormalizationError;

/// The nine numeric attributes that describe a college in feature space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    UgFee,
    PgFee,
    Rating,
    Academic,
    Accommodation,
    Faculty,
    Infrastructure,
    Placement,
    SocialLife,
}

impl Feature {
    pub const COUNT: usize = 9;

    pub const ALL: [Feature; Feature::COUNT] = [
        Feature::UgFee,
        Feature::PgFee,
        Feature::Rating,
        Feature::Academic,
        Feature::Accommodation,
        Feature::Faculty,
        Feature::Infrastructure,
        Feature::Placement,
        Feature::SocialLife,
    ];

    /// The seven bounded quality scores (everything except the fees).
    pub const SCORES: [Feature; 7] = [
        Feature::Rating,
        Feature::Academic,
        Feature::Accommodation,
        Feature::Faculty,
        Feature::Infrastructure,
        Feature::Placement,
        Feature::SocialLife,
    ];

    /// Column header used in raw and normalized tables.
    pub fn column_name(self) -> &'static str {
        match self {
            Feature::UgFee => "UG_fee",
            Feature::PgFee => "PG_fee",
            Feature::Rating => "Rating",
            Feature::Academic => "Academic",
            Feature::Accommodation => "Accommodation",
            Feature::Faculty => "Faculty",
            Feature::Infrastructure => "Infrastructure",
            Feature::Placement => "Placement",
            Feature::SocialLife => "Social_Life",
        }
    }

    /// Position of this feature inside a feature vector.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_fee(self) -> bool {
        matches!(self, Feature::UgFee | Feature::PgFee)
    }

    pub fn from_column_name(name: &str) -> Option<Feature> {
        Feature::ALL.into_iter().find(|f| f.column_name() == name)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// One institution after normalization. Field names on disk match the raw
/// source headers so a normalized table can be read back with the same
/// column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollegeRecord {
    #[serde(rename = "College_Name")]
    pub name: String,
    #[serde(rename = "Stream")]
    pub stream: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "UG_fee")]
    pub ug_fee: f64,
    #[serde(rename = "PG_fee")]
    pub pg_fee: f64,
    #[serde(rename = "Rating")]
    pub rating: f64,
    #[serde(rename = "Academic")]
    pub academic: f64,
    #[serde(rename = "Accommodation")]
    pub accommodation: f64,
    #[serde(rename = "Faculty")]
    pub faculty: f64,
    #[serde(rename = "Infrastructure")]
    pub infrastructure: f64,
    #[serde(rename = "Placement")]
    pub placement: f64,
    #[serde(rename = "Social_Life")]
    pub social_life: f64,
    /// Map coordinates, only carried through for display consumers.
    #[serde(rename = "Latitude", default)]
    pub latitude: Option<f64>,
    #[serde(rename = "Longitude", default)]
    pub longitude: Option<f64>,
}

impl CollegeRecord {
    pub fn feature(&self, feature: Feature) -> f64 {
        match feature {
            Feature::UgFee => self.ug_fee,
            Feature::PgFee => self.pg_fee,
            Feature::Rating => self.rating,
            Feature::Academic => self.academic,
            Feature::Accommodation => self.accommodation,
            Feature::Faculty => self.faculty,
            Feature::Infrastructure => self.infrastructure,
            Feature::Placement => self.placement,
            Feature::SocialLife => self.social_life,
        }
    }

    /// The record's feature vector in [`Feature::ALL`] order.
    pub fn features(&self) -> [f64; Feature::COUNT] {
        Feature::ALL.map(|f| self.feature(f))
    }
}

/// Ordered, identifier-unique collection of normalized records.
///
/// A `Dataset` can only be built through [`Dataset::from_records`] (or the
/// normalizer, which goes through it), so every instance satisfies the
/// uniqueness and finiteness invariants.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<CollegeRecord>,
}

impl Dataset {
    /// Validate and wrap already-normalized records, keeping their order.
    pub fn from_records(records: Vec<CollegeRecord>) -> Result<Self, NormalizationError> {
        if records.is_empty() {
            return Err(NormalizationError::Empty);
        }

        check_records(&records)?;
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[CollegeRecord] {
        &self.records
    }

    pub fn get(&self, idx: usize) -> Option<&CollegeRecord> {
        self.records.get(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CollegeRecord> {
        self.records.iter()
    }

    pub fn find_by_name(&self, name: &str) -> Option<&CollegeRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    /// Distinct streams in first-seen order.
    pub fn streams(&self) -> Vec<&str> {
        distinct(self.records.iter().map(|r| r.stream.as_str()))
    }

    /// Distinct states in first-seen order.
    pub fn states(&self) -> Vec<&str> {
        distinct(self.records.iter().map(|r| r.state.as_str()))
    }

    /// All values of one feature column, in dataset order.
    pub fn feature_column(&self, feature: Feature) -> Vec<f64> {
        self.records.iter().map(|r| r.feature(feature)).collect()
    }

    /// Feature matrix with one row per record (rows x [`Feature::COUNT`]).
    pub fn feature_matrix(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.records.len(), Feature::COUNT), |(row, col)| {
            self.records[row].feature(Feature::ALL[col])
        })
    }

    pub fn into_records(self) -> Vec<CollegeRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a CollegeRecord;
    type IntoIter = std::slice::Iter<'a, CollegeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

fn check_records(records: &[CollegeRecord]) -> Result<(), NormalizationError> {
    let mut seen = HashSet::with_capacity(records.len());
    for (row, record) in records.iter().enumerate() {
        if !seen.insert(record.name.as_str()) {
            return Err(NormalizationError::DuplicateIdentifier(record.name.clone()));
        }
        if let Some(feature) = Feature::ALL
            .into_iter()
            .find(|&f| !record.feature(f).is_finite())
        {
            return Err(NormalizationError::NonFiniteValue {
                row: row + 1,
                column: feature.column_name(),
            });
        }
    }
    Ok(())
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    values.filter(|v| seen.insert(*v)).collect()
}
