//! Preference-driven college ranking.
//!
//! A recommendation call filters the dataset by stream, state and minimum
//! rating, turns the user's preferences into a feature vector, scales both
//! with the dataset-wide parameters, and ranks the candidates with a
//! neighbour index built over just that candidate set.

use serde::{Deserialize, Serialize};

use crate::config::RecommenderConfig;
use crate::error::{RecommendError, ScalerError};
use crate::neighbors::NeighborIndex;
use crate::preprocessing::{Scaler, ScalingParameters};
use crate::record::{CollegeRecord, Dataset, Feature};

/// What a student asks for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceQuery {
    pub stream: String,
    pub state: String,
    /// Candidates must have at least this rating.
    pub min_rating: f64,
    /// Upper fee the student is willing to pay; used as the target for both
    /// fee features.
    pub budget: f64,
    #[serde(default)]
    pub min_accommodation: Option<f64>,
    #[serde(default)]
    pub min_placement: Option<f64>,
}

impl PreferenceQuery {
    pub const DEFAULT_BUDGET: f64 = 150_000.0;
    pub const DEFAULT_MIN_RATING: f64 = 7.0;

    pub fn new(stream: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            stream: stream.into(),
            state: state.into(),
            min_rating: Self::DEFAULT_MIN_RATING,
            budget: Self::DEFAULT_BUDGET,
            min_accommodation: None,
            min_placement: None,
        }
    }

    pub fn with_budget(mut self, budget: f64) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_min_rating(mut self, min_rating: f64) -> Self {
        self.min_rating = min_rating;
        self
    }

    pub fn with_min_accommodation(mut self, value: f64) -> Self {
        self.min_accommodation = Some(value);
        self
    }

    pub fn with_min_placement(mut self, value: f64) -> Self {
        self.min_placement = Some(value);
        self
    }

    fn validate(&self) -> Result<(), RecommendError> {
        if !self.budget.is_finite() || self.budget < 0.0 {
            return Err(RecommendError::InvalidQuery(format!(
                "budget must be a non-negative number, got {}",
                self.budget
            )));
        }
        let bounds = [
            ("min_rating", Some(self.min_rating)),
            ("min_accommodation", self.min_accommodation),
            ("min_placement", self.min_placement),
        ];
        for (name, value) in bounds {
            if let Some(v) = value.filter(|v| !v.is_finite()) {
                return Err(RecommendError::InvalidQuery(format!(
                    "{} must be finite, got {}",
                    name, v
                )));
            }
        }
        Ok(())
    }

    /// Stream and state match exactly and the rating meets the floor.
    pub fn matches(&self, record: &CollegeRecord) -> bool {
        record.stream == self.stream
            && record.state == self.state
            && record.rating >= self.min_rating
    }

    /// The point in feature space the student would ideally pick.
    pub fn feature_vector(&self, config: &RecommenderConfig) -> [f64; Feature::COUNT] {
        Feature::ALL.map(|feature| match feature {
            Feature::UgFee | Feature::PgFee => self.budget,
            Feature::Rating => self.min_rating,
            Feature::Accommodation => self
                .min_accommodation
                .unwrap_or(config.default_accommodation),
            Feature::Placement => self.min_placement.unwrap_or(config.default_placement),
            Feature::Academic
            | Feature::Faculty
            | Feature::Infrastructure
            | Feature::SocialLife => config.default_score,
        })
    }
}

/// A recommended college and its distance to the preference vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCollege<'a> {
    pub record: &'a CollegeRecord,
    pub distance: f64,
}

/// Colleges ordered nearest first (ties in dataset order).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResult<'a> {
    pub ranked: Vec<RankedCollege<'a>>,
}

impl<'a> RecommendationResult<'a> {
    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RankedCollege<'a>> {
        self.ranked.iter()
    }

    pub fn names(&self) -> Vec<&'a str> {
        self.ranked.iter().map(|r| r.record.name.as_str()).collect()
    }
}

/// Outcome of a recommendation call.
#[derive(Debug, Clone, PartialEq)]
pub enum Recommendation<'a> {
    Ranked(RecommendationResult<'a>),
    /// Fewer colleges passed the filters than were asked for. This is an
    /// expected answer ("no good matches"), not a failure.
    InsufficientCandidates { found: usize, required: usize },
}

impl<'a> Recommendation<'a> {
    pub fn is_insufficient(&self) -> bool {
        matches!(self, Recommendation::InsufficientCandidates { .. })
    }

    pub fn ranked(&self) -> Option<&RecommendationResult<'a>> {
        match self {
            Recommendation::Ranked(result) => Some(result),
            Recommendation::InsufficientCandidates { .. } => None,
        }
    }

    pub fn into_ranked(self) -> Option<RecommendationResult<'a>> {
        match self {
            Recommendation::Ranked(result) => Some(result),
            Recommendation::InsufficientCandidates { .. } => None,
        }
    }
}

/// Everything a recommendation needs, loaded once at start-up and shared by
/// reference with every call.
#[derive(Debug, Clone)]
pub struct RecommendationContext {
    dataset: Dataset,
    scaler: Scaler,
    config: RecommenderConfig,
}

impl RecommendationContext {
    /// Use persisted scaling parameters.
    pub fn new(
        dataset: Dataset,
        params: ScalingParameters,
        config: RecommenderConfig,
    ) -> Result<Self, ScalerError> {
        if params.n_samples != dataset.len() {
            log::warn!(
                "Scaling parameters were fit on {} rows but the dataset has {}",
                params.n_samples,
                dataset.len()
            );
        }
        Ok(Self {
            dataset,
            scaler: Scaler::from_parameters(params)?,
            config,
        })
    }

    /// Fit scaling parameters over `dataset` in place.
    pub fn fit(dataset: Dataset, config: RecommenderConfig) -> Self {
        let mut scaler = Scaler::new();
        scaler.fit(&dataset);
        Self {
            dataset,
            scaler,
            config,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn scaler(&self) -> &Scaler {
        &self.scaler
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    /// Recommend the configured number of colleges.
    pub fn recommend(&self, query: &PreferenceQuery) -> Result<Recommendation<'_>, RecommendError> {
        self.recommend_k(query, self.config.k)
    }

    pub fn recommend_k(
        &self,
        query: &PreferenceQuery,
        k: usize,
    ) -> Result<Recommendation<'_>, RecommendError> {
        rank(&self.dataset, &self.scaler, &self.config, query, k)
    }
}

/// Rank `dataset` against `query` using previously fitted `params`, with the
/// default query targets.
pub fn recommend<'a>(
    dataset: &'a Dataset,
    params: &ScalingParameters,
    query: &PreferenceQuery,
    k: usize,
) -> Result<Recommendation<'a>, RecommendError> {
    let scaler = Scaler::from_parameters(params.clone())?;
    rank(dataset, &scaler, &RecommenderConfig::default(), query, k)
}

fn rank<'a>(
    dataset: &'a Dataset,
    scaler: &Scaler,
    config: &RecommenderConfig,
    query: &PreferenceQuery,
    k: usize,
) -> Result<Recommendation<'a>, RecommendError> {
    query.validate()?;

    let candidates: Vec<usize> = dataset
        .iter()
        .enumerate()
        .filter(|(_, record)| query.matches(record))
        .map(|(idx, _)| idx)
        .collect();

    if candidates.len() < k {
        log::info!(
            "Only {} colleges match stream '{}', state '{}' and rating >= {} ({} required)",
            candidates.len(),
            query.stream,
            query.state,
            query.min_rating,
            k
        );
        return Ok(Recommendation::InsufficientCandidates {
            found: candidates.len(),
            required: k,
        });
    }

    let records = dataset.records();
    let target = scaler.transform(&query.feature_vector(config))?;
    let points = scaler.transform_records(candidates.iter().map(|&idx| &records[idx]))?;
    let index = NeighborIndex::fit(points, candidates)?;
    let hits = index.query(target.view(), k)?;

    log::debug!(
        "Ranked {} of {} candidates for stream '{}', state '{}'",
        hits.len(),
        index.len(),
        query.stream,
        query.state
    );

    Ok(Recommendation::Ranked(RecommendationResult {
        ranked: hits
            .into_iter()
            .map(|hit| RankedCollege {
                record: &records[hit.tag],
                distance: hit.distance,
            })
            .collect(),
    }))
}
