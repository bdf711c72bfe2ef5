//! Per-feature standardization shared by dataset rows and user queries.
//!
//! `ScalingParameters` are fit once over the full dataset and then reused
//! unchanged, so a scaled query and a scaled candidate always live in the
//! same space. Features with zero spread are scaled by 1.0 (centering only).

use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use crate::error::ScalerError;
use crate::record::{CollegeRecord, Dataset, Feature};

/// Fitted per-feature mean and standard deviation, in [`Feature::ALL`] order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScalingParameters {
    /// Feature names, checked against the fixed layout when loaded.
    pub features: Vec<String>,
    pub mean: Vec<f64>,
    /// Divisor per feature; degenerate features hold 1.0.
    pub std: Vec<f64>,
    pub n_samples: usize,
    pub fitted_at: DateTime<Utc>,
}

impl ScalingParameters {
    /// Spreads below this are treated as zero.
    const MIN_STD: f64 = 1e-12;

    /// Check that persisted parameters describe the current feature layout.
    pub fn validate(&self) -> Result<(), ScalerError> {
        let expected: Vec<&str> = Feature::ALL.iter().map(|f| f.column_name()).collect();
        if self.features != expected {
            return Err(ScalerError::InvalidParameters(format!(
                "feature order {:?} does not match {:?}",
                self.features, expected
            )));
        }
        if self.mean.len() != Feature::COUNT || self.std.len() != Feature::COUNT {
            return Err(ScalerError::InvalidParameters(format!(
                "expected {} means and deviations, got {} and {}",
                Feature::COUNT,
                self.mean.len(),
                self.std.len()
            )));
        }
        for (feature, (&mean, &std)) in Feature::ALL.iter().zip(self.mean.iter().zip(&self.std)) {
            if !mean.is_finite() || !std.is_finite() || std <= 0.0 {
                return Err(ScalerError::InvalidParameters(format!(
                    "{} has mean {} and scale {}",
                    feature, mean, std
                )));
            }
        }
        Ok(())
    }

    pub fn mean_of(&self, feature: Feature) -> f64 {
        self.mean[feature.index()]
    }

    pub fn std_of(&self, feature: Feature) -> f64 {
        self.std[feature.index()]
    }
}

/// Fit `ScalingParameters` over every row of `dataset` (population std).
pub fn fit_scaler(dataset: &Dataset) -> ScalingParameters {
    let x = dataset.feature_matrix();
    let mean = x
        .mean_axis(Axis(0))
        .unwrap_or_else(|| Array1::zeros(Feature::COUNT));
    let std = x.std_axis(Axis(0), 0.0);

    let std = Feature::ALL
        .iter()
        .map(|&feature| {
            let s = std[feature.index()];
            if s < ScalingParameters::MIN_STD {
                log::warn!(
                    "Feature {} has no spread across {} rows, using identity scaling",
                    feature,
                    dataset.len()
                );
                1.0
            } else {
                s
            }
        })
        .collect();

    log::debug!("Fitted scaler over {} rows", dataset.len());

    ScalingParameters {
        features: Feature::ALL
            .iter()
            .map(|f| f.column_name().to_string())
            .collect(),
        mean: mean.to_vec(),
        std,
        n_samples: dataset.len(),
        fitted_at: Utc::now(),
    }
}

#[derive(Clone, Debug)]
struct Fitted {
    params: ScalingParameters,
    mean: Array1<f64>,
    std: Array1<f64>,
}

impl Fitted {
    fn new(params: ScalingParameters) -> Self {
        let mean = Array1::from(params.mean.clone());
        let std = Array1::from(params.std.clone());
        Self { params, mean, std }
    }
}

/// Standard scaler over the nine college features.
///
/// A default-constructed scaler is unfitted and refuses to transform until
/// [`Scaler::fit`] is called or parameters are supplied.
#[derive(Clone, Debug, Default)]
pub struct Scaler {
    fitted: Option<Fitted>,
}

impl Scaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap previously fitted (typically persisted) parameters.
    pub fn from_parameters(params: ScalingParameters) -> Result<Self, ScalerError> {
        params.validate()?;
        Ok(Self {
            fitted: Some(Fitted::new(params)),
        })
    }

    /// Fit over `dataset`, replacing any previous parameters.
    pub fn fit(&mut self, dataset: &Dataset) -> &ScalingParameters {
        let fitted = self.fitted.insert(Fitted::new(fit_scaler(dataset)));
        &fitted.params
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    pub fn parameters(&self) -> Option<&ScalingParameters> {
        self.fitted.as_ref().map(|f| &f.params)
    }

    fn fitted(&self) -> Result<&Fitted, ScalerError> {
        self.fitted.as_ref().ok_or(ScalerError::NotFitted)
    }

    /// Scale one feature vector given in [`Feature::ALL`] order.
    pub fn transform(&self, values: &[f64]) -> Result<Array1<f64>, ScalerError> {
        let fitted = self.fitted()?;
        check_vector(ArrayView1::from(values))?;
        let v = ArrayView1::from(values);
        Ok((&v - &fitted.mean) / &fitted.std)
    }

    pub fn transform_record(&self, record: &CollegeRecord) -> Result<Array1<f64>, ScalerError> {
        self.transform(&record.features())
    }

    /// Scale every row of a (rows x [`Feature::COUNT`]) matrix.
    pub fn transform_all(&self, x: &Array2<f64>) -> Result<Array2<f64>, ScalerError> {
        let fitted = self.fitted()?;
        for row in x.rows() {
            check_vector(row)?;
        }
        Ok((x - &fitted.mean) / &fitted.std)
    }

    /// Scale the feature vectors of `records`, one row per record.
    pub fn transform_records<'a, I>(&self, records: I) -> Result<Array2<f64>, ScalerError>
    where
        I: IntoIterator<Item = &'a CollegeRecord>,
    {
        let rows: Vec<f64> = records.into_iter().flat_map(|r| r.features()).collect();
        let n = rows.len() / Feature::COUNT;
        let x = Array2::from_shape_vec((n, Feature::COUNT), rows).map_err(|_| {
            ScalerError::DimensionMismatch {
                expected: Feature::COUNT,
                actual: n,
            }
        })?;
        self.transform_all(&x)
    }

    /// Undo [`Scaler::transform`]: `v' * std + mean`.
    pub fn inverse_transform(&self, scaled: &[f64]) -> Result<Array1<f64>, ScalerError> {
        let fitted = self.fitted()?;
        check_vector(ArrayView1::from(scaled))?;
        let v = ArrayView1::from(scaled);
        Ok(&v * &fitted.std + &fitted.mean)
    }
}

fn check_vector(values: ArrayView1<f64>) -> Result<(), ScalerError> {
    if values.len() > Feature::COUNT {
        return Err(ScalerError::DimensionMismatch {
            expected: Feature::COUNT,
            actual: values.len(),
        });
    }
    if values.len() < Feature::COUNT {
        return Err(ScalerError::MissingFeature(
            Feature::ALL[values.len()].column_name(),
        ));
    }
    match values.iter().position(|v| !v.is_finite()) {
        Some(idx) => Err(ScalerError::MissingFeature(Feature::ALL[idx].column_name())),
        None => Ok(()),
    }
}
