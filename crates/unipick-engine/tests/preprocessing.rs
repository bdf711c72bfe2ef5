//! Integration tests for the feature scaler.

use unipick_engine::{fit_scaler, CollegeRecord, Dataset, Feature, Scaler, ScalerError};

fn college(name: &str, ug_fee: f64, academic: f64, rating: f64) -> CollegeRecord {
    CollegeRecord {
        name: name.to_string(),
        stream: "CS".to_string(),
        state: "X".to_string(),
        ug_fee,
        pg_fee: ug_fee * 2.0,
        rating,
        academic,
        accommodation: 7.0,
        faculty: rating - 0.5,
        infrastructure: 6.0 + rating / 10.0,
        placement: 10.0 - rating,
        social_life: rating,
        latitude: None,
        longitude: None,
    }
}

fn four_colleges() -> Dataset {
    Dataset::from_records(vec![
        college("A", 1.0, 8.0, 6.0),
        college("B", 2.0, 8.0, 7.0),
        college("C", 3.0, 8.0, 8.0),
        college("D", 4.0, 8.0, 9.0),
    ])
    .unwrap()
}

// ---------------------------------------------------------------------------
// fit
// ---------------------------------------------------------------------------

#[test]
fn fit_computes_mean_and_population_std() {
    let params = fit_scaler(&four_colleges());

    assert_eq!(params.mean.len(), Feature::COUNT);
    assert_eq!(params.n_samples, 4);
    assert!((params.mean_of(Feature::UgFee) - 2.5).abs() < 1e-12);
    assert!((params.mean_of(Feature::PgFee) - 5.0).abs() < 1e-12);
    // population std of 1,2,3,4 = sqrt(1.25)
    assert!((params.std_of(Feature::UgFee) - 1.25f64.sqrt()).abs() < 1e-12);
    assert_eq!(
        params.features,
        Feature::ALL.iter().map(|f| f.column_name()).collect::<Vec<_>>()
    );
}

#[test]
fn zero_spread_feature_uses_identity_scale() {
    let params = fit_scaler(&four_colleges());
    // Academic and Accommodation are constant across all rows.
    assert_eq!(params.std_of(Feature::Academic), 1.0);
    assert_eq!(params.std_of(Feature::Accommodation), 1.0);

    let scaler = Scaler::from_parameters(params).unwrap();
    let mut v = four_colleges().records()[0].features();
    v[Feature::Academic.index()] = 9.0;
    let scaled = scaler.transform(&v).unwrap();
    assert!((scaled[Feature::Academic.index()] - 1.0).abs() < 1e-12);
    assert!(scaled.iter().all(|x| x.is_finite()));
}

#[test]
fn scaled_dataset_columns_are_centered() {
    let dataset = four_colleges();
    let mut scaler = Scaler::new();
    scaler.fit(&dataset);

    let scaled = scaler.transform_all(&dataset.feature_matrix()).unwrap();
    assert_eq!(scaled.shape(), &[4, Feature::COUNT]);
    for c in 0..Feature::COUNT {
        let col_mean: f64 = (0..4).map(|r| scaled[(r, c)]).sum::<f64>() / 4.0;
        assert!(col_mean.abs() < 1e-9, "col {} mean = {}", c, col_mean);
    }
}

// ---------------------------------------------------------------------------
// transform
// ---------------------------------------------------------------------------

#[test]
fn transform_before_fit_fails() {
    let scaler = Scaler::new();
    assert!(!scaler.is_fitted());
    assert_eq!(
        scaler.transform(&[0.0; Feature::COUNT]).unwrap_err(),
        ScalerError::NotFitted
    );
    assert_eq!(
        scaler.transform_all(&four_colleges().feature_matrix()).unwrap_err(),
        ScalerError::NotFitted
    );
}

#[test]
fn transform_reports_missing_feature() {
    let mut scaler = Scaler::new();
    scaler.fit(&four_colleges());

    assert_eq!(
        scaler.transform(&[1.0; 8]).unwrap_err(),
        ScalerError::MissingFeature("Social_Life")
    );

    let mut v = [1.0; Feature::COUNT];
    v[Feature::Rating.index()] = f64::NAN;
    assert_eq!(
        scaler.transform(&v).unwrap_err(),
        ScalerError::MissingFeature("Rating")
    );

    assert_eq!(
        scaler.transform(&[1.0; 10]).unwrap_err(),
        ScalerError::DimensionMismatch {
            expected: 9,
            actual: 10
        }
    );
}

#[test]
fn transform_then_inverse_round_trips() {
    let mut scaler = Scaler::new();
    scaler.fit(&four_colleges());

    let v = [175000.0, 90000.0, 7.3, 8.1, 6.4, 9.9, 5.5, 8.8, 7.0];
    let scaled = scaler.transform(&v).unwrap();
    let back = scaler.inverse_transform(scaled.as_slice().unwrap()).unwrap();
    for (orig, rec) in v.iter().zip(back.iter()) {
        assert!(
            (orig - rec).abs() <= 1e-9 * orig.abs().max(1.0),
            "{} != {}",
            orig,
            rec
        );
    }
}

#[test]
fn parameters_are_not_refit_per_call() {
    let dataset = four_colleges();
    let mut scaler = Scaler::new();
    let fitted_at = scaler.fit(&dataset).fitted_at;

    let row = dataset.records()[2].features();
    let first = scaler.transform(&row).unwrap();
    let subset = scaler.transform_records(dataset.records()[..2].iter()).unwrap();
    let second = scaler.transform(&row).unwrap();

    assert_eq!(first, second);
    assert_eq!(subset.nrows(), 2);
    assert_eq!(scaler.parameters().unwrap().fitted_at, fitted_at);
}

// ---------------------------------------------------------------------------
// persisted parameters
// ---------------------------------------------------------------------------

#[test]
fn from_parameters_rejects_mismatched_layout() {
    let mut params = fit_scaler(&four_colleges());
    params.features.swap(0, 1);
    assert!(matches!(
        Scaler::from_parameters(params).unwrap_err(),
        ScalerError::InvalidParameters(_)
    ));

    let mut params = fit_scaler(&four_colleges());
    params.std.pop();
    assert!(matches!(
        Scaler::from_parameters(params).unwrap_err(),
        ScalerError::InvalidParameters(_)
    ));

    let mut params = fit_scaler(&four_colleges());
    params.std[3] = 0.0;
    assert!(matches!(
        Scaler::from_parameters(params).unwrap_err(),
        ScalerError::InvalidParameters(_)
    ));
}
