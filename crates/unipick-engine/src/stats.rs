use statrs::statistics::{Data, Median};

/// Median of the finite values in `values`.
///
/// Non-finite entries (the normalizer uses `NaN` for an absent cell) are
/// ignored. For an even number of values the result is the mean of the two
/// middle values.
///
/// # Returns
///
/// `None` when no finite value is present.
pub fn median(values: &[f64]) -> Option<f64> {
    let present: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if present.is_empty() {
        return None;
    }
    Some(Data::new(present).median())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_odd_count() {
        let m = median(&[3.0, 1.0, 2.0]).unwrap();
        assert!((m - 2.0).abs() < 1e-9, "median = {}", m);
    }

    #[test]
    fn median_even_count_averages_middle_pair() {
        let m = median(&[400.0, 100.0, 300.0, 200.0]).unwrap();
        assert!((m - 250.0).abs() < 1e-9, "median = {}", m);
    }

    #[test]
    fn median_skips_missing() {
        let m = median(&[f64::NAN, 10.0, f64::NAN, 30.0]).unwrap();
        assert!((m - 20.0).abs() < 1e-9, "median = {}", m);
    }

    #[test]
    fn median_of_nothing_is_none() {
        assert!(median(&[]).is_none());
        assert!(median(&[f64::NAN]).is_none());
    }
}
