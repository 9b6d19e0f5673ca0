// Guarded arithmetic shared by the valuation stages.
//
// Every ratio in the pipeline goes through `safe_divide` or
// `normalize_by_max`: a zero denominator yields 0 rather than NaN/inf.

/// `numerator / denominator`, or 0.0 when the denominator is zero.
pub fn safe_divide(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Arithmetic mean; 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance (N denominator); 0.0 for an empty slice.
pub fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// Rescale `value` against a league-wide maximum. A non-positive maximum
/// means nobody scored, so everyone normalizes to 0.
pub fn normalize_by_max(value: f64, max: f64) -> f64 {
    if max > 0.0 {
        value / max
    } else {
        0.0
    }
}

/// Round to `decimals` places using the exact decimal value of `value`, so
/// 1.2345 (stored as 1.23449999...) rounds down to 1.234.
pub fn round_to(value: f64, decimals: usize) -> f64 {
    format!("{value:.decimals$}").parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn safe_divide_by_zero_is_zero() {
        for a in [-12.5, -1.0, 0.0, 1.0, 3.7, 1e9] {
            assert_eq!(safe_divide(a, 0.0), 0.0);
        }
    }

    #[test]
    fn safe_divide_zero_numerator_is_zero() {
        for b in [-4.0, 0.5, 1.0, 38.0] {
            assert_eq!(safe_divide(0.0, b), 0.0);
        }
    }

    #[test]
    fn safe_divide_regular_ratio() {
        assert!(approx_eq(safe_divide(60.0, 8.0), 7.5, 1e-12));
    }

    #[test]
    fn mean_and_variance_known_values() {
        // Mean 5, population variance 4.
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!(approx_eq(mean(&values), 5.0, 1e-12));
        assert!(approx_eq(population_variance(&values), 4.0, 1e-12));
    }

    #[test]
    fn mean_and_variance_of_empty_slice_are_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(population_variance(&[]), 0.0);
    }

    #[test]
    fn maximum_normalizes_to_exactly_one() {
        let raw = [0.37, 2.9, 1.25, 2.9001, 0.0];
        let max = raw.iter().copied().fold(0.0, f64::max);
        let normalized: Vec<f64> = raw.iter().map(|v| normalize_by_max(*v, max)).collect();
        assert_eq!(normalized[3], 1.0);
        assert!(normalized.iter().all(|v| *v <= 1.0));
    }

    #[test]
    fn zero_maximum_normalizes_to_zero() {
        assert_eq!(normalize_by_max(5.0, 0.0), 0.0);
        assert_eq!(normalize_by_max(-2.0, 0.0), 0.0);
    }

    #[test]
    fn rounds_to_three_places() {
        assert!(approx_eq(round_to(1.23456, 3), 1.235, 1e-12));
        assert!(approx_eq(round_to(0.9994, 3), 0.999, 1e-12));
    }

    #[test]
    fn rounding_follows_stored_decimal_value() {
        assert_eq!(round_to(1.2345, 3), 1.234);
        assert_eq!(round_to(0.1235, 3), 0.123);
        assert_eq!(round_to(1.0005, 3), 1.0);
        assert_eq!(round_to(-1.2345, 3), -1.234);
        assert_eq!(round_to(1.117108, 3), 1.117);
    }
}
