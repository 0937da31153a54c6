//! Rolling-window statistics over slices of returns.

/// Arithmetic mean. Returns 0.0 for an empty slice; callers guarantee
/// non-empty windows.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
///
/// Returns 0.0 for slices shorter than two elements, where the sample
/// variance is undefined.
pub fn sample_stdev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_simple_slice() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0]), 2.5);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn stdev_matches_hand_computation() {
        // values 2, 4, 4, 4, 5, 5, 7, 9: sample variance 32/7
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let expected = (32.0f64 / 7.0).sqrt();
        assert!((sample_stdev(&values) - expected).abs() < 1e-12);
    }

    #[test]
    fn stdev_of_constant_window_is_zero() {
        assert_eq!(sample_stdev(&[3.0, 3.0, 3.0]), 0.0);
    }

    #[test]
    fn stdev_undefined_below_two_samples() {
        assert_eq!(sample_stdev(&[]), 0.0);
        assert_eq!(sample_stdev(&[42.0]), 0.0);
    }
}
