//! Descriptive statistics over sample slices.
//!
//! All helpers accept empty input and return `0.0` for it, so callers that
//! work on clipped windows do not have to special-case short trials.
/// Arithmetic mean.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}
/// Sample standard deviation (n - 1 normalisation).
pub fn std_dev(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    let mean = mean(data);
    let variance = data
        .iter()
        .map(|v| {
            let delta = v - mean;
            delta * delta
        })
        .sum::<f64>()
        / (data.len() - 1) as f64;
    variance.sqrt()
}
pub fn median(data: &[f64]) -> f64 {
    percentile(data, 50.0)
}
/// Percentile `p` (0..=100), interpolating linearly between order statistics
/// placed at `(i + 0.5) / n`.
pub fn percentile(data: &[f64], p: f64) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    percentile_sorted(&sorted, p)
}
/// Same as [`percentile`] for data that is already sorted ascending.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    let pos = (p / 100.0 * n as f64 - 0.5).clamp(0.0, (n - 1) as f64);
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
/// Largest absolute value, `0.0` for empty input.
pub fn abs_max(data: &[f64]) -> f64 {
    data.iter().fold(0.0f64, |acc, v| acc.max(v.abs()))
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn median_of_odd_and_even_lengths() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }
    #[test]
    fn percentile_clamps_to_extremes() {
        let data = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&data, 0.0), 1.0);
        assert_eq!(percentile(&data, 100.0), 4.0);
        // position 0.25 * 4 - 0.5 = 0.5 -> halfway between 1 and 2
        assert!((percentile(&data, 25.0) - 1.5).abs() < 1e-12);
    }
    #[test]
    fn std_dev_uses_sample_normalisation() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let expected = (32.0f64 / 7.0).sqrt();
        assert!((std_dev(&data) - expected).abs() < 1e-12);
        assert_eq!(std_dev(&[1.0]), 0.0);
    }
    #[test]
    fn nan_does_not_panic() {
        let value = percentile(&[1.0, f64::NAN, 2.0], 50.0);
        assert_eq!(value, 2.0);
    }
}
