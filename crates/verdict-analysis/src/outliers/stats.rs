//! Small descriptive-statistics helpers shared by the detectors.

use statrs::distribution::{ContinuousCDF, StudentsT};

pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance (n - 1 denominator). NaN for fewer than two values.
pub fn sample_variance(values: &[f64], mean: f64) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0)
}

/// Sample standard deviation, or `None` when it is zero or not finite.
pub fn positive_std(values: &[f64], mean: f64) -> Option<f64> {
    let variance = sample_variance(values, mean);
    if !variance.is_finite() || variance <= 0.0 {
        return None;
    }
    let std = variance.sqrt();
    (std > 0.0 && std.is_finite()).then_some(std)
}

pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

pub fn median(values: &[f64]) -> f64 {
    let sorted = sorted(values);
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// Percentile of already sorted data using linear interpolation.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }

    let rank = (p / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;

    if upper >= sorted.len() {
        sorted[sorted.len() - 1]
    } else {
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

/// Upper quantile of Student's t with `df` degrees of freedom.
pub fn t_quantile(p: f64, df: f64) -> Option<f64> {
    if df <= 0.0 {
        return None;
    }
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    let t = dist.inverse_cdf(p);
    t.is_finite().then_some(t)
}

/// CDF of Student's t with `df` degrees of freedom.
pub fn t_cdf(x: f64, df: f64) -> Option<f64> {
    if df <= 0.0 || !x.is_finite() {
        return None;
    }
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    Some(dist.cdf(x))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_basic() {
        let sorted = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((percentile(&sorted, 50.0) - 3.0).abs() < 1e-10);
        assert!((percentile(&sorted, 25.0) - 2.0).abs() < 1e-10);
    }

    #[test]
    fn median_even_and_odd() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), 2.5);
    }

    #[test]
    fn constant_sample_has_no_positive_std() {
        let v = [2.0; 5];
        assert!(positive_std(&v, mean(&v)).is_none());
    }

    #[test]
    fn t_quantile_matches_table() {
        // t_{0.975, 10} = 2.228
        let t = t_quantile(0.975, 10.0).unwrap();
        assert!((t - 2.228).abs() < 1e-3);
    }
}
