//! Rosner's generalized ESD test (n ≥ 25, several outliers).
//!
//! Repeatedly takes the most extreme studentized deviate of the working
//! sample, compares it against λ for the current working size and, if it
//! exceeds λ, removes it and tests again. Iteration stops at the first
//! deviate that does not exceed its critical value, when fewer than 3 values
//! remain, or when the working sample has no spread left.

use verdict_core::constants::ROSNER_MIN_N;
use verdict_core::errors::DetectionError;
use verdict_core::{NumericSample, RowId};

use super::{extreme_deviate_critical_value, extreme_deviate_p_value};
use crate::outliers::stats::{mean, positive_std};
use crate::outliers::types::{Detection, DetectionOutcome, ExtremeSide, OutlierMethod, OutlierResult};

const METHOD: OutlierMethod = OutlierMethod::Rosner;

/// One iteration of the test.
#[derive(Debug, Clone, PartialEq)]
pub struct RosnerStep {
    pub row: RowId,
    pub value: f64,
    /// Rᵢ = max|x - mean| / s over the working sample.
    pub statistic: f64,
    /// λᵢ.
    pub critical_value: f64,
    pub p_value: f64,
    pub working_size: usize,
    pub extreme: ExtremeSide,
    pub is_outlier: bool,
}

/// All iterations run, in removal order. Only the last one can be a non-outlier.
#[derive(Debug, Clone, PartialEq)]
pub struct RosnerStatistics {
    pub steps: Vec<RosnerStep>,
    /// Iteration bound actually used.
    pub max_outliers: usize,
    pub sample_size: usize,
}

impl RosnerStatistics {
    /// Accepted outliers, most severe first.
    pub fn outliers(&self) -> impl Iterator<Item = &RosnerStep> {
        self.steps.iter().filter(|s| s.is_outlier)
    }
}

/// Upper bound on iterations: the request or max(1, ⌊n/10⌋), never above n/2.
pub fn max_outliers(n: usize, requested: Option<usize>) -> usize {
    requested.unwrap_or_else(|| (n / 10).max(1)).min(n / 2)
}

pub fn statistics(
    sample: &NumericSample,
    alpha: f64,
    requested_max: Option<usize>,
) -> Result<RosnerStatistics, DetectionError> {
    let n = sample.len();
    if n < ROSNER_MIN_N {
        return Err(DetectionError::unsupported(
            METHOD.name(),
            format!("unsupported sample size {n} (Rosner's test needs at least {ROSNER_MIN_N} values)"),
        ));
    }
    let k = max_outliers(n, requested_max);

    let mut working: Vec<(RowId, f64)> = sample.iter().collect();
    let mut steps = Vec::with_capacity(k);

    for i in 0..k {
        let m = working.len();
        if m < 3 {
            break;
        }
        let values: Vec<f64> = working.iter().map(|(_, v)| *v).collect();
        let mean = mean(&values);
        let Some(stddev) = positive_std(&values, mean) else {
            if i == 0 {
                return Err(DetectionError::degenerate(METHOD.name(), "standard deviation is zero"));
            }
            break;
        };

        let Some((pos, &(row, value))) = working
            .iter()
            .enumerate()
            .max_by(|a, b| (a.1 .1 - mean).abs().total_cmp(&(b.1 .1 - mean).abs()))
        else {
            break;
        };
        let statistic = (value - mean).abs() / stddev;

        let (Some(critical_value), Some(p_value)) = (
            extreme_deviate_critical_value(m, alpha),
            extreme_deviate_p_value(statistic, m),
        ) else {
            break;
        };

        let is_outlier = statistic > critical_value;
        steps.push(RosnerStep {
            row,
            value,
            statistic,
            critical_value,
            p_value,
            working_size: m,
            extreme: ExtremeSide::of(value, mean),
            is_outlier,
        });
        if !is_outlier {
            break;
        }
        working.remove(pos);
    }

    Ok(RosnerStatistics {
        steps,
        max_outliers: k,
        sample_size: n,
    })
}

/// Flag up to `max_outliers` observations, most severe first.
pub fn detect(sample: &NumericSample, alpha: f64, max_outliers: Option<usize>) -> DetectionOutcome {
    let stats = statistics(sample, alpha, max_outliers)?;
    let outliers = stats
        .outliers()
        .map(|s| OutlierResult {
            row: s.row,
            value: s.value,
            test_statistic: s.statistic,
            critical_value: Some(s.critical_value),
            p_value: Some(s.p_value),
            extreme: Some(s.extreme),
            method: METHOD,
        })
        .collect();
    Ok(Detection::new(METHOD, outliers))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(n: usize) -> Vec<f64> {
        (0..n).map(|i| 10.0 + ((i * 7) % 23) as f64 * 0.1).collect()
    }

    #[test]
    fn two_injected_extremes_most_severe_first() {
        let mut values = base(25);
        values[5] = 40.0;
        values[17] = 30.0;
        let d = detect(&NumericSample::from_values(&values), 0.05, Some(2)).unwrap();
        assert_eq!(d.rows(), vec![RowId(5), RowId(17)]);
        assert!(d.outliers[0].test_statistic > d.outliers[0].critical_value.unwrap());
    }

    #[test]
    fn stops_at_first_non_outlier() {
        let mut values = base(30);
        values[0] = 100.0;
        let stats = statistics(&NumericSample::from_values(&values), 0.05, Some(3)).unwrap();
        assert_eq!(stats.outliers().count(), 1);
        assert_eq!(stats.steps.len(), 2);
        assert!(!stats.steps[1].is_outlier);
    }

    #[test]
    fn default_bound_is_ten_percent() {
        assert_eq!(max_outliers(25, None), 2);
        assert_eq!(max_outliers(9, None), 1);
        assert_eq!(max_outliers(30, Some(100)), 15);
    }

    #[test]
    fn small_samples_are_unsupported() {
        let err = detect(&NumericSample::from_values(&base(24)), 0.05, None).unwrap_err();
        assert!(matches!(err, DetectionError::UnsupportedParameter { .. }));
    }

    #[test]
    fn constant_sample_is_degenerate() {
        let err = detect(&NumericSample::from_values(&[3.0; 30]), 0.05, None).unwrap_err();
        assert!(matches!(err, DetectionError::Degenerate { .. }));
    }
}
