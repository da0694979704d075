//! Grubbs' test: is the single most extreme value an outlier?
//!
//! G = max|x - mean| / s, compared against
//! G_crit = ((n-1)/√n)·√(t²/(n - 2 + t²)) with t = t_{1-α/(2n), n-2}.

use verdict_core::errors::DetectionError;
use verdict_core::{NumericSample, RowId};

use super::{extreme_deviate_critical_value, extreme_deviate_p_value};
use crate::outliers::stats::{mean, positive_std};
use crate::outliers::types::{Detection, DetectionOutcome, ExtremeSide, OutlierMethod, OutlierResult};

const METHOD: OutlierMethod = OutlierMethod::Grubbs;

/// Full result of one Grubbs test.
#[derive(Debug, Clone, PartialEq)]
pub struct GrubbsStatistics {
    pub statistic: f64,
    pub critical_value: f64,
    pub p_value: f64,
    /// Most extreme observation.
    pub candidate: RowId,
    pub candidate_value: f64,
    pub extreme: ExtremeSide,
    pub is_outlier: bool,
    pub sample_size: usize,
}

/// Compute G, its critical value and p-value.
pub fn statistics(sample: &NumericSample, alpha: f64) -> Result<GrubbsStatistics, DetectionError> {
    let n = sample.len();
    if n < 3 {
        return Err(DetectionError::insufficient(METHOD.name(), 3, n));
    }

    let values = sample.values();
    let mean = mean(values);
    let Some(stddev) = positive_std(values, mean) else {
        return Err(DetectionError::degenerate(METHOD.name(), "standard deviation is zero"));
    };

    let Some((candidate, candidate_value, statistic)) = sample
        .iter()
        .map(|(row, v)| (row, v, (v - mean).abs() / stddev))
        .max_by(|a, b| a.2.total_cmp(&b.2))
    else {
        return Err(DetectionError::insufficient(METHOD.name(), 3, n));
    };

    let critical_value = extreme_deviate_critical_value(n, alpha)
        .ok_or_else(|| DetectionError::computation(METHOD.name(), "critical value is not finite"))?;
    let p_value = extreme_deviate_p_value(statistic, n)
        .ok_or_else(|| DetectionError::computation(METHOD.name(), "p-value is not finite"))?;

    Ok(GrubbsStatistics {
        statistic,
        critical_value,
        p_value,
        candidate,
        candidate_value,
        extreme: ExtremeSide::of(candidate_value, mean),
        is_outlier: statistic > critical_value,
        sample_size: n,
    })
}

/// Flag at most one observation.
pub fn detect(sample: &NumericSample, alpha: f64) -> DetectionOutcome {
    let stats = statistics(sample, alpha)?;
    let outliers = if stats.is_outlier {
        vec![OutlierResult {
            row: stats.candidate,
            value: stats.candidate_value,
            test_statistic: stats.statistic,
            critical_value: Some(stats.critical_value),
            p_value: Some(stats.p_value),
            extreme: Some(stats.extreme),
            method: METHOD,
        }]
    } else {
        Vec::new()
    };
    Ok(Detection::new(METHOD, outliers))
}
