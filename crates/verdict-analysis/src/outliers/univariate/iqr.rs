//! IQR with Tukey fences.
//!
//! Fences are Q1 - k·IQR and Q3 + k·IQR. The default k widens for small
//! samples, where quartiles are noisy: 3.0 below 100 values, 2.0 below
//! 1000, 1.5 otherwise.

use verdict_core::config::UnivariateConfig;
use verdict_core::errors::DetectionError;
use verdict_core::NumericSample;

use crate::outliers::stats::{percentile, sorted};
use crate::outliers::types::{Detection, DetectionOutcome, ExtremeSide, OutlierMethod, OutlierResult};

const METHOD: OutlierMethod = OutlierMethod::Iqr;

/// Detect outliers with the sample-size dependent default factor.
pub fn detect_dynamic(sample: &NumericSample) -> DetectionOutcome {
    detect(sample, UnivariateConfig::default().effective_iqr_factor(sample.len()))
}

/// Detect outliers using IQR fences with factor `k`.
pub fn detect(sample: &NumericSample, k: f64) -> DetectionOutcome {
    let n = sample.len();
    if n < 4 {
        return Err(DetectionError::insufficient(METHOD.name(), 4, n));
    }

    let sorted = sorted(sample.values());
    let q1 = percentile(&sorted, 25.0);
    let q3 = percentile(&sorted, 75.0);
    let iqr = q3 - q1;

    if iqr <= 0.0 || !iqr.is_finite() {
        return Err(DetectionError::degenerate(METHOD.name(), "interquartile range is zero"));
    }

    let lower_fence = q1 - k * iqr;
    let upper_fence = q3 + k * iqr;

    let outliers = sample
        .iter()
        .filter(|(_, val)| *val < lower_fence || *val > upper_fence)
        .map(|(row, val)| {
            let (fence, side) = if val < lower_fence {
                (lower_fence, ExtremeSide::Minimum)
            } else {
                (upper_fence, ExtremeSide::Maximum)
            };
            OutlierResult {
                row,
                value: val,
                test_statistic: (val - fence).abs() / iqr,
                critical_value: Some(fence),
                p_value: None,
                extreme: Some(side),
                method: METHOD,
            }
        })
        .collect();

    Ok(Detection::new(METHOD, outliers))
}
