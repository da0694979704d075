//! Z-Score detection: |x - mean| / std above a threshold.

use verdict_core::errors::DetectionError;
use verdict_core::NumericSample;

use crate::normality::{check_normality, NormalityAssessment};
use crate::outliers::stats::{mean, positive_std};
use crate::outliers::types::{Detection, DetectionOutcome, ExtremeSide, OutlierMethod, OutlierResult};

const METHOD: OutlierMethod = OutlierMethod::ZScore;

/// Detect outliers with |z| > `threshold` (default 3.0).
pub fn detect(sample: &NumericSample, threshold: f64) -> DetectionOutcome {
    let n = sample.len();
    if n < 2 {
        return Err(DetectionError::insufficient(METHOD.name(), 2, n));
    }

    let values = sample.values();
    let mean = mean(values);
    let Some(stddev) = positive_std(values, mean) else {
        return Err(DetectionError::degenerate(METHOD.name(), "standard deviation is zero"));
    };

    let outliers = sample
        .iter()
        .filter_map(|(row, val)| {
            let z = (val - mean) / stddev;
            (z.abs() > threshold).then(|| OutlierResult {
                row,
                value: val,
                test_statistic: z,
                critical_value: Some(threshold),
                p_value: None,
                extreme: Some(ExtremeSide::of(val, mean)),
                method: METHOD,
            })
        })
        .collect();

    Ok(Detection::new(METHOD, outliers))
}

/// Run the normality checker first, log a warning if the sample does not
/// look normal, then detect anyway. The assessment is returned for callers
/// that want to surface the warning themselves.
pub fn detect_with_normality_check(
    sample: &NumericSample,
    threshold: f64,
    alpha: f64,
) -> (DetectionOutcome, NormalityAssessment) {
    let assessment = check_normality(sample.values(), alpha);
    if let Some(warning) = &assessment.warning {
        tracing::warn!(method = METHOD.name(), n = sample.len(), "{warning}");
    }
    (detect(sample, threshold), assessment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdict_core::RowId;

    #[test]
    fn flags_extreme_value_at_threshold_two() {
        let sample = NumericSample::from_values(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 100.0]);
        let d = detect(&sample, 2.0).unwrap();
        assert_eq!(d.rows(), vec![RowId(10)]);
        assert!(d.outliers[0].test_statistic > 2.0);
    }

    #[test]
    fn no_outliers_in_narrow_band() {
        let values: Vec<f64> = (0..50).map(|i| 50.0 + (i as f64) * 0.1).collect();
        assert!(detect(&NumericSample::from_values(&values), 3.0).unwrap().is_empty());
    }

    #[test]
    fn zero_std_is_degenerate() {
        let err = detect(&NumericSample::from_values(&[5.0; 50]), 3.0).unwrap_err();
        assert!(matches!(err, DetectionError::Degenerate { .. }));
    }

    #[test]
    fn normality_check_does_not_block_detection() {
        let values: Vec<f64> = (0..30).map(|i| (i as f64 / 3.0).exp()).collect();
        let (outcome, assessment) = detect_with_normality_check(&NumericSample::from_values(&values), 2.0, 0.05);
        assert!(!assessment.is_normal);
        assert!(outcome.is_ok());
    }
}
