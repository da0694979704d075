//! Modified Z-Score / MAD (robust to extreme outliers).
//!
//! Uses median instead of mean, MAD instead of stddev:
//! M_i = (x_i - median) / (1.4826 · MAD).

use verdict_core::constants::MAD_CONSISTENCY;
use verdict_core::errors::DetectionError;
use verdict_core::NumericSample;

use crate::outliers::stats::median;
use crate::outliers::types::{Detection, DetectionOutcome, ExtremeSide, OutlierMethod, OutlierResult};

const METHOD: OutlierMethod = OutlierMethod::Mad;

/// Detect outliers with |modified z| > `threshold` (default 3.0).
pub fn detect(sample: &NumericSample, threshold: f64) -> DetectionOutcome {
    let n = sample.len();
    if n < 3 {
        return Err(DetectionError::insufficient(METHOD.name(), 3, n));
    }

    let values = sample.values();
    let center = median(values);
    let deviations: Vec<f64> = values.iter().map(|v| (v - center).abs()).collect();
    let mad = median(&deviations);

    if mad <= 0.0 || !mad.is_finite() {
        return Err(DetectionError::degenerate(METHOD.name(), "median absolute deviation is zero"));
    }

    let scale = MAD_CONSISTENCY * mad;
    let outliers = sample
        .iter()
        .filter_map(|(row, val)| {
            let modified_z = (val - center) / scale;
            (modified_z.abs() > threshold).then(|| OutlierResult {
                row,
                value: val,
                test_statistic: modified_z,
                critical_value: Some(threshold),
                p_value: None,
                extreme: Some(ExtremeSide::of(val, center)),
                method: METHOD,
            })
        })
        .collect();

    Ok(Detection::new(METHOD, outliers))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_outliers_in_a_ramp() {
        let values: Vec<f64> = (1..=20).map(|i| i as f64).collect();
        assert!(detect(&NumericSample::from_values(&values), 3.0).unwrap().is_empty());
    }

    #[test]
    fn robust_to_a_minority_of_outliers() {
        let mut values: Vec<f64> = (0..30).map(|i| 10.0 + (i % 5) as f64).collect();
        for v in values.iter_mut().take(8) {
            *v = 100.0;
        }
        let d = detect(&NumericSample::from_values(&values), 3.0).unwrap();
        assert_eq!(d.len(), 8);
    }

    #[test]
    fn zero_mad_is_degenerate() {
        let mut values = vec![10.0; 20];
        values[0] = 1000.0;
        let err = detect(&NumericSample::from_values(&values), 3.0).unwrap_err();
        assert!(matches!(err, DetectionError::Degenerate { .. }));
    }
}
