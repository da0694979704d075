//! Detector primitives on the reference samples.

use verdict_analysis::outliers::hypothesis::{dixon, grubbs, rosner};
use verdict_analysis::outliers::multivariate::{isolation_forest, lof, mahalanobis};
use verdict_analysis::outliers::univariate::{iqr, mad, zscore};
use verdict_analysis::{DetectionOutcomeExt, OutlierMethod};
use verdict_core::errors::{DetectionError, VerdictErrorCode};
use verdict_core::{NumericMatrix, NumericSample, RowId};

fn reference_sample() -> NumericSample {
    NumericSample::from_values(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 100.0])
}

#[test]
fn test_reference_sample_iqr_grubbs_zscore_agree() {
    let sample = reference_sample();
    assert_eq!(iqr::detect_dynamic(&sample).unwrap().rows(), vec![RowId(10)]);
    assert_eq!(grubbs::detect(&sample, 0.05).unwrap().rows(), vec![RowId(10)]);
    assert_eq!(zscore::detect(&sample, 2.0).unwrap().rows(), vec![RowId(10)]);
    assert_eq!(mad::detect(&sample, 3.0).unwrap().rows(), vec![RowId(10)]);
}

#[test]
fn test_grubbs_never_flags_more_than_one() {
    let sample = NumericSample::from_values(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 100.0, 110.0]);
    assert!(grubbs::detect(&sample, 0.05).unwrap().len() <= 1);
}

#[test]
fn test_rosner_two_extremes_most_severe_first() {
    let mut values: Vec<f64> = (0..25).map(|i| 10.0 + ((i * 7) % 23) as f64 * 0.1).collect();
    values[3] = 28.0;
    values[20] = 45.0;
    let d = rosner::detect(&NumericSample::from_values(&values), 0.05, Some(2)).unwrap();
    assert_eq!(d.rows(), vec![RowId(20), RowId(3)]);
    assert_eq!(d.outliers[0].value, 45.0);
    assert_eq!(d.outliers[1].value, 28.0);
}

#[test]
fn test_rosner_respects_bound() {
    let mut values: Vec<f64> = (0..30).map(|i| 10.0 + ((i * 7) % 23) as f64 * 0.1).collect();
    for (i, v) in [60.0, 70.0, 80.0, 90.0, 100.0].into_iter().enumerate() {
        values[i * 5] = v;
    }
    let sample = NumericSample::from_values(&values);
    assert!(rosner::detect(&sample, 0.05, Some(3)).unwrap().len() <= 3);
    // default bound: max(1, 10% of 30) = 3
    assert!(rosner::detect(&sample, 0.05, None).unwrap().len() <= 3);
}

#[test]
fn test_dixon_thirty_one_is_unsupported() {
    let values: Vec<f64> = (0..31).map(|i| i as f64).collect();
    let err = dixon::detect(&NumericSample::from_values(&values), 0.05).unwrap_err();
    assert_eq!(err.error_code(), "UNSUPPORTED_PARAMETER");
    assert!(err.to_string().contains("unsupported sample size"));
}

#[test]
fn test_dixon_accepts_bounds() {
    assert!(dixon::detect(&NumericSample::from_values(&[1.0, 2.0, 10.0]), 0.05).is_ok());
    let thirty: Vec<f64> = (0..30).map(|i| i as f64).collect();
    assert!(dixon::detect(&NumericSample::from_values(&thirty), 0.05).is_ok());
}

#[test]
fn test_degenerate_samples_yield_errors_not_panics() {
    let flat = NumericSample::from_values(&[7.0; 40]);
    for outcome in [
        iqr::detect_dynamic(&flat),
        zscore::detect(&flat, 3.0),
        mad::detect(&flat, 3.0),
        grubbs::detect(&flat, 0.05),
        rosner::detect(&flat, 0.05, None),
    ] {
        assert!(matches!(outcome, Err(DetectionError::Degenerate { .. })));
    }
    assert!(iqr::detect_dynamic(&flat).or_empty(OutlierMethod::Iqr).is_empty());
}

#[test]
fn test_sample_ids_survive_missing_values() {
    let mut cells: Vec<Option<f64>> = (1..=10).map(|i| Some(i as f64)).collect();
    cells.insert(3, None);
    cells.push(Some(100.0));
    let sample = NumericSample::from_column(&cells);
    assert_eq!(zscore::detect(&sample, 2.0).unwrap().rows(), vec![RowId(11)]);
}

fn blob(n: usize, outlier: Option<(f64, f64)>) -> NumericMatrix {
    let mut rows: Vec<Vec<f64>> = (0..n)
        .map(|i| {
            let t = i as f64;
            vec![5.0 + (t * 0.61).sin(), 3.0 + (t * 1.7).cos() * 0.8]
        })
        .collect();
    if let Some((x, y)) = outlier {
        rows.push(vec![x, y]);
    }
    let ids = (0..rows.len()).map(RowId).collect();
    NumericMatrix::new(vec!["x".into(), "y".into()], ids, rows).unwrap()
}

#[test]
fn test_multivariate_methods_find_planted_point() {
    let m = blob(60, Some((15.0, -6.0)));
    let planted = RowId(60);
    assert!(mahalanobis::detect(&m, 3.0).unwrap().contains(planted));
    assert!(lof::detect(&m, 0.05, None).unwrap().contains(planted));
    assert!(isolation_forest::detect(&m, 0.05, 42).unwrap().contains(planted));
}

#[test]
fn test_contamination_bounds_flag_count() {
    let m = blob(100, None);
    let iso = isolation_forest::detect(&m, 0.05, 42).unwrap();
    assert!(iso.len() <= 5);
    let lof = lof::detect(&m, 0.10, Some(10)).unwrap();
    assert!(lof.len() <= 10);
}

#[test]
fn test_isolation_forest_is_reproducible() {
    let m = blob(80, Some((9.0, 9.0)));
    let a = isolation_forest::anomaly_scores(&m, 42).unwrap();
    let b = isolation_forest::anomaly_scores(&m, 42).unwrap();
    assert_eq!(a, b);
}
