//! Mahalanobis distance from the multivariate mean.
//!
//! d(x) = sqrt((x - μ)ᵀ Σ⁻¹ (x - μ)), flagged when d exceeds the threshold.

use verdict_core::errors::DetectionError;
use verdict_core::NumericMatrix;

use super::linalg::{column_means, covariance, invert_covariance, quadratic_form};
use crate::outliers::types::{Detection, DetectionOutcome, OutlierMethod, OutlierResult};

const METHOD: OutlierMethod = OutlierMethod::Mahalanobis;

/// Distance of every matrix row, in matrix row order.
pub fn distances(matrix: &NumericMatrix) -> Result<Vec<f64>, DetectionError> {
    let n = matrix.n_rows();
    let p = matrix.n_cols();
    if p < 2 {
        return Err(DetectionError::insufficient(METHOD.name(), 2, p));
    }
    if n < 2 {
        return Err(DetectionError::insufficient(METHOD.name(), 2, n));
    }

    let means = column_means(matrix.rows(), p);
    let cov = covariance(matrix.rows(), &means);
    let Some((inverse, _det)) = invert_covariance(&cov) else {
        return Err(DetectionError::degenerate(METHOD.name(), "covariance matrix is singular"));
    };

    matrix
        .rows()
        .iter()
        .map(|row| {
            let centered: Vec<f64> = row.iter().zip(&means).map(|(x, m)| x - m).collect();
            let d2 = quadratic_form(&inverse, &centered);
            if d2.is_finite() {
                Ok(d2.max(0.0).sqrt())
            } else {
                Err(DetectionError::computation(METHOD.name(), "non-finite distance"))
            }
        })
        .collect()
}

/// Flag rows whose distance exceeds `threshold` (default 3.0).
pub fn detect(matrix: &NumericMatrix, threshold: f64) -> DetectionOutcome {
    let distances = distances(matrix)?;
    let outliers = distances
        .iter()
        .zip(matrix.row_ids())
        .filter(|(d, _)| **d > threshold)
        .map(|(&d, &row)| OutlierResult {
            row,
            value: d,
            test_statistic: d,
            critical_value: Some(threshold),
            p_value: None,
            extreme: None,
            method: METHOD,
        })
        .collect();
    Ok(Detection::new(METHOD, outliers))
}
