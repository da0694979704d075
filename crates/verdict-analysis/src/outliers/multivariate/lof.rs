//! Local outlier factor.
//!
//! Compares each row's local density (inverse mean reachability distance to
//! its k nearest neighbours) with that of the neighbours. LOF around 1 means
//! "as dense as the neighbourhood"; well above 1 means isolated.

use verdict_core::constants::{LOF_MAX_NEIGHBORS, LOF_MIN_NEIGHBORS, LOF_MIN_ROWS};
use verdict_core::errors::DetectionError;
use verdict_core::NumericMatrix;

use super::below_contamination_offset;
use super::linalg::euclidean;
use crate::outliers::types::{Detection, DetectionOutcome, OutlierMethod, OutlierResult};

const METHOD: OutlierMethod = OutlierMethod::LocalOutlierFactor;

/// Neighbourhood size: explicit value, or n/10 clamped to [10, 20], never more than n - 1.
pub fn neighbourhood_size(n_rows: usize, requested: Option<usize>) -> usize {
    let k = requested.unwrap_or_else(|| (n_rows / 10).clamp(LOF_MIN_NEIGHBORS, LOF_MAX_NEIGHBORS));
    k.max(1).min(n_rows.saturating_sub(1))
}

/// LOF of every row, in matrix row order.
pub fn factors(matrix: &NumericMatrix, n_neighbors: Option<usize>) -> Result<Vec<f64>, DetectionError> {
    let n = matrix.n_rows();
    if n < LOF_MIN_ROWS {
        return Err(DetectionError::insufficient(METHOD.name(), LOF_MIN_ROWS, n));
    }
    let k = neighbourhood_size(n, n_neighbors);
    let rows = matrix.rows();

    // (distance, index) of the k nearest other rows, ties broken by index
    let neighbours: Vec<Vec<(f64, usize)>> = (0..n)
        .map(|i| {
            let mut dists: Vec<(f64, usize)> = (0..n)
                .filter(|&j| j != i)
                .map(|j| (euclidean(&rows[i], &rows[j]), j))
                .collect();
            dists.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            dists.truncate(k);
            dists
        })
        .collect();

    let k_distance: Vec<f64> = neighbours
        .iter()
        .map(|nb| nb.last().map_or(0.0, |(d, _)| *d))
        .collect();

    let lrd: Vec<f64> = neighbours
        .iter()
        .map(|nb| {
            let reach: f64 = nb.iter().map(|&(d, j)| k_distance[j].max(d)).sum();
            1.0 / (reach / nb.len() as f64 + 1e-10)
        })
        .collect();

    let lof: Vec<f64> = neighbours
        .iter()
        .enumerate()
        .map(|(i, nb)| {
            let mean_neighbour_lrd = nb.iter().map(|&(_, j)| lrd[j]).sum::<f64>() / nb.len() as f64;
            mean_neighbour_lrd / lrd[i]
        })
        .collect();

    if lof.iter().any(|v| !v.is_finite()) {
        return Err(DetectionError::computation(METHOD.name(), "non-finite local outlier factor"));
    }
    Ok(lof)
}

/// Flag the `contamination` share of rows with the highest LOF.
pub fn detect(matrix: &NumericMatrix, contamination: f64, n_neighbors: Option<usize>) -> DetectionOutcome {
    let lof = factors(matrix, n_neighbors)?;
    let scores: Vec<f64> = lof.iter().map(|v| -v).collect();
    let (offset, flagged) = below_contamination_offset(&scores, contamination);

    let ids = matrix.row_ids();
    let outliers = flagged
        .into_iter()
        .map(|i| OutlierResult {
            row: ids[i],
            value: lof[i],
            test_statistic: lof[i],
            critical_value: Some(-offset),
            p_value: None,
            extreme: None,
            method: METHOD,
        })
        .collect();
    Ok(Detection::new(METHOD, outliers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdict_core::RowId;

    fn grid_with_outlier() -> NumericMatrix {
        let mut rows: Vec<Vec<f64>> = (0..49)
            .map(|i| vec![(i % 7) as f64, (i / 7) as f64])
            .collect();
        rows.push(vec![40.0, 40.0]);
        let ids = (0..rows.len()).map(RowId).collect();
        NumericMatrix::new(vec!["x".into(), "y".into()], ids, rows).unwrap()
    }

    #[test]
    fn isolated_point_has_largest_factor() {
        let lof = factors(&grid_with_outlier(), None).unwrap();
        let (max_idx, _) = lof
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .unwrap();
        assert_eq!(max_idx, 49);
        assert!(lof[49] > 2.0);
    }

    #[test]
    fn detect_flags_isolated_point() {
        let d = detect(&grid_with_outlier(), 0.05, None).unwrap();
        assert!(d.contains(RowId(49)));
    }

    #[test]
    fn neighbourhood_size_defaults() {
        assert_eq!(neighbourhood_size(50, None), 10);
        assert_eq!(neighbourhood_size(150, None), 15);
        assert_eq!(neighbourhood_size(1000, None), 20);
        assert_eq!(neighbourhood_size(12, Some(30)), 11);
    }

    #[test]
    fn too_few_rows() {
        let m = NumericMatrix::new(
            vec!["x".into(), "y".into()],
            (0..5).map(RowId).collect(),
            (0..5).map(|i| vec![i as f64, 0.0]).collect(),
        )
        .unwrap();
        assert!(matches!(detect(&m, 0.1, None).unwrap_err(), DetectionError::InsufficientData { .. }));
    }
}
