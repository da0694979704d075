//! Multivariate detectors: flag rows that are anomalous across several
//! variables jointly. All run on the complete-case matrix.

pub mod isolation_forest;
pub mod linalg;
pub mod lof;
pub mod mahalanobis;

use crate::outliers::stats::{percentile, sorted};

/// Indices whose score falls strictly below the `contamination` percentile of all scores.
///
/// Scores follow the "higher is more normal" convention, so the lowest
/// `contamination` share of rows is flagged.
pub(crate) fn below_contamination_offset(scores: &[f64], contamination: f64) -> (f64, Vec<usize>) {
    let offset = percentile(&sorted(scores), 100.0 * contamination);
    let flagged = scores
        .iter()
        .enumerate()
        .filter(|(_, s)| **s < offset)
        .map(|(i, _)| i)
        .collect();
    (offset, flagged)
}
