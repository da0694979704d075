//! Isolation forest.
//!
//! Anomalies are isolated by fewer random axis-aligned splits. Each tree is
//! grown on a subsample of at most 256 rows; the anomaly score of a row is
//! s = 2^(-E[h(x)] / c(ψ)), with c(n) the average unsuccessful-search path
//! length of a binary search tree. Seeded, so runs are reproducible.

use verdict_core::constants::{ISOLATION_MAX_SAMPLES, ISOLATION_TREES};
use verdict_core::errors::DetectionError;
use verdict_core::NumericMatrix;

use super::below_contamination_offset;
use crate::outliers::types::{Detection, DetectionOutcome, OutlierMethod, OutlierResult};

const METHOD: OutlierMethod = OutlierMethod::IsolationForest;
const EULER_GAMMA: f64 = 0.577_215_664_9;

/// Linear congruential generator; uniform draws in [0, 1).
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_f64(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, bound: usize) -> usize {
        ((self.next_f64() * bound as f64) as usize).min(bound - 1)
    }
}

enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// Average path length of an unsuccessful search in a BST of `n` nodes.
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

fn grow(rows: &[Vec<f64>], sample: &[usize], depth: usize, limit: usize, rng: &mut Lcg) -> Node {
    if depth >= limit || sample.len() <= 1 {
        return Node::Leaf { size: sample.len() };
    }

    let n_features = rows[sample[0]].len();
    let ranges: Vec<(usize, f64, f64)> = (0..n_features)
        .filter_map(|f| {
            let (lo, hi) = sample.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &i| {
                (lo.min(rows[i][f]), hi.max(rows[i][f]))
            });
            (hi > lo).then_some((f, lo, hi))
        })
        .collect();
    if ranges.is_empty() {
        return Node::Leaf { size: sample.len() };
    }

    let (feature, lo, hi) = ranges[rng.below(ranges.len())];
    let threshold = lo + rng.next_f64() * (hi - lo);
    let (left, right): (Vec<usize>, Vec<usize>) =
        sample.iter().partition(|&&i| rows[i][feature] < threshold);

    Node::Split {
        feature,
        threshold,
        left: Box::new(grow(rows, &left, depth + 1, limit, rng)),
        right: Box::new(grow(rows, &right, depth + 1, limit, rng)),
    }
}

fn path_length(node: &Node, point: &[f64], depth: usize) -> f64 {
    match node {
        Node::Leaf { size } => depth as f64 + average_path_length(*size),
        Node::Split {
            feature,
            threshold,
            left,
            right,
        } => {
            if point[*feature] < *threshold {
                path_length(left, point, depth + 1)
            } else {
                path_length(right, point, depth + 1)
            }
        }
    }
}

/// Anomaly score in (0, 1] of every row, in matrix row order. Higher is more anomalous.
pub fn anomaly_scores(matrix: &NumericMatrix, seed: u64) -> Result<Vec<f64>, DetectionError> {
    let n = matrix.n_rows();
    if n < 2 {
        return Err(DetectionError::insufficient(METHOD.name(), 2, n));
    }
    let rows = matrix.rows();
    let psi = n.min(ISOLATION_MAX_SAMPLES);
    let depth_limit = (psi as f64).log2().ceil() as usize;
    let mut rng = Lcg::new(seed);

    let forest: Vec<Node> = (0..ISOLATION_TREES)
        .map(|_| {
            // partial Fisher-Yates: first psi positions are a sample without replacement
            let mut pool: Vec<usize> = (0..n).collect();
            for i in 0..psi {
                let j = i + rng.below(n - i);
                pool.swap(i, j);
            }
            grow(rows, &pool[..psi], 0, depth_limit, &mut rng)
        })
        .collect();

    let normaliser = average_path_length(psi);
    let scores: Vec<f64> = rows
        .iter()
        .map(|point| {
            let mean_depth =
                forest.iter().map(|tree| path_length(tree, point, 0)).sum::<f64>() / forest.len() as f64;
            2f64.powf(-mean_depth / normaliser)
        })
        .collect();

    if scores.iter().any(|s| !s.is_finite()) {
        return Err(DetectionError::computation(METHOD.name(), "non-finite anomaly score"));
    }
    Ok(scores)
}

/// Flag the `contamination` share of rows with the highest anomaly score.
pub fn detect(matrix: &NumericMatrix, contamination: f64, seed: u64) -> DetectionOutcome {
    let scores = anomaly_scores(matrix, seed)?;
    let negated: Vec<f64> = scores.iter().map(|s| -s).collect();
    let (offset, flagged) = below_contamination_offset(&negated, contamination);

    let ids = matrix.row_ids();
    let outliers = flagged
        .into_iter()
        .map(|i| OutlierResult {
            row: ids[i],
            value: scores[i],
            test_statistic: scores[i],
            critical_value: Some(-offset),
            p_value: None,
            extreme: None,
            method: METHOD,
        })
        .collect();
    Ok(Detection::new(METHOD, outliers))
}
