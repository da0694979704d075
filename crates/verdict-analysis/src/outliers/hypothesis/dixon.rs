//! Dixon's Q test for small samples (3 ≤ n ≤ 30).
//!
//! Q10 = (x₂ - x₁)/(xₙ - x₁) tests the minimum, Q11 = (xₙ - xₙ₋₁)/(xₙ - x₁)
//! the maximum. Both are compared against tabulated critical values; either
//! or both extremes may be flagged.
//!
//! p-values are interpolated between the three tabulated tiers and are an
//! approximation, not an exact distribution.

use verdict_core::constants::{DIXON_MAX_N, DIXON_MIN_N};
use verdict_core::errors::DetectionError;
use verdict_core::{NumericSample, RowId};

use crate::outliers::types::{Detection, DetectionOutcome, ExtremeSide, OutlierMethod, OutlierResult};

const METHOD: OutlierMethod = OutlierMethod::Dixon;

// Critical values of Q for n = 3..=30.
const Q90: [f64; 28] = [
    0.941, 0.765, 0.642, 0.560, 0.507, 0.468, 0.437, 0.412, 0.392, 0.376, 0.361, 0.349, 0.338, 0.329,
    0.320, 0.313, 0.306, 0.300, 0.295, 0.290, 0.285, 0.281, 0.277, 0.273, 0.269, 0.266, 0.263, 0.260,
];
const Q95: [f64; 28] = [
    0.970, 0.829, 0.710, 0.625, 0.568, 0.526, 0.493, 0.466, 0.444, 0.426, 0.410, 0.396, 0.384, 0.374,
    0.365, 0.356, 0.349, 0.342, 0.337, 0.331, 0.326, 0.321, 0.317, 0.312, 0.308, 0.305, 0.301, 0.290,
];
const Q99: [f64; 28] = [
    0.994, 0.926, 0.821, 0.740, 0.680, 0.634, 0.598, 0.568, 0.542, 0.522, 0.503, 0.488, 0.475, 0.463,
    0.452, 0.442, 0.433, 0.425, 0.418, 0.411, 0.404, 0.399, 0.393, 0.388, 0.384, 0.380, 0.376, 0.372,
];

/// Significance levels with tabulated critical values.
pub const SUPPORTED_ALPHAS: [f64; 3] = [0.10, 0.05, 0.01];

/// Critical values (α = 0.10, 0.05, 0.01) for a sample of `n`.
fn table_row(n: usize) -> Option<(f64, f64, f64)> {
    if !(DIXON_MIN_N..=DIXON_MAX_N).contains(&n) {
        return None;
    }
    let i = n - DIXON_MIN_N;
    Some((Q90[i], Q95[i], Q99[i]))
}

/// The tabulated α closest to the request, and whether it had to fall back to 0.05.
pub fn resolve_alpha(alpha: f64) -> (f64, bool) {
    match SUPPORTED_ALPHAS.iter().find(|a| (*a - alpha).abs() < 1e-9) {
        Some(a) => (*a, false),
        None => (0.05, true),
    }
}

/// Critical Q for sample size `n` at a supported α.
pub fn critical_value(n: usize, alpha: f64) -> Option<f64> {
    let (c10, c05, c01) = table_row(n)?;
    let (alpha, _) = resolve_alpha(alpha);
    Some(if alpha == 0.10 {
        c10
    } else if alpha == 0.01 {
        c01
    } else {
        c05
    })
}

/// Approximate p-value of `q`: linear between the tabulated tiers, conservative
/// outside them, clamped to [0.0001, 1].
pub fn p_value(q: f64, n: usize) -> Option<f64> {
    let (c10, c05, c01) = table_row(n)?;
    let p = if q >= c01 {
        (0.01 * (1.0 - (q - c01) / (1.0 - c01))).clamp(0.0001, 0.01)
    } else if q >= c05 {
        0.05 - (q - c05) / (c01 - c05) * 0.04
    } else if q >= c10 {
        0.10 - (q - c10) / (c05 - c10) * 0.05
    } else {
        0.10 + (c10 - q) / c10 * 0.90
    };
    Some(p.clamp(0.0001, 1.0))
}

/// One tail of a Dixon test.
#[derive(Debug, Clone, PartialEq)]
pub struct DixonTail {
    pub row: RowId,
    pub value: f64,
    pub q: f64,
    pub p_value: f64,
    pub is_outlier: bool,
}

/// Full result of one Dixon test.
#[derive(Debug, Clone, PartialEq)]
pub struct DixonStatistics {
    pub minimum: DixonTail,
    pub maximum: DixonTail,
    pub critical_value: f64,
    /// α the critical value was taken at.
    pub alpha: f64,
    /// Set when the requested α had no table and 0.05 was used instead.
    pub alpha_fallback: bool,
    pub sample_size: usize,
}

impl DixonStatistics {
    /// The larger of the two Q statistics.
    pub fn statistic(&self) -> f64 {
        self.minimum.q.max(self.maximum.q)
    }

    /// p-value of the larger Q.
    pub fn p_value(&self) -> f64 {
        self.minimum.p_value.min(self.maximum.p_value)
    }
}

pub fn statistics(sample: &NumericSample, alpha: f64) -> Result<DixonStatistics, DetectionError> {
    let n = sample.len();
    if !(DIXON_MIN_N..=DIXON_MAX_N).contains(&n) {
        return Err(DetectionError::unsupported(
            METHOD.name(),
            format!("unsupported sample size {n} (Dixon's test needs {DIXON_MIN_N} to {DIXON_MAX_N} values)"),
        ));
    }

    let (used_alpha, alpha_fallback) = resolve_alpha(alpha);
    if alpha_fallback {
        tracing::warn!(alpha, "no Dixon table for this alpha; using 0.05");
    }

    let mut ordered: Vec<(RowId, f64)> = sample.iter().collect();
    ordered.sort_by(|a, b| a.1.total_cmp(&b.1));

    let (low_row, x1) = ordered[0];
    let x2 = ordered[1].1;
    let xn_1 = ordered[n - 2].1;
    let (high_row, xn) = ordered[n - 1];
    let range = xn - x1;
    if range <= 0.0 || !range.is_finite() {
        return Err(DetectionError::degenerate(METHOD.name(), "range is zero"));
    }

    let critical_value = critical_value(n, used_alpha)
        .ok_or_else(|| DetectionError::computation(METHOD.name(), "missing critical value"))?;
    let tail = |row: RowId, value: f64, q: f64| -> Result<DixonTail, DetectionError> {
        let p_value =
            p_value(q, n).ok_or_else(|| DetectionError::computation(METHOD.name(), "missing critical value"))?;
        Ok(DixonTail {
            row,
            value,
            q,
            p_value,
            is_outlier: q > critical_value,
        })
    };

    Ok(DixonStatistics {
        minimum: tail(low_row, x1, (x2 - x1) / range)?,
        maximum: tail(high_row, xn, (xn - xn_1) / range)?,
        critical_value,
        alpha: used_alpha,
        alpha_fallback,
        sample_size: n,
    })
}

/// Flag the minimum and/or maximum.
pub fn detect(sample: &NumericSample, alpha: f64) -> DetectionOutcome {
    let stats = statistics(sample, alpha)?;
    let outliers = [
        (&stats.minimum, ExtremeSide::Minimum),
        (&stats.maximum, ExtremeSide::Maximum),
    ]
    .into_iter()
    .filter(|(tail, _)| tail.is_outlier)
    .map(|(tail, side)| OutlierResult {
        row: tail.row,
        value: tail.value,
        test_statistic: tail.q,
        critical_value: Some(stats.critical_value),
        p_value: Some(tail.p_value),
        extreme: Some(side),
        method: METHOD,
    })
    .collect();
    Ok(Detection::new(METHOD, outliers))
}
