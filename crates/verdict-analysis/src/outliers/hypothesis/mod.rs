//! Parametric hypothesis tests for extreme values.
//!
//! Grubbs (single outlier), Dixon's Q (small samples, either tail) and
//! Rosner's generalized ESD (several outliers). Each has a primitive form
//! over one `NumericSample` and a detailed per-variable form in
//! [`detailed`].

pub mod detailed;
pub mod dixon;
pub mod grubbs;
pub mod rosner;

use crate::outliers::stats::{t_cdf, t_quantile};

/// Critical value of the maximum studentized deviate among `m` values.
///
/// t = t⁻¹(1 - α/(2m), m - 2); λ = (m - 1)·t / √((m - 2 + t²)·m).
/// `None` when it cannot be computed (m < 3 or a non-finite quantile).
pub(crate) fn extreme_deviate_critical_value(m: usize, alpha: f64) -> Option<f64> {
    if m < 3 {
        return None;
    }
    let m_f = m as f64;
    let df = m_f - 2.0;
    let t = t_quantile(1.0 - alpha / (2.0 * m_f), df)?;
    let t2 = t * t;
    let critical = (m_f - 1.0) * t / ((df + t2) * m_f).sqrt();
    critical.is_finite().then_some(critical)
}

/// Bonferroni-scaled p-value of a studentized deviate `g` among `m` values:
/// p = m·(1 - F_t(g·√(m/(m - 2 + g²)); m - 2)), clamped to [0, 1].
pub(crate) fn extreme_deviate_p_value(g: f64, m: usize) -> Option<f64> {
    if m < 3 {
        return None;
    }
    let m_f = m as f64;
    let df = m_f - 2.0;
    let t_arg = g * (m_f / (df + g * g)).sqrt();
    let cdf = t_cdf(t_arg, df)?;
    Some((m_f * (1.0 - cdf)).clamp(0.0, 1.0))
}

/// "< 0.001" below a thousandth, four decimals otherwise.
pub fn format_p_value(p: f64) -> String {
    if p < 0.001 {
        "< 0.001".to_string()
    } else {
        format!("{p:.4}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn critical_value_matches_grubbs_table() {
        // Published two-sided Grubbs critical value, n = 10, α = 0.05: 2.29
        let g = extreme_deviate_critical_value(10, 0.05).unwrap();
        assert!((g - 2.29).abs() < 0.01, "got {g}");
    }

    #[test]
    fn p_value_is_clamped() {
        let p = extreme_deviate_p_value(0.0, 10).unwrap();
        assert_eq!(p, 1.0);
        let p = extreme_deviate_p_value(2.8, 10).unwrap();
        assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn formatting() {
        assert_eq!(format_p_value(0.0004), "< 0.001");
        assert_eq!(format_p_value(0.0234), "0.0234");
    }

    #[test]
    fn tiny_samples_have_no_critical_value() {
        assert!(extreme_deviate_critical_value(2, 0.05).is_none());
    }
}
