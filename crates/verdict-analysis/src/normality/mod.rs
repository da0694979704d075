//! Normality pre-check.
//!
//! Decides whether a sample is plausibly Gaussian. Shapiro-Wilk for n ≤ 50,
//! Anderson-Darling above that. Used to warn before parametric methods and
//! to pick the branch of the adaptive combination policy.

pub mod anderson_darling;
pub mod dataset;
pub mod shapiro_wilk;
pub mod types;

pub use dataset::{assess_dataset_normality, DatasetNormality};
pub use types::{NormalityAssessment, NormalityTest};

use verdict_core::constants::SHAPIRO_MAX_N;

/// Assess normality of a sample at significance `alpha`.
///
/// Non-finite values are ignored. The verdict is normal iff p > alpha; a
/// non-normal verdict carries an advisory pointing to robust methods.
pub fn check_normality(values: &[f64], alpha: f64) -> NormalityAssessment {
    let clean: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let n = clean.len();

    if n < 3 {
        return NormalityAssessment::inconclusive(
            NormalityTest::InsufficientData,
            n,
            format!("sample too small for a normality test (n={n}, need at least 3)"),
        );
    }

    let (test, outcome) = if n <= SHAPIRO_MAX_N {
        (
            NormalityTest::ShapiroWilk,
            shapiro_wilk::test(&clean).map(|r| (r.w, r.p_value)),
        )
    } else {
        (
            NormalityTest::AndersonDarling,
            anderson_darling::test(&clean).map(|r| (r.statistic, r.p_value)),
        )
    };

    let Some((statistic, p_value)) = outcome else {
        return NormalityAssessment::inconclusive(
            NormalityTest::ZeroVariance,
            n,
            "sample has no variability; normality cannot be assessed".to_string(),
        );
    };

    let is_normal = p_value > alpha;
    let warning = (!is_normal).then(|| {
        format!(
            "data does not appear normally distributed ({} p={:.4}); consider a non-parametric method such as IQR or MAD",
            test, p_value
        )
    });

    NormalityAssessment {
        is_normal,
        test,
        statistic: Some(statistic),
        p_value: Some(p_value),
        sample_size: n,
        warning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Evenly spaced normal quantiles: as Gaussian as a finite sample gets.
    fn normal_scores(n: usize) -> Vec<f64> {
        use statrs::distribution::{ContinuousCDF, Normal};
        let z = Normal::new(0.0, 1.0).unwrap();
        (1..=n)
            .map(|i| z.inverse_cdf((i as f64 - 0.375) / (n as f64 + 0.25)))
            .collect()
    }

    #[test]
    fn too_small_is_not_normal() {
        let a = check_normality(&[1.0, 2.0], 0.05);
        assert!(!a.is_normal);
        assert_eq!(a.test, NormalityTest::InsufficientData);
        assert!(a.warning.unwrap().contains("too small"));
    }

    #[test]
    fn small_gaussian_sample_uses_shapiro() {
        let a = check_normality(&normal_scores(30), 0.05);
        assert_eq!(a.test, NormalityTest::ShapiroWilk);
        assert!(a.is_normal, "p = {:?}", a.p_value);
        assert!(a.warning.is_none());
    }

    #[test]
    fn large_gaussian_sample_uses_anderson() {
        let a = check_normality(&normal_scores(200), 0.05);
        assert_eq!(a.test, NormalityTest::AndersonDarling);
        assert!(a.is_normal);
    }

    #[test]
    fn skewed_sample_is_flagged_with_advice() {
        let values: Vec<f64> = (0..40).map(|i| (i as f64 / 4.0).exp()).collect();
        let a = check_normality(&values, 0.05);
        assert!(!a.is_normal);
        assert!(a.warning.unwrap().contains("non-parametric"));
    }

    #[test]
    fn constant_sample_is_inconclusive() {
        let a = check_normality(&[4.0; 12], 0.05);
        assert!(!a.is_normal);
        assert_eq!(a.test, NormalityTest::ZeroVariance);
    }
}
