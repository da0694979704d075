//! Dataset-level normality verdict.

use serde::{Deserialize, Serialize};

use super::check_normality;
use super::types::NormalityAssessment;

/// Aggregate normality over a handful of representative variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetNormality {
    pub variables_tested: usize,
    pub variables_normal: usize,
    /// Fraction of tested variables assessed normal (0.0 when none were tested).
    pub normal_fraction: f64,
    /// `normal_fraction` reached the threshold.
    pub data_is_generally_normal: bool,
    /// Per-variable assessments, in the order tested.
    pub assessments: Vec<(String, NormalityAssessment)>,
}

/// Test up to `max_variables` samples (in the order given) and decide whether
/// the dataset is generally normal: fraction of normal variables ≥ `threshold`.
pub fn assess_dataset_normality<'a, I>(
    samples: I,
    max_variables: usize,
    threshold: f64,
    alpha: f64,
) -> DatasetNormality
where
    I: IntoIterator<Item = (&'a str, &'a [f64])>,
{
    let assessments: Vec<(String, NormalityAssessment)> = samples
        .into_iter()
        .take(max_variables)
        .map(|(name, values)| (name.to_string(), check_normality(values, alpha)))
        .collect();

    let variables_tested = assessments.len();
    let variables_normal = assessments.iter().filter(|(_, a)| a.is_normal).count();
    let normal_fraction = if variables_tested == 0 {
        0.0
    } else {
        variables_normal as f64 / variables_tested as f64
    };

    DatasetNormality {
        variables_tested,
        variables_normal,
        normal_fraction,
        data_is_generally_normal: variables_tested > 0 && normal_fraction >= threshold,
        assessments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_not_normal() {
        let d = assess_dataset_normality(std::iter::empty(), 5, 0.6, 0.05);
        assert_eq!(d.variables_tested, 0);
        assert!(!d.data_is_generally_normal);
    }

    #[test]
    fn only_first_variables_are_sampled() {
        let flat = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let samples: Vec<(String, Vec<f64>)> = (0..8).map(|i| (format!("v{i}"), flat.clone())).collect();
        let d = assess_dataset_normality(
            samples.iter().map(|(n, v)| (n.as_str(), v.as_slice())),
            5,
            0.6,
            0.05,
        );
        assert_eq!(d.variables_tested, 5);
    }
}
