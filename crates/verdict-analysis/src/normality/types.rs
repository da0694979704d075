//! Normality assessment types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which procedure produced an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalityTest {
    ShapiroWilk,
    AndersonDarling,
    /// Fewer than 3 values.
    InsufficientData,
    /// All values identical.
    ZeroVariance,
}

impl NormalityTest {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ShapiroWilk => "Shapiro-Wilk",
            Self::AndersonDarling => "Anderson-Darling",
            Self::InsufficientData => "insufficient data",
            Self::ZeroVariance => "zero variance",
        }
    }
}

impl fmt::Display for NormalityTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Normality verdict for one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalityAssessment {
    pub is_normal: bool,
    pub test: NormalityTest,
    pub statistic: Option<f64>,
    pub p_value: Option<f64>,
    pub sample_size: usize,
    pub warning: Option<String>,
}

impl NormalityAssessment {
    /// A not-normal verdict where no test could run.
    pub(crate) fn inconclusive(test: NormalityTest, sample_size: usize, warning: String) -> Self {
        Self {
            is_normal: false,
            test,
            statistic: None,
            p_value: None,
            sample_size,
            warning: Some(warning),
        }
    }
}
