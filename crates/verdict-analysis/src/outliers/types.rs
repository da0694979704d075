//! Core types for outlier detection.

use serde::{Deserialize, Serialize};
use std::fmt;

use verdict_core::errors::DetectionError;
use verdict_core::RowId;

/// One flagged observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierResult {
    /// Row in the source table.
    pub row: RowId,
    /// The observed value (univariate and hypothesis tests) or the score (multivariate).
    pub value: f64,
    /// Test statistic (z-score, Grubbs' G, Mahalanobis distance, LOF, ...).
    pub test_statistic: f64,
    /// Threshold the statistic was compared against, when there is one.
    pub critical_value: Option<f64>,
    /// p-value, for hypothesis tests.
    pub p_value: Option<f64>,
    /// Which tail the value sits in, for one-dimensional methods.
    pub extreme: Option<ExtremeSide>,
    pub method: OutlierMethod,
}

/// Tail of the distribution a flagged value lies in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtremeSide {
    Maximum,
    Minimum,
}

impl ExtremeSide {
    /// Side of `value` relative to a center (mean or median).
    pub fn of(value: f64, center: f64) -> Self {
        if value >= center {
            Self::Maximum
        } else {
            Self::Minimum
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Maximum => "maximum",
            Self::Minimum => "minimum",
        }
    }
}

impl fmt::Display for ExtremeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Method family, used for vote accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodCategory {
    Univariate,
    Multivariate,
    HypothesisTest,
}

/// Statistical method used for outlier detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlierMethod {
    Iqr,
    ZScore,
    Mad,
    Mahalanobis,
    LocalOutlierFactor,
    IsolationForest,
    Grubbs,
    Dixon,
    Rosner,
}

impl OutlierMethod {
    pub const UNIVARIATE: [OutlierMethod; 3] = [Self::Iqr, Self::ZScore, Self::Mad];
    pub const MULTIVARIATE: [OutlierMethod; 3] =
        [Self::Mahalanobis, Self::LocalOutlierFactor, Self::IsolationForest];
    pub const HYPOTHESIS: [OutlierMethod; 3] = [Self::Grubbs, Self::Dixon, Self::Rosner];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Iqr => "iqr",
            Self::ZScore => "z_score",
            Self::Mad => "mad",
            Self::Mahalanobis => "mahalanobis",
            Self::LocalOutlierFactor => "local_outlier_factor",
            Self::IsolationForest => "isolation_forest",
            Self::Grubbs => "grubbs",
            Self::Dixon => "dixon",
            Self::Rosner => "rosner",
        }
    }

    pub fn category(&self) -> MethodCategory {
        match self {
            Self::Iqr | Self::ZScore | Self::Mad => MethodCategory::Univariate,
            Self::Mahalanobis | Self::LocalOutlierFactor | Self::IsolationForest => {
                MethodCategory::Multivariate
            }
            Self::Grubbs | Self::Dixon | Self::Rosner => MethodCategory::HypothesisTest,
        }
    }
}

impl fmt::Display for OutlierMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The outliers one method flagged, in the order the method reports them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub method: OutlierMethod,
    pub outliers: Vec<OutlierResult>,
}

impl Detection {
    pub fn new(method: OutlierMethod, outliers: Vec<OutlierResult>) -> Self {
        Self { method, outliers }
    }

    /// A method that ran and found nothing.
    pub fn empty(method: OutlierMethod) -> Self {
        Self::new(method, Vec::new())
    }

    /// Flagged rows, in report order.
    pub fn rows(&self) -> Vec<RowId> {
        self.outliers.iter().map(|o| o.row).collect()
    }

    pub fn contains(&self, row: RowId) -> bool {
        self.outliers.iter().any(|o| o.row == row)
    }

    pub fn len(&self) -> usize {
        self.outliers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outliers.is_empty()
    }
}

/// What every detector primitive returns.
pub type DetectionOutcome = Result<Detection, DetectionError>;

/// Collapse a recovered failure into an empty contribution.
pub trait DetectionOutcomeExt {
    fn or_empty(self, method: OutlierMethod) -> Detection;
}

impl DetectionOutcomeExt for DetectionOutcome {
    fn or_empty(self, method: OutlierMethod) -> Detection {
        self.unwrap_or_else(|_| Detection::empty(method))
    }
}
