//! The detection report returned by one engine run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use verdict_core::config::CombineStrategy;
use verdict_core::types::collections::SmallVec3;
use verdict_core::RowId;

use crate::normality::DatasetNormality;
use crate::outliers::hypothesis::detailed::DetailedReport;
use crate::outliers::types::OutlierMethod;

/// How each category of methods voted on one final outlier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteBreakdown {
    pub row: RowId,
    pub observation_id: String,
    /// Univariate methods that flagged the row in any variable.
    pub univariate: SmallVec3<OutlierMethod>,
    /// Variables where at least two univariate methods agreed.
    pub univariate_variables: Vec<String>,
    pub univariate_score: usize,
    pub multivariate: SmallVec3<OutlierMethod>,
    pub hypothesis: SmallVec3<OutlierMethod>,
}

/// A method that could not contribute; its votes count as empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodFailure {
    pub method: OutlierMethod,
    /// `None` for methods run once over the complete-case matrix.
    pub variable: Option<String>,
    pub error_code: String,
    pub message: String,
}

/// Result of [`OutlierEngine::run`](super::OutlierEngine::run).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
    pub dataset: String,
    pub total_rows: usize,
    /// Quantitative variables analysed (subject-id column excluded).
    pub variables: Vec<String>,
    /// Rows with a value in every variable, the input of the multivariate methods.
    pub complete_cases: usize,
    /// Rows flagged by each method, ascending. Every method that was attempted has an entry.
    pub method_outliers: BTreeMap<OutlierMethod, Vec<RowId>>,
    pub final_outliers: Vec<RowId>,
    pub outlier_percentage: f64,
    pub strategy: CombineStrategy,
    pub strategy_description: String,
    pub normality: DatasetNormality,
    /// One entry per final outlier, in the same order.
    pub votes: Vec<VoteBreakdown>,
    pub failures: Vec<MethodFailure>,
    pub hypothesis_reports: Vec<DetailedReport>,
    pub unusually_high_rate: bool,
    pub warnings: Vec<String>,
}

impl DetectionReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Number of rows each method flagged, keyed by method name.
    pub fn method_summary(&self) -> BTreeMap<&'static str, usize> {
        self.method_outliers
            .iter()
            .map(|(method, rows)| (method.name(), rows.len()))
            .collect()
    }

    pub fn final_outlier_count(&self) -> usize {
        self.final_outliers.len()
    }

    pub fn is_outlier(&self, row: RowId) -> bool {
        self.final_outliers.binary_search(&row).is_ok()
    }

    /// Failures recorded for one method.
    pub fn failures_for(&self, method: OutlierMethod) -> impl Iterator<Item = &MethodFailure> {
        self.failures.iter().filter(move |f| f.method == method)
    }

    pub fn votes_for(&self, row: RowId) -> Option<&VoteBreakdown> {
        self.votes.iter().find(|v| v.row == row)
    }
}
