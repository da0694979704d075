//! Detailed hypothesis-test reports over every quantitative variable.
//!
//! Where the primitive forms answer "which rows", these report the full
//! statistical output per variable: statistic, critical value, p-value,
//! sample size, flagged observations under their observation ids, and any
//! advisory or error message. A variable the test cannot handle gets an
//! error message in its own record; the other variables are unaffected.

use serde::{Deserialize, Serialize};

use verdict_core::constants::DEFAULT_ALPHA;
use verdict_core::errors::{DetectionError, InputError, VerdictErrorCode};
use verdict_core::{NumericSample, RowId, TabularHandle};

use super::{dixon, format_p_value, grubbs, rosner};
use crate::normality::check_normality;
use crate::outliers::types::{ExtremeSide, OutlierMethod};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrubbsParams {
    pub alpha: f64,
    /// Significance level of the advisory normality check.
    pub normality_alpha: f64,
}

impl Default for GrubbsParams {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            normality_alpha: DEFAULT_ALPHA,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DixonParams {
    /// One of 0.10, 0.05, 0.01; anything else falls back to 0.05.
    pub alpha: f64,
}

impl Default for DixonParams {
    fn default() -> Self {
        Self { alpha: DEFAULT_ALPHA }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RosnerParams {
    pub alpha: f64,
    /// Iteration bound; max(1, 10% of n) when unset. Always capped at n/2.
    pub max_outliers: Option<usize>,
    pub normality_alpha: f64,
}

impl Default for RosnerParams {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            max_outliers: None,
            normality_alpha: DEFAULT_ALPHA,
        }
    }
}

/// One flagged observation in a detailed report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedObservation {
    pub row: RowId,
    /// Subject-id label, or `obs_<row>`.
    pub observation_id: String,
    pub value: f64,
    pub statistic: f64,
    pub p_value: f64,
    pub extreme: ExtremeSide,
}

/// Test output for one variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableReport {
    pub variable: String,
    pub sample_size: usize,
    pub statistic: Option<f64>,
    pub critical_value: Option<f64>,
    pub p_value: Option<f64>,
    pub p_value_formatted: Option<String>,
    pub outliers: Vec<FlaggedObservation>,
    /// Advisories that did not stop the test (non-normal data, α fallback).
    pub warnings: Vec<String>,
    /// Why the test could not run on this variable.
    pub error: Option<String>,
    pub error_code: Option<String>,
}

impl VariableReport {
    fn new(variable: &str, sample_size: usize) -> Self {
        Self {
            variable: variable.to_string(),
            sample_size,
            statistic: None,
            critical_value: None,
            p_value: None,
            p_value_formatted: None,
            outliers: Vec::new(),
            warnings: Vec::new(),
            error: None,
            error_code: None,
        }
    }

    fn failed(variable: &str, sample_size: usize, error: &DetectionError) -> Self {
        Self {
            error: Some(error.to_string()),
            error_code: Some(error.error_code().to_string()),
            ..Self::new(variable, sample_size)
        }
    }

    fn with_statistics(mut self, statistic: f64, critical_value: f64, p_value: f64) -> Self {
        self.statistic = Some(statistic);
        self.critical_value = Some(critical_value);
        self.p_value = Some(p_value);
        self.p_value_formatted = Some(format_p_value(p_value));
        self
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Detailed output of one test over a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedReport {
    pub dataset: String,
    pub method: OutlierMethod,
    pub alpha: f64,
    pub subject_id_column: Option<String>,
    pub variables: Vec<VariableReport>,
}

impl DetailedReport {
    /// Every flagged row across variables, ascending and deduplicated.
    pub fn flagged_rows(&self) -> Vec<RowId> {
        let mut rows: Vec<RowId> = self
            .variables
            .iter()
            .flat_map(|v| v.outliers.iter().map(|o| o.row))
            .collect();
        rows.sort_unstable();
        rows.dedup();
        rows
    }

    pub fn total_outliers(&self) -> usize {
        self.variables.iter().map(|v| v.outliers.len()).sum()
    }

    pub fn variable(&self, name: &str) -> Option<&VariableReport> {
        self.variables.iter().find(|v| v.variable == name)
    }
}

/// Resolves rows to observation ids through the subject-id column.
pub struct ObservationIds<'a> {
    dataset: &'a dyn TabularHandle,
    column: Option<&'a str>,
}

impl<'a> ObservationIds<'a> {
    pub fn new(dataset: &'a dyn TabularHandle, column: Option<&'a str>) -> Result<Self, InputError> {
        if let Some(col) = column {
            if !dataset.has_column(col) {
                return Err(InputError::SubjectColumnNotFound { column: col.to_string() });
            }
        }
        Ok(Self { dataset, column })
    }

    /// Label of `row` in the subject-id column, falling back to `obs_<row>`
    /// when there is no column or the cell is empty.
    pub fn resolve(&self, row: RowId) -> String {
        self.column
            .and_then(|col| self.dataset.label(col, row).ok().flatten())
            .unwrap_or_else(|| row.synthetic_label())
    }
}

/// Quantitative columns, minus the subject-id column.
pub fn analysable_variables(
    dataset: &dyn TabularHandle,
    subject_id_column: Option<&str>,
) -> Result<Vec<String>, InputError> {
    let variables: Vec<String> = dataset
        .quantitative_columns()
        .into_iter()
        .filter(|c| Some(c.as_str()) != subject_id_column)
        .collect();
    if variables.is_empty() {
        return Err(InputError::NoQuantitativeColumns {
            dataset: dataset.name().to_string(),
        });
    }
    Ok(variables)
}

/// Variables and row mapping of one dataset, resolved once and shared by
/// every test run over it.
pub struct ResolvedDataset<'a> {
    name: &'a str,
    subject_id_column: Option<&'a str>,
    ids: ObservationIds<'a>,
    samples: Vec<(String, NumericSample)>,
}

impl<'a> ResolvedDataset<'a> {
    pub fn new(dataset: &'a dyn TabularHandle, subject_id_column: Option<&'a str>) -> Result<Self, InputError> {
        let ids = ObservationIds::new(dataset, subject_id_column)?;
        let samples = analysable_variables(dataset, subject_id_column)?
            .into_iter()
            .map(|variable| dataset.column(&variable).map(|sample| (variable, sample)))
            .collect::<Result<_, _>>()?;
        Ok(Self {
            name: dataset.name(),
            subject_id_column,
            ids,
            samples,
        })
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn ids(&self) -> &ObservationIds<'a> {
        &self.ids
    }

    /// Analysable variables with their samples, in table order.
    pub fn samples(&self) -> &[(String, NumericSample)] {
        &self.samples
    }

    pub fn variables(&self) -> Vec<String> {
        self.samples.iter().map(|(v, _)| v.clone()).collect()
    }

    /// Grubbs' test on every variable.
    pub fn grubbs(&self, params: &GrubbsParams) -> DetailedReport {
        self.per_variable(OutlierMethod::Grubbs, params.alpha, |variable, sample| {
            let stats = grubbs::statistics(sample, params.alpha)?;
            let mut report = VariableReport::new(variable, stats.sample_size).with_statistics(
                stats.statistic,
                stats.critical_value,
                stats.p_value,
            );
            if stats.is_outlier {
                report.outliers.push(FlaggedObservation {
                    row: stats.candidate,
                    observation_id: self.ids.resolve(stats.candidate),
                    value: stats.candidate_value,
                    statistic: stats.statistic,
                    p_value: stats.p_value,
                    extreme: stats.extreme,
                });
            }
            report.warnings.extend(normality_warning(sample, params.normality_alpha));
            Ok(report)
        })
    }

    /// Dixon's Q test on every variable.
    pub fn dixon(&self, params: &DixonParams) -> DetailedReport {
        let (alpha, _) = dixon::resolve_alpha(params.alpha);
        self.per_variable(OutlierMethod::Dixon, alpha, |variable, sample| {
            let stats = dixon::statistics(sample, params.alpha)?;
            let mut report = VariableReport::new(variable, stats.sample_size).with_statistics(
                stats.statistic(),
                stats.critical_value,
                stats.p_value(),
            );
            for (tail, side) in [(&stats.minimum, ExtremeSide::Minimum), (&stats.maximum, ExtremeSide::Maximum)] {
                if tail.is_outlier {
                    report.outliers.push(FlaggedObservation {
                        row: tail.row,
                        observation_id: self.ids.resolve(tail.row),
                        value: tail.value,
                        statistic: tail.q,
                        p_value: tail.p_value,
                        extreme: side,
                    });
                }
            }
            if stats.alpha_fallback {
                report
                    .warnings
                    .push(format!("alpha {} has no Dixon table; used 0.05", params.alpha));
            }
            Ok(report)
        })
    }

    /// Rosner's generalized ESD test on every variable.
    ///
    /// Variable-level statistic, critical value and p-value are those of the
    /// first iteration; each flagged observation carries its own.
    pub fn rosner(&self, params: &RosnerParams) -> DetailedReport {
        self.per_variable(OutlierMethod::Rosner, params.alpha, |variable, sample| {
            let stats = rosner::statistics(sample, params.alpha, params.max_outliers)?;
            let mut report = VariableReport::new(variable, stats.sample_size);
            if let Some(first) = stats.steps.first() {
                report = report.with_statistics(first.statistic, first.critical_value, first.p_value);
            }
            report.outliers = stats
                .outliers()
                .map(|s| FlaggedObservation {
                    row: s.row,
                    observation_id: self.ids.resolve(s.row),
                    value: s.value,
                    statistic: s.statistic,
                    p_value: s.p_value,
                    extreme: s.extreme,
                })
                .collect();
            report.warnings.extend(normality_warning(sample, params.normality_alpha));
            Ok(report)
        })
    }

    fn per_variable<F>(&self, method: OutlierMethod, alpha: f64, test: F) -> DetailedReport
    where
        F: Fn(&str, &NumericSample) -> Result<VariableReport, DetectionError>,
    {
        let variables = self
            .samples
            .iter()
            .map(|(variable, sample)| match test(variable, sample) {
                Ok(report) => {
                    tracing::debug!(
                        method = method.name(),
                        variable = %variable,
                        n = sample.len(),
                        outliers = report.outliers.len(),
                        "hypothesis test complete"
                    );
                    report
                }
                Err(e) => {
                    tracing::debug!(method = method.name(), variable = %variable, error = %e, "hypothesis test skipped");
                    VariableReport::failed(variable, sample.len(), &e)
                }
            })
            .collect();

        DetailedReport {
            dataset: self.name.to_string(),
            method,
            alpha,
            subject_id_column: self.subject_id_column.map(str::to_string),
            variables,
        }
    }
}

fn normality_warning(sample: &NumericSample, alpha: f64) -> Option<String> {
    check_normality(sample.values(), alpha).warning
}

/// Grubbs' test on every quantitative variable.
pub fn grubbs(
    dataset: &dyn TabularHandle,
    subject_id_column: Option<&str>,
    params: &GrubbsParams,
) -> Result<DetailedReport, InputError> {
    Ok(ResolvedDataset::new(dataset, subject_id_column)?.grubbs(params))
}

/// Dixon's Q test on every quantitative variable.
pub fn dixon(
    dataset: &dyn TabularHandle,
    subject_id_column: Option<&str>,
    params: &DixonParams,
) -> Result<DetailedReport, InputError> {
    Ok(ResolvedDataset::new(dataset, subject_id_column)?.dixon(params))
}

/// Rosner's generalized ESD test on every quantitative variable.
pub fn rosner(
    dataset: &dyn TabularHandle,
    subject_id_column: Option<&str>,
    params: &RosnerParams,
) -> Result<DetailedReport, InputError> {
    Ok(ResolvedDataset::new(dataset, subject_id_column)?.rosner(params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdict_core::{Column, Dataset};

    fn dataset() -> Dataset {
        let mut small: Vec<f64> = (1..=10).map(|i| i as f64).collect();
        small.push(100.0);
        Dataset::new("trial")
            .with_column("subject", Column::text(["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k"]))
            .unwrap()
            .with_column("score", Column::numeric(small))
            .unwrap()
            .with_column("flat", Column::numeric([2.0; 11]))
            .unwrap()
    }

    #[test]
    fn grubbs_resolves_subject_ids() {
        let report = grubbs(&dataset(), Some("subject"), &GrubbsParams::default()).unwrap();
        let score = report.variable("score").unwrap();
        assert_eq!(score.outliers.len(), 1);
        assert_eq!(score.outliers[0].observation_id, "k");
        assert_eq!(score.sample_size, 11);
        assert!(score.p_value_formatted.is_some());
        assert_eq!(report.flagged_rows(), vec![RowId(10)]);
    }

    #[test]
    fn degenerate_variable_gets_error_record() {
        let report = grubbs(&dataset(), None, &GrubbsParams::default()).unwrap();
        let flat = report.variable("flat").unwrap();
        assert!(!flat.is_ok());
        assert_eq!(flat.error_code.as_deref(), Some("DEGENERATE_SAMPLE"));
        assert!(report.variable("score").unwrap().is_ok());
    }

    #[test]
    fn synthetic_ids_without_subject_column() {
        let report = dixon(&dataset(), None, &DixonParams::default()).unwrap();
        let score = report.variable("score").unwrap();
        assert_eq!(score.outliers[0].observation_id, "obs_10");
    }

    #[test]
    fn rosner_reports_unsupported_size_per_variable() {
        let report = rosner(&dataset(), None, &RosnerParams::default()).unwrap();
        let score = report.variable("score").unwrap();
        assert_eq!(score.error_code.as_deref(), Some("UNSUPPORTED_PARAMETER"));
        assert!(score.statistic.is_none());
    }

    #[test]
    fn resolved_dataset_serves_every_test() {
        let ds = dataset();
        let resolved = ResolvedDataset::new(&ds, Some("subject")).unwrap();
        assert_eq!(resolved.variables(), vec!["score".to_string(), "flat".to_string()]);
        assert_eq!(resolved.ids().resolve(RowId(10)), "k");

        let grubbs = resolved.grubbs(&GrubbsParams::default());
        let dixon = resolved.dixon(&DixonParams::default());
        assert_eq!(grubbs.flagged_rows(), dixon.flagged_rows());
        assert_eq!(dixon.variable("score").unwrap().outliers[0].observation_id, "k");
        assert_eq!(resolved.rosner(&RosnerParams::default()).subject_id_column.as_deref(), Some("subject"));
    }

    #[test]
    fn missing_subject_column_is_input_error() {
        let err = grubbs(&dataset(), Some("nope"), &GrubbsParams::default()).unwrap_err();
        assert!(matches!(err, InputError::SubjectColumnNotFound { .. }));
    }

    #[test]
    fn no_quantitative_columns() {
        let ds = Dataset::new("labels").with_column("name", Column::text(["x", "y"])).unwrap();
        let err = dixon(&ds, None, &DixonParams::default()).unwrap_err();
        assert!(matches!(err, InputError::NoQuantitativeColumns { .. }));
    }
}
