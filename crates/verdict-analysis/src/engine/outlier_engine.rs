//! OutlierEngine: one detection run from dataset to report.

use std::collections::BTreeMap;
use std::time::Instant;

use tracing::{debug, info, warn};

use verdict_core::constants::HIGH_OUTLIER_PERCENTAGE;
use verdict_core::errors::{DetectionError, EngineError, InputError, VerdictErrorCode};
use verdict_core::events::types::{
    DetectionCompleteEvent, DetectionStartedEvent, HighOutlierRateEvent, MethodFailedEvent,
    NormalityWarningEvent,
};
use verdict_core::events::EventDispatcher;
use verdict_core::types::collections::BTreeSet;
use verdict_core::{DetectionConfig, NumericMatrix, RowId, TabularHandle};

use super::policy::{self, VoteSheet, VotingThresholds};
use super::report::{DetectionReport, MethodFailure, VoteBreakdown};
use super::tensor::TensorBuilder;
use crate::normality::assess_dataset_normality;
use crate::outliers::hypothesis::detailed::{
    self, DetailedReport, DixonParams, GrubbsParams, ResolvedDataset, RosnerParams,
};
use crate::outliers::multivariate::{isolation_forest, lof, mahalanobis};
use crate::outliers::types::{DetectionOutcome, OutlierMethod};
use crate::outliers::univariate::{iqr, mad, zscore};

/// Runs every detector and reconciles their votes.
///
/// Holds only configuration and the event dispatcher, so one engine can
/// serve any number of concurrent runs.
#[derive(Debug, Clone)]
pub struct OutlierEngine {
    config: DetectionConfig,
    events: EventDispatcher,
}

/// Mutable bookkeeping of a single run.
struct RunLog<'a> {
    dataset: &'a str,
    events: &'a EventDispatcher,
    method_outliers: BTreeMap<OutlierMethod, BTreeSet<RowId>>,
    failures: Vec<MethodFailure>,
}

impl<'a> RunLog<'a> {
    fn new(dataset: &'a str, events: &'a EventDispatcher) -> Self {
        Self {
            dataset,
            events,
            method_outliers: BTreeMap::new(),
            failures: Vec::new(),
        }
    }

    fn flagged(&mut self, method: OutlierMethod, rows: impl IntoIterator<Item = RowId>) {
        self.method_outliers.entry(method).or_default().extend(rows);
    }

    fn failed(&mut self, method: OutlierMethod, variable: Option<&str>, error_code: &str, message: &str) {
        warn!(
            dataset = self.dataset,
            method = method.name(),
            variable = variable.unwrap_or("-"),
            error_code,
            "{message}"
        );
        self.events.emit_method_failed(&MethodFailedEvent {
            dataset: self.dataset.to_string(),
            method: method.name().to_string(),
            variable: variable.map(str::to_string),
            error_code: error_code.to_string(),
            message: message.to_string(),
        });
        self.method_outliers.entry(method).or_default();
        self.failures.push(MethodFailure {
            method,
            variable: variable.map(str::to_string),
            error_code: error_code.to_string(),
            message: message.to_string(),
        });
    }

    fn failed_with(&mut self, method: OutlierMethod, variable: Option<&str>, error: &DetectionError) {
        self.failed(method, variable, error.error_code(), &error.to_string());
    }
}

impl OutlierEngine {
    /// Engine with the given configuration and no event handlers.
    pub fn new(config: DetectionConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            config,
            events: EventDispatcher::new(),
        })
    }

    /// Replace the event dispatcher.
    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = events;
        self
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    pub fn grubbs_params(&self) -> GrubbsParams {
        GrubbsParams {
            alpha: self.config.hypothesis.effective_alpha(),
            normality_alpha: self.config.normality.effective_alpha(),
        }
    }

    pub fn dixon_params(&self) -> DixonParams {
        DixonParams {
            alpha: self.config.hypothesis.effective_alpha(),
        }
    }

    pub fn rosner_params(&self) -> RosnerParams {
        RosnerParams {
            alpha: self.config.hypothesis.effective_alpha(),
            max_outliers: self.config.hypothesis.rosner_max_outliers,
            normality_alpha: self.config.normality.effective_alpha(),
        }
    }

    fn thresholds(&self) -> VotingThresholds {
        VotingThresholds {
            min_univariate: self.config.min_univariate,
            min_multivariate: self.config.min_multivariate,
        }
    }

    fn subject_column(&self) -> Option<&str> {
        self.config.subject_id_column.as_deref()
    }

    /// Detailed Grubbs report over every quantitative variable.
    pub fn detailed_grubbs(
        &self,
        dataset: &dyn TabularHandle,
        params: &GrubbsParams,
    ) -> Result<DetailedReport, EngineError> {
        detailed::grubbs(dataset, self.subject_column(), params)
            .map_err(|e| EngineError::input(dataset.name(), e))
    }

    /// Detailed Dixon report over every quantitative variable.
    pub fn detailed_dixon(
        &self,
        dataset: &dyn TabularHandle,
        params: &DixonParams,
    ) -> Result<DetailedReport, EngineError> {
        detailed::dixon(dataset, self.subject_column(), params)
            .map_err(|e| EngineError::input(dataset.name(), e))
    }

    /// Detailed Rosner report over every quantitative variable.
    pub fn detailed_rosner(
        &self,
        dataset: &dyn TabularHandle,
        params: &RosnerParams,
    ) -> Result<DetailedReport, EngineError> {
        detailed::rosner(dataset, self.subject_column(), params)
            .map_err(|e| EngineError::input(dataset.name(), e))
    }

    /// Run every detector over `dataset` and combine the votes.
    ///
    /// Only problems with the dataset itself fail the run; a detector that
    /// cannot handle a variable is recorded in [`DetectionReport::failures`]
    /// and contributes no votes.
    pub fn run(&self, dataset: &dyn TabularHandle) -> Result<DetectionReport, EngineError> {
        let started = Instant::now();
        let name = dataset.name();
        let input_err = |e: InputError| EngineError::input(name, e);

        let resolved = ResolvedDataset::new(dataset, self.subject_column()).map_err(input_err)?;
        let samples = resolved.samples();
        let variables = resolved.variables();

        let strategy = self.config.strategy;
        let total_rows = dataset.row_count();
        info!(dataset = name, %strategy, variables = variables.len(), rows = total_rows, "outlier detection started");
        self.events.emit_detection_started(&DetectionStartedEvent {
            dataset: name.to_string(),
            strategy,
            variables: variables.len(),
            rows: total_rows,
        });

        let mut log = RunLog::new(name, &self.events);

        // 1. univariate, per variable
        let uni = &self.config.univariate;
        let normality_alpha = self.config.normality.effective_alpha();
        let mut builder = TensorBuilder::new(variables.clone());
        for (idx, (variable, sample)) in samples.iter().enumerate() {
            let threshold = uni.effective_zscore_threshold();
            let zscore = if uni.effective_zscore_normality_check() {
                zscore::detect_with_normality_check(sample, threshold, normality_alpha).0
            } else {
                zscore::detect(sample, threshold)
            };
            let outcomes: [DetectionOutcome; 3] = [
                iqr::detect(sample, uni.effective_iqr_factor(sample.len())),
                zscore,
                mad::detect(sample, uni.effective_mad_threshold()),
            ];
            for (method, outcome) in OutlierMethod::UNIVARIATE.into_iter().zip(outcomes) {
                match outcome {
                    Ok(detection) => {
                        debug!(method = method.name(), variable = %variable, outliers = detection.len(), "univariate detection");
                        builder.record(idx, &detection);
                        log.flagged(method, detection.rows());
                    }
                    Err(e) => log.failed_with(method, Some(variable.as_str()), &e),
                }
            }
        }
        let mut votes = VoteSheet::new(builder.build());

        // 2. multivariate, once over complete cases
        let matrix = NumericMatrix::complete_cases(samples);
        let mv = &self.config.multivariate;
        let contamination = mv.effective_contamination();
        let outcomes: [DetectionOutcome; 3] = [
            mahalanobis::detect(&matrix, mv.effective_mahalanobis_threshold()),
            lof::detect(&matrix, contamination, mv.n_neighbors),
            isolation_forest::detect(&matrix, contamination, mv.effective_random_seed()),
        ];
        for (method, outcome) in OutlierMethod::MULTIVARIATE.into_iter().zip(outcomes) {
            match outcome {
                Ok(detection) => {
                    debug!(method = method.name(), rows = matrix.n_rows(), outliers = detection.len(), "multivariate detection");
                    votes.record(&detection);
                    log.flagged(method, detection.rows());
                }
                Err(e) => log.failed_with(method, None, &e),
            }
        }

        // 3. hypothesis tests, per variable
        let hypothesis_reports = vec![
            resolved.grubbs(&self.grubbs_params()),
            resolved.dixon(&self.dixon_params()),
            resolved.rosner(&self.rosner_params()),
        ];
        for report in &hypothesis_reports {
            for variable in &report.variables {
                if let Some(message) = &variable.error {
                    let code = variable.error_code.as_deref().unwrap_or_default();
                    log.failed(report.method, Some(variable.variable.as_str()), code, message);
                }
            }
            let rows = report.flagged_rows();
            votes.record_rows(report.method, &rows);
            log.flagged(report.method, rows);
        }

        // 4. dataset normality
        let norm_cfg = &self.config.normality;
        let normality = assess_dataset_normality(
            samples.iter().map(|(v, s)| (v.as_str(), s.values())),
            norm_cfg.effective_max_variables(),
            norm_cfg.effective_normal_fraction(),
            normality_alpha,
        );
        for (variable, assessment) in &normality.assessments {
            if let Some(message) = &assessment.warning {
                self.events.emit_normality_warning(&NormalityWarningEvent {
                    dataset: name.to_string(),
                    variable: variable.clone(),
                    message: message.clone(),
                });
            }
        }

        // 5. combine
        let thresholds = self.thresholds();
        let generally_normal = normality.data_is_generally_normal;
        let final_outliers = policy::apply(strategy, &votes, generally_normal, thresholds);
        let breakdown = final_outliers
            .iter()
            .map(|&row| VoteBreakdown {
                row,
                observation_id: resolved.ids().resolve(row),
                univariate: votes.tensor.methods(row),
                univariate_variables: votes.tensor.consensus_variables(row),
                univariate_score: votes.tensor.univariate_score(row),
                multivariate: votes.multivariate_methods(row),
                hypothesis: votes.hypothesis_methods(row),
            })
            .collect();

        let outlier_percentage = if total_rows == 0 {
            0.0
        } else {
            final_outliers.len() as f64 / total_rows as f64 * 100.0
        };
        let mut warnings = Vec::new();
        let unusually_high_rate = outlier_percentage > HIGH_OUTLIER_PERCENTAGE;
        if unusually_high_rate {
            let message = format!(
                "{outlier_percentage:.1}% of rows were flagged; check the data or choose a stricter strategy"
            );
            warn!(dataset = name, percentage = outlier_percentage, "{message}");
            warnings.push(message);
            self.events.emit_high_outlier_rate(&HighOutlierRateEvent {
                dataset: name.to_string(),
                percentage: outlier_percentage,
            });
        }

        let duration_ms = started.elapsed().as_millis() as u64;
        info!(
            dataset = name,
            %strategy,
            final_outliers = final_outliers.len(),
            failures = log.failures.len(),
            duration_ms,
            "outlier detection complete"
        );
        self.events.emit_detection_complete(&DetectionCompleteEvent {
            dataset: name.to_string(),
            strategy,
            final_outliers: final_outliers.len(),
            total_rows,
            duration_ms,
        });

        Ok(DetectionReport {
            dataset: name.to_string(),
            total_rows,
            variables,
            complete_cases: matrix.n_rows(),
            method_outliers: log
                .method_outliers
                .into_iter()
                .map(|(method, rows)| (method, rows.into_iter().collect()))
                .collect(),
            final_outliers,
            outlier_percentage,
            strategy,
            strategy_description: policy::describe(strategy, generally_normal, thresholds),
            normality,
            votes: breakdown,
            failures: log.failures,
            hypothesis_reports,
            unusually_high_rate,
            warnings,
        })
    }
}
