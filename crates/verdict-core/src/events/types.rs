//! Event payload types.

use crate::config::CombineStrategy;

/// Payload for `on_detection_started`.
#[derive(Debug, Clone)]
pub struct DetectionStartedEvent {
    pub dataset: String,
    pub strategy: CombineStrategy,
    pub variables: usize,
    pub rows: usize,
}

/// Payload for `on_method_failed`. The run continues without this method's votes.
#[derive(Debug, Clone)]
pub struct MethodFailedEvent {
    pub dataset: String,
    pub method: String,
    /// `None` for methods that run once over the whole matrix.
    pub variable: Option<String>,
    pub error_code: String,
    pub message: String,
}

/// Payload for `on_normality_warning`.
#[derive(Debug, Clone)]
pub struct NormalityWarningEvent {
    pub dataset: String,
    pub variable: String,
    pub message: String,
}

/// Payload for `on_high_outlier_rate`.
#[derive(Debug, Clone)]
pub struct HighOutlierRateEvent {
    pub dataset: String,
    pub percentage: f64,
}

/// Payload for `on_detection_complete`.
#[derive(Debug, Clone)]
pub struct DetectionCompleteEvent {
    pub dataset: String,
    pub strategy: CombineStrategy,
    pub final_outliers: usize,
    pub total_rows: usize,
    pub duration_ms: u64,
}
