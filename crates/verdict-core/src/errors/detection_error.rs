//! Detection errors: a single method could not produce a verdict.
//!
//! All variants are recoverable. The engine records the failure and treats
//! the method's contribution as empty, so "no outliers" and "method failed"
//! stay distinguishable in the report.

use super::error_code::{self, VerdictErrorCode};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DetectionError {
    /// Zero variance, zero IQR/MAD/range, or a singular covariance matrix.
    #[error("{method}: degenerate sample ({reason})")]
    Degenerate { method: String, reason: String },

    #[error("{method}: needs at least {required} observations, got {actual}")]
    InsufficientData {
        method: String,
        required: usize,
        actual: usize,
    },

    /// A parameter or sample size outside what the method supports.
    #[error("{method}: {message}")]
    UnsupportedParameter { method: String, message: String },

    /// Unexpected numerical failure inside a detector.
    #[error("{method}: computation failed ({message})")]
    Computation { method: String, message: String },
}

impl DetectionError {
    pub fn degenerate(method: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Degenerate {
            method: method.into(),
            reason: reason.into(),
        }
    }

    pub fn insufficient(method: impl Into<String>, required: usize, actual: usize) -> Self {
        Self::InsufficientData {
            method: method.into(),
            required,
            actual,
        }
    }

    pub fn unsupported(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnsupportedParameter {
            method: method.into(),
            message: message.into(),
        }
    }

    pub fn computation(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Computation {
            method: method.into(),
            message: message.into(),
        }
    }

    /// Name of the method that failed.
    pub fn method(&self) -> &str {
        match self {
            Self::Degenerate { method, .. }
            | Self::InsufficientData { method, .. }
            | Self::UnsupportedParameter { method, .. }
            | Self::Computation { method, .. } => method,
        }
    }
}

impl VerdictErrorCode for DetectionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Degenerate { .. } => error_code::DEGENERATE_SAMPLE,
            Self::InsufficientData { .. } => error_code::INSUFFICIENT_DATA,
            Self::UnsupportedParameter { .. } => error_code::UNSUPPORTED_PARAMETER,
            Self::Computation { .. } => error_code::COMPUTATION_ERROR,
        }
    }
}
