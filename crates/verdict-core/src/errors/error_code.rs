//! VerdictErrorCode trait for boundary conversion.

/// Every error enum implements this to provide a stable, machine-readable
/// code alongside its human-readable message.
pub trait VerdictErrorCode {
    /// Returns the error code string (e.g., "INPUT_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted boundary string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const INPUT_ERROR: &str = "INPUT_ERROR";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const DEGENERATE_SAMPLE: &str = "DEGENERATE_SAMPLE";
pub const INSUFFICIENT_DATA: &str = "INSUFFICIENT_DATA";
pub const UNSUPPORTED_PARAMETER: &str = "UNSUPPORTED_PARAMETER";
pub const COMPUTATION_ERROR: &str = "COMPUTATION_ERROR";
