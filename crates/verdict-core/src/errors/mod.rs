//! Error handling for Verdict.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod config_error;
pub mod detection_error;
pub mod engine_error;
pub mod error_code;
pub mod input_error;

pub use config_error::ConfigError;
pub use detection_error::DetectionError;
pub use engine_error::EngineError;
pub use error_code::VerdictErrorCode;
pub use input_error::InputError;
