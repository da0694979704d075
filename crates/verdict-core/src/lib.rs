//! # verdict-core
//!
//! Shared foundation for the Verdict outlier engine: row identity, numeric
//! samples and matrices, the tabular collaborator trait, configuration,
//! errors, detection events, tracing setup, and constants.

pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod tracing;
pub mod types;

pub use config::DetectionConfig;
pub use errors::{ConfigError, DetectionError, EngineError, InputError, VerdictErrorCode};
pub use types::dataset::{Column, Dataset, TabularHandle};
pub use types::identifiers::RowId;
pub use types::sample::{NumericMatrix, NumericSample};
