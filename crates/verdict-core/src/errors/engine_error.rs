//! Engine errors: the single aggregated failure a detection run can return.

use super::error_code::VerdictErrorCode;
use super::{ConfigError, InputError};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Detection on dataset {dataset} failed: {source}")]
    Input {
        dataset: String,
        #[source]
        source: InputError,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl EngineError {
    /// Attach the dataset name to an input error.
    pub fn input(dataset: impl Into<String>, source: InputError) -> Self {
        Self::Input {
            dataset: dataset.into(),
            source,
        }
    }
}

impl VerdictErrorCode for EngineError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Input { source, .. } => source.error_code(),
            Self::Config(e) => e.error_code(),
        }
    }
}
