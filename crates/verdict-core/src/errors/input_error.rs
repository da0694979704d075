//! Input errors: problems with the dataset itself. These abort a run.

use super::error_code::{self, VerdictErrorCode};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("Dataset not found: {dataset}")]
    DatasetNotFound { dataset: String },

    #[error("Dataset {dataset} has no quantitative columns")]
    NoQuantitativeColumns { dataset: String },

    #[error("Variable {variable} not found in dataset {dataset}")]
    VariableNotFound { dataset: String, variable: String },

    #[error("Variable {variable} is not quantitative")]
    NotQuantitative { variable: String },

    #[error("Subject id column {column} not found")]
    SubjectColumnNotFound { column: String },

    #[error("Column {column} already exists")]
    DuplicateColumn { column: String },

    #[error("Row {row} appears more than once")]
    DuplicateRow { row: usize },

    #[error("Shape mismatch: expected {expected} entries, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
}

impl VerdictErrorCode for InputError {
    fn error_code(&self) -> &'static str {
        error_code::INPUT_ERROR
    }
}
