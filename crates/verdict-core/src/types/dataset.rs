//! Tabular access: the collaborator trait the engine reads from, and an
//! in-memory table that implements it.

use serde::{Deserialize, Serialize};

use super::identifiers::RowId;
use super::sample::NumericSample;
use crate::errors::InputError;

/// Read-only view of a loaded table.
///
/// The engine borrows a handle for the duration of one detection run and
/// never mutates it.
pub trait TabularHandle {
    /// Dataset name, used as error and log context.
    fn name(&self) -> &str;

    /// Number of rows in the table.
    fn row_count(&self) -> usize;

    /// Identifiers of every row, in table order.
    fn row_ids(&self) -> Vec<RowId> {
        (0..self.row_count()).map(RowId).collect()
    }

    /// Names of the columns classified as quantitative, in table order.
    fn quantitative_columns(&self) -> Vec<String>;

    /// A quantitative column with missing cells removed.
    fn column(&self, name: &str) -> Result<NumericSample, InputError>;

    /// Display label of a cell, used to resolve observation identifiers.
    fn label(&self, column: &str, row: RowId) -> Result<Option<String>, InputError>;

    /// Whether the table has a column with this name.
    fn has_column(&self, name: &str) -> bool;
}

/// A single column of an in-memory [`Dataset`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "cells")]
pub enum Column {
    Quantitative(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
}

impl Column {
    /// Quantitative column without missing cells.
    pub fn numeric<I: IntoIterator<Item = f64>>(values: I) -> Self {
        Self::Quantitative(values.into_iter().map(Some).collect())
    }

    /// Categorical column without missing cells.
    pub fn text<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Categorical(values.into_iter().map(|s| Some(s.into())).collect())
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Quantitative(c) => c.len(),
            Self::Categorical(c) => c.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_quantitative(&self) -> bool {
        matches!(self, Self::Quantitative(_))
    }
}

/// In-memory table: named, equally long columns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    name: String,
    columns: Vec<(String, Column)>,
}

impl Dataset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Append a column. All columns must have the same length and distinct names.
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> Result<Self, InputError> {
        self.push_column(name, column)?;
        Ok(self)
    }

    pub fn push_column(&mut self, name: impl Into<String>, column: Column) -> Result<(), InputError> {
        let name = name.into();
        if self.has_column(&name) {
            return Err(InputError::DuplicateColumn { column: name });
        }
        if let Some((_, first)) = self.columns.first() {
            if first.len() != column.len() {
                return Err(InputError::ShapeMismatch {
                    expected: first.len(),
                    actual: column.len(),
                });
            }
        }
        self.columns.push((name, column));
        Ok(())
    }

    fn find(&self, name: &str) -> Result<&Column, InputError> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
            .ok_or_else(|| InputError::VariableNotFound {
                dataset: self.name.clone(),
                variable: name.to_string(),
            })
    }
}

impl TabularHandle for Dataset {
    fn name(&self) -> &str {
        &self.name
    }

    fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |(_, c)| c.len())
    }

    fn quantitative_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|(_, c)| c.is_quantitative())
            .map(|(n, _)| n.clone())
            .collect()
    }

    fn column(&self, name: &str) -> Result<NumericSample, InputError> {
        match self.find(name)? {
            Column::Quantitative(cells) => Ok(NumericSample::from_column(cells)),
            Column::Categorical(_) => Err(InputError::NotQuantitative {
                variable: name.to_string(),
            }),
        }
    }

    fn label(&self, column: &str, row: RowId) -> Result<Option<String>, InputError> {
        let label = match self.find(column)? {
            Column::Quantitative(cells) => cells
                .get(row.index())
                .copied()
                .flatten()
                .map(format_number),
            Column::Categorical(cells) => cells.get(row.index()).cloned().flatten(),
        };
        Ok(label)
    }

    fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }
}

/// Integral values print without a fractional part, so numeric subject ids read naturally.
fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}
