//! Numeric samples and complete-case matrices.

use serde::{Deserialize, Serialize};

use super::collections::{FxHashMap, FxHashSet};
use super::identifiers::RowId;
use crate::errors::InputError;

/// An ordered sequence of finite values, each tagged with the row it came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericSample {
    ids: Vec<RowId>,
    values: Vec<f64>,
}

impl NumericSample {
    /// Build a sample from parallel id/value vectors.
    ///
    /// Fails when the lengths differ or an id repeats.
    pub fn new(ids: Vec<RowId>, values: Vec<f64>) -> Result<Self, InputError> {
        if ids.len() != values.len() {
            return Err(InputError::ShapeMismatch {
                expected: ids.len(),
                actual: values.len(),
            });
        }
        let mut seen = FxHashSet::default();
        for id in &ids {
            if !seen.insert(*id) {
                return Err(InputError::DuplicateRow { row: id.index() });
            }
        }
        Ok(Self { ids, values })
    }

    /// Sample whose ids are the positions `0..values.len()`.
    pub fn from_values(values: &[f64]) -> Self {
        Self {
            ids: (0..values.len()).map(RowId).collect(),
            values: values.to_vec(),
        }
    }

    /// Sample from a raw column, dropping missing and non-finite cells.
    pub fn from_column(cells: &[Option<f64>]) -> Self {
        let (ids, values) = cells
            .iter()
            .enumerate()
            .filter_map(|(i, cell)| match cell {
                Some(v) if v.is_finite() => Some((RowId(i), *v)),
                _ => None,
            })
            .unzip();
        Self { ids, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn ids(&self) -> &[RowId] {
        &self.ids
    }

    /// Row id of the `position`-th element.
    pub fn id_at(&self, position: usize) -> Option<RowId> {
        self.ids.get(position).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RowId, f64)> + '_ {
        self.ids.iter().copied().zip(self.values.iter().copied())
    }
}

/// Complete-case matrix: one row per table row that has a value in every selected variable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericMatrix {
    columns: Vec<String>,
    rows: Vec<RowId>,
    data: Vec<Vec<f64>>,
}

impl NumericMatrix {
    /// Build a matrix from row-major data.
    pub fn new(columns: Vec<String>, rows: Vec<RowId>, data: Vec<Vec<f64>>) -> Result<Self, InputError> {
        if rows.len() != data.len() {
            return Err(InputError::ShapeMismatch {
                expected: rows.len(),
                actual: data.len(),
            });
        }
        if let Some(bad) = data.iter().find(|r| r.len() != columns.len()) {
            return Err(InputError::ShapeMismatch {
                expected: columns.len(),
                actual: bad.len(),
            });
        }
        Ok(Self { columns, rows, data })
    }

    /// Keep only the rows present in every sample, in ascending row order.
    pub fn complete_cases(samples: &[(String, NumericSample)]) -> Self {
        let Some((_, first)) = samples.first() else {
            return Self::default();
        };

        let lookups: Vec<FxHashMap<RowId, f64>> = samples
            .iter()
            .map(|(_, s)| s.iter().collect())
            .collect();

        let mut rows: Vec<RowId> = first
            .ids()
            .iter()
            .copied()
            .filter(|id| lookups.iter().all(|m| m.contains_key(id)))
            .collect();
        rows.sort_unstable();

        let data = rows
            .iter()
            .map(|id| lookups.iter().map(|m| m[id]).collect())
            .collect();

        Self {
            columns: samples.iter().map(|(name, _)| name.clone()).collect(),
            rows,
            data,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Row id for each matrix row (the matrix-to-table mapping).
    pub fn row_ids(&self) -> &[RowId] {
        &self.rows
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.data
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_column_drops_missing_and_nan() {
        let s = NumericSample::from_column(&[Some(1.0), None, Some(f64::NAN), Some(4.0)]);
        assert_eq!(s.values(), &[1.0, 4.0]);
        assert_eq!(s.ids(), &[RowId(0), RowId(3)]);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let err = NumericSample::new(vec![RowId(1), RowId(1)], vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, InputError::DuplicateRow { row: 1 }));
    }

    #[test]
    fn complete_cases_intersects_rows() {
        let a = NumericSample::from_column(&[Some(1.0), Some(2.0), None, Some(4.0)]);
        let b = NumericSample::from_column(&[Some(10.0), None, Some(30.0), Some(40.0)]);
        let m = NumericMatrix::complete_cases(&[("a".into(), a), ("b".into(), b)]);
        assert_eq!(m.row_ids(), &[RowId(0), RowId(3)]);
        assert_eq!(m.row(1), &[4.0, 40.0]);
        assert_eq!(m.n_cols(), 2);
    }

    #[test]
    fn complete_cases_of_nothing_is_empty() {
        let m = NumericMatrix::complete_cases(&[]);
        assert_eq!(m.n_rows(), 0);
    }
}
