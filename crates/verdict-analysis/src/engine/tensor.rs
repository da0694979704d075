//! Row × variable × univariate-method vote tensor.

use verdict_core::types::collections::{FxHashMap, SmallVec3};
use verdict_core::RowId;

use crate::outliers::types::{Detection, OutlierMethod};

/// Bit of each univariate method in a cell mask.
fn bit(method: OutlierMethod) -> Option<u8> {
    match method {
        OutlierMethod::Iqr => Some(0b001),
        OutlierMethod::ZScore => Some(0b010),
        OutlierMethod::Mad => Some(0b100),
        _ => None,
    }
}

/// Votes needed within one variable for it to count towards a row's score.
pub const VARIABLE_CONSENSUS: usize = 2;

/// Which univariate methods flagged each row in each variable.
///
/// Filled once by [`TensorBuilder`] and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct VotingTensor {
    variables: Vec<String>,
    cells: FxHashMap<RowId, Vec<u8>>,
}

/// Collects detections variable by variable, then freezes into a [`VotingTensor`].
#[derive(Debug)]
pub struct TensorBuilder {
    tensor: VotingTensor,
}

impl TensorBuilder {
    pub fn new(variables: Vec<String>) -> Self {
        Self {
            tensor: VotingTensor {
                variables,
                cells: FxHashMap::default(),
            },
        }
    }

    /// Record a univariate detection for the variable at `variable`.
    /// Multivariate and hypothesis detections are ignored.
    pub fn record(&mut self, variable: usize, detection: &Detection) {
        let Some(mask) = bit(detection.method) else {
            return;
        };
        let width = self.tensor.variables.len();
        if variable >= width {
            return;
        }
        for row in detection.rows() {
            let cells = self.tensor.cells.entry(row).or_insert_with(|| vec![0; width]);
            cells[variable] |= mask;
        }
    }

    pub fn build(self) -> VotingTensor {
        self.tensor
    }
}

impl VotingTensor {
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn flagged(&self, row: RowId, variable: usize, method: OutlierMethod) -> bool {
        match (self.cells.get(&row), bit(method)) {
            (Some(cells), Some(mask)) => cells.get(variable).is_some_and(|c| c & mask != 0),
            _ => false,
        }
    }

    /// Number of univariate methods flagging `row` in `variable`.
    pub fn votes(&self, row: RowId, variable: usize) -> usize {
        self.cells
            .get(&row)
            .and_then(|cells| cells.get(variable))
            .map_or(0, |c| c.count_ones() as usize)
    }

    /// Number of variables in which at least two of the three univariate methods flag `row`.
    pub fn univariate_score(&self, row: RowId) -> usize {
        self.cells.get(&row).map_or(0, |cells| {
            cells
                .iter()
                .filter(|c| c.count_ones() as usize >= VARIABLE_CONSENSUS)
                .count()
        })
    }

    /// Flagged in at least one variable by any univariate method.
    pub fn flagged_any(&self, row: RowId) -> bool {
        self.cells
            .get(&row)
            .is_some_and(|cells| cells.iter().any(|c| *c != 0))
    }

    /// Variables that count towards `row`'s score.
    pub fn consensus_variables(&self, row: RowId) -> Vec<String> {
        self.cells.get(&row).map_or_else(Vec::new, |cells| {
            cells
                .iter()
                .zip(&self.variables)
                .filter(|(c, _)| c.count_ones() as usize >= VARIABLE_CONSENSUS)
                .map(|(_, v)| v.clone())
                .collect()
        })
    }

    /// Univariate methods flagging `row` in any variable.
    pub fn methods(&self, row: RowId) -> SmallVec3<OutlierMethod> {
        let union = self
            .cells
            .get(&row)
            .map_or(0, |cells| cells.iter().fold(0u8, |acc, c| acc | c));
        OutlierMethod::UNIVARIATE
            .into_iter()
            .filter(|m| bit(*m).is_some_and(|b| union & b != 0))
            .collect()
    }

    /// Every row with at least one univariate vote.
    pub fn rows(&self) -> impl Iterator<Item = RowId> + '_ {
        self.cells.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outliers::types::OutlierResult;

    fn detection(method: OutlierMethod, rows: &[usize]) -> Detection {
        Detection::new(
            method,
            rows.iter()
                .map(|&r| OutlierResult {
                    row: RowId(r),
                    value: 0.0,
                    test_statistic: 0.0,
                    critical_value: None,
                    p_value: None,
                    extreme: None,
                    method,
                })
                .collect(),
        )
    }

    fn tensor() -> VotingTensor {
        let mut b = TensorBuilder::new(vec!["a".into(), "b".into()]);
        b.record(0, &detection(OutlierMethod::Iqr, &[1, 2]));
        b.record(0, &detection(OutlierMethod::ZScore, &[1]));
        b.record(1, &detection(OutlierMethod::Mad, &[1, 3]));
        b.record(1, &detection(OutlierMethod::Iqr, &[1]));
        b.record(1, &detection(OutlierMethod::Mahalanobis, &[4]));
        b.build()
    }

    #[test]
    fn score_counts_variables_with_two_votes() {
        let t = tensor();
        assert_eq!(t.univariate_score(RowId(1)), 2);
        assert_eq!(t.univariate_score(RowId(2)), 0);
        assert_eq!(t.votes(RowId(1), 0), 2);
        assert_eq!(t.consensus_variables(RowId(1)), vec!["a", "b"]);
    }

    #[test]
    fn any_vote_is_tracked() {
        let t = tensor();
        assert!(t.flagged_any(RowId(2)));
        assert!(t.flagged_any(RowId(3)));
        assert!(!t.flagged_any(RowId(4)));
        assert!(t.flagged(RowId(3), 1, OutlierMethod::Mad));
        assert!(!t.flagged(RowId(3), 0, OutlierMethod::Mad));
    }

    #[test]
    fn methods_lists_each_once() {
        let t = tensor();
        assert_eq!(t.methods(RowId(1)).as_slice(), &[OutlierMethod::Iqr, OutlierMethod::ZScore, OutlierMethod::Mad]);
        assert_eq!(t.methods(RowId(2)).as_slice(), &[OutlierMethod::Iqr]);
    }
}
