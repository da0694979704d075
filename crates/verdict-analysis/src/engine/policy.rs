//! Combination policies: turn per-method votes into the final outlier set.

use verdict_core::config::CombineStrategy;
use verdict_core::constants::{DEFAULT_MIN_MULTIVARIATE, DEFAULT_MIN_UNIVARIATE};
use verdict_core::types::collections::{BTreeSet, FxHashMap, SmallVec3};
use verdict_core::RowId;

use super::tensor::VotingTensor;
use crate::outliers::types::{Detection, MethodCategory, OutlierMethod};

/// Every vote cast in one run.
#[derive(Debug, Clone, Default)]
pub struct VoteSheet {
    pub tensor: VotingTensor,
    multivariate: FxHashMap<RowId, SmallVec3<OutlierMethod>>,
    hypothesis: FxHashMap<RowId, SmallVec3<OutlierMethod>>,
}

impl VoteSheet {
    pub fn new(tensor: VotingTensor) -> Self {
        Self {
            tensor,
            ..Self::default()
        }
    }

    /// Record a multivariate or hypothesis-test detection. Univariate
    /// detections belong in the tensor and are ignored here.
    pub fn record(&mut self, detection: &Detection) {
        let votes = match detection.method.category() {
            MethodCategory::Multivariate => &mut self.multivariate,
            MethodCategory::HypothesisTest => &mut self.hypothesis,
            MethodCategory::Univariate => return,
        };
        for row in detection.rows() {
            let methods = votes.entry(row).or_default();
            if !methods.contains(&detection.method) {
                methods.push(detection.method);
            }
        }
    }

    /// Record rows flagged by a hypothesis test across any number of variables.
    pub fn record_rows(&mut self, method: OutlierMethod, rows: &[RowId]) {
        let votes = match method.category() {
            MethodCategory::Multivariate => &mut self.multivariate,
            MethodCategory::HypothesisTest => &mut self.hypothesis,
            MethodCategory::Univariate => return,
        };
        for row in rows {
            let methods = votes.entry(*row).or_default();
            if !methods.contains(&method) {
                methods.push(method);
            }
        }
    }

    pub fn multivariate_methods(&self, row: RowId) -> SmallVec3<OutlierMethod> {
        self.multivariate.get(&row).cloned().unwrap_or_default()
    }

    pub fn hypothesis_methods(&self, row: RowId) -> SmallVec3<OutlierMethod> {
        self.hypothesis.get(&row).cloned().unwrap_or_default()
    }

    fn multivariate_count(&self, row: RowId) -> usize {
        self.multivariate.get(&row).map_or(0, |m| m.len())
    }

    fn multivariate_has(&self, row: RowId, method: OutlierMethod) -> bool {
        self.multivariate.get(&row).is_some_and(|m| m.contains(&method))
    }

    fn any_hypothesis(&self, row: RowId) -> bool {
        self.hypothesis.get(&row).is_some_and(|m| !m.is_empty())
    }

    /// Every row with at least one vote of any kind, ascending.
    pub fn candidates(&self) -> BTreeSet<RowId> {
        self.tensor
            .rows()
            .chain(self.multivariate.keys().copied())
            .chain(self.hypothesis.keys().copied())
            .collect()
    }
}

/// Thresholds of the voting policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VotingThresholds {
    pub min_univariate: usize,
    pub min_multivariate: usize,
}

impl Default for VotingThresholds {
    fn default() -> Self {
        Self {
            min_univariate: DEFAULT_MIN_UNIVARIATE,
            min_multivariate: DEFAULT_MIN_MULTIVARIATE,
        }
    }
}

/// Decide whether one row is a final outlier.
pub fn is_final_outlier(
    strategy: CombineStrategy,
    votes: &VoteSheet,
    row: RowId,
    generally_normal: bool,
    thresholds: VotingThresholds,
) -> bool {
    let hypothesis = votes.any_hypothesis(row);
    let univariate_score = votes.tensor.univariate_score(row);
    let multivariate = votes.multivariate_count(row);
    let lof = votes.multivariate_has(row, OutlierMethod::LocalOutlierFactor);
    let isolation = votes.multivariate_has(row, OutlierMethod::IsolationForest);

    match strategy {
        CombineStrategy::Voting => {
            hypothesis
                || multivariate >= thresholds.min_multivariate
                || univariate_score >= thresholds.min_univariate
        }
        CombineStrategy::Adaptive if generally_normal => {
            hypothesis
                || (votes.multivariate_has(row, OutlierMethod::Mahalanobis) && votes.tensor.flagged_any(row))
                || (lof && isolation)
                || univariate_score >= DEFAULT_MIN_UNIVARIATE
        }
        CombineStrategy::Adaptive => {
            hypothesis
                || (lof && isolation)
                || univariate_score >= DEFAULT_MIN_UNIVARIATE
                || ((lof || isolation) && univariate_score >= 1)
        }
        CombineStrategy::Union => hypothesis || multivariate > 0 || votes.tensor.flagged_any(row),
        CombineStrategy::Intersection => hypothesis || (univariate_score >= 1 && multivariate >= 1),
    }
}

/// Final outlier rows, ascending.
pub fn apply(
    strategy: CombineStrategy,
    votes: &VoteSheet,
    generally_normal: bool,
    thresholds: VotingThresholds,
) -> Vec<RowId> {
    votes
        .candidates()
        .into_iter()
        .filter(|row| is_final_outlier(strategy, votes, *row, generally_normal, thresholds))
        .collect()
}

/// Human-readable statement of the rule a strategy applied.
pub fn describe(strategy: CombineStrategy, generally_normal: bool, thresholds: VotingThresholds) -> String {
    match strategy {
        CombineStrategy::Voting => format!(
            "Voting: flagged by any hypothesis test, by at least {} multivariate method(s), \
             or by at least two univariate methods in at least {} variable(s)",
            thresholds.min_multivariate, thresholds.min_univariate
        ),
        CombineStrategy::Adaptive if generally_normal => "Adaptive (data generally normal): hypothesis-test \
             flags, Mahalanobis flags confirmed by a univariate method, LOF and isolation forest consensus, \
             or univariate consensus in at least two variables"
            .to_string(),
        CombineStrategy::Adaptive => "Adaptive (data not generally normal): hypothesis-test flags, LOF and \
             isolation forest consensus, univariate consensus in at least two variables, or a single LOF or \
             isolation forest vote backed by univariate consensus"
            .to_string(),
        CombineStrategy::Union => "Union: flagged by any method".to_string(),
        CombineStrategy::Intersection => "Intersection: flagged by a hypothesis test, or by both univariate \
             consensus and at least one multivariate method"
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tensor::TensorBuilder;
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

    // row 1: univariate score 2; row 2: score 1 + LOF; row 3: single IQR vote;
    // row 4: Mahalanobis only; row 5: Grubbs only; row 6: LOF + isolation;
    // row 7: isolation + single IQR vote
    fn sheet() -> VoteSheet {
        let mut b = TensorBuilder::new(vec!["a".into(), "b".into()]);
        for var in 0..2 {
            b.record(var, &detection(OutlierMethod::Iqr, &[1]));
            b.record(var, &detection(OutlierMethod::Mad, &[1]));
        }
        b.record(0, &detection(OutlierMethod::ZScore, &[2]));
        b.record(0, &detection(OutlierMethod::Mad, &[2]));
        b.record(1, &detection(OutlierMethod::Iqr, &[3, 7]));
        let mut votes = VoteSheet::new(b.build());
        votes.record(&detection(OutlierMethod::LocalOutlierFactor, &[2, 6]));
        votes.record(&detection(OutlierMethod::Mahalanobis, &[4]));
        votes.record(&detection(OutlierMethod::IsolationForest, &[6, 7]));
        votes.record_rows(OutlierMethod::Grubbs, &[RowId(5)]);
        votes
    }

    fn ids(rows: &[usize]) -> Vec<RowId> {
        rows.iter().map(|&r| RowId(r)).collect()
    }

    #[test]
    fn voting() {
        let got = apply(CombineStrategy::Voting, &sheet(), false, VotingThresholds::default());
        assert_eq!(got, ids(&[1, 2, 4, 5, 6, 7]));
    }

    #[test]
    fn union_takes_everything() {
        let got = apply(CombineStrategy::Union, &sheet(), false, VotingThresholds::default());
        assert_eq!(got, ids(&[1, 2, 3, 4, 5, 6, 7]));
    }

    #[test]
    fn intersection_needs_agreement() {
        let got = apply(CombineStrategy::Intersection, &sheet(), false, VotingThresholds::default());
        assert_eq!(got, ids(&[2, 5]));
    }

    #[test]
    fn adaptive_branches_on_normality() {
        let normal = apply(CombineStrategy::Adaptive, &sheet(), true, VotingThresholds::default());
        assert_eq!(normal, ids(&[1, 5, 6]));
        let skewed = apply(CombineStrategy::Adaptive, &sheet(), false, VotingThresholds::default());
        assert_eq!(skewed, ids(&[1, 2, 5, 6]));
    }

    #[test]
    fn stricter_voting_thresholds() {
        let t = VotingThresholds {
            min_univariate: 3,
            min_multivariate: 2,
        };
        assert_eq!(apply(CombineStrategy::Voting, &sheet(), false, t), ids(&[5, 6]));
    }

    #[test]
    fn descriptions_name_the_strategy() {
        for s in CombineStrategy::ALL {
            let d = describe(s, true, VotingThresholds::default());
            assert!(d.to_lowercase().starts_with(s.name()));
        }
    }
}
