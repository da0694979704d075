//! Combination engine.
//!
//! Runs every detector over a dataset, collects their votes and applies the
//! configured combination policy:
//!
//! 1. univariate detectors per variable → [`tensor::VotingTensor`]
//! 2. multivariate detectors once, on the complete-case matrix
//! 3. detailed hypothesis tests per variable
//! 4. dataset normality over the first few variables
//! 5. [`policy::apply`] → final outliers → [`DetectionReport`]

pub mod outlier_engine;
pub mod policy;
pub mod report;
pub mod tensor;

pub use outlier_engine::OutlierEngine;
pub use policy::{VoteSheet, VotingThresholds};
pub use report::{DetectionReport, MethodFailure, VoteBreakdown};
pub use tensor::VotingTensor;
