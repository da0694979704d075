//! Outlier detectors, grouped by family.
//!
//! Every primitive takes a `NumericSample` (or `NumericMatrix`) and returns
//! `Result<Detection, DetectionError>`. Errors are always recoverable: the
//! engine records them and counts the method's vote as empty.

pub mod hypothesis;
pub mod multivariate;
pub mod stats;
pub mod types;
pub mod univariate;

pub use types::{Detection, DetectionOutcome, DetectionOutcomeExt, ExtremeSide, MethodCategory, OutlierMethod, OutlierResult};
