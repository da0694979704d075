//! Univariate detectors: flag anomalous values within one variable.

pub mod iqr;
pub mod mad;
pub mod zscore;
