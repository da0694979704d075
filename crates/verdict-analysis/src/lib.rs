//! # verdict-analysis
//!
//! Outlier detection over tabular numeric data.
//!
//! - `normality`: Shapiro-Wilk / Anderson-Darling pre-checks
//! - `outliers::univariate`: IQR, Z-Score, MAD
//! - `outliers::multivariate`: Mahalanobis, local outlier factor, isolation forest
//! - `outliers::hypothesis`: Grubbs, Dixon, Rosner (generalized ESD), with
//!   per-variable detailed reports
//! - `engine`: voting tensor, combination policies, and the engine that
//!   turns every method's votes into one final outlier set

pub mod engine;
pub mod normality;
pub mod outliers;

pub use engine::{DetectionReport, OutlierEngine};
pub use normality::{check_normality, NormalityAssessment};
pub use outliers::types::{Detection, DetectionOutcomeExt, OutlierMethod, OutlierResult};
