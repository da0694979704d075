//! Shared constants for the Verdict outlier engine.

/// Verdict version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ---- Univariate ----

/// Default Z-Score threshold.
pub const DEFAULT_ZSCORE_THRESHOLD: f64 = 3.0;

/// Default modified Z-Score (MAD) threshold.
pub const DEFAULT_MAD_THRESHOLD: f64 = 3.0;

/// Scales MAD to a consistent estimator of the standard deviation under normality.
pub const MAD_CONSISTENCY: f64 = 1.4826;

/// IQR fence factor for samples with fewer than 100 values.
pub const IQR_FACTOR_SMALL: f64 = 3.0;

/// IQR fence factor for samples with fewer than 1000 values.
pub const IQR_FACTOR_MEDIUM: f64 = 2.0;

/// IQR fence factor for larger samples (Tukey's classic fence).
pub const IQR_FACTOR_LARGE: f64 = 1.5;

// ---- Multivariate ----

/// Default Mahalanobis distance threshold.
pub const DEFAULT_MAHALANOBIS_THRESHOLD: f64 = 3.0;

/// Default contamination fraction for LOF and isolation forest.
pub const DEFAULT_CONTAMINATION: f64 = 0.05;

/// Upper bound on the contamination fraction.
pub const MAX_CONTAMINATION: f64 = 0.10;

/// Default seed for the isolation forest.
pub const DEFAULT_RANDOM_SEED: u64 = 42;

/// Number of trees in the isolation forest.
pub const ISOLATION_TREES: usize = 100;

/// Maximum subsample size per isolation tree.
pub const ISOLATION_MAX_SAMPLES: usize = 256;

/// Minimum rows for the local outlier factor.
pub const LOF_MIN_ROWS: usize = 10;

/// Neighbour count bounds for the local outlier factor.
pub const LOF_MIN_NEIGHBORS: usize = 10;
pub const LOF_MAX_NEIGHBORS: usize = 20;

// ---- Hypothesis tests ----

/// Default significance level for Grubbs, Dixon and Rosner.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Dixon's test sample size bounds (inclusive).
pub const DIXON_MIN_N: usize = 3;
pub const DIXON_MAX_N: usize = 30;

/// Minimum sample size for the Rosner (generalized ESD) test.
pub const ROSNER_MIN_N: usize = 25;

// ---- Normality ----

/// Largest sample tested with Shapiro-Wilk; larger samples use Anderson-Darling.
pub const SHAPIRO_MAX_N: usize = 50;

/// Maximum number of variables sampled for the dataset normality verdict.
pub const NORMALITY_SAMPLE_VARIABLES: usize = 5;

/// Fraction of sampled variables that must be normal for the dataset to count as normal.
pub const NORMAL_FRACTION_THRESHOLD: f64 = 0.60;

// ---- Combination ----

/// Default minimum univariate score under the voting policy.
pub const DEFAULT_MIN_UNIVARIATE: usize = 2;

/// Default minimum multivariate votes under the voting policy.
pub const DEFAULT_MIN_MULTIVARIATE: usize = 1;

/// Final outlier percentage above which the report is marked unusually high.
pub const HIGH_OUTLIER_PERCENTAGE: f64 = 50.0;

/// Prefix of synthetic observation identifiers.
pub const SYNTHETIC_ID_PREFIX: &str = "obs_";
