//! Per-method-family configuration.
//!
//! Every field is optional so partial TOML files merge cleanly; the
//! `effective_*` accessors supply the compiled defaults.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ALPHA, DEFAULT_CONTAMINATION, DEFAULT_MAD_THRESHOLD, DEFAULT_MAHALANOBIS_THRESHOLD,
    DEFAULT_RANDOM_SEED, DEFAULT_ZSCORE_THRESHOLD, IQR_FACTOR_LARGE, IQR_FACTOR_MEDIUM,
    IQR_FACTOR_SMALL, MAX_CONTAMINATION, NORMALITY_SAMPLE_VARIABLES, NORMAL_FRACTION_THRESHOLD,
};

/// IQR, Z-Score and MAD settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct UnivariateConfig {
    /// Z-Score threshold. Default: 3.0.
    pub zscore_threshold: Option<f64>,
    /// Modified Z-Score threshold. Default: 3.0.
    pub mad_threshold: Option<f64>,
    /// Fixed IQR fence factor. Default: sized by sample (3.0 / 2.0 / 1.5).
    pub iqr_factor: Option<f64>,
    /// Run the normality checker before the Z-Score and log a warning. Default: true.
    pub zscore_normality_check: Option<bool>,
}

impl UnivariateConfig {
    pub fn effective_zscore_threshold(&self) -> f64 {
        self.zscore_threshold.unwrap_or(DEFAULT_ZSCORE_THRESHOLD)
    }

    pub fn effective_mad_threshold(&self) -> f64 {
        self.mad_threshold.unwrap_or(DEFAULT_MAD_THRESHOLD)
    }

    /// IQR fence factor for a sample of `n` values.
    pub fn effective_iqr_factor(&self, n: usize) -> f64 {
        self.iqr_factor.unwrap_or(if n < 100 {
            IQR_FACTOR_SMALL
        } else if n < 1000 {
            IQR_FACTOR_MEDIUM
        } else {
            IQR_FACTOR_LARGE
        })
    }

    pub fn effective_zscore_normality_check(&self) -> bool {
        self.zscore_normality_check.unwrap_or(true)
    }
}

/// Mahalanobis, LOF and isolation forest settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct MultivariateConfig {
    /// Mahalanobis distance threshold. Default: 3.0.
    pub mahalanobis_threshold: Option<f64>,
    /// Expected outlier fraction for LOF and isolation forest. Default: 0.05, capped at 0.10.
    pub contamination: Option<f64>,
    /// Fixed LOF neighbour count. Default: clamp(n/10, 10, 20), capped at n-1.
    pub n_neighbors: Option<usize>,
    /// Isolation forest seed. Default: 42.
    pub random_seed: Option<u64>,
}

impl MultivariateConfig {
    pub fn effective_mahalanobis_threshold(&self) -> f64 {
        self.mahalanobis_threshold.unwrap_or(DEFAULT_MAHALANOBIS_THRESHOLD)
    }

    /// Contamination, never above 0.10.
    pub fn effective_contamination(&self) -> f64 {
        self.contamination
            .unwrap_or(DEFAULT_CONTAMINATION)
            .min(MAX_CONTAMINATION)
    }

    pub fn effective_random_seed(&self) -> u64 {
        self.random_seed.unwrap_or(DEFAULT_RANDOM_SEED)
    }
}

/// Grubbs, Dixon and Rosner settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct HypothesisConfig {
    /// Significance level. Default: 0.05.
    pub alpha: Option<f64>,
    /// Upper bound on Rosner iterations. Default: max(1, 10% of n).
    pub rosner_max_outliers: Option<usize>,
}

impl HypothesisConfig {
    pub fn effective_alpha(&self) -> f64 {
        self.alpha.unwrap_or(DEFAULT_ALPHA)
    }
}

/// Normality checker settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct NormalityConfig {
    /// Significance level for Shapiro-Wilk / Anderson-Darling. Default: 0.05.
    pub alpha: Option<f64>,
    /// Variables sampled for the dataset verdict. Default: 5.
    pub max_variables: Option<usize>,
    /// Fraction of normal variables needed for a normal dataset. Default: 0.60.
    pub normal_fraction: Option<f64>,
}

impl NormalityConfig {
    pub fn effective_alpha(&self) -> f64 {
        self.alpha.unwrap_or(DEFAULT_ALPHA)
    }

    pub fn effective_max_variables(&self) -> usize {
        self.max_variables.unwrap_or(NORMALITY_SAMPLE_VARIABLES)
    }

    pub fn effective_normal_fraction(&self) -> f64 {
        self.normal_fraction.unwrap_or(NORMAL_FRACTION_THRESHOLD)
    }
}
