//! Top-level detection configuration with 3-layer resolution.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{HypothesisConfig, MultivariateConfig, NormalityConfig, UnivariateConfig};
use crate::constants::{DEFAULT_MIN_MULTIVARIATE, DEFAULT_MIN_UNIVARIATE};
use crate::errors::ConfigError;

/// How per-method verdicts are reconciled into the final outlier set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombineStrategy {
    /// Hypothesis flags, or enough multivariate votes, or enough univariate score.
    #[default]
    Voting,
    /// Criteria chosen by whether the data looks generally normal.
    Adaptive,
    /// Anything flagged by any method.
    Union,
    /// Hypothesis flags, or univariate and multivariate agreement.
    Intersection,
}

impl CombineStrategy {
    pub const ALL: [CombineStrategy; 4] = [Self::Voting, Self::Adaptive, Self::Union, Self::Intersection];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Voting => "voting",
            Self::Adaptive => "adaptive",
            Self::Union => "union",
            Self::Intersection => "intersection",
        }
    }
}

impl fmt::Display for CombineStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CombineStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "voting" => Ok(Self::Voting),
            "adaptive" => Ok(Self::Adaptive),
            "union" => Ok(Self::Union),
            "intersection" => Ok(Self::Intersection),
            other => Err(ConfigError::InvalidValue {
                field: "strategy".to_string(),
                message: format!("unknown combination strategy '{other}'"),
            }),
        }
    }
}

/// Configuration for one detection run.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`VERDICT_*`)
/// 2. Config file (`verdict.toml`)
/// 3. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectionConfig {
    pub strategy: CombineStrategy,
    /// Column whose values name observations in detailed reports.
    pub subject_id_column: Option<String>,
    /// Minimum univariate score under the voting policy. Default: 2.
    pub min_univariate: usize,
    /// Minimum multivariate votes under the voting policy. Default: 1.
    pub min_multivariate: usize,
    pub univariate: UnivariateConfig,
    pub multivariate: MultivariateConfig,
    pub hypothesis: HypothesisConfig,
    pub normality: NormalityConfig,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            strategy: CombineStrategy::default(),
            subject_id_column: None,
            min_univariate: DEFAULT_MIN_UNIVARIATE,
            min_multivariate: DEFAULT_MIN_MULTIVARIATE,
            univariate: UnivariateConfig::default(),
            multivariate: MultivariateConfig::default(),
            hypothesis: HypothesisConfig::default(),
            normality: NormalityConfig::default(),
        }
    }
}

impl DetectionConfig {
    /// Default configuration with the given strategy.
    pub fn with_strategy(strategy: CombineStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    /// Load configuration: defaults, then `path` if given, then `VERDICT_*` env vars.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file without applying env overrides.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            },
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Load configuration from a TOML string and validate it.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `VERDICT_*` environment variables on top of the current values.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("VERDICT_STRATEGY") {
            self.strategy = val.parse()?;
        }
        if let Some(val) = lookup("VERDICT_SUBJECT_ID_COLUMN") {
            self.subject_id_column = (!val.trim().is_empty()).then(|| val.trim().to_string());
        }
        if let Some(val) = lookup("VERDICT_MIN_UNIVARIATE") {
            self.min_univariate = parse_field("min_univariate", &val)?;
        }
        if let Some(val) = lookup("VERDICT_MIN_MULTIVARIATE") {
            self.min_multivariate = parse_field("min_multivariate", &val)?;
        }
        if let Some(val) = lookup("VERDICT_ALPHA") {
            self.hypothesis.alpha = Some(parse_field("hypothesis.alpha", &val)?);
        }
        Ok(())
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, alpha) in [
            ("hypothesis.alpha", self.hypothesis.alpha),
            ("normality.alpha", self.normality.alpha),
        ] {
            if let Some(alpha) = alpha {
                if !(alpha > 0.0 && alpha < 1.0) {
                    return Err(invalid(field, "must be between 0.0 and 1.0 (exclusive)"));
                }
            }
        }
        if let Some(c) = self.multivariate.contamination {
            if !(c > 0.0 && c <= 0.5) {
                return Err(invalid("multivariate.contamination", "must be in (0.0, 0.5]"));
            }
        }
        for (field, threshold) in [
            ("univariate.zscore_threshold", self.univariate.zscore_threshold),
            ("univariate.mad_threshold", self.univariate.mad_threshold),
            ("univariate.iqr_factor", self.univariate.iqr_factor),
            ("multivariate.mahalanobis_threshold", self.multivariate.mahalanobis_threshold),
        ] {
            if let Some(t) = threshold {
                if !(t.is_finite() && t > 0.0) {
                    return Err(invalid(field, "must be a positive number"));
                }
            }
        }
        if self.min_univariate == 0 {
            return Err(invalid("min_univariate", "must be greater than 0"));
        }
        if self.min_multivariate == 0 {
            return Err(invalid("min_multivariate", "must be greater than 0"));
        }
        if self.multivariate.n_neighbors == Some(0) {
            return Err(invalid("multivariate.n_neighbors", "must be greater than 0"));
        }
        if self.hypothesis.rosner_max_outliers == Some(0) {
            return Err(invalid("hypothesis.rosner_max_outliers", "must be greater than 0"));
        }
        if let Some(f) = self.normality.normal_fraction {
            if !(0.0..=1.0).contains(&f) {
                return Err(invalid("normality.normal_fraction", "must be between 0.0 and 1.0"));
            }
        }
        if self.normality.max_variables == Some(0) {
            return Err(invalid("normality.max_variables", "must be greater than 0"));
        }
        if let Some(col) = &self.subject_id_column {
            if col.trim().is_empty() {
                return Err(invalid("subject_id_column", "must not be empty"));
            }
        }
        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn parse_field<T: FromStr>(field: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        field: field.to_string(),
        message: format!("cannot parse '{raw}'"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = DetectionConfig::default();
        assert_eq!(cfg.strategy, CombineStrategy::Voting);
        assert_eq!(cfg.min_univariate, 2);
        assert_eq!(cfg.min_multivariate, 1);
        assert_eq!(cfg.hypothesis.effective_alpha(), 0.05);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn strategy_parses_case_insensitively() {
        assert_eq!("Adaptive".parse::<CombineStrategy>().unwrap(), CombineStrategy::Adaptive);
        assert!("majority".parse::<CombineStrategy>().is_err());
    }

    #[test]
    fn overrides_apply_from_lookup() {
        let mut cfg = DetectionConfig::default();
        cfg.apply_overrides(|k| match k {
            "VERDICT_STRATEGY" => Some("union".into()),
            "VERDICT_MIN_UNIVARIATE" => Some("3".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(cfg.strategy, CombineStrategy::Union);
        assert_eq!(cfg.min_univariate, 3);
    }

    #[test]
    fn bad_override_is_rejected() {
        let mut cfg = DetectionConfig::default();
        let err = cfg
            .apply_overrides(|k| (k == "VERDICT_MIN_MULTIVARIATE").then(|| "many".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
