//! Configuration system for Verdict.
//! TOML-based, 3-layer resolution: env > config file > compiled defaults.

pub mod detection_config;
pub mod method_config;

pub use detection_config::{CombineStrategy, DetectionConfig};
pub use method_config::{HypothesisConfig, MultivariateConfig, NormalityConfig, UnivariateConfig};
