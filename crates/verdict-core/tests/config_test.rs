//! Tests for configuration loading: TOML files, env overrides, validation.

use std::io::Write;
use std::sync::Mutex;

use verdict_core::config::{CombineStrategy, DetectionConfig};
use verdict_core::errors::{ConfigError, VerdictErrorCode};

/// Serializes tests that touch `VERDICT_*` env vars.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_partial_toml_keeps_defaults() {
    let cfg = DetectionConfig::from_toml(
        r#"
strategy = "adaptive"

[multivariate]
contamination = 0.08
"#,
    )
    .unwrap();
    assert_eq!(cfg.strategy, CombineStrategy::Adaptive);
    assert_eq!(cfg.multivariate.effective_contamination(), 0.08);
    assert_eq!(cfg.min_univariate, 2);
    assert_eq!(cfg.univariate.effective_zscore_threshold(), 3.0);
    assert_eq!(cfg.multivariate.effective_random_seed(), 42);
}

#[test]
fn test_load_from_file_then_env() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let file = write_config(
        r#"
strategy = "union"
subject_id_column = "patient"

[hypothesis]
alpha = 0.01
rosner_max_outliers = 4
"#,
    );

    std::env::set_var("VERDICT_STRATEGY", "intersection");
    let cfg = DetectionConfig::load(Some(file.path()));
    std::env::remove_var("VERDICT_STRATEGY");

    let cfg = cfg.unwrap();
    assert_eq!(cfg.strategy, CombineStrategy::Intersection);
    assert_eq!(cfg.subject_id_column.as_deref(), Some("patient"));
    assert_eq!(cfg.hypothesis.effective_alpha(), 0.01);
    assert_eq!(cfg.hypothesis.rosner_max_outliers, Some(4));
}

#[test]
fn test_missing_file() {
    let err = DetectionConfig::from_file(std::path::Path::new("/definitely/not/here/verdict.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound { .. }));
    assert_eq!(err.error_code(), "CONFIG_ERROR");
}

#[test]
fn test_unreadable_file_is_a_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&[0xff, 0xfe, 0x00, 0x80]).unwrap();
    let err = DetectionConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }), "got {err:?}");
}

#[test]
fn test_zero_vote_thresholds_from_env_are_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap();
    std::env::set_var("VERDICT_MIN_MULTIVARIATE", "0");
    let result = DetectionConfig::load(None);
    std::env::remove_var("VERDICT_MIN_MULTIVARIATE");

    let err = result.unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { ref field, .. } if field == "min_multivariate"));
}

#[test]
fn test_malformed_toml() {
    let file = write_config("strategy = [");
    let err = DetectionConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn test_unknown_strategy_in_toml() {
    let err = DetectionConfig::from_toml(r#"strategy = "majority""#).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn test_validation_rejects_bad_values() {
    let cases = [
        "[hypothesis]\nalpha = 0.0",
        "[hypothesis]\nalpha = 1.0",
        "[normality]\nalpha = -0.1",
        "[multivariate]\ncontamination = 0.0",
        "[multivariate]\ncontamination = 0.6",
        "[univariate]\nzscore_threshold = 0.0",
        "[univariate]\niqr_factor = -1.5",
        "[multivariate]\nn_neighbors = 0",
        "[hypothesis]\nrosner_max_outliers = 0",
        "[normality]\nnormal_fraction = 1.2",
        "min_univariate = 0",
        "min_multivariate = 0",
    ];
    for case in cases {
        let err = DetectionConfig::from_toml(case).unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationFailed { .. }),
            "expected validation failure for {case:?}, got {err:?}"
        );
    }
}

#[test]
fn test_contamination_above_cap_is_valid_but_capped() {
    let cfg = DetectionConfig::from_toml("[multivariate]\ncontamination = 0.4").unwrap();
    assert_eq!(cfg.multivariate.effective_contamination(), 0.10);
}

#[test]
fn test_env_blank_subject_column_clears_it() {
    let mut cfg = DetectionConfig::default();
    cfg.subject_id_column = Some("id".into());
    cfg.apply_overrides(|k| (k == "VERDICT_SUBJECT_ID_COLUMN").then(|| "  ".to_string()))
        .unwrap();
    assert_eq!(cfg.subject_id_column, None);
}

#[test]
fn test_config_round_trips_through_toml() {
    let mut cfg = DetectionConfig::with_strategy(CombineStrategy::Adaptive);
    cfg.multivariate.random_seed = Some(7);
    let text = toml::to_string(&cfg).unwrap();
    assert_eq!(DetectionConfig::from_toml(&text).unwrap(), cfg);
}
