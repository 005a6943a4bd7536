//! Tests for configuration loading and validation
//!
//! This file tests the config module including:
//! - Loading the shipped config files
//! - Partial JSON files falling back to defaults
//! - Rejecting out-of-range values
//! - Handling invalid JSON and missing files

use sparse_attention_ae::config::{config_from_args, load_config, validate_config, ExperimentConfig};
use sparse_attention_ae::Error;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create temp config");
    file.write_all(json.as_bytes())
        .expect("failed to write temp config");
    file
}

// ============================================================================
// Valid Config Loading Tests
// ============================================================================

mod valid_config_tests {
    use super::*;

    #[test]
    fn test_load_full_ionosphere_config() {
        let config = load_config("config/ionosphere.json").expect("Failed to load ionosphere config");
        assert_eq!(config, ExperimentConfig::default());
    }

    #[test]
    fn test_load_seeded_short_config() {
        let config = load_config("config/ionosphere_seeded_short.json").unwrap();
        assert_eq!(config.epochs, 200);
        assert_eq!(config.seed, Some(1));
        assert_eq!(config.hidden_size, 30);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let file = write_config(r#"{ "threshold": 0.25, "learning_rate": 0.05 }"#);
        let config = load_config(file.path()).unwrap();

        assert!((config.threshold - 0.25).abs() < 1e-6);
        assert!((config.learning_rate - 0.05).abs() < 1e-6);
        assert_eq!(config.batch_size, 5);
        assert_eq!(config.train_size, 280);
    }

    #[test]
    fn test_config_from_args_with_path() {
        let file = write_config(r#"{ "epochs": 3 }"#);
        let args = vec![
            "ionosphere_sparse_ae".to_string(),
            file.path().to_string_lossy().into_owned(),
        ];
        let config = config_from_args(&args).unwrap();
        assert_eq!(config.epochs, 3);
    }
}

// ============================================================================
// Invalid Config Tests
// ============================================================================

mod invalid_config_tests {
    use super::*;

    fn assert_rejected(config: ExperimentConfig) {
        assert!(
            matches!(validate_config(&config), Err(Error::InvalidConfig { .. })),
            "accepted {:?}",
            config
        );
    }

    #[test]
    fn test_zero_sizes_rejected() {
        let base = ExperimentConfig::default();
        assert_rejected(ExperimentConfig { batch_size: 0, ..base.clone() });
        assert_rejected(ExperimentConfig { hidden_size: 0, ..base.clone() });
        assert_rejected(ExperimentConfig { epochs: 0, ..base.clone() });
        assert_rejected(ExperimentConfig { log_interval: 0, ..base });
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let base = ExperimentConfig::default();
        assert_rejected(ExperimentConfig { num_classes: 1, ..base.clone() });
        assert_rejected(ExperimentConfig { learning_rate: 0.0, ..base.clone() });
        assert_rejected(ExperimentConfig { learning_rate: f32::NAN, ..base.clone() });
        assert_rejected(ExperimentConfig { threshold: -0.1, ..base.clone() });
        assert_rejected(ExperimentConfig { sparsity_target: 1.0, ..base.clone() });
        assert_rejected(ExperimentConfig { sparsity_target: 0.0, ..base.clone() });
        assert_rejected(ExperimentConfig { attention_weight: -1.0, ..base });
    }

    #[test]
    fn test_invalid_values_rejected_on_load() {
        let file = write_config(r#"{ "batch_size": 0 }"#);
        assert!(matches!(load_config(file.path()), Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn test_invalid_json() {
        let file = write_config("{ \"epochs\": ");
        assert!(matches!(load_config(file.path()), Err(Error::Json(_))));
    }

    #[test]
    fn test_wrong_field_type() {
        let file = write_config(r#"{ "epochs": "many" }"#);
        assert!(matches!(load_config(file.path()), Err(Error::Json(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = load_config("config/does_not_exist.json");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
