//! Configuration structures for the experiment
//!
//! This module provides the experiment configuration: layer sizes, training
//! hyperparameters, loss weights and the dataset location. Every field has a
//! default, so an empty JSON object reproduces the standard ionosphere run.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Configuration for one training run of the sparse-attention autoencoder.
///
/// Fields missing from the JSON file fall back to the defaults below, which are
/// the constants of the ionosphere experiment.
///
/// # Example
///
/// ```json
/// {
///   "data_path": "./data/ionosphere.txt",
///   "epochs": 500,
///   "threshold": 0.1,
///   "seed": 1
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Path to the comma-separated dataset file
    pub data_path: String,

    /// Number of features per sample (D)
    pub input_size: usize,

    /// Width of the hidden code (H)
    pub hidden_size: usize,

    /// Number of classifier outputs (C)
    pub num_classes: usize,

    /// Samples per batch
    pub batch_size: usize,

    /// Number of train + evaluate passes
    pub epochs: usize,

    /// SGD step size, shared by both optimizers
    pub learning_rate: f32,

    /// Target mean activation ρ for every hidden unit
    pub sparsity_target: f32,

    /// Gate values strictly above this become 1.0, the rest 0.0
    pub threshold: f32,

    /// Number of samples drawn for the training split
    pub train_size: usize,

    /// Print a progress line every `log_interval` training batches
    pub log_interval: usize,

    /// Weight of the sparsity divergence term
    pub sparsity_weight: f32,

    /// Weight of the attention magnitude term
    pub attention_weight: f32,

    /// RNG seed; `None` seeds from the clock
    pub seed: Option<u64>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            data_path: "./data/ionosphere.txt".to_string(),
            input_size: 34,
            hidden_size: 30,
            num_classes: 2,
            batch_size: 5,
            epochs: 2000,
            learning_rate: 0.01,
            sparsity_target: 0.5,
            threshold: 0.1,
            train_size: 280,
            log_interval: 10,
            sparsity_weight: 5.0,
            attention_weight: 0.001,
            seed: None,
        }
    }
}

/// Loads an experiment configuration from a JSON file.
///
/// Reads the file at `path`, deserializes its JSON contents into an
/// `ExperimentConfig` and validates the result.
///
/// # Examples
///
/// ```no_run
/// use sparse_attention_ae::config::load_config;
///
/// let cfg = load_config("config/ionosphere.json").unwrap();
/// assert_eq!(cfg.input_size, 34);
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<ExperimentConfig> {
    let contents = fs::read_to_string(path)?;
    let config: ExperimentConfig = serde_json::from_str(&contents)?;
    validate_config(&config)?;
    Ok(config)
}

/// Resolve the configuration from command-line arguments.
///
/// `args[1]`, when present, is the path of a JSON config file; otherwise the
/// defaults are used.
pub fn config_from_args(args: &[String]) -> Result<ExperimentConfig> {
    match args.get(1) {
        Some(path) => load_config(path),
        None => {
            let config = ExperimentConfig::default();
            validate_config(&config)?;
            Ok(config)
        }
    }
}

/// Check that every field is inside its usable range.
pub fn validate_config(config: &ExperimentConfig) -> Result<()> {
    let sizes = [
        ("input_size", config.input_size),
        ("hidden_size", config.hidden_size),
        ("batch_size", config.batch_size),
        ("epochs", config.epochs),
        ("train_size", config.train_size),
        ("log_interval", config.log_interval),
    ];
    for (name, value) in sizes {
        if value == 0 {
            return Err(Error::invalid_config(format!("{name} must be positive")));
        }
    }

    if config.num_classes < 2 {
        return Err(Error::invalid_config("num_classes must be at least 2"));
    }

    if !config.learning_rate.is_finite() || config.learning_rate <= 0.0 {
        return Err(Error::invalid_config("learning_rate must be positive"));
    }

    if !(0.0..=1.0).contains(&config.threshold) {
        return Err(Error::invalid_config(format!(
            "threshold {} must lie in [0, 1]",
            config.threshold
        )));
    }

    // ρ feeds ln(ρ) and ln(1 - ρ) in the divergence.
    if !(config.sparsity_target > 0.0 && config.sparsity_target < 1.0) {
        return Err(Error::invalid_config(format!(
            "sparsity_target {} must lie in (0, 1)",
            config.sparsity_target
        )));
    }

    if config.sparsity_weight < 0.0 || config.attention_weight < 0.0 {
        return Err(Error::invalid_config("loss weights must be non-negative"));
    }

    Ok(())
}
