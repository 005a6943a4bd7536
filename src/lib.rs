//! Sparse-attention autoencoder with a jointly trained classifier
//!
//! An attention gate selects which input features (radar sensors) reach the
//! encoder. The autoencoder is trained for reconstruction with a sparsity
//! penalty on its code, while a classifier is trained on the attention-weighted
//! code in the same loop.
//!
//! # Modules
//!
//! - `data`: Dataset parsing, train/test split and batching
//! - `layers`: Layer trait and the dense layer
//! - `model`: Encoder, decoder, autoencoder and classifier
//! - `loss`: Loss terms and their gradients
//! - `optimizers`: Optimizer trait and SGD
//! - `training`: Joint training/evaluation driver and best-epoch report
//! - `utils`: RNG, activation functions and matrix helpers
//! - `config`: Experiment configuration
//! - `error`: Crate error type

pub mod config;
pub mod data;
pub mod error;
pub mod layers;
pub mod loss;
pub mod model;
pub mod optimizers;
pub mod training;
pub mod utils;

pub use error::{Error, Result};
