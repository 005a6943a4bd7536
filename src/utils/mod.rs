//! Shared utilities for the sparse autoencoder
//!
//! This module provides common utilities like random number generation,
//! activation functions and the flat-buffer matrix helpers used by the layers.

pub mod activations;
pub mod linalg;
pub mod rng;

pub use activations::{relu_inplace, sigmoid, softmax_rows};
pub use rng::SimpleRng;
