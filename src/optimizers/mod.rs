//! Optimizer abstractions for parameter updates
//!
//! The experiment trains two disjoint parameter groups, the autoencoder and the
//! classifier, each with its own optimizer instance. Layers hand their
//! parameter and gradient buffers to the optimizer in `Layer::step`.
//!
//! # Available Optimizers
//!
//! - SGD: Vanilla stochastic gradient descent
//!
//! # Example
//!
//! ```
//! use sparse_attention_ae::optimizers::{Optimizer, SGD};
//!
//! let mut autoencoder_opt = SGD::new(0.01);
//! let mut classifier_opt = SGD::new(0.01);
//!
//! let mut weights = vec![1.0, 2.0];
//! autoencoder_opt.update(&mut weights, &[1.0, 1.0]);
//! assert_eq!(classifier_opt.updates_applied(), 0);
//! ```

pub mod sgd;

pub use sgd::SGD;

/// Core trait for optimizers.
///
/// Optimizers work with flat `f32` buffers: one call updates one parameter
/// tensor (a weight matrix or a bias vector) from its gradient.
pub trait Optimizer {
    /// Update parameters in-place using gradients.
    ///
    /// # Panics
    ///
    /// Implementations may panic if parameters and gradients have different lengths.
    fn update(&mut self, parameters: &mut [f32], gradients: &[f32]);

    /// Get the learning rate for this optimizer.
    fn learning_rate(&self) -> f32;

    /// Number of parameter tensors updated so far.
    fn updates_applied(&self) -> usize;
}
