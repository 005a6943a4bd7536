//! Layer trait definition for neural network layers
//!
//! This module defines the core Layer trait implemented by the dense layers of
//! the encoder, decoder and classifier. The trait provides a common interface
//! for forward propagation, gradient accumulation and optimizer steps.

use crate::optimizers::Optimizer;

/// Core trait for neural network layers.
///
/// Gradients are accumulated across any number of `backward` calls (a layer
/// used twice in one batch receives both contributions) until `zero_grad`.
///
/// # Example
///
/// ```ignore
/// layer.zero_grad();
/// layer.forward(&input, &mut output, batch_size);
/// layer.backward(&input, &grad_output, &mut grad_input, batch_size);
/// layer.step(&mut optimizer);
/// ```
pub trait Layer {
    /// Forward propagation through the layer.
    ///
    /// # Arguments
    ///
    /// * `input` - Input data flattened as a 1D array (batch_size × input_size)
    /// * `output` - Output buffer to store results (batch_size × output_size)
    /// * `batch_size` - Number of samples in the batch
    ///
    /// # Panics
    ///
    /// Implementations may panic if input/output dimensions don't match expected sizes.
    fn forward(&self, input: &[f32], output: &mut [f32], batch_size: usize);

    /// Backward propagation through the layer.
    ///
    /// Writes the gradient with respect to the inputs into `grad_input` and adds
    /// the weight and bias gradients to the layer's accumulators.
    ///
    /// # Arguments
    ///
    /// * `input` - Input data from forward pass (batch_size × input_size)
    /// * `grad_output` - Gradient of loss w.r.t. layer output (batch_size × output_size)
    /// * `grad_input` - Buffer to store gradient w.r.t. input (batch_size × input_size)
    /// * `batch_size` - Number of samples in the batch
    fn backward(
        &self,
        input: &[f32],
        grad_output: &[f32],
        grad_input: &mut [f32],
        batch_size: usize,
    );

    /// Reset the accumulated gradients to zero.
    fn zero_grad(&self);

    /// Apply the accumulated gradients with `optimizer`.
    ///
    /// Gradients are left in place; call `zero_grad` before the next batch.
    fn step(&mut self, optimizer: &mut dyn Optimizer);

    /// Get the input size of the layer.
    fn input_size(&self) -> usize;

    /// Get the output size of the layer.
    fn output_size(&self) -> usize;

    /// Get the number of trainable parameters in the layer.
    fn parameter_count(&self) -> usize;
}
