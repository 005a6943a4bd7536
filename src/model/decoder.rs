//! Decoder: `relu(Dense(H→D))`, mapping the hidden code back to input width.

use crate::layers::{DenseLayer, Layer};
use crate::optimizers::Optimizer;
use crate::utils::activations::relu_backward_inplace;
use crate::utils::{relu_inplace, SimpleRng};

#[derive(Debug, Clone)]
pub struct Decoder {
    layer: DenseLayer,
}

impl Decoder {
    pub fn new(hidden_size: usize, output_size: usize, rng: &mut SimpleRng) -> Self {
        Self {
            layer: DenseLayer::new(hidden_size, output_size, rng),
        }
    }

    pub fn from_layer(layer: DenseLayer) -> Self {
        Self { layer }
    }

    pub fn layer(&self) -> &DenseLayer {
        &self.layer
    }

    pub fn layer_mut(&mut self) -> &mut DenseLayer {
        &mut self.layer
    }

    pub fn output_size(&self) -> usize {
        self.layer.output_size()
    }

    /// Reconstruction for a batch of hidden codes.
    pub fn forward(&self, hidden: &[f32], batch_size: usize) -> Vec<f32> {
        let mut output = vec![0.0f32; batch_size * self.layer.output_size()];
        self.layer.forward(hidden, &mut output, batch_size);
        relu_inplace(&mut output);
        output
    }

    /// Accumulates layer gradients and returns the gradient w.r.t. `hidden`.
    pub fn backward(
        &self,
        hidden: &[f32],
        output: &[f32],
        grad_output: &[f32],
        batch_size: usize,
    ) -> Vec<f32> {
        let mut grad_pre = grad_output.to_vec();
        relu_backward_inplace(output, &mut grad_pre);

        let mut grad_hidden = vec![0.0f32; batch_size * self.layer.input_size()];
        self.layer
            .backward(hidden, &grad_pre, &mut grad_hidden, batch_size);
        grad_hidden
    }

    pub fn zero_grad(&self) {
        self.layer.zero_grad();
    }

    pub fn step(&mut self, optimizer: &mut dyn Optimizer) {
        self.layer.step(optimizer);
    }

    pub fn parameter_count(&self) -> usize {
        self.layer.parameter_count()
    }
}
