//! Attention-gated encoder
//!
//! `attention = sigmoid(gate(x))` scores every input feature. Scores strictly
//! above the threshold keep their feature, the rest are zeroed, and the gated
//! input is projected to the hidden code with `relu(projection(x ⊙ mask))`.
//!
//! The binary mask has no gradient, so `backward_projection` stops at the gated
//! input. The gate is trained only where the raw attention values are used
//! downstream, through `backward_attention`.

use crate::layers::{DenseLayer, Layer};
use crate::optimizers::Optimizer;
use crate::utils::activations::{relu_backward_inplace, sigmoid_derivative, sigmoid_inplace};
use crate::utils::linalg::hadamard;
use crate::utils::{relu_inplace, SimpleRng};

/// Intermediate values of one encoder forward pass.
#[derive(Debug, Clone)]
pub struct EncoderPass {
    pub batch_size: usize,
    /// Gate scores in (0, 1), `batch × input`
    pub attention: Vec<f32>,
    /// Thresholded attention, entries in {0.0, 1.0}
    pub mask: Vec<f32>,
    /// `input ⊙ mask`
    pub gated: Vec<f32>,
    /// Post-ReLU code, `batch × hidden`
    pub hidden: Vec<f32>,
}

/// Gate (D→D) and projection (D→H) of the autoencoder.
#[derive(Debug, Clone)]
pub struct Encoder {
    gate: DenseLayer,
    projection: DenseLayer,
}

impl Encoder {
    pub fn new(input_size: usize, hidden_size: usize, rng: &mut SimpleRng) -> Self {
        Self {
            gate: DenseLayer::new(input_size, input_size, rng),
            projection: DenseLayer::new(input_size, hidden_size, rng),
        }
    }

    pub fn from_layers(gate: DenseLayer, projection: DenseLayer) -> Self {
        assert_eq!(gate.input_size(), gate.output_size(), "gate must be square");
        assert_eq!(
            gate.output_size(),
            projection.input_size(),
            "gate and projection widths differ"
        );
        Self { gate, projection }
    }

    pub fn input_size(&self) -> usize {
        self.gate.input_size()
    }

    pub fn hidden_size(&self) -> usize {
        self.projection.output_size()
    }

    pub fn gate(&self) -> &DenseLayer {
        &self.gate
    }

    pub fn gate_mut(&mut self) -> &mut DenseLayer {
        &mut self.gate
    }

    pub fn projection(&self) -> &DenseLayer {
        &self.projection
    }

    pub fn projection_mut(&mut self) -> &mut DenseLayer {
        &mut self.projection
    }

    /// Gate scores `sigmoid(gate(input))` for a batch.
    pub fn attention(&self, input: &[f32], batch_size: usize) -> Vec<f32> {
        let mut attention = vec![0.0f32; batch_size * self.input_size()];
        self.gate.forward(input, &mut attention, batch_size);
        sigmoid_inplace(&mut attention);
        attention
    }

    /// Full encoder pass with every intermediate kept for the backward pass.
    pub fn forward(&self, input: &[f32], batch_size: usize, threshold: f32) -> EncoderPass {
        let attention = self.attention(input, batch_size);
        let mask = threshold_mask(&attention, threshold);

        let mut gated = vec![0.0f32; mask.len()];
        hadamard(&input[..mask.len()], &mask, &mut gated);

        let mut hidden = vec![0.0f32; batch_size * self.hidden_size()];
        self.projection.forward(&gated, &mut hidden, batch_size);
        relu_inplace(&mut hidden);

        EncoderPass {
            batch_size,
            attention,
            mask,
            gated,
            hidden,
        }
    }

    /// Backpropagate `grad_hidden` through the ReLU and the projection.
    ///
    /// Accumulates projection gradients and returns the gradient with respect
    /// to the encoder input. The mask is treated as a constant, so the gate
    /// receives nothing here.
    pub fn backward_projection(&self, pass: &EncoderPass, grad_hidden: &[f32]) -> Vec<f32> {
        let grad_pre = relu_grad(&pass.hidden, grad_hidden);

        let mut grad_gated = vec![0.0f32; pass.gated.len()];
        self.projection
            .backward(&pass.gated, &grad_pre, &mut grad_gated, pass.batch_size);

        let mut grad_input = vec![0.0f32; grad_gated.len()];
        hadamard(&grad_gated, &pass.mask, &mut grad_input);
        grad_input
    }

    /// Like `backward_projection` when the input gradient is not needed:
    /// only the projection accumulators are updated.
    pub fn accumulate_projection(&self, pass: &EncoderPass, grad_hidden: &[f32]) {
        let grad_pre = relu_grad(&pass.hidden, grad_hidden);
        self.projection
            .accumulate_gradients(&pass.gated, &grad_pre, pass.batch_size);
    }

    /// Backpropagate a gradient on the attention values into the gate layer.
    pub fn backward_attention(
        &self,
        input: &[f32],
        attention: &[f32],
        grad_attention: &[f32],
        batch_size: usize,
    ) {
        let grad_scores: Vec<f32> = grad_attention
            .iter()
            .zip(attention)
            .map(|(&g, &a)| g * sigmoid_derivative(a))
            .collect();
        self.gate
            .accumulate_gradients(input, &grad_scores, batch_size);
    }

    pub fn zero_grad(&self) {
        self.gate.zero_grad();
        self.projection.zero_grad();
    }

    pub fn step(&mut self, optimizer: &mut dyn Optimizer) {
        self.gate.step(optimizer);
        self.projection.step(optimizer);
    }

    pub fn parameter_count(&self) -> usize {
        self.gate.parameter_count() + self.projection.parameter_count()
    }
}

fn relu_grad(activated: &[f32], grad: &[f32]) -> Vec<f32> {
    let mut grad_pre = grad.to_vec();
    relu_backward_inplace(activated, &mut grad_pre);
    grad_pre
}

/// 1.0 where `value > threshold`, 0.0 otherwise.
pub fn threshold_mask(attention: &[f32], threshold: f32) -> Vec<f32> {
    attention
        .iter()
        .map(|&a| if a > threshold { 1.0 } else { 0.0 })
        .collect()
}

/// Mean number of features per sample whose attention exceeds the threshold.
pub fn active_sensors(attention: &[f32], batch_size: usize, threshold: f32) -> f32 {
    if batch_size == 0 {
        return 0.0;
    }
    let active = attention.iter().filter(|&&a| a > threshold).count();
    active as f32 / batch_size as f32
}

/// Fraction of gate entries above the threshold, in [0, 1].
pub fn active_sensor_fraction(attention: &[f32], threshold: f32) -> f32 {
    if attention.is_empty() {
        return 0.0;
    }
    let active = attention.iter().filter(|&&a| a > threshold).count();
    active as f32 / attention.len() as f32
}
