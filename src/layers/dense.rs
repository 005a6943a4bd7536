//! Dense (fully connected) layer implementation
//!
//! This module provides a DenseLayer (also known as Linear or Fully Connected layer)
//! that performs the transformation: output = input × weights + biases

use crate::layers::Layer;
use crate::optimizers::Optimizer;
use crate::utils::linalg::{add_bias, sgemm_wrapper};
use crate::utils::SimpleRng;
use std::cell::{Ref, RefCell};

/// Dense (fully connected) layer with weights and biases.
///
/// Performs the linear transformation: y = xW + b
/// where x is the input (batch_size × input_size),
/// W is the weight matrix (input_size × output_size),
/// and b is the bias vector (output_size).
///
/// # Fields
///
/// * `input_size` - Number of input features
/// * `output_size` - Number of output features
/// * `weights` - Weight matrix stored in row-major format (input_size × output_size)
/// * `biases` - Bias vector (output_size)
/// * `grad_weights` / `grad_biases` - Gradient accumulators, filled by `backward`
///
/// # Example
///
/// ```
/// use sparse_attention_ae::layers::{DenseLayer, Layer};
/// use sparse_attention_ae::utils::SimpleRng;
///
/// let mut rng = SimpleRng::new(42);
/// let layer = DenseLayer::new(34, 30, &mut rng);
/// assert_eq!(layer.input_size(), 34);
/// assert_eq!(layer.output_size(), 30);
/// ```
#[derive(Debug, Clone)]
pub struct DenseLayer {
    input_size: usize,
    output_size: usize,
    weights: Vec<f32>,
    biases: Vec<f32>,
    // Gradient accumulators (mutable interior via RefCell for trait compatibility)
    grad_weights: RefCell<Vec<f32>>,
    grad_biases: RefCell<Vec<f32>>,
}

impl DenseLayer {
    /// Create a new DenseLayer with Xavier initialization.
    ///
    /// Weights are initialized using Xavier/Glorot initialization:
    /// randomly sampled from uniform distribution [-limit, limit]
    /// where limit = sqrt(6 / (input_size + output_size)).
    ///
    /// Biases are initialized to zero.
    pub fn new(input_size: usize, output_size: usize, rng: &mut SimpleRng) -> Self {
        // Xavier initialization: limit = sqrt(6 / (fan_in + fan_out))
        let mut weights = vec![0.0f32; input_size * output_size];
        let limit = (6.0f32 / (input_size + output_size) as f32).sqrt();

        for value in &mut weights {
            *value = rng.gen_range_f32(-limit, limit);
        }

        Self::from_parameters(input_size, output_size, weights, vec![0.0f32; output_size])
    }

    /// Create a layer with explicit parameters.
    ///
    /// # Panics
    ///
    /// Panics if `weights` is not `input_size × output_size` or `biases` is not
    /// `output_size` long.
    pub fn from_parameters(
        input_size: usize,
        output_size: usize,
        weights: Vec<f32>,
        biases: Vec<f32>,
    ) -> Self {
        assert_eq!(weights.len(), input_size * output_size, "weights shape mismatch");
        assert_eq!(biases.len(), output_size, "biases shape mismatch");
        Self {
            input_size,
            output_size,
            weights,
            biases,
            grad_weights: RefCell::new(vec![0.0f32; input_size * output_size]),
            grad_biases: RefCell::new(vec![0.0f32; output_size]),
        }
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn weights_mut(&mut self) -> &mut [f32] {
        &mut self.weights
    }

    pub fn biases(&self) -> &[f32] {
        &self.biases
    }

    pub fn biases_mut(&mut self) -> &mut [f32] {
        &mut self.biases
    }

    /// Add `Xᵀ · dY` and the column sums of `dY` to the accumulators without
    /// computing the input gradient.
    pub fn accumulate_gradients(&self, input: &[f32], grad_output: &[f32], batch_size: usize) {
        let mut grad_weights = self.grad_weights.borrow_mut();
        sgemm_wrapper(
            self.input_size,
            self.output_size,
            batch_size,
            input,
            self.input_size,
            grad_output,
            self.output_size,
            &mut grad_weights,
            self.output_size,
            true,
            false,
            1.0,
            1.0,
        );

        let mut grad_biases = self.grad_biases.borrow_mut();
        for row in grad_output.chunks_exact(self.output_size).take(batch_size) {
            for (acc, &g) in grad_biases.iter_mut().zip(row) {
                *acc += g;
            }
        }
    }

    /// Accumulated weight gradient since the last `zero_grad`.
    pub fn weight_gradients(&self) -> Ref<'_, Vec<f32>> {
        self.grad_weights.borrow()
    }

    /// Accumulated bias gradient since the last `zero_grad`.
    pub fn bias_gradients(&self) -> Ref<'_, Vec<f32>> {
        self.grad_biases.borrow()
    }
}

impl Layer for DenseLayer {
    fn forward(&self, input: &[f32], output: &mut [f32], batch_size: usize) {
        let out_len = batch_size * self.output_size;
        sgemm_wrapper(
            batch_size,
            self.output_size,
            self.input_size,
            input,
            self.input_size,
            &self.weights,
            self.output_size,
            output,
            self.output_size,
            false,
            false,
            1.0,
            0.0,
        );
        add_bias(&mut output[..out_len], batch_size, self.output_size, &self.biases);
    }

    fn backward(
        &self,
        input: &[f32],
        grad_output: &[f32],
        grad_input: &mut [f32],
        batch_size: usize,
    ) {
        // dX = dY · Wᵀ
        sgemm_wrapper(
            batch_size,
            self.input_size,
            self.output_size,
            grad_output,
            self.output_size,
            &self.weights,
            self.output_size,
            grad_input,
            self.input_size,
            false,
            true,
            1.0,
            0.0,
        );

        self.accumulate_gradients(input, grad_output, batch_size);
    }

    fn zero_grad(&self) {
        self.grad_weights.borrow_mut().fill(0.0);
        self.grad_biases.borrow_mut().fill(0.0);
    }

    fn step(&mut self, optimizer: &mut dyn Optimizer) {
        optimizer.update(&mut self.weights, &self.grad_weights.borrow());
        optimizer.update(&mut self.biases, &self.grad_biases.borrow());
    }

    fn input_size(&self) -> usize {
        self.input_size
    }

    fn output_size(&self) -> usize {
        self.output_size
    }

    /// Returns input_size × output_size (weights) + output_size (biases).
    fn parameter_count(&self) -> usize {
        self.weights.len() + self.biases.len()
    }
}
