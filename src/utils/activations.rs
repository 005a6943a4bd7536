//! Activation functions for the encoder, decoder and classifier
//!
//! This module provides the activations used by the sparse autoencoder:
//! - Sigmoid (attention gate)
//! - ReLU (encoder projection and decoder output)
//! - Softmax (classifier output and divergence normalisation)
//!
//! Each activation comes with the backward helper the training loop needs.

/// Sigmoid activation function.
///
/// Returns the sigmoid of the input: 1 / (1 + exp(-x))
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Sigmoid derivative assuming x = sigmoid(z).
///
/// Returns the derivative: x * (1 - x)
pub fn sigmoid_derivative(x: f32) -> f32 {
    x * (1.0 - x)
}

/// Sigmoid applied in-place.
pub fn sigmoid_inplace(data: &mut [f32]) {
    for value in data.iter_mut() {
        *value = sigmoid(*value);
    }
}

/// ReLU activation function applied in-place.
///
/// Sets all negative values to 0.0, keeps positive values unchanged.
pub fn relu_inplace(data: &mut [f32]) {
    for value in data.iter_mut() {
        if *value < 0.0 {
            *value = 0.0;
        }
    }
}

/// Zero the gradient wherever the ReLU output was not positive.
///
/// `activated` is the post-ReLU output from the forward pass.
pub fn relu_backward_inplace(activated: &[f32], grad: &mut [f32]) {
    assert_eq!(activated.len(), grad.len(), "relu_backward length mismatch");
    for (g, &a) in grad.iter_mut().zip(activated) {
        if a <= 0.0 {
            *g = 0.0;
        }
    }
}

/// Softmax activation function applied row-wise.
///
/// Converts logits to probabilities for each row. Uses the max-subtraction
/// trick for numerical stability to avoid overflow with large values.
///
/// # Arguments
/// * `outputs` - Flat array containing row-major matrix data
/// * `rows` - Number of rows in the matrix
/// * `cols` - Number of columns in the matrix
pub fn softmax_rows(outputs: &mut [f32], rows: usize, cols: usize) {
    if cols == 0 {
        return;
    }
    assert_eq!(outputs.len(), rows * cols, "outputs length mismatch in softmax_rows");

    for row in outputs.chunks_exact_mut(cols).take(rows) {
        let mut max_value = row[0];
        for &value in row.iter().skip(1) {
            if value > max_value {
                max_value = value;
            }
        }

        let mut sum = 0.0f32;
        for value in row.iter_mut() {
            *value = (*value - max_value).exp();
            sum += *value;
        }

        let inv_sum = 1.0f32 / sum;
        for value in row.iter_mut() {
            *value *= inv_sum;
        }
    }
}

/// Backward pass through a row-wise softmax.
///
/// Given the softmax output `probs` and the gradient with respect to it,
/// writes the gradient with respect to the logits:
/// `dz_i = p_i * (g_i - Σ_j g_j p_j)`.
pub fn softmax_backward_rows(
    probs: &[f32],
    grad_probs: &[f32],
    grad_logits: &mut [f32],
    rows: usize,
    cols: usize,
) {
    assert_eq!(probs.len(), rows * cols, "probs length mismatch in softmax_backward_rows");
    assert_eq!(grad_probs.len(), probs.len());
    assert_eq!(grad_logits.len(), probs.len());

    for ((p_row, g_row), out_row) in probs
        .chunks_exact(cols)
        .zip(grad_probs.chunks_exact(cols))
        .zip(grad_logits.chunks_exact_mut(cols))
    {
        let dot: f32 = p_row.iter().zip(g_row).map(|(p, g)| p * g).sum();
        for ((out, &p), &g) in out_row.iter_mut().zip(p_row).zip(g_row) {
            *out = p * (g - dot);
        }
    }
}
