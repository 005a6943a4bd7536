//! Loss terms and their gradients
//!
//! Two scalars are computed per batch:
//!
//! 1. Classification loss: negative log-likelihood taken directly on the
//!    classifier's softmax probabilities, `-mean_b P[b, y_b]`. NLL normally
//!    expects log-probabilities; here it is applied to probabilities, so this
//!    loss lies in `[-1, 0]`.
//! 2. Reconstruction loss:
//!    `mse(recon, x) + w_s · KL(softmax(ρ), softmax(ρ̂)) + w_a · Σ attention / (batch_size · D)`.
//!
//! Every term has a matching `*_grad` function used by the manual backward pass.

use crate::utils::softmax_rows;

/// Mean squared error over every element.
pub fn mse(output: &[f32], target: &[f32]) -> f32 {
    if output.is_empty() {
        return 0.0;
    }
    sse(output, target) / output.len() as f32
}

/// Sum of squared errors.
pub fn sse(output: &[f32], target: &[f32]) -> f32 {
    assert_eq!(output.len(), target.len(), "mse length mismatch");
    output
        .iter()
        .zip(target)
        .map(|(o, t)| (o - t) * (o - t))
        .sum()
}

/// Gradient of `mse` with respect to `output`: `2 (o - t) / n`.
pub fn mse_grad(output: &[f32], target: &[f32], grad: &mut [f32]) {
    assert_eq!(output.len(), target.len(), "mse length mismatch");
    let scale = 2.0 / output.len() as f32;
    for ((g, &o), &t) in grad.iter_mut().zip(output).zip(target) {
        *g = scale * (o - t);
    }
}

/// Summed NLL over the batch: `-Σ_b P[b, y_b]`.
pub fn nll_sum(probs: &[f32], labels: &[usize], num_classes: usize) -> f32 {
    labels
        .iter()
        .enumerate()
        .map(|(row, &label)| -probs[row * num_classes + label])
        .sum()
}

/// Mean NLL over the batch.
pub fn nll(probs: &[f32], labels: &[usize], num_classes: usize) -> f32 {
    if labels.is_empty() {
        return 0.0;
    }
    nll_sum(probs, labels, num_classes) / labels.len() as f32
}

/// Gradient of `nll` with respect to the probabilities.
pub fn nll_grad(labels: &[usize], num_classes: usize, grad: &mut [f32]) {
    grad.fill(0.0);
    let scale = 1.0 / labels.len() as f32;
    for (row, &label) in labels.iter().enumerate() {
        grad[row * num_classes + label] = -scale;
    }
}

fn softmax_vec(values: &[f32]) -> Vec<f32> {
    let mut out = values.to_vec();
    softmax_rows(&mut out, 1, values.len());
    out
}

/// KL-style sparsity divergence between a target and an observed activation vector.
///
/// Both vectors are softmax-normalised first, then
/// `Σ p ln(p/q) + Σ (1-p) ln((1-p)/(1-q))`. Non-finite results are returned
/// unchanged.
pub fn sparsity_divergence(target: &[f32], observed: &[f32]) -> f32 {
    assert_eq!(target.len(), observed.len(), "divergence length mismatch");
    let p = softmax_vec(target);
    let q = softmax_vec(observed);
    p.iter()
        .zip(&q)
        .map(|(&p, &q)| p * (p / q).ln() + (1.0 - p) * ((1.0 - p) / (1.0 - q)).ln())
        .sum()
}

/// Gradient of `sparsity_divergence` with respect to `observed`.
pub fn sparsity_divergence_grad(target: &[f32], observed: &[f32]) -> Vec<f32> {
    assert_eq!(target.len(), observed.len(), "divergence length mismatch");
    let p = softmax_vec(target);
    let q = softmax_vec(observed);

    // d/dq_j
    let dq: Vec<f32> = p
        .iter()
        .zip(&q)
        .map(|(&p, &q)| -p / q + (1.0 - p) / (1.0 - q))
        .collect();

    // back through the softmax: q_i (dq_i - Σ_j dq_j q_j)
    let dot: f32 = dq.iter().zip(&q).map(|(d, q)| d * q).sum();
    q.iter().zip(&dq).map(|(&q, &d)| q * (d - dot)).collect()
}

/// Attention magnitude penalty: `Σ attention / (batch_size · input_dim)`.
///
/// `batch_size` is the configured batch size, also for a shorter final batch.
pub fn attention_penalty(attention: &[f32], batch_size: usize, input_dim: usize) -> f32 {
    attention.iter().sum::<f32>() / (batch_size * input_dim) as f32
}

/// Per-element gradient of `attention_penalty`; it is the same for every entry.
pub fn attention_penalty_grad(batch_size: usize, input_dim: usize) -> f32 {
    1.0 / (batch_size * input_dim) as f32
}

/// Mean activation of each hidden unit over the rows of a batch (ρ̂).
pub fn mean_activation(hidden: &[f32], rows: usize, cols: usize) -> Vec<f32> {
    let mut mean = vec![0.0f32; cols];
    crate::utils::linalg::sum_rows(hidden, rows, cols, &mut mean);
    for value in &mut mean {
        *value /= rows as f32;
    }
    mean
}

/// Breakdown of the reconstruction + sparsity loss for one batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconstructionLoss {
    pub mse: f32,
    /// Unweighted divergence
    pub divergence: f32,
    /// Unweighted attention penalty
    pub attention: f32,
    /// `mse + w_s · divergence + w_a · attention`
    pub total: f32,
}

impl ReconstructionLoss {
    pub fn new(
        mse: f32,
        divergence: f32,
        attention: f32,
        sparsity_weight: f32,
        attention_weight: f32,
    ) -> Self {
        Self {
            mse,
            divergence,
            attention,
            total: mse + sparsity_weight * divergence + attention_weight * attention,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mse_zero_for_identical() {
        let x = vec![0.1, -0.4, 2.0];
        assert_eq!(mse(&x, &x), 0.0);
    }

    #[test]
    fn test_mse_value() {
        assert_relative_eq!(mse(&[1.0, 3.0], &[0.0, 1.0]), 2.5);
        assert_relative_eq!(sse(&[1.0, 3.0], &[0.0, 1.0]), 5.0);
    }

    #[test]
    fn test_divergence_zero_when_equal() {
        let rho = vec![0.5; 30];
        assert_relative_eq!(sparsity_divergence(&rho, &rho), 0.0, epsilon = 1e-6);
        for g in sparsity_divergence_grad(&rho, &rho) {
            assert!(g.abs() < 1e-5);
        }
    }

    #[test]
    fn test_divergence_positive_when_different() {
        let rho = vec![0.5; 4];
        let observed = vec![0.0, 1.0, 2.0, 0.5];
        assert!(sparsity_divergence(&rho, &observed) > 0.0);
    }

    #[test]
    fn test_divergence_shift_invariant() {
        // Softmax normalisation ignores a constant offset.
        let rho = vec![0.5; 3];
        let observed = vec![3.0, 3.0, 3.0];
        assert_relative_eq!(sparsity_divergence(&rho, &observed), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_nll_on_probabilities() {
        let probs = vec![0.9, 0.1, 0.3, 0.7];
        let labels = vec![0, 1];
        assert_relative_eq!(nll(&probs, &labels, 2), -0.8, epsilon = 1e-6);
        assert_relative_eq!(nll_sum(&probs, &labels, 2), -1.6, epsilon = 1e-6);
    }

    #[test]
    fn test_attention_penalty_uses_configured_batch_size() {
        let attention = vec![1.0; 2 * 34];
        assert_relative_eq!(attention_penalty(&attention, 5, 34), 68.0 / 170.0);
    }

    #[test]
    fn test_mean_activation() {
        let hidden = vec![1.0, 0.0, 3.0, 2.0];
        assert_eq!(mean_activation(&hidden, 2, 2), vec![2.0, 1.0]);
    }

    #[test]
    fn test_reconstruction_loss_total() {
        let loss = ReconstructionLoss::new(1.0, 2.0, 3.0, 5.0, 0.001);
        assert_relative_eq!(loss.total, 1.0 + 10.0 + 0.003);
    }
}
