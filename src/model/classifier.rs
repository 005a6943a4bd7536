//! Classifier head: `softmax(Dense(H→C))`.

use crate::layers::{DenseLayer, Layer};
use crate::optimizers::Optimizer;
use crate::utils::activations::softmax_backward_rows;
use crate::utils::{softmax_rows, SimpleRng};
use std::fmt;

#[derive(Debug, Clone)]
pub struct Classifier {
    layer: DenseLayer,
}

impl Classifier {
    pub fn new(hidden_size: usize, num_classes: usize, rng: &mut SimpleRng) -> Self {
        Self {
            layer: DenseLayer::new(hidden_size, num_classes, rng),
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

    pub fn num_classes(&self) -> usize {
        self.layer.output_size()
    }

    /// Class probabilities, `batch × num_classes`, each row summing to 1.
    pub fn forward(&self, hidden: &[f32], batch_size: usize) -> Vec<f32> {
        let classes = self.num_classes();
        let mut probs = vec![0.0f32; batch_size * classes];
        self.layer.forward(hidden, &mut probs, batch_size);
        softmax_rows(&mut probs, batch_size, classes);
        probs
    }

    /// Backpropagate a gradient on the probabilities.
    ///
    /// Accumulates layer gradients and returns the gradient w.r.t. `hidden`.
    pub fn backward(
        &self,
        hidden: &[f32],
        probs: &[f32],
        grad_probs: &[f32],
        batch_size: usize,
    ) -> Vec<f32> {
        let mut grad_logits = vec![0.0f32; probs.len()];
        softmax_backward_rows(probs, grad_probs, &mut grad_logits, batch_size, self.num_classes());

        let mut grad_hidden = vec![0.0f32; batch_size * self.layer.input_size()];
        self.layer
            .backward(hidden, &grad_logits, &mut grad_hidden, batch_size);
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

impl fmt::Display for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Classifier(Dense({} -> {}) + softmax) parameters: {}",
            self.layer.input_size(),
            self.num_classes(),
            self.parameter_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probabilities_sum_to_one() {
        let mut rng = SimpleRng::new(8);
        let classifier = Classifier::new(30, 2, &mut rng);
        let hidden: Vec<f32> = (0..4 * 30).map(|i| (i % 7) as f32 * 0.2).collect();
        let probs = classifier.forward(&hidden, 4);
        for row in probs.chunks_exact(2) {
            assert!((row.iter().sum::<f32>() - 1.0).abs() < 1e-6);
        }
    }
}
