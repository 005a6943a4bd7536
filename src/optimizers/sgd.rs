//! Stochastic Gradient Descent (SGD) optimizer implementation
//!
//! Plain gradient descent, `parameter = parameter - learning_rate * gradient`,
//! with no momentum and no weight decay.

use crate::optimizers::Optimizer;

/// Stochastic Gradient Descent optimizer.
///
/// `w = w - η * ∇L/∂w`
///
/// Stateless apart from a counter of applied tensor updates, so one instance
/// can serve every layer of a parameter group.
#[derive(Debug, Clone)]
pub struct SGD {
    learning_rate: f32,
    updates: usize,
}

impl SGD {
    /// Creates a new SGD optimizer with the specified learning rate.
    ///
    /// # Examples
    ///
    /// ```
    /// use sparse_attention_ae::optimizers::{Optimizer, SGD};
    ///
    /// let optimizer = SGD::new(0.01);
    /// assert_eq!(optimizer.learning_rate(), 0.01);
    /// ```
    pub fn new(learning_rate: f32) -> Self {
        Self {
            learning_rate,
            updates: 0,
        }
    }
}

impl Optimizer for SGD {
    /// Applies `parameter[i] -= learning_rate * gradient[i]`.
    ///
    /// # Panics
    ///
    /// Panics if `parameters` and `gradients` have different lengths.
    fn update(&mut self, parameters: &mut [f32], gradients: &[f32]) {
        assert_eq!(
            parameters.len(),
            gradients.len(),
            "Parameters and gradients must have the same length"
        );

        for (param, grad) in parameters.iter_mut().zip(gradients.iter()) {
            *param -= self.learning_rate * grad;
        }
        self.updates += 1;
    }

    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    fn updates_applied(&self) -> usize {
        self.updates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sgd_update() {
        let mut optimizer = SGD::new(0.1);
        let mut params = vec![1.0, 2.0, 3.0];
        let grads = vec![0.1, 0.2, 0.3];

        optimizer.update(&mut params, &grads);

        assert!((params[0] - 0.99).abs() < 1e-6);
        assert!((params[1] - 1.98).abs() < 1e-6);
        assert!((params[2] - 2.97).abs() < 1e-6);
        assert_eq!(optimizer.updates_applied(), 1);
    }

    #[test]
    #[should_panic(expected = "Parameters and gradients must have the same length")]
    fn test_sgd_mismatched_lengths() {
        let mut optimizer = SGD::new(0.01);
        let mut params = vec![1.0, 2.0];
        let grads = vec![0.1, 0.2, 0.3];
        optimizer.update(&mut params, &grads);
    }

    #[test]
    fn test_sgd_nan_gradient_propagates() {
        // Non-finite gradients are applied as-is.
        let mut optimizer = SGD::new(0.1);
        let mut params = vec![1.0];
        optimizer.update(&mut params, &[f32::NAN]);
        assert!(params[0].is_nan());
    }
}
