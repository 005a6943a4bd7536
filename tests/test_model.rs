//! Tests for the encoder, decoder, autoencoder and classifier
//!
//! This file tests:
//! - Output shapes and value ranges of every component
//! - Gate thresholding and effective sensor counts
//! - Which layers receive gradient from which backward path

use approx::assert_relative_eq;
use sparse_attention_ae::layers::{DenseLayer, Layer};
use sparse_attention_ae::model::{
    active_sensor_fraction, active_sensors, AutoEncoder, Classifier, Decoder, Encoder,
};
use sparse_attention_ae::utils::SimpleRng;

const D: usize = 34;
const H: usize = 30;

fn batch_inputs(rows: usize) -> Vec<f32> {
    (0..rows * D)
        .map(|i| ((i as f32) * 0.41).sin() * 0.8)
        .collect()
}

fn encoder_with_gate_bias(bias: f32) -> Encoder {
    let mut rng = SimpleRng::new(17);
    let mut encoder = Encoder::new(D, H, &mut rng);
    encoder.gate_mut().weights_mut().fill(0.0);
    encoder.gate_mut().biases_mut().fill(bias);
    encoder
}

// ============================================================================
// Encoder Tests
// ============================================================================

mod encoder_tests {
    use super::*;

    #[test]
    fn test_encoder_shapes_for_thresholds() {
        let mut rng = SimpleRng::new(1);
        let encoder = Encoder::new(D, H, &mut rng);
        let input = batch_inputs(5);

        for threshold in [0.0, 0.1, 0.5, 0.9, 1.0] {
            let pass = encoder.forward(&input, 5, threshold);
            assert_eq!(pass.attention.len(), 5 * D);
            assert_eq!(pass.mask.len(), 5 * D);
            assert_eq!(pass.hidden.len(), 5 * H);
            assert!(pass.mask.iter().all(|&m| m == 0.0 || m == 1.0));
            assert!(pass.hidden.iter().all(|&h| h >= 0.0));
            assert!(pass.attention.iter().all(|&a| a > 0.0 && a < 1.0));
        }
    }

    #[test]
    fn test_threshold_one_masks_everything() {
        let mut rng = SimpleRng::new(1);
        let encoder = Encoder::new(D, H, &mut rng);
        let pass = encoder.forward(&batch_inputs(2), 2, 1.0);
        assert!(pass.mask.iter().all(|&m| m == 0.0));
        assert!(pass.gated.iter().all(|&g| g == 0.0));
    }

    #[test]
    fn test_all_gates_open() {
        let encoder = encoder_with_gate_bias(10.0);
        let pass = encoder.forward(&batch_inputs(4), 4, 0.1);

        assert_eq!(active_sensor_fraction(&pass.attention, 0.1), 1.0);
        assert_eq!(active_sensors(&pass.attention, 4, 0.1), D as f32);
        assert_eq!(pass.gated, batch_inputs(4));
    }

    #[test]
    fn test_all_gates_closed() {
        let encoder = encoder_with_gate_bias(-10.0);
        let pass = encoder.forward(&batch_inputs(4), 4, 0.1);

        assert_eq!(active_sensor_fraction(&pass.attention, 0.1), 0.0);
        assert_eq!(active_sensors(&pass.attention, 4, 0.1), 0.0);
        // Nothing reaches the projection but its bias.
        assert!(pass.gated.iter().all(|&g| g == 0.0));
    }

    #[test]
    fn test_attention_backward_reaches_gate() {
        let encoder = encoder_with_gate_bias(0.0);
        let input = batch_inputs(2);
        let attention = encoder.attention(&input, 2);
        let grad = vec![1.0f32; attention.len()];

        encoder.backward_attention(&input, &attention, &grad, 2);

        // sigmoid(0) = 0.5, derivative 0.25 on every score
        for &g in encoder.gate().bias_gradients().iter() {
            assert_relative_eq!(g, 0.5, epsilon = 1e-6);
        }
        assert!(encoder.projection().weight_gradients().iter().all(|&g| g == 0.0));
    }
}

// ============================================================================
// Decoder / AutoEncoder Tests
// ============================================================================

mod autoencoder_tests {
    use super::*;

    #[test]
    fn test_decoder_output_non_negative() {
        let mut rng = SimpleRng::new(2);
        let decoder = Decoder::new(H, D, &mut rng);
        let hidden: Vec<f32> = (0..3 * H).map(|i| (i % 5) as f32 * 0.3).collect();
        let output = decoder.forward(&hidden, 3);
        assert_eq!(output.len(), 3 * D);
        assert!(output.iter().all(|&o| o >= 0.0));
    }

    #[test]
    fn test_autoencoder_backward_skips_gate() {
        let mut rng = SimpleRng::new(4);
        let ae = AutoEncoder::new(D, H, &mut rng);
        let input = batch_inputs(3);
        let pass = ae.forward(&input, 3, 0.1);

        let grad = vec![0.1f32; pass.reconstruction.len()];
        ae.backward(&pass, &grad);

        assert!(ae.encoder().gate().weight_gradients().iter().all(|&g| g == 0.0));
        assert!(ae.encoder().gate().bias_gradients().iter().all(|&g| g == 0.0));
    }

    #[test]
    fn test_zero_grad_clears_every_layer() {
        let mut rng = SimpleRng::new(4);
        let ae = AutoEncoder::new(D, H, &mut rng);
        let input = batch_inputs(3);
        let pass = ae.forward(&input, 3, 0.1);
        ae.backward(&pass, &vec![1.0f32; pass.reconstruction.len()]);

        ae.zero_grad();
        assert!(ae.decoder().layer().weight_gradients().iter().all(|&g| g == 0.0));
        assert!(ae.encoder().projection().weight_gradients().iter().all(|&g| g == 0.0));
    }

    #[test]
    fn test_from_parts_with_explicit_layers() {
        let gate = DenseLayer::from_parameters(2, 2, vec![0.0; 4], vec![10.0, -10.0]);
        let projection = DenseLayer::from_parameters(2, 1, vec![1.0, 1.0], vec![0.0]);
        let decoder = Decoder::from_layer(DenseLayer::from_parameters(1, 2, vec![1.0, 2.0], vec![0.0, 0.0]));
        let ae = AutoEncoder::from_parts(Encoder::from_layers(gate, projection), decoder);

        // Only feature 0 passes the gate: hidden = relu(3) = 3
        let pass = ae.forward(&[3.0, 5.0], 1, 0.1);
        assert_eq!(pass.encoded.mask, vec![1.0, 0.0]);
        assert_eq!(pass.encoded.hidden, vec![3.0]);
        assert_eq!(pass.reconstruction, vec![3.0, 6.0]);
    }
}

// ============================================================================
// Classifier Tests
// ============================================================================

mod classifier_tests {
    use super::*;

    #[test]
    fn test_classifier_outputs_probabilities() {
        let mut rng = SimpleRng::new(6);
        let classifier = Classifier::new(H, 2, &mut rng);
        let hidden: Vec<f32> = (0..5 * H).map(|i| (i as f32 * 0.07).sin().abs()).collect();
        let probs = classifier.forward(&hidden, 5);

        assert_eq!(probs.len(), 10);
        for row in probs.chunks_exact(2) {
            assert!(row.iter().all(|&p| (0.0..=1.0).contains(&p)));
            assert_relative_eq!(row.iter().sum::<f32>(), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_classifier_parameter_count() {
        let mut rng = SimpleRng::new(6);
        let classifier = Classifier::new(H, 2, &mut rng);
        assert_eq!(classifier.parameter_count(), H * 2 + 2);
        assert_eq!(classifier.layer().input_size(), H);
    }
}
