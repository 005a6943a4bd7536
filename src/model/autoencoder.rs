//! Autoencoder: attention-gated encoder followed by the decoder.
//!
//! The autoencoder's own forward pass only produces the reconstruction. The
//! code fed to the classifier is computed separately by the training loop
//! (see `training`), on the attention-weighted input.

use super::decoder::Decoder;
use super::encoder::{Encoder, EncoderPass};
use crate::optimizers::Optimizer;
use crate::utils::SimpleRng;
use std::fmt;

/// Intermediate values of an autoencoder forward pass.
#[derive(Debug, Clone)]
pub struct AutoEncoderPass {
    pub encoded: EncoderPass,
    pub reconstruction: Vec<f32>,
}

#[derive(Debug, Clone)]
pub struct AutoEncoder {
    encoder: Encoder,
    decoder: Decoder,
}

impl AutoEncoder {
    /// Encoder `input → hidden` and decoder `hidden → input`, Xavier initialised.
    pub fn new(input_size: usize, hidden_size: usize, rng: &mut SimpleRng) -> Self {
        let encoder = Encoder::new(input_size, hidden_size, rng);
        let decoder = Decoder::new(hidden_size, input_size, rng);
        Self { encoder, decoder }
    }

    pub fn from_parts(encoder: Encoder, decoder: Decoder) -> Self {
        assert_eq!(
            encoder.input_size(),
            decoder.output_size(),
            "decoder must reconstruct the encoder input width"
        );
        Self { encoder, decoder }
    }

    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    pub fn encoder_mut(&mut self) -> &mut Encoder {
        &mut self.encoder
    }

    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    pub fn decoder_mut(&mut self) -> &mut Decoder {
        &mut self.decoder
    }

    pub fn input_size(&self) -> usize {
        self.encoder.input_size()
    }

    pub fn hidden_size(&self) -> usize {
        self.encoder.hidden_size()
    }

    pub fn forward(&self, input: &[f32], batch_size: usize, threshold: f32) -> AutoEncoderPass {
        let encoded = self.encoder.forward(input, batch_size, threshold);
        let reconstruction = self.decoder.forward(&encoded.hidden, batch_size);
        AutoEncoderPass {
            encoded,
            reconstruction,
        }
    }

    /// Backpropagate a reconstruction gradient through decoder and projection.
    pub fn backward(&self, pass: &AutoEncoderPass, grad_reconstruction: &[f32]) {
        let batch_size = pass.encoded.batch_size;
        let grad_hidden = self.decoder.backward(
            &pass.encoded.hidden,
            &pass.reconstruction,
            grad_reconstruction,
            batch_size,
        );
        self.encoder.accumulate_projection(&pass.encoded, &grad_hidden);
    }

    pub fn zero_grad(&self) {
        self.encoder.zero_grad();
        self.decoder.zero_grad();
    }

    pub fn step(&mut self, optimizer: &mut dyn Optimizer) {
        self.encoder.step(optimizer);
        self.decoder.step(optimizer);
    }

    pub fn parameter_count(&self) -> usize {
        self.encoder.parameter_count() + self.decoder.parameter_count()
    }
}

impl fmt::Display for AutoEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.input_size();
        let h = self.hidden_size();
        writeln!(f, "AutoEncoder(")?;
        writeln!(f, "  encoder.gate:       Dense({d} -> {d}) + sigmoid + threshold")?;
        writeln!(f, "  encoder.projection: Dense({d} -> {h}) + relu")?;
        writeln!(f, "  decoder:            Dense({h} -> {d}) + relu")?;
        write!(f, ") parameters: {}", self.parameter_count())
    }
}
