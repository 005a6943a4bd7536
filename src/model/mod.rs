//! Model components: attention-gated encoder, decoder, autoencoder and classifier.

pub mod autoencoder;
pub mod classifier;
pub mod decoder;
pub mod encoder;

pub use autoencoder::{AutoEncoder, AutoEncoderPass};
pub use classifier::Classifier;
pub use decoder::Decoder;
pub use encoder::{active_sensor_fraction, active_sensors, threshold_mask, Encoder, EncoderPass};
