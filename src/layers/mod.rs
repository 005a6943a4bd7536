//! Layer abstractions for the autoencoder and classifier
//!
//! This module provides the Layer trait and the dense layer every part of the
//! model is built from.

mod r#trait;
pub mod dense;

// Re-export the Layer trait for convenience
pub use r#trait::Layer;
pub use dense::DenseLayer;
