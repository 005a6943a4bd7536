//! Dataset handling: parsing, train/test splitting and batching
//!
//! Samples are stored as one flat row-major `f32` buffer plus a label per row,
//! the same layout the layers consume.

pub mod batch;
pub mod parse;
pub mod split;

pub use batch::{Batch, BatchLoader};
pub use parse::{load_dataset, parse_line, read_dataset};
pub use split::{split_dataset, split_indices};

use crate::error::{Error, Result};

/// A labelled set of fixed-width samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Vec<f32>,
    labels: Vec<usize>,
    feature_count: usize,
}

impl Dataset {
    /// Build a dataset from a flat `labels.len() × feature_count` buffer.
    pub fn new(features: Vec<f32>, labels: Vec<usize>, feature_count: usize) -> Result<Self> {
        let expected = labels.len() * feature_count;
        if features.len() != expected {
            return Err(Error::ShapeMismatch {
                expected,
                actual: features.len(),
            });
        }
        Ok(Self {
            features,
            labels,
            feature_count,
        })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn feature_count(&self) -> usize {
        self.feature_count
    }

    pub fn features(&self) -> &[f32] {
        &self.features
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Feature row and label of sample `index`.
    pub fn sample(&self, index: usize) -> (&[f32], usize) {
        let start = index * self.feature_count;
        (
            &self.features[start..start + self.feature_count],
            self.labels[index],
        )
    }

    /// New dataset holding the given samples, in the given order.
    pub fn subset(&self, indices: &[usize]) -> Self {
        let mut features = Vec::with_capacity(indices.len() * self.feature_count);
        let mut labels = Vec::with_capacity(indices.len());
        for &index in indices {
            let (row, label) = self.sample(index);
            features.extend_from_slice(row);
            labels.push(label);
        }
        Self {
            features,
            labels,
            feature_count: self.feature_count,
        }
    }

    /// Number of samples per class; labels at or above `num_classes` are ignored.
    pub fn class_counts(&self, num_classes: usize) -> Vec<usize> {
        let mut counts = vec![0usize; num_classes];
        for &label in &self.labels {
            if let Some(count) = counts.get_mut(label) {
                *count += 1;
            }
        }
        counts
    }
}
