//! Mini-batch iteration over a dataset
//!
//! `BatchLoader` owns a dataset and hands out batches of `batch_size` samples,
//! with a smaller final batch when the dataset size is not a multiple of the
//! batch size. Training loaders reshuffle every epoch; evaluation loaders keep
//! the dataset order.

use super::Dataset;
use crate::utils::SimpleRng;

/// A group of samples presented to the model together.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Row-major `len() × feature_count` inputs
    pub inputs: Vec<f32>,
    pub labels: Vec<usize>,
}

impl Batch {
    /// Number of samples in the batch.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Batched, optionally shuffled view of a dataset.
#[derive(Debug, Clone)]
pub struct BatchLoader {
    dataset: Dataset,
    batch_size: usize,
    shuffle: bool,
}

impl BatchLoader {
    /// # Panics
    ///
    /// Panics if `batch_size` is zero.
    pub fn new(dataset: Dataset, batch_size: usize, shuffle: bool) -> Self {
        assert!(batch_size > 0, "batch_size must be positive");
        Self {
            dataset,
            batch_size,
            shuffle,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of batches per epoch, counting the final partial batch.
    pub fn num_batches(&self) -> usize {
        self.dataset.len().div_ceil(self.batch_size)
    }

    /// Batches in dataset order.
    pub fn iter(&self) -> Batches<'_> {
        Batches {
            loader: self,
            order: (0..self.dataset.len()).collect(),
            cursor: 0,
        }
    }

    /// Batches for one epoch: shuffled with `rng` if the loader shuffles,
    /// in dataset order otherwise.
    pub fn epoch(&self, rng: &mut SimpleRng) -> Batches<'_> {
        let mut batches = self.iter();
        if self.shuffle {
            rng.shuffle_usize(&mut batches.order);
        }
        batches
    }
}

/// Iterator over the batches of one epoch.
pub struct Batches<'a> {
    loader: &'a BatchLoader,
    order: Vec<usize>,
    cursor: usize,
}

impl Iterator for Batches<'_> {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        if self.cursor >= self.order.len() {
            return None;
        }
        let end = (self.cursor + self.loader.batch_size).min(self.order.len());
        let dataset = &self.loader.dataset;
        let count = end - self.cursor;

        let mut inputs = Vec::with_capacity(count * dataset.feature_count());
        let mut labels = Vec::with_capacity(count);
        for &index in &self.order[self.cursor..end] {
            let (row, label) = dataset.sample(index);
            inputs.extend_from_slice(row);
            labels.push(label);
        }
        self.cursor = end;

        Some(Batch { inputs, labels })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.order.len() - self.cursor).div_ceil(self.loader.batch_size);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Batches<'_> {}
