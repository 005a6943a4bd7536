//! Random train/test partition

use super::Dataset;
use crate::error::{Error, Result};
use crate::utils::SimpleRng;

/// Draw `train_size` indices for training and leave the rest for testing.
///
/// Both index lists come from a single permutation of `0..n`, so they are
/// disjoint and together cover every sample.
pub fn split_indices(
    n: usize,
    train_size: usize,
    rng: &mut SimpleRng,
) -> Result<(Vec<usize>, Vec<usize>)> {
    if train_size > n {
        return Err(Error::SplitTooLarge {
            train_size,
            available: n,
        });
    }
    let mut indices = rng.permutation(n);
    let test = indices.split_off(train_size);
    Ok((indices, test))
}

/// Split a dataset into `(train, test)` with exactly `train_size` training samples.
pub fn split_dataset(
    dataset: &Dataset,
    train_size: usize,
    rng: &mut SimpleRng,
) -> Result<(Dataset, Dataset)> {
    let (train_idx, test_idx) = split_indices(dataset.len(), train_size, rng)?;
    Ok((dataset.subset(&train_idx), dataset.subset(&test_idx)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sizes_and_disjointness() {
        let mut rng = SimpleRng::new(42);
        let (train, test) = split_indices(351, 280, &mut rng).unwrap();
        assert_eq!(train.len(), 280);
        assert_eq!(test.len(), 71);

        let mut all: Vec<usize> = train.iter().chain(test.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..351).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_too_large() {
        let mut rng = SimpleRng::new(1);
        let err = split_indices(10, 280, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            Error::SplitTooLarge {
                train_size: 280,
                available: 10
            }
        ));
    }

    #[test]
    fn test_split_exact_size_leaves_empty_test() {
        let mut rng = SimpleRng::new(1);
        let (train, test) = split_indices(280, 280, &mut rng).unwrap();
        assert_eq!(train.len(), 280);
        assert!(test.is_empty());
    }
}
