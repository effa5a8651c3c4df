// ============================================================
// Layer 4 - Train/Test Splitter
// ============================================================
// Draws a fixed-size held-out set once, uniformly at random
// without replacement, and leaves the rest for training.
//
// The split works on row indices rather than rows, so the
// encoded matrices are never copied. The caller owns the RNG,
// which makes the split reproducible from the run seed.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::error::{Result, WganError};

/// Shuffle `0..total` and split off `test_size` indices for testing.
///
/// # Returns
/// A tuple (train_rows, test_rows)
///
/// # Errors
/// `TestSplitTooLarge` when nothing would be left to train on.
pub fn split_train_test<R: Rng>(
    total: usize,
    test_size: usize,
    rng: &mut R,
) -> Result<(Vec<usize>, Vec<usize>)> {
    if test_size >= total {
        return Err(WganError::TestSplitTooLarge { test: test_size, total });
    }

    let mut rows: Vec<usize> = (0..total).collect();
    rows.shuffle(rng);

    // split_off(n) leaves [0..n) in rows and returns [n..total)
    let test = rows.split_off(total - test_size);

    tracing::debug!("Dataset split: {} training, {} test", rows.len(), test.len());
    Ok((rows, test))
}

/// Shuffle `rows` and cut them into mini-batches of `batch_size`.
/// The final batch may be smaller; it is kept.
pub fn shuffled_batches<R: Rng>(rows: &[usize], batch_size: usize, rng: &mut R) -> Vec<Vec<usize>> {
    let mut order = rows.to_vec();
    order.shuffle(rng);
    order.chunks(batch_size.max(1)).map(<[usize]>::to_vec).collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    #[test]
    fn test_correct_split_sizes() {
        let mut rng = StdRng::seed_from_u64(1);
        let (train, test) = split_train_test(100, 16, &mut rng).unwrap();
        assert_eq!(train.len(), 84);
        assert_eq!(test.len(), 16);
    }

    #[test]
    fn test_all_rows_preserved_once() {
        let mut rng = StdRng::seed_from_u64(2);
        let (train, test) = split_train_test(50, 7, &mut rng).unwrap();
        let all: HashSet<usize> = train.iter().chain(test.iter()).copied().collect();
        assert_eq!(all.len(), 50);
    }

    #[test]
    fn test_same_seed_same_split() {
        let a = split_train_test(30, 5, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = split_train_test(30, 5, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_test_set_too_large() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            split_train_test(10, 10, &mut rng),
            Err(WganError::TestSplitTooLarge { .. })
        ));
    }

    #[test]
    fn test_batches_cover_rows_with_partial_tail() {
        let rows: Vec<usize> = (0..84).collect();
        let mut rng = StdRng::seed_from_u64(4);
        let batches = shuffled_batches(&rows, 10, &mut rng);
        assert_eq!(batches.len(), 9);
        assert_eq!(batches.last().unwrap().len(), 4);
        assert_eq!(batches.iter().map(Vec::len).sum::<usize>(), 84);
    }
}
