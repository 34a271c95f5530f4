//! Reproducible random permutations for pooling draws across chains.
//!
//! All randomness comes from the generator passed in by the caller, so a fixed
//! seed always gives the same permutation.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{ChainsError, Result};

/// Returns a uniformly random permutation of `0..n` (Fisher–Yates).
///
/// ```rust
/// use mcmc_chains::permutation::permutation;
/// use rand::{rngs::SmallRng, SeedableRng};
///
/// let a = permutation(10, &mut SmallRng::seed_from_u64(42));
/// let b = permutation(10, &mut SmallRng::seed_from_u64(42));
/// assert_eq!(a, b);
///
/// let mut sorted = a.clone();
/// sorted.sort_unstable();
/// assert_eq!(sorted, (0..10).collect::<Vec<_>>());
/// ```
pub fn permutation<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..n).collect();
    perm.shuffle(rng);
    perm
}

/// Reorders `source` so that element `i` of the result is `source[perm[i]]`.
///
/// # Errors
///
/// [`ChainsError::InvalidArgument`] if the lengths differ, and
/// [`ChainsError::OutOfRange`] if `perm` holds an index past the end of `source`.
pub fn permute<T: Clone>(perm: &[usize], source: &[T]) -> Result<Vec<T>> {
    if perm.len() != source.len() {
        return Err(ChainsError::InvalidArgument(format!(
            "permutation has length {} but source has length {}",
            perm.len(),
            source.len()
        )));
    }
    perm.iter()
        .map(|&p| {
            source.get(p).cloned().ok_or_else(|| {
                ChainsError::OutOfRange(format!(
                    "permutation entry {p} must be less than {}",
                    source.len()
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const SEED: u64 = 187_049_587;

    fn check_permutation(n: usize) {
        let mut rng = SmallRng::seed_from_u64(SEED);
        let pi = permutation(n, &mut rng);
        assert_eq!(pi.len(), n);
        assert!(pi.iter().all(|&p| p < n));
        let mut seen = vec![false; n];
        for &p in &pi {
            assert!(!seen[p], "index {p} repeated for n = {n}");
            seen[p] = true;
        }
    }

    #[test]
    fn test_permutation() {
        for n in [0, 1, 2, 3, 15, 1024, 1023, 1025] {
            check_permutation(n);
        }
    }

    #[test]
    fn test_permutation_reproducible() {
        let a = permutation(500, &mut SmallRng::seed_from_u64(SEED));
        let b = permutation(500, &mut SmallRng::seed_from_u64(SEED));
        let c = permutation(500, &mut SmallRng::seed_from_u64(SEED + 1));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_permutation_matches_slice_shuffle() {
        for n in [0, 1, 7, 1000] {
            let mut expected: Vec<usize> = (0..n).collect();
            expected.shuffle(&mut SmallRng::seed_from_u64(SEED));
            assert_eq!(permutation(n, &mut SmallRng::seed_from_u64(SEED)), expected);
        }
    }

    fn check_permute(n: usize) {
        let mut rng = SmallRng::seed_from_u64(SEED);
        let pi = permutation(n, &mut rng);
        let x: Vec<f64> = (0..n).map(|i| 1.0 + i as f64 / 2.0).collect();
        let x_pi = permute(&pi, &x).unwrap();
        assert_eq!(x_pi.len(), n);
        if n == 0 {
            return;
        }
        let sum: f64 = x.iter().sum();
        let sum_pi: f64 = x_pi.iter().sum();
        assert!(sum > 0.0);
        // Halves are exact in binary, so the sums match regardless of order.
        assert_eq!(sum, sum_pi);
        for (i, &p) in pi.iter().enumerate() {
            assert_eq!(x_pi[i], x[p]);
        }
    }

    #[test]
    fn test_permute() {
        for n in [0, 1, 2, 3, 4, 5, 2055, 2056, 2057] {
            check_permute(n);
        }
    }

    #[test]
    fn test_permute_errors() {
        assert!(matches!(
            permute(&[0, 1], &[1.0]),
            Err(ChainsError::InvalidArgument(_))
        ));
        assert!(matches!(
            permute(&[0, 2], &[1.0, 2.0]),
            Err(ChainsError::OutOfRange(_))
        ));
    }
}
