//! Randomized selection helpers
//!
//! Every function takes the random source as a parameter so callers can pass
//! a seeded `StdRng` and get reproducible selections.

use rand::{seq::SliceRandom, Rng};
use std::collections::HashSet;
use std::hash::Hash;

/// Splits `total` into `k` near-equal non-negative parts that sum to `total`
///
/// The first `total % k` parts get one extra unit. `k == 0` yields no parts.
pub fn distribute_counts(total: usize, k: usize) -> Vec<usize> {
    if k == 0 {
        return Vec::new();
    }

    let base = total / k;
    let remainder = total % k;
    (0..k).map(|i| base + usize::from(i < remainder)).collect()
}

/// Uniformly samples up to `n` items without replacement, skipping excluded keys
///
/// Shuffles the eligible items and takes a prefix, so asking for more than is
/// available returns every eligible item.
pub fn sample_unique<T, K, F, R>(
    items: &[T],
    n: usize,
    exclude: &HashSet<K>,
    key: F,
    rng: &mut R,
) -> Vec<T>
where
    T: Clone,
    K: Eq + Hash,
    F: Fn(&T) -> K,
    R: Rng + ?Sized,
{
    if n == 0 {
        return Vec::new();
    }

    let mut eligible: Vec<T> = items
        .iter()
        .filter(|item| !exclude.contains(&key(item)))
        .cloned()
        .collect();
    eligible.shuffle(rng);
    eligible.truncate(n);
    eligible
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_distribute_counts_front_loads_remainder() {
        assert_eq!(distribute_counts(10, 3), vec![4, 3, 3]);
        assert_eq!(distribute_counts(7, 7), vec![1, 1, 1, 1, 1, 1, 1]);
        assert_eq!(distribute_counts(2, 4), vec![1, 1, 0, 0]);
        assert_eq!(distribute_counts(0, 2), vec![0, 0]);
    }

    #[test]
    fn test_distribute_counts_zero_parts() {
        assert!(distribute_counts(100, 0).is_empty());
    }

    #[test]
    fn test_distribute_counts_always_sums_to_total() {
        for total in 0..=120 {
            for k in 1..=13 {
                let parts = distribute_counts(total, k);
                assert_eq!(parts.len(), k);
                assert_eq!(parts.iter().sum::<usize>(), total, "total={total} k={k}");
                let max = parts.iter().max().unwrap();
                let min = parts.iter().min().unwrap();
                assert!(max - min <= 1);
            }
        }
    }

    #[test]
    fn test_sample_unique_respects_exclusions() {
        let mut rng = StdRng::seed_from_u64(7);
        let items: Vec<u32> = (0..20).collect();
        let exclude: HashSet<u32> = (0..10).collect();

        let picked = sample_unique(&items, 5, &exclude, |x| *x, &mut rng);
        assert_eq!(picked.len(), 5);
        assert!(picked.iter().all(|x| *x >= 10));

        let unique: HashSet<u32> = picked.iter().copied().collect();
        assert_eq!(unique.len(), 5);
    }

    #[test]
    fn test_sample_unique_takes_everything_when_short() {
        let mut rng = StdRng::seed_from_u64(7);
        let items = vec!["a", "b", "c"];
        let mut picked = sample_unique(&items, 10, &HashSet::new(), |x| *x, &mut rng);
        picked.sort();
        assert_eq!(picked, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_sample_unique_zero_requested() {
        let mut rng = StdRng::seed_from_u64(7);
        let picked = sample_unique(&[1, 2, 3], 0, &HashSet::new(), |x| *x, &mut rng);
        assert!(picked.is_empty());
    }

    #[test]
    fn test_sample_unique_is_reproducible_with_same_seed() {
        let items: Vec<u32> = (0..50).collect();
        let none = HashSet::new();
        let first = sample_unique(&items, 10, &none, |x| *x, &mut StdRng::seed_from_u64(99));
        let second = sample_unique(&items, 10, &none, |x| *x, &mut StdRng::seed_from_u64(99));
        assert_eq!(first, second);
    }
}
