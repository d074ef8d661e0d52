//! Shuffle and winner-selection rules.

use shuffler_core::error::EngineError;
use shuffler_core::rng::DeterministicRng;
use shuffler_core::slot::PerSlot;

/// Number of prizes drawn per pick.
pub const PRIZE_COUNT: usize = 3;

/// Fisher–Yates shuffle in place: for `i` from the last index down to 1,
/// swap with a uniformly random index in `[0, i]`.
pub fn shuffle<T>(items: &mut [T], rng: &mut dyn DeterministicRng) {
    for i in (1..items.len()).rev() {
        let j = rng.next_index(i + 1);
        items.swap(i, j);
    }
}

/// Draws the three winners from `pool`.
///
/// With at least three entries the winners come from three distinct
/// positions (a partial Fisher–Yates over the positions). Smaller pools
/// are drawn with replacement, one independent draw per slot in prize
/// order.
///
/// # Errors
///
/// Returns `EngineError::EmptyPool` if `pool` is empty.
pub fn draw_winners(
    pool: &[i64],
    rng: &mut dyn DeterministicRng,
) -> Result<PerSlot<i64>, EngineError> {
    if pool.is_empty() {
        return Err(EngineError::EmptyPool);
    }

    if pool.len() >= PRIZE_COUNT {
        let positions = distinct_positions(pool.len(), rng);
        return Ok(PerSlot {
            first: pool[positions[0]],
            second: pool[positions[1]],
            third: pool[positions[2]],
        });
    }

    Ok(PerSlot::from_fn(|_| pool[rng.next_index(pool.len())]))
}

/// Picks `PRIZE_COUNT` distinct positions out of `len`, uniformly.
fn distinct_positions(len: usize, rng: &mut dyn DeterministicRng) -> [usize; PRIZE_COUNT] {
    let mut positions: Vec<usize> = (0..len).collect();
    for k in 0..PRIZE_COUNT {
        let j = k + rng.next_index(len - k);
        positions.swap(k, j);
    }
    [positions[0], positions[1], positions[2]]
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use shuffler_core::rng::SystemRng;
    use shuffler_test_support::{MockRng, SequenceRng};

    use super::*;

    fn sorted(mut values: Vec<i64>) -> Vec<i64> {
        values.sort_unstable();
        values
    }

    #[test]
    fn test_shuffle_preserves_multiset() {
        let mut rng = SystemRng::seeded(11);
        for pool in [vec![], vec![1], vec![10, 20, 30], vec![4, 4, 7, 7, 7, 1, 9]] {
            let mut shuffled = pool.clone();
            shuffle(&mut shuffled, &mut rng);
            assert_eq!(sorted(shuffled), sorted(pool));
        }
    }

    #[test]
    fn test_shuffle_follows_rng_draws() {
        // i = 2 swaps with 0, i = 1 swaps with 1.
        let mut rng = SequenceRng::new(vec![0, 1]);
        let mut pool = vec![10, 20, 30];
        shuffle(&mut pool, &mut rng);
        assert_eq!(pool, vec![30, 20, 10]);
    }

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn test_shuffle_is_uniform_over_permutations() {
        const TRIALS: usize = 60_000;
        let mut rng = SystemRng::seeded(2024);
        let mut counts: HashMap<Vec<i64>, usize> = HashMap::new();
        for _ in 0..TRIALS {
            let mut pool = vec![10, 20, 30];
            shuffle(&mut pool, &mut rng);
            *counts.entry(pool).or_default() += 1;
        }

        assert_eq!(counts.len(), 6);
        let expected = TRIALS as f64 / 6.0;
        let chi_square: f64 = counts
            .values()
            .map(|&observed| {
                let diff = observed as f64 - expected;
                diff * diff / expected
            })
            .sum();
        // 5 degrees of freedom; 20.52 is the 0.999 quantile.
        assert!(chi_square < 20.52, "chi-square too large: {chi_square}");
    }

    #[test]
    fn test_large_pool_draws_distinct_positions() {
        let mut rng = SystemRng::seeded(5);
        let pool = vec![1, 2, 3, 4, 5, 6];
        for _ in 0..500 {
            let winners = draw_winners(&pool, &mut rng).unwrap();
            let mut values = vec![winners.first, winners.second, winners.third];
            values.sort_unstable();
            values.dedup();
            assert_eq!(values.len(), 3);
        }
    }

    #[test]
    fn test_duplicate_values_may_repeat_from_distinct_positions() {
        // Positions 0, 1, 2 hold the same value.
        let winners = draw_winners(&[7, 7, 7], &mut MockRng).unwrap();
        assert_eq!(winners, PerSlot { first: 7, second: 7, third: 7 });
    }

    #[test]
    fn test_large_pool_uses_partial_fisher_yates() {
        // k=0 swaps 0<->2, k=1 keeps 1, k=2 keeps 2 (relative draws 2, 0, 0).
        let mut rng = SequenceRng::new(vec![2, 0, 0]);
        let winners = draw_winners(&[10, 20, 30], &mut rng).unwrap();
        assert_eq!(winners, PerSlot { first: 30, second: 20, third: 10 });
    }

    #[test]
    fn test_single_element_pool_repeats_it() {
        let mut rng = SystemRng::seeded(9);
        let winners = draw_winners(&[5], &mut rng).unwrap();
        assert_eq!(winners, PerSlot { first: 5, second: 5, third: 5 });
    }

    #[test]
    fn test_two_element_pool_draws_with_replacement() {
        let mut rng = SequenceRng::new(vec![1, 1, 0]);
        let winners = draw_winners(&[3, 8], &mut rng).unwrap();
        assert_eq!(winners, PerSlot { first: 8, second: 8, third: 3 });
    }

    #[test]
    fn test_empty_pool_is_rejected() {
        let err = draw_winners(&[], &mut MockRng).unwrap_err();
        assert!(matches!(err, EngineError::EmptyPool));
    }
}
