use std::sync::atomic::{self, AtomicU64};

use tracing::debug;

use crate::{policy::RotationPolicy, pool::Pool};

// Index before the first step. Wraps to 0 on the first advance.
const SENTINEL_INDEX: u32 = u32::MAX;

/// Interleaved weighted round-robin driven by a decaying weight threshold.
///
/// The index walks the pool lap after lap. Every time it wraps to 0 the
/// threshold drops by the gcd of all weights, and when it would reach 0 it
/// starts over at the max weight. An entry is picked when its weight is at
/// least the current threshold.
///
/// Index and threshold live in one atomic word and every step is committed
/// with a compare-and-swap, so concurrent callers never see them torn.
/// Interleaved steps of different callers may duplicate or skip a pick.
pub struct Interleaved {
    state: AtomicU64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct State {
    index: u32,
    weight: u32,
}

/// Pool length as stored in the packed index, `None` if it doesn't fit.
fn packed_len(len: usize) -> Option<u32> {
    u32::try_from(len).ok().filter(|&len| len > 0)
}

impl State {
    fn pack(self) -> u64 {
        (u64::from(self.index) << 32) | u64::from(self.weight)
    }

    fn unpack(word: u64) -> Self {
        Self {
            index: (word >> 32) as u32,
            weight: word as u32,
        }
    }

    /// One rotation step against `pool`, `None` when no entry can win.
    fn advance(self, pool: &Pool) -> Option<Self> {
        let len = packed_len(pool.len())?;
        // modulo keeps a stale index in bounds of whatever pool we observe
        let index = self.index.wrapping_add(1) % len;
        let mut weight = self.weight;

        if index == 0 {
            weight = weight.saturating_sub(pool.gcd_weight());
            if weight == 0 {
                weight = pool.max_weight();
                if weight == 0 {
                    return None;
                }
            }
        }

        Some(Self { index, weight })
    }
}

impl Interleaved {
    pub fn new() -> Self {
        let state = State {
            index: SENTINEL_INDEX,
            weight: 0,
        };

        Self {
            state: AtomicU64::new(state.pack()),
        }
    }

    fn step(&self, pool: &Pool) -> Option<State> {
        let mut current = self.state.load(atomic::Ordering::Acquire);
        loop {
            let next = State::unpack(current).advance(pool)?;
            match self.state.compare_exchange_weak(
                current,
                next.pack(),
                atomic::Ordering::AcqRel,
                atomic::Ordering::Acquire,
            ) {
                Ok(_) => return Some(next),
                Err(actual) => current = actual,
            }
        }
    }

    pub fn next(&self, pool: &Pool) -> Option<usize> {
        if pool.is_empty() {
            return None;
        }

        for _ in 0..pool.len() * 2 {
            let state = self.step(pool)?;
            let index = state.index as usize;
            if pool.weight(index) >= state.weight {
                return Some(index);
            }
        }

        debug!("rotation scan exhausted without a pick");
        None
    }
}

impl Default for Interleaved {
    fn default() -> Self {
        Self::new()
    }
}

impl RotationPolicy for Interleaved {
    fn next(&self, pool: &Pool) -> Option<usize> {
        Interleaved::next(self, pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picks(weights: Vec<u32>, count: usize) -> Vec<Option<usize>> {
        let pool = Pool::new(weights);
        let policy = Interleaved::new();
        (0..count).map(|_| policy.next(&pool)).collect()
    }

    #[test]
    fn test_happy() {
        let result = picks(vec![3, 1, 2], 12);
        let expected = [0, 0, 2, 0, 1, 2, 0, 0, 2, 0, 1, 2].map(Some);
        assert_eq!(result, expected);
    }

    #[test]
    fn test_heavy_first() {
        let result = picks(vec![5, 1, 1], 7);
        let expected = [0, 0, 0, 0, 0, 1, 2].map(Some);
        assert_eq!(result, expected);
    }

    #[test]
    fn test_equal_weights() {
        let result = picks(vec![3, 3, 3], 6);
        let expected = [0, 1, 2, 0, 1, 2].map(Some);
        assert_eq!(result, expected);
    }

    #[test]
    fn test_gcd_steps() {
        // gcd 2: thresholds 4, 2
        let result = picks(vec![4, 2], 6);
        let expected = [0, 0, 1, 0, 0, 1].map(Some);
        assert_eq!(result, expected);
    }

    #[test]
    fn test_one() {
        let result = picks(vec![2], 3);
        assert_eq!(result, [Some(0); 3]);
    }

    #[test]
    fn test_empty() {
        assert_eq!(picks(Vec::new(), 3), [None; 3]);
    }

    #[test]
    fn test_all_zero() {
        assert_eq!(picks(vec![0], 3), [None; 3]);
        assert_eq!(picks(vec![0, 0, 0], 3), [None; 3]);
    }

    #[test]
    fn test_zero_weight_skipped() {
        let result = picks(vec![0, 2, 0, 1], 6);
        let expected = [1, 1, 3, 1, 1, 3].map(Some);
        assert_eq!(result, expected);
    }

    #[test]
    fn test_stale_index_stays_in_bounds() {
        let policy = Interleaved::new();
        let large = Pool::new(vec![1, 1, 1, 1, 1]);
        for _ in 0..4 {
            policy.next(&large);
        }

        let small = Pool::new(vec![1, 1]);
        for _ in 0..10 {
            let index = policy.next(&small).unwrap();
            assert!(index < small.len());
        }
    }

    #[test]
    fn test_packed_len() {
        assert_eq!(packed_len(0), None);
        assert_eq!(packed_len(3), Some(3));
        assert_eq!(packed_len(u32::MAX as usize), Some(u32::MAX));
        #[cfg(target_pointer_width = "64")]
        assert_eq!(packed_len(1usize << 32), None);
    }

    #[test]
    fn test_exhausted_scan_yields_none() {
        let pool = Pool::new(vec![1, 1]);
        let policy = Interleaved::new();
        // threshold far above every weight: 2 * len steps can't bring it down
        let state = State {
            index: 0,
            weight: 100,
        };
        policy.state.store(state.pack(), atomic::Ordering::SeqCst);

        assert_eq!(policy.next(&pool), None);
        let state = State::unpack(policy.state.load(atomic::Ordering::SeqCst));
        assert_eq!(state.weight, 98);
    }

    #[test]
    fn test_threshold_never_exceeds_max() {
        let pool = Pool::new(vec![7, 3, 5]);
        let policy = Interleaved::new();
        for _ in 0..100 {
            policy.next(&pool);
            let state = State::unpack(policy.state.load(atomic::Ordering::SeqCst));
            assert!(state.weight <= pool.max_weight());
            assert!(state.weight > 0);
        }
    }
}
