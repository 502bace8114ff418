use std::sync::atomic::{self, AtomicI64};

use crate::{policy::RotationPolicy, pool::Pool};

/// Smooth weighted round-robin (the nginx variant).
///
/// Every pick adds each entry's weight to its running score, takes the
/// entry with the highest score and charges it the total weight. Heavy
/// entries are spread between the light ones instead of bunched up.
pub struct Smooth {
    current_weights: Vec<AtomicI64>,
}

impl Smooth {
    pub fn new(len: usize) -> Self {
        Self {
            current_weights: (0..len).map(|_| AtomicI64::new(0)).collect(),
        }
    }

    pub fn next(&self, pool: &Pool) -> Option<usize> {
        let total_weight = pool.total_weight() as i64;
        if total_weight == 0 {
            return None;
        }

        let mut next: Option<usize> = None;
        let mut max_weight = i64::MIN;
        let entries = pool.weights().iter().zip(&self.current_weights);
        for (index, (&weight, current)) in entries.enumerate() {
            if weight == 0 {
                continue;
            }

            let weight = i64::from(weight);
            let current_weight = current.fetch_add(weight, atomic::Ordering::SeqCst) + weight;

            if current_weight > max_weight {
                max_weight = current_weight;
                next = Some(index);
            }
        }
        let next = next?;

        self.current_weights[next].fetch_sub(total_weight, atomic::Ordering::SeqCst);

        Some(next)
    }
}

impl RotationPolicy for Smooth {
    fn next(&self, pool: &Pool) -> Option<usize> {
        Smooth::next(self, pool)
    }
}
