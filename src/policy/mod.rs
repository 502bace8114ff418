pub mod factory;
pub mod interleaved;
pub mod smooth;

use crate::pool::Pool;

pub use factory::{PolicyFactory, PolicyType};
pub use interleaved::Interleaved;
pub use smooth::Smooth;

/// Picks the next entry of a pool snapshot.
///
/// Returns an index into `pool`, or `None` when no entry is eligible.
/// The rotation state belongs to the policy instance and is shared by
/// every caller selecting against the same snapshot.
pub trait RotationPolicy {
    fn next(&self, pool: &Pool) -> Option<usize>;
}
