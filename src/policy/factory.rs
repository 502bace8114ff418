use serde::Deserialize;

use crate::{policy::RotationPolicy, pool::Pool};

use super::{Interleaved, Smooth};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyType {
    /// Gcd-decay rotation; heavy entries are picked in runs.
    #[default]
    Interleaved,
    /// Spreads heavy entries between the light ones, e.g. `a a b a c a a`
    /// for weights 5, 1, 1.
    Smooth,
}

pub struct PolicyFactory;

impl PolicyFactory {
    /// Builds a policy with fresh rotation state sized for `pool`.
    pub fn make(policy: PolicyType, pool: &Pool) -> Box<dyn RotationPolicy + Send + Sync> {
        match policy {
            PolicyType::Interleaved => Box::new(Interleaved::new()),
            PolicyType::Smooth => Box::new(Smooth::new(pool.len())),
        }
    }
}
