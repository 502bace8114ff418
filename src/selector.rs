use std::{
    collections::HashSet,
    hash::Hash,
    sync::{Arc, Mutex, PoisonError},
};

use arc_swap::ArcSwap;
use serde::Deserialize;
use tracing::debug;

use crate::{
    entry::WeightedEntry,
    metrics,
    policy::{PolicyFactory, PolicyType, RotationPolicy},
    pool::Pool,
    Error,
};

#[derive(Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub policy: PolicyType,
}

struct Snapshot<H> {
    entries: Vec<WeightedEntry<H>>,
    pool: Pool,
    rotation: Box<dyn RotationPolicy + Send + Sync>,
}

impl<H> Snapshot<H> {
    fn new(policy: PolicyType, entries: Vec<WeightedEntry<H>>) -> Self {
        let pool = Pool::new(entries.iter().map(|e| e.weight).collect());
        let rotation = PolicyFactory::make(policy, &pool);

        Self {
            entries,
            pool,
            rotation,
        }
    }
}

/// Picks one backend handle out of a weighted pool on every call.
///
/// Selection works on an immutable snapshot of the pool. Adding or
/// removing an entry builds a new snapshot with fresh rotation state and
/// swaps it in, so a `select` running at the same time sees either the
/// old pool or the new one, never a mix.
pub struct WeightedSelector<H> {
    policy: PolicyType,
    snapshot: ArcSwap<Snapshot<H>>,
    // serializes rebuilds, readers never take it
    membership: Mutex<()>,
}

impl<H> WeightedSelector<H>
where
    H: Clone + Eq + Hash,
{
    pub fn new(entries: impl IntoIterator<Item = WeightedEntry<H>>) -> Self {
        Self::with_policy(PolicyType::default(), entries)
    }

    pub fn with_policy(
        policy: PolicyType,
        entries: impl IntoIterator<Item = WeightedEntry<H>>,
    ) -> Self {
        let snapshot = Snapshot::new(policy, entries.into_iter().collect());

        Self {
            policy,
            snapshot: ArcSwap::from_pointee(snapshot),
            membership: Mutex::new(()),
        }
    }

    pub fn from_config(
        config: &Config,
        entries: impl IntoIterator<Item = WeightedEntry<H>>,
    ) -> Self {
        Self::with_policy(config.policy, entries)
    }

    /// Returns the next backend, or [`Error::NoBackendAvailable`] when the
    /// pool is empty or nothing in it has a positive weight.
    pub fn select(&self) -> crate::Result<H> {
        let snapshot = self.snapshot.load();

        match snapshot.rotation.next(&snapshot.pool) {
            Some(index) => {
                metrics::SELECTED.inc();
                Ok(snapshot.entries[index].handle.clone())
            }
            None => {
                metrics::NONE_AVAILABLE.inc();
                Err(Error::NoBackendAvailable)
            }
        }
    }

    pub fn add_entry(&self, handle: H, weight: u32) {
        let _guard = self.membership.lock().unwrap_or_else(PoisonError::into_inner);

        let mut entries = self.snapshot.load().entries.clone();
        entries.push(WeightedEntry::new(handle, weight));

        self.publish(entries);
        metrics::MEMBERSHIP_CHANGES_TOTAL.with_label_values(&["add"]).inc();
        debug!("entry added with weight {weight}");
    }

    /// Removes the first entry with this handle.
    ///
    /// Returns `false` and leaves the pool (and its rotation) untouched
    /// when there's no such entry.
    pub fn remove_entry(&self, handle: &H) -> bool {
        let _guard = self.membership.lock().unwrap_or_else(PoisonError::into_inner);

        let current = self.snapshot.load();
        let Some(position) = current.entries.iter().position(|e| &e.handle == handle) else {
            debug!("entry to remove is not in the pool");
            return false;
        };

        let mut entries = current.entries.clone();
        let removed = entries.remove(position);

        self.publish(entries);
        metrics::MEMBERSHIP_CHANGES_TOTAL.with_label_values(&["remove"]).inc();
        debug!("entry removed, it had weight {}", removed.weight);
        true
    }

    /// Distinct handles currently in the pool.
    pub fn all_handles(&self) -> HashSet<H> {
        self.snapshot
            .load()
            .entries
            .iter()
            .map(|e| e.handle.clone())
            .collect()
    }

    pub fn entries(&self) -> Vec<WeightedEntry<H>> {
        self.snapshot.load().entries.clone()
    }

    pub fn len(&self) -> usize {
        self.snapshot.load().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_weight(&self) -> u32 {
        self.snapshot.load().pool.max_weight()
    }

    pub fn gcd_weight(&self) -> u32 {
        self.snapshot.load().pool.gcd_weight()
    }

    pub fn policy(&self) -> PolicyType {
        self.policy
    }

    // caller holds the membership lock
    fn publish(&self, entries: Vec<WeightedEntry<H>>) {
        let snapshot = Snapshot::new(self.policy, entries);
        self.snapshot.store(Arc::new(snapshot));
    }
}

impl<H> Default for WeightedSelector<H>
where
    H: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
