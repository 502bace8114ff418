use std::{collections::HashMap, sync::Arc, time::Duration};

use serde::Deserialize;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::{utils, WeightedSelector};

#[derive(Clone, Deserialize)]
pub struct Config {
    pub workers: usize,
    pub requests_per_worker: usize,
    pub churn: Option<ChurnConfig>,
}

/// Periodically takes one backend out of the pool and puts it back,
/// the way a health sweep would.
#[derive(Clone, Deserialize)]
pub struct ChurnConfig {
    pub backend: String,
    #[serde(with = "utils::serde_millis")]
    pub interval: Duration,
}

#[derive(Debug, Default)]
pub struct Report {
    pub counts: HashMap<String, usize>,
    pub misses: usize,
}

impl Report {
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn share(&self, backend: &str) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.counts.get(backend).copied().unwrap_or(0) as f64 / total as f64
    }

    fn merge(&mut self, counts: HashMap<String, usize>, misses: usize) {
        for (backend, count) in counts {
            *self.counts.entry(backend).or_insert(0) += count;
        }
        self.misses += misses;
    }
}

/// Drives a selector from many tasks at once.
pub struct Simulation {
    config: Config,
    selector: Arc<WeightedSelector<String>>,
}

impl Simulation {
    pub fn new(config: Config, selector: Arc<WeightedSelector<String>>) -> Self {
        Self { config, selector }
    }

    pub async fn run(&self) -> crate::Result<Report> {
        let (stop_tx, stop_rx) = watch::channel(false);

        let churn = self.config.churn.clone().map(|config| {
            let churn = Churn::new(config, self.selector.clone());
            tokio::spawn(async move { churn.run(stop_rx).await })
        });

        let mut workers = Vec::with_capacity(self.config.workers);
        for worker in 0..self.config.workers {
            let selector = self.selector.clone();
            let requests = self.config.requests_per_worker;
            workers.push(tokio::spawn(async move {
                let mut counts: HashMap<String, usize> = HashMap::new();
                let mut misses = 0;
                for i in 0..requests {
                    match selector.select() {
                        Ok(backend) => *counts.entry(backend).or_insert(0) += 1,
                        Err(_) => misses += 1,
                    }
                    if i % 64 == 63 {
                        tokio::task::yield_now().await;
                    }
                }
                debug!("worker {worker} done, {misses} misses");
                (counts, misses)
            }));
        }

        let mut report = Report::default();
        for worker in workers {
            let (counts, misses) = worker.await?;
            report.merge(counts, misses);
        }

        // the receiver may be gone already if churn is disabled
        let _ = stop_tx.send(true);
        if let Some(churn) = churn {
            churn.await?;
        }

        info!(
            "simulation finished: {} selections, {} misses",
            report.total(),
            report.misses
        );

        Ok(report)
    }
}

struct Churn {
    config: ChurnConfig,
    selector: Arc<WeightedSelector<String>>,
    // weight of the backend while it's out of the pool
    parked: Option<u32>,
}

impl Churn {
    fn new(config: ChurnConfig, selector: Arc<WeightedSelector<String>>) -> Self {
        Self {
            config,
            selector,
            parked: None,
        }
    }

    async fn run(mut self, mut stop: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.config.interval) => self.toggle(),
                _ = stop.changed() => break,
            }
        }

        if let Some(weight) = self.parked.take() {
            self.selector.add_entry(self.config.backend.clone(), weight);
        }
    }

    fn toggle(&mut self) {
        let backend = &self.config.backend;

        if let Some(weight) = self.parked.take() {
            debug!("bringing {backend} back with weight {weight}");
            self.selector.add_entry(backend.clone(), weight);
            return;
        }

        let weight = self
            .selector
            .entries()
            .into_iter()
            .find(|e| &e.handle == backend)
            .map(|e| e.weight);

        if let Some(weight) = weight {
            if self.selector.remove_entry(backend) {
                debug!("taking {backend} out of the pool");
                self.parked = Some(weight);
            }
        }
    }
}
