pub mod config;
pub mod entry;
pub mod metrics;
pub mod policy;
pub mod pool;
pub mod result;
pub mod selector;
pub mod simulation;
pub mod utils;

pub use entry::WeightedEntry;
pub use result::{Error, Result};
pub use selector::WeightedSelector;
