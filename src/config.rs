use serde::Deserialize;

use crate::{entry, selector, simulation};

#[derive(Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub selector: selector::Config,
    pub simulation: simulation::Config,
    pub backends: Vec<entry::EntryConfig>,
}
