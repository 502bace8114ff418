use serde::Deserialize;

#[derive(Clone, Deserialize)]
pub struct EntryConfig {
    pub backend: String,
    pub weight: u32,
}

/// A backend handle paired with its weight.
///
/// The handle is opaque: the selector only clones it and compares it
/// for identity. A weight of 0 keeps the entry in the pool without it
/// ever being picked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeightedEntry<H> {
    pub handle: H,
    pub weight: u32,
}

impl<H> WeightedEntry<H> {
    pub fn new(handle: H, weight: u32) -> Self {
        Self { handle, weight }
    }
}

impl From<EntryConfig> for WeightedEntry<String> {
    fn from(config: EntryConfig) -> Self {
        Self::new(config.backend, config.weight)
    }
}
