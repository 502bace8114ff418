pub mod math;
pub mod serde_millis;
