use lazy_static::lazy_static;
use prometheus::{opts, register_int_counter_vec, Encoder, IntCounter, IntCounterVec, TextEncoder};

lazy_static! {
    pub static ref SELECTIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        opts!("selector_selections_total", "selection outcomes"),
        &["outcome"]
    )
    .expect("Can't create metric");
    pub static ref MEMBERSHIP_CHANGES_TOTAL: IntCounterVec = register_int_counter_vec!(
        opts!("selector_membership_changes_total", "pool membership changes"),
        &["op"]
    )
    .expect("Can't create metric");

    // resolved once, select() is on the hot path
    pub static ref SELECTED: IntCounter = SELECTIONS_TOTAL.with_label_values(&["selected"]);
    pub static ref NONE_AVAILABLE: IntCounter = SELECTIONS_TOTAL.with_label_values(&["none"]);
}

pub fn gather() -> crate::Result<Vec<u8>> {
    let mut buffer = Vec::new();

    let encoder = TextEncoder::new();
    encoder.encode(&prometheus::gather(), &mut buffer)?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather() {
        SELECTED.inc();
        MEMBERSHIP_CHANGES_TOTAL.with_label_values(&["add"]).inc();

        let text = String::from_utf8(gather().unwrap()).unwrap();
        assert!(text.contains("selector_selections_total"));
        assert!(text.contains("selector_membership_changes_total"));
    }
}
