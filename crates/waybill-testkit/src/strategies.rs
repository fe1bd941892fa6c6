//! Property test strategies for Waybill types

use proptest::prelude::*;

// Re-export proptest for convenience
pub use proptest;

use crate::scenario::DeliveryScenario;
use waybill_core::identity::{UUID_MAX_LEN, UUID_MIN_LEN};
use waybill_core::{Good, Quantities, TransportStep};

/// Strategy for accepted uuids
pub fn arb_uuid() -> impl Strategy<Value = String> {
    proptest::string::string_regex(&format!("[A-Za-z0-9]{{{UUID_MIN_LEN},{UUID_MAX_LEN}}}"))
        .expect("valid uuid regex")
}

/// Strategy for rejected uuids: too short, too long or containing a symbol
pub fn arb_invalid_uuid() -> impl Strategy<Value = String> {
    prop_oneof![
        proptest::string::string_regex(&format!("[A-Za-z0-9]{{0,{}}}", UUID_MIN_LEN - 1))
            .expect("short uuid regex"),
        proptest::string::string_regex(&format!(
            "[A-Za-z0-9]{{{},{}}}",
            UUID_MAX_LEN + 1,
            UUID_MAX_LEN + 16
        ))
        .expect("long uuid regex"),
        proptest::string::string_regex(&format!(
            "[A-Za-z0-9]{{{UUID_MIN_LEN},{}}}[-_ ./]",
            UUID_MAX_LEN - 1
        ))
        .expect("symbol uuid regex"),
    ]
}

/// Strategy for goods with accepted uuids
pub fn arb_good() -> impl Strategy<Value = Good> {
    (arb_uuid(), "[a-z ]{1,12}", "[0-9]{8,13}").prop_map(|(uuid, name, barcode)| Good {
        uuid,
        name,
        barcode,
    })
}

/// Strategy for a delta over the given good uuids
pub fn arb_quantities(goods: Vec<String>) -> impl Strategy<Value = Quantities> {
    let len = goods.len();
    prop::collection::vec(-1_000i64..1_000, len)
        .prop_map(move |quantities| goods.iter().cloned().zip(quantities).collect())
}

/// Strategy for transport steps
pub fn arb_step() -> impl Strategy<Value = TransportStep> {
    prop::sample::select(TransportStep::ALL.to_vec())
}

/// Strategy for linear scenarios of two to six stops
pub fn arb_scenario() -> impl Strategy<Value = DeliveryScenario> {
    (2usize..=6, 0u64..1_000_000_000_000)
        .prop_map(|(stops, start_ms)| DeliveryScenario::with_stops(stops, start_ms))
}
