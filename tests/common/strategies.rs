//! Proptest strategies for workflow inputs.

use proptest::prelude::*;

/// Result of one execution attempt: `true` succeeds, `false` fails
pub fn execution_sequence_strategy() -> impl Strategy<Value = Vec<bool>> {
    prop::collection::vec(any::<bool>(), 1..6)
}

/// Token charge of one completion call
pub fn token_count_strategy() -> impl Strategy<Value = u64> {
    1u64..500
}

/// SQL-ish single-line bodies without backticks
pub fn sql_body_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_*(), =<>']{1,40}".prop_map(|s| format!("SELECT {s}"))
}

/// Candidate table names, some of which exist in the retail catalog
pub fn table_name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("customers".to_string()),
        Just("orders".to_string()),
        Just("products".to_string()),
        "[a-z_]{1,12}",
    ]
}
