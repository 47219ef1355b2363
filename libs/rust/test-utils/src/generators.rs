//! Shared proptest generators for auth domain types.

use proptest::prelude::*;
use std::time::Duration;

/// Generate non-empty client display names.
pub fn client_name_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 ]{0,30}".prop_map(|s| s.trim().to_string()).prop_filter(
        "non-empty after trim",
        |s| !s.is_empty(),
    )
}

/// Generate usernames in email form.
pub fn username_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9._%+-]{1,16}@[a-z0-9-]{1,12}\\.[a-z]{2,4}"
}

/// Generate scope strings.
pub fn scope_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("read".to_string()),
        Just("write".to_string()),
        Just("read write".to_string()),
        Just("todos:read todos:write".to_string()),
    ]
}

/// Generate plausible but never-issued bearer token values.
pub fn bogus_token_strategy() -> impl Strategy<Value = String> {
    "[0-9a-f]{64}"
}

/// Generate access-token TTLs (1 second to 24 hours).
pub fn ttl_strategy() -> impl Strategy<Value = Duration> {
    (1u64..86400).prop_map(Duration::from_secs)
}

/// Generate small clock offsets in seconds, for expiry boundary sweeps.
pub fn clock_offset_strategy() -> impl Strategy<Value = i64> {
    -3600i64..3600
}
