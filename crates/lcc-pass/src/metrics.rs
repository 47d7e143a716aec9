//! Pass metrics via metrics-rs.
//!
//! Without an installed recorder these calls are no-ops.

use metrics::{Unit, counter, describe_counter};

/// Counter of call sites instrumented across all modules.
pub const INSTRUMENTED_LIBCALLS: &str = "lcc_instrumented_libcalls_total";

/// Register metric descriptions. Call once at startup.
pub fn init() {
    describe_counter!(
        INSTRUMENTED_LIBCALLS,
        Unit::Count,
        "Number of instrumented library calls"
    );
}

/// Record call sites instrumented in one function.
pub fn record_instrumented(count: u64) {
    counter!(INSTRUMENTED_LIBCALLS).increment(count);
}
