//! Monotonic clock for bounded waits.
//!
//! The contract layer owns no hardware timer.  The embedding platform
//! registers a nanosecond counter during bring-up; until then every accessor
//! returns `0` and drivers degrade bounded waits to a single immediate poll.
//!
//! All functions are safe to call from any context.

use crate::once_lock::OnceLock;

/// Platform time source: monotonic nanoseconds since an arbitrary origin.
pub type TimeSource = fn() -> u64;

static TIME_SOURCE: OnceLock<TimeSource> = OnceLock::new();

/// Register the platform time source.  The first registration wins; later
/// calls are no-ops.
pub fn register_time_source(source: TimeSource) {
    TIME_SOURCE.call_once(|| source);
}

/// `true` once a time source has been registered.
pub fn time_source_registered() -> bool {
    TIME_SOURCE.is_completed()
}

/// Returns the monotonic clock value in nanoseconds.
///
/// Returns `0` if no time source has been registered yet.
#[inline]
pub fn monotonic_ns() -> u64 {
    match TIME_SOURCE.get() {
        Some(source) => source(),
        None => 0,
    }
}

/// Returns monotonic time in milliseconds.
///
/// Convenience wrapper around [`monotonic_ns`] with millisecond granularity.
#[inline]
pub fn uptime_ms() -> u64 {
    monotonic_ns() / 1_000_000
}
