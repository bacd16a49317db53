//! Millisecond clock backed by the embassy time driver

use bitlink_hal::MonotonicClock;
use embassy_time::Instant;

/// Monotonic clock reading `embassy_time::Instant`
///
/// Zero-sized; the time driver is global.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl MonotonicClock for EmbassyClock {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }
}
