//! Millisecond time source
//!
//! Clock recovery only needs a monotonic millisecond counter. The
//! start/reset/read timer the link is specified against is provided by
//! [`Stopwatch`] on top of any [`MonotonicClock`].

/// Monotonic millisecond clock
pub trait MonotonicClock {
    /// Milliseconds since an arbitrary, fixed epoch
    fn now_ms(&self) -> u64;
}

/// Interval timer built from clock readings
///
/// Stores only the instant it was (re)started, so it is `Copy` and owns no
/// hardware.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Stopwatch {
    started_at: Option<u64>,
}

impl Stopwatch {
    /// Create a stopped stopwatch
    pub const fn new() -> Self {
        Self { started_at: None }
    }

    /// Start (or restart) timing at `now_ms`
    pub fn start(&mut self, now_ms: u64) {
        self.started_at = Some(now_ms);
    }

    /// Restart timing at `now_ms`, keeping the stopwatch running
    pub fn reset(&mut self, now_ms: u64) {
        self.start(now_ms);
    }

    /// Stop timing
    pub fn stop(&mut self) {
        self.started_at = None;
    }

    /// Check whether the stopwatch has been started
    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Milliseconds since the last start/reset, or 0 when stopped
    pub fn read_ms(&self, now_ms: u64) -> u64 {
        match self.started_at {
            Some(start) => now_ms.saturating_sub(start),
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopped_reads_zero() {
        let sw = Stopwatch::new();
        assert!(!sw.is_running());
        assert_eq!(sw.read_ms(1234), 0);
    }

    #[test]
    fn test_start_and_reset() {
        let mut sw = Stopwatch::new();
        sw.start(100);
        assert_eq!(sw.read_ms(111), 11);

        sw.reset(111);
        assert_eq!(sw.read_ms(122), 11);

        sw.stop();
        assert_eq!(sw.read_ms(500), 0);
    }

    #[test]
    fn test_clock_going_backwards_saturates() {
        let mut sw = Stopwatch::new();
        sw.start(50);
        assert_eq!(sw.read_ms(40), 0);
    }
}
