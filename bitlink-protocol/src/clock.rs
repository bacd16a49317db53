//! Clock recovery from the preamble.
//!
//! The sender's preamble byte `0x55`, level-encoded from an idle-low line,
//! produces one transition in the middle of each of its eight bit cells.
//! Those eight edges are seven bit periods apart; averaging the seven
//! intervals gives the sender's bit period without a shared clock.

use bitlink_hal::Stopwatch;

/// Number of edges that make up one preamble
pub const PREAMBLE_EDGES: u8 = 8;

/// Bit timing recovered from one preamble
///
/// Produced once per preamble and consumed by the frame that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BitTiming {
    /// Estimated bit period in milliseconds
    pub period_ms: u32,
    /// Half of the bit period (integer division)
    pub half_period_ms: u32,
    /// Bias added to the first sample so it lands after the cell edge
    pub sample_offset_ms: u32,
}

impl BitTiming {
    /// Build the estimate from the summed inter-edge intervals
    ///
    /// The period is the rounded mean interval.
    pub fn from_intervals(total_ms: u32, intervals: u32) -> Self {
        let intervals = intervals.max(1);
        let period_ms = total_ms.saturating_add(intervals / 2) / intervals;
        Self::from_period(period_ms)
    }

    /// Build the estimate for a known bit period
    pub fn from_period(period_ms: u32) -> Self {
        let half_period_ms = period_ms / 2;
        Self {
            period_ms,
            half_period_ms,
            sample_offset_ms: sample_offset_ms(half_period_ms),
        }
    }

    /// Delay from the last preamble edge to the first sample
    ///
    /// The last preamble edge sits mid-cell, so half a period later the
    /// start flag begins; the offset moves the sample off that boundary.
    pub fn first_sample_delay_ms(&self) -> u32 {
        self.half_period_ms + self.sample_offset_ms
    }
}

/// Sampling offset for a given half period
///
/// A fifth of the half period, capped at 1 ms.
#[inline]
#[must_use]
pub fn sample_offset_ms(half_period_ms: u32) -> u32 {
    (half_period_ms / 5).min(1)
}

/// Preamble edge timing accumulator
///
/// Feed every rising and falling edge of the input line to
/// [`ClockRecovery::on_edge`]. The first edge starts the interval timer,
/// each following edge adds its interval to the sum and restarts the
/// timer. The eighth edge completes recovery; later edges are ignored
/// until [`ClockRecovery::reset`].
///
/// With a quiet time set, an edge only starts a preamble when the line
/// was still for at least that long before it. Edges inside a frame come
/// at most one bit period apart, so a receiver armed in the middle of a
/// frame skips the rest of it instead of mistaking data for a preamble.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockRecovery {
    edges: u8,
    total_ms: u32,
    interval: Stopwatch,
    quiet_ms: u32,
    last_edge_ms: u64,
}

impl ClockRecovery {
    /// Create a unit that accepts any edge as the start of a preamble
    pub const fn new() -> Self {
        Self::with_quiet_time(0)
    }

    /// Create a unit that needs `quiet_ms` of silence before a preamble
    pub const fn with_quiet_time(quiet_ms: u32) -> Self {
        Self {
            edges: 0,
            total_ms: 0,
            interval: Stopwatch::new(),
            quiet_ms,
            last_edge_ms: 0,
        }
    }

    /// Forget any partial preamble
    pub fn reset(&mut self) {
        *self = Self::with_quiet_time(self.quiet_ms);
    }

    /// Start watching at `now_ms`
    ///
    /// The line is assumed busy up to this instant, so the quiet time is
    /// measured from here until a longer silence is seen.
    pub fn arm(&mut self, now_ms: u64) {
        self.reset();
        self.last_edge_ms = now_ms;
    }

    /// Number of edges counted so far
    pub fn edges(&self) -> u8 {
        self.edges
    }

    /// Sum of the measured intervals so far
    pub fn total_ms(&self) -> u32 {
        self.total_ms
    }

    /// Check whether a full preamble has been observed
    pub fn is_complete(&self) -> bool {
        self.edges >= PREAMBLE_EDGES
    }

    /// Record an edge seen at `now_ms`
    ///
    /// Returns the timing estimate on the edge that completes the preamble.
    pub fn on_edge(&mut self, now_ms: u64) -> Option<BitTiming> {
        if self.is_complete() {
            return None;
        }

        if self.edges == 0 {
            let silent_ms = now_ms.saturating_sub(self.last_edge_ms);
            self.last_edge_ms = now_ms;
            if silent_ms < u64::from(self.quiet_ms) {
                return None;
            }
            self.total_ms = 0;
            self.interval.start(now_ms);
        } else {
            let elapsed = self.interval.read_ms(now_ms);
            self.total_ms = self
                .total_ms
                .saturating_add(u32::try_from(elapsed).unwrap_or(u32::MAX));
            self.interval.reset(now_ms);
        }
        self.edges += 1;

        if self.is_complete() {
            self.interval.stop();
            Some(BitTiming::from_intervals(
                self.total_ms,
                u32::from(PREAMBLE_EDGES - 1),
            ))
        } else {
            None
        }
    }
}
