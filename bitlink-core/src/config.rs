//! Link timing configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default half-bit period in milliseconds
pub const DEFAULT_HALF_BIT_MS: u32 = 5;

/// Default extra hold on the first half of each bit
pub const DEFAULT_FIRST_HALF_EXTRA_MS: u32 = 1;

/// Default idle time before each preamble, in bit periods
pub const DEFAULT_IDLE_GAP_BITS: u32 = 3;

/// Shortest usable idle gap, in bit periods
pub const MIN_IDLE_GAP_BITS: u32 = 2;

/// Timing parameters shared by both ends of the link
///
/// The sender holds the first half of every bit for
/// `half_bit_ms + first_half_extra_ms` and the second half for
/// `half_bit_ms`, and leaves the line low for `idle_gap_bits` periods
/// before every preamble. The receiver measures the actual period from the
/// preamble; it uses the nominal period only to tell the gap between
/// frames from the edges inside one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkConfig {
    /// Half-bit period in milliseconds
    pub half_bit_ms: u32,
    /// Extra milliseconds added to the first half of each bit
    pub first_half_extra_ms: u32,
    /// Added to the recovered period between consecutive samples
    pub sample_correction_ms: i32,
    /// Bit periods of idle-low line before each preamble
    pub idle_gap_bits: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            half_bit_ms: DEFAULT_HALF_BIT_MS,
            first_half_extra_ms: DEFAULT_FIRST_HALF_EXTRA_MS,
            sample_correction_ms: 0,
            idle_gap_bits: DEFAULT_IDLE_GAP_BITS,
        }
    }
}

impl LinkConfig {
    /// Duration of the first half of a bit cell
    pub fn first_half_ms(&self) -> u32 {
        self.half_bit_ms + self.first_half_extra_ms
    }

    /// Full bit period produced by the sender
    pub fn bit_period_ms(&self) -> u32 {
        self.first_half_ms() + self.half_bit_ms
    }

    /// Idle-low time the sender leaves before each preamble
    pub fn idle_gap_ms(&self) -> u32 {
        self.idle_gap_bits.saturating_mul(self.bit_period_ms())
    }

    /// Silence that must precede the first edge of a preamble
    ///
    /// Every bit cell has a transition in its middle, so inside a frame the
    /// line never stays still for more than one period. Two periods of
    /// silence can only be the gap between frames.
    pub fn preamble_quiet_ms(&self) -> u32 {
        MIN_IDLE_GAP_BITS.saturating_mul(self.bit_period_ms())
    }

    /// Time between samples for a recovered bit period
    pub fn sample_interval_ms(&self, period_ms: u32) -> u32 {
        let interval = i64::from(period_ms) + i64::from(self.sample_correction_ms);
        interval.clamp(1, i64::from(u32::MAX)) as u32
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.half_bit_ms == 0 {
            return Err(ConfigError::ZeroHalfBit);
        }
        let interval = i64::from(self.bit_period_ms()) + i64::from(self.sample_correction_ms);
        if interval < 1 {
            return Err(ConfigError::SampleIntervalTooShort);
        }
        if self.idle_gap_bits < MIN_IDLE_GAP_BITS {
            return Err(ConfigError::IdleGapTooShort);
        }
        Ok(())
    }
}
