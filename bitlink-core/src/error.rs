//! Application-facing error types
//!
//! Decode failures never reach the application; the receiver logs them
//! and resynchronizes. Only the sending side reports errors.

/// Errors returned by [`crate::Link`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// Message longer than [`bitlink_protocol::MAX_MESSAGE_LEN`]; nothing was queued
    MessageTooLong {
        /// Rejected message length
        len: usize,
    },
    /// Outbound queue full (non-blocking send only)
    QueueFull,
}

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Half-bit period must be at least 1 ms
    ZeroHalfBit,
    /// Sample correction leaves no time between samples
    SampleIntervalTooShort,
    /// Idle gap too short to separate frames
    IdleGapTooShort,
}
