//! RP2040-specific HAL for the bitlink firmware
//!
//! This crate provides RP2040 implementations of the shared
//! `bitlink-hal` traits:
//!
//! - Output and edge-aware input lines over `embassy-rp` GPIO
//! - Millisecond clock over `embassy-time`
//! - Pin bank for config-driven pin assignment

#![no_std]

pub mod gpio;
pub mod pins;
pub mod timer;

pub use gpio::{parse_pin_string, LinkInput, LinkOutput, PinSpec, GPIO_COUNT};
pub use pins::{PinBank, PinError};
pub use timer::EmbassyClock;
