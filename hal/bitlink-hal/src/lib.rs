//! bitlink Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the data link needs from a
//! board: one output line, one input line with edge notification, and a
//! millisecond clock. Chip-specific HALs (RP2040, ...) implement them so
//! the protocol engine can run unchanged on any board, or against a
//! simulated line in host tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  bitlink-core (transmitter / receiver)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  bitlink-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ bitlink-hal-  │       │  simulated    │
//! │    rp2040     │       │  line (tests) │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Level-set output line
//! - [`gpio::InputPin`], [`gpio::EdgeInput`] - Level-read input line with edge wait
//! - [`timer::MonotonicClock`] - Millisecond time source

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod timer;

// Re-export key traits at crate root for convenience
pub use gpio::{EdgeInput, InputPin, OutputPin};
pub use timer::{MonotonicClock, Stopwatch};
