//! bitlink core logic
//!
//! Board-agnostic half of the link: everything that runs on top of the
//! `bitlink-hal` traits and the `bitlink-protocol` codecs.
//!
//! # Architecture
//!
//! ```text
//! application ──Link::send──▶ outbound queue ──▶ Transmitter ──▶ output pin
//!                                                                   │
//!                                                                 wire
//!                                                                   │
//! application ◀─Link::receive── inbound queue ◀── Receiver ◀── input pin
//! ```
//!
//! [`Transmitter`] and [`Receiver`] each own one line and loop forever in
//! their own task. The queues are [`LinkQueues`], which can be placed in a
//! `static` and shared by reference.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod config;
pub mod error;
pub mod link;
pub mod queue;
pub mod receiver;
pub mod transmitter;

#[cfg(test)]
mod sim;

pub use config::LinkConfig;
pub use error::{ConfigError, LinkError};
pub use link::Link;
pub use queue::{LinkQueues, MessageQueue, QUEUE_DEPTH};
pub use receiver::Receiver;
pub use transmitter::Transmitter;

pub use bitlink_protocol::{DecodeError, Message, MAX_MESSAGE_LEN};
