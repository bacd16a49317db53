//! bitlink wire protocol
//!
//! This crate defines everything about the link that does not touch
//! hardware: the frame layout, the CRC-16 integrity check, the bit
//! serialization and Manchester-style level encoding used by the sender,
//! and the clock recovery plus bit-level decoder used by the receiver.
//!
//! # Frame Overview
//!
//! Every frame is a sequence of bytes, sent MSB first:
//! ```text
//! ┌──────────┬───────┬────────────┬────────┬─────────────┬────────┬────────┬─────┐
//! │ PREAMBLE │ START │ TYPE/FLAGS │ LENGTH │ PAYLOAD     │ CRC HI │ CRC LO │ END │
//! │ 0x55     │ 0x7E  │ 0x00       │ 1B     │ 0–80B       │ 1B     │ 1B     │0x7E │
//! └──────────┴───────┴────────────┴────────┴─────────────┴────────┴────────┴─────┘
//! ```
//!
//! The CRC covers TYPE/FLAGS, LENGTH and PAYLOAD. Each bit occupies one
//! bit cell split in two halves: `1` is high-then-low, `0` is
//! low-then-high, so the preamble's alternating bits produce eight evenly
//! spaced edges from which the receiver measures the bit period.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod clock;
pub mod crc;
pub mod decoder;
pub mod encoder;
pub mod frame;

pub use clock::{sample_offset_ms, BitTiming, ClockRecovery, PREAMBLE_EDGES};
pub use crc::{compute_crc16, Crc16Digest};
pub use decoder::{DecodeError, DecoderPhase, FrameDecoder};
pub use encoder::{manchester_levels, FrameBits};
pub use frame::{
    Frame, FrameError, Message, END_FLAG, MAX_FRAME_SIZE, MAX_MESSAGE_LEN, PREAMBLE, START_FLAG,
    TYPE_FLAGS_NONE,
};
