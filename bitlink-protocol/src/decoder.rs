//! Bit-level frame decoder.
//!
//! Once the clock has been recovered from the preamble, the receiver
//! samples one bit per bit period and feeds it to [`FrameDecoder::push_bit`].
//! The decoder walks the frame layout field by field, checks both
//! delimiters and the CRC, and hands out the payload only when the whole
//! frame is valid. Any failure drops the partial frame and returns the
//! decoder to waiting for the next preamble.

use core::mem;

use crate::frame::{Frame, Message, END_FLAG, MAX_MESSAGE_LEN, START_FLAG};

/// Reasons a frame is dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Byte after the preamble was not the start flag
    BadStartFlag(u8),
    /// Length byte larger than a message can hold
    LengthOverflow(u8),
    /// CRC received does not match the CRC of the received span
    CrcMismatch {
        /// CRC computed over TYPE/FLAGS, LENGTH and PAYLOAD
        expected: u16,
        /// CRC read from the line
        found: u16,
    },
    /// Byte after the CRC was not the end flag
    BadEndFlag(u8),
}

impl DecodeError {
    /// Frame structure problem (delimiters or length)
    pub fn is_framing(&self) -> bool {
        !self.is_integrity()
    }

    /// CRC mismatch
    pub fn is_integrity(&self) -> bool {
        matches!(self, DecodeError::CrcMismatch { .. })
    }
}

/// Observable decoder position, without the per-state data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecoderPhase {
    /// Idle; clock recovery is in charge of the line
    AwaitingPreamble,
    /// Collecting the start flag
    AwaitingStart,
    /// Collecting the type/flags byte
    ReadingHeaderType,
    /// Collecting the length byte
    ReadingHeaderLength,
    /// Collecting payload bytes
    ReadingPayload,
    /// Collecting the 16-bit CRC
    ReadingCrc,
    /// Collecting the end flag
    AwaitingEnd,
}

/// MSB-first shift register
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct BitAccumulator {
    value: u16,
    count: u8,
}

impl BitAccumulator {
    const fn new() -> Self {
        Self { value: 0, count: 0 }
    }

    /// Shift in one bit; yields the value once `width` bits are collected
    fn push(&mut self, bit: bool, width: u8) -> Option<u16> {
        self.value = (self.value << 1) | u16::from(bit);
        self.count += 1;
        if self.count == width {
            let value = self.value;
            *self = Self::new();
            Some(value)
        } else {
            None
        }
    }
}

/// Decoder states, each carrying only the data valid in that state
#[derive(Debug, Clone)]
enum DecoderState {
    AwaitingPreamble,
    AwaitingStart {
        bits: BitAccumulator,
    },
    ReadingHeaderType {
        bits: BitAccumulator,
    },
    ReadingHeaderLength {
        type_flags: u8,
        bits: BitAccumulator,
    },
    ReadingPayload {
        type_flags: u8,
        length: u8,
        payload: Message,
        bits: BitAccumulator,
    },
    ReadingCrc {
        type_flags: u8,
        payload: Message,
        bits: BitAccumulator,
    },
    AwaitingEnd {
        payload: Message,
        bits: BitAccumulator,
    },
}

type Step = (DecoderState, Result<Option<Message>, DecodeError>);

/// State machine assembling one frame from sampled bits
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    state: DecoderState,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    /// Create a decoder waiting for a preamble
    pub const fn new() -> Self {
        Self {
            state: DecoderState::AwaitingPreamble,
        }
    }

    /// Drop any partial frame and wait for the next preamble
    pub fn reset(&mut self) {
        self.state = DecoderState::AwaitingPreamble;
    }

    /// Clock recovered: the next bit is the first bit of the start flag
    pub fn synchronize(&mut self) {
        self.state = DecoderState::AwaitingStart {
            bits: BitAccumulator::new(),
        };
    }

    /// Current position in the frame
    pub fn phase(&self) -> DecoderPhase {
        match self.state {
            DecoderState::AwaitingPreamble => DecoderPhase::AwaitingPreamble,
            DecoderState::AwaitingStart { .. } => DecoderPhase::AwaitingStart,
            DecoderState::ReadingHeaderType { .. } => DecoderPhase::ReadingHeaderType,
            DecoderState::ReadingHeaderLength { .. } => DecoderPhase::ReadingHeaderLength,
            DecoderState::ReadingPayload { .. } => DecoderPhase::ReadingPayload,
            DecoderState::ReadingCrc { .. } => DecoderPhase::ReadingCrc,
            DecoderState::AwaitingEnd { .. } => DecoderPhase::AwaitingEnd,
        }
    }

    /// Check if the decoder is waiting for a preamble
    pub fn is_idle(&self) -> bool {
        matches!(self.state, DecoderState::AwaitingPreamble)
    }

    /// Feed one sampled bit
    ///
    /// Returns `Ok(Some(message))` when a complete valid frame has been
    /// read, `Ok(None)` when more bits are needed, or `Err` when the frame
    /// was dropped. After `Ok(Some(_))` or `Err(_)` the decoder is back to
    /// [`DecoderPhase::AwaitingPreamble`]. Bits fed while awaiting a
    /// preamble are ignored.
    pub fn push_bit(&mut self, bit: bool) -> Result<Option<Message>, DecodeError> {
        let state = mem::replace(&mut self.state, DecoderState::AwaitingPreamble);
        let (next, outcome) = Self::step(state, bit);
        self.state = next;
        outcome
    }

    fn step(state: DecoderState, bit: bool) -> Step {
        use DecoderState::*;

        match state {
            AwaitingPreamble => (AwaitingPreamble, Ok(None)),

            AwaitingStart { mut bits } => match bits.push(bit, 8) {
                None => (AwaitingStart { bits }, Ok(None)),
                Some(value) if value as u8 == START_FLAG => (
                    ReadingHeaderType {
                        bits: BitAccumulator::new(),
                    },
                    Ok(None),
                ),
                Some(value) => (AwaitingPreamble, Err(DecodeError::BadStartFlag(value as u8))),
            },

            ReadingHeaderType { mut bits } => match bits.push(bit, 8) {
                None => (ReadingHeaderType { bits }, Ok(None)),
                Some(value) => (
                    ReadingHeaderLength {
                        type_flags: value as u8,
                        bits: BitAccumulator::new(),
                    },
                    Ok(None),
                ),
            },

            ReadingHeaderLength {
                type_flags,
                mut bits,
            } => match bits.push(bit, 8) {
                None => (ReadingHeaderLength { type_flags, bits }, Ok(None)),
                Some(value) => Self::start_payload(type_flags, value as u8),
            },

            ReadingPayload {
                type_flags,
                length,
                mut payload,
                mut bits,
            } => match bits.push(bit, 8) {
                None => (
                    ReadingPayload {
                        type_flags,
                        length,
                        payload,
                        bits,
                    },
                    Ok(None),
                ),
                Some(value) => {
                    if payload.push(value as u8).is_err() {
                        return (AwaitingPreamble, Err(DecodeError::LengthOverflow(length)));
                    }
                    if payload.len() == usize::from(length) {
                        (
                            ReadingCrc {
                                type_flags,
                                payload,
                                bits: BitAccumulator::new(),
                            },
                            Ok(None),
                        )
                    } else {
                        (
                            ReadingPayload {
                                type_flags,
                                length,
                                payload,
                                bits,
                            },
                            Ok(None),
                        )
                    }
                }
            },

            ReadingCrc {
                type_flags,
                payload,
                mut bits,
            } => match bits.push(bit, 16) {
                None => (
                    ReadingCrc {
                        type_flags,
                        payload,
                        bits,
                    },
                    Ok(None),
                ),
                Some(found) => {
                    let expected =
                        Frame::calculate_checksum(type_flags, payload.len() as u8, &payload);
                    if found == expected {
                        (
                            AwaitingEnd {
                                payload,
                                bits: BitAccumulator::new(),
                            },
                            Ok(None),
                        )
                    } else {
                        (
                            AwaitingPreamble,
                            Err(DecodeError::CrcMismatch { expected, found }),
                        )
                    }
                }
            },

            AwaitingEnd { payload, mut bits } => match bits.push(bit, 8) {
                None => (AwaitingEnd { payload, bits }, Ok(None)),
                Some(value) if value as u8 == END_FLAG => (AwaitingPreamble, Ok(Some(payload))),
                Some(value) => (AwaitingPreamble, Err(DecodeError::BadEndFlag(value as u8))),
            },
        }
    }

    /// Transition out of the length byte
    fn start_payload(type_flags: u8, length: u8) -> Step {
        if usize::from(length) > MAX_MESSAGE_LEN {
            return (
                DecoderState::AwaitingPreamble,
                Err(DecodeError::LengthOverflow(length)),
            );
        }

        let bits = BitAccumulator::new();
        let payload = Message::empty();
        let next = if length == 0 {
            // No payload bits on the wire, CRC follows the length byte
            DecoderState::ReadingCrc {
                type_flags,
                payload,
                bits,
            }
        } else {
            DecoderState::ReadingPayload {
                type_flags,
                length,
                payload,
                bits,
            }
        };
        (next, Ok(None))
    }
}
