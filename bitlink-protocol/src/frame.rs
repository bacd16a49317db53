//! Frame and message types for the bitlink wire format.
//!
//! Frame format:
//! - PREAMBLE (1 byte): 0x55, only used for clock recovery
//! - START (1 byte): 0x7E delimiter
//! - TYPE/FLAGS (1 byte): reserved, always 0x00
//! - LENGTH (1 byte): payload length (0-80)
//! - PAYLOAD (0-80 bytes)
//! - CRC (2 bytes, high byte first): CRC-16 of TYPE/FLAGS, LENGTH and PAYLOAD
//! - END (1 byte): 0x7E delimiter

use core::ops::Deref;

use heapless::Vec;

use crate::crc::Crc16Digest;

/// Clock recovery pattern, alternating bits
pub const PREAMBLE: u8 = 0x55;

/// Frame start delimiter
pub const START_FLAG: u8 = 0x7E;

/// Frame end delimiter
pub const END_FLAG: u8 = 0x7E;

/// Type/flags byte value; the field is reserved
pub const TYPE_FLAGS_NONE: u8 = 0x00;

/// Maximum application message size in bytes
pub const MAX_MESSAGE_LEN: usize = 80;

/// Bytes before the payload on the wire (PREAMBLE + START + TYPE + LENGTH)
const PRE_PAYLOAD_SIZE: usize = 4;

/// Bytes after the payload on the wire (CRC HI + CRC LO + END)
const POST_PAYLOAD_SIZE: usize = 3;

/// Maximum complete frame size on the wire
pub const MAX_FRAME_SIZE: usize = PRE_PAYLOAD_SIZE + MAX_MESSAGE_LEN + POST_PAYLOAD_SIZE;

/// Errors that can occur while building or encoding a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds [`MAX_MESSAGE_LEN`]
    PayloadTooLarge,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// Application-level message, at most [`MAX_MESSAGE_LEN`] bytes
///
/// One message is carried by exactly one frame; there is no
/// fragmentation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Message(Vec<u8, MAX_MESSAGE_LEN>);

impl Message {
    /// Create a message from bytes
    pub fn new(bytes: &[u8]) -> Result<Self, FrameError> {
        let mut data = Vec::new();
        data.extend_from_slice(bytes)
            .map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(Self(data))
    }

    /// Create an empty message
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Message bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Append a byte, failing when the message is full
    pub(crate) fn push(&mut self, byte: u8) -> Result<(), FrameError> {
        self.0.push(byte).map_err(|_| FrameError::PayloadTooLarge)
    }
}

impl Deref for Message {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for Message {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Message {
    type Error = FrameError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::new(bytes)
    }
}

/// A frame ready for transmission or just decoded
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    /// Reserved type/flags byte
    pub type_flags: u8,
    /// Payload data
    pub payload: Message,
}

impl Frame {
    /// Create a frame carrying `payload`
    pub fn new(payload: Message) -> Self {
        Self {
            type_flags: TYPE_FLAGS_NONE,
            payload,
        }
    }

    /// Payload length as carried in the LENGTH byte
    pub fn length(&self) -> u8 {
        // Message capacity keeps this within u8
        self.payload.len() as u8
    }

    /// CRC-16 over TYPE/FLAGS, LENGTH and PAYLOAD
    pub fn checksum(&self) -> u16 {
        Self::calculate_checksum(self.type_flags, self.length(), &self.payload)
    }

    /// Calculate the CRC for a frame's protected span
    pub fn calculate_checksum(type_flags: u8, length: u8, payload: &[u8]) -> u16 {
        let mut digest = Crc16Digest::new();
        digest.update(type_flags);
        digest.update(length);
        digest.update_slice(payload);
        digest.finalize()
    }

    /// Size of this frame on the wire, preamble included
    pub fn wire_len(&self) -> usize {
        PRE_PAYLOAD_SIZE + self.payload.len() + POST_PAYLOAD_SIZE
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = self.wire_len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        let payload_len = self.payload.len();
        let crc = self.checksum().to_be_bytes();

        buffer[0] = PREAMBLE;
        buffer[1] = START_FLAG;
        buffer[2] = self.type_flags;
        buffer[3] = self.length();
        buffer[4..4 + payload_len].copy_from_slice(&self.payload);
        buffer[4 + payload_len] = crc[0];
        buffer[5 + payload_len] = crc[1];
        buffer[6 + payload_len] = END_FLAG;

        Ok(frame_len)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| FrameError::BufferTooSmall)?;
        Ok(vec)
    }
}

impl From<Message> for Frame {
    fn from(payload: Message) -> Self {
        Self::new(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc::compute_crc16;

    #[test]
    fn test_message_limits() {
        assert!(Message::new(&[]).unwrap().is_empty());
        assert_eq!(Message::new(&[7u8; MAX_MESSAGE_LEN]).unwrap().len(), 80);
        assert_eq!(
            Message::new(&[7u8; MAX_MESSAGE_LEN + 1]),
            Err(FrameError::PayloadTooLarge)
        );
    }

    #[test]
    fn test_frame_encode_empty_payload() {
        let frame = Frame::new(Message::empty());
        let mut buffer = [0u8; 10];
        let len = frame.encode(&mut buffer).unwrap();

        let crc = compute_crc16(&[0x00, 0x00]);
        assert_eq!(len, 7);
        assert_eq!(
            &buffer[..len],
            &[PREAMBLE, START_FLAG, 0x00, 0x00, (crc >> 8) as u8, crc as u8, END_FLAG]
        );
    }

    #[test]
    fn test_frame_encode_scenario_message() {
        let text = b"123456789123456789";
        let frame = Frame::new(Message::new(text).unwrap());
        let wire = frame.encode_to_vec().unwrap();

        assert_eq!(wire.len(), 7 + text.len());
        assert_eq!(wire[0], 0x55);
        assert_eq!(wire[1], 0x7E);
        assert_eq!(wire[2], 0x00);
        assert_eq!(wire[3] as usize, text.len());
        assert_eq!(&wire[4..4 + text.len()], text);

        let mut span = Vec::<u8, 32>::new();
        span.extend_from_slice(&[0x00, text.len() as u8]).unwrap();
        span.extend_from_slice(text).unwrap();
        let crc = compute_crc16(&span);

        assert_eq!(wire[4 + text.len()], (crc >> 8) as u8);
        assert_eq!(wire[5 + text.len()], crc as u8);
        assert_eq!(wire[6 + text.len()], 0x7E);
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let frame = Frame::new(Message::new(b"abc").unwrap());
        let mut buffer = [0u8; 9];
        assert_eq!(frame.encode(&mut buffer), Err(FrameError::BufferTooSmall));
    }

    #[test]
    fn test_max_frame_fits() {
        let frame = Frame::new(Message::new(&[0xA5; MAX_MESSAGE_LEN]).unwrap());
        let wire = frame.encode_to_vec().unwrap();
        assert_eq!(wire.len(), MAX_FRAME_SIZE);
    }
}
