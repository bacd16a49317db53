//! CRC-16 checksum for frame integrity.
//!
//! Uses CRC-16/CCITT-FALSE (CRC-16/IBM-3740: poly 0x1021, init 0xFFFF,
//! no reflection, no final xor) with a 256-entry lookup table. Sender and
//! receiver must agree on this exact algorithm; a mismatch only shows up
//! as every frame failing its integrity check.

use crc::{Crc, CRC_16_IBM_3740};

/// CRC-16 calculator with 256-entry lookup table.
static CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

/// Calculate the CRC-16 of a byte slice.
#[inline]
#[must_use]
pub fn compute_crc16(data: &[u8]) -> u16 {
    CRC16.checksum(data)
}

/// CRC-16 digest for incremental calculation.
///
/// Use this when the protected span is not contiguous in memory, e.g.
/// header bytes followed by a separately stored payload.
pub struct Crc16Digest {
    digest: crc::Digest<'static, u16>,
}

impl Crc16Digest {
    /// Create a new CRC-16 digest.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            digest: CRC16.digest(),
        }
    }

    /// Update the digest with a single byte.
    #[inline]
    pub fn update(&mut self, byte: u8) {
        self.digest.update(&[byte]);
    }

    /// Update the digest with a byte slice.
    #[inline]
    pub fn update_slice(&mut self, data: &[u8]) {
        self.digest.update(data);
    }

    /// Finalize and return the checksum value.
    #[inline]
    #[must_use]
    pub fn finalize(self) -> u16 {
        self.digest.finalize()
    }
}

impl Default for Crc16Digest {
    fn default() -> Self {
        Self::new()
    }
}
