//! Bit serialization and level encoding.
//!
//! The transmitter walks the wire image bit by bit, most significant bit
//! first, and drives each bit as two half-cell levels. Timing is left to
//! the caller; this module only decides *what* goes on the line.

/// Line levels for the two halves of one bit cell
///
/// A `1` is sent high-then-low and a `0` low-then-high, so every cell has
/// a transition in its middle.
#[inline]
#[must_use]
pub const fn manchester_levels(bit: bool) -> [bool; 2] {
    [bit, !bit]
}

/// Iterator over the bits of a byte slice, MSB first
#[derive(Debug, Clone)]
pub struct FrameBits<'a> {
    bytes: &'a [u8],
    index: usize,
}

impl<'a> FrameBits<'a> {
    /// Iterate the bits of `bytes`
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, index: 0 }
    }
}

impl Iterator for FrameBits<'_> {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        let byte = *self.bytes.get(self.index / 8)?;
        let shift = 7 - (self.index % 8);
        self.index += 1;
        Some((byte >> shift) & 1 == 1)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.bytes.len() * 8 - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for FrameBits<'_> {}
