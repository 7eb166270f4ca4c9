//! Bit-vector view over a byte slice
//!
//! Both occupancy maps in the file format are plain bit vectors living inside
//! a block buffer: block 1 holds one bit per block (1 = full), and each data
//! block starts with one bit per record slot (1 = occupied). `Bitmap` is a
//! mutable view constructed over the relevant buffer region for the duration
//! of one operation; it never owns or copies the bytes.
//!
//! Bit `i` lives in byte `i / 8` at position `i % 8`, least significant bit
//! first.

/// Mutable bit-vector view over a byte slice
pub struct Bitmap<'a> {
    bytes: &'a mut [u8],
}

impl<'a> Bitmap<'a> {
    /// Create a view over the given bytes
    pub fn new(bytes: &'a mut [u8]) -> Self {
        Self { bytes }
    }

    /// Number of bits in the view
    pub fn len(&self) -> usize {
        self.bytes.len() * 8
    }

    /// True if the view covers zero bits
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Get bit `i`
    ///
    /// # Panics
    /// Panics if `i` is out of range.
    pub fn get(&self, i: usize) -> bool {
        assert!(i < self.len(), "bit index {} out of range", i);
        self.bytes[i / 8] & (1 << (i % 8)) != 0
    }

    /// Set bit `i` to `value`
    ///
    /// # Panics
    /// Panics if `i` is out of range.
    pub fn set(&mut self, i: usize, value: bool) {
        assert!(i < self.len(), "bit index {} out of range", i);
        if value {
            self.bytes[i / 8] |= 1 << (i % 8);
        } else {
            self.bytes[i / 8] &= !(1 << (i % 8));
        }
    }

    /// Index of the lowest zero bit, or `None` if every bit is set
    pub fn first_zero(&self) -> Option<usize> {
        for (byte_idx, &byte) in self.bytes.iter().enumerate() {
            if byte != 0xFF {
                let bit = (byte.trailing_ones()) as usize;
                return Some(byte_idx * 8 + bit);
            }
        }
        None
    }

    /// Clear all bits to zero
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }
}

impl std::fmt::Display for Bitmap<'_> {
    /// Render as a string of '0'/'1' characters, lowest bit first
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for i in 0..self.len() {
            write!(f, "{}", if self.get(i) { '1' } else { '0' })?;
        }
        Ok(())
    }
}
