//! Sliding dictionary window
//!
//! Fixed-size circular history buffer owned by a single decoder and sized to
//! the dictionary class announced in the stream header.

use crate::DictionarySize;

/// Circular byte buffer holding the most recent `size` bytes of output
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    buffer: Vec<u8>,
    /// Position the next byte is written to
    write_pos: usize,
    /// `size - 1`; the size is always a power of two
    mask: usize,
}

impl SlidingWindow {
    /// Create a zero-filled window for the given dictionary size
    pub fn new(dict_size: DictionarySize) -> Self {
        let size = dict_size.bytes();
        Self {
            buffer: vec![0; size],
            write_pos: 0,
            mask: size - 1,
        }
    }

    /// Window size in bytes
    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    /// Position the next byte will be stored at
    pub fn position(&self) -> usize {
        self.write_pos
    }

    /// Store a byte and advance the cursor
    #[inline]
    pub fn write_byte(&mut self, byte: u8) {
        self.buffer[self.write_pos] = byte;
        self.write_pos = (self.write_pos + 1) & self.mask;
    }

    /// Byte written `offset + 1` steps ago (offset 0 is the latest byte)
    #[inline]
    pub fn read_back(&self, offset: usize) -> u8 {
        debug_assert!(offset < self.size());
        self.buffer[(self.write_pos.wrapping_sub(offset + 1)) & self.mask]
    }

    /// Replay `length` bytes starting `distance` bytes back (1..=size)
    ///
    /// Each copied byte is appended to `out` and written back into the
    /// window before the next one is read, so `distance < length` repeats
    /// the last `distance` bytes.
    pub fn copy(&mut self, distance: usize, length: usize, out: &mut Vec<u8>) {
        debug_assert!(distance >= 1 && distance <= self.size());
        for _ in 0..length {
            let byte = self.read_back(distance - 1);
            out.push(byte);
            self.write_byte(byte);
        }
    }

    /// Clear history and rewind the cursor
    pub fn reset(&mut self) {
        self.buffer.fill(0);
        self.write_pos = 0;
    }
}
