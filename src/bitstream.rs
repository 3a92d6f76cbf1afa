//! Bit-level input and output
//!
//! The DCL bit stream is LSB-first: the first bit of a code is bit 0 of the
//! first byte, and successive bytes are packed above the previous ones.
//! [`BitReader`] pulls bytes from a [`Read`] source one at a time as the
//! decoder consumes bits; [`BitWriter`] packs codes into bytes and pushes
//! full blocks to a [`Write`] sink.

use crate::error::Result;
use std::io::{ErrorKind, Read, Write};

/// Input buffer size for the bit reader (2048 bytes)
pub const IN_BUFF_SIZE: usize = 0x800;

/// Output buffer capacity for the bit writer (2050 bytes)
pub const OUT_BUFF_SIZE: usize = 0x802;

/// The bit writer pushes its buffer to the sink once it holds this many bytes
pub const OUT_FLUSH_SIZE: usize = 0x800;

/// Mask with the low `n_bits` bits set
#[inline]
const fn low_mask(n_bits: u32) -> u32 {
    if n_bits >= 32 {
        u32::MAX
    } else {
        (1u32 << n_bits) - 1
    }
}

/// LSB-first bit reader over a byte source
#[derive(Debug)]
pub struct BitReader<R> {
    reader: R,
    in_buff: Vec<u8>,
    in_pos: usize,
    in_bytes: usize,
    /// Bit accumulator; only the low `bit_count` bits are valid
    bit_buff: u32,
    bit_count: u32,
    /// Set once the source returned end of input
    exhausted: bool,
    bytes_read: u64,
}

impl<R: Read> BitReader<R> {
    /// Create a new bit reader with an empty accumulator
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            in_buff: vec![0; IN_BUFF_SIZE],
            in_pos: 0,
            in_bytes: 0,
            bit_buff: 0,
            bit_count: 0,
            exhausted: false,
            bytes_read: 0,
        }
    }

    /// Pull the next whole byte from the source, bypassing the accumulator
    ///
    /// Returns `Ok(None)` at end of input.
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        if self.in_pos >= self.in_bytes && !self.load_input()? {
            return Ok(None);
        }
        let byte = self.in_buff[self.in_pos];
        self.in_pos += 1;
        Ok(Some(byte))
    }

    /// Load the accumulator with 8 already-valid bits
    pub fn seed(&mut self, byte: u8) {
        self.bit_buff = byte as u32;
        self.bit_count = 8;
    }

    /// Refill the input buffer from the source; false at end of input
    fn load_input(&mut self) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }
        loop {
            match self.reader.read(&mut self.in_buff) {
                Ok(0) => {
                    self.exhausted = true;
                    return Ok(false);
                }
                Ok(n) => {
                    self.in_pos = 0;
                    self.in_bytes = n;
                    self.bytes_read += n as u64;
                    return Ok(true);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Append source bytes until at least `n_bits` bits are valid
    ///
    /// Returns false if the source ran dry first.
    fn ensure_bits(&mut self, n_bits: u32) -> Result<bool> {
        while self.bit_count < n_bits {
            match self.read_byte()? {
                Some(byte) => {
                    self.bit_buff |= (byte as u32) << self.bit_count;
                    self.bit_count += 8;
                }
                None => return Ok(false),
            }
        }
        Ok(true)
    }

    /// Return the low `n_bits` bits (1..=16) without consuming them
    ///
    /// Near the end of input fewer bits may be valid; the missing high bits
    /// read as zero and a following [`consume`](Self::consume) reports the
    /// shortage.
    pub fn peek(&mut self, n_bits: u32) -> Result<u32> {
        self.ensure_bits(n_bits)?;
        Ok(self.bit_buff & low_mask(n_bits))
    }

    /// Remove the low `n_bits` bits (0..=16) from the accumulator
    ///
    /// Returns false, consuming nothing, when the source is exhausted and
    /// fewer than `n_bits` bits remain.
    pub fn consume(&mut self, n_bits: u32) -> Result<bool> {
        if !self.ensure_bits(n_bits)? {
            return Ok(false);
        }
        self.bit_buff >>= n_bits;
        self.bit_count -= n_bits;
        Ok(true)
    }

    /// Number of bits currently held in the accumulator
    pub fn available_bits(&self) -> u32 {
        self.bit_count
    }

    /// Total number of bytes pulled from the source so far
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Consume the reader and return the underlying source
    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// LSB-first bit writer over a byte sink
#[derive(Debug)]
pub struct BitWriter<W> {
    writer: W,
    out_buff: Vec<u8>,
    /// Pending bits that do not yet fill a byte
    bit_buff: u32,
    bit_count: u32,
    bytes_written: u64,
}

impl<W: Write> BitWriter<W> {
    /// Create a new bit writer
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            out_buff: Vec::with_capacity(OUT_BUFF_SIZE),
            bit_buff: 0,
            bit_count: 0,
            bytes_written: 0,
        }
    }

    /// Append a whole byte; only valid on a byte boundary
    pub fn put_byte(&mut self, byte: u8) -> Result<()> {
        debug_assert_eq!(self.bit_count, 0, "put_byte on a partial byte");
        self.out_buff.push(byte);
        self.flush_if_full()
    }

    /// Append the low `n_bits` bits (0..=16) of `value`, bit 0 first
    pub fn emit(&mut self, n_bits: u32, value: u32) -> Result<()> {
        debug_assert!(n_bits <= 16);
        self.bit_buff |= (value & low_mask(n_bits)) << self.bit_count;
        self.bit_count += n_bits;

        while self.bit_count >= 8 {
            self.out_buff.push((self.bit_buff & 0xFF) as u8);
            self.bit_buff >>= 8;
            self.bit_count -= 8;
        }

        self.flush_if_full()
    }

    fn flush_if_full(&mut self) -> Result<()> {
        if self.out_buff.len() >= OUT_FLUSH_SIZE {
            self.flush_buffer()?;
        }
        Ok(())
    }

    /// Push all complete bytes to the sink, keeping the partial byte pending
    pub fn flush_buffer(&mut self) -> Result<()> {
        if !self.out_buff.is_empty() {
            self.writer.write_all(&self.out_buff)?;
            self.bytes_written += self.out_buff.len() as u64;
            self.out_buff.clear();
        }
        Ok(())
    }

    /// Pad the trailing partial byte with zero bits and push everything
    pub fn finish(&mut self) -> Result<()> {
        if self.bit_count > 0 {
            self.out_buff.push((self.bit_buff & 0xFF) as u8);
            self.bit_buff = 0;
            self.bit_count = 0;
        }
        self.flush_buffer()?;
        self.writer.flush()?;
        Ok(())
    }

    /// Bytes produced so far, including buffered and pending partial bytes
    pub fn total_bytes(&self) -> u64 {
        self.bytes_written + self.out_buff.len() as u64 + u64::from(self.bit_count > 0)
    }

    /// Get a reference to the underlying sink
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Get a mutable reference to the underlying sink
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Consume the writer and return the underlying sink
    ///
    /// Unflushed bits are discarded; call [`finish`](Self::finish) first.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reader_lsb_first() {
        let mut reader = BitReader::new(Cursor::new(vec![0b1010_0110u8, 0xFF]));
        assert_eq!(reader.peek(1).unwrap(), 0);
        assert!(reader.consume(1).unwrap());
        assert_eq!(reader.peek(3).unwrap(), 0b011);
        assert!(reader.consume(3).unwrap());
        // Remaining 4 bits of the first byte sit below the second byte
        assert_eq!(reader.peek(8).unwrap(), 0b1111_1010);
    }

    #[test]
    fn test_reader_seed() {
        let mut reader = BitReader::new(Cursor::new(Vec::<u8>::new()));
        reader.seed(0x81);
        assert_eq!(reader.available_bits(), 8);
        assert_eq!(reader.peek(8).unwrap(), 0x81);
        assert!(reader.consume(8).unwrap());
        assert!(!reader.consume(1).unwrap());
    }

    #[test]
    fn test_reader_failed_consume_keeps_bits() {
        let mut reader = BitReader::new(Cursor::new(vec![0x5Au8]));
        assert!(!reader.consume(9).unwrap());
        assert_eq!(reader.available_bits(), 8);
        assert_eq!(reader.peek(8).unwrap(), 0x5A);
        // Missing high bits read as zero
        assert_eq!(reader.peek(12).unwrap(), 0x05A);
    }

    #[test]
    fn test_reader_read_byte() {
        let mut reader = BitReader::new(Cursor::new(vec![1u8, 2, 3]));
        assert_eq!(reader.read_byte().unwrap(), Some(1));
        assert_eq!(reader.read_byte().unwrap(), Some(2));
        assert_eq!(reader.read_byte().unwrap(), Some(3));
        assert_eq!(reader.read_byte().unwrap(), None);
        assert_eq!(reader.bytes_read(), 3);
    }

    #[test]
    fn test_writer_packs_lsb_first() {
        let mut writer = BitWriter::new(Vec::new());
        writer.emit(1, 1).unwrap();
        writer.emit(3, 0b010).unwrap();
        writer.emit(8, 0xAB).unwrap();
        writer.finish().unwrap();
        // bits: 1, 010, then 0xAB split across the byte boundary
        assert_eq!(writer.into_inner(), vec![0b1011_0101, 0b0000_1010]);
    }

    #[test]
    fn test_writer_masks_value() {
        let mut writer = BitWriter::new(Vec::new());
        writer.emit(4, 0xFFF3).unwrap();
        writer.emit(4, 0).unwrap();
        writer.finish().unwrap();
        assert_eq!(writer.into_inner(), vec![0x03]);
    }

    #[test]
    fn test_writer_flushes_full_blocks() {
        let mut writer = BitWriter::new(Vec::new());
        for _ in 0..OUT_FLUSH_SIZE {
            writer.emit(8, 0x55).unwrap();
        }
        assert_eq!(writer.get_ref().len(), OUT_FLUSH_SIZE);
        writer.emit(3, 0b101).unwrap();
        assert_eq!(writer.total_bytes(), OUT_FLUSH_SIZE as u64 + 1);
        writer.finish().unwrap();
        assert_eq!(writer.get_ref().len(), OUT_FLUSH_SIZE + 1);
    }

    #[test]
    fn test_writer_reader_agree() {
        let fields = [(1u32, 1u32), (7, 0x40), (8, 0xFF), (2, 0b10), (16, 0xBEEF)];

        let mut writer = BitWriter::new(Vec::new());
        for &(bits, value) in &fields {
            writer.emit(bits, value).unwrap();
        }
        writer.finish().unwrap();

        let mut reader = BitReader::new(Cursor::new(writer.into_inner()));
        for &(bits, value) in &fields {
            assert_eq!(reader.peek(bits).unwrap(), value);
            assert!(reader.consume(bits).unwrap());
        }
    }
}
