//! Common types and constants for the PKWare DCL format
//!
//! This module defines the core types, constants, and structures used by both
//! the compression (implode) and decompression (explode) algorithms.

use crate::error::{DclError, Result};

/// Compression mode for the PKWare DCL format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionMode {
    /// Binary mode - literals are stored as plain 8-bit values
    Binary = 0,
    /// ASCII mode - literals use the static PKWare character codes
    ASCII = 1,
}

impl CompressionMode {
    /// Create a CompressionMode from a raw header value
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(CompressionMode::Binary),
            1 => Ok(CompressionMode::ASCII),
            _ => Err(DclError::InvalidCompressionMode(value)),
        }
    }
}

/// Dictionary size for compression/decompression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DictionarySize {
    /// 1024 bytes (1KB) dictionary
    Size1K = 1024,
    /// 2048 bytes (2KB) dictionary
    Size2K = 2048,
    /// 4096 bytes (4KB) dictionary
    Size4K = 4096,
}

impl DictionarySize {
    /// Dictionary class stored in the header, which is also the number of
    /// low distance bits written after the distance code
    pub fn bits(&self) -> u8 {
        match self {
            DictionarySize::Size1K => 4, // 2^10 = 1024, 10 - 6 = 4
            DictionarySize::Size2K => 5, // 2^11 = 2048, 11 - 6 = 5
            DictionarySize::Size4K => 6, // 2^12 = 4096, 12 - 6 = 6
        }
    }

    /// Get the bit mask for the low distance bits
    pub fn mask(&self) -> u32 {
        (1u32 << self.bits()) - 1
    }

    /// Dictionary size in bytes
    pub fn bytes(&self) -> usize {
        *self as usize
    }

    /// Create a DictionarySize from the number of bits
    pub fn from_bits(bits: u8) -> Result<Self> {
        match bits {
            4 => Ok(DictionarySize::Size1K),
            5 => Ok(DictionarySize::Size2K),
            6 => Ok(DictionarySize::Size4K),
            _ => Err(DclError::InvalidDictionaryBits(bits)),
        }
    }

    /// Create a DictionarySize from byte size
    pub fn from_bytes(bytes: u32) -> Result<Self> {
        match bytes {
            1024 => Ok(DictionarySize::Size1K),
            2048 => Ok(DictionarySize::Size2K),
            4096 => Ok(DictionarySize::Size4K),
            _ => Err(DclError::InvalidDictionarySize(bytes)),
        }
    }
}

// DCL format constants

/// Maximum repetition length the encoder emits
pub const MAX_REP_LENGTH: usize = 0x204; // 516 bytes

/// Number of bytes the encoder writes before the bit stream starts
pub const HEADER_SIZE: usize = 2;

/// Number of bytes the decoder needs before it can start decoding; the last
/// one is the first byte of the bit stream and seeds the bit accumulator
pub const DECODER_HEADER_SIZE: usize = 3;

/// Stream header: compression mode and dictionary class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamHeader {
    /// Compression mode (Binary/ASCII)
    pub mode: CompressionMode,
    /// Dictionary size
    pub dict_size: DictionarySize,
}

impl StreamHeader {
    /// Create a header for the given parameters
    pub fn new(mode: CompressionMode, dict_size: DictionarySize) -> Self {
        Self { mode, dict_size }
    }

    /// Parse the mode and dictionary class bytes at the start of `data`
    ///
    /// Only the bytes that are present are validated: a too-short buffer
    /// with a valid prefix yields [`DclError::UnexpectedEof`].
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mode = match data.first() {
            Some(&byte) => CompressionMode::from_u8(byte)?,
            None => return Err(DclError::UnexpectedEof { produced: 0 }),
        };
        let dict_size = match data.get(1) {
            Some(&byte) => DictionarySize::from_bits(byte)?,
            None => return Err(DclError::UnexpectedEof { produced: 0 }),
        };
        Ok(Self { mode, dict_size })
    }

    /// Serialized header bytes as written by the encoder
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        [self.mode as u8, self.dict_size.bits()]
    }
}

/// Statistics for compression/decompression operations
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CompressionStats {
    /// Number of literal bytes encoded/decoded
    pub literal_count: usize,
    /// Number of distance matches encoded/decoded
    pub match_count: usize,
    /// Longest match found
    pub longest_match: usize,
    /// Input bytes consumed
    pub input_bytes: u64,
    /// Output bytes produced
    pub output_bytes: u64,
}

impl CompressionStats {
    /// Output size relative to input size (0.0 for empty input)
    pub fn ratio(&self) -> f64 {
        if self.input_bytes == 0 {
            0.0
        } else {
            self.output_bytes as f64 / self.input_bytes as f64
        }
    }
}
