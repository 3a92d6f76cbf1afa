//! Explode (decompression) implementation
//!
//! This module provides decompression of PKWare DCL streams. Decoding runs
//! as a small state machine: the header is read and validated, the decode
//! tables are derived from the static code tables, and then literals and
//! repetitions are decoded until the end-of-stream code.

mod decoder;
mod reader;
mod state;

pub use reader::ExplodeReader;
pub use state::{DecodePhase, DecodeTables, ExplodeState};

use crate::{CompressionStats, Result};
use std::io::{Read, Write};

/// Decoded output is handed to the sink in blocks of this size (4096 bytes)
pub const OUT_BLOCK_SIZE: usize = 0x1000;

/// Size of the 8-bit lookup tables (256 entries)
pub const CODES_SIZE: usize = 0x100;

/// Size of the ASCII lookup table indexed by 7 bits (128 entries)
pub const OFFSS_SIZE1: usize = 0x80;

/// Decoded values from here up are repetitions (length = value - 0xFE)
pub const LITERAL_REPETITION_BASE: u32 = 0x100;

/// End of stream literal marker (0x305)
pub const LITERAL_END_OF_STREAM: u32 = 0x305;

/// Decompress everything `reader` yields into `writer`
///
/// Mode and dictionary size are taken from the stream header. Output is
/// pushed in blocks as it is produced; when the input ends early, the bytes
/// decoded so far have already been written when
/// [`DclError::UnexpectedEof`](crate::DclError::UnexpectedEof) is returned.
pub fn explode<R: Read, W: Write>(reader: R, mut writer: W) -> Result<CompressionStats> {
    let mut state = ExplodeState::new(reader)?;
    let mut block = Vec::with_capacity(OUT_BLOCK_SIZE + crate::MAX_REP_LENGTH + 2);

    loop {
        block.clear();
        let result = state.expand(&mut block);
        if !block.is_empty() {
            writer.write_all(&block)?;
        }
        if result? {
            break;
        }
    }

    writer.flush()?;
    Ok(state.stats().clone())
}

/// Convenience function to decompress data in memory
pub fn explode_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(data.len() * 2);
    explode(data, &mut output)?;
    Ok(output)
}
