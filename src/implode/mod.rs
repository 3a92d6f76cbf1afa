//! Implode (compression) implementation
//!
//! Input is gathered in a work buffer that keeps up to one dictionary of
//! already-encoded history in front of the new bytes. Each time the buffer
//! fills up, its byte pairs are re-indexed and the new bytes are encoded as
//! literals and repetitions, always keeping [`MAX_REP_LENGTH`](crate::MAX_REP_LENGTH) bytes of
//! lookahead until the input ends.

mod hash;
mod pattern;
mod state;
mod writer;

pub use hash::HashIndex;
pub use pattern::{find_repetition, should_defer, MatchCandidate};
pub use state::ImplodeState;
pub use writer::ImplodeWriter;

use crate::{CompressionMode, CompressionStats, DictionarySize, Result};
use std::io::{ErrorKind, Read, Write};

/// Work buffer size for compression (8708 bytes): history, new input and lookahead
pub const WORK_BUFF_SIZE: usize = 0x2204;

/// Number of byte-pair hash buckets (2304)
pub const HASH_TABLE_SIZE: usize = 0x900;

/// Total number of literal codes including length codes and end of stream (774)
pub const LITERALS_COUNT: usize = 0x306;

/// Index of the end-of-stream code in the literal table
pub const LITERAL_END_OF_STREAM: usize = 0x305;

/// A match longer than this ends the candidate search
pub const GOOD_MATCH_LENGTH: usize = 10;

/// Matches shorter than this are checked against a match one byte later
pub const LAZY_MATCH_LIMIT: usize = 8;

/// Matches farther back than this lose to a later match one byte longer
pub const SHORT_DISTANCE: usize = 0x80;

/// Size of the blocks pulled from the input source (4096 bytes)
pub const READ_CHUNK_SIZE: usize = 0x1000;

/// Hash of a byte pair: `byte0 * 4 + byte1 * 5`, always below [`HASH_TABLE_SIZE`]
#[inline]
pub const fn byte_pair_hash(byte0: u8, byte1: u8) -> usize {
    (byte0 as usize) * 4 + (byte1 as usize) * 5
}

/// Compress everything `reader` yields into `writer`
///
/// The output is the two header bytes followed by the bit stream, closed
/// with the end-of-stream code and zero-padded to a whole byte. Returns
/// statistics about the encoded stream.
pub fn implode<R: Read, W: Write>(
    mut reader: R,
    writer: W,
    mode: CompressionMode,
    dict_size: DictionarySize,
) -> Result<CompressionStats> {
    let mut encoder = ImplodeWriter::new(writer, mode, dict_size)?;
    let mut chunk = vec![0u8; READ_CHUNK_SIZE];

    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        encoder.feed(&chunk[..n])?;
    }

    let (_, stats) = encoder.finish_with_stats()?;
    Ok(stats)
}

/// Convenience function to compress data in memory
pub fn implode_bytes(
    data: &[u8],
    mode: CompressionMode,
    dict_size: DictionarySize,
) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(data.len() / 2 + 16);
    implode(data, &mut output, mode, dict_size)?;
    Ok(output)
}
