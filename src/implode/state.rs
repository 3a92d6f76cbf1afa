//! Compression state management
//!
//! [`ImplodeState`] owns the literal code tables, the work buffer and the
//! hash index, and turns buffered input into codes on a [`BitWriter`].

use super::hash::HashIndex;
use super::pattern::{find_repetition, should_defer, MatchCandidate};
use super::{LAZY_MATCH_LIMIT, LITERALS_COUNT, LITERAL_END_OF_STREAM, WORK_BUFF_SIZE};
use crate::bitstream::BitWriter;
use crate::tables::{
    CH_BITS_ASC, CH_CODE_ASC, DIST_BITS, DIST_CODE, EX_LEN_BITS, LEN_BITS, LEN_CODE,
};
use crate::{CompressionMode, CompressionStats, DictionarySize, Result, MAX_REP_LENGTH};
use log::trace;
use std::io::Write;

/// Compression state for one stream
#[derive(Debug)]
pub struct ImplodeState {
    mode: CompressionMode,
    dict_size: DictionarySize,
    /// Bit length for each literal, length and end code
    literal_bits: [u8; LITERALS_COUNT],
    /// Code for each literal, length and end code, bit 0 first
    literal_codes: [u16; LITERALS_COUNT],
    /// History followed by input not yet encoded
    work_buff: Vec<u8>,
    /// Next position in `work_buff` to encode
    encode_pos: usize,
    hash: HashIndex,
    stats: CompressionStats,
}

impl ImplodeState {
    /// Create a new compression state
    pub fn new(mode: CompressionMode, dict_size: DictionarySize) -> Self {
        let mut state = Self {
            mode,
            dict_size,
            literal_bits: [0; LITERALS_COUNT],
            literal_codes: [0; LITERALS_COUNT],
            work_buff: Vec::with_capacity(WORK_BUFF_SIZE),
            encode_pos: 0,
            hash: HashIndex::new(WORK_BUFF_SIZE),
            stats: CompressionStats::default(),
        };
        state.init_literal_tables();
        state
    }

    /// Fill the literal table: 256 byte codes, then every length value in
    /// order, then the end-of-stream code
    ///
    /// Every entry carries its leading flag bit: 0 for a literal byte, 1
    /// for a length.
    fn init_literal_tables(&mut self) {
        for byte in 0..0x100 {
            match self.mode {
                CompressionMode::Binary => {
                    self.literal_bits[byte] = 9;
                    self.literal_codes[byte] = (byte * 2) as u16;
                }
                CompressionMode::ASCII => {
                    self.literal_bits[byte] = CH_BITS_ASC[byte] + 1;
                    self.literal_codes[byte] = CH_CODE_ASC[byte] * 2;
                }
            }
        }

        let mut n_count = 0x100;
        for code in 0..LEN_CODE.len() {
            for extra in 0..(1u16 << EX_LEN_BITS[code]) {
                self.literal_bits[n_count] = EX_LEN_BITS[code] + LEN_BITS[code] + 1;
                self.literal_codes[n_count] =
                    (extra << (LEN_BITS[code] + 1)) | ((LEN_CODE[code] as u16) * 2) | 1;
                n_count += 1;
            }
        }
        debug_assert_eq!(n_count, LITERALS_COUNT);
    }

    /// Compression mode in use
    pub fn mode(&self) -> CompressionMode {
        self.mode
    }

    /// Dictionary size in use
    pub fn dict_size(&self) -> DictionarySize {
        self.dict_size
    }

    /// Statistics gathered so far
    pub fn stats(&self) -> &CompressionStats {
        &self.stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut CompressionStats {
        &mut self.stats
    }

    /// Copy as much of `data` into the work buffer as fits
    ///
    /// Returns the number of bytes taken.
    pub fn fill(&mut self, data: &[u8]) -> usize {
        let take = data.len().min(WORK_BUFF_SIZE - self.work_buff.len());
        self.work_buff.extend_from_slice(&data[..take]);
        self.stats.input_bytes += take as u64;
        take
    }

    /// True once no more input fits before the buffer has to be encoded
    pub fn is_full(&self) -> bool {
        self.work_buff.len() >= WORK_BUFF_SIZE
    }

    /// Encode buffered input
    ///
    /// Unless `last` is set, the final [`MAX_REP_LENGTH`] bytes stay
    /// unencoded as lookahead, and history beyond one dictionary is dropped
    /// afterwards to make room for more input.
    pub fn compress_buffer<W: Write>(&mut self, out: &mut BitWriter<W>, last: bool) -> Result<()> {
        let work_bytes = self.work_buff.len();
        let limit = if last {
            work_bytes
        } else {
            work_bytes.saturating_sub(MAX_REP_LENGTH)
        };
        if self.encode_pos >= limit {
            return Ok(());
        }

        self.hash.rebuild(&self.work_buff);
        let dict_bytes = self.dict_size.bytes();
        let start = self.encode_pos;

        while self.encode_pos < limit {
            let pos = self.encode_pos;
            let current = find_repetition(&self.work_buff, &self.hash, pos, dict_bytes);

            // A short match may lose to a better one starting at the next byte
            let defer = match current {
                Some(rep) if rep.length < LAZY_MATCH_LIMIT && pos + 2 < work_bytes => {
                    let next = find_repetition(&self.work_buff, &self.hash, pos + 1, dict_bytes);
                    should_defer(rep, next)
                }
                _ => false,
            };

            match current {
                Some(rep) if !defer => {
                    self.encode_repetition(out, rep)?;
                    self.encode_pos += rep.length;
                }
                _ => {
                    self.encode_literal(out, self.work_buff[pos])?;
                    self.encode_pos += 1;
                }
            }
        }

        trace!(
            "implode chunk: encoded {} of {} buffered bytes",
            self.encode_pos - start,
            work_bytes
        );

        if !last {
            self.slide();
        }
        Ok(())
    }

    /// Drop history older than one dictionary from the front of the buffer
    fn slide(&mut self) {
        let keep_from = self.encode_pos.saturating_sub(self.dict_size.bytes());
        if keep_from > 0 {
            self.work_buff.drain(..keep_from);
            self.encode_pos -= keep_from;
        }
    }

    fn encode_literal<W: Write>(&mut self, out: &mut BitWriter<W>, byte: u8) -> Result<()> {
        let index = byte as usize;
        out.emit(self.literal_bits[index] as u32, self.literal_codes[index] as u32)?;
        self.stats.literal_count += 1;
        Ok(())
    }

    fn encode_repetition<W: Write>(
        &mut self,
        out: &mut BitWriter<W>,
        rep: MatchCandidate,
    ) -> Result<()> {
        debug_assert!(rep.length >= 2 && rep.length <= MAX_REP_LENGTH);

        let index = 0xFE + rep.length;
        out.emit(self.literal_bits[index] as u32, self.literal_codes[index] as u32)?;

        // Two-byte repetitions only carry 2 low distance bits
        let low_bits = if rep.length == 2 {
            2
        } else {
            self.dict_size.bits() as u32
        };
        let distance = (rep.distance - 1) as u32;
        let dist_code = (distance >> low_bits) as usize;
        out.emit(DIST_BITS[dist_code] as u32, DIST_CODE[dist_code] as u32)?;
        out.emit(low_bits, distance & ((1 << low_bits) - 1))?;

        self.stats.match_count += 1;
        self.stats.longest_match = self.stats.longest_match.max(rep.length);
        Ok(())
    }

    /// Write the end-of-stream code
    pub fn encode_end<W: Write>(&mut self, out: &mut BitWriter<W>) -> Result<()> {
        out.emit(
            self.literal_bits[LITERAL_END_OF_STREAM] as u32,
            self.literal_codes[LITERAL_END_OF_STREAM] as u32,
        )
    }
}
