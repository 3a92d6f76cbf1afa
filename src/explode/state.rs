//! Decompression state management
//!
//! [`DecodeTables`] holds the byte-indexed dispatch tables derived from the
//! static code tables; [`ExplodeState`] owns everything one decompression
//! needs: header, bit reader, window and tables.

use super::{CODES_SIZE, OFFSS_SIZE1};
use crate::bitstream::BitReader;
use crate::tables::{CH_BITS_ASC, CH_CODE_ASC, DIST_BITS, DIST_CODE, LEN_BITS, LEN_CODE};
use crate::window::SlidingWindow;
use crate::{CompressionMode, CompressionStats, DclError, Result, StreamHeader};
use log::debug;
use std::io::Read;

/// Marker in the primary ASCII table for codes longer than 8 bits
pub(crate) const ASCII_LONG_CODE: u8 = 0xFF;

/// Where a decompression currently stands
///
/// Reading the header and building the tables both happen in
/// [`ExplodeState::new`], so a constructed state starts out decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodePhase {
    /// Decoding literals and repetitions
    Decoding,
    /// End-of-stream code seen
    Done,
    /// Stopped on an error; no further output
    Failed,
}

/// Lookup tables for ASCII-mode literals
///
/// Codes up to 8 bits resolve in `primary`. Longer codes are resolved in a
/// second lookup after dropping 4, 6 or 8 bits, chosen by the low bits of
/// the code; `ch_bits` then holds the bits still left to consume.
#[derive(Debug, Clone)]
pub struct AsciiTables {
    pub(crate) primary: [u8; CODES_SIZE],
    pub(crate) after_4: [u8; CODES_SIZE],
    pub(crate) after_6: [u8; OFFSS_SIZE1],
    pub(crate) after_8: [u8; CODES_SIZE],
    pub(crate) ch_bits: [u8; CODES_SIZE],
}

/// Decode tables, derived once per decompression
#[derive(Debug, Clone)]
pub struct DecodeTables {
    /// Length code index for each 8-bit peek
    pub(crate) length_codes: [u8; CODES_SIZE],
    /// Distance position code index for each 8-bit peek
    pub(crate) dist_pos_codes: [u8; CODES_SIZE],
    /// Only present in ASCII mode
    pub(crate) ascii: Option<Box<AsciiTables>>,
}

impl DecodeTables {
    /// Build the tables needed for `mode`
    pub fn new(mode: CompressionMode) -> Self {
        let mut tables = Self {
            length_codes: [0; CODES_SIZE],
            dist_pos_codes: [0; CODES_SIZE],
            ascii: None,
        };

        gen_decode_tabs(&mut tables.length_codes, &LEN_CODE, &LEN_BITS);
        gen_decode_tabs(&mut tables.dist_pos_codes, &DIST_CODE, &DIST_BITS);

        if mode == CompressionMode::ASCII {
            tables.ascii = Some(Box::new(gen_asc_tabs()));
        }

        tables
    }

    /// Length code index for the next 8 bits of input
    #[inline]
    pub fn length_code(&self, peek: u32) -> usize {
        self.length_codes[(peek & 0xFF) as usize] as usize
    }

    /// Distance position code index for the next 8 bits of input
    #[inline]
    pub fn dist_pos_code(&self, peek: u32) -> usize {
        self.dist_pos_codes[(peek & 0xFF) as usize] as usize
    }
}

/// Fill `positions` so every byte whose low bits match a code maps to it
fn gen_decode_tabs(positions: &mut [u8; CODES_SIZE], start_indexes: &[u8], length_bits: &[u8]) {
    for (i, (&start, &bits)) in start_indexes.iter().zip(length_bits).enumerate() {
        let step = 1usize << bits;
        let mut index = start as usize;

        while index < CODES_SIZE {
            positions[index] = i as u8;
            index += step;
        }
    }
}

/// Expand the static ASCII literal codes into staged lookup tables
fn gen_asc_tabs() -> AsciiTables {
    let mut tables = AsciiTables {
        primary: [0; CODES_SIZE],
        after_4: [0; CODES_SIZE],
        after_6: [0; OFFSS_SIZE1],
        after_8: [0; CODES_SIZE],
        ch_bits: CH_BITS_ASC,
    };

    for count in (0..CODES_SIZE).rev() {
        let code = CH_CODE_ASC[count] as usize;
        let bits = tables.ch_bits[count];

        if bits <= 8 {
            fill_stride(&mut tables.primary, code, bits, count);
        } else if code & 0xFF != 0 {
            tables.primary[code & 0xFF] = ASCII_LONG_CODE;

            if code & 0x3F != 0 {
                tables.ch_bits[count] = bits - 4;
                fill_stride(&mut tables.after_4, code >> 4, bits - 4, count);
            } else {
                tables.ch_bits[count] = bits - 6;
                fill_stride(&mut tables.after_6, code >> 6, bits - 6, count);
            }
        } else {
            tables.ch_bits[count] = bits - 8;
            fill_stride(&mut tables.after_8, code >> 8, bits - 8, count);
        }
    }

    tables
}

fn fill_stride(table: &mut [u8], start: usize, bits: u8, value: usize) {
    let step = 1usize << bits;
    let mut index = start;
    while index < table.len() {
        table[index] = value as u8;
        index += step;
    }
}

/// Decompression state for one stream
#[derive(Debug)]
pub struct ExplodeState<R> {
    pub(crate) header: StreamHeader,
    pub(crate) bits: BitReader<R>,
    pub(crate) window: SlidingWindow,
    pub(crate) tables: DecodeTables,
    pub(crate) phase: DecodePhase,
    /// The error that moved the state to [`DecodePhase::Failed`]
    pub(crate) failure: Option<DclError>,
    pub(crate) stats: CompressionStats,
}

impl<R: Read> ExplodeState<R> {
    /// Read the header from `reader` and prepare for decoding
    ///
    /// Fails with an [`InvalidHeader`](crate::ErrorKind::InvalidHeader) kind
    /// on a bad mode or dictionary byte before anything is decoded, and
    /// with [`DclError::UnexpectedEof`] if fewer than three bytes arrive.
    pub fn new(reader: R) -> Result<Self> {
        let mut bits = BitReader::new(reader);

        let mut raw = [0u8; crate::DECODER_HEADER_SIZE];
        let mut got = 0;
        while got < raw.len() {
            match bits.read_byte()? {
                Some(byte) => {
                    raw[got] = byte;
                    got += 1;
                }
                None => break,
            }
        }

        let header = StreamHeader::parse(&raw[..got]).inspect_err(|e| {
            debug!("rejecting stream header {:02x?}: {e}", &raw[..got]);
        })?;
        if got < raw.len() {
            return Err(DclError::UnexpectedEof { produced: 0 });
        }
        bits.seed(raw[2]);

        debug!(
            "explode header: mode {:?}, dictionary {} bytes",
            header.mode,
            header.dict_size.bytes()
        );

        let tables = DecodeTables::new(header.mode);

        Ok(Self {
            header,
            bits,
            window: SlidingWindow::new(header.dict_size),
            tables,
            phase: DecodePhase::Decoding,
            failure: None,
            stats: CompressionStats::default(),
        })
    }

    /// Header of the stream being decoded
    pub fn header(&self) -> &StreamHeader {
        &self.header
    }

    /// Current phase of the state machine
    pub fn phase(&self) -> DecodePhase {
        self.phase
    }

    /// True once the end-of-stream code was decoded
    pub fn is_finished(&self) -> bool {
        self.phase == DecodePhase::Done
    }

    /// Statistics gathered so far
    pub fn stats(&self) -> &CompressionStats {
        &self.stats
    }
}
