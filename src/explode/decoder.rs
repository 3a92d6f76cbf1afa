//! Literal, length and distance decoding
//!
//! Each decoded symbol is one of:
//! - `0x000..=0x0FF`: a literal byte
//! - `0x100..=0x304`: a repetition (length = value - 0xFE)
//! - `0x305`: end of stream

use super::state::{DecodePhase, ExplodeState, ASCII_LONG_CODE};
use super::{LITERAL_END_OF_STREAM, LITERAL_REPETITION_BASE, OUT_BLOCK_SIZE};
use crate::tables::{DIST_BITS, EX_LEN_BITS, LEN_BASE, LEN_BITS};
use crate::{CompressionMode, DclError, Result};
use log::{debug, trace};
use std::io::Read;

impl<R: Read> ExplodeState<R> {
    /// Drop `n_bits` bits from the input, failing if the input ran out
    fn waste_bits(&mut self, n_bits: u32) -> Result<()> {
        ensure_consumed(self.bits.consume(n_bits)?, self.stats.output_bytes)
    }

    /// Decode the next literal or length symbol
    pub(crate) fn decode_lit(&mut self) -> Result<u32> {
        let flag = self.bits.peek(1)?;
        self.waste_bits(1)?;

        if flag != 0 {
            // Length code from the next 2-7 bits, then its extra bits
            let length_code = self.tables.length_code(self.bits.peek(8)?);
            self.waste_bits(LEN_BITS[length_code] as u32)?;

            let extra_bits = EX_LEN_BITS[length_code] as u32;
            let mut value = LEN_BASE[length_code] as u32;
            if extra_bits != 0 {
                value += self.bits.peek(extra_bits)?;
                self.waste_bits(extra_bits)?;
            }

            return Ok(value + LITERAL_REPETITION_BASE);
        }

        if self.header.mode == CompressionMode::Binary {
            let byte = self.bits.peek(8)?;
            self.waste_bits(8)?;
            return Ok(byte);
        }

        self.decode_ascii_literal()
    }

    fn decode_ascii_literal(&mut self) -> Result<u32> {
        let produced = self.stats.output_bytes;
        let bits = &mut self.bits;
        let Some(ascii) = self.tables.ascii.as_deref() else {
            return Err(DclError::BadData(
                "ASCII literal without ASCII tables".to_string(),
            ));
        };

        let peek = bits.peek(8)? as usize;
        let value = if peek != 0 {
            let primary = ascii.primary[peek];
            if primary != ASCII_LONG_CODE {
                primary
            } else if peek & 0x3F != 0 {
                ensure_consumed(bits.consume(4)?, produced)?;
                ascii.after_4[bits.peek(8)? as usize]
            } else {
                ensure_consumed(bits.consume(6)?, produced)?;
                ascii.after_6[bits.peek(7)? as usize]
            }
        } else {
            ensure_consumed(bits.consume(8)?, produced)?;
            ascii.after_8[bits.peek(8)? as usize]
        };

        ensure_consumed(bits.consume(ascii.ch_bits[value as usize] as u32)?, produced)?;
        Ok(value as u32)
    }

    /// Decode the backward distance of a repetition of `rep_length` bytes
    pub(crate) fn decode_dist(&mut self, rep_length: u32) -> Result<u32> {
        let dist_pos_code = self.tables.dist_pos_code(self.bits.peek(8)?);
        self.waste_bits(DIST_BITS[dist_pos_code] as u32)?;

        // Two-byte repetitions only carry 2 low bits
        let low_bits = if rep_length == 2 {
            2
        } else {
            self.header.dict_size.bits() as u32
        };
        let low = self.bits.peek(low_bits)?;
        self.waste_bits(low_bits)?;

        Ok((((dist_pos_code as u32) << low_bits) | low) + 1)
    }

    /// Decode symbols into `out` until a block is full or the stream ends
    ///
    /// Returns `Ok(true)` once the end-of-stream code was decoded. Bytes
    /// decoded before an error stay in `out`; the state is then failed and
    /// every later call reports the same error again.
    pub fn expand(&mut self, out: &mut Vec<u8>) -> Result<bool> {
        match self.phase {
            DecodePhase::Done => return Ok(true),
            DecodePhase::Decoding => {}
            DecodePhase::Failed => {
                return Err(match &self.failure {
                    Some(failure) => failure.replay(),
                    None => DclError::BadData("decoder already failed".to_string()),
                })
            }
        }

        let result = self.expand_block(out);
        match &result {
            Ok(true) => {
                self.phase = DecodePhase::Done;
                self.stats.input_bytes = self.bits.bytes_read();
                debug!(
                    "explode finished: {} bytes out, {} literals, {} matches",
                    self.stats.output_bytes, self.stats.literal_count, self.stats.match_count
                );
            }
            Ok(false) => {}
            Err(e) => {
                self.phase = DecodePhase::Failed;
                self.failure = Some(e.replay());
                debug!(
                    "explode failed after {} bytes: {e}",
                    self.stats.output_bytes
                );
            }
        }
        result
    }

    fn expand_block(&mut self, out: &mut Vec<u8>) -> Result<bool> {
        let start = out.len();

        while out.len() - start < OUT_BLOCK_SIZE {
            let literal = self.decode_lit()?;

            if literal == LITERAL_END_OF_STREAM {
                return Ok(true);
            }

            if literal < LITERAL_REPETITION_BASE {
                let byte = literal as u8;
                out.push(byte);
                self.window.write_byte(byte);
                self.stats.literal_count += 1;
                self.stats.output_bytes += 1;
                continue;
            }

            let rep_length = literal - 0xFE;
            let distance = self.decode_dist(rep_length)?;

            let available = self.stats.output_bytes.min(self.window.size() as u64);
            if distance as u64 > available {
                return Err(DclError::InvalidDistance {
                    distance,
                    available,
                });
            }

            trace!("repetition: length {rep_length}, distance {distance}");
            self.window
                .copy(distance as usize, rep_length as usize, out);
            self.stats.match_count += 1;
            self.stats.longest_match = self.stats.longest_match.max(rep_length as usize);
            self.stats.output_bytes += rep_length as u64;
        }

        Ok(false)
    }
}

fn ensure_consumed(consumed: bool, produced: u64) -> Result<()> {
    if consumed {
        Ok(())
    } else {
        Err(DclError::UnexpectedEof { produced })
    }
}
