//! ExplodeReader - Streaming decompression reader
//!
//! Wraps an [`ExplodeState`] behind the [`Read`] trait so decompressed data
//! can be pulled by any consumer of `std::io`.

use super::state::ExplodeState;
use super::OUT_BLOCK_SIZE;
use crate::{CompressionStats, DclError, Result, StreamHeader};
use std::io::Read;

/// Streaming decompression reader implementing Read trait
///
/// Bytes decoded before a failure are handed out first; the error surfaces
/// on the read after them.
#[derive(Debug)]
pub struct ExplodeReader<R: Read> {
    state: ExplodeState<R>,
    output_buffer: Vec<u8>,
    output_pos: usize,
    pending_error: Option<DclError>,
    finished: bool,
}

impl<R: Read> ExplodeReader<R> {
    /// Create a new ExplodeReader, reading the stream header immediately
    pub fn new(reader: R) -> Result<Self> {
        Ok(Self {
            state: ExplodeState::new(reader)?,
            output_buffer: Vec::with_capacity(OUT_BLOCK_SIZE + crate::MAX_REP_LENGTH + 2),
            output_pos: 0,
            pending_error: None,
            finished: false,
        })
    }

    /// Header of the stream being decompressed
    pub fn header(&self) -> &StreamHeader {
        self.state.header()
    }

    /// Decompression statistics so far
    pub fn stats(&self) -> &CompressionStats {
        self.state.stats()
    }

    /// True once the end-of-stream code was reached and all output was read
    pub fn is_finished(&self) -> bool {
        self.finished && self.output_pos >= self.output_buffer.len()
    }

    /// Decode the next block into the internal buffer
    fn fill(&mut self) {
        self.output_buffer.clear();
        self.output_pos = 0;

        match self.state.expand(&mut self.output_buffer) {
            Ok(done) => self.finished = done,
            Err(e) => self.pending_error = Some(e),
        }
    }
}

impl<R: Read> Read for ExplodeReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        while self.output_pos >= self.output_buffer.len() {
            // A failed state keeps failing on later reads
            if let Some(e) = &self.pending_error {
                return Err(e.replay().into());
            }
            if self.finished {
                return Ok(0);
            }
            self.fill();
        }

        let available = &self.output_buffer[self.output_pos..];
        let to_copy = buf.len().min(available.len());
        buf[..to_copy].copy_from_slice(&available[..to_copy]);
        self.output_pos += to_copy;

        Ok(to_copy)
    }
}
