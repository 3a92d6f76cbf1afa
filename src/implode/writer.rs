//! ImplodeWriter - Streaming compression writer
//!
//! Provides a [`Write`] interface over [`ImplodeState`]: bytes written are
//! buffered into the work buffer and encoded whenever it fills up. The
//! stream is closed by [`ImplodeWriter::finish`].

use super::state::ImplodeState;
use crate::bitstream::BitWriter;
use crate::{CompressionMode, CompressionStats, DclError, DictionarySize, Result, StreamHeader};
use log::{debug, warn};
use std::io::Write;

/// Streaming compression writer implementing Write trait
#[derive(Debug)]
pub struct ImplodeWriter<W: Write> {
    state: ImplodeState,
    /// Taken when the writer is finished
    out: Option<BitWriter<W>>,
    finished: bool,
}

impl<W: Write> ImplodeWriter<W> {
    /// Create a new ImplodeWriter and write the stream header
    pub fn new(writer: W, mode: CompressionMode, dict_size: DictionarySize) -> Result<Self> {
        let mut out = BitWriter::new(writer);
        for byte in StreamHeader::new(mode, dict_size).to_bytes() {
            out.put_byte(byte)?;
        }

        debug!(
            "implode start: mode {mode:?}, dictionary {} bytes",
            dict_size.bytes()
        );

        Ok(Self {
            state: ImplodeState::new(mode, dict_size),
            out: Some(out),
            finished: false,
        })
    }

    /// Statistics gathered so far
    pub fn stats(&self) -> &CompressionStats {
        self.state.stats()
    }

    fn out_mut(&mut self) -> Result<&mut BitWriter<W>> {
        match self.out.as_mut() {
            Some(out) if !self.finished => Ok(out),
            _ => Err(DclError::BadData("compressor already finished".to_string())),
        }
    }

    /// Compress `data`, encoding every time the work buffer fills up
    pub fn feed(&mut self, mut data: &[u8]) -> Result<()> {
        self.out_mut()?;

        while !data.is_empty() {
            let taken = self.state.fill(data);
            data = &data[taken..];

            if self.state.is_full() {
                let Some(out) = self.out.as_mut() else {
                    break;
                };
                self.state.compress_buffer(out, false)?;
            }
        }
        Ok(())
    }

    /// Encode the remaining input, the end-of-stream code and the padding
    fn close(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        let Some(out) = self.out.as_mut() else {
            return Ok(());
        };
        // A failed close is not retried
        self.finished = true;

        self.state.compress_buffer(out, true)?;
        self.state.encode_end(out)?;
        out.finish()?;

        self.state.stats_mut().output_bytes = out.total_bytes();

        let stats = self.state.stats();
        debug!(
            "implode finished: {} -> {} bytes, {} literals, {} matches",
            stats.input_bytes, stats.output_bytes, stats.literal_count, stats.match_count
        );
        Ok(())
    }

    /// Finish compression and return the underlying writer
    pub fn finish(self) -> Result<W> {
        self.finish_with_stats().map(|(writer, _)| writer)
    }

    /// Finish compression and return the underlying writer with final statistics
    pub fn finish_with_stats(mut self) -> Result<(W, CompressionStats)> {
        self.close()?;
        let stats = self.state.stats().clone();
        match self.out.take() {
            Some(out) => Ok((out.into_inner(), stats)),
            None => Err(DclError::BadData("compressor already finished".to_string())),
        }
    }
}

impl<W: Write> Write for ImplodeWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.feed(buf)?;
        Ok(buf.len())
    }

    /// Pushes complete output bytes to the sink; buffered input stays
    /// buffered until the work buffer fills or the writer is finished
    fn flush(&mut self) -> std::io::Result<()> {
        let out = self.out_mut()?;
        out.flush_buffer()?;
        out.get_mut().flush()
    }
}

impl<W: Write> Drop for ImplodeWriter<W> {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.close() {
                warn!("implode writer dropped without finishing cleanly: {e}");
            }
        }
    }
}
