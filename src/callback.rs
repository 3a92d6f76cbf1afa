//! Closure adapters for the pull/push callback contract
//!
//! The codec reads through [`std::io::Read`] and writes through
//! [`std::io::Write`]. These adapters let plain closures stand in for
//! either side, e.g. when bridging a foreign I/O layer.
//!
//! ```
//! use pkware_dcl::callback::{read_fn, write_fn};
//! use pkware_dcl::{implode, CompressionMode, DictionarySize};
//!
//! let input = b"closure driven input".to_vec();
//! let mut offset = 0;
//! let mut compressed = Vec::new();
//!
//! implode(
//!     read_fn(|buf: &mut [u8]| {
//!         let n = buf.len().min(input.len() - offset);
//!         buf[..n].copy_from_slice(&input[offset..offset + n]);
//!         offset += n;
//!         Ok(n)
//!     }),
//!     write_fn(|data: &[u8]| {
//!         compressed.extend_from_slice(data);
//!         Ok(())
//!     }),
//!     CompressionMode::Binary,
//!     DictionarySize::Size4K,
//! )?;
//! assert_eq!(&compressed[..2], &[0, 6]);
//! # Ok::<(), pkware_dcl::DclError>(())
//! ```

use std::fmt;
use std::io::{self, Read, Write};

/// Pull callback: fills the buffer and returns the byte count, 0 at end of input
pub struct ReadFn<F>(F);

/// Push callback: receives each block of produced bytes
pub struct WriteFn<F>(F);

/// Wrap a pull closure as a [`Read`] source
pub fn read_fn<F>(f: F) -> ReadFn<F>
where
    F: FnMut(&mut [u8]) -> io::Result<usize>,
{
    ReadFn(f)
}

/// Wrap a push closure as a [`Write`] sink
pub fn write_fn<F>(f: F) -> WriteFn<F>
where
    F: FnMut(&[u8]) -> io::Result<()>,
{
    WriteFn(f)
}

impl<F> Read for ReadFn<F>
where
    F: FnMut(&mut [u8]) -> io::Result<usize>,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = (self.0)(buf)?;
        if n > buf.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "read callback reported more bytes than requested",
            ));
        }
        Ok(n)
    }
}

impl<F> Write for WriteFn<F>
where
    F: FnMut(&[u8]) -> io::Result<()>,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (self.0)(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<F> fmt::Debug for ReadFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ReadFn")
    }
}

impl<F> fmt::Debug for WriteFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WriteFn")
    }
}
