//! pkware-dcl - Rust implementation of the PKWare Data Compression Library codec
//!
//! This crate implements the PKWare DCL "implode"/"explode" format (1980s DOS
//! era): an LZ77-style sliding dictionary coder whose literals, lengths and
//! distances are written with fixed, table-driven prefix codes. The format is
//! still found inside game archives such as MPQ and in other legacy tools.
//!
//! # Features
//!
//! - Compression (implode) and decompression (explode) between any
//!   [`std::io::Read`] source and [`std::io::Write`] sink
//! - Binary and ASCII literal coding
//! - Dictionary sizes: 1KB, 2KB, and 4KB
//! - Repetitions of 2 to 516 bytes
//! - Streaming facades: [`ImplodeWriter`] and [`ExplodeReader`]
//! - Closure adapters for callback-style I/O in [`callback`]
//!
//! # Example - Decompression
//!
//! ```
//! use pkware_dcl::{explode_bytes, ExplodeReader};
//! use std::io::Read;
//!
//! let compressed = [0x00, 0x04, 0x82, 0x24, 0x25, 0x8f, 0x80, 0x7f];
//! assert_eq!(explode_bytes(&compressed)?, b"AIAIAIAIAIAIA");
//!
//! // Or use the streaming API
//! let mut reader = ExplodeReader::new(&compressed[..])?;
//! let mut output = Vec::new();
//! reader.read_to_end(&mut output)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Example - Compression
//!
//! ```
//! use pkware_dcl::{implode_bytes, CompressionMode, DictionarySize, ImplodeWriter};
//! use std::io::Write;
//!
//! let data = b"Hello, World! Hello, World! Hello, World!";
//! let compressed = implode_bytes(data, CompressionMode::ASCII, DictionarySize::Size2K)?;
//! assert_eq!(&compressed[..2], &[1, 5]);
//!
//! // Or use the streaming API
//! let mut writer = ImplodeWriter::new(Vec::new(), CompressionMode::ASCII, DictionarySize::Size2K)?;
//! writer.write_all(data)?;
//! let output = writer.finish()?;
//! assert_eq!(output, compressed);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod bitstream;
pub mod callback;
pub mod common;
pub mod error;
pub mod explode;
pub mod implode;
pub mod tables;
pub mod window;

// Re-export commonly used types
pub use common::{
    CompressionMode, CompressionStats, DictionarySize, StreamHeader, DECODER_HEADER_SIZE,
    HEADER_SIZE, MAX_REP_LENGTH,
};
pub use error::{DclError, ErrorKind, Result};
pub use explode::{explode, explode_bytes, ExplodeReader};
pub use implode::{implode, implode_bytes, ImplodeWriter};
