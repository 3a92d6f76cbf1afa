//! Format compatibility tests
//!
//! Known PKWare DCL streams, header handling, truncation behavior and the
//! callback-driven entry points.

use pkware_dcl::callback::{read_fn, write_fn};
use pkware_dcl::{
    explode, explode_bytes, implode, implode_bytes, CompressionMode, DclError, DictionarySize,
    ErrorKind, ExplodeReader,
};
use std::io::{self, Read};

/// Binary mode, 1K dictionary: "AI" followed by an 11-byte overlapping repetition
const AIAI_STREAM: [u8; 8] = [0x00, 0x04, 0x82, 0x24, 0x25, 0x8f, 0x80, 0x7f];

fn text_sample() -> Vec<u8> {
    b"It was the best of times, it was the worst of times, it was the age of wisdom, \
      it was the age of foolishness, it was the epoch of belief, it was the epoch of \
      incredulity, it was the season of Light, it was the season of Darkness."
        .to_vec()
}

#[test]
fn test_known_pkware_stream() -> Result<(), Box<dyn std::error::Error>> {
    assert_eq!(explode_bytes(&AIAI_STREAM)?, b"AIAIAIAIAIAIA");

    let mut output = Vec::new();
    let stats = explode(&AIAI_STREAM[..], &mut output)?;
    assert_eq!(output, b"AIAIAIAIAIAIA");
    assert_eq!(stats.literal_count, 2);
    assert_eq!(stats.match_count, 1);
    assert_eq!(stats.longest_match, 11);
    assert_eq!(stats.output_bytes, 13);
    Ok(())
}

#[test]
fn test_empty_input_stream() -> Result<(), Box<dyn std::error::Error>> {
    let compressed = implode_bytes(&[], CompressionMode::Binary, DictionarySize::Size4K)?;
    assert_eq!(&compressed[..2], &[0, 6]);
    assert_eq!(compressed, [0x00, 0x06, 0x01, 0xFF]);
    assert!(explode_bytes(&compressed)?.is_empty());
    Ok(())
}

#[test]
fn test_repeated_pattern_compresses() -> Result<(), Box<dyn std::error::Error>> {
    let input: Vec<u8> = b"ABCD".repeat(50);
    let compressed = implode_bytes(&input, CompressionMode::Binary, DictionarySize::Size4K)?;
    assert!(compressed.len() < 200, "got {} bytes", compressed.len());
    assert_eq!(explode_bytes(&compressed)?, input);
    Ok(())
}

#[test]
fn test_ascii_run() -> Result<(), Box<dyn std::error::Error>> {
    let input = b"AAAAAAAAAA";
    let compressed = implode_bytes(input, CompressionMode::ASCII, DictionarySize::Size1K)?;
    assert_eq!(&compressed[..2], &[1, 4]);
    assert_eq!(explode_bytes(&compressed)?, input);
    Ok(())
}

#[test]
fn test_invalid_header_produces_nothing() {
    let mut output = Vec::new();
    let err = explode(&[9u8, 4, 0][..], &mut output).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidHeader);
    assert!(matches!(err, DclError::InvalidCompressionMode(9)));
    assert!(output.is_empty());

    for class in [0u8, 3, 7, 0xFF] {
        let err = explode_bytes(&[0, class, 0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidHeader);
    }
}

#[test]
fn test_header_without_body() {
    for header in [[0u8, 6, 0x00], [0, 6, 0x01], [1, 4, 0x00], [1, 5, 0xFF]] {
        let mut output = Vec::new();
        let err = explode(&header[..], &mut output).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEof, "header {header:02x?}");
        assert!(output.len() <= 1);
    }
}

#[test]
fn test_short_header() {
    for data in [&[][..], &[0u8][..], &[0u8, 6][..]] {
        let err = explode_bytes(data).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
    }
}

#[test]
fn test_every_truncation_reports_eof() -> Result<(), Box<dyn std::error::Error>> {
    let input = text_sample();

    for mode in [CompressionMode::Binary, CompressionMode::ASCII] {
        let compressed = implode_bytes(&input, mode, DictionarySize::Size2K)?;

        for cut in 0..compressed.len() {
            let mut output = Vec::new();
            let err = explode(&compressed[..cut], &mut output).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnexpectedEof, "{mode:?} cut at {cut}");
            // Whatever was decoded is a prefix of the original
            assert!(input.starts_with(&output), "{mode:?} cut at {cut}");
            if let DclError::UnexpectedEof { produced } = err {
                assert_eq!(produced, output.len() as u64);
            }
        }
    }
    Ok(())
}

#[test]
fn test_every_ascii_literal() -> Result<(), Box<dyn std::error::Error>> {
    // No byte pair repeats, so every byte goes out as a literal
    let input: Vec<u8> = (0..=255u8).collect();
    for dict_size in [
        DictionarySize::Size1K,
        DictionarySize::Size2K,
        DictionarySize::Size4K,
    ] {
        let compressed = implode_bytes(&input, CompressionMode::ASCII, dict_size)?;
        assert_eq!(explode_bytes(&compressed)?, input);

        let reversed: Vec<u8> = input.iter().rev().copied().collect();
        let compressed = implode_bytes(&reversed, CompressionMode::ASCII, dict_size)?;
        assert_eq!(explode_bytes(&compressed)?, reversed);
    }
    Ok(())
}

#[test]
fn test_distance_before_start_is_bad_data() {
    // A length-3 repetition (flag 1, length code 0b11) before any literal
    let stream = [0x00, 0x06, 0b0000_1111, 0x00, 0x00];
    let err = explode_bytes(&stream).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadData);
}

#[test]
fn test_callbacks_with_tiny_reads() -> Result<(), Box<dyn std::error::Error>> {
    let input = text_sample();
    let expected = implode_bytes(&input, CompressionMode::ASCII, DictionarySize::Size1K)?;

    let mut offset = 0;
    let mut compressed = Vec::new();
    implode(
        read_fn(|buf: &mut [u8]| {
            let n = buf.len().min(3).min(input.len() - offset);
            buf[..n].copy_from_slice(&input[offset..offset + n]);
            offset += n;
            Ok(n)
        }),
        write_fn(|data: &[u8]| {
            compressed.extend_from_slice(data);
            Ok(())
        }),
        CompressionMode::ASCII,
        DictionarySize::Size1K,
    )?;
    assert_eq!(compressed, expected);

    let mut offset = 0;
    let mut blocks = 0;
    let mut output = Vec::new();
    explode(
        read_fn(|buf: &mut [u8]| {
            let n = buf.len().min(1).min(compressed.len() - offset);
            buf[..n].copy_from_slice(&compressed[offset..offset + n]);
            offset += n;
            Ok(n)
        }),
        write_fn(|data: &[u8]| {
            blocks += 1;
            output.extend_from_slice(data);
            Ok(())
        }),
    )?;
    assert_eq!(output, input);
    assert!(blocks >= 1);
    Ok(())
}

#[test]
fn test_read_callback_failure_aborts() {
    let err = implode(
        read_fn(|_: &mut [u8]| Err(io::Error::other("source gone"))),
        Vec::new(),
        CompressionMode::Binary,
        DictionarySize::Size4K,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Aborted);

    let err = explode(
        read_fn(|_: &mut [u8]| Err(io::Error::other("source gone"))),
        Vec::new(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Aborted);
}

#[test]
fn test_write_callback_failure_aborts() {
    let err = explode(
        &AIAI_STREAM[..],
        write_fn(|_: &[u8]| Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Aborted);
}

#[test]
fn test_interrupted_reads_are_retried() -> Result<(), Box<dyn std::error::Error>> {
    let mut interrupted = false;
    let mut data = &AIAI_STREAM[..];
    let mut output = Vec::new();
    explode(
        read_fn(|buf: &mut [u8]| {
            interrupted = !interrupted;
            if interrupted {
                return Err(io::Error::from(io::ErrorKind::Interrupted));
            }
            data.read(buf)
        }),
        &mut output,
    )?;
    assert_eq!(output, b"AIAIAIAIAIAIA");
    Ok(())
}

#[test]
fn test_large_output_arrives_in_blocks() -> Result<(), Box<dyn std::error::Error>> {
    let input: Vec<u8> = (0..50_000u32).map(|i| (i % 251) as u8 ^ (i / 997) as u8).collect();
    let compressed = implode_bytes(&input, CompressionMode::Binary, DictionarySize::Size4K)?;

    let mut block_sizes = Vec::new();
    let mut output = Vec::new();
    explode(
        &compressed[..],
        write_fn(|data: &[u8]| {
            block_sizes.push(data.len());
            output.extend_from_slice(data);
            Ok(())
        }),
    )?;
    assert_eq!(output, input);
    assert!(block_sizes.len() > 1);
    assert!(block_sizes.iter().all(|&n| n <= 0x1000 + 518));
    Ok(())
}

#[test]
fn test_explode_reader_matches_explode() -> Result<(), Box<dyn std::error::Error>> {
    let input = text_sample().repeat(40);
    let compressed = implode_bytes(&input, CompressionMode::ASCII, DictionarySize::Size4K)?;

    let mut reader = ExplodeReader::new(&compressed[..])?;
    assert_eq!(reader.header().mode, CompressionMode::ASCII);
    let mut output = Vec::new();
    reader.read_to_end(&mut output)?;
    assert_eq!(output, input);
    assert!(reader.is_finished());
    Ok(())
}
