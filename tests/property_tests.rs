//! Property-based tests for the DCL codec
//!
//! Randomized inputs check that explode never panics on garbage and that
//! every implode output decodes back to its input exactly.

use pkware_dcl::{
    explode, explode_bytes, implode_bytes, CompressionMode, DictionarySize, ImplodeWriter,
};
use proptest::prelude::*;
use std::io::Write;

const MODES: [CompressionMode; 2] = [CompressionMode::Binary, CompressionMode::ASCII];
const DICT_SIZES: [DictionarySize; 3] = [
    DictionarySize::Size1K,
    DictionarySize::Size2K,
    DictionarySize::Size4K,
];

fn any_mode() -> impl Strategy<Value = CompressionMode> {
    prop_oneof![Just(CompressionMode::Binary), Just(CompressionMode::ASCII)]
}

fn any_dict_size() -> impl Strategy<Value = DictionarySize> {
    prop_oneof![
        Just(DictionarySize::Size1K),
        Just(DictionarySize::Size2K),
        Just(DictionarySize::Size4K),
    ]
}

proptest! {
    #[test]
    fn test_decompression_never_panics(data in prop::collection::vec(any::<u8>(), 0..1000)) {
        // Random bytes are rarely a valid stream; errors are fine, panics are not
        let _ = explode_bytes(&data);
    }

    #[test]
    fn test_valid_header_random_body_never_panics(
        mode in 0u8..2,
        class in 4u8..7,
        body in prop::collection::vec(any::<u8>(), 0..600),
    ) {
        let mut data = vec![mode, class];
        data.extend_from_slice(&body);

        let mut output = Vec::new();
        if let Err(err) = explode(&data[..], &mut output) {
            // Bytes already produced stay produced
            if let pkware_dcl::DclError::UnexpectedEof { produced } = err {
                prop_assert_eq!(produced, output.len() as u64);
            }
        }
    }
}

proptest! {
    #[test]
    fn test_round_trip_any_data(
        data in prop::collection::vec(any::<u8>(), 0..3000),
        mode in any_mode(),
        dict_size in any_dict_size(),
    ) {
        let compressed = implode_bytes(&data, mode, dict_size)?;
        prop_assert_eq!(&compressed[..2], &[mode as u8, dict_size.bits()]);
        let decompressed = explode_bytes(&compressed)?;
        prop_assert_eq!(&data[..], &decompressed[..]);
    }

    #[test]
    fn test_small_inputs(data in prop::collection::vec(any::<u8>(), 0..10)) {
        for mode in MODES {
            for dict_size in DICT_SIZES {
                let compressed = implode_bytes(&data, mode, dict_size)?;
                let decompressed = explode_bytes(&compressed)?;
                prop_assert_eq!(&data[..], &decompressed[..]);
            }
        }
    }
}

proptest! {
    #[test]
    fn test_ascii_round_trip(
        data in prop::collection::vec(prop::char::range(' ', '~'), 10..500)
    ) {
        let ascii_bytes: Vec<u8> = data.into_iter().map(|c| c as u8).collect();

        for dict_size in DICT_SIZES {
            let compressed = implode_bytes(&ascii_bytes, CompressionMode::ASCII, dict_size)?;
            let decompressed = explode_bytes(&compressed)?;
            prop_assert_eq!(&ascii_bytes[..], &decompressed[..]);
        }
    }
}

proptest! {
    #[test]
    fn test_repetitive_patterns(
        pattern in prop::collection::vec(any::<u8>(), 1..20),
        repeat_count in 2..80usize,
    ) {
        let data = pattern.repeat(repeat_count);

        for mode in MODES {
            for dict_size in DICT_SIZES {
                let compressed = implode_bytes(&data, mode, dict_size)?;
                let decompressed = explode_bytes(&compressed)?;
                prop_assert_eq!(&data[..], &decompressed[..]);

                prop_assert!(
                    compressed.len() <= data.len() + 8,
                    "Compression expanded too much: {} -> {}",
                    data.len(),
                    compressed.len()
                );
            }
        }
    }

    #[test]
    fn test_single_byte_runs(byte_value in any::<u8>(), size in 1..2000usize) {
        let data = vec![byte_value; size];

        for mode in MODES {
            for dict_size in DICT_SIZES {
                let compressed = implode_bytes(&data, mode, dict_size)?;
                let decompressed = explode_bytes(&compressed)?;
                prop_assert_eq!(&data[..], &decompressed[..]);
            }
        }
    }
}

proptest! {
    #[test]
    fn test_expansion_bound(data in prop::collection::vec(any::<u8>(), 0..2000)) {
        // Binary literals cost 9 bits; everything else costs less than the
        // literals it replaces
        let compressed = implode_bytes(&data, CompressionMode::Binary, DictionarySize::Size4K)?;
        prop_assert!(compressed.len() <= 2 + (data.len() * 9 + 16).div_ceil(8));
    }

    #[test]
    fn test_compression_deterministic(
        data in prop::collection::vec(any::<u8>(), 10..500),
        mode in any_mode(),
        dict_size in any_dict_size(),
    ) {
        let compressed1 = implode_bytes(&data, mode, dict_size)?;
        let compressed2 = implode_bytes(&data, mode, dict_size)?;
        prop_assert_eq!(compressed1, compressed2);
    }

    #[test]
    fn test_chunked_writes_match_one_shot(
        data in prop::collection::vec(any::<u8>(), 0..20_000),
        chunk_size in 1..5000usize,
        mode in any_mode(),
        dict_size in any_dict_size(),
    ) {
        let expected = implode_bytes(&data, mode, dict_size)?;

        let mut writer = ImplodeWriter::new(Vec::new(), mode, dict_size)?;
        for chunk in data.chunks(chunk_size) {
            writer.write_all(chunk)?;
        }
        let compressed = writer.finish()?;
        prop_assert_eq!(compressed, expected);
    }
}
