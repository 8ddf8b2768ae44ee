//! End-to-end round-trip and corrupt-input tests across both containers.

use ferropack_archive::{create_gzip, create_zip, extract, extract_gzip, extract_zip};
use ferropack_core::CodecError;
use ferropack_deflate::{ZipConfig, compress};

/// Deterministic xorshift stream for high-entropy inputs.
fn random_bytes(size: usize, mut state: u32) -> Vec<u8> {
    (0..size)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect()
}

fn interesting_inputs() -> Vec<Vec<u8>> {
    vec![
        Vec::new(),
        vec![b'x'],
        vec![0u8; 10000],
        b"AAAAAAAAAABBBBBBBBBBCCCCCCCCCC".to_vec(),
        b"The quick brown fox jumps over the lazy dog. ".repeat(50),
        random_bytes(4096, 0xDEADBEEF),
        (0..=255u8).collect(),
        // Window-boundary lengths.
        random_bytes(32767, 1),
        random_bytes(32768, 2),
        random_bytes(32769, 3),
    ]
}

#[test]
fn test_gzip_roundtrip_all_inputs() {
    for input in interesting_inputs() {
        let archived = create_gzip(&input, "entry.bin", &ZipConfig::default());
        assert_eq!(
            extract(&archived).unwrap(),
            input,
            "gzip roundtrip failed for {} bytes",
            input.len()
        );
    }
}

#[test]
fn test_zip_roundtrip_all_inputs() {
    for input in interesting_inputs() {
        let archived = create_zip(&input, "entry.bin", &ZipConfig::default());
        assert_eq!(
            extract(&archived).unwrap(),
            input,
            "zip roundtrip failed for {} bytes",
            input.len()
        );
    }
}

#[test]
fn test_roundtrip_level_sweep() {
    let input = b"level sweep data: abcabcabc abcabcabc 0123456789 0123456789 "
        .repeat(20);
    for level in 0..=9 {
        let config = ZipConfig::with_level(level);
        let gz = create_gzip(&input, "sweep", &config);
        assert_eq!(extract(&gz).unwrap(), input, "gzip level {level}");
        let zip = create_zip(&input, "sweep", &config);
        assert_eq!(extract(&zip).unwrap(), input, "zip level {level}");
    }
}

#[test]
fn test_roundtrip_force_store() {
    let input = random_bytes(2048, 42);
    let config = ZipConfig::new(9, 32768, true);
    assert_eq!(extract(&create_gzip(&input, "s", &config)).unwrap(), input);
    assert_eq!(extract(&create_zip(&input, "s", &config)).unwrap(), input);
}

#[test]
fn test_roundtrip_small_window() {
    let input = b"windowed ".repeat(5000);
    let config = ZipConfig::new(9, 64, false);
    let archived = create_gzip(&input, "w", &config);
    assert_eq!(extract(&archived).unwrap(), input);
}

#[test]
fn test_raw_deflate_fallback() {
    for input in interesting_inputs() {
        let raw = compress(&input, &ZipConfig::default());
        assert_eq!(
            extract(&raw).unwrap(),
            input,
            "raw fallback failed for {} bytes",
            input.len()
        );
    }
}

#[test]
fn test_named_subpaths_match_autodetect() {
    let input = b"the named entry points agree with extract()";
    let config = ZipConfig::default();

    let gz = create_gzip(input, "n", &config);
    assert_eq!(extract_gzip(&gz).unwrap(), extract(&gz).unwrap());

    let zip = create_zip(input, "n", &config);
    assert_eq!(extract_zip(&zip).unwrap(), extract(&zip).unwrap());
}

#[test]
fn test_run_collapses_into_back_reference() {
    // Ten bytes of 'A' must compress below the input size before framing,
    // proving the run became a single match token.
    let input = b"AAAAAAAAAA";
    for level in 1..=9 {
        let raw = compress(input, &ZipConfig::with_level(level));
        assert!(
            raw.len() < input.len(),
            "level {level}: {} bytes raw deflate",
            raw.len()
        );
        assert_eq!(extract(&raw).unwrap(), input);
    }
}

#[test]
fn test_truncated_gzip_header() {
    let archived = create_gzip(b"payload", "t", &ZipConfig::default());
    for cut in [0, 1, 5, 9] {
        assert!(
            extract(&archived[..cut]).is_err(),
            "cut at {cut} must not extract"
        );
    }
}

#[test]
fn test_reserved_block_type_is_corrupt() {
    // Raw stream whose first block claims BTYPE=11.
    let result = extract(&[0b0000_0111, 0x00]);
    assert!(matches!(result, Err(CodecError::CorruptBlock { .. })));
}

#[test]
fn test_bad_zip_signature() {
    let mut archived = create_zip(b"payload", "t", &ZipConfig::default());
    archived[2] = 0xFF; // No longer PK\x03\x04; falls back to raw DEFLATE.
    assert!(extract(&archived).is_err());
}

#[test]
fn test_gzip_trailer_verification() {
    let mut archived = create_gzip(b"verified payload", "t", &ZipConfig::default());
    let n = archived.len();
    archived[n - 6] ^= 0x10; // CRC field
    assert!(matches!(
        extract(&archived),
        Err(CodecError::CrcMismatch { .. })
    ));
}

#[test]
fn test_extract_never_panics_on_bit_flips() {
    // Flip every byte of a small archive one at a time; extraction must
    // either fail cleanly or produce some output, never panic.
    let archived = create_gzip(b"bit flip probe", "p", &ZipConfig::default());
    for i in 0..archived.len() {
        let mut mutated = archived.clone();
        mutated[i] ^= 0xFF;
        let _ = extract(&mutated);
    }
}
