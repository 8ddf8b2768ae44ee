//! # ferropack Deflate
//!
//! Pure Rust implementation of the DEFLATE compressed data format
//! (RFC 1951): LZ77 match-finding, canonical Huffman coding, and the
//! stored/fixed/dynamic block machinery on both the compress and
//! decompress sides.
//!
//! ## Example
//!
//! ```rust
//! use ferropack_deflate::{ZipConfig, compress, decompress};
//!
//! let original = b"Hello, World! Hello, World!";
//! let compressed = compress(original, &ZipConfig::default());
//! let decompressed = decompress(&compressed).unwrap();
//! assert_eq!(&decompressed, original);
//! ```
//!
//! ## Compression Levels
//!
//! - Level 0: no compression (stored blocks)
//! - Level 1-4: fast, shallow match search
//! - Level 5-6: balanced (default is 5)
//! - Level 7-9: deepest search, best ratio

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod deflate;
pub mod freq;
pub mod huffman;
pub mod inflate;
pub mod lz77;
pub mod tables;
pub mod token;

// Re-exports
pub use config::ZipConfig;
pub use deflate::{DeflateCompressor, compress};
pub use freq::FrequencyCollector;
pub use huffman::{HuffmanTable, HuffmanTree};
pub use inflate::{InflateDecompressor, decompress};
pub use lz77::{Lz77Matcher, Match};
pub use token::Token;
