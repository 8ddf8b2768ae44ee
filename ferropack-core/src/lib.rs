//! # ferropack Core
//!
//! Core components for the ferropack DEFLATE codec.
//!
//! This crate provides the fundamental building blocks shared by the codec
//! and container layers:
//!
//! - [`bitstream`]: LSB-first bit reader/writer for DEFLATE streams
//! - [`crc`]: CRC-32 checksum used by ZIP and GZIP framing
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! ferropack is a layered stack:
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │ Container: ZIP / GZIP framing, auto-detection  │
//! │            (ferropack-archive)                 │
//! ├────────────────────────────────────────────────┤
//! │ Codec: DEFLATE — LZ77 + canonical Huffman      │
//! │            (ferropack-deflate)                 │
//! ├────────────────────────────────────────────────┤
//! │ BitStream / CRC (this crate)                   │
//! └────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod crc;
pub mod error;

// Re-exports for convenience
pub use bitstream::{BitReader, BitWriter, reverse_bits};
pub use crc::Crc32;
pub use error::{CodecError, Result};
