//! Error types for ferropack operations.
//!
//! Decoding untrusted data can fail in many well-defined ways; every one of
//! them is reported through [`CodecError`] rather than a panic. Encoder-side
//! invariant violations are programming errors and are guarded with debug
//! assertions instead.

use thiserror::Error;

/// The main error type for ferropack operations.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Malformed or unrecognized container header.
    #[error("Bad header: {message}")]
    BadHeader {
        /// Description of the header problem.
        message: String,
    },

    /// Unsupported compression method in a container header.
    #[error("Unsupported compression method: {method}")]
    UnsupportedMethod {
        /// The method identifier found in the header.
        method: u16,
    },

    /// Structurally invalid DEFLATE block data.
    #[error("Corrupt block at byte {offset}: {message}")]
    CorruptBlock {
        /// Byte offset where the corruption was detected.
        offset: usize,
        /// Description of the corruption.
        message: String,
    },

    /// Code lengths that do not describe a decodable Huffman table.
    #[error("Invalid Huffman table: {message}")]
    InvalidHuffmanTable {
        /// Description of the table problem.
        message: String,
    },

    /// Input ran out before the stream was complete.
    #[error("Unexpected end of input: needed {needed} more bits")]
    UnexpectedEnd {
        /// Number of bits that were expected but not available.
        needed: usize,
    },

    /// CRC-32 checksum mismatch.
    #[error("CRC mismatch: expected {expected:#010x}, computed {computed:#010x}")]
    CrcMismatch {
        /// Expected CRC value from the container.
        expected: u32,
        /// Computed CRC value from the decoded data.
        computed: u32,
    },

    /// Decoded size disagrees with the size recorded in the container.
    #[error("Size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        /// Size recorded in the container.
        expected: usize,
        /// Size actually decoded.
        actual: usize,
    },
}

/// Result type alias for ferropack operations.
pub type Result<T> = std::result::Result<T, CodecError>;

impl CodecError {
    /// Create a bad header error.
    pub fn bad_header(message: impl Into<String>) -> Self {
        Self::BadHeader {
            message: message.into(),
        }
    }

    /// Create an unsupported method error.
    pub fn unsupported_method(method: u16) -> Self {
        Self::UnsupportedMethod { method }
    }

    /// Create a corrupt block error.
    pub fn corrupt(offset: usize, message: impl Into<String>) -> Self {
        Self::CorruptBlock {
            offset,
            message: message.into(),
        }
    }

    /// Create an invalid Huffman table error.
    pub fn invalid_table(message: impl Into<String>) -> Self {
        Self::InvalidHuffmanTable {
            message: message.into(),
        }
    }

    /// Create an unexpected end of input error.
    pub fn unexpected_end(needed: usize) -> Self {
        Self::UnexpectedEnd { needed }
    }

    /// Create a CRC mismatch error.
    pub fn crc_mismatch(expected: u32, computed: u32) -> Self {
        Self::CrcMismatch { expected, computed }
    }

    /// Create a size mismatch error.
    pub fn size_mismatch(expected: usize, actual: usize) -> Self {
        Self::SizeMismatch { expected, actual }
    }
}
