//! # ferropack Archive
//!
//! ZIP and GZIP container framing over the ferropack DEFLATE codec, with
//! format auto-detection on the extraction side.
//!
//! ## Example
//!
//! ```rust
//! use ferropack_archive::{create_gzip, extract};
//! use ferropack_deflate::ZipConfig;
//!
//! let data = b"Hello, World!";
//! let archived = create_gzip(data, "hello.txt", &ZipConfig::default());
//! assert_eq!(extract(&archived).unwrap(), data);
//! ```
//!
//! Extraction auto-detects the container from its magic bytes and falls
//! back to treating the input as a headerless raw DEFLATE stream. Callers
//! that already know the format can call [`extract_gzip`] or
//! [`extract_zip`] directly.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod detect;
pub mod extract;
pub mod gzip;
pub mod zip;

// Re-exports
pub use detect::ContainerFormat;
pub use extract::extract;
pub use gzip::{GzipHeader, create_gzip, extract_gzip};
pub use zip::{LocalFileHeader, create_zip, extract_zip};
