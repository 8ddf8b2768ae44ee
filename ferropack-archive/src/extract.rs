//! Container auto-detection and extraction.

use crate::detect::ContainerFormat;
use crate::gzip::extract_gzip;
use crate::zip::extract_zip;
use ferropack_core::error::Result;
use ferropack_deflate::decompress;

/// Extract compressed data, auto-detecting the container.
///
/// `1F 8B` selects the GZIP path, `50 4B 03 04` the ZIP path; anything else
/// is treated as a headerless raw DEFLATE stream. Errors from the selected
/// path are returned as-is — a stream that matched a container magic is
/// never retried as raw DEFLATE.
pub fn extract(data: &[u8]) -> Result<Vec<u8>> {
    match ContainerFormat::from_magic(data) {
        ContainerFormat::Gzip => extract_gzip(data),
        ContainerFormat::Zip => extract_zip(data),
        ContainerFormat::Raw => decompress(data),
    }
}
