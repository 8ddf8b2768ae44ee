//! GZIP format support (RFC 1952).
//!
//! A GZIP file is a 10-byte header, optional fields selected by the flag
//! byte, a raw DEFLATE stream, and an 8-byte trailer carrying the CRC-32
//! and the uncompressed size mod 2^32. Both trailer values are verified on
//! extraction.

use ferropack_core::Crc32;
use ferropack_core::error::{CodecError, Result};
use ferropack_deflate::{ZipConfig, compress, decompress};
use std::time::{SystemTime, UNIX_EPOCH};

/// GZIP magic bytes.
pub const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// GZIP compression method: DEFLATE.
pub const CM_DEFLATE: u8 = 8;

/// GZIP header flag bits.
pub mod flags {
    /// Text file hint.
    pub const FTEXT: u8 = 0x01;
    /// Header CRC16 present.
    pub const FHCRC: u8 = 0x02;
    /// Extra field present.
    pub const FEXTRA: u8 = 0x04;
    /// Original filename present.
    pub const FNAME: u8 = 0x08;
    /// Comment present.
    pub const FCOMMENT: u8 = 0x10;
}

/// GZIP file header.
#[derive(Debug, Clone)]
pub struct GzipHeader {
    /// Compression method (8 = DEFLATE).
    pub method: u8,
    /// Flag byte.
    pub flags: u8,
    /// Modification time (Unix timestamp, 0 = unknown).
    pub mtime: u32,
    /// Extra flags (compression-level hint).
    pub xfl: u8,
    /// Operating system (255 = unknown).
    pub os: u8,
    /// Original filename, when the FNAME flag is set.
    pub filename: Option<String>,
}

impl Default for GzipHeader {
    fn default() -> Self {
        Self {
            method: CM_DEFLATE,
            flags: 0,
            mtime: 0,
            xfl: 0,
            os: 255,
            filename: None,
        }
    }
}

impl GzipHeader {
    /// Create a header carrying the given filename.
    pub fn with_filename(filename: &str) -> Self {
        Self {
            flags: flags::FNAME,
            filename: Some(filename.to_string()),
            ..Self::default()
        }
    }

    /// Set the modification time to now.
    pub fn with_mtime_now(mut self) -> Self {
        self.mtime = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0);
        self
    }

    /// Serialize the header.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&GZIP_MAGIC);
        out.push(self.method);
        out.push(self.flags);
        out.extend_from_slice(&self.mtime.to_le_bytes());
        out.push(self.xfl);
        out.push(self.os);

        if self.flags & flags::FNAME != 0 {
            if let Some(ref filename) = self.filename {
                out.extend_from_slice(filename.as_bytes());
                out.push(0);
            }
        }
    }

    /// Parse a header from the start of `data`.
    ///
    /// Returns the header and the number of bytes it occupied. Optional
    /// fields (FEXTRA, FCOMMENT, FHCRC) are skipped; FNAME is captured.
    pub fn parse(data: &[u8]) -> Result<(Self, usize)> {
        if data.len() < 10 {
            return Err(CodecError::unexpected_end((10 - data.len()) * 8));
        }
        if data[0..2] != GZIP_MAGIC {
            return Err(CodecError::bad_header(format!(
                "not a gzip stream: magic {:02x} {:02x}",
                data[0], data[1]
            )));
        }

        let method = data[2];
        if method != CM_DEFLATE {
            return Err(CodecError::unsupported_method(method as u16));
        }

        let header_flags = data[3];
        let mtime = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
        let xfl = data[8];
        let os = data[9];
        let mut offset = 10;

        if header_flags & flags::FEXTRA != 0 {
            if data.len() < offset + 2 {
                return Err(CodecError::unexpected_end(16));
            }
            let xlen = u16::from_le_bytes([data[offset], data[offset + 1]]) as usize;
            offset += 2 + xlen;
            if data.len() < offset {
                return Err(CodecError::unexpected_end((offset - data.len()) * 8));
            }
        }

        let mut filename = None;
        if header_flags & flags::FNAME != 0 {
            let (name, end) = read_null_terminated(data, offset)?;
            filename = Some(name);
            offset = end;
        }

        if header_flags & flags::FCOMMENT != 0 {
            let (_, end) = read_null_terminated(data, offset)?;
            offset = end;
        }

        if header_flags & flags::FHCRC != 0 {
            offset += 2;
            if data.len() < offset {
                return Err(CodecError::unexpected_end(16));
            }
        }

        Ok((
            Self {
                method,
                flags: header_flags,
                mtime,
                xfl,
                os,
                filename,
            },
            offset,
        ))
    }
}

/// Read a NUL-terminated string starting at `offset`; returns the string
/// and the offset just past the terminator.
fn read_null_terminated(data: &[u8], offset: usize) -> Result<(String, usize)> {
    let tail = &data[offset.min(data.len())..];
    match tail.iter().position(|&b| b == 0) {
        Some(end) => Ok((
            String::from_utf8_lossy(&tail[..end]).into_owned(),
            offset + end + 1,
        )),
        None => Err(CodecError::unexpected_end(8)),
    }
}

/// Compress `data` into a complete GZIP file.
pub fn create_gzip(data: &[u8], filename: &str, config: &ZipConfig) -> Vec<u8> {
    let mut header = if filename.is_empty() {
        GzipHeader::default()
    } else {
        GzipHeader::with_filename(filename)
    }
    .with_mtime_now();
    header.xfl = match config.level {
        0..=1 => 4, // fastest
        9 => 2,     // maximum compression
        _ => 0,
    };

    let mut out = Vec::new();
    header.write_to(&mut out);
    out.extend_from_slice(&compress(data, config));
    out.extend_from_slice(&Crc32::compute(data).to_le_bytes());
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out
}

/// Extract a GZIP file, verifying the trailer CRC-32 and size.
pub fn extract_gzip(data: &[u8]) -> Result<Vec<u8>> {
    let (_, header_len) = GzipHeader::parse(data)?;

    if data.len() < header_len + 8 {
        return Err(CodecError::unexpected_end(
            (header_len + 8 - data.len()) * 8,
        ));
    }

    let deflate_stream = &data[header_len..data.len() - 8];
    let trailer = &data[data.len() - 8..];
    let expected_crc = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    let expected_size = u32::from_le_bytes([trailer[4], trailer[5], trailer[6], trailer[7]]);

    let decompressed = decompress(deflate_stream)?;

    let computed_crc = Crc32::compute(&decompressed);
    if computed_crc != expected_crc {
        return Err(CodecError::crc_mismatch(expected_crc, computed_crc));
    }
    if decompressed.len() as u32 != expected_size {
        return Err(CodecError::size_mismatch(
            expected_size as usize,
            decompressed.len(),
        ));
    }

    Ok(decompressed)
}
