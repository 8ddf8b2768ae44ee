//! ZIP container support (PKWARE APPNOTE subset).
//!
//! Writing produces a single-entry archive: local file header, entry data,
//! central directory record, and end-of-central-directory record, so the
//! output opens in standard tools. Reading parses only the first local file
//! header — multi-entry extraction is out of scope.

use ferropack_core::Crc32;
use ferropack_core::error::{CodecError, Result};
use ferropack_deflate::{ZipConfig, compress, decompress};

/// Local file header signature (`PK\x03\x04`).
pub const LOCAL_FILE_HEADER_SIG: u32 = 0x04034B50;

/// Central directory header signature (`PK\x01\x02`).
pub const CENTRAL_DIR_HEADER_SIG: u32 = 0x02014B50;

/// End of central directory signature (`PK\x05\x06`).
pub const END_OF_CENTRAL_DIR_SIG: u32 = 0x06054B50;

/// Compression method: stored (no compression).
pub const METHOD_STORED: u16 = 0;

/// Compression method: DEFLATE.
pub const METHOD_DEFLATE: u16 = 8;

/// Version needed to extract a deflate entry (2.0).
const VERSION_NEEDED: u16 = 20;

/// Fixed DOS timestamp: 1980-01-01 00:00:00, the epoch of the format.
const DOS_TIME: u16 = 0;
const DOS_DATE: u16 = 0x0021;

/// General purpose flag bit for a trailing data descriptor.
const FLAG_DATA_DESCRIPTOR: u16 = 0x0008;

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// ZIP local file header.
#[derive(Debug, Clone)]
pub struct LocalFileHeader {
    /// General purpose bit flags.
    pub flags: u16,
    /// Compression method (0 = stored, 8 = deflate).
    pub method: u16,
    /// CRC-32 of the uncompressed data.
    pub crc32: u32,
    /// Compressed size in bytes.
    pub compressed_size: u32,
    /// Uncompressed size in bytes.
    pub uncompressed_size: u32,
    /// Entry file name.
    pub filename: String,
}

impl LocalFileHeader {
    /// Serialize the header.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        put_u32(out, LOCAL_FILE_HEADER_SIG);
        put_u16(out, VERSION_NEEDED);
        put_u16(out, self.flags);
        put_u16(out, self.method);
        put_u16(out, DOS_TIME);
        put_u16(out, DOS_DATE);
        put_u32(out, self.crc32);
        put_u32(out, self.compressed_size);
        put_u32(out, self.uncompressed_size);
        put_u16(out, self.filename.len() as u16);
        put_u16(out, 0); // extra field length
        out.extend_from_slice(self.filename.as_bytes());
    }

    /// Parse a local file header from the start of `data`.
    ///
    /// Returns the header and the offset of the entry data.
    pub fn parse(data: &[u8]) -> Result<(Self, usize)> {
        if data.len() < 30 {
            return Err(CodecError::unexpected_end((30 - data.len()) * 8));
        }

        let signature = read_u32(data, 0);
        if signature != LOCAL_FILE_HEADER_SIG {
            return Err(CodecError::bad_header(format!(
                "not a zip local file header: signature {signature:#010x}"
            )));
        }

        let flags = read_u16(data, 6);
        let method = read_u16(data, 8);
        let crc32 = read_u32(data, 14);
        let compressed_size = read_u32(data, 18);
        let uncompressed_size = read_u32(data, 22);
        let filename_len = read_u16(data, 26) as usize;
        let extra_len = read_u16(data, 28) as usize;

        let data_offset = 30 + filename_len + extra_len;
        if data.len() < data_offset {
            return Err(CodecError::unexpected_end((data_offset - data.len()) * 8));
        }
        let filename = String::from_utf8_lossy(&data[30..30 + filename_len]).into_owned();

        Ok((
            Self {
                flags,
                method,
                crc32,
                compressed_size,
                uncompressed_size,
                filename,
            },
            data_offset,
        ))
    }
}

/// Compress `data` into a single-entry ZIP archive.
pub fn create_zip(data: &[u8], filename: &str, config: &ZipConfig) -> Vec<u8> {
    let (method, payload) = if config.force_store || config.level == 0 {
        (METHOD_STORED, data.to_vec())
    } else {
        (METHOD_DEFLATE, compress(data, config))
    };

    let header = LocalFileHeader {
        flags: 0,
        method,
        crc32: Crc32::compute(data),
        compressed_size: payload.len() as u32,
        uncompressed_size: data.len() as u32,
        filename: filename.to_string(),
    };

    let mut out = Vec::with_capacity(payload.len() + 128);
    header.write_to(&mut out);
    out.extend_from_slice(&payload);

    // Central directory record pointing back at the single entry, then the
    // end-of-central-directory record.
    let central_dir_offset = out.len() as u32;
    put_u32(&mut out, CENTRAL_DIR_HEADER_SIG);
    put_u16(&mut out, VERSION_NEEDED); // version made by
    put_u16(&mut out, VERSION_NEEDED); // version needed
    put_u16(&mut out, header.flags);
    put_u16(&mut out, header.method);
    put_u16(&mut out, DOS_TIME);
    put_u16(&mut out, DOS_DATE);
    put_u32(&mut out, header.crc32);
    put_u32(&mut out, header.compressed_size);
    put_u32(&mut out, header.uncompressed_size);
    put_u16(&mut out, header.filename.len() as u16);
    put_u16(&mut out, 0); // extra field length
    put_u16(&mut out, 0); // comment length
    put_u16(&mut out, 0); // disk number start
    put_u16(&mut out, 0); // internal attributes
    put_u32(&mut out, 0); // external attributes
    put_u32(&mut out, 0); // local header offset
    out.extend_from_slice(header.filename.as_bytes());
    let central_dir_size = out.len() as u32 - central_dir_offset;

    put_u32(&mut out, END_OF_CENTRAL_DIR_SIG);
    put_u16(&mut out, 0); // this disk
    put_u16(&mut out, 0); // central directory disk
    put_u16(&mut out, 1); // entries on this disk
    put_u16(&mut out, 1); // total entries
    put_u32(&mut out, central_dir_size);
    put_u32(&mut out, central_dir_offset);
    put_u16(&mut out, 0); // comment length

    out
}

/// Extract the first entry of a ZIP archive, verifying its CRC-32 and size.
pub fn extract_zip(data: &[u8]) -> Result<Vec<u8>> {
    let (header, data_offset) = LocalFileHeader::parse(data)?;

    if header.flags & FLAG_DATA_DESCRIPTOR != 0 {
        // Sizes live in a trailing descriptor we cannot locate without
        // decoding blind; out of scope for single-entry extraction.
        return Err(CodecError::bad_header(
            "zip entries with data descriptors are not supported",
        ));
    }

    let compressed_size = header.compressed_size as usize;
    if data.len() < data_offset + compressed_size {
        return Err(CodecError::unexpected_end(
            (data_offset + compressed_size - data.len()) * 8,
        ));
    }
    let payload = &data[data_offset..data_offset + compressed_size];

    let decompressed = match header.method {
        METHOD_STORED => payload.to_vec(),
        METHOD_DEFLATE => decompress(payload)?,
        other => return Err(CodecError::unsupported_method(other)),
    };

    let computed_crc = Crc32::compute(&decompressed);
    if computed_crc != header.crc32 {
        return Err(CodecError::crc_mismatch(header.crc32, computed_crc));
    }
    if decompressed.len() != header.uncompressed_size as usize {
        return Err(CodecError::size_mismatch(
            header.uncompressed_size as usize,
            decompressed.len(),
        ));
    }

    Ok(decompressed)
}
