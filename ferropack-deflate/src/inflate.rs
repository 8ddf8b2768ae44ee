//! DEFLATE decompression (RFC 1951).
//!
//! The decoder consumes untrusted input: every malformed header, table, or
//! back-reference is a specific [`CodecError`], never a panic or an
//! out-of-bounds read.

use crate::huffman::HuffmanTable;
use crate::tables::{
    CODE_LENGTH_ORDER, DISTANCE_EXTRA_BITS, LENGTH_EXTRA_BITS, decode_distance, decode_length,
    fixed_distance_table, fixed_litlen_table,
};
use ferropack_core::BitReader;
use ferropack_core::error::{CodecError, Result};

/// DEFLATE decompressor.
///
/// Block loop: read BFINAL and BTYPE, dispatch to the stored, fixed, or
/// dynamic handler, repeat until the final block. The output buffer doubles
/// as the back-reference window, so no separate history is kept.
#[derive(Debug, Default)]
pub struct InflateDecompressor {
    output: Vec<u8>,
    final_block: bool,
}

impl InflateDecompressor {
    /// Create a fresh decompressor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decompress a complete DEFLATE stream.
    pub fn decompress(mut self, data: &[u8]) -> Result<Vec<u8>> {
        let mut reader = BitReader::new(data);
        while !self.final_block {
            self.process_block(&mut reader)?;
        }
        Ok(self.output)
    }

    /// Read one block header and dispatch on BTYPE.
    fn process_block(&mut self, reader: &mut BitReader<'_>) -> Result<()> {
        self.final_block = reader.read_bits(1)? == 1;
        let btype = reader.read_bits(2)?;

        match btype {
            0 => self.process_store_block(reader),
            1 => self.process_fixed_block(reader),
            2 => self.process_dynamic_block(reader),
            _ => Err(CodecError::corrupt(
                reader.byte_pos(),
                "reserved block type 3",
            )),
        }
    }

    /// Stored block: byte-align, LEN/NLEN, raw payload.
    fn process_store_block(&mut self, reader: &mut BitReader<'_>) -> Result<()> {
        reader.align_to_byte();

        let len = reader.read_bits(16)? as u16;
        let nlen = reader.read_bits(16)? as u16;
        if len != !nlen {
            return Err(CodecError::corrupt(
                reader.byte_pos(),
                format!("LEN/NLEN mismatch: {len:#06x} vs {nlen:#06x}"),
            ));
        }

        let start = self.output.len();
        self.output.resize(start + len as usize, 0);
        reader.read_bytes(&mut self.output[start..])
    }

    /// Fixed-Huffman block: predefined tables, no transmission.
    fn process_fixed_block(&mut self, reader: &mut BitReader<'_>) -> Result<()> {
        self.decode_tokens(reader, fixed_litlen_table(), fixed_distance_table())
    }

    /// Dynamic-Huffman block: decode the transmitted tables, then the data.
    fn process_dynamic_block(&mut self, reader: &mut BitReader<'_>) -> Result<()> {
        let hlit = reader.read_bits(5)? as usize + 257;
        let hdist = reader.read_bits(5)? as usize + 1;
        let hclen = reader.read_bits(4)? as usize + 4;

        // Code-length-alphabet lengths arrive in a fixed permutation order.
        let mut cl_lengths = [0u8; 19];
        for &order in CODE_LENGTH_ORDER.iter().take(hclen) {
            cl_lengths[order] = reader.read_bits(3)? as u8;
        }
        let cl_table = HuffmanTable::build(&cl_lengths)?;

        // Decode the literal/length and distance lengths as one array;
        // codes 16-18 are run-length instructions, not lengths.
        let mut lengths = vec![0u8; hlit + hdist];
        let mut i = 0;
        while i < lengths.len() {
            let code = cl_table.decode(reader)?;
            match code {
                0..=15 => {
                    lengths[i] = code as u8;
                    i += 1;
                }
                16 => {
                    if i == 0 {
                        return Err(CodecError::invalid_table(
                            "repeat code with no previous length",
                        ));
                    }
                    let repeat = reader.read_bits(2)? as usize + 3;
                    let prev = lengths[i - 1];
                    if i + repeat > lengths.len() {
                        return Err(CodecError::invalid_table("length run past table end"));
                    }
                    lengths[i..i + repeat].fill(prev);
                    i += repeat;
                }
                17 => {
                    let repeat = reader.read_bits(3)? as usize + 3;
                    if i + repeat > lengths.len() {
                        return Err(CodecError::invalid_table("zero run past table end"));
                    }
                    i += repeat;
                }
                18 => {
                    let repeat = reader.read_bits(7)? as usize + 11;
                    if i + repeat > lengths.len() {
                        return Err(CodecError::invalid_table("zero run past table end"));
                    }
                    i += repeat;
                }
                _ => {
                    return Err(CodecError::invalid_table(format!(
                        "invalid code-length symbol {code}"
                    )));
                }
            }
        }

        let lit_table = HuffmanTable::build(&lengths[..hlit])?;
        let dist_table = HuffmanTable::build(&lengths[hlit..])?;

        self.decode_tokens(reader, &lit_table, &dist_table)
    }

    /// Decode literal/match tokens until end-of-block.
    fn decode_tokens(
        &mut self,
        reader: &mut BitReader<'_>,
        lit_table: &HuffmanTable,
        dist_table: &HuffmanTable,
    ) -> Result<()> {
        loop {
            let symbol = lit_table.decode(reader)?;
            match symbol {
                0..=255 => self.output.push(symbol as u8),
                256 => return Ok(()),
                257..=285 => {
                    let extra_bits = LENGTH_EXTRA_BITS[(symbol - 257) as usize];
                    let extra = reader.read_bits(extra_bits)? as u16;
                    let length = decode_length(symbol, extra) as usize;

                    let dist_symbol = dist_table.decode(reader)?;
                    if dist_symbol >= 30 {
                        return Err(CodecError::corrupt(
                            reader.byte_pos(),
                            format!("invalid distance code {dist_symbol}"),
                        ));
                    }
                    let extra_bits = DISTANCE_EXTRA_BITS[dist_symbol as usize];
                    let extra = reader.read_bits(extra_bits)? as u16;
                    let distance = decode_distance(dist_symbol, extra) as usize;

                    self.copy_match(length, distance, reader.byte_pos())?;
                }
                _ => {
                    return Err(CodecError::corrupt(
                        reader.byte_pos(),
                        format!("invalid literal/length symbol {symbol}"),
                    ));
                }
            }
        }
    }

    /// Expand one back-reference.
    ///
    /// Copies byte by byte: `distance < length` is legal and means the match
    /// reads bytes it is itself producing, turning a short back-reference
    /// into a repeated pattern.
    fn copy_match(&mut self, length: usize, distance: usize, offset: usize) -> Result<()> {
        if distance > self.output.len() {
            return Err(CodecError::corrupt(
                offset,
                format!(
                    "distance {distance} exceeds {} bytes of output",
                    self.output.len()
                ),
            ));
        }

        let mut from = self.output.len() - distance;
        for _ in 0..length {
            let byte = self.output[from];
            self.output.push(byte);
            from += 1;
        }
        Ok(())
    }
}

/// Decompress a raw DEFLATE stream.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    InflateDecompressor::new().decompress(data)
}
