//! DEFLATE compression (RFC 1951).
//!
//! The compressor runs the whole input through one pipeline: LZ77
//! tokenization, frequency tallying, then a three-way cost comparison
//! between stored, fixed-Huffman, and dynamic-Huffman encodings. Whichever
//! costs the fewest bits is emitted as a single block (the store path chunks
//! at the 65535-byte LEN limit). Ties favor fixed over dynamic — same size,
//! cheaper decode — and store wins only when strictly smallest.

use crate::config::ZipConfig;
use crate::freq::FrequencyCollector;
use crate::huffman::{END_OF_BLOCK, HuffmanTree, MAX_CODE_LENGTH};
use crate::lz77::Lz77Matcher;
use crate::tables::{
    CODE_LENGTH_ORDER, distance_to_code, fixed_distance_tree, fixed_litlen_tree, length_to_code,
};
use crate::token::Token;
use ferropack_core::BitWriter;

/// Largest payload of a single stored block (16-bit LEN field).
const MAX_STORED_BLOCK: usize = 65535;

/// Per-block framing overhead of the store path: 3 header bits, up to 7
/// alignment bits, and the two 16-bit length fields.
const STORED_FRAMING_BITS: u64 = 40;

/// One RLE-compressed code-length symbol of a dynamic block header.
#[derive(Debug, Clone, Copy)]
struct ClSymbol {
    symbol: u8,
    extra: u8,
    extra_bits: u8,
}

/// Everything needed to cost and emit a dynamic-Huffman block.
///
/// Built once per block so the estimate and the emission agree exactly.
#[derive(Debug)]
struct DynamicPlan {
    lit_tree: HuffmanTree,
    dist_tree: HuffmanTree,
    cl_tree: HuffmanTree,
    cl_symbols: Vec<ClSymbol>,
    hlit: usize,
    hdist: usize,
    hclen: usize,
}

impl DynamicPlan {
    fn prepare(freqs: &FrequencyCollector) -> Self {
        let lit_tree = HuffmanTree::build(freqs.lit_len_freqs(), MAX_CODE_LENGTH);

        // A block with no matches still transmits a distance table; give it
        // one phantom code so the header stays well-formed.
        let mut dist_freqs = *freqs.dist_freqs();
        if dist_freqs.iter().all(|&f| f == 0) {
            dist_freqs[0] = 1;
        }
        let dist_tree = HuffmanTree::build(&dist_freqs, MAX_CODE_LENGTH);

        let hlit = last_used(lit_tree.bit_lengths(), 257);
        let hdist = last_used(dist_tree.bit_lengths(), 1);

        let mut combined = Vec::with_capacity(hlit + hdist);
        combined.extend_from_slice(&lit_tree.bit_lengths()[..hlit]);
        combined.extend_from_slice(&dist_tree.bit_lengths()[..hdist]);
        let (cl_symbols, cl_freqs) = rle_encode_lengths(&combined);

        let cl_tree = HuffmanTree::build(&cl_freqs, 7);
        let mut hclen = 4;
        for (i, &order) in CODE_LENGTH_ORDER.iter().enumerate() {
            if cl_tree.bit_lengths()[order] != 0 {
                hclen = hclen.max(i + 1);
            }
        }

        Self {
            lit_tree,
            dist_tree,
            cl_tree,
            cl_symbols,
            hlit,
            hdist,
            hclen,
        }
    }

    /// Exact bit cost of the dynamic table transmission.
    fn header_bits(&self) -> u64 {
        let mut bits = 5 + 5 + 4 + 3 * self.hclen as u64;
        for sym in &self.cl_symbols {
            bits += self.cl_tree.bit_lengths()[sym.symbol as usize] as u64 + sym.extra_bits as u64;
        }
        bits
    }
}

/// Index one past the last non-zero length, with a floor.
fn last_used(lengths: &[u8], min: usize) -> usize {
    let mut last = min;
    for (i, &len) in lengths.iter().enumerate() {
        if len != 0 {
            last = last.max(i + 1);
        }
    }
    last
}

/// Run-length encode a combined length array with the code-length alphabet:
/// 16 repeats the previous length 3-6 times, 17 and 18 emit zero runs of
/// 3-10 and 11-138.
fn rle_encode_lengths(lengths: &[u8]) -> (Vec<ClSymbol>, [u32; 19]) {
    let mut symbols = Vec::new();
    let mut freqs = [0u32; 19];
    let mut emit = |symbol: u8, extra: u8, extra_bits: u8| {
        symbols.push(ClSymbol {
            symbol,
            extra,
            extra_bits,
        });
        freqs[symbol as usize] += 1;
    };

    let mut i = 0;
    while i < lengths.len() {
        let len = lengths[i];
        let mut run = 1;
        while i + run < lengths.len() && lengths[i + run] == len {
            run += 1;
        }

        if len == 0 {
            let mut remaining = run;
            while remaining >= 11 {
                let n = remaining.min(138);
                emit(18, (n - 11) as u8, 7);
                remaining -= n;
            }
            if remaining >= 3 {
                emit(17, (remaining - 3) as u8, 3);
                remaining = 0;
            }
            for _ in 0..remaining {
                emit(0, 0, 0);
            }
        } else {
            emit(len, 0, 0);
            let mut remaining = run - 1;
            while remaining >= 3 {
                let n = remaining.min(6);
                emit(16, (n - 3) as u8, 2);
                remaining -= n;
            }
            for _ in 0..remaining {
                emit(len, 0, 0);
            }
        }

        i += run;
    }

    (symbols, freqs)
}

/// DEFLATE compressor.
#[derive(Debug)]
pub struct DeflateCompressor {
    config: ZipConfig,
}

impl DeflateCompressor {
    /// Create a compressor with the given config.
    pub fn new(config: ZipConfig) -> Self {
        Self { config }
    }

    /// Compress `input` into a complete DEFLATE stream.
    pub fn compress(&self, input: &[u8]) -> Vec<u8> {
        let mut writer = BitWriter::new();

        if self.config.force_store || self.config.level == 0 {
            write_store_blocks(&mut writer, input);
            return writer.into_bytes();
        }

        let (tokens, freqs) = self.tokenize(input);
        let plan = DynamicPlan::prepare(&freqs);

        let store_cost = store_cost_bits(input.len());
        let fixed_cost = 3 + token_cost_bits(
            &tokens,
            fixed_litlen_tree().bit_lengths(),
            fixed_distance_tree().bit_lengths(),
        );
        let dynamic_cost = 3 + plan.header_bits()
            + token_cost_bits(
                &tokens,
                plan.lit_tree.bit_lengths(),
                plan.dist_tree.bit_lengths(),
            );

        if store_cost < fixed_cost && store_cost < dynamic_cost {
            write_store_blocks(&mut writer, input);
        } else if fixed_cost <= dynamic_cost {
            write_fixed_block(&mut writer, &tokens, true);
        } else {
            write_dynamic_block(&mut writer, &tokens, &plan, true);
        }

        writer.into_bytes()
    }

    /// Produce the token stream and its frequency tables.
    ///
    /// Every position the cursor advances past is registered in the hash
    /// chain — including those consumed inside a match — so later searches
    /// can still land on them.
    fn tokenize(&self, input: &[u8]) -> (Vec<Token>, FrequencyCollector) {
        let mut matcher = Lz77Matcher::new(&self.config);
        let mut freqs = FrequencyCollector::new();
        let mut tokens = Vec::new();

        let mut pos = 0;
        while pos < input.len() {
            let token = match matcher.find_longest_match(input, pos) {
                Some(found) => {
                    for i in 0..found.length {
                        matcher.insert_hash(input, pos + i);
                    }
                    Token::Match {
                        length: found.length as u16,
                        distance: found.distance as u16,
                    }
                }
                None => {
                    matcher.insert_hash(input, pos);
                    Token::Literal(input[pos])
                }
            };
            pos += token.span();
            freqs.add_token(&token);
            tokens.push(token);
        }
        freqs.add_eob();

        (tokens, freqs)
    }
}

/// Bit cost of the store encoding, including per-chunk framing.
fn store_cost_bits(input_len: usize) -> u64 {
    let chunks = input_len.div_ceil(MAX_STORED_BLOCK).max(1) as u64;
    input_len as u64 * 8 + chunks * STORED_FRAMING_BITS
}

/// Bit cost of the token stream under the given code lengths, end-of-block
/// included.
fn token_cost_bits(tokens: &[Token], lit_lengths: &[u8], dist_lengths: &[u8]) -> u64 {
    let mut bits = 0u64;
    for token in tokens {
        match token {
            Token::Literal(byte) => {
                bits += lit_lengths[*byte as usize] as u64;
            }
            Token::Match { length, distance } => {
                let (len_code, len_extra_bits, _) = length_to_code(*length);
                bits += lit_lengths[len_code as usize] as u64 + len_extra_bits as u64;

                let (dist_code, dist_extra_bits, _) = distance_to_code(*distance);
                bits += dist_lengths[dist_code as usize] as u64 + dist_extra_bits as u64;
            }
        }
    }
    bits + lit_lengths[END_OF_BLOCK as usize] as u64
}

/// Emit the input as stored blocks (BTYPE=00), chunked at the LEN limit.
fn write_store_blocks(writer: &mut BitWriter, data: &[u8]) {
    let mut offset = 0;
    loop {
        let block_len = (data.len() - offset).min(MAX_STORED_BLOCK);
        let is_final = offset + block_len == data.len();

        writer.write_bits(is_final as u32, 1);
        writer.write_bits(0b00, 2);
        writer.align_to_byte();

        let len = block_len as u16;
        writer.write_bits(len as u32, 16);
        writer.write_bits(!len as u32, 16);
        writer.write_bytes(&data[offset..offset + block_len]);

        offset += block_len;
        if is_final {
            break;
        }
    }
}

/// Emit one fixed-Huffman block (BTYPE=01).
fn write_fixed_block(writer: &mut BitWriter, tokens: &[Token], is_final: bool) {
    writer.write_bits(is_final as u32, 1);
    writer.write_bits(0b01, 2);
    write_tokens(writer, tokens, fixed_litlen_tree(), fixed_distance_tree());
}

/// Emit one dynamic-Huffman block (BTYPE=10) from a prepared plan.
fn write_dynamic_block(writer: &mut BitWriter, tokens: &[Token], plan: &DynamicPlan, is_final: bool) {
    writer.write_bits(is_final as u32, 1);
    writer.write_bits(0b10, 2);

    writer.write_bits((plan.hlit - 257) as u32, 5);
    writer.write_bits((plan.hdist - 1) as u32, 5);
    writer.write_bits((plan.hclen - 4) as u32, 4);

    for &order in CODE_LENGTH_ORDER.iter().take(plan.hclen) {
        writer.write_bits(plan.cl_tree.bit_lengths()[order] as u32, 3);
    }

    for sym in &plan.cl_symbols {
        let (code, len) = plan.cl_tree.code(sym.symbol as usize);
        writer.write_huffman_code(code as u32, len);
        if sym.extra_bits > 0 {
            writer.write_bits(sym.extra as u32, sym.extra_bits);
        }
    }

    write_tokens(writer, tokens, &plan.lit_tree, &plan.dist_tree);
}

/// Emit the token stream plus end-of-block under the given trees.
fn write_tokens(
    writer: &mut BitWriter,
    tokens: &[Token],
    lit_tree: &HuffmanTree,
    dist_tree: &HuffmanTree,
) {
    for token in tokens {
        match token {
            Token::Literal(byte) => {
                let (code, len) = lit_tree.code(*byte as usize);
                writer.write_huffman_code(code as u32, len);
            }
            Token::Match { length, distance } => {
                let (len_code, len_extra_bits, len_extra) = length_to_code(*length);
                let (code, len) = lit_tree.code(len_code as usize);
                writer.write_huffman_code(code as u32, len);
                if len_extra_bits > 0 {
                    writer.write_bits(len_extra as u32, len_extra_bits);
                }

                let (dist_code, dist_extra_bits, dist_extra) = distance_to_code(*distance);
                let (code, len) = dist_tree.code(dist_code as usize);
                writer.write_huffman_code(code as u32, len);
                if dist_extra_bits > 0 {
                    writer.write_bits(dist_extra as u32, dist_extra_bits);
                }
            }
        }
    }

    let (code, len) = lit_tree.code(END_OF_BLOCK as usize);
    writer.write_huffman_code(code as u32, len);
}

/// Compress data to a raw DEFLATE stream.
pub fn compress(data: &[u8], config: &ZipConfig) -> Vec<u8> {
    DeflateCompressor::new(*config).compress(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inflate::decompress;

    fn roundtrip(data: &[u8], config: &ZipConfig) {
        let compressed = compress(data, config);
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, data, "roundtrip failed at level {}", config.level);
    }

    #[test]
    fn test_roundtrip_all_levels() {
        let inputs: [&[u8]; 4] = [
            b"",
            b"A",
            b"The quick brown fox jumps over the lazy dog",
            b"abcabcabcabcabcabcabcabc",
        ];
        for input in inputs {
            for level in [0, 1, 5, 9] {
                roundtrip(input, &ZipConfig::with_level(level));
            }
        }
    }

    #[test]
    fn test_roundtrip_force_store() {
        let config = ZipConfig::new(9, 32768, true);
        let data = b"stored verbatim no matter the level";
        let compressed = compress(data, &config);
        // BFINAL=1, BTYPE=00 in the low bits of the first byte.
        assert_eq!(compressed[0] & 0b111, 0b001);
        assert_eq!(decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn test_store_block_framing() {
        let compressed = compress(b"Hi", &ZipConfig::with_level(0));
        // Header byte, LEN=2, NLEN=!2, then the payload.
        assert_eq!(compressed, vec![0x01, 0x02, 0x00, 0xFD, 0xFF, b'H', b'i']);
    }

    #[test]
    fn test_empty_input_uses_fixed_block() {
        // An empty token stream costs 10 bits as a fixed block versus 40 as
        // a stored one.
        let compressed = compress(b"", &ZipConfig::with_level(5));
        assert_eq!(compressed.len(), 2);
        assert_eq!(compressed[0] & 0b111, 0b011);
    }

    #[test]
    fn test_run_compresses_below_input_size() {
        let compressed = compress(b"AAAAAAAAAA", &ZipConfig::with_level(5));
        assert!(compressed.len() < 10, "got {} bytes", compressed.len());
        assert_eq!(decompress(&compressed).unwrap(), b"AAAAAAAAAA");
    }

    #[test]
    fn test_incompressible_data_expands_by_framing_only() {
        // A xorshift byte stream is essentially incompressible. The store
        // encoding is always among the costed candidates, so whatever wins
        // can exceed the input by at most the stored-block framing.
        let mut state = 0x2545F491u32;
        let data: Vec<u8> = (0..4096)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state >> 24) as u8
            })
            .collect();

        let compressed = compress(&data, &ZipConfig::with_level(9));
        assert!(compressed.len() <= data.len() + 6);
        assert_eq!(decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn test_skewed_data_picks_dynamic_block() {
        // Text over a tiny alphabet: custom codes beat the fixed table by
        // more than the header costs.
        let mut state = 0x12345678u32;
        let data: Vec<u8> = (0..4096)
            .map(|_| {
                state = state.wrapping_mul(1664525).wrapping_add(1013904223);
                b"aaaabbcd"[(state >> 28) as usize & 7]
            })
            .collect();

        let compressed = compress(&data, &ZipConfig::with_level(9));
        assert_eq!(compressed[0] & 0b111, 0b101);
        assert_eq!(decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn test_multi_chunk_store() {
        let data = vec![0xA5u8; MAX_STORED_BLOCK + 100];
        let compressed = compress(&data, &ZipConfig::with_level(0));
        assert_eq!(decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn test_window_boundary_lengths() {
        for size in [32767, 32768, 32769] {
            let data: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
            roundtrip(&data, &ZipConfig::with_level(6));
        }
    }

    #[test]
    fn test_max_match_length_runs() {
        let mut data = Vec::new();
        for _ in 0..10 {
            data.extend_from_slice(&[42u8; 258]);
        }
        roundtrip(&data, &ZipConfig::with_level(9));
    }

    #[test]
    fn test_rle_encodes_zero_runs() {
        let mut lengths = vec![8u8, 8, 8];
        lengths.extend(vec![0u8; 20]);
        lengths.push(5);

        let (symbols, freqs) = rle_encode_lengths(&lengths);
        // The 20 zeros collapse into one code-18 run.
        assert_eq!(freqs[18], 1);
        assert!(symbols.iter().any(|s| s.symbol == 18 && s.extra == 9));
        // The repeated 8s emit one literal plus nothing (run of 2 after the
        // first is below the code-16 minimum).
        assert_eq!(freqs[8], 3);
    }

    #[test]
    fn test_rle_uses_repeat_code_for_long_runs() {
        let lengths = vec![7u8; 10];
        let (symbols, freqs) = rle_encode_lengths(&lengths);
        // One literal 7 then 9 repeats: 6 + 3 via two code-16s.
        assert_eq!(freqs[7], 1);
        assert_eq!(freqs[16], 2);
        assert_eq!(symbols.len(), 3);
    }
}
