//! LZ77 sliding-window match search.
//!
//! For each input position the matcher hashes the next three bytes, looks up
//! the most recent position with the same key, and walks backward along the
//! hash chain for older candidates. The chain length is capped by the
//! compression level, the candidate range by the configured window.

use crate::config::ZipConfig;
use std::collections::HashMap;

/// Minimum match length DEFLATE can encode.
pub const MIN_MATCH: usize = 3;

/// Maximum match length DEFLATE can encode.
pub const MAX_MATCH: usize = 258;

/// Chain slots; one per window position, reused modulo this size.
const CHAIN_SIZE: usize = 32768;

/// Sentinel for "no earlier position" in the chain.
const NO_POS: usize = usize::MAX;

/// A successful match lookup. Consumed immediately by the compressor, never
/// retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// Matched length (3-258).
    pub length: usize,
    /// Distance back from the current position (1-window_size).
    pub distance: usize,
}

/// Hash-chain accelerated longest-match search.
#[derive(Debug)]
pub struct Lz77Matcher {
    /// Search window in bytes; candidates farther back are ignored.
    window_size: usize,
    /// Chain walk cap, derived from the compression level.
    max_chain: usize,
    /// Most recent position per 3-byte key.
    head: HashMap<u32, usize>,
    /// Previous position with the same key, indexed by position modulo
    /// `CHAIN_SIZE`.
    prev: Vec<usize>,
}

impl Lz77Matcher {
    /// Create a matcher for the given config.
    pub fn new(config: &ZipConfig) -> Self {
        Self {
            window_size: config.window_size,
            max_chain: config.max_chain(),
            head: HashMap::new(),
            prev: vec![NO_POS; CHAIN_SIZE],
        }
    }

    /// Pack three bytes into the chain key.
    #[inline]
    fn key(data: &[u8], pos: usize) -> u32 {
        (data[pos] as u32) | ((data[pos + 1] as u32) << 8) | ((data[pos + 2] as u32) << 16)
    }

    /// Find the longest match for `data[pos..]` within the window.
    ///
    /// Returns `None` when no candidate reaches [`MIN_MATCH`] or fewer than
    /// [`MIN_MATCH`] bytes remain. Among equal-length candidates the most
    /// recent (smallest distance) wins: the chain is walked newest-first and
    /// only strictly longer matches replace the best.
    pub fn find_longest_match(&self, data: &[u8], pos: usize) -> Option<Match> {
        if pos + MIN_MATCH > data.len() || self.max_chain == 0 {
            return None;
        }

        let max_len = MAX_MATCH.min(data.len() - pos);
        let min_pos = pos.saturating_sub(self.window_size);
        let mut candidate = *self.head.get(&Self::key(data, pos))?;

        let mut best: Option<Match> = None;
        let mut best_len = MIN_MATCH - 1;
        let mut chain = 0;

        while candidate >= min_pos && candidate < pos && chain < self.max_chain {
            // Cheap rejection: a longer match must improve on the byte at
            // best_len before a full comparison is worth it.
            if pos + best_len < data.len() && data[candidate + best_len] == data[pos + best_len] {
                let mut len = 0;
                while len < max_len && data[candidate + len] == data[pos + len] {
                    len += 1;
                }

                if len > best_len {
                    best_len = len;
                    best = Some(Match {
                        length: len,
                        distance: pos - candidate,
                    });
                    if len == max_len {
                        break;
                    }
                }
            }

            let next = self.prev[candidate % CHAIN_SIZE];
            // Chain entries are strictly decreasing; anything else is a
            // stale slot from a wrapped-around position.
            if next >= candidate {
                break;
            }
            candidate = next;
            chain += 1;
        }

        if best_len >= MIN_MATCH { best } else { None }
    }

    /// Register `pos` in the hash chain.
    ///
    /// Must be called for every position the compressor advances past,
    /// including positions consumed inside a match, so later searches can
    /// still reference those bytes.
    pub fn insert_hash(&mut self, data: &[u8], pos: usize) {
        if pos + MIN_MATCH > data.len() {
            return;
        }
        let key = Self::key(data, pos);
        let slot = pos % CHAIN_SIZE;
        match self.head.insert(key, pos) {
            Some(old) => self.prev[slot] = old,
            None => self.prev[slot] = NO_POS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher_with_window(window_size: usize) -> Lz77Matcher {
        Lz77Matcher::new(&ZipConfig::new(9, window_size, false))
    }

    /// Greedy tokenization used by the matcher tests.
    fn scan(data: &[u8], matcher: &mut Lz77Matcher) -> Vec<Match> {
        let mut matches = Vec::new();
        let mut pos = 0;
        while pos < data.len() {
            if let Some(found) = matcher.find_longest_match(data, pos) {
                for i in 0..found.length {
                    matcher.insert_hash(data, pos + i);
                }
                pos += found.length;
                matches.push(found);
            } else {
                matcher.insert_hash(data, pos);
                pos += 1;
            }
        }
        matches
    }

    #[test]
    fn test_no_match_in_unique_data() {
        let data = b"abcdefgh";
        let mut matcher = matcher_with_window(32768);
        assert!(scan(data, &mut matcher).is_empty());
    }

    #[test]
    fn test_finds_repeat() {
        let data = b"abcabcabc";
        let mut matcher = matcher_with_window(32768);
        let matches = scan(data, &mut matcher);
        assert!(!matches.is_empty());
        assert_eq!(matches[0].distance, 3);
    }

    #[test]
    fn test_run_collapses_to_overlapping_match() {
        // "AAAAAAAAAA": after one literal, a distance-1 match covers the rest.
        let data = b"AAAAAAAAAA";
        let mut matcher = matcher_with_window(32768);
        let matches = scan(data, &mut matcher);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].distance, 1);
        assert_eq!(matches[0].length, 9);
    }

    #[test]
    fn test_match_bounds() {
        let mut data = vec![7u8; 1000];
        data.extend(b"xyzzy");
        data.extend(vec![7u8; 1000]);

        let window_size = 256;
        let mut matcher = matcher_with_window(window_size);
        for found in scan(&data, &mut matcher) {
            assert!((MIN_MATCH..=MAX_MATCH).contains(&found.length));
            assert!(found.distance >= 1 && found.distance <= window_size);
        }
    }

    #[test]
    fn test_window_limits_candidates() {
        // The repeat sits farther back than the window allows.
        let mut data = b"needle".to_vec();
        data.extend(vec![0u8; 512]);
        data.extend(b"needle");

        let mut matcher = matcher_with_window(64);
        for found in scan(&data, &mut matcher) {
            assert!(found.distance <= 64);
        }
    }

    #[test]
    fn test_positions_inside_matches_stay_searchable() {
        // The second "bcdbcd" can only match if positions consumed by the
        // first match were inserted into the chain.
        let data = b"abcdbcdXbcdbcd";
        let mut matcher = matcher_with_window(32768);
        let matches = scan(data, &mut matcher);
        assert!(matches.iter().any(|m| m.length >= 6));
    }

    #[test]
    fn test_tail_shorter_than_min_match() {
        let data = b"ab";
        let matcher = matcher_with_window(32768);
        assert!(matcher.find_longest_match(data, 0).is_none());
    }
}
