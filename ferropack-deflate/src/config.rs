//! Compression configuration.

/// Tuning knobs for the DEFLATE encoder.
///
/// A config only affects how hard the encoder searches for matches and which
/// block types it may pick — never correctness. Out-of-range values are
/// clamped at construction, so building a config cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZipConfig {
    /// Compression level, 0 (store) to 9 (best). Drives LZ77 search depth.
    pub level: u8,
    /// Sliding window size in bytes, 32 to 32768.
    pub window_size: usize,
    /// Force stored blocks, disabling compression entirely.
    pub force_store: bool,
}

impl ZipConfig {
    /// Maximum sliding window size (the DEFLATE limit).
    pub const MAX_WINDOW_SIZE: usize = 32 * 1024;
    /// Minimum sliding window size.
    pub const MIN_WINDOW_SIZE: usize = 32;
    /// Default sliding window size.
    pub const DEFAULT_WINDOW_SIZE: usize = 8192;

    /// Maximum compression level.
    pub const MAX_LEVEL: u8 = 9;
    /// Default compression level.
    pub const DEFAULT_LEVEL: u8 = 5;

    /// Create a config, clamping `level` and `window_size` into range.
    pub fn new(level: u8, window_size: usize, force_store: bool) -> Self {
        Self {
            level: level.min(Self::MAX_LEVEL),
            window_size: window_size.clamp(Self::MIN_WINDOW_SIZE, Self::MAX_WINDOW_SIZE),
            force_store,
        }
    }

    /// Create a config with the given level and default window size.
    pub fn with_level(level: u8) -> Self {
        Self::new(level, Self::DEFAULT_WINDOW_SIZE, false)
    }

    /// Maximum number of hash-chain candidates to examine per position.
    ///
    /// Level 0 searches nothing (every byte is a literal), matching the
    /// stored-only contract of that level.
    pub fn max_chain(&self) -> usize {
        match self.level {
            0 => 0,
            1 => 4,
            2 => 8,
            3 => 16,
            4 => 32,
            5 => 64,
            6 => 128,
            7 => 256,
            8 => 1024,
            _ => 4096,
        }
    }
}

impl Default for ZipConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LEVEL, Self::DEFAULT_WINDOW_SIZE, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamping() {
        let config = ZipConfig::new(42, 1 << 20, false);
        assert_eq!(config.level, ZipConfig::MAX_LEVEL);
        assert_eq!(config.window_size, ZipConfig::MAX_WINDOW_SIZE);

        let config = ZipConfig::new(3, 1, false);
        assert_eq!(config.window_size, ZipConfig::MIN_WINDOW_SIZE);
    }

    #[test]
    fn test_defaults() {
        let config = ZipConfig::default();
        assert_eq!(config.level, 5);
        assert_eq!(config.window_size, 8192);
        assert!(!config.force_store);
    }

    #[test]
    fn test_chain_depth_scales_with_level() {
        let mut prev = 0;
        for level in 0..=9 {
            let chain = ZipConfig::with_level(level).max_chain();
            assert!(chain >= prev);
            prev = chain;
        }
        assert_eq!(ZipConfig::with_level(0).max_chain(), 0);
    }
}
