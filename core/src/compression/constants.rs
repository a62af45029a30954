/// Stable codec IDs (u16) written into stream metadata.
pub mod codec_ids {
    pub const RAW: u16     = 0x0000;
    pub const ZSTD: u16    = 0x0001;
    pub const LZ4: u16     = 0x0002;
    pub const DEFLATE: u16 = 0x0003;
    pub const DELTA: u16   = 0x0004;
}

/// Default compression levels (balanced).
pub const DEFAULT_LEVEL_ZSTD: i32 = 6;
pub const DEFAULT_LEVEL_DEFLATE: i32 = 6;

pub const FAST_LEVEL_ZSTD: i32 = 1;
pub const BEST_LEVEL_ZSTD: i32 = 19;
pub const MAX_LEVEL_ZSTD: i32 = 22;

pub const FAST_LEVEL_DEFLATE: i32 = 1;
pub const BEST_LEVEL_DEFLATE: i32 = 9;
