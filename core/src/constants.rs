/// Magic number for the self-describing compressed stream.
/// "DVC1" = device compressed stream v1
pub const MAGIC_DVC1: [u8; 4] = *b"DVC1";
pub const FORMAT_V1: u16 = 1;

/// Defaults when no chunk size is requested.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024; // 64 KiB
/// Chunk size bounds; requested sizes are rounded into this range.
pub const MIN_CHUNK_SIZE: usize = 4 * 1024; // 4 KiB
pub const MAX_CHUNK_SIZE: usize = 16 * 1024 * 1024; // 16 MiB

/// Largest input a compressor will size (1 TiB).
pub const MAX_INPUT_SIZE: u64 = 1 << 40;

/// Per-chunk entry in the chunk table: compressed length + CRC32.
pub const CHUNK_ENTRY_LEN: usize = 8;
/// Per-chunk offset slot in the decompressor workspace.
pub const CHUNK_OFFSET_LEN: usize = 8;

/// Element tag byte written when a codec is not element-typed.
pub const NO_ELEMENT_TAG: u8 = 0xFF;

/// Pinned host pool sizing, in bytes of element storage.
pub const PINNED_POOL_PREALLOC_SIZE_BYTES: usize = 1024;
pub const PINNED_POOL_REALLOC_SIZE_BYTES: usize = 512;

/// Flag bitmask for optional metadata presence.
pub mod flags {
    pub const HAS_CHECKSUMS: u16 = 0x0001;
}
