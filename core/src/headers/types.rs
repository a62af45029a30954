//! headers/types.rs
//! Compressed stream header and chunk table entries.
//!
//! Notes:
//! - #[repr(C)] + fixed field sizes keep the layout stable; all multi-byte
//!   integers are little-endian on the wire.
//! - The header is 48 bytes, followed by one 8-byte entry per chunk, followed
//!   by the chunk payloads in order.
//! - Reserved bytes are written as zero and ignored on read.

use std::fmt;

use crate::compression::Codec;
use crate::constants::{flags, CHUNK_ENTRY_LEN, FORMAT_V1, MAGIC_DVC1, MAX_CHUNK_SIZE, MIN_CHUNK_SIZE, NO_ELEMENT_TAG};
use crate::error::DevcompError;
use crate::types::TypeTag;
use crate::utils::{enum_name_or_hex, fmt_bytes};

/// Fixed header size in bytes.
pub const HEADER_LEN_V1: usize = 48;

bitflags::bitflags! {
    /// Optional metadata carried by a stream.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FormatFlags: u16 {
        /// Chunk table entries carry a CRC32 of the uncompressed chunk.
        const HAS_CHECKSUMS = flags::HAS_CHECKSUMS;
    }
}

/// Stream header as laid out at the start of every compressed stream.
#[repr(C)]
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderV1 {
    pub magic: [u8; 4],          // "DVC1" magic marker
    pub version: u16,            // format version
    pub codec: u16,              // codec id (codec_ids)
    pub element: u8,             // TypeTag, or NO_ELEMENT_TAG
    pub reserved0: u8,           // must be zero on write
    pub flags: u16,              // FormatFlags bits
    pub chunk_size: u32,         // uncompressed bytes per chunk (last may be short)
    pub uncompressed_size: u64,  // total decompressed size
    pub compressed_size: u64,    // header + chunk table + payload
    pub chunk_count: u32,        // number of chunk table entries
    pub reserved: [u8; 8],       // future fields
    pub crc32: u32,              // CRC32 over bytes 0..44
}

impl Default for HeaderV1 {
    fn default() -> Self {
        Self {
            magic: MAGIC_DVC1,
            version: FORMAT_V1,
            codec: Codec::Raw as u16,
            element: NO_ELEMENT_TAG,
            reserved0: 0,
            flags: 0,
            chunk_size: MIN_CHUNK_SIZE as u32,
            uncompressed_size: 0,
            compressed_size: HEADER_LEN_V1 as u64,
            chunk_count: 0,
            reserved: [0u8; 8],
            crc32: 0,
        }
    }
}

impl HeaderV1 {
    pub const LEN: usize = HEADER_LEN_V1;

    /// Bytes covered by the header CRC.
    pub const CRC_SPAN: usize = HEADER_LEN_V1 - 4;

    /// Chunk count for `uncompressed_size` split into `chunk_size` pieces.
    pub fn chunks_for(uncompressed_size: u64, chunk_size: usize) -> u64 {
        uncompressed_size.div_ceil(chunk_size as u64)
    }

    pub fn codec(&self) -> Result<Codec, HeaderError> {
        Codec::verify(self.codec)
    }

    pub fn element_type(&self) -> Result<Option<TypeTag>, HeaderError> {
        if self.element == NO_ELEMENT_TAG {
            return Ok(None);
        }
        TypeTag::verify(self.element)
            .map(Some)
            .map_err(|_| HeaderError::UnknownElementType { raw: self.element })
    }

    pub fn format_flags(&self) -> FormatFlags {
        FormatFlags::from_bits_truncate(self.flags)
    }

    /// Length of the chunk table that follows the header.
    pub fn table_len(&self) -> usize {
        self.chunk_count as usize * CHUNK_ENTRY_LEN
    }

    /// Uncompressed length of chunk `index`.
    pub fn chunk_len(&self, index: usize) -> usize {
        let chunk_size = self.chunk_size as u64;
        let start = index as u64 * chunk_size;
        self.uncompressed_size.saturating_sub(start).min(chunk_size) as usize
    }

    pub fn validate(&self) -> Result<(), HeaderError> {
        if self.magic != MAGIC_DVC1 {
            return Err(HeaderError::InvalidMagic { have: self.magic, need: MAGIC_DVC1 });
        }
        if self.version != FORMAT_V1 {
            return Err(HeaderError::UnsupportedVersion { have: self.version });
        }

        let codec = self.codec()?;
        let element = self.element_type()?;
        if codec.is_element_typed() != element.is_some() {
            return Err(HeaderError::Validation(format!(
                "codec {:?} with element tag 0x{:02x}",
                codec, self.element
            )));
        }

        let chunk_size = self.chunk_size as usize;
        if !chunk_size.is_power_of_two() || !(MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&chunk_size) {
            return Err(HeaderError::InvalidChunkSize { have: self.chunk_size });
        }

        let expected = Self::chunks_for(self.uncompressed_size, chunk_size);
        if self.chunk_count as u64 != expected {
            return Err(HeaderError::ChunkCountMismatch { have: self.chunk_count, need: expected });
        }

        let min_size = (Self::LEN + self.table_len()) as u64;
        if self.compressed_size < min_size {
            return Err(HeaderError::CompressedSizeTooSmall { have: self.compressed_size, need: min_size });
        }

        Ok(())
    }
}

/// One chunk table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChunkEntry {
    pub compressed_len: u32,
    pub crc32: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HeaderError {
    /// Buffer too short to contain the header or chunk table.
    BufferTooShort { have: usize, need: usize },

    /// Invalid magic marker (expected "DVC1").
    InvalidMagic { have: [u8; 4], need: [u8; 4] },

    UnsupportedVersion { have: u16 },

    UnknownCodec { raw: u16 },

    UnknownElementType { raw: u8 },

    /// Header CRC does not match its contents.
    InvalidCrc32 { have: u32, need: u32 },

    /// Chunk size zero, not a power of two, or out of bounds.
    InvalidChunkSize { have: u32 },

    ChunkCountMismatch { have: u32, need: u64 },

    CompressedSizeTooSmall { have: u64, need: u64 },

    /// Generic validation error with context.
    Validation(String),
}

impl fmt::Display for HeaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use HeaderError::*;
        match self {
            BufferTooShort { have, need } =>
                write!(f, "metadata buffer too short: {} < {}", have, need),
            InvalidMagic { have, need } =>
                write!(f, "invalid magic: expected {}, got {}", fmt_bytes(need), fmt_bytes(have)),
            UnsupportedVersion { have } =>
                write!(f, "unsupported format version: {}", have),
            UnknownCodec { raw } =>
                write!(f, "unknown codec: {}", enum_name_or_hex::<Codec>(*raw)),
            UnknownElementType { raw } =>
                write!(f, "unknown element type: {}", enum_name_or_hex::<TypeTag>(*raw)),
            InvalidCrc32 { have, need } =>
                write!(f, "header crc mismatch: stored 0x{:08x}, computed 0x{:08x}", have, need),
            InvalidChunkSize { have } =>
                write!(f, "invalid chunk_size: {}", have),
            ChunkCountMismatch { have, need } =>
                write!(f, "chunk count {} does not match sizes (expected {})", have, need),
            CompressedSizeTooSmall { have, need } =>
                write!(f, "compressed size {} smaller than metadata ({})", have, need),
            Validation(msg) =>
                write!(f, "header validation error: {}", msg),
        }
    }
}

impl std::error::Error for HeaderError {}

impl From<HeaderError> for DevcompError {
    fn from(e: HeaderError) -> Self {
        DevcompError::cannot_decompress(e.to_string())
    }
}
