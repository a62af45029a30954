//! headers/encode.rs
//!
//! Header and chunk table encoding.
//!
//! Design notes:
//! - Serializes `HeaderV1` into a fixed 48-byte buffer in little-endian order.
//! - Field order must match `types.rs` and `decode.rs` exactly.
//! - The CRC is computed here over bytes 0..44; the struct's `crc32` is ignored.

use crate::headers::types::{ChunkEntry, HeaderV1, HEADER_LEN_V1};

/// Serialize a `HeaderV1` into a 48-byte buffer in little-endian order.
#[inline]
pub fn encode_header_le(h: &HeaderV1) -> [u8; HEADER_LEN_V1] {
    let mut out = [0u8; HEADER_LEN_V1];
    let mut i = 0usize;

    fn put_u8(out: &mut [u8], i: &mut usize, v: u8) {
        out[*i] = v;
        *i += 1;
    }
    fn put_u16(out: &mut [u8], i: &mut usize, v: u16) {
        out[*i..*i + 2].copy_from_slice(&v.to_le_bytes());
        *i += 2;
    }
    fn put_u32(out: &mut [u8], i: &mut usize, v: u32) {
        out[*i..*i + 4].copy_from_slice(&v.to_le_bytes());
        *i += 4;
    }
    fn put_u64(out: &mut [u8], i: &mut usize, v: u64) {
        out[*i..*i + 8].copy_from_slice(&v.to_le_bytes());
        *i += 8;
    }
    fn put_bytes(out: &mut [u8], i: &mut usize, b: &[u8]) {
        out[*i..*i + b.len()].copy_from_slice(b);
        *i += b.len();
    }

    put_bytes(&mut out, &mut i, &h.magic);          // 0..4   magic number
    put_u16(&mut out, &mut i, h.version);           // 4..6   version
    put_u16(&mut out, &mut i, h.codec);             // 6..8   codec id
    put_u8(&mut out, &mut i, h.element);            // 8      element tag
    put_u8(&mut out, &mut i, 0);                    // 9      reserved
    put_u16(&mut out, &mut i, h.flags);             // 10..12 flags
    put_u32(&mut out, &mut i, h.chunk_size);        // 12..16 chunk size
    put_u64(&mut out, &mut i, h.uncompressed_size); // 16..24 uncompressed size
    put_u64(&mut out, &mut i, h.compressed_size);   // 24..32 compressed size
    put_u32(&mut out, &mut i, h.chunk_count);       // 32..36 chunk count
    put_bytes(&mut out, &mut i, &[0u8; 8]);         // 36..44 reserved

    let crc = crc32fast::hash(&out[..HeaderV1::CRC_SPAN]);
    put_u32(&mut out, &mut i, crc);                 // 44..48 header CRC32

    debug_assert_eq!(i, HEADER_LEN_V1, "encoding wrote incorrect length");
    out
}

/// Serialize the chunk table that follows the header.
pub fn encode_chunk_table_le(entries: &[ChunkEntry]) -> Vec<u8> {
    let mut out = Vec::with_capacity(entries.len() * 8);
    for e in entries {
        out.extend_from_slice(&e.compressed_len.to_le_bytes());
        out.extend_from_slice(&e.crc32.to_le_bytes());
    }
    out
}
