//! headers/decode.rs
//!
//! Header and chunk table decoding.
//!
//! Design notes:
//! - Deserializes a 48-byte little-endian buffer into `HeaderV1`.
//! - The header CRC is checked before field validation so that random bytes
//!   fail as corruption rather than as a confusing field error.
//! - Magic is checked first: a foreign stream reports "invalid magic".

use crate::constants::CHUNK_ENTRY_LEN;
use crate::constants::MAGIC_DVC1;
use crate::headers::types::{ChunkEntry, HeaderError, HeaderV1};

/// Deserialize and validate a header from the start of `buf`.
#[inline]
pub fn decode_header_le(buf: &[u8]) -> Result<HeaderV1, HeaderError> {
    if buf.len() < HeaderV1::LEN {
        return Err(HeaderError::BufferTooShort { have: buf.len(), need: HeaderV1::LEN });
    }

    let mut i = 0usize;
    #[inline] fn get_u8(buf: &[u8], i: &mut usize) -> u8 { let v = buf[*i]; *i += 1; v }
    #[inline] fn get_u16(buf: &[u8], i: &mut usize) -> u16 { let v = u16::from_le_bytes([buf[*i], buf[*i + 1]]); *i += 2; v }
    #[inline] fn get_u32(buf: &[u8], i: &mut usize) -> u32 {
        let mut b = [0u8; 4]; b.copy_from_slice(&buf[*i..*i + 4]); *i += 4; u32::from_le_bytes(b)
    }
    #[inline] fn get_u64(buf: &[u8], i: &mut usize) -> u64 {
        let mut b = [0u8; 8]; b.copy_from_slice(&buf[*i..*i + 8]); *i += 8; u64::from_le_bytes(b)
    }
    #[inline] fn get_bytes<const N: usize>(buf: &[u8], i: &mut usize) -> [u8; N] {
        let mut dst = [0u8; N]; dst.copy_from_slice(&buf[*i..*i + N]); *i += N; dst
    }

    let mut h = HeaderV1::default();
    h.magic = get_bytes::<4>(buf, &mut i);           // 0..4   magic number
    if h.magic != MAGIC_DVC1 {
        return Err(HeaderError::InvalidMagic { have: h.magic, need: MAGIC_DVC1 });
    }
    h.version           = get_u16(buf, &mut i);      // 4..6   version
    h.codec             = get_u16(buf, &mut i);      // 6..8   codec id
    h.element           = get_u8(buf, &mut i);       // 8      element tag
    h.reserved0         = get_u8(buf, &mut i);       // 9      reserved
    h.flags             = get_u16(buf, &mut i);      // 10..12 flags
    h.chunk_size        = get_u32(buf, &mut i);      // 12..16 chunk size
    h.uncompressed_size = get_u64(buf, &mut i);      // 16..24 uncompressed size
    h.compressed_size   = get_u64(buf, &mut i);      // 24..32 compressed size
    h.chunk_count       = get_u32(buf, &mut i);      // 32..36 chunk count
    h.reserved          = get_bytes::<8>(buf, &mut i); // 36..44 reserved
    h.crc32             = get_u32(buf, &mut i);      // 44..48 header CRC32

    debug_assert_eq!(i, HeaderV1::LEN);

    let computed_crc = crc32fast::hash(&buf[..HeaderV1::CRC_SPAN]);
    if h.crc32 != computed_crc {
        return Err(HeaderError::InvalidCrc32 { have: h.crc32, need: computed_crc });
    }

    h.validate()?;
    Ok(h)
}

/// Deserialize `count` chunk table entries from `buf`.
pub fn decode_chunk_table_le(buf: &[u8], count: usize) -> Result<Vec<ChunkEntry>, HeaderError> {
    let need = count * CHUNK_ENTRY_LEN;
    if buf.len() < need {
        return Err(HeaderError::BufferTooShort { have: buf.len(), need });
    }

    Ok(buf[..need]
        .chunks_exact(CHUNK_ENTRY_LEN)
        .map(|e| ChunkEntry {
            compressed_len: u32::from_le_bytes([e[0], e[1], e[2], e[3]]),
            crc32: u32::from_le_bytes([e[4], e[5], e[6], e[7]]),
        })
        .collect())
}
