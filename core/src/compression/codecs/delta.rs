//! codecs/delta.rs
//! Element-wise delta filter followed by LZ4.
//!
//! Chunk bytes are read as little-endian elements of the stream's `TypeTag`
//! and replaced by the wrapping difference to the previous element (the
//! first element is kept as-is). Slowly varying integer columns turn into
//! runs of small values that LZ4 packs well. Trailing bytes that do not
//! form a whole element are copied through. Each chunk restarts at zero, so
//! chunks stay independently decodable.

use crate::compression::codecs::lz4;
use crate::error::Result;
use crate::types::TypeTag;

pub fn max_compressed_len(len: usize) -> usize {
    lz4::max_compressed_len(len)
}

pub fn compress_chunk(tag: TypeTag, input: &[u8], out: &mut Vec<u8>) -> Result<()> {
    lz4::compress_chunk(&encode(tag, input), out)
}

pub fn decompress_chunk(tag: TypeTag, input: &[u8], expected_len: usize, out: &mut Vec<u8>) -> Result<()> {
    let mut deltas = Vec::with_capacity(expected_len);
    lz4::decompress_chunk(input, expected_len, &mut deltas)?;
    out.extend_from_slice(&decode(tag, &deltas));
    Ok(())
}

fn mask(width: usize) -> u64 {
    if width >= 8 { u64::MAX } else { (1u64 << (width * 8)) - 1 }
}

#[inline]
fn read_le(bytes: &[u8]) -> u64 {
    let mut b = [0u8; 8];
    b[..bytes.len()].copy_from_slice(bytes);
    u64::from_le_bytes(b)
}

/// Replace each element by its difference to the previous one.
pub fn encode(tag: TypeTag, input: &[u8]) -> Vec<u8> {
    let width = tag.width();
    let mask = mask(width);
    let body = input.len() - input.len() % width;

    let mut out = Vec::with_capacity(input.len());
    let mut prev = 0u64;
    for element in input[..body].chunks_exact(width) {
        let value = read_le(element);
        let delta = value.wrapping_sub(prev) & mask;
        out.extend_from_slice(&delta.to_le_bytes()[..width]);
        prev = value;
    }
    out.extend_from_slice(&input[body..]);
    out
}

/// Inverse of `encode`.
pub fn decode(tag: TypeTag, input: &[u8]) -> Vec<u8> {
    let width = tag.width();
    let mask = mask(width);
    let body = input.len() - input.len() % width;

    let mut out = Vec::with_capacity(input.len());
    let mut prev = 0u64;
    for element in input[..body].chunks_exact(width) {
        let value = prev.wrapping_add(read_le(element)) & mask;
        out.extend_from_slice(&value.to_le_bytes()[..width]);
        prev = value;
    }
    out.extend_from_slice(&input[body..]);
    out
}
