//! codecs/zstd.rs
//!
//! Zstd block codec.
//!
//! Design notes:
//! - Uses the bulk API: every chunk is a standalone frame, decodable alone.
//! - The worst-case size comes from `ZSTD_compressBound`.

use crate::error::{DevcompError, Result};

pub fn max_compressed_len(len: usize) -> usize {
    zstd::zstd_safe::compress_bound(len)
}

pub fn compress_chunk(input: &[u8], level: i32, out: &mut Vec<u8>) -> Result<()> {
    let compressed = zstd::bulk::compress(input, level)
        .map_err(|e| DevcompError::internal(format!("zstd: {e}")))?;
    out.extend_from_slice(&compressed);
    Ok(())
}

pub fn decompress_chunk(input: &[u8], expected_len: usize, out: &mut Vec<u8>) -> Result<()> {
    let decompressed = zstd::bulk::decompress(input, expected_len)
        .map_err(|e| DevcompError::cannot_decompress(format!("zstd: {e}")))?;
    out.extend_from_slice(&decompressed);
    Ok(())
}
