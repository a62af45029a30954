//! Deflate (zlib wrapper) via flate2, one zlib stream per chunk.

use std::io::{Read, Write};
use flate2::{Compression, write::ZlibEncoder, read::ZlibDecoder};

use crate::error::{DevcompError, Result};

/// Conservative deflate bound plus the 6-byte zlib wrapper.
pub fn max_compressed_len(len: usize) -> usize {
    len + len.div_ceil(8) + len.div_ceil(64) + 5 + 6
}

pub fn compress_chunk(input: &[u8], level: i32, out: &mut Vec<u8>) -> Result<()> {
    let level = Compression::new(level.clamp(0, 9) as u32);
    let mut enc = ZlibEncoder::new(Vec::new(), level);
    enc.write_all(input)
        .map_err(|e| DevcompError::internal(format!("deflate: {e}")))?;
    let compressed = enc.finish()
        .map_err(|e| DevcompError::internal(format!("deflate: {e}")))?;
    out.extend_from_slice(&compressed);
    Ok(())
}

pub fn decompress_chunk(input: &[u8], expected_len: usize, out: &mut Vec<u8>) -> Result<()> {
    // Read one byte past the expected length so oversized chunks are caught.
    let mut dec = ZlibDecoder::new(input).take(expected_len as u64 + 1);
    let mut buf = Vec::with_capacity(expected_len);
    dec.read_to_end(&mut buf)
        .map_err(|e| DevcompError::cannot_decompress(format!("deflate: {e}")))?;
    if buf.len() != expected_len {
        return Err(DevcompError::cannot_decompress(format!(
            "deflate: decoded {} bytes, expected {}",
            buf.len(),
            expected_len
        )));
    }
    out.extend_from_slice(&buf);
    Ok(())
}
