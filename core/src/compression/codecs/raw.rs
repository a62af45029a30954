//! codecs/raw.rs
//! Pass-through codec. Chunks are stored as-is, so no staging workspace.

use crate::error::{DevcompError, Result};

pub fn max_compressed_len(len: usize) -> usize {
    len
}

pub fn compress_chunk(input: &[u8], out: &mut Vec<u8>) -> Result<()> {
    out.extend_from_slice(input);
    Ok(())
}

pub fn decompress_chunk(input: &[u8], expected_len: usize, out: &mut Vec<u8>) -> Result<()> {
    if input.len() != expected_len {
        return Err(DevcompError::cannot_decompress(format!(
            "raw: stored chunk is {} bytes, expected {}",
            input.len(),
            expected_len
        )));
    }
    out.extend_from_slice(input);
    Ok(())
}
