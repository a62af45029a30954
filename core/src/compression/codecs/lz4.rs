//! codecs/lz4.rs
//! LZ4 block codec. Each chunk is an independent block; the decompressed
//! length comes from the stream metadata, not from a size prefix.
use lz4_flex::block::{compress, decompress, get_maximum_output_size};

use crate::error::{DevcompError, Result};

pub fn max_compressed_len(len: usize) -> usize {
    get_maximum_output_size(len)
}

pub fn compress_chunk(input: &[u8], out: &mut Vec<u8>) -> Result<()> {
    out.extend_from_slice(&compress(input));
    Ok(())
}

pub fn decompress_chunk(input: &[u8], expected_len: usize, out: &mut Vec<u8>) -> Result<()> {
    let decompressed = decompress(input, expected_len)
        .map_err(|e| DevcompError::cannot_decompress(format!("lz4: {e}")))?;
    out.extend_from_slice(&decompressed);
    Ok(())
}
