//! compression/codecs/mod.rs
//! Per-chunk kernels for each codec, dispatched over the closed `Codec` set.
//!
//! Notes:
//! - Every chunk is compressed independently, so chunks could run in parallel
//!   and any chunk decodes without its neighbours.
//! - Kernels never see sizes they did not get from metadata; the decompressed
//!   length of every chunk is passed in.

pub mod deflate;
pub mod delta;
pub mod lz4;
pub mod raw;
pub mod zstd;

use crate::compression::Codec;
use crate::error::{DevcompError, Result};
use crate::types::TypeTag;

/// Resolved parameters a kernel runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelParams {
    pub level: i32,
    pub element: Option<TypeTag>,
}

impl KernelParams {
    fn element(&self, codec: Codec) -> Result<TypeTag> {
        self.element.ok_or_else(|| {
            DevcompError::internal(format!("codec {} launched without an element type", codec.name()))
        })
    }
}

impl Codec {
    /// Worst-case compressed size of a chunk of `len` bytes.
    pub fn max_compressed_chunk(self, len: usize) -> usize {
        match self {
            Codec::Raw => raw::max_compressed_len(len),
            Codec::Zstd => zstd::max_compressed_len(len),
            Codec::Lz4 => lz4::max_compressed_len(len),
            Codec::Deflate => deflate::max_compressed_len(len),
            Codec::Delta => delta::max_compressed_len(len),
        }
    }

    /// Whether compressed chunks are staged in the workspace before being
    /// gathered into the output.
    pub fn needs_staging(self) -> bool {
        !matches!(self, Codec::Raw)
    }

    pub fn compress_chunk(self, params: &KernelParams, input: &[u8], out: &mut Vec<u8>) -> Result<()> {
        match self {
            Codec::Raw => raw::compress_chunk(input, out),
            Codec::Zstd => zstd::compress_chunk(input, params.level, out),
            Codec::Lz4 => lz4::compress_chunk(input, out),
            Codec::Deflate => deflate::compress_chunk(input, params.level, out),
            Codec::Delta => delta::compress_chunk(params.element(self)?, input, out),
        }
    }

    pub fn decompress_chunk(
        self,
        params: &KernelParams,
        input: &[u8],
        expected_len: usize,
        out: &mut Vec<u8>,
    ) -> Result<()> {
        match self {
            Codec::Raw => raw::decompress_chunk(input, expected_len, out),
            Codec::Zstd => zstd::decompress_chunk(input, expected_len, out),
            Codec::Lz4 => lz4::decompress_chunk(input, expected_len, out),
            Codec::Deflate => deflate::decompress_chunk(input, expected_len, out),
            Codec::Delta => delta::decompress_chunk(params.element(self)?, input, expected_len, out),
        }
    }
}
