//! compression/registry.rs
//! Codec registry and factory functions.

use crate::compression::chunked::{ChunkedCompressor, ChunkedDecompressor};
use crate::compression::constants::*;
use crate::compression::types::{Codec, CodecOptions, Compressor, Decompressor};
use crate::error::{DevcompError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecInfo {
    pub name: &'static str,
    pub codec: Codec,
    pub supports_level: bool,
    pub element_typed: bool,
    pub default_level: i32,
}

/// Static description of a codec id.
///
/// # Errors
/// - `StatusCode::UnsupportedConfiguration` for ids outside `codec_ids`.
pub fn resolve(codec_id: u16) -> Result<CodecInfo> {
    let codec = Codec::verify(codec_id).map_err(|e| DevcompError::unsupported_configuration(e.to_string()))?;
    let (supports_level, default_level) = match codec {
        Codec::Zstd => (true, DEFAULT_LEVEL_ZSTD),
        Codec::Deflate => (true, DEFAULT_LEVEL_DEFLATE),
        Codec::Raw | Codec::Lz4 | Codec::Delta => (false, 0),
    };
    Ok(CodecInfo {
        name: codec.name(),
        codec,
        supports_level,
        element_typed: codec.is_element_typed(),
        default_level,
    })
}

/// All registered codecs, in id order.
pub fn registered_codecs() -> impl Iterator<Item = CodecInfo> {
    [codec_ids::RAW, codec_ids::ZSTD, codec_ids::LZ4, codec_ids::DEFLATE, codec_ids::DELTA]
        .into_iter()
        .filter_map(|id| resolve(id).ok())
}

pub fn create_compressor(options: CodecOptions) -> Result<Box<dyn Compressor>> {
    Ok(Box::new(ChunkedCompressor::new(options)?))
}

/// Streams are self-describing, so one decompressor handles every codec.
pub fn create_decompressor() -> Box<dyn Decompressor> {
    Box::new(ChunkedDecompressor::new())
}
