//! compression/types.rs
//! Codec identities, options, sizing results, and the two-phase
//! compressor/decompressor interfaces.
use num_enum::TryFromPrimitive;

use crate::compression::constants::*;
use crate::constants::{DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE, MIN_CHUNK_SIZE};
use crate::device::{DevicePtr, PinnedPtr, Stream};
use crate::error::{DevcompError, Result};
use crate::headers::HeaderError;
use crate::types::{type_tag_of, DeviceElement, TypeTag};
use crate::utils::best_chunk_size;

/// Closed set of codecs a stream can be encoded with.
#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum Codec {
    Raw     = codec_ids::RAW,
    Zstd    = codec_ids::ZSTD,
    Lz4     = codec_ids::LZ4,
    Deflate = codec_ids::DEFLATE,
    /// Element-wise delta followed by LZ4.
    Delta   = codec_ids::DELTA,
}

impl Codec {
    pub fn verify(raw: u16) -> std::result::Result<Codec, HeaderError> {
        Codec::try_from_primitive(raw).map_err(|_| HeaderError::UnknownCodec { raw })
    }

    pub fn name(self) -> &'static str {
        match self {
            Codec::Raw => "raw",
            Codec::Zstd => "zstd",
            Codec::Lz4 => "lz4",
            Codec::Deflate => "deflate",
            Codec::Delta => "delta",
        }
    }

    /// Whether the codec needs an element type.
    pub fn is_element_typed(self) -> bool {
        matches!(self, Codec::Delta)
    }
}

/// Compression level presets, resolved per codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecLevel {
    Fast,
    Balanced,
    Best,
    Custom(i32),
}

impl CodecLevel {
    /// Concrete level for `codec`.
    ///
    /// # Errors
    /// - `StatusCode::UnsupportedConfiguration` for a custom level out of the
    ///   codec's range, or on a codec without levels.
    pub fn resolve(self, codec: Codec) -> Result<i32> {
        match (codec, self) {
            (Codec::Zstd, CodecLevel::Fast) => Ok(FAST_LEVEL_ZSTD),
            (Codec::Zstd, CodecLevel::Balanced) => Ok(DEFAULT_LEVEL_ZSTD),
            (Codec::Zstd, CodecLevel::Best) => Ok(BEST_LEVEL_ZSTD),
            (Codec::Zstd, CodecLevel::Custom(l)) if (1..=MAX_LEVEL_ZSTD).contains(&l) => Ok(l),

            (Codec::Deflate, CodecLevel::Fast) => Ok(FAST_LEVEL_DEFLATE),
            (Codec::Deflate, CodecLevel::Balanced) => Ok(DEFAULT_LEVEL_DEFLATE),
            (Codec::Deflate, CodecLevel::Best) => Ok(BEST_LEVEL_DEFLATE),
            (Codec::Deflate, CodecLevel::Custom(l)) if (0..=BEST_LEVEL_DEFLATE).contains(&l) => Ok(l),

            (Codec::Raw | Codec::Lz4 | Codec::Delta, CodecLevel::Custom(l)) => {
                Err(DevcompError::unsupported_configuration(format!(
                    "codec {} has no compression levels (requested {})",
                    codec.name(),
                    l
                )))
            }
            (Codec::Raw | Codec::Lz4 | Codec::Delta, _) => Ok(0),

            (_, CodecLevel::Custom(l)) => Err(DevcompError::unsupported_configuration(format!(
                "level {} out of range for codec {}",
                l,
                codec.name()
            ))),
        }
    }
}

/// Codec parameters held by a compressor instance.
#[derive(Debug, Clone, PartialEq)]
pub struct CodecOptions {
    codec: Codec,
    chunk_size: usize,
    level: CodecLevel,
    element: Option<TypeTag>,
    checksum: bool,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            codec: Codec::Lz4,
            chunk_size: DEFAULT_CHUNK_SIZE,
            level: CodecLevel::Balanced,
            element: None,
            checksum: true,
        }
    }
}

impl CodecOptions {
    pub fn new(codec: Codec) -> Self {
        Self { codec, ..Default::default() }
    }

    /// Delta options for a compile-time element type.
    pub fn delta<T: DeviceElement>() -> Self {
        Self { codec: Codec::Delta, element: Some(T::TYPE_TAG), ..Default::default() }
    }

    /// Requested chunk size, rounded to a supported power of two.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = best_chunk_size(Some(chunk_size));
        self
    }

    pub fn with_level(mut self, level: CodecLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_element(mut self, element: TypeTag) -> Self {
        self.element = Some(element);
        self
    }

    /// Element type through the runtime witness.
    ///
    /// # Errors
    /// - `StatusCode::NotSupported` for types without a tag.
    pub fn with_element_type<T: 'static>(self) -> Result<Self> {
        Ok(self.with_element(type_tag_of::<T>()?))
    }

    pub fn with_checksum(mut self, checksum: bool) -> Self {
        self.checksum = checksum;
        self
    }

    pub fn codec(&self) -> Codec { self.codec }
    pub fn chunk_size(&self) -> usize { self.chunk_size }
    pub fn level(&self) -> CodecLevel { self.level }
    pub fn element(&self) -> Option<TypeTag> { self.element }
    pub fn checksum(&self) -> bool { self.checksum }

    /// Check the parameter combination and resolve the concrete level.
    pub fn validate(&self) -> Result<i32> {
        if !self.chunk_size.is_power_of_two()
            || !(MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&self.chunk_size)
        {
            return Err(DevcompError::unsupported_configuration(format!(
                "chunk size {} unsupported",
                self.chunk_size
            )));
        }

        match (self.codec.is_element_typed(), self.element) {
            (true, None) => {
                return Err(DevcompError::unsupported_configuration(format!(
                    "codec {} requires an element type",
                    self.codec.name()
                )))
            }
            (false, Some(tag)) => {
                return Err(DevcompError::unsupported_configuration(format!(
                    "codec {} does not take an element type (got {:?})",
                    self.codec.name(),
                    tag
                )))
            }
            _ => {}
        }

        self.level.resolve(self.codec)
    }
}

/// Buffer sizes a compressor needs for one input size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressConfig {
    pub temp_bytes: usize,
    pub max_output_bytes: usize,
}

/// Buffer sizes a decompressor needs for one compressed stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecompressConfig {
    pub temp_bytes: usize,
    pub output_bytes: usize,
}

/// Where `compress_async` reports the compressed size.
///
/// Holds the output capacity on entry and the compressed size on success.
/// A pageable slot cannot be written by the stream, so the call blocks until
/// compression completes. A pinned slot is written in stream order and the
/// call returns as soon as the work is enqueued.
pub enum OutputSize<'a> {
    Pageable(&'a mut usize),
    Pinned(&'a PinnedPtr<usize>),
}

impl OutputSize<'_> {
    pub fn capacity(&self) -> Result<usize> {
        match self {
            OutputSize::Pageable(v) => Ok(**v),
            OutputSize::Pinned(p) => p.get(),
        }
    }
}

/// "Size, then compress" over a device byte buffer.
///
/// `configure` must precede `compress_async` for the same input size; the
/// sizes it returns are valid only for that size and the instance's options.
pub trait Compressor: Send {
    /// Required workspace and worst-case output for `input_size` bytes.
    /// Never touches input contents.
    fn configure(&mut self, input_size: usize) -> Result<CompressConfig>;

    /// Enqueue compression of `input` on `stream`.
    ///
    /// Returns once enqueued, except when `output_size` is pageable.
    /// Launch-time failures are returned here; failures during execution
    /// surface through `Stream::synchronize`.
    #[allow(clippy::too_many_arguments)]
    fn compress_async(
        &mut self,
        input: &DevicePtr,
        input_size: usize,
        temp: &DevicePtr,
        temp_size: usize,
        output: &DevicePtr,
        output_size: OutputSize<'_>,
        stream: &Stream,
    ) -> Result<()>;
}

/// "Size, then decompress" for self-describing streams.
pub trait Decompressor: Send {
    /// Read the stream metadata (ordered after prior work on `stream`) and
    /// return the required workspace and decompressed size.
    fn configure(&mut self, input: &DevicePtr, input_size: usize, stream: &Stream) -> Result<DecompressConfig>;

    /// Enqueue decompression of `input` on `stream`.
    #[allow(clippy::too_many_arguments)]
    fn decompress_async(
        &mut self,
        input: &DevicePtr,
        input_size: usize,
        temp: &DevicePtr,
        temp_size: usize,
        output: &DevicePtr,
        output_size: usize,
        stream: &Stream,
    ) -> Result<()>;
}
