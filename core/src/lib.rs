//! devcomp-core
//!
//! Stream-ordered compression of device memory buffers.
//! Host-emulated device runtime, no FFI.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod error;
pub mod types;
pub mod utils;

// Device runtime the compression core runs on
pub mod device;

// Stream format and codecs
pub mod headers;
pub mod compression;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::compression::{
        ChunkedCompressor, ChunkedDecompressor, Codec, CodecLevel, CodecOptions, CompressConfig,
        Compressor, DecompressConfig, Decompressor, OutputSize,
    };
    pub use crate::device::{DeviceBuffer, DevicePtr, PinnedPtr, PinnedPtrPool, Stream};
    pub use crate::error::{DevcompError, Result, StatusCode};
    pub use crate::types::{type_tag_of, DeviceElement, TypeTag};
}
