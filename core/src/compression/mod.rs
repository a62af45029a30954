//! compression/mod.rs
//! Stream-ordered compression and decompression over device memory.
//!
//! Notes:
//! - Every task is "size, then execute": `configure` reports workspace and
//!   output sizes, the caller allocates, `*_async` enqueues on a stream.
//! - Compressed streams are self-describing, so decompression needs no
//!   codec parameters.
//! - Registry resolves codec IDs to descriptions and instances.

pub mod constants;
pub mod types;
pub mod registry;
pub mod codecs;
pub mod chunked;

pub use constants::*;
pub use types::*;
pub use registry::*;
pub use chunked::{ChunkedCompressor, ChunkedDecompressor};
