//! headers/mod.rs
//! Self-describing metadata at the front of every compressed stream.
//!
//! Notes:
//! - Fixed-size header (48 bytes) lets a decompressor size its work from one
//!   small device read.
//! - Explicit ids (codec, element type) avoid silent incompatibilities.
//! - The header CRC catches corrupted or foreign metadata before any size
//!   derived from it is trusted.

pub mod types;
pub mod encode;
pub mod decode;

pub use types::*;
pub use encode::*;
pub use decode::*;
