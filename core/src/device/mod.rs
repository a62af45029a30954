//! device/mod.rs
//! Host-emulated device runtime: the collaborators the compression core
//! consumes but never owns.
//!
//! - `DeviceBuffer` / `DevicePtr`: caller-allocated device memory.
//! - `Stream`: FIFO execution stream with a sticky failure channel.
//! - `PinnedPtrPool`: pinned host slots the stream can write without the
//!   host blocking.

pub mod memory;
pub mod pinned;
pub mod stream;

pub use memory::*;
pub use pinned::*;
pub use stream::*;
