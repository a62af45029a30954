//! device/memory.rs
//! Caller-owned device allocations and the pointers kernels read through.
//!
//! Design notes:
//! - A `DeviceBuffer` is allocated and dropped by the caller; the compression
//!   core only ever sees `DevicePtr` + size pairs.
//! - Kernel-side `read`/`write` are bounds checked. Host-side access goes
//!   through a stream so it is ordered with in-flight work.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::device::Stream;
use crate::error::{DevcompError, Result};

static NEXT_ALLOCATION_ID: AtomicU64 = AtomicU64::new(1);

struct Allocation {
    id: u64,
    len: usize,
    bytes: Mutex<Box<[u8]>>,
}

/// A device allocation. Clones share the same memory.
#[derive(Clone)]
pub struct DeviceBuffer {
    inner: Arc<Allocation>,
}

impl DeviceBuffer {
    pub fn zeroed(len: usize) -> Self {
        Self::from_boxed(vec![0u8; len].into_boxed_slice())
    }

    /// Allocate and upload synchronously.
    pub fn from_host(data: &[u8]) -> Self {
        Self::from_boxed(data.to_vec().into_boxed_slice())
    }

    fn from_boxed(bytes: Box<[u8]>) -> Self {
        Self {
            inner: Arc::new(Allocation {
                id: NEXT_ALLOCATION_ID.fetch_add(1, Ordering::Relaxed),
                len: bytes.len(),
                bytes: Mutex::new(bytes),
            }),
        }
    }

    /// Allocation size. Fixed for the buffer's lifetime.
    pub fn len(&self) -> usize {
        self.inner.len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_ptr(&self) -> DevicePtr {
        DevicePtr { buffer: Some(self.clone()), offset: 0 }
    }

    /// Stream-ordered upload into the start of the buffer.
    pub fn copy_from_host_async(&self, stream: &Stream, data: Vec<u8>) -> Result<()> {
        if data.len() > self.len() {
            return Err(DevcompError::invalid_value(format!(
                "upload of {} bytes exceeds allocation of {} bytes",
                data.len(),
                self.len()
            )));
        }
        let dst = self.as_ptr();
        stream.enqueue("memcpy_htod", move || dst.write(&data))
    }

    /// Stream-ordered download of the whole buffer. Blocks until done.
    pub fn to_host(&self, stream: &Stream) -> Result<Vec<u8>> {
        let src = self.as_ptr();
        let len = self.len();
        stream.enqueue_and_wait("memcpy_dtoh", move || src.read(len))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Box<[u8]>>> {
        self.inner
            .bytes
            .lock()
            .map_err(|_| DevcompError::internal(format!("allocation {} poisoned", self.inner.id)))
    }
}

impl std::fmt::Debug for DeviceBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceBuffer")
            .field("id", &self.inner.id)
            .field("len", &self.len())
            .finish()
    }
}

/// Address in device memory: null, or an offset into an allocation.
#[derive(Clone, Default, Debug)]
pub struct DevicePtr {
    buffer: Option<DeviceBuffer>,
    offset: usize,
}

impl DevicePtr {
    pub fn null() -> Self {
        Self::default()
    }

    pub fn is_null(&self) -> bool {
        self.buffer.is_none()
    }

    /// Pointer arithmetic. Null stays null.
    pub fn add(&self, bytes: usize) -> Self {
        Self { buffer: self.buffer.clone(), offset: self.offset + bytes }
    }

    /// Bytes addressable from this pointer to the end of its allocation.
    pub fn capacity(&self) -> usize {
        match &self.buffer {
            Some(b) => b.len().saturating_sub(self.offset),
            None => 0,
        }
    }

    /// Check that `len` bytes starting here are valid device memory.
    ///
    /// # Errors
    /// - `StatusCode::InvalidValue` for a null pointer with `len > 0`, a
    ///   pointer past the end of its allocation (even for `len == 0`), or a
    ///   span running past the end of the allocation.
    pub fn check_span(&self, len: usize, what: &str) -> Result<()> {
        let Some(buffer) = &self.buffer else {
            if len == 0 {
                return Ok(());
            }
            return Err(DevcompError::invalid_value(format!("{what} pointer is null")));
        };
        if self.offset > buffer.len() {
            return Err(DevcompError::invalid_value(format!(
                "{what} pointer is {} bytes past the end of its allocation ({} bytes)",
                self.offset - buffer.len(),
                buffer.len()
            )));
        }
        if len > self.capacity() {
            return Err(DevcompError::invalid_value(format!(
                "{what} span of {len} bytes exceeds allocation ({} bytes available)",
                self.capacity()
            )));
        }
        Ok(())
    }

    /// Kernel-side read of `len` bytes.
    pub fn read(&self, len: usize) -> Result<Vec<u8>> {
        self.check_span(len, "read")?;
        match &self.buffer {
            Some(b) => {
                let bytes = b.lock()?;
                Ok(bytes[self.offset..self.offset + len].to_vec())
            }
            None => Ok(Vec::new()),
        }
    }

    /// Kernel-side write of `data`.
    pub fn write(&self, data: &[u8]) -> Result<()> {
        self.check_span(data.len(), "write")?;
        if let Some(b) = &self.buffer {
            let mut bytes = b.lock()?;
            bytes[self.offset..self.offset + data.len()].copy_from_slice(data);
        }
        Ok(())
    }
}
