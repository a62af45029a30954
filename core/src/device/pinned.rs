//! device/pinned.rs
//! Pool of pinned host slots.
//!
//! Streams can write pinned host memory without the host waiting, which is
//! what lets `compress_async` report the compressed size without blocking.
//! Allocating pinned memory is expensive, so slots are pooled: the pool
//! pre-allocates a batch, grows by a fixed batch when it runs dry, and takes
//! slots back when their handles drop. It never shrinks.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use crate::constants::{PINNED_POOL_PREALLOC_SIZE_BYTES, PINNED_POOL_REALLOC_SIZE_BYTES};
use crate::error::{DevcompError, Result};

type Slot<T> = Arc<Mutex<T>>;

struct PoolState<T> {
    free: Vec<Slot<T>>,
    alloced: usize,
}

impl<T: Copy + Default> PoolState<T> {
    fn grow(&mut self, count: usize) {
        self.free.extend((0..count).map(|_| Arc::new(Mutex::new(T::default()))));
        self.alloced += count;
    }
}

/// Pool of pinned host slots of `T`.
pub struct PinnedPtrPool<T: Copy + Default + Send + 'static> {
    state: Arc<Mutex<PoolState<T>>>,
}

impl<T: Copy + Default + Send + 'static> PinnedPtrPool<T> {
    /// Slots pre-allocated at construction.
    pub const PREALLOC_COUNT: usize = elements_in::<T>(PINNED_POOL_PREALLOC_SIZE_BYTES);
    /// Slots added each time the pool runs dry.
    pub const REALLOC_COUNT: usize = elements_in::<T>(PINNED_POOL_REALLOC_SIZE_BYTES);

    pub fn new() -> Self {
        let mut state = PoolState { free: Vec::new(), alloced: 0 };
        state.grow(Self::PREALLOC_COUNT);
        Self { state: Arc::new(Mutex::new(state)) }
    }

    /// Take a slot, growing the pool if it is empty.
    pub fn allocate(&self) -> Result<PinnedPtr<T>> {
        let mut state = self.lock()?;
        if state.free.is_empty() {
            log::debug!("pinned pool empty, growing by {}", Self::REALLOC_COUNT);
            state.grow(Self::REALLOC_COUNT);
        }
        let slot = state
            .free
            .pop()
            .ok_or_else(|| DevcompError::internal("pinned pool empty after growing"))?;
        Ok(PinnedPtr { slot, pool: Arc::downgrade(&self.state) })
    }

    /// Slots currently free in the pool.
    pub fn current_pool_size(&self) -> Result<usize> {
        Ok(self.lock()?.free.len())
    }

    /// Slots ever allocated by the pool.
    pub fn alloced_size(&self) -> Result<usize> {
        Ok(self.lock()?.alloced)
    }

    fn lock(&self) -> Result<MutexGuard<'_, PoolState<T>>> {
        self.state
            .lock()
            .map_err(|_| DevcompError::internal("pinned pool poisoned"))
    }
}

impl<T: Copy + Default + Send + 'static> Default for PinnedPtrPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

const fn elements_in<T>(bytes: usize) -> usize {
    let size = std::mem::size_of::<T>();
    if size == 0 { 1 } else { bytes / size }
}

/// Handle to one pinned slot. Returns the slot to its pool on drop.
pub struct PinnedPtr<T: Copy + Default + Send + 'static> {
    slot: Slot<T>,
    pool: Weak<Mutex<PoolState<T>>>,
}

impl<T: Copy + Default + Send + 'static> PinnedPtr<T> {
    pub fn get(&self) -> Result<T> {
        self.slot
            .lock()
            .map(|v| *v)
            .map_err(|_| DevcompError::internal("pinned slot poisoned"))
    }

    pub fn set(&self, value: T) -> Result<()> {
        let mut v = self
            .slot
            .lock()
            .map_err(|_| DevcompError::internal("pinned slot poisoned"))?;
        *v = value;
        Ok(())
    }

    /// Device-side view of the slot for stream writes.
    pub(crate) fn device_view(&self) -> Slot<T> {
        self.slot.clone()
    }
}

impl<T: Copy + Default + Send + 'static> Drop for PinnedPtr<T> {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.upgrade() {
            if let Ok(mut state) = pool.lock() {
                state.free.push(self.slot.clone());
            }
        }
    }
}
