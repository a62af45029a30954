//! device/stream.rs
//! Execution streams: FIFO ordering domains backed by one worker each.
//!
//! Design notes:
//! - Every stream owns a single worker draining a crossbeam channel, so work
//!   enqueued on one stream runs in submission order. Two streams share
//!   nothing and have no relative order.
//! - A failing operation leaves a sticky fault on the stream. Later work on
//!   that stream is skipped, new launches are rejected at enqueue time, and
//!   `synchronize` reports the fault. This is the stream's own failure channel.
//! - A job that panics is recorded as a `DeviceError` fault. The worker keeps
//!   serving fences, so the stream stays observable.
//! - The compression core never creates streams; callers do.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crossbeam::channel::{self, Receiver, Sender};

use crate::error::{DevcompError, Result};

type Job = Box<dyn FnOnce() -> Result<()> + Send + 'static>;

enum Command {
    Launch { label: &'static str, job: Job },
    Fence(Sender<()>),
}

static NEXT_STREAM_ID: AtomicU64 = AtomicU64::new(1);

/// Cloneable handle to an execution stream.
#[derive(Clone)]
pub struct Stream {
    inner: Arc<StreamInner>,
}

struct StreamInner {
    id: u64,
    tx: Option<Sender<Command>>,
    fault: Arc<Mutex<Option<DevcompError>>>,
    worker: Option<JoinHandle<()>>,
}

impl Stream {
    /// Create a stream and spawn its worker.
    pub fn new() -> Result<Self> {
        let id = NEXT_STREAM_ID.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = channel::unbounded();
        let fault = Arc::new(Mutex::new(None));

        let worker_fault = fault.clone();
        let worker = std::thread::Builder::new()
            .name(format!("devcomp-stream-{id}"))
            .spawn(move || run_stream_worker(id, rx, worker_fault))
            .map_err(|e| DevcompError::device(format!("failed to spawn stream worker: {e}")))?;

        log::debug!("stream {id} created");
        Ok(Self {
            inner: Arc::new(StreamInner {
                id,
                tx: Some(tx),
                fault,
                worker: Some(worker),
            }),
        })
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Sticky fault recorded by a failed operation, if any.
    pub fn fault(&self) -> Option<DevcompError> {
        self.inner.fault.lock().ok().and_then(|f| f.clone())
    }

    /// Enqueue `job` behind all prior work on this stream.
    ///
    /// # Errors
    /// - `StatusCode::DeviceError` if the stream holds a sticky fault or its
    ///   worker is gone. Reported at launch time, nothing is enqueued.
    pub fn enqueue<F>(&self, label: &'static str, job: F) -> Result<()>
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        if let Some(fault) = self.fault() {
            return Err(DevcompError::device(format!(
                "stream {} rejected launch of {}: prior fault: {}",
                self.id(),
                label,
                fault
            )));
        }

        log::trace!("stream {}: enqueue {}", self.id(), label);
        self.sender()?
            .send(Command::Launch { label, job: Box::new(job) })
            .map_err(|_| {
                DevcompError::device(format!("stream {} rejected launch of {}: worker gone", self.id(), label))
            })
    }

    /// Enqueue `job` and block until it has run, returning its value.
    pub(crate) fn enqueue_and_wait<T, F>(&self, label: &'static str, job: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let (tx, rx) = channel::bounded(1);
        self.enqueue(label, move || {
            let value = job()?;
            let _ = tx.send(value);
            Ok(())
        })?;

        // A dropped sender means the job failed or was skipped behind a fault.
        // The fence orders us after the worker has recorded that fault.
        match rx.recv() {
            Ok(value) => Ok(value),
            Err(_) => {
                self.synchronize()?;
                Err(DevcompError::device(format!("stream {}: {} did not complete", self.id(), label)))
            }
        }
    }

    /// Wait for all work enqueued so far.
    ///
    /// # Errors
    /// - The sticky fault of the first failed operation on this stream.
    pub fn synchronize(&self) -> Result<()> {
        let (tx, rx) = channel::bounded(1);
        self.sender()?
            .send(Command::Fence(tx))
            .map_err(|_| DevcompError::device(format!("stream {}: worker gone", self.id())))?;
        rx.recv()
            .map_err(|_| DevcompError::device(format!("stream {}: worker gone", self.id())))?;

        match self.fault() {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }

    fn sender(&self) -> Result<&Sender<Command>> {
        self.inner
            .tx
            .as_ref()
            .ok_or_else(|| DevcompError::device(format!("stream {} is destroyed", self.id())))
    }
}

impl std::fmt::Debug for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stream")
            .field("id", &self.inner.id)
            .field("faulted", &self.fault().is_some())
            .finish()
    }
}

impl Drop for StreamInner {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain what is queued and exit.
        drop(self.tx.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        log::debug!("stream {} destroyed", self.id);
    }
}

/// Single stream worker loop.
fn run_stream_worker(id: u64, rx: Receiver<Command>, fault: Arc<Mutex<Option<DevcompError>>>) {
    while let Ok(cmd) = rx.recv() {
        match cmd {
            Command::Launch { label, job } => {
                let faulted = fault.lock().map(|f| f.is_some()).unwrap_or(true);
                if faulted {
                    log::trace!("stream {id}: skipping {label} behind sticky fault");
                    continue;
                }

                let outcome = panic::catch_unwind(AssertUnwindSafe(job)).unwrap_or_else(|payload| {
                    Err(DevcompError::device(format!("{label} aborted: {}", panic_message(payload.as_ref()))))
                });
                if let Err(e) = outcome {
                    log::warn!("stream {id}: {label} failed: {e}");
                    if let Ok(mut slot) = fault.lock() {
                        slot.get_or_insert(e);
                    }
                }
            }
            Command::Fence(done) => {
                let _ = done.send(());
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "kernel panicked"
    }
}
