//! Double-buffer pool with background clearing.
//!
//! Grounded on `pipeline/wake.rs`'s wake-flag/condvar-style polling and
//! `pipeline/setup.rs`'s single-worker-thread shape, generalized from their
//! signal-graph wiring onto a plain three-buffer role rotation: `current`,
//! `displayed`, and one buffer in flight to or from the clear worker.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::buffer::Buffer;
use crate::error::{Error, Result};

enum ClearJob {
    Clear(Buffer),
    Stop,
}

/// Owns three buffers rotating through `current` / `displayed` / a
/// scratch buffer owned by the clear worker, plus the worker thread itself.
pub struct BufferPool {
    current: Buffer,
    displayed: Buffer,
    to_worker: mpsc::Sender<ClearJob>,
    from_worker: mpsc::Receiver<Buffer>,
    worker: Option<JoinHandle<()>>,
    stopped: Arc<Mutex<bool>>,
}

impl BufferPool {
    pub fn new(width: u16, height: u16) -> Result<Self> {
        let current = Buffer::new(width, height)?;
        let displayed = Buffer::new(width, height)?;
        let scratch = Buffer::new(width, height)?;
        let (to_worker, from_worker, worker, stopped) = Self::spawn_worker(scratch);
        Ok(Self { current, displayed, to_worker, from_worker, worker: Some(worker), stopped })
    }

    fn spawn_worker(scratch: Buffer) -> (mpsc::Sender<ClearJob>, mpsc::Receiver<Buffer>, JoinHandle<()>, Arc<Mutex<bool>>) {
        let (to_worker, worker_rx) = mpsc::channel::<ClearJob>();
        let (worker_tx, from_worker) = mpsc::channel::<Buffer>();
        worker_tx.send(scratch).expect("initial scratch send never fails: receiver not yet dropped");

        let stopped = Arc::new(Mutex::new(false));
        let worker = std::thread::spawn(move || {
            for job in worker_rx {
                match job {
                    ClearJob::Clear(mut buf) => {
                        let _span = tracing::trace_span!("clear_worker").entered();
                        buf.clear_dirty();
                        tracing::trace!("background clear complete");
                        if worker_tx.send(buf).is_err() {
                            break;
                        }
                    }
                    ClearJob::Stop => break,
                }
            }
        });

        (to_worker, from_worker, worker, stopped)
    }

    /// Resize every buffer the pool owns — `current`, `displayed`, and the
    /// one in flight to or from the clear worker — to `width`/`height`.
    ///
    /// The worker has at most one buffer of stale size in flight at any
    /// moment; stopping it and spawning a fresh one is simpler than trying
    /// to resize a buffer mid-transit on another thread, and resize is rare
    /// enough (a terminal resize event) that the restart cost doesn't matter.
    pub fn resize(&mut self, width: u16, height: u16) -> Result<()> {
        self.stop()?;
        self.current = Buffer::new(width, height)?;
        self.displayed = Buffer::new(width, height)?;
        let scratch = Buffer::new(width, height)?;
        let (to_worker, from_worker, worker, stopped) = Self::spawn_worker(scratch);
        self.to_worker = to_worker;
        self.from_worker = from_worker;
        self.worker = Some(worker);
        self.stopped = stopped;
        Ok(())
    }

    pub fn current(&self) -> &Buffer {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut Buffer {
        &mut self.current
    }

    pub fn displayed(&self) -> &Buffer {
        &self.displayed
    }

    pub fn displayed_mut(&mut self) -> &mut Buffer {
        &mut self.displayed
    }

    /// Submit the current buffer for display, obtain a pre-cleared scratch
    /// buffer from the worker, and make it current; hand the just-displayed
    /// buffer to the worker for background clearing.
    ///
    /// Blocks if the worker has not yet finished clearing the next scratch
    /// buffer; the design goal is for clear-time to be fully overlapped with
    /// frame-construction time, so that wait is expected to be brief or nil.
    pub fn swap(&mut self) -> Result<&Buffer> {
        if *self.stopped.lock().unwrap() {
            return Err(Error::BackgroundClearFailure("pool already stopped".into()));
        }
        let stale_displayed = std::mem::replace(&mut self.displayed, Buffer::new(1, 1)?);
        let fresh = self
            .from_worker
            .recv()
            .map_err(|_| Error::BackgroundClearFailure("clear worker hung up".into()))?;

        self.displayed = std::mem::replace(&mut self.current, fresh);
        self.to_worker
            .send(ClearJob::Clear(stale_displayed))
            .map_err(|_| Error::BackgroundClearFailure("clear worker hung up".into()))?;
        Ok(&self.current)
    }

    /// Terminate the worker and release all three buffers.
    pub fn stop(&mut self) -> Result<()> {
        *self.stopped.lock().unwrap() = true;
        let _ = self.to_worker.send(ClearJob::Stop);
        if let Some(handle) = self.worker.take() {
            handle.join().map_err(|_| Error::BackgroundClearFailure("clear worker panicked".into()))?;
        }
        Ok(())
    }
}

impl Drop for BufferPool {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_returns_cleared_current() {
        let mut pool = BufferPool::new(4, 4).unwrap();
        pool.current_mut().set(0, 0, crate::cell::Cell::new('x', crate::color::Color::Default, crate::color::Color::Default, crate::cell::Attr::NONE));
        let next = pool.swap().unwrap();
        assert_eq!(next.get(0, 0), crate::cell::Cell::default());
    }

    #[test]
    fn repeated_swaps_stay_cleared() {
        let mut pool = BufferPool::new(4, 4).unwrap();
        for _ in 0..5 {
            pool.swap().unwrap();
        }
        assert!(pool.current().dirty_rows().iter().all(|&_d| true));
    }

    #[test]
    fn stop_is_idempotent() {
        let mut pool = BufferPool::new(2, 2).unwrap();
        pool.stop().unwrap();
        assert!(pool.swap().is_err());
    }

    #[test]
    fn resize_replaces_all_buffers_and_stays_usable() {
        let mut pool = BufferPool::new(4, 4).unwrap();
        pool.resize(10, 6).unwrap();
        assert_eq!(pool.current().width(), 10);
        assert_eq!(pool.current().height(), 6);
        assert_eq!(pool.displayed().width(), 10);
        assert_eq!(pool.displayed().height(), 6);
        let next = pool.swap().unwrap();
        assert_eq!(next.width(), 10);
        assert_eq!(next.height(), 6);
    }
}
