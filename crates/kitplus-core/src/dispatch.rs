//! Foreground and background execution contexts.
//!
//! The foreground context is a [`MainQueue`] bound to the thread that created
//! it; that thread drains it with [`MainQueue::run_pending`] or
//! [`MainQueue::run_next`]. Work is handed to it from anywhere through a
//! clonable [`MainHandle`]. Background work runs on the global rayon pool.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use thiserror::Error;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Errors from handing work to the foreground context.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The queue was dropped, nothing will run the job.
    #[error("Main queue is closed")]
    MainQueueClosed,
}

/// Queue of jobs executed on the thread that owns it.
pub struct MainQueue {
    receiver: Receiver<Job>,
    handle: MainHandle,
}

/// Sending side of a [`MainQueue`].
#[derive(Clone)]
pub struct MainHandle {
    sender: Sender<Job>,
    thread: ThreadId,
}

impl MainQueue {
    /// Create a queue whose foreground thread is the current thread.
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            receiver,
            handle: MainHandle {
                sender,
                thread: thread::current().id(),
            },
        }
    }

    pub fn handle(&self) -> MainHandle {
        self.handle.clone()
    }

    /// Run every job that is already queued. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.receiver.try_recv() {
            job();
            ran += 1;
        }
        ran
    }

    /// Wait up to `timeout` for one job and run it.
    pub fn run_next(&self, timeout: Duration) -> bool {
        match self.receiver.recv_timeout(timeout) {
            Ok(job) => {
                job();
                true
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    /// Keep running jobs until `done` returns true or `timeout` elapses.
    pub fn run_until(&self, timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while !done() {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            self.run_next(deadline - now);
        }
        true
    }
}

impl Default for MainQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl MainHandle {
    /// True when called on the queue's foreground thread.
    pub fn is_main_thread(&self) -> bool {
        thread::current().id() == self.thread
    }

    /// Queue `job` for the foreground thread without waiting.
    pub fn dispatch<F>(&self, job: F) -> Result<(), DispatchError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.sender
            .send(Box::new(job))
            .map_err(|_| DispatchError::MainQueueClosed)
    }

    /// Run `job` on the foreground thread and wait for its result.
    ///
    /// Runs inline when already on the foreground thread. Called from another
    /// thread it blocks until the foreground thread drains the queue.
    pub fn perform_on_main<F, R>(&self, job: F) -> Result<R, DispatchError>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        if self.is_main_thread() {
            return Ok(job());
        }

        let (tx, rx) = mpsc::sync_channel(1);
        self.dispatch(move || {
            // The waiting side only goes away if the caller thread died
            let _ = tx.send(job());
        })?;
        rx.recv().map_err(|_| DispatchError::MainQueueClosed)
    }
}

/// Run `job` on the background pool.
pub fn background<F>(job: F)
where
    F: FnOnce() + Send + 'static,
{
    rayon::spawn(job);
}
