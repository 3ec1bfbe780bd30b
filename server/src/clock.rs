//! Elapsed-time sources for round timing
//!
//! A round's duration is measured between `start` and `stop`. `clear` rewinds
//! the accumulated time to zero so the next `start` measures a fresh round.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

pub trait Clock: Send {
    fn start(&mut self);
    fn stop(&mut self);
    fn clear(&mut self);
    /// Milliseconds accumulated while running since the last `clear`
    fn elapsed_millis(&self) -> u64;
}

/// Monotonic clock backed by `Instant`
#[derive(Debug, Default)]
pub struct SystemClock {
    started_at: Option<Instant>,
    accumulated_millis: u64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }
}

impl Clock for SystemClock {
    fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
    }

    fn stop(&mut self) {
        if let Some(started_at) = self.started_at.take() {
            let millis = started_at.elapsed().as_millis().min(u64::MAX as u128) as u64;
            self.accumulated_millis = self.accumulated_millis.saturating_add(millis);
        }
    }

    fn clear(&mut self) {
        self.accumulated_millis = 0;
        if self.started_at.is_some() {
            self.started_at = Some(Instant::now());
        }
    }

    fn elapsed_millis(&self) -> u64 {
        let running = self
            .started_at
            .map(|started_at| started_at.elapsed().as_millis().min(u64::MAX as u128) as u64)
            .unwrap_or(0);
        self.accumulated_millis.saturating_add(running)
    }
}

/// Clock whose time only moves when `advance` is called.
///
/// Clones share the same time, so a test can keep one handle while the
/// session owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    inner: Arc<ManualClockState>,
}

#[derive(Debug, Default)]
struct ManualClockState {
    running: AtomicBool,
    elapsed_millis: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves time forward; ignored while the clock is stopped.
    pub fn advance(&self, millis: u64) {
        if self.is_running() {
            self.inner.elapsed_millis.fetch_add(millis, Ordering::SeqCst);
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }
}

impl Clock for ManualClock {
    fn start(&mut self) {
        self.inner.running.store(true, Ordering::SeqCst);
    }

    fn stop(&mut self) {
        self.inner.running.store(false, Ordering::SeqCst);
    }

    fn clear(&mut self) {
        self.inner.elapsed_millis.store(0, Ordering::SeqCst);
    }

    fn elapsed_millis(&self) -> u64 {
        self.inner.elapsed_millis.load(Ordering::SeqCst)
    }
}
