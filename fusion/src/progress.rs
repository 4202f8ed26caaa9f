//! Progress reporting for alignment and render passes.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Monotonic progress counter sink supplied by the host.
///
/// Calls are synchronous notifications. A host may poll the counter from
/// another thread, so implementations take `&self`.
pub trait ProgressWatcher: Sync {
    fn set_total(&self, total: usize);
    fn total(&self) -> usize;
    fn current(&self) -> usize;
    fn set_current(&self, current: usize);

    fn add(&self, amount: usize) {
        self.set_current(self.current() + amount);
    }
}

/// Lock-free [`ProgressWatcher`].
#[derive(Debug, Default)]
pub struct ProgressCounter {
    total: AtomicUsize,
    current: AtomicUsize,
}

impl ProgressCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fraction done in `[0, 1]`; 0 when no total has been set.
    pub fn fraction(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            (self.current() as f64 / total as f64).min(1.0)
        }
    }
}

impl ProgressWatcher for ProgressCounter {
    fn set_total(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
    }

    fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    fn current(&self) -> usize {
        self.current.load(Ordering::Relaxed)
    }

    fn set_current(&self, current: usize) {
        self.current.store(current, Ordering::Relaxed);
    }

    fn add(&self, amount: usize) {
        self.current.fetch_add(amount, Ordering::Relaxed);
    }
}

/// Optional watcher. Every call is a no-op without one.
#[derive(Clone, Copy, Default)]
pub struct Progress<'a> {
    watcher: Option<&'a dyn ProgressWatcher>,
}

impl<'a> Progress<'a> {
    pub fn new(watcher: Option<&'a dyn ProgressWatcher>) -> Self {
        Self { watcher }
    }

    pub fn none() -> Self {
        Self { watcher: None }
    }

    /// Restarts the counter at 0 of `total`.
    pub fn set_total(&self, total: usize) {
        if let Some(watcher) = self.watcher {
            watcher.set_total(total);
            watcher.set_current(0);
        }
    }

    pub fn add(&self, amount: usize) {
        if let Some(watcher) = self.watcher {
            watcher.add(amount);
        }
    }
}

impl std::fmt::Debug for Progress<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.watcher {
            None => write!(f, "Progress::None"),
            Some(w) => write!(f, "Progress({}/{})", w.current(), w.total()),
        }
    }
}
