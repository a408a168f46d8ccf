#![forbid(unsafe_code)]

//! Condvar-backed cancellation shared by the refresh loop and the key watcher.
//!
//! [`StopSignal`] is the waiting side: the loop checks it at boundaries and
//! sleeps through [`StopSignal::wait_timeout`], which returns early as soon as
//! the paired [`StopTrigger`] fires. Both halves are cheap clones of one
//! `Arc`.
//!
//! ```
//! use std::time::Duration;
//! use ctop_runtime::stop_signal::StopSignal;
//!
//! let (signal, trigger) = StopSignal::new();
//! assert!(!signal.wait_timeout(Duration::from_millis(1)));
//! trigger.stop();
//! assert!(signal.wait_timeout(Duration::from_secs(60)));
//! ```

use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

type Shared = Arc<(Mutex<bool>, Condvar)>;

/// Waiting half of a stop pair.
#[derive(Debug, Clone)]
pub struct StopSignal {
    inner: Shared,
}

impl StopSignal {
    /// Create a new stop signal pair (signal, trigger).
    #[must_use]
    pub fn new() -> (Self, StopTrigger) {
        let inner: Shared = Arc::new((Mutex::new(false), Condvar::new()));
        let signal = Self {
            inner: Arc::clone(&inner),
        };
        (signal, StopTrigger { inner })
    }

    /// Check if the stop signal has been triggered.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        *lock(&self.inner.0)
    }

    /// Wait for either the stop signal or a timeout.
    ///
    /// Returns `true` if stopped, `false` if timed out. Spurious wakeups are
    /// absorbed by waiting again for the remainder.
    pub fn wait_timeout(&self, duration: Duration) -> bool {
        let (mutex, cvar) = &*self.inner;
        let mut stopped = lock(mutex);
        if *stopped {
            return true;
        }

        let start = Instant::now();
        let mut remaining = duration;

        loop {
            let (guard, result) = match cvar.wait_timeout(stopped, remaining) {
                Ok(pair) => pair,
                Err(poisoned) => poisoned.into_inner(),
            };
            stopped = guard;
            if *stopped {
                return true;
            }
            if result.timed_out() {
                return false;
            }
            let elapsed = start.elapsed();
            if elapsed >= duration {
                return false;
            }
            remaining = duration - elapsed;
        }
    }
}

/// Firing half of a stop pair.
#[derive(Debug, Clone)]
pub struct StopTrigger {
    inner: Shared,
}

impl StopTrigger {
    /// Fire the signal and wake every waiter. Idempotent.
    pub fn stop(&self) {
        let (mutex, cvar) = &*self.inner;
        let mut stopped = lock(mutex);
        *stopped = true;
        cvar.notify_all();
    }

    /// Whether [`stop`](Self::stop) has been called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        *lock(&self.inner.0)
    }
}

fn lock(mutex: &Mutex<bool>) -> MutexGuard<'_, bool> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
