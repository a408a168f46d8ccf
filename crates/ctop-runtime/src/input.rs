#![forbid(unsafe_code)]

//! Keyboard sensing on its own thread.
//!
//! [`InputWatcher`] polls a [`KeySource`] in short slices and fires a
//! [`StopTrigger`] on the first cancel key (`q`, `Q`, ESC, Ctrl-C). The
//! refresh loop never reads keys itself, so a long sleep between polls does
//! not delay the quit.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use ctop_core::event::{self, KeyEvent};

use crate::stop_signal::StopTrigger;

/// How long one key poll may block before the watcher rechecks shutdown.
pub const POLL_SLICE: Duration = Duration::from_millis(100);

/// Something that yields key events.
pub trait KeySource {
    /// Wait up to `timeout` for a key. `Ok(None)` on timeout.
    fn poll_key(&mut self, timeout: Duration) -> io::Result<Option<KeyEvent>>;
}

/// Keys from the controlling terminal via Crossterm.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalKeys;

impl KeySource for TerminalKeys {
    fn poll_key(&mut self, timeout: Duration) -> io::Result<Option<KeyEvent>> {
        event::read_key(timeout)
    }
}

impl<F> KeySource for F
where
    F: FnMut(Duration) -> io::Result<Option<KeyEvent>>,
{
    fn poll_key(&mut self, timeout: Duration) -> io::Result<Option<KeyEvent>> {
        self(timeout)
    }
}

/// Background thread that turns a cancel key into a stop.
///
/// Dropping the watcher asks the thread to finish and joins it.
#[derive(Debug)]
pub struct InputWatcher {
    shutdown: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl InputWatcher {
    /// Start watching `keys`; `trigger` fires on the first cancel key.
    ///
    /// The thread also ends on its own when the trigger was fired by someone
    /// else, or when the key source reports an error.
    pub fn spawn<K>(keys: K, trigger: StopTrigger) -> io::Result<Self>
    where
        K: KeySource + Send + 'static,
    {
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&shutdown);
        let thread = thread::Builder::new()
            .name("clustertop-input".into())
            .spawn(move || watch(keys, &trigger, &flag))?;
        Ok(Self {
            shutdown,
            thread: Some(thread),
        })
    }

    /// Whether the watcher thread has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Ask the thread to stop and wait for it.
    pub fn stop(mut self) {
        self.shutdown_and_join();
    }

    fn shutdown_and_join(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for InputWatcher {
    fn drop(&mut self) {
        self.shutdown_and_join();
    }
}

fn watch<K: KeySource>(mut keys: K, trigger: &StopTrigger, shutdown: &AtomicBool) {
    while !shutdown.load(Ordering::Acquire) && !trigger.is_stopped() {
        match keys.poll_key(POLL_SLICE) {
            Ok(Some(key)) if key.is_cancel() => {
                tracing::debug!(?key, "cancel key pressed");
                trigger.stop();
                return;
            }
            Ok(Some(key)) => tracing::trace!(?key, "ignored key"),
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(error = %err, "key input unavailable, watcher exiting");
                return;
            }
        }
    }
}
