#![forbid(unsafe_code)]

//! Latest polled data shared between the loop and anyone observing it.
//!
//! The refresh loop is the only writer. It holds the lock just long enough
//! to swap in a new [`FrameState`]; rendering works on a clone taken with
//! [`SharedFrameState::snapshot`], so drawing never happens under the lock.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::snapshot::Snapshot;

/// Data of the most recent successful poll.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameState {
    /// `None` until the first poll succeeds.
    pub snapshot: Option<Snapshot>,
    /// Successful polls so far. Never decreases.
    pub poll_count: u64,
}

impl FrameState {
    /// Whether at least one poll has succeeded.
    #[must_use]
    pub fn has_data(&self) -> bool {
        self.snapshot.is_some()
    }
}

/// Mutex-guarded [`FrameState`] with cheap clones of the handle.
#[derive(Debug, Clone, Default)]
pub struct SharedFrameState {
    inner: Arc<Mutex<FrameState>>,
}

impl SharedFrameState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the data wholesale and bump the poll counter.
    ///
    /// Returns the new poll count.
    pub fn replace(&self, snapshot: Snapshot) -> u64 {
        let mut state = self.lock();
        state.snapshot = Some(snapshot);
        state.poll_count += 1;
        state.poll_count
    }

    /// A clone of the current state, taken under the lock.
    #[must_use]
    pub fn snapshot(&self) -> FrameState {
        self.lock().clone()
    }

    #[must_use]
    pub fn poll_count(&self) -> u64 {
        self.lock().poll_count
    }

    fn lock(&self) -> MutexGuard<'_, FrameState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::ClusterStatus;

    fn named(name: &str) -> Snapshot {
        Snapshot {
            cluster: ClusterStatus {
                cluster_name: name.into(),
                ..ClusterStatus::default()
            },
            ..Snapshot::default()
        }
    }

    #[test]
    fn starts_without_data() {
        let shared = SharedFrameState::new();
        let state = shared.snapshot();
        assert!(!state.has_data());
        assert_eq!(state.poll_count, 0);
    }

    #[test]
    fn replace_is_wholesale_and_counts() {
        let shared = SharedFrameState::new();
        assert_eq!(shared.replace(named("a")), 1);
        assert_eq!(shared.replace(named("b")), 2);
        let state = shared.snapshot();
        assert_eq!(state.poll_count, 2);
        assert_eq!(state.snapshot.map(|s| s.cluster.cluster_name), Some("b".to_owned()));
    }

    #[test]
    fn clones_share_state() {
        let shared = SharedFrameState::new();
        let observer = shared.clone();
        shared.replace(named("x"));
        assert_eq!(observer.poll_count(), 1);
    }

    #[test]
    fn taken_snapshot_is_detached() {
        let shared = SharedFrameState::new();
        shared.replace(named("before"));
        let taken = shared.snapshot();
        shared.replace(named("after"));
        assert_eq!(taken.poll_count, 1);
        assert_eq!(
            taken.snapshot.map(|s| s.cluster.cluster_name),
            Some("before".to_owned())
        );
    }
}
