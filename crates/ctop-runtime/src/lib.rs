#![forbid(unsafe_code)]

//! Runtime for clustertop: configuration, the snapshot model and its
//! sources, keyboard cancellation, and the refresh loop that ties them to a
//! terminal surface.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod frame_state;
pub mod input;
pub mod snapshot;
pub mod source;
pub mod stop_signal;

pub use config::{ConfigError, DashboardConfig, SortKey};
pub use dashboard::{Dashboard, DashboardState, ExitReason};
pub use error::DashboardError;
pub use frame_state::{FrameState, SharedFrameState};
pub use input::{InputWatcher, KeySource, TerminalKeys};
pub use snapshot::{ClusterStatus, CpuStats, HostProcesses, MemoryStats, ProcessRecord, ProcessRow, Snapshot};
pub use source::{FetchError, FetchErrorKind, JsonFileSource, SnapshotSource};
pub use stop_signal::{StopSignal, StopTrigger};
