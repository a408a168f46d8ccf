#![forbid(unsafe_code)]

//! clustertop facade crate.
//!
//! Re-exports the pieces a front end needs to run the dashboard, plus a
//! simulated cluster for running without a controller.

pub mod simulated;

// --- Core re-exports -------------------------------------------------------

pub use ctop_core::event::{KeyCode, KeyEvent, KeyEventKind, Modifiers};
pub use ctop_core::palette::{ColorRole, Palette};
pub use ctop_core::surface::{CrosstermSurface, TermSize, TerminalSurface};
pub use ctop_core::terminal_session::{SessionOptions, TerminalSession};

// --- Widget re-exports -----------------------------------------------------

pub use ctop_widgets::column::{ColumnFormat, Justify};
pub use ctop_widgets::graph::Graph;
pub use ctop_widgets::series::{AggregateKind, SampleSeries};

// --- Runtime re-exports ----------------------------------------------------

pub use ctop_runtime::{
    ConfigError, Dashboard, DashboardConfig, DashboardError, DashboardState, ExitReason, FetchError, FetchErrorKind,
    InputWatcher, JsonFileSource, Snapshot, SnapshotSource, SortKey, StopSignal, StopTrigger, TerminalKeys,
};

pub use simulated::SimulatedCluster;

/// Everything needed for the common "build config, pick a source, run" path.
pub mod prelude {
    pub use crate::{
        CrosstermSurface, Dashboard, DashboardConfig, DashboardError, ExitReason, InputWatcher, JsonFileSource,
        SessionOptions, SimulatedCluster, SnapshotSource, StopSignal, TerminalKeys, TerminalSession,
        TerminalSurface,
    };
}
