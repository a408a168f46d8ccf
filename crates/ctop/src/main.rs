#![forbid(unsafe_code)]

//! `clustertop` binary entry point.
//!
//! Configuration comes from `CLUSTERTOP_*` environment variables. Snapshots
//! are read from `CLUSTERTOP_SNAPSHOT_FILE` when set, otherwise a simulated
//! cluster is shown.

use std::env;
use std::fs::OpenOptions;
use std::process;
use std::sync::Mutex;

use ctop::prelude::*;
use ctop_runtime::config::ENV_HELP;
use time::UtcOffset;
use tracing_subscriber::EnvFilter;

fn main() {
    init_logging();

    let config = match DashboardConfig::from_env().and_then(|config| config.validate().map(|()| config)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("clustertop: {e}\n\n{ENV_HELP}");
            process::exit(2);
        }
    };

    // Must happen while the process is still single-threaded.
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);

    let result = match env::var_os("CLUSTERTOP_SNAPSHOT_FILE") {
        Some(path) => run(&config, offset, JsonFileSource::new(path)),
        None => {
            let source = SimulatedCluster::new(config.cluster_id, config.cluster_name.clone());
            run(&config, offset, source)
        }
    };

    match result {
        Ok(reason) => tracing::info!(?reason, "clustertop exiting"),
        Err(e) => {
            tracing::error!(error = %e, "clustertop failed");
            eprintln!("clustertop: {e}");
            process::exit(1);
        }
    }
}

/// Own the terminal for the duration of one dashboard run.
///
/// The session is dropped, and the screen restored, before the result is
/// returned so that error messages land on the normal screen.
fn run<S: SnapshotSource>(
    config: &DashboardConfig,
    offset: UtcOffset,
    source: S,
) -> Result<ExitReason, DashboardError> {
    let mut dashboard = Dashboard::new(config, source).with_utc_offset(offset);
    let (signal, trigger) = StopSignal::new();

    let session = TerminalSession::new(SessionOptions::dashboard())?;
    let input = InputWatcher::spawn(TerminalKeys, trigger)?;
    let mut surface = CrosstermSurface::stdout();

    let result = dashboard.run(&mut surface, &signal);

    input.stop();
    drop(session);
    result
}

/// Log to `CLUSTERTOP_LOG_FILE` when set; never to the terminal being drawn.
fn init_logging() {
    let Some(path) = env::var_os("CLUSTERTOP_LOG_FILE") else {
        return;
    };
    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("clustertop: cannot open log file {}: {e}", path.to_string_lossy());
            return;
        }
    };
    let filter = EnvFilter::try_from_env("CLUSTERTOP_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}
