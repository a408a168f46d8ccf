#![forbid(unsafe_code)]

//! The refresh loop.
//!
//! # State machine
//!
//! ```text
//! Idle ─► Polling ─► Rendering ─► Sleeping ─┐
//!            ▲                              │
//!            └──────────────────────────────┘
//! any boundary ─► Exiting
//! ```
//!
//! A poll is one blocking [`SnapshotSource::fetch_snapshot`] call. A failed
//! poll ends the run with [`DashboardError::Fetch`]; nothing is retried and
//! nothing more is drawn. The stop signal is honoured before each poll and
//! while sleeping, never in the middle of a frame.
//!
//! # Frame layout
//!
//! ```text
//! TITLE | 12:04:05 cluster - status      header line
//! %Cpu(s): ...                           stat lines (after the first poll)
//! Mem : ...
//! Swap: ...
//! CPU busy %                             optional history graph
//!  100 │   ▂▅█
//!   50 │▁▃▅████
//! PID USER HOST PR VIRT RES S %CPU ...   process table, clamped to height
//! ...
//!  Q-Quit                                footer on the last row
//! ```
//!
//! Every written row is followed by clear-to-end-of-line, and rows between
//! the content and the footer are blanked, so a shorter frame fully covers
//! a longer previous one.

use std::io;

use ctop_core::palette::{ColorRole, Palette};
use ctop_core::surface::TerminalSurface;
use ctop_widgets::column::ColumnFormat;
use ctop_widgets::graph::Graph;
use ctop_widgets::units::{bytes_to_human, percent};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};
use unicode_width::UnicodeWidthStr;

use crate::config::{DashboardConfig, SortKey};
use crate::error::DashboardError;
use crate::frame_state::{FrameState, SharedFrameState};
use crate::snapshot::{ProcessRow, Snapshot};
use crate::source::{FetchError, SnapshotSource};
use crate::stop_signal::StopSignal;

/// Shown instead of the table while there is nothing to list.
pub const WAITING_TEXT: &str = "*** Waiting for data. ***";

/// Title of the CPU history graph.
pub const CPU_GRAPH_TITLE: &str = "CPU busy %";

const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

const TIME_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]:[second]");

const HEADERS: [&str; 10] = ["PID", "USER", "HOST", "PR", "VIRT", "RES", "S", "%CPU", "%MEM", "COMMAND"];

/// Minimum USER width, so the table does not jitter as short names come and go.
const USER_MIN_WIDTH: &str = "xxxxxxxxxx";

/// Where the loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DashboardState {
    Idle,
    Polling,
    Rendering,
    Sleeping,
    Exiting,
}

/// Why a run ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitReason {
    /// The stop signal fired (quit key or caller).
    Cancelled,
    /// The configured number of frames was drawn.
    FrameLimit,
}

/// Polls a [`SnapshotSource`] and draws frames onto a [`TerminalSurface`].
#[derive(Debug)]
pub struct Dashboard<S> {
    config: DashboardConfig,
    palette: Palette,
    source: S,
    frame: SharedFrameState,
    cpu_graph: Graph,
    table: ProcessTable,
    state: DashboardState,
    frames_rendered: u64,
    utc_offset: UtcOffset,
}

impl<S: SnapshotSource> Dashboard<S> {
    /// Create an idle dashboard. The configuration is copied.
    pub fn new(config: &DashboardConfig, source: S) -> Self {
        let palette = Palette::new(config.syntax_highlight);
        Self {
            config: config.clone(),
            palette,
            source,
            frame: SharedFrameState::new(),
            cpu_graph: Graph::new(CPU_GRAPH_TITLE, config.graph_aggregate),
            table: ProcessTable::new(&palette),
            state: DashboardState::Idle,
            frames_rendered: 0,
            utc_offset: UtcOffset::UTC,
        }
    }

    /// Show the clock in `offset` instead of UTC.
    ///
    /// The local offset has to be determined before other threads start, so
    /// the caller looks it up and passes it in.
    #[must_use]
    pub fn with_utc_offset(mut self, offset: UtcOffset) -> Self {
        self.utc_offset = offset;
        self
    }

    #[must_use]
    pub fn state(&self) -> DashboardState {
        self.state
    }

    /// Handle on the shared frame data.
    #[must_use]
    pub fn frame_state(&self) -> SharedFrameState {
        self.frame.clone()
    }

    #[must_use]
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// History of cluster CPU load, one sample per successful poll.
    #[must_use]
    pub fn cpu_graph(&self) -> &Graph {
        &self.cpu_graph
    }

    /// Run until cancelled, until the frame limit, or until a poll fails.
    pub fn run<T: TerminalSurface + ?Sized>(
        &mut self,
        surface: &mut T,
        stop: &StopSignal,
    ) -> Result<ExitReason, DashboardError> {
        if let Err(err) = self.config.validate() {
            self.state = DashboardState::Exiting;
            return Err(err.into());
        }
        tracing::info!(
            cluster_id = self.config.cluster_id,
            interval_ms = self.config.interval.as_millis() as u64,
            sort = ?self.config.sort,
            "dashboard started"
        );

        loop {
            if stop.is_stopped() {
                return Ok(self.exit(ExitReason::Cancelled));
            }

            self.state = DashboardState::Polling;
            if let Err(err) = self.poll_once() {
                self.state = DashboardState::Exiting;
                tracing::warn!(error = %err, "fetch failed, stopping");
                return Err(err.into());
            }

            self.state = DashboardState::Rendering;
            let now = self.now();
            if let Err(err) = self.render(surface, now) {
                self.state = DashboardState::Exiting;
                return Err(err.into());
            }
            if self
                .config
                .max_frames
                .is_some_and(|limit| self.frames_rendered >= limit)
            {
                return Ok(self.exit(ExitReason::FrameLimit));
            }

            self.state = DashboardState::Sleeping;
            if stop.wait_timeout(self.config.interval) {
                return Ok(self.exit(ExitReason::Cancelled));
            }
        }
    }

    /// Fetch one snapshot and publish it.
    ///
    /// Returns the new poll count. On failure the shared state is untouched.
    pub fn poll_once(&mut self) -> Result<u64, FetchError> {
        let snapshot = self.source.fetch_snapshot()?;
        self.cpu_graph.append_value(snapshot.cpu.busy());
        let hosts = snapshot.hosts.len();
        let processes = snapshot.process_count();
        let polls = self.frame.replace(snapshot);
        tracing::debug!(polls, hosts, processes, "snapshot polled");
        Ok(polls)
    }

    /// Draw one frame of the current shared state.
    pub fn render<T: TerminalSurface + ?Sized>(
        &mut self,
        surface: &mut T,
        now: OffsetDateTime,
    ) -> io::Result<()> {
        let size = surface.size_or_fallback();
        let data = self.frame.snapshot();
        let spinner = SPINNER[(self.frames_rendered % SPINNER.len() as u64) as usize];

        surface.cursor_home()?;
        let mut out = FrameWriter::new(surface, usize::from(size.rows));

        out.line(&self.header_line(&data, spinner, now))?;
        match &data.snapshot {
            Some(snapshot) => self.render_body(&mut out, snapshot, size.columns)?,
            None => out.centered(WAITING_TEXT, usize::from(size.columns))?,
        }
        out.finish(&self.footer_text(), self.palette.end(ColorRole::Title))?;

        self.frames_rendered += 1;
        tracing::trace!(
            frame = self.frames_rendered,
            columns = size.columns,
            rows = size.rows,
            "frame rendered"
        );
        Ok(())
    }

    fn render_body<T: TerminalSurface + ?Sized>(
        &mut self,
        out: &mut FrameWriter<'_, T>,
        snapshot: &Snapshot,
        columns: u16,
    ) -> io::Result<()> {
        for line in stat_lines(snapshot, self.config.human_readable) {
            out.line(&line)?;
        }

        let graph_rows = self.config.graph_height;
        if graph_rows > 0 && out.remaining() > usize::from(graph_rows) + 1 {
            self.cpu_graph.realize(columns, graph_rows + 1);
            for line in self.cpu_graph.printable_lines() {
                out.line(&line)?;
            }
        }

        if snapshot.process_count() == 0 {
            return out.centered(WAITING_TEXT, usize::from(columns));
        }
        let mut rows = filter_rows(snapshot.process_rows(), self.config.filter.as_deref());
        sort_rows(&mut rows, self.config.sort);
        rows.truncate(out.remaining().saturating_sub(1));

        let cells: Vec<[String; 10]> = rows
            .iter()
            .map(|row| row_cells(row, self.config.human_readable))
            .collect();
        let (header, body) = self.table.layout(&cells);
        out.line(&format!(
            "{}{}{}",
            self.palette.begin(ColorRole::Header),
            header,
            self.palette.end(ColorRole::Header)
        ))?;
        for line in body {
            out.line(&line)?;
        }
        Ok(())
    }

    fn header_line(&self, data: &FrameState, spinner: char, now: OffsetDateTime) -> String {
        let bold = self.palette.begin(ColorRole::TitleBold);
        let normal = self.palette.begin(ColorRole::Title);
        let end = self.palette.end(ColorRole::Title);
        let time = now.format(TIME_FORMAT).unwrap_or_default();

        let mut line = format!("{bold}{} {normal}{spinner} {time} ", self.config.title);
        if let Some(snapshot) = &data.snapshot {
            let name = if snapshot.cluster.cluster_name.is_empty() {
                self.config.cluster_name.as_str()
            } else {
                snapshot.cluster.cluster_name.as_str()
            };
            line.push_str(&format!("{name} - {} ", snapshot.cluster.status_text));
        }
        line.push_str(end);
        line
    }

    fn footer_text(&self) -> String {
        let bold = self.palette.begin(ColorRole::TitleBold);
        let normal = self.palette.begin(ColorRole::Title);
        format!("{normal} {bold}Q{normal}-Quit")
    }

    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.utc_offset)
    }

    fn exit(&mut self, reason: ExitReason) -> ExitReason {
        self.state = DashboardState::Exiting;
        tracing::info!(?reason, frames = self.frames_rendered, "dashboard stopped");
        reason
    }
}

/// CPU line and the two memory lines.
#[must_use]
pub fn stat_lines(snapshot: &Snapshot, human: bool) -> [String; 3] {
    let cpu = &snapshot.cpu;
    let mem = &snapshot.memory;
    let size = |bytes| bytes_to_human(bytes, human);
    [
        format!(
            "%Cpu(s): {:5.1} us, {:5.1} sy, {:5.1} id, {:5.1} wa, {:5.1} st",
            cpu.user, cpu.system, cpu.idle, cpu.iowait, cpu.steal
        ),
        format!(
            "Mem : {} total, {} used ({}), {} free, {} cache",
            size(mem.ram_total),
            size(mem.ram_used),
            percent(mem.ram_total, mem.ram_used),
            size(mem.ram_free),
            size(mem.ram_cache)
        ),
        format!(
            "Swap: {} total, {} used ({}), {} free",
            size(mem.swap_total),
            size(mem.swap_used),
            percent(mem.swap_total, mem.swap_used),
            size(mem.swap_free)
        ),
    ]
}

/// Stable in-place sort; equal keys keep their input order.
pub fn sort_rows(rows: &mut [ProcessRow], key: SortKey) {
    match key {
        SortKey::Cpu => rows.sort_by(|a, b| b.process.cpu_usage.total_cmp(&a.process.cpu_usage)),
        SortKey::Mem => rows.sort_by(|a, b| b.process.mem_usage.total_cmp(&a.process.mem_usage)),
        SortKey::Res => rows.sort_by(|a, b| b.process.res_mem.cmp(&a.process.res_mem)),
        SortKey::Pid => rows.sort_by_key(|row| row.process.pid),
    }
}

/// Keep rows whose command, user or host contains `needle`, ignoring case.
#[must_use]
pub fn filter_rows(rows: Vec<ProcessRow>, needle: Option<&str>) -> Vec<ProcessRow> {
    let Some(needle) = needle.map(str::to_lowercase).filter(|n| !n.is_empty()) else {
        return rows;
    };
    rows.into_iter()
        .filter(|row| {
            [&row.process.executable, &row.process.user, &row.host]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}

fn row_cells(row: &ProcessRow, human: bool) -> [String; 10] {
    let p = &row.process;
    [
        p.pid.to_string(),
        p.user.clone(),
        row.host.clone(),
        p.priority.to_string(),
        bytes_to_human(p.virt_mem, human),
        bytes_to_human(p.res_mem, human),
        p.state.clone(),
        format!("{:.2}", p.cpu_usage),
        format!("{:.2}", p.mem_usage),
        p.executable.clone(),
    ]
}

/// The ten process columns, re-measured every frame.
#[derive(Debug, Clone)]
struct ProcessTable {
    columns: [ColumnFormat; 10],
}

impl ProcessTable {
    fn new(palette: &Palette) -> Self {
        Self {
            columns: [
                ColumnFormat::new(),
                ColumnFormat::with_role(palette, ColorRole::User),
                ColumnFormat::with_role(palette, ColorRole::Host),
                ColumnFormat::new(),
                ColumnFormat::new().right_justified(),
                ColumnFormat::new().right_justified(),
                ColumnFormat::new(),
                ColumnFormat::new().right_justified(),
                ColumnFormat::new().right_justified(),
                ColumnFormat::with_role(palette, ColorRole::Command),
            ],
        }
    }

    /// Measure everything, then print the header and each row.
    fn layout(&mut self, rows: &[[String; 10]]) -> (String, Vec<String>) {
        for column in &mut self.columns {
            column.reset();
        }
        self.columns[1].widen(USER_MIN_WIDTH);
        for (column, header) in self.columns.iter_mut().zip(HEADERS) {
            column.widen(header);
        }
        for row in rows {
            for (column, cell) in self.columns.iter_mut().zip(row) {
                column.widen(cell);
            }
        }

        let header = self.print_row(&HEADERS.map(str::to_owned), false);
        let body = rows.iter().map(|row| self.print_row(row, true)).collect();
        (header, body)
    }

    fn print_row(&mut self, cells: &[String; 10], with_color: bool) -> String {
        let mut line = String::new();
        for (idx, (column, cell)) in self.columns.iter_mut().zip(cells).enumerate() {
            if idx > 0 {
                line.push(' ');
            }
            // Writing into a String cannot fail.
            let _ = column.print(&mut line, cell, with_color);
        }
        line
    }
}

/// Writes whole rows and keeps the last row free for the footer.
struct FrameWriter<'a, T: TerminalSurface + ?Sized> {
    surface: &'a mut T,
    rows: usize,
    line: usize,
}

impl<'a, T: TerminalSurface + ?Sized> FrameWriter<'a, T> {
    fn new(surface: &'a mut T, rows: usize) -> Self {
        Self {
            surface,
            rows,
            line: 0,
        }
    }

    /// Rows still available above the footer.
    fn remaining(&self) -> usize {
        self.rows.saturating_sub(1).saturating_sub(self.line)
    }

    /// Write one row; silently dropped once only the footer row is left.
    fn line(&mut self, text: &str) -> io::Result<()> {
        if self.remaining() == 0 {
            return Ok(());
        }
        self.surface.write_str(text)?;
        self.surface.clear_to_end_of_line()?;
        self.surface.next_line()?;
        self.line += 1;
        Ok(())
    }

    /// Write `text` centered in the middle of the screen.
    fn centered(&mut self, text: &str, columns: usize) -> io::Result<()> {
        while self.line < self.rows / 2 && self.remaining() > 1 {
            self.line("")?;
        }
        let indent = columns.saturating_sub(text.width()) / 2;
        self.line(&format!("{}{text}", " ".repeat(indent)))
    }

    /// Blank the rest, write `footer` on the last row and flush.
    fn finish(mut self, footer: &str, end: &str) -> io::Result<()> {
        if self.rows > 0 {
            while self.remaining() > 0 {
                self.line("")?;
            }
            self.surface.write_str(footer)?;
            self.surface.clear_to_end_of_line()?;
            self.surface.write_str(end)?;
        }
        self.surface.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::ProcessRecord;

    fn row(pid: i64, cpu: f64, host: &str, user: &str, exe: &str) -> ProcessRow {
        ProcessRow {
            host: host.into(),
            process: ProcessRecord {
                pid,
                cpu_usage: cpu,
                user: user.into(),
                executable: exe.into(),
                ..ProcessRecord::default()
            },
        }
    }

    fn pids(rows: &[ProcessRow]) -> Vec<i64> {
        rows.iter().map(|r| r.process.pid).collect()
    }

    #[test]
    fn cpu_sort_is_descending_and_stable() {
        let mut rows = vec![
            row(1, 5.0, "a", "u", "x"),
            row(2, 5.0, "a", "u", "x"),
            row(3, 9.0, "a", "u", "x"),
        ];
        sort_rows(&mut rows, SortKey::Cpu);
        assert_eq!(pids(&rows), vec![3, 1, 2]);
    }

    #[test]
    fn pid_sort_is_ascending() {
        let mut rows = vec![row(30, 0.0, "", "", ""), row(4, 0.0, "", "", ""), row(12, 0.0, "", "", "")];
        sort_rows(&mut rows, SortKey::Pid);
        assert_eq!(pids(&rows), vec![4, 12, 30]);
    }

    #[test]
    fn res_and_mem_sort_descending() {
        let mut rows = vec![row(1, 0.0, "", "", ""), row(2, 0.0, "", "", ""), row(3, 0.0, "", "", "")];
        rows[0].process.res_mem = 10;
        rows[1].process.res_mem = 30;
        rows[2].process.res_mem = 20;
        sort_rows(&mut rows, SortKey::Res);
        assert_eq!(pids(&rows), vec![2, 3, 1]);

        rows[0].process.mem_usage = 0.5;
        rows[1].process.mem_usage = 0.1;
        rows[2].process.mem_usage = 0.9;
        sort_rows(&mut rows, SortKey::Mem);
        assert_eq!(pids(&rows), vec![1, 2, 3]);
    }

    #[test]
    fn filter_matches_command_user_or_host_case_insensitively() {
        let rows = vec![
            row(1, 0.0, "db1", "mysql", "/usr/sbin/mysqld"),
            row(2, 0.0, "web1", "www-data", "nginx"),
            row(3, 0.0, "DB2", "root", "sshd"),
        ];
        assert_eq!(pids(&filter_rows(rows.clone(), Some("MYSQLD"))), vec![1]);
        assert_eq!(pids(&filter_rows(rows.clone(), Some("www"))), vec![2]);
        assert_eq!(pids(&filter_rows(rows.clone(), Some("db"))), vec![1, 3]);
        assert_eq!(pids(&filter_rows(rows.clone(), Some(""))), vec![1, 2, 3]);
        assert_eq!(pids(&filter_rows(rows, None)), vec![1, 2, 3]);
    }

    #[test]
    fn table_columns_align_and_seed_user_width() {
        let mut table = ProcessTable::new(&Palette::plain());
        let cells = vec![
            row_cells(&row(7, 1.5, "db1", "root", "sh"), true),
            row_cells(&row(12345, 10.25, "db10", "mysql", "mysqld"), true),
        ];
        let (header, body) = table.layout(&cells);
        assert!(header.starts_with("PID   USER       HOST PR"));
        assert_eq!(body.len(), 2);
        assert!(body[0].starts_with("7     root       db1  0 "));
        let widths: Vec<usize> = std::iter::once(&header).chain(&body).map(|l| l.width()).collect();
        assert!(widths.iter().all(|&w| w == widths[0]));
    }

    #[test]
    fn stat_lines_use_unit_helpers() {
        let mut snap = Snapshot::default();
        snap.cpu.user = 12.34;
        snap.cpu.idle = 80.0;
        snap.memory.ram_total = 2 * 1024 * 1024 * 1024;
        snap.memory.ram_used = 512 * 1024 * 1024;
        let [cpu, mem, swap] = stat_lines(&snap, true);
        assert_eq!(cpu, "%Cpu(s):  12.3 us,   0.0 sy,  80.0 id,   0.0 wa,   0.0 st");
        assert!(mem.starts_with("Mem : 2.0GB total, 512.0MB used (25.0%), "));
        assert!(swap.starts_with("Swap: 0.0MB total, 0.0MB used (0.0%), "));
    }
}
