//! Property-based invariant tests for frame composition.
//!
//! 1. A frame has exactly one line per terminal row, whatever the data.
//! 2. The footer is always on the last row.
//! 3. Sorting is stable for every key.
//! 4. Table rows of one frame share the same visible width.

use ctop_core::palette::visible_width;
use ctop_core::surface::CaptureSurface;
use ctop_runtime::dashboard::sort_rows;
use ctop_runtime::{
    Dashboard, DashboardConfig, FetchError, HostProcesses, ProcessRecord, ProcessRow, Snapshot, SortKey,
};
use proptest::prelude::*;
use time::OffsetDateTime;
use time::macros::datetime;

const NOW: OffsetDateTime = datetime!(2026-01-01 00:00:00 UTC);

// ── Helpers ─────────────────────────────────────────────────────────────

fn record_strategy() -> impl Strategy<Value = ProcessRecord> {
    (
        1i64..100_000,
        "[a-z]{1,12}",
        0u64..(1 << 40),
        0.0f64..400.0,
        "[a-z/]{1,30}",
    )
        .prop_map(|(pid, user, res, cpu, exe)| ProcessRecord {
            pid,
            user,
            res_mem: res,
            virt_mem: res * 2,
            cpu_usage: (cpu * 4.0).round() / 4.0,
            state: "R".into(),
            executable: exe,
            ..ProcessRecord::default()
        })
}

fn snapshot_strategy() -> impl Strategy<Value = Snapshot> {
    prop::collection::vec(("[a-z0-9]{1,10}", prop::collection::vec(record_strategy(), 0..20)), 0..4).prop_map(
        |hosts| Snapshot {
            hosts: hosts
                .into_iter()
                .map(|(hostname, processes)| HostProcesses { hostname, processes })
                .collect(),
            ..Snapshot::default()
        },
    )
}

fn sort_key_strategy() -> impl Strategy<Value = SortKey> {
    prop_oneof![Just(SortKey::Cpu), Just(SortKey::Mem), Just(SortKey::Res), Just(SortKey::Pid)]
}

fn render(snapshot: Snapshot, columns: u16, rows: u16, color: bool, graph_height: u16) -> Vec<String> {
    let config = DashboardConfig {
        syntax_highlight: color,
        graph_height,
        ..DashboardConfig::default()
    };
    let source = move || -> Result<Snapshot, FetchError> { Ok(snapshot.clone()) };
    let mut dashboard = Dashboard::new(&config, source);
    let mut surface = CaptureSurface::new(columns, rows);
    dashboard.poll_once().expect("scripted source never fails");
    dashboard.render(&mut surface, NOW).expect("capture never fails");
    surface.last_frame()
}

// ═════════════════════════════════════════════════════════════════════════
// 1-2. Frame height and footer
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn frame_fills_terminal_exactly(
        snapshot in snapshot_strategy(),
        columns in 0u16..200,
        rows in 1u16..60,
        color in any::<bool>(),
        graph_height in 0u16..8,
    ) {
        let frame = render(snapshot, columns, rows, color, graph_height);
        prop_assert_eq!(frame.len(), usize::from(rows));
        let last = frame.last().map(String::as_str).unwrap_or_default();
        prop_assert!(visible_width(last) > 0);
        prop_assert!(ctop_core::palette::strip_ansi(last).ends_with("Q-Quit"));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Stable sort
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn sort_is_stable(
        records in prop::collection::vec(record_strategy(), 0..60),
        key in sort_key_strategy(),
    ) {
        let mut rows: Vec<ProcessRow> = records
            .into_iter()
            .enumerate()
            .map(|(idx, process)| ProcessRow { host: idx.to_string(), process })
            .collect();
        sort_rows(&mut rows, key);
        for pair in rows.windows(2) {
            let (a, b) = (&pair[0].process, &pair[1].process);
            let equal = match key {
                SortKey::Cpu => a.cpu_usage == b.cpu_usage,
                SortKey::Mem => a.mem_usage == b.mem_usage,
                SortKey::Res => a.res_mem == b.res_mem,
                SortKey::Pid => a.pid == b.pid,
            };
            if equal {
                let ia: usize = pair[0].host.parse().unwrap();
                let ib: usize = pair[1].host.parse().unwrap();
                prop_assert!(ia < ib, "equal keys reordered");
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Table alignment
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn table_rows_share_width(snapshot in snapshot_strategy(), color in any::<bool>()) {
        let frame = render(snapshot, 400, 200, color, 0);
        let Some(start) = frame.iter().position(|l| ctop_core::palette::strip_ansi(l).starts_with("PID")) else {
            return Ok(());
        };
        let widths: Vec<usize> = frame[start..frame.len() - 1]
            .iter()
            .filter(|l| !l.is_empty())
            .map(|l| visible_width(l))
            .collect();
        prop_assert!(widths.windows(2).all(|w| w[0] == w[1]), "widths differ: {:?}", widths);
    }
}
