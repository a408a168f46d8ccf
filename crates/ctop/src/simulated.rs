#![forbid(unsafe_code)]

//! A made-up cluster for running the dashboard without a controller.
//!
//! Load follows slow sine waves with a little xorshift noise on top, so the
//! table reorders and the CPU graph moves. The output is fully determined by
//! the seed.

use std::f64::consts::TAU;

use ctop_runtime::snapshot::{ClusterStatus, CpuStats, HostProcesses, MemoryStats, ProcessRecord, Snapshot};
use ctop_runtime::source::{FetchError, SnapshotSource};

const GIB: u64 = 1024 * 1024 * 1024;
const MIB: u64 = 1024 * 1024;

/// (user, executable, base cpu %, resident MiB, priority)
const WORKLOAD: [(&str, &str, f64, u64, i64); 8] = [
    ("mysql", "/usr/sbin/mysqld", 38.0, 6144, 20),
    ("root", "/usr/sbin/cmon", 6.0, 412, 20),
    ("haproxy", "/usr/sbin/haproxy", 4.5, 96, 20),
    ("prometheus", "/usr/local/bin/node_exporter", 1.2, 24, 20),
    ("root", "/usr/sbin/sshd -D", 0.1, 8, 20),
    ("root", "/lib/systemd/systemd-journald", 0.4, 64, 19),
    ("mysql", "/usr/bin/garbd", 0.8, 32, 20),
    ("root", "[kworker/u16:2]", 0.2, 0, 0),
];

/// Deterministic fake cluster implementing [`SnapshotSource`].
#[derive(Debug, Clone)]
pub struct SimulatedCluster {
    cluster_id: i64,
    cluster_name: String,
    hosts: Vec<String>,
    tick: u64,
    rng: XorShift,
}

impl SimulatedCluster {
    /// Three database hosts under `name`.
    pub fn new(cluster_id: i64, name: impl Into<String>) -> Self {
        Self::with_hosts(cluster_id, name, ["db1", "db2", "db3"])
    }

    pub fn with_hosts<I, H>(cluster_id: i64, name: impl Into<String>, hosts: I) -> Self
    where
        I: IntoIterator<Item = H>,
        H: Into<String>,
    {
        let mut name = name.into();
        if name.is_empty() {
            name = "simulated".into();
        }
        Self {
            cluster_id,
            cluster_name: name,
            hosts: hosts.into_iter().map(Into::into).collect(),
            tick: 0,
            rng: XorShift::new(0x9e37_79b9_7f4a_7c15 ^ cluster_id as u64),
        }
    }

    /// Polls served so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    fn wave(&self, period: f64, phase: f64) -> f64 {
        (TAU * self.tick as f64 / period + phase).sin()
    }

    fn cpu(&mut self) -> CpuStats {
        let user = (30.0 + 20.0 * self.wave(40.0, 0.0) + self.rng.jitter(3.0)).clamp(0.0, 90.0);
        let system = (8.0 + 3.0 * self.wave(17.0, 1.0) + self.rng.jitter(1.0)).clamp(0.0, 20.0);
        let iowait = (2.0 + 2.0 * self.wave(23.0, 2.0)).max(0.0);
        let steal = 0.3;
        CpuStats {
            user,
            system,
            iowait,
            steal,
            idle: (100.0 - user - system - iowait - steal).max(0.0),
        }
    }

    fn memory(&mut self) -> MemoryStats {
        let ram_total = 64 * GIB * self.hosts.len().max(1) as u64;
        let used_share = 0.55 + 0.1 * self.wave(90.0, 0.5);
        let ram_used = (ram_total as f64 * used_share) as u64;
        let ram_cache = ram_total / 5;
        let swap_total = 4 * GIB * self.hosts.len().max(1) as u64;
        let swap_used = (self.rng.unit() * 64.0) as u64 * MIB;
        MemoryStats {
            ram_total,
            ram_used,
            ram_free: ram_total.saturating_sub(ram_used + ram_cache),
            ram_cache,
            swap_total,
            swap_used,
            swap_free: swap_total.saturating_sub(swap_used),
        }
    }

    fn processes(&mut self, host_idx: usize) -> Vec<ProcessRecord> {
        let mut out = Vec::with_capacity(WORKLOAD.len());
        for (idx, (user, exe, base_cpu, res_mib, priority)) in WORKLOAD.iter().enumerate() {
            let pid = 1000 + (host_idx as i64) * 7919 + (idx as i64) * 131;
            let swing = 1.0 + 0.6 * self.wave(30.0 + idx as f64 * 7.0, host_idx as f64 + idx as f64);
            let cpu_usage = (base_cpu * swing + self.rng.jitter(base_cpu * 0.1)).max(0.0);
            let res_mem = res_mib * MIB;
            out.push(ProcessRecord {
                pid,
                user: (*user).to_owned(),
                priority: *priority,
                res_mem,
                virt_mem: res_mem * 3 + 128 * MIB,
                state: if cpu_usage > 5.0 { "R" } else { "S" }.to_owned(),
                cpu_usage: (cpu_usage * 100.0).round() / 100.0,
                mem_usage: (res_mem as f64 / (64 * GIB) as f64 * 10_000.0).round() / 100.0,
                executable: (*exe).to_owned(),
            });
        }
        out
    }
}

impl SnapshotSource for SimulatedCluster {
    fn fetch_snapshot(&mut self) -> Result<Snapshot, FetchError> {
        self.tick += 1;
        let cpu = self.cpu();
        let memory = self.memory();
        let hosts = (0..self.hosts.len())
            .map(|idx| HostProcesses {
                hostname: self.hosts[idx].clone(),
                processes: self.processes(idx),
            })
            .collect();
        Ok(Snapshot {
            cluster: ClusterStatus {
                cluster_id: self.cluster_id,
                cluster_name: self.cluster_name.clone(),
                status_text: "All nodes are operational.".into(),
            },
            cpu,
            memory,
            hosts,
        })
    }
}

/// xorshift64; good enough for jitter, never for anything else.
#[derive(Debug, Clone)]
struct XorShift(u64);

impl XorShift {
    fn new(seed: u64) -> Self {
        Self(if seed == 0 { 0x2545_f491_4f6c_dd1d } else { seed })
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Uniform in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform in `[-amplitude, amplitude)`.
    fn jitter(&mut self, amplitude: f64) -> f64 {
        (self.unit() * 2.0 - 1.0) * amplitude
    }
}
