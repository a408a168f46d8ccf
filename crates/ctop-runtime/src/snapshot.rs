#![forbid(unsafe_code)]

//! Typed view of one polled cluster state.
//!
//! Every field carries `#[serde(default)]`, so a record with missing keys
//! still decodes: absent strings are empty, absent numbers are zero.
//! Scalar fields are also decoded with [`lenient`]: `null` or a value of the
//! wrong type resolves to the same default instead of rejecting the whole
//! snapshot. Numbers sent as strings are parsed. Unknown keys are ignored.
//!
//! Processes arrive grouped per host; [`Snapshot::process_rows`] flattens
//! them into [`ProcessRow`]s that carry the host name.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Cluster identity and health line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterStatus {
    #[serde(deserialize_with = "lenient")]
    pub cluster_id: i64,
    #[serde(deserialize_with = "lenient")]
    pub cluster_name: String,
    #[serde(deserialize_with = "lenient")]
    pub status_text: String,
}

/// Cluster-wide CPU split, in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuStats {
    #[serde(deserialize_with = "lenient")]
    pub user: f64,
    #[serde(deserialize_with = "lenient")]
    pub system: f64,
    #[serde(deserialize_with = "lenient")]
    pub idle: f64,
    #[serde(deserialize_with = "lenient")]
    pub iowait: f64,
    #[serde(deserialize_with = "lenient")]
    pub steal: f64,
}

impl CpuStats {
    /// Share of CPU time not spent idle, clamped to `0..=100`.
    #[must_use]
    pub fn busy(&self) -> f64 {
        (100.0 - self.idle).clamp(0.0, 100.0)
    }
}

/// Cluster-wide memory totals, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryStats {
    #[serde(deserialize_with = "lenient")]
    pub ram_total: u64,
    #[serde(deserialize_with = "lenient")]
    pub ram_used: u64,
    #[serde(deserialize_with = "lenient")]
    pub ram_free: u64,
    #[serde(deserialize_with = "lenient")]
    pub ram_cache: u64,
    #[serde(deserialize_with = "lenient")]
    pub swap_total: u64,
    #[serde(deserialize_with = "lenient")]
    pub swap_used: u64,
    #[serde(deserialize_with = "lenient")]
    pub swap_free: u64,
}

/// One process as reported by a host. Sizes are in bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessRecord {
    #[serde(deserialize_with = "lenient")]
    pub pid: i64,
    #[serde(deserialize_with = "lenient")]
    pub user: String,
    #[serde(deserialize_with = "lenient")]
    pub priority: i64,
    #[serde(deserialize_with = "lenient")]
    pub res_mem: u64,
    #[serde(deserialize_with = "lenient")]
    pub virt_mem: u64,
    #[serde(deserialize_with = "lenient")]
    pub state: String,
    #[serde(deserialize_with = "lenient")]
    pub cpu_usage: f64,
    #[serde(deserialize_with = "lenient")]
    pub mem_usage: f64,
    #[serde(deserialize_with = "lenient")]
    pub executable: String,
}

/// Processes of one host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostProcesses {
    #[serde(deserialize_with = "lenient")]
    pub hostname: String,
    pub processes: Vec<ProcessRecord>,
}

/// A flattened table row: a process plus the host it runs on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessRow {
    pub host: String,
    pub process: ProcessRecord,
}

/// Everything one poll returns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub cluster: ClusterStatus,
    pub cpu: CpuStats,
    pub memory: MemoryStats,
    pub hosts: Vec<HostProcesses>,
}

/// Decode a field, falling back to its default on `null` or a mistyped value.
///
/// A string holding a number is parsed for numeric fields, and a number or
/// boolean is rendered as text for string fields.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    if let Ok(parsed) = T::deserialize(&value) {
        return Ok(parsed);
    }
    let coerced = match &value {
        Value::String(text) => serde_json::from_str(text.trim()).ok(),
        Value::Number(_) | Value::Bool(_) => T::deserialize(Value::String(value.to_string())).ok(),
        _ => None,
    };
    Ok(coerced.unwrap_or_default())
}

impl Snapshot {
    /// Decode a snapshot from JSON text.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// All processes of all hosts, host order then process order.
    #[must_use]
    pub fn process_rows(&self) -> Vec<ProcessRow> {
        self.hosts
            .iter()
            .flat_map(|host| {
                host.processes.iter().map(move |process| ProcessRow {
                    host: host.hostname.clone(),
                    process: process.clone(),
                })
            })
            .collect()
    }

    /// Total number of processes across hosts.
    #[must_use]
    pub fn process_count(&self) -> usize {
        self.hosts.iter().map(|h| h.processes.len()).sum()
    }
}
