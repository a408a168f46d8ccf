#![forbid(unsafe_code)]

//! Dashboard options.
//!
//! [`DashboardConfig`] is built explicitly and handed to the dashboard; there
//! is no global instance. Defaults can be overridden from `CLUSTERTOP_*`
//! environment variables through [`DashboardConfig::from_env`], or from any
//! key lookup with [`DashboardConfig::from_lookup`] (tests use a map).

use std::env;
use std::fmt;
use std::time::Duration;

use ctop_widgets::series::AggregateKind;

/// Prefix of every recognised environment variable.
pub const ENV_PREFIX: &str = "CLUSTERTOP_";

/// Summary of the recognised variables, printed on configuration errors.
pub const ENV_HELP: &str = "\
ENVIRONMENT VARIABLES:
    CLUSTERTOP_CLUSTER_ID       Cluster to monitor, must be > 0 (default: 1)
    CLUSTERTOP_CLUSTER_NAME     Cluster name shown in the header
    CLUSTERTOP_INTERVAL         Seconds between polls, > 0 (default: 1)
    CLUSTERTOP_COLOR            0/1, syntax highlighting (default: 1; NO_COLOR disables)
    CLUSTERTOP_HUMAN            0/1, human-readable sizes (default: 1)
    CLUSTERTOP_SORT             cpu | mem | res | pid (default: cpu)
    CLUSTERTOP_FILTER           Show only rows whose command, user or host contains this
    CLUSTERTOP_GRAPH_HEIGHT     Rows for the CPU history graph, 0 hides it (default: 0)
    CLUSTERTOP_GRAPH_AGGREGATE  max | min | avg (default: avg)
    CLUSTERTOP_MAX_FRAMES       Quit after this many frames (default: unlimited)
    CLUSTERTOP_TITLE            Title in the header line
    CLUSTERTOP_SNAPSHOT_FILE    Read snapshots from this JSON file
    CLUSTERTOP_LOG_FILE         Write logs to this file
    CLUSTERTOP_LOG              Log filter (default: info)";

/// Row ordering of the process table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    /// CPU usage, highest first.
    #[default]
    Cpu,
    /// Memory share, highest first.
    Mem,
    /// Resident size, largest first.
    Res,
    /// Process id, ascending.
    Pid,
}

impl SortKey {
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "cpu" => Some(Self::Cpu),
            "mem" | "memory" => Some(Self::Mem),
            "res" | "rss" => Some(Self::Res),
            "pid" => Some(Self::Pid),
            _ => None,
        }
    }
}

/// Invalid configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but its value does not parse.
    InvalidValue { key: String, value: String },
    /// The cluster id is zero or negative.
    InvalidClusterId(i64),
    /// The refresh interval is zero.
    ZeroInterval,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { key, value } => write!(f, "invalid value for {key}: {value:?}"),
            Self::InvalidClusterId(id) => write!(f, "the cluster id {id} is invalid, it must be positive"),
            Self::ZeroInterval => write!(f, "the refresh interval must be greater than zero"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Everything the dashboard needs to know up front.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub cluster_id: i64,
    pub cluster_name: String,
    /// Sleep between the end of one frame and the next poll.
    pub interval: Duration,
    pub syntax_highlight: bool,
    pub human_readable: bool,
    pub sort: SortKey,
    /// Case-insensitive substring; `None` shows every row.
    pub filter: Option<String>,
    /// Plot rows of the CPU graph; 0 hides it.
    pub graph_height: u16,
    pub graph_aggregate: AggregateKind,
    /// Stop cleanly after this many rendered frames.
    pub max_frames: Option<u64>,
    pub title: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            cluster_id: 1,
            cluster_name: String::new(),
            interval: Duration::from_secs(1),
            syntax_highlight: true,
            human_readable: true,
            sort: SortKey::Cpu,
            filter: None,
            graph_height: 0,
            graph_aggregate: AggregateKind::Average,
            max_frames: None,
            title: "CLUSTER TOP".into(),
        }
    }
}

impl DashboardConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::from_lookup(|key| env::var(key).ok())?;
        if env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
            config.syntax_highlight = false;
        }
        Ok(config)
    }

    /// Defaults overridden by `lookup`, which receives full variable names
    /// such as `CLUSTERTOP_INTERVAL`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            let key = format!("{ENV_PREFIX}{name}");
            lookup(&key)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
                .map(|v| (key, v))
        };
        let mut config = Self::default();

        if let Some((key, val)) = get("CLUSTER_ID") {
            config.cluster_id = parse_value(&key, &val)?;
        }
        if let Some((_, val)) = get("CLUSTER_NAME") {
            config.cluster_name = val;
        }
        if let Some((key, val)) = get("INTERVAL") {
            let secs: f64 = parse_value(&key, &val)?;
            config.interval = Duration::try_from_secs_f64(secs).map_err(|_| invalid(&key, &val))?;
        }
        if let Some((key, val)) = get("COLOR") {
            config.syntax_highlight = parse_flag(&key, &val)?;
        }
        if let Some((key, val)) = get("HUMAN") {
            config.human_readable = parse_flag(&key, &val)?;
        }
        if let Some((key, val)) = get("SORT") {
            config.sort = SortKey::parse(&val).ok_or_else(|| invalid(&key, &val))?;
        }
        if let Some((_, val)) = get("FILTER") {
            config.filter = Some(val);
        }
        if let Some((key, val)) = get("GRAPH_HEIGHT") {
            config.graph_height = parse_value(&key, &val)?;
        }
        if let Some((key, val)) = get("GRAPH_AGGREGATE") {
            config.graph_aggregate = AggregateKind::parse(&val).ok_or_else(|| invalid(&key, &val))?;
        }
        if let Some((key, val)) = get("MAX_FRAMES") {
            config.max_frames = Some(parse_value(&key, &val)?);
        }
        if let Some((_, val)) = get("TITLE") {
            config.title = val;
        }

        Ok(config)
    }

    /// Reject settings the loop cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cluster_id <= 0 {
            return Err(ConfigError::InvalidClusterId(self.cluster_id));
        }
        if self.interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_owned(),
        value: value.to_owned(),
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| invalid(key, value))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}
