#![forbid(unsafe_code)]

//! Errors that end a dashboard run.

use std::fmt;
use std::io;

use crate::config::ConfigError;
use crate::source::FetchError;

/// Why [`Dashboard::run`](crate::dashboard::Dashboard::run) gave up.
#[derive(Debug)]
pub enum DashboardError {
    /// The snapshot source failed; the loop does not retry.
    Fetch(FetchError),
    /// Writing to the terminal failed.
    Terminal(io::Error),
    /// The configuration was rejected before the loop started.
    Config(ConfigError),
}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(e) => write!(f, "{e}"),
            Self::Terminal(e) => write!(f, "terminal error: {e}"),
            Self::Config(e) => write!(f, "configuration error: {e}"),
        }
    }
}

impl std::error::Error for DashboardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fetch(e) => Some(e),
            Self::Terminal(e) => Some(e),
            Self::Config(e) => Some(e),
        }
    }
}

impl From<FetchError> for DashboardError {
    fn from(e: FetchError) -> Self {
        Self::Fetch(e)
    }
}

impl From<io::Error> for DashboardError {
    fn from(e: io::Error) -> Self {
        Self::Terminal(e)
    }
}

impl From<ConfigError> for DashboardError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
