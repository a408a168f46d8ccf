#![forbid(unsafe_code)]

//! The fetch collaborator.
//!
//! A [`SnapshotSource`] is asked for one [`Snapshot`] per poll. The call
//! blocks; any timeout is the source's own business and surfaces as
//! [`FetchErrorKind::Timeout`]. The dashboard does not retry.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::snapshot::Snapshot;

/// Broad class of a fetch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    /// The backend could not be reached or refused the request.
    Unavailable,
    /// The backend did not answer in time.
    Timeout,
    /// The answer could not be decoded.
    Malformed,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unavailable => "unavailable",
            Self::Timeout => "timed out",
            Self::Malformed => "malformed reply",
        })
    }
}

/// A failed fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FetchErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Unavailable, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Timeout, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Malformed, message)
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fetch {}: {}", self.kind, self.message)
    }
}

impl std::error::Error for FetchError {}

impl From<io::Error> for FetchError {
    fn from(err: io::Error) -> Self {
        let kind = match err.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => FetchErrorKind::Timeout,
            io::ErrorKind::InvalidData => FetchErrorKind::Malformed,
            _ => FetchErrorKind::Unavailable,
        };
        Self::new(kind, err.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::malformed(err.to_string())
    }
}

/// Produces one snapshot per poll.
pub trait SnapshotSource {
    fn fetch_snapshot(&mut self) -> Result<Snapshot, FetchError>;
}

impl<F> SnapshotSource for F
where
    F: FnMut() -> Result<Snapshot, FetchError>,
{
    fn fetch_snapshot(&mut self) -> Result<Snapshot, FetchError> {
        self()
    }
}

/// Re-reads a JSON snapshot file on every poll.
///
/// Whatever writes the file owns its freshness; a missing file or invalid
/// JSON is a fetch failure like any other.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotSource for JsonFileSource {
    fn fetch_snapshot(&mut self) -> Result<Snapshot, FetchError> {
        let text = std::fs::read_to_string(&self.path).map_err(|err| {
            let mut fetch = FetchError::from(err);
            fetch.message = format!("{}: {}", self.path.display(), fetch.message);
            fetch
        })?;
        let snapshot = Snapshot::from_json(&text).map_err(|err| {
            FetchError::malformed(format!("{}: {err}", self.path.display()))
        })?;
        tracing::trace!(
            path = %self.path.display(),
            hosts = snapshot.hosts.len(),
            processes = snapshot.process_count(),
            "snapshot file read"
        );
        Ok(snapshot)
    }
}
