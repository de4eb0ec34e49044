//! Error types for scanning and navigation.
//!
//! Per-path failures ([`ProbeError`]) are always recovered locally as a zero
//! contribution. Only [`SessionError`] terminates a scan session, and
//! [`NavError`] reports misuse of the explorer API.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to stat or enumerate a single path.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("access denied: {0}")]
    AccessDenied(PathBuf),
    #[error("not found: {0}")]
    NotFound(PathBuf),
    #[error("I/O error on {path}: {source}")]
    Transient {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ProbeError {
    /// Classifies an I/O error raised while touching `path`.
    pub fn from_io(path: impl Into<PathBuf>, err: io::Error) -> Self {
        let path = path.into();
        match err.kind() {
            io::ErrorKind::PermissionDenied => ProbeError::AccessDenied(path),
            io::ErrorKind::NotFound => ProbeError::NotFound(path),
            _ => ProbeError::Transient { path, source: err },
        }
    }
}

/// A failure that ends a scan session with an error instead of a report.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("cannot read {path}: {source}")]
    RootUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("scan worker failed: {0}")]
    Worker(String),
}

/// Misuse of the drill-down API.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavError {
    #[error("no root scan has completed")]
    NoRoot,
    #[error("a root scan is already in progress")]
    RootScanInProgress,
    #[error("node is not visible on the current drill path: {0}")]
    UnknownNode(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_error_classification() {
        let denied = ProbeError::from_io("/x", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(denied, ProbeError::AccessDenied(_)));

        let missing = ProbeError::from_io("/x", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(missing, ProbeError::NotFound(_)));

        let other = ProbeError::from_io("/x", io::Error::other("flaky"));
        assert!(matches!(other, ProbeError::Transient { .. }));
    }

    #[test]
    fn test_session_error_display() {
        let err = SessionError::NotADirectory(PathBuf::from("/etc/hosts"));
        assert_eq!(err.to_string(), "not a directory: /etc/hosts");
    }
}
