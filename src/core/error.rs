//! Error taxonomy
//!
//! Crawl-level errors (`DirectoryAccessError`, `VolumeUnavailable`) never escape
//! the crawler; they are logged and counted. Persistence and usage errors are
//! surfaced to the caller.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Category of a failure while listing a single directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessErrorKind {
    PermissionDenied,
    PathTooLong,
    NotFound,
    Io,
    Other,
}

impl AccessErrorKind {
    /// Classify an I/O error raised while opening or reading a directory
    pub fn classify(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => AccessErrorKind::PermissionDenied,
            io::ErrorKind::NotFound => AccessErrorKind::NotFound,
            _ if is_name_too_long(err) => AccessErrorKind::PathTooLong,
            io::ErrorKind::Other => AccessErrorKind::Other,
            _ => AccessErrorKind::Io,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessErrorKind::PermissionDenied => "permission_denied",
            AccessErrorKind::PathTooLong => "path_too_long",
            AccessErrorKind::NotFound => "not_found",
            AccessErrorKind::Io => "io",
            AccessErrorKind::Other => "other",
        }
    }
}

impl fmt::Display for AccessErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ENAMETOOLONG / ERROR_FILENAME_EXCED_RANGE
fn is_name_too_long(err: &io::Error) -> bool {
    #[cfg(target_os = "linux")]
    const NAME_TOO_LONG: i32 = 36;
    #[cfg(any(
        target_os = "macos",
        target_os = "ios",
        target_os = "freebsd",
        target_os = "openbsd",
        target_os = "netbsd"
    ))]
    const NAME_TOO_LONG: i32 = 63;
    #[cfg(windows)]
    const NAME_TOO_LONG: i32 = 206;
    #[cfg(not(any(
        target_os = "linux",
        target_os = "macos",
        target_os = "ios",
        target_os = "freebsd",
        target_os = "openbsd",
        target_os = "netbsd",
        windows
    )))]
    const NAME_TOO_LONG: i32 = -1;

    err.raw_os_error() == Some(NAME_TOO_LONG)
}

/// A directory could not be listed; its subtree is excluded from the index
#[derive(Debug, Error)]
#[error("{kind} while listing {}: {source}", .path.display())]
pub struct DirectoryAccessError {
    pub path: PathBuf,
    pub kind: AccessErrorKind,
    #[source]
    pub source: io::Error,
}

impl DirectoryAccessError {
    pub fn new(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self {
            path: path.into(),
            kind: AccessErrorKind::classify(&source),
            source,
        }
    }
}

/// A volume root could not be opened; the volume is skipped
#[derive(Debug, Error)]
#[error("volume {} is unavailable: {source}", .root.display())]
pub struct VolumeUnavailable {
    pub root: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Loading or saving the snapshot failed
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to read index {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("index {} is corrupt: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("index {} has unsupported version {found} (expected {expected})", .path.display())]
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    #[error("failed to write index {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize index {}: {source}", .path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A search request that must not reach the match engine
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("Please enter a search term.")]
    EmptyQuery,

    #[error("no index is loaded; run startup first")]
    NotIndexed,
}

/// Invalid crawl configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("thread count must be at least 1")]
    ZeroThreads,

    #[error("max depth must be at least 1")]
    ZeroDepth,

    #[error("failed to build crawl thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_permission_denied() {
        let err = io::Error::from(io::ErrorKind::PermissionDenied);
        assert_eq!(
            AccessErrorKind::classify(&err),
            AccessErrorKind::PermissionDenied
        );
    }

    #[test]
    fn test_classify_not_found() {
        let err = io::Error::from(io::ErrorKind::NotFound);
        assert_eq!(AccessErrorKind::classify(&err), AccessErrorKind::NotFound);
    }

    #[test]
    fn test_classify_other_and_io() {
        let other = io::Error::new(io::ErrorKind::Other, "boom");
        assert_eq!(AccessErrorKind::classify(&other), AccessErrorKind::Other);

        let io_err = io::Error::from(io::ErrorKind::UnexpectedEof);
        assert_eq!(AccessErrorKind::classify(&io_err), AccessErrorKind::Io);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_classify_name_too_long() {
        let err = io::Error::from_raw_os_error(36);
        assert_eq!(AccessErrorKind::classify(&err), AccessErrorKind::PathTooLong);
    }

    #[test]
    fn test_directory_access_error_display() {
        let err = DirectoryAccessError::new(
            "/secret",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("permission_denied"));
        assert!(msg.contains("/secret"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_usage_error_message() {
        assert_eq!(UsageError::EmptyQuery.to_string(), "Please enter a search term.");
    }
}
