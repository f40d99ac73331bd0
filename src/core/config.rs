//! Runtime configuration

use std::path::PathBuf;

use crate::core::error::ConfigError;

/// Snapshot file name used when no index location is configured
pub const DEFAULT_INDEX_FILE: &str = "file_index.json";

/// Recursion cap for the crawler
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Upper bound for the default crawl worker count
pub const MAX_DEFAULT_THREADS: usize = 16;

/// Configuration passed into the orchestrator
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the persisted snapshot
    pub index_location: PathBuf,

    /// Crawl these roots instead of every ready volume (empty = all volumes)
    pub roots: Vec<PathBuf>,

    /// Maximum directory depth below a root
    pub max_depth: usize,

    /// Crawl worker count (None = available parallelism, capped)
    pub threads: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index_location: PathBuf::from(DEFAULT_INDEX_FILE),
            roots: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            threads: None,
        }
    }
}

impl Config {
    #[allow(dead_code)]
    pub fn with_index_location(mut self, location: impl Into<PathBuf>) -> Self {
        self.index_location = location.into();
        self
    }

    #[allow(dead_code)]
    pub fn with_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.roots = roots;
        self
    }

    /// Reject values the crawler cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threads == Some(0) {
            return Err(ConfigError::ZeroThreads);
        }
        if self.max_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        Ok(())
    }

    /// Worker count the crawl pool will actually use
    pub fn effective_threads(&self) -> usize {
        self.threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
                .min(MAX_DEFAULT_THREADS)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.index_location, PathBuf::from("file_index.json"));
        assert!(config.roots.is_empty());
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_threads_rejected() {
        let config = Config {
            threads: Some(0),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroThreads)));
    }

    #[test]
    fn test_zero_depth_rejected() {
        let config = Config {
            max_depth: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroDepth)));
    }

    #[test]
    fn test_effective_threads() {
        let config = Config {
            threads: Some(3),
            ..Default::default()
        };
        assert_eq!(config.effective_threads(), 3);

        let auto = Config::default().effective_threads();
        assert!((1..=MAX_DEFAULT_THREADS).contains(&auto));
    }
}
