//! Crawl module - Builds the path index from storage volumes
//!
//! Provides:
//! - lister: typed single-directory listing
//! - volumes: ready-volume discovery and mount boundaries
//! - walker: bounded parallel recursive walk
//!
//! Failures inside a crawl (unavailable volumes, unreadable directories) are
//! logged and counted, never returned.

pub mod lister;
pub mod volumes;
pub mod walker;

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use crate::core::config::Config;
use crate::core::error::{ConfigError, VolumeUnavailable};
use crate::core::model::PathStore;
use lister::{DirLister, FsLister};
use walker::{Walk, WalkStats};

/// Worker stack size; recursion depth is bounded by `max_depth`
const WORKER_STACK_SIZE: usize = 8 * 1024 * 1024;

/// Summary of one crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Roots that were walked
    pub roots: Vec<PathBuf>,
    pub roots_skipped: usize,
    pub files: usize,
    pub dirs_listed: usize,
    pub dirs_skipped: usize,
    pub elapsed: Duration,
}

/// Walks every configured root (or every ready volume) into a `PathStore`
pub struct Crawler<L: DirLister = FsLister> {
    lister: L,
    roots: Vec<PathBuf>,
    boundaries: BTreeSet<PathBuf>,
    max_depth: usize,
    pool: rayon::ThreadPool,
}

impl Crawler<FsLister> {
    /// Crawler over the real filesystem
    ///
    /// Without configured roots, every ready volume on the host is crawled.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let table = volumes::mount_table();
        let (roots, boundaries) = if config.roots.is_empty() {
            for volume in &table.volumes {
                tracing::debug!(
                    target: "pathdex::crawl",
                    root = %volume.root.display(),
                    fs_type = volume.fs_type.as_deref().unwrap_or("unknown"),
                    "volume ready"
                );
            }
            (table.roots(), table.boundaries_for(None))
        } else {
            let roots = absolute_roots(&config.roots);
            let boundaries = table.boundaries_for(Some(&roots));
            (roots, boundaries)
        };
        Ok(Self::with_lister(FsLister, roots, config)?.with_boundaries(boundaries))
    }
}

/// Resolve configured roots against the working directory
///
/// A root that cannot be resolved is skipped like an unavailable volume.
pub fn absolute_roots(roots: &[PathBuf]) -> Vec<PathBuf> {
    roots
        .iter()
        .filter_map(|root| match std::path::absolute(root) {
            Ok(absolute) => Some(absolute),
            Err(source) => {
                let err = VolumeUnavailable {
                    root: root.clone(),
                    source,
                };
                tracing::warn!(
                    target: "pathdex::crawl",
                    root = %err.root.display(),
                    error = %err.source,
                    "volume unavailable, skipped"
                );
                None
            }
        })
        .collect()
}

impl<L: DirLister> Crawler<L> {
    pub fn with_lister(lister: L, roots: Vec<PathBuf>, config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.effective_threads())
            .stack_size(WORKER_STACK_SIZE)
            .thread_name(|i| format!("pathdex-crawl-{i}"))
            .build()?;

        Ok(Self {
            lister,
            roots,
            boundaries: BTreeSet::new(),
            max_depth: config.max_depth,
            pool,
        })
    }

    /// Roots this crawler starts from, walked or not
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Mount points the walk must not cross into
    pub fn with_boundaries(mut self, boundaries: BTreeSet<PathBuf>) -> Self {
        self.boundaries = boundaries;
        self
    }

    /// Run a full crawl
    ///
    /// Always completes; unreadable roots and directories are skipped.
    pub fn run(&self) -> (PathStore, CrawlReport) {
        let started = Instant::now();
        let stats = WalkStats::default();
        let mut report = CrawlReport::default();
        let mut paths = Vec::new();

        for root in &self.roots {
            let listing = match self.lister.list(root) {
                Ok(listing) => listing,
                Err(err) => {
                    let err = VolumeUnavailable {
                        root: root.clone(),
                        source: err.source,
                    };
                    tracing::warn!(
                        target: "pathdex::crawl",
                        root = %err.root.display(),
                        error = %err.source,
                        "volume unavailable, skipped"
                    );
                    report.roots_skipped += 1;
                    continue;
                }
            };

            tracing::info!(target: "pathdex::crawl", root = %root.display(), "crawling volume");
            let walk = Walk {
                lister: &self.lister,
                root,
                boundaries: &self.boundaries,
                max_depth: self.max_depth,
                stats: &stats,
            };
            paths.extend(self.pool.install(|| walk.walk_root(listing)));
            report.roots.push(root.clone());
        }

        report.files = stats.files.load(Ordering::Relaxed);
        report.dirs_listed = stats.dirs_listed.load(Ordering::Relaxed);
        report.dirs_skipped = stats.dirs_skipped.load(Ordering::Relaxed);
        report.elapsed = started.elapsed();

        tracing::info!(
            target: "pathdex::crawl",
            files = report.files,
            dirs_listed = report.dirs_listed,
            dirs_skipped = report.dirs_skipped,
            roots_skipped = report.roots_skipped,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "crawl finished"
        );

        (PathStore::from(paths), report)
    }
}
