//! Recursive parallel walk of one root
//!
//! Each directory is listed once; its files are collected and its
//! subdirectories are walked in parallel on the current rayon pool. Subtree
//! results are merged by value, so no collection is shared between workers.
//! A directory that cannot be listed is logged and contributes nothing.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use super::lister::{DirLister, DirListing};

/// Counters updated by walk workers
#[derive(Debug, Default)]
pub struct WalkStats {
    pub files: AtomicUsize,
    pub dirs_listed: AtomicUsize,
    pub dirs_skipped: AtomicUsize,
}

/// State shared by every worker walking one root
pub struct Walk<'a, L: DirLister> {
    pub lister: &'a L,
    pub root: &'a Path,
    pub boundaries: &'a BTreeSet<PathBuf>,
    pub max_depth: usize,
    pub stats: &'a WalkStats,
}

impl<'a, L: DirLister> Walk<'a, L> {
    /// Walk below an already listed root
    pub fn walk_root(&self, listing: DirListing) -> Vec<String> {
        self.stats.dirs_listed.fetch_add(1, Ordering::Relaxed);
        self.collect(listing, 0)
    }

    fn walk(&self, dir: &Path, depth: usize) -> Vec<String> {
        if depth > self.max_depth {
            self.stats.dirs_skipped.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                target: "pathdex::crawl",
                path = %dir.display(),
                category = "depth_limit",
                max_depth = self.max_depth,
                "directory skipped"
            );
            return Vec::new();
        }

        match self.lister.list(dir) {
            Ok(listing) => {
                self.stats.dirs_listed.fetch_add(1, Ordering::Relaxed);
                self.collect(listing, depth)
            }
            Err(err) => {
                self.stats.dirs_skipped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    target: "pathdex::crawl",
                    path = %err.path.display(),
                    category = %err.kind,
                    error = %err.source,
                    "directory skipped"
                );
                Vec::new()
            }
        }
    }

    fn collect(&self, listing: DirListing, depth: usize) -> Vec<String> {
        let DirListing { files, dirs } = listing;

        let mut found: Vec<String> = files
            .iter()
            .map(|f| f.to_string_lossy().into_owned())
            .collect();
        self.stats.files.fetch_add(found.len(), Ordering::Relaxed);

        found.par_extend(
            dirs.par_iter()
                .filter(|d| !self.is_boundary(d))
                .flat_map_iter(|d| self.walk(d, depth + 1)),
        );
        found
    }

    /// Another volume's mount point, reached from inside this root
    fn is_boundary(&self, dir: &Path) -> bool {
        let crossing = dir != self.root && self.boundaries.contains(dir);
        if crossing {
            tracing::debug!(
                target: "pathdex::crawl",
                path = %dir.display(),
                "mount boundary, not descending"
            );
        }
        crossing
    }
}
