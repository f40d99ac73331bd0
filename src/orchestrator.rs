//! Orchestrator - startup (load or crawl + save) and query handling

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::core::config::Config;
use crate::core::error::UsageError;
use crate::core::model::{PathStore, ResultRecord};
use crate::crawl::{self, CrawlReport, Crawler};
use crate::search::matcher;
use crate::store::snapshot;

/// Where the active index came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSource {
    Loaded,
    Crawled,
}

/// Completion notice for an indexing run
#[derive(Debug, Clone)]
pub struct StartupReport {
    pub source: IndexSource,
    pub files: usize,
    pub elapsed: Duration,
    pub crawl: Option<CrawlReport>,
    /// A loaded snapshot was built from other roots than the configured ones
    pub roots_changed: bool,
}

impl StartupReport {
    pub fn summary(&self) -> String {
        format!(
            "Indexing completed in {:.3} seconds.\nTotal files indexed: {}",
            self.elapsed.as_secs_f64(),
            self.files
        )
    }
}

/// Owns the configuration and the current index snapshot
pub struct Orchestrator {
    config: Config,
    store: Option<PathStore>,
}

impl Orchestrator {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            store: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    #[allow(dead_code)]
    pub fn store(&self) -> Option<&PathStore> {
        self.store.as_ref()
    }

    /// Load the persisted index, or crawl and persist a new one
    pub fn startup(&mut self) -> Result<StartupReport> {
        let started = Instant::now();
        let location = &self.config.index_location;

        let loaded = snapshot::load(location)
            .with_context(|| format!("Failed to load index from {}", location.display()))?;

        match loaded {
            Some(loaded) => {
                let roots_changed = self.roots_changed(loaded.roots.as_deref());
                if roots_changed {
                    tracing::warn!(
                        index = %location.display(),
                        "index was built from different roots; run `pathdex index --force` to rebuild"
                    );
                }
                let report = StartupReport {
                    source: IndexSource::Loaded,
                    files: loaded.store.len(),
                    elapsed: started.elapsed(),
                    crawl: None,
                    roots_changed,
                };
                self.store = Some(loaded.store);
                Ok(report)
            }
            None => self.crawl_and_save(started),
        }
    }

    /// Crawl and persist unconditionally, replacing the current index
    pub fn reindex(&mut self) -> Result<StartupReport> {
        self.crawl_and_save(Instant::now())
    }

    fn crawl_and_save(&mut self, started: Instant) -> Result<StartupReport> {
        let crawler = Crawler::from_config(&self.config).context("Invalid crawl configuration")?;
        let (store, crawl) = crawler.run();
        if store.is_empty() {
            tracing::warn!(roots = crawl.roots.len(), "crawl found no files");
        }

        let location = &self.config.index_location;
        snapshot::save(&store, location, crawler.roots())
            .with_context(|| format!("Failed to save index to {}", location.display()))?;

        let report = StartupReport {
            source: IndexSource::Crawled,
            files: store.len(),
            elapsed: started.elapsed(),
            crawl: Some(crawl),
            roots_changed: false,
        };
        self.store = Some(store);
        Ok(report)
    }

    /// Explicit roots that differ from the ones a snapshot recorded
    ///
    /// Legacy snapshots and crawls of every volume are never flagged.
    fn roots_changed(&self, recorded: Option<&[PathBuf]>) -> bool {
        let Some(recorded) = recorded else {
            return false;
        };
        if self.config.roots.is_empty() {
            return false;
        }
        let configured: BTreeSet<PathBuf> =
            crawl::absolute_roots(&self.config.roots).into_iter().collect();
        let recorded: BTreeSet<PathBuf> = recorded.iter().cloned().collect();
        configured != recorded
    }

    /// Run a query against the loaded index
    ///
    /// Empty or whitespace-only queries are rejected before any matching.
    pub fn search(&self, query: &str) -> Result<Vec<ResultRecord>, UsageError> {
        if query.trim().is_empty() {
            return Err(UsageError::EmptyQuery);
        }
        let store = self.store.as_ref().ok_or(UsageError::NotIndexed)?;

        let results = matcher::search(store.paths(), query);
        tracing::debug!(query, matches = results.len(), "search finished");
        Ok(results.iter().map(ResultRecord::from).collect())
    }
}
