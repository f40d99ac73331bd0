//! Store module - Persists the path index
//!
//! Provides:
//! - snapshot: load/save of the versioned JSON snapshot

pub mod snapshot;
