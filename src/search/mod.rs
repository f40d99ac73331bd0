//! Search module - substring lookups over a path snapshot
//!
//! Provides:
//! - matcher: case-insensitive containment with match spans

pub mod matcher;
