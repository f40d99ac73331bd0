//! Core module - Contains the fundamental data structures and utilities
//!
//! This module provides:
//! - Index and result model (PathStore, ResultRecord)
//! - Typed errors for crawling, persistence and usage
//! - Runtime configuration
//! - Rendering functions for different output formats

pub mod config;
pub mod error;
pub mod model;
pub mod render;
