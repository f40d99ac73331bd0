//! Case-insensitive substring matching
//!
//! Comparison is ordinal: two characters match when they are equal or when
//! their one-to-one lowercase mappings are equal. Characters whose lowercase
//! form expands to several characters compare as themselves, which keeps a
//! 1:1 mapping between folded and original positions.

use rayon::prelude::*;

use crate::core::model::{MatchSpan, SearchResult};

/// A prepared query
#[derive(Debug, Clone)]
pub struct Matcher {
    needle: Vec<char>,
    ascii_needle: Option<Vec<u8>>,
}

impl Matcher {
    pub fn new(query: &str) -> Self {
        let ascii_needle = query
            .is_ascii()
            .then(|| query.bytes().map(|b| b.to_ascii_lowercase()).collect());
        Self {
            needle: query.chars().map(fold).collect(),
            ascii_needle,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    /// First occurrence of the query in `path`
    pub fn find(&self, path: &str) -> Option<MatchSpan> {
        if self.needle.is_empty() {
            return None;
        }

        if let (Some(needle), true) = (&self.ascii_needle, path.is_ascii()) {
            // ASCII paths: byte offsets are character offsets
            return path
                .as_bytes()
                .windows(needle.len())
                .position(|window| window.eq_ignore_ascii_case(needle))
                .map(|start| MatchSpan {
                    start,
                    len: needle.len(),
                });
        }

        let haystack: Vec<char> = path.chars().map(fold).collect();
        haystack
            .windows(self.needle.len())
            .position(|window| window == self.needle.as_slice())
            .map(|start| MatchSpan {
                start,
                len: self.needle.len(),
            })
    }
}

/// Single-character lowercase mapping
fn fold(c: char) -> char {
    if c.is_ascii() {
        return c.to_ascii_lowercase();
    }
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// Return every path containing `query`, in input order
///
/// An empty query or empty input yields no results.
pub fn search(paths: &[String], query: &str) -> Vec<SearchResult> {
    let matcher = Matcher::new(query);
    if matcher.is_empty() || paths.is_empty() {
        return Vec::new();
    }

    paths
        .par_iter()
        .filter_map(|path| {
            matcher.find(path).map(|span| SearchResult {
                path: path.clone(),
                span: Some(span),
            })
        })
        .collect()
}
