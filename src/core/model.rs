//! Index and result model
//!
//! `PathStore` is the flat, ordered list of indexed file paths. `SearchResult`
//! is what the match engine produces; `ResultRecord` is the highlight-ready
//! record handed to renderers.

use serde::{Deserialize, Serialize};

/// Ordered collection of absolute file paths
///
/// Order is crawl insertion order and is not stable across crawls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathStore {
    paths: Vec<String>,
}

impl PathStore {
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    #[allow(dead_code)]
    pub fn into_paths(self) -> Vec<String> {
        self.paths
    }
}

impl From<Vec<String>> for PathStore {
    fn from(paths: Vec<String>) -> Self {
        Self { paths }
    }
}

impl FromIterator<String> for PathStore {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}

/// Location of a match inside a path, in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSpan {
    pub start: usize,
    pub len: usize,
}

/// A path that matched a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub path: String,
    pub span: Option<MatchSpan>,
}

/// Highlight-ready search result handed to the presentation layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    /// Text before the match
    pub prefix: String,

    /// The matched text as it appears in the path
    #[serde(rename = "match")]
    pub matched: String,

    /// Text after the match
    pub suffix: String,

    pub full_path: String,
}

impl ResultRecord {
    /// A record with no highlight, only the full path
    pub fn unannotated(path: impl Into<String>) -> Self {
        Self {
            full_path: path.into(),
            ..Default::default()
        }
    }

    pub fn is_annotated(&self) -> bool {
        !self.matched.is_empty()
    }
}

impl From<&SearchResult> for ResultRecord {
    fn from(result: &SearchResult) -> Self {
        let Some(span) = result.span else {
            return ResultRecord::unannotated(result.path.clone());
        };

        let path = result.path.as_str();
        let start = char_to_byte(path, span.start);
        let end = char_to_byte(path, span.start + span.len);
        match (start, end) {
            (Some(start), Some(end)) => Self {
                prefix: path[..start].to_string(),
                matched: path[start..end].to_string(),
                suffix: path[end..].to_string(),
                full_path: result.path.clone(),
            },
            _ => ResultRecord::unannotated(result.path.clone()),
        }
    }
}

/// Byte offset of the `n`th character (or the end of the string)
fn char_to_byte(s: &str, n: usize) -> Option<usize> {
    s.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(s.len()))
        .nth(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_store_from_vec() {
        let store = PathStore::from(vec!["/a".to_string(), "/b".to_string()]);
        assert_eq!(store.len(), 2);
        assert!(!store.is_empty());
        assert_eq!(store.paths()[1], "/b");
    }

    #[test]
    fn test_path_store_keeps_duplicates_and_order() {
        let store: PathStore = ["/z", "/a", "/z"].iter().map(|s| s.to_string()).collect();
        assert_eq!(store.into_paths(), vec!["/z", "/a", "/z"]);
    }

    #[test]
    fn test_record_split() {
        let result = SearchResult {
            path: "/a/Report.TXT".to_string(),
            span: Some(MatchSpan { start: 10, len: 3 }),
        };
        let record = ResultRecord::from(&result);
        assert_eq!(record.prefix, "/a/Report.");
        assert_eq!(record.matched, "TXT");
        assert_eq!(record.suffix, "");
        assert_eq!(record.full_path, "/a/Report.TXT");
        assert!(record.is_annotated());
    }

    #[test]
    fn test_record_split_multibyte() {
        let result = SearchResult {
            path: "/données/été.md".to_string(),
            span: Some(MatchSpan { start: 9, len: 3 }),
        };
        let record = ResultRecord::from(&result);
        assert_eq!(record.prefix, "/données/");
        assert_eq!(record.matched, "été");
        assert_eq!(record.suffix, ".md");
    }

    #[test]
    fn test_record_without_span() {
        let result = SearchResult {
            path: "/x/y".to_string(),
            span: None,
        };
        let record = ResultRecord::from(&result);
        assert!(record.prefix.is_empty());
        assert!(record.matched.is_empty());
        assert!(record.suffix.is_empty());
        assert_eq!(record.full_path, "/x/y");
        assert!(!record.is_annotated());
    }

    #[test]
    fn test_record_span_out_of_range() {
        let result = SearchResult {
            path: "/x".to_string(),
            span: Some(MatchSpan { start: 5, len: 2 }),
        };
        let record = ResultRecord::from(&result);
        assert_eq!(record, ResultRecord::unannotated("/x"));
    }

    #[test]
    fn test_record_serialization_keys() {
        let record = ResultRecord {
            prefix: "/a/".to_string(),
            matched: "b".to_string(),
            suffix: ".txt".to_string(),
            full_path: "/a/b.txt".to_string(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"prefix\":\"/a/\""));
        assert!(json.contains("\"match\":\"b\""));
        assert!(json.contains("\"suffix\":\".txt\""));
        assert!(json.contains("\"fullPath\":\"/a/b.txt\""));
    }
}
