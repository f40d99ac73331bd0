//! Snapshot store - read/write the persisted path index

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::PersistenceError;
use crate::core::model::PathStore;

/// Snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Versioned snapshot document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Format version
    pub version: u32,

    /// When the crawl that produced this snapshot finished (RFC 3339)
    pub generated_at: String,

    /// Roots the crawl started from
    #[serde(default)]
    pub roots: Vec<String>,

    /// Indexed file paths, in crawl order
    pub paths: Vec<String>,
}

impl Snapshot {
    pub fn new(paths: Vec<String>, roots: &[PathBuf]) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            generated_at: chrono::Utc::now().to_rfc3339(),
            roots: roots
                .iter()
                .map(|r| r.to_string_lossy().into_owned())
                .collect(),
            paths,
        }
    }
}

/// Accepted on-disk shapes: the versioned document, or a bare array of paths
#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotDocument {
    Versioned(Snapshot),
    Legacy(Vec<String>),
}

/// A snapshot read back from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedIndex {
    pub store: PathStore,
    /// Roots recorded at save time; legacy snapshots carry none
    pub roots: Option<Vec<PathBuf>>,
}

/// Load the snapshot at `location`
///
/// Returns `Ok(None)` when no snapshot exists yet.
pub fn load(location: &Path) -> Result<Option<LoadedIndex>, PersistenceError> {
    let file = match File::open(location) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %location.display(), "no index snapshot found");
            return Ok(None);
        }
        Err(source) => {
            return Err(PersistenceError::Read {
                path: location.to_path_buf(),
                source,
            })
        }
    };

    let document: SnapshotDocument =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            if source.is_io() {
                PersistenceError::Read {
                    path: location.to_path_buf(),
                    source: source.into(),
                }
            } else {
                PersistenceError::Parse {
                    path: location.to_path_buf(),
                    source,
                }
            }
        })?;

    let (paths, roots) = match document {
        SnapshotDocument::Versioned(snapshot) => {
            if snapshot.version != SNAPSHOT_VERSION {
                return Err(PersistenceError::UnsupportedVersion {
                    path: location.to_path_buf(),
                    found: snapshot.version,
                    expected: SNAPSHOT_VERSION,
                });
            }
            let roots = snapshot.roots.into_iter().map(PathBuf::from).collect();
            (snapshot.paths, Some(roots))
        }
        SnapshotDocument::Legacy(paths) => {
            tracing::debug!(path = %location.display(), "loaded legacy array snapshot");
            (paths, None)
        }
    };

    tracing::debug!(path = %location.display(), entries = paths.len(), "index snapshot loaded");
    Ok(Some(LoadedIndex {
        store: PathStore::from(paths),
        roots,
    }))
}

/// Write `store` to `location`, replacing any previous snapshot
///
/// The write is not atomic; an interrupted save can leave a partial file,
/// which a later load reports as corrupt.
pub fn save(store: &PathStore, location: &Path, roots: &[PathBuf]) -> Result<(), PersistenceError> {
    let write_err = |source| PersistenceError::Write {
        path: location.to_path_buf(),
        source,
    };

    if let Some(parent) = location.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
    }

    let snapshot = Snapshot::new(store.paths().to_vec(), roots);
    let file = File::create(location).map_err(write_err)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer(&mut writer, &snapshot).map_err(|source| {
        if source.is_io() {
            PersistenceError::Write {
                path: location.to_path_buf(),
                source: source.into(),
            }
        } else {
            PersistenceError::Serialize {
                path: location.to_path_buf(),
                source,
            }
        }
    })?;
    writer.flush().map_err(write_err)?;

    tracing::debug!(path = %location.display(), entries = store.len(), "index snapshot saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store(items: &[&str]) -> PathStore {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_load_missing_is_absent() {
        let temp = tempdir().unwrap();
        let result = load(&temp.path().join("nope.json")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_round_trip_preserves_sequence() {
        let temp = tempdir().unwrap();
        let location = temp.path().join("file_index.json");
        let original = store(&[
            "/home/user/My Documents/report final.docx",
            "C:\\Users\\Zoë\\Desktop\\notes.txt",
            "/srv/数据/图像.png",
            "/tmp/quote\"d/and\\back",
            "/tmp/emoji 🎉.md",
            "/dup",
            "/dup",
            "/a/b/c/d/e/f",
        ]);

        save(&original, &location, &[PathBuf::from("/")]).unwrap();
        let loaded = load(&location).unwrap().unwrap().store;

        assert_eq!(loaded, original);
        assert_eq!(loaded.len(), 8);
    }

    #[test]
    fn test_round_trip_empty_store() {
        let temp = tempdir().unwrap();
        let location = temp.path().join("empty.json");
        save(&PathStore::default(), &location, &[]).unwrap();
        let loaded = load(&location).unwrap().unwrap().store;
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_save_overwrites_previous() {
        let temp = tempdir().unwrap();
        let location = temp.path().join("index.json");
        save(&store(&["/old/a", "/old/b"]), &location, &[]).unwrap();
        save(&store(&["/new"]), &location, &[]).unwrap();
        assert_eq!(load(&location).unwrap().unwrap().store, store(&["/new"]));
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let temp = tempdir().unwrap();
        let location = temp.path().join("nested/dir/index.json");
        save(&store(&["/x"]), &location, &[]).unwrap();
        assert!(location.exists());
    }

    #[test]
    fn test_load_malformed_fails() {
        let temp = tempdir().unwrap();
        let location = temp.path().join("index.json");
        fs::write(&location, "{ this is not json").unwrap();

        let err = load(&location).unwrap_err();
        assert!(matches!(err, PersistenceError::Parse { .. }));
    }

    #[test]
    fn test_load_wrong_shape_fails() {
        let temp = tempdir().unwrap();
        let location = temp.path().join("index.json");
        fs::write(&location, r#"{"files": 3}"#).unwrap();

        assert!(matches!(
            load(&location).unwrap_err(),
            PersistenceError::Parse { .. }
        ));
    }

    #[test]
    fn test_load_truncated_fails() {
        let temp = tempdir().unwrap();
        let location = temp.path().join("index.json");
        save(&store(&["/a", "/b"]), &location, &[]).unwrap();
        let content = fs::read_to_string(&location).unwrap();
        fs::write(&location, &content[..content.len() / 2]).unwrap();

        assert!(load(&location).is_err());
    }

    #[test]
    fn test_load_legacy_array() {
        let temp = tempdir().unwrap();
        let location = temp.path().join("file_index.json");
        fs::write(&location, r#"["C:\\a.txt","C:\\b\\c.png"]"#).unwrap();

        let loaded = load(&location).unwrap().unwrap();
        assert_eq!(loaded.store, store(&["C:\\a.txt", "C:\\b\\c.png"]));
        assert_eq!(loaded.roots, None);
    }

    #[test]
    fn test_load_unsupported_version() {
        let temp = tempdir().unwrap();
        let location = temp.path().join("index.json");
        fs::write(
            &location,
            r#"{"version": 99, "generated_at": "x", "paths": []}"#,
        )
        .unwrap();

        assert!(matches!(
            load(&location).unwrap_err(),
            PersistenceError::UnsupportedVersion { found: 99, .. }
        ));
    }

    #[test]
    fn test_snapshot_records_roots() {
        let temp = tempdir().unwrap();
        let location = temp.path().join("index.json");
        save(&store(&["/a"]), &location, &[PathBuf::from("/mnt/data")]).unwrap();

        let raw: Snapshot = serde_json::from_str(&fs::read_to_string(&location).unwrap()).unwrap();
        assert_eq!(raw.version, SNAPSHOT_VERSION);
        assert_eq!(raw.roots, vec!["/mnt/data".to_string()]);
        assert!(!raw.generated_at.is_empty());
    }

    #[test]
    fn test_load_returns_recorded_roots() {
        let temp = tempdir().unwrap();
        let location = temp.path().join("index.json");
        let roots = vec![PathBuf::from("/mnt/data"), PathBuf::from("/home")];
        save(&store(&["/home/a"]), &location, &roots).unwrap();

        let loaded = load(&location).unwrap().unwrap();
        assert_eq!(loaded.roots, Some(roots));
    }

    #[test]
    fn test_save_to_directory_fails() {
        let temp = tempdir().unwrap();
        let err = save(&store(&["/a"]), temp.path(), &[]).unwrap_err();
        assert!(matches!(err, PersistenceError::Write { .. }));
    }
}
