//! Single-directory listing
//!
//! Every failure to open or read a directory comes back as a typed
//! `DirectoryAccessError`; the walker decides what to do with it.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::DirectoryAccessError;

/// Immediate contents of one directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirListing {
    pub files: Vec<PathBuf>,
    pub dirs: Vec<PathBuf>,
}

/// Source of directory listings
pub trait DirLister: Sync {
    fn list(&self, dir: &Path) -> Result<DirListing, DirectoryAccessError>;
}

/// Lists directories on the real filesystem
///
/// Symbolic links are never descended into: a link to a directory is dropped,
/// a link to anything else (or a dangling link) is reported as a file.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLister;

impl DirLister for FsLister {
    fn list(&self, dir: &Path) -> Result<DirListing, DirectoryAccessError> {
        let read_dir = fs::read_dir(dir).map_err(|e| DirectoryAccessError::new(dir, e))?;

        let mut listing = DirListing::default();
        for entry in read_dir {
            let entry = entry.map_err(|e| DirectoryAccessError::new(dir, e))?;
            let path = entry.path();

            let file_type = match entry.file_type() {
                Ok(t) => t,
                Err(e) => {
                    tracing::debug!(
                        target: "pathdex::crawl",
                        path = %path.display(),
                        error = %e,
                        "entry type unavailable, skipped"
                    );
                    continue;
                }
            };

            if file_type.is_dir() {
                listing.dirs.push(path);
            } else if file_type.is_symlink() {
                match fs::metadata(&path) {
                    Ok(target) if target.is_dir() => {
                        tracing::debug!(
                            target: "pathdex::crawl",
                            path = %path.display(),
                            "directory link not followed"
                        );
                    }
                    _ => listing.files.push(path),
                }
            } else {
                listing.files.push(path);
            }
        }

        Ok(listing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AccessErrorKind;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_list_files_and_dirs() {
        let temp = tempdir().unwrap();
        File::create(temp.path().join("a.txt")).unwrap();
        File::create(temp.path().join("b.rs")).unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();
        File::create(temp.path().join("sub/nested.md")).unwrap();

        let mut listing = FsLister.list(temp.path()).unwrap();
        listing.files.sort();

        assert_eq!(
            listing.files,
            vec![temp.path().join("a.txt"), temp.path().join("b.rs")]
        );
        assert_eq!(listing.dirs, vec![temp.path().join("sub")]);
    }

    #[test]
    fn test_list_empty_dir() {
        let temp = tempdir().unwrap();
        let listing = FsLister.list(temp.path()).unwrap();
        assert!(listing.files.is_empty());
        assert!(listing.dirs.is_empty());
    }

    #[test]
    fn test_list_missing_dir() {
        let temp = tempdir().unwrap();
        let missing = temp.path().join("gone");
        let err = FsLister.list(&missing).unwrap_err();
        assert_eq!(err.kind, AccessErrorKind::NotFound);
        assert_eq!(err.path, missing);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks() {
        use std::os::unix::fs::symlink;

        let temp = tempdir().unwrap();
        fs::create_dir(temp.path().join("real")).unwrap();
        File::create(temp.path().join("target.txt")).unwrap();
        symlink(temp.path().join("real"), temp.path().join("dir_link")).unwrap();
        symlink(temp.path().join("target.txt"), temp.path().join("file_link")).unwrap();
        symlink(temp.path().join("missing"), temp.path().join("dangling")).unwrap();

        let mut listing = FsLister.list(temp.path()).unwrap();
        listing.files.sort();

        assert_eq!(listing.dirs, vec![temp.path().join("real")]);
        assert_eq!(
            listing.files,
            vec![
                temp.path().join("dangling"),
                temp.path().join("file_link"),
                temp.path().join("target.txt"),
            ]
        );
    }
}
