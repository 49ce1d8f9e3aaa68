use crate::error::Result;
use log::{debug, trace};
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A regular file captured in a [`SourceTree`] snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    pub path: PathBuf,
}

impl SourceFile {
    /// Returns true if the file name ends with `.{ext}`.
    pub fn has_extension(&self, ext: &str) -> bool {
        self.path.extension().is_some_and(|e| e == ext)
    }
}

/// An immutable snapshot of the files below a project directory.
///
/// Files are listed depth-first in pre-order, siblings sorted by file name, so a
/// directory's contents appear at the directory's position among its siblings.
/// Repeated snapshots of an unchanged directory list the same files in the same order.
#[derive(Debug, Clone, Serialize)]
pub struct SourceTree {
    pub root: PathBuf,
    pub files: Vec<SourceFile>,
}

impl SourceTree {
    /// Walks `root` once and records every regular file it contains.
    ///
    /// Symlinks are not followed. Directories are traversed, never recorded.
    pub fn snapshot(root: &Path) -> Result<Self> {
        debug!("Snapshotting source tree at {}", root.display());
        let mut files = Vec::new();

        for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            trace!("Found file: {}", entry.path().display());
            files.push(SourceFile {
                path: entry.into_path(),
            });
        }

        debug!("Snapshot holds {} files", files.len());
        Ok(Self {
            root: root.to_path_buf(),
            files,
        })
    }

    /// Files with the given extension, in traversal order.
    pub fn files_with_extension<'a>(&'a self, ext: &'a str) -> impl Iterator<Item = &'a SourceFile> {
        self.files.iter().filter(move |f| f.has_extension(ext))
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_snapshot_order_is_lexicographic_preorder() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("b/inner")).unwrap();
        fs::write(root.join("a.txt"), "").unwrap();
        fs::write(root.join("b/inner/z.txt"), "").unwrap();
        fs::write(root.join("b/c.txt"), "").unwrap();
        fs::write(root.join("c.txt"), "").unwrap();

        let tree = SourceTree::snapshot(root).unwrap();
        let rel: Vec<String> = tree
            .files
            .iter()
            .map(|f| f.path.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();

        assert_eq!(rel, vec!["a.txt", "b/c.txt", "b/inner/z.txt", "c.txt"]);
    }

    #[test]
    fn test_directories_are_not_recorded() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("empty/nested")).unwrap();

        let tree = SourceTree::snapshot(dir.path()).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = tempdir().unwrap();
        let result = SourceTree::snapshot(&dir.path().join("does-not-exist"));
        assert!(result.is_err());
    }
}
