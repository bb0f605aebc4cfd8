//! Discovery of image collections one level below a root directory.

use imgaug_core::{Error, ImageCollection, Result};
use std::fs;
use std::path::PathBuf;

/// Result of scanning a root directory
#[derive(Debug, Clone, Default)]
pub struct CollectionScan {
    /// Immediate subdirectories, sorted by path
    pub collections: Vec<ImageCollection>,
    /// Entries that were not directories
    pub skipped: Vec<PathBuf>,
}

/// Lists the immediate subdirectories of a root. Does not recurse.
pub struct DirectoryWalker {
    root: PathBuf,
}

impl DirectoryWalker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn scan(&self) -> Result<CollectionScan> {
        let entries =
            fs::read_dir(&self.root).map_err(|_| Error::DirectoryNotFound(self.root.clone()))?;

        let mut scan = CollectionScan::default();

        for entry in entries {
            let path = entry?.path();
            // Follows symlinks, so a link to a directory counts as a collection
            if path.is_dir() {
                scan.collections.push(ImageCollection::new(path));
            } else {
                scan.skipped.push(path);
            }
        }

        scan.collections.sort_by(|a, b| a.path.cmp(&b.path));
        scan.skipped.sort();
        Ok(scan)
    }
}
