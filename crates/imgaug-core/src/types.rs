//! Core type definitions for batch image augmentation.

use crate::error::{Error, ErrorKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A directory of source images treated as one augmentation unit.
///
/// The same path is used as source and destination, so generated samples
/// land next to the images they were derived from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageCollection {
    /// Path to the collection directory
    pub path: PathBuf,
    /// Directory name, used as the class label of generated files
    pub name: String,
}

impl ImageCollection {
    /// Creates a collection from a directory path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = label_for(&path);
        Self { path, name }
    }
}

fn label_for(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Number of augmented samples to produce for one collection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SampleRequest {
    pub count: usize,
}

impl SampleRequest {
    pub fn new(count: usize) -> Self {
        Self { count }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// What happened to a single collection during a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// All requested samples were written
    Generated { files: Vec<PathBuf> },
    /// The collection failed and nothing further was attempted for it
    Failed { kind: ErrorKind, message: String },
}

/// Per-collection entry of a [`BatchReport`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionOutcome {
    pub collection: ImageCollection,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl CollectionOutcome {
    pub fn generated(collection: ImageCollection, files: Vec<PathBuf>) -> Self {
        Self {
            collection,
            status: OutcomeStatus::Generated { files },
        }
    }

    pub fn failed(collection: ImageCollection, error: &Error) -> Self {
        Self {
            collection,
            status: OutcomeStatus::Failed {
                kind: error.kind(),
                message: error.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, OutcomeStatus::Generated { .. })
    }

    /// Number of files written for this collection
    pub fn generated_count(&self) -> usize {
        match &self.status {
            OutcomeStatus::Generated { files } => files.len(),
            OutcomeStatus::Failed { .. } => 0,
        }
    }
}

/// Summary of one batch run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// Root directory that was scanned
    pub root: PathBuf,
    /// Requested samples per collection
    pub sample_size: usize,
    /// Outcomes in processing order
    pub collections: Vec<CollectionOutcome>,
    /// Entries under the root that were not directories
    pub skipped_entries: Vec<PathBuf>,
}

impl BatchReport {
    pub fn new(root: impl Into<PathBuf>, sample_size: usize) -> Self {
        Self {
            root: root.into(),
            sample_size,
            ..Default::default()
        }
    }

    pub fn succeeded(&self) -> usize {
        self.collections.iter().filter(|c| c.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.collections.len() - self.succeeded()
    }

    pub fn total_generated(&self) -> usize {
        self.collections.iter().map(|c| c.generated_count()).sum()
    }

    /// Looks up the outcome recorded for a collection by name
    pub fn outcome(&self, name: &str) -> Option<&CollectionOutcome> {
        self.collections.iter().find(|c| c.collection.name == name)
    }
}
