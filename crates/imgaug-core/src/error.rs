//! Error types for batch image augmentation.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the augmentation workspace.
#[derive(Error, Debug)]
pub enum Error {
    /// Root path does not exist, is not a directory, or cannot be listed
    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// A collection has no usable images or the pipeline failed on it
    #[error("Augmentation error: {0}")]
    Augmentation(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image encoding error not caused by the filesystem
    #[error("Image processing error: {0}")]
    Image(String),

    /// Invalid configuration value or unreadable configuration file
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Failure of a single collection, surfaced when the batch stops on it
    #[error("Collection '{collection}' failed: {source}")]
    Collection {
        collection: String,
        #[source]
        source: Box<Error>,
    },
}

/// Coarse classification of an [`Error`], stable across wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    DirectoryNotFound,
    Augmentation,
    Io,
    Image,
    Config,
    Serialization,
}

impl Error {
    /// Returns the kind of the underlying failure, looking through
    /// [`Error::Collection`] wrappers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::DirectoryNotFound(_) => ErrorKind::DirectoryNotFound,
            Error::Augmentation(_) => ErrorKind::Augmentation,
            Error::Io(_) => ErrorKind::Io,
            Error::Image(_) => ErrorKind::Image,
            Error::Config(_) => ErrorKind::Config,
            Error::Serialization(_) => ErrorKind::Serialization,
            Error::Collection { source, .. } => source.kind(),
        }
    }

    /// Wraps this error with the name of the collection it happened in.
    pub fn in_collection(self, collection: impl Into<String>) -> Self {
        Error::Collection {
            collection: collection.into(),
            source: Box::new(self),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(io) => Error::Io(io),
            other => Error::Image(other.to_string()),
        }
    }
}

/// Specialized Result type for augmentation operations.
pub type Result<T> = std::result::Result<T, Error>;
