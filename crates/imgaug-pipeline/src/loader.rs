//! Image file discovery and loading inside one collection.

use image::DynamicImage;
use imgaug_core::{Error, Result};
use std::path::{Path, PathBuf};

/// File extensions treated as source images (compared case-insensitively)
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "tif", "tiff", "webp"];

/// Returns true when the path carries a recognized image extension
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Image loader for one directory
pub struct ImageLoader {
    /// Directory containing images
    root_dir: PathBuf,
}

impl ImageLoader {
    /// Creates a new image loader
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Lists image files directly inside the directory, sorted by path.
    ///
    /// The listing is a snapshot: files written afterwards are not included.
    pub fn scan_directory(&self) -> Result<Vec<PathBuf>> {
        if !self.root_dir.is_dir() {
            return Err(Error::DirectoryNotFound(self.root_dir.clone()));
        }

        let mut images = Vec::new();

        for entry in std::fs::read_dir(&self.root_dir)? {
            let path = entry?.path();
            if path.is_file() && is_image_file(&path) {
                images.push(path);
            }
        }

        images.sort();
        Ok(images)
    }

    /// Decodes an image, reporting undecodable files as augmentation failures
    pub fn load_image(&self, path: &Path) -> Result<DynamicImage> {
        image::open(path).map_err(|e| {
            Error::Augmentation(format!("Failed to load image {}: {}", path.display(), e))
        })
    }
}
