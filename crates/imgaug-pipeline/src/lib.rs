//! Image collection discovery, augmentation and batch orchestration.
//!
//! This crate walks a root directory for image collections, applies an
//! [`imgaug_core::AugmentationConfig`] to randomly drawn source images and
//! writes the augmented samples back into each collection.

pub mod augmentation;
pub mod executor;
pub mod loader;
pub mod operations;
pub mod orchestrator;
pub mod walker;

pub use augmentation::{AugmentationPipeline, AugmentedImage};
pub use executor::{Augmenter, PipelineExecutor};
pub use loader::ImageLoader;
pub use orchestrator::BatchOrchestrator;
pub use walker::{CollectionScan, DirectoryWalker};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::augmentation::*;
    pub use crate::executor::*;
    pub use crate::loader::*;
    pub use crate::orchestrator::*;
    pub use crate::walker::*;
}
