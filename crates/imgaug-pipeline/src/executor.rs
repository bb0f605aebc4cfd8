//! Augmentation executors: sample source images and write augmented copies.

use crate::augmentation::AugmentationPipeline;
use crate::loader::ImageLoader;
use image::DynamicImage;
use imgaug_core::{AugmentationConfig, Error, OutputFormat, Result, SampleRequest};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Capability to produce augmented samples from one directory into another.
///
/// Implementations must list `source` fully before writing into `dest`, since
/// the two are usually the same directory.
pub trait Augmenter {
    /// Writes `request.count` new images into `dest` and returns their paths
    fn augment(
        &mut self,
        source: &Path,
        dest: &Path,
        config: &AugmentationConfig,
        request: SampleRequest,
    ) -> Result<Vec<PathBuf>>;
}

/// Image-backed executor drawing from a seedable RNG
pub struct PipelineExecutor {
    rng: ChaCha8Rng,
}

impl PipelineExecutor {
    /// Creates an executor seeded from the thread RNG
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Creates an executor whose sampling is reproducible for a given seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn save(image: DynamicImage, path: &Path, format: OutputFormat) -> Result<()> {
        let image = match format {
            // JPEG has no alpha channel
            OutputFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()),
            OutputFormat::Png | OutputFormat::Bmp => image,
        };
        image.save_with_format(path, format.image_format())?;
        Ok(())
    }
}

impl Default for PipelineExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds `{label}_original_{source file name}_{uuid}.{ext}`
pub fn output_file_name(label: &str, source: &Path, format: OutputFormat) -> String {
    let source_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!(
        "{}_original_{}_{}.{}",
        label,
        source_name,
        Uuid::new_v4(),
        format.extension()
    )
}

impl Augmenter for PipelineExecutor {
    fn augment(
        &mut self,
        source: &Path,
        dest: &Path,
        config: &AugmentationConfig,
        request: SampleRequest,
    ) -> Result<Vec<PathBuf>> {
        if request.is_empty() {
            return Ok(Vec::new());
        }

        let loader = ImageLoader::new(source);
        let images = loader.scan_directory()?;
        if images.is_empty() {
            return Err(Error::Augmentation(format!(
                "No images found in {}",
                source.display()
            )));
        }

        fs::create_dir_all(dest)?;

        let label = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "images".to_string());
        let pipeline = AugmentationPipeline::new(config.clone());
        let mut written = Vec::with_capacity(request.count);

        for _ in 0..request.count {
            let source_path = &images[self.rng.gen_range(0..images.len())];
            let sample = loader.load_image(source_path).and_then(|image| {
                let augmented = pipeline.augment(&image, &mut self.rng);
                let out_path =
                    dest.join(output_file_name(&label, source_path, config.output_format));
                debug!(
                    "{} -> {} [{}]",
                    source_path.display(),
                    out_path.display(),
                    augmented.applied.join(", ")
                );
                // Recorded before saving so a partially written file is removed too
                written.push(out_path.clone());
                Self::save(augmented.image, &out_path, config.output_format)
            });

            if let Err(e) = sample {
                remove_samples(&written);
                return Err(e);
            }
        }

        Ok(written)
    }
}

/// Deletes samples written by a failed request so the collection is left as it was
fn remove_samples(paths: &[PathBuf]) {
    for path in paths {
        match fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove partial sample {}: {}", path.display(), e),
        }
    }
}
