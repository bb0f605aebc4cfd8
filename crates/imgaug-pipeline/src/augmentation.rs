//! Probabilistic application of an [`AugmentationConfig`] to one image.

use crate::operations;
use image::{DynamicImage, RgbaImage};
use imgaug_core::{AugmentationConfig, Operation};
use rand::Rng;

/// An augmented image together with the names of the steps that ran
pub struct AugmentedImage {
    pub image: DynamicImage,
    pub applied: Vec<&'static str>,
}

/// Augmentation pipeline for one configuration
#[derive(Debug, Clone)]
pub struct AugmentationPipeline {
    config: AugmentationConfig,
}

impl AugmentationPipeline {
    /// Creates a new augmentation pipeline with the given configuration
    pub fn new(config: AugmentationConfig) -> Self {
        Self { config }
    }

    /// Runs every step whose probability draw succeeds, in configuration order
    pub fn augment<R: Rng + ?Sized>(&self, image: &DynamicImage, rng: &mut R) -> AugmentedImage {
        let mut current = image.to_rgba8();
        let mut applied = Vec::new();

        for op in &self.config.operations {
            if rng.gen::<f32>() < op.probability() {
                current = apply(op, &current, rng);
                applied.push(op.name());
            }
        }

        AugmentedImage {
            image: DynamicImage::ImageRgba8(current),
            applied,
        }
    }
}

/// Applies a single step unconditionally, drawing its parameters from `rng`
pub fn apply<R: Rng + ?Sized>(op: &Operation, image: &RgbaImage, rng: &mut R) -> RgbaImage {
    match *op {
        Operation::Rotate {
            max_left_rotation,
            max_right_rotation,
            ..
        } => {
            // Pick a side first, then a whole-degree angle on that side
            let degrees = if rng.gen_bool(0.5) {
                rng.gen_range(0..=max_left_rotation as u32) as f32
            } else {
                -(rng.gen_range(0..=max_right_rotation as u32) as f32)
            };
            operations::rotate(image, degrees)
        }
        Operation::ZoomRandom {
            percentage_area, ..
        } => {
            let (width, height) = image.dimensions();
            let (crop_w, crop_h) = operations::zoom_window(width, height, percentage_area);
            let x = rng.gen_range(0..=width - crop_w);
            let y = rng.gen_range(0..=height - crop_h);
            operations::crop_and_restore(image, x, y, crop_w, crop_h)
        }
        Operation::RandomContrast {
            min_factor,
            max_factor,
            ..
        } => operations::adjust_contrast(image, rng.gen_range(min_factor..=max_factor)),
        Operation::RandomBrightness {
            min_factor,
            max_factor,
            ..
        } => operations::adjust_brightness(image, rng.gen_range(min_factor..=max_factor)),
        Operation::RandomColor {
            min_factor,
            max_factor,
            ..
        } => operations::adjust_color(image, rng.gen_range(min_factor..=max_factor)),
    }
}
