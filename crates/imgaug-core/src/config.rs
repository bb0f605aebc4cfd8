//! Configuration structures for batch image augmentation.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest rotation (in degrees) accepted for either direction
pub const MAX_ROTATION_DEGREES: f32 = 25.0;

/// A single probabilistic augmentation step
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    /// Rotate left or right by up to the given number of degrees
    Rotate {
        probability: f32,
        max_left_rotation: f32,
        max_right_rotation: f32,
    },
    /// Crop a random window of `percentage_area` of each side and scale it back up
    ZoomRandom {
        probability: f32,
        percentage_area: f32,
    },
    /// Scale contrast around the mean luma
    RandomContrast {
        probability: f32,
        min_factor: f32,
        max_factor: f32,
    },
    /// Scale pixel intensity
    RandomBrightness {
        probability: f32,
        min_factor: f32,
        max_factor: f32,
    },
    /// Scale saturation around each pixel's luma
    RandomColor {
        probability: f32,
        min_factor: f32,
        max_factor: f32,
    },
}

impl Operation {
    /// Probability that this step runs for a given sample
    pub fn probability(&self) -> f32 {
        match *self {
            Operation::Rotate { probability, .. }
            | Operation::ZoomRandom { probability, .. }
            | Operation::RandomContrast { probability, .. }
            | Operation::RandomBrightness { probability, .. }
            | Operation::RandomColor { probability, .. } => probability,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Rotate { .. } => "rotate",
            Operation::ZoomRandom { .. } => "zoom_random",
            Operation::RandomContrast { .. } => "random_contrast",
            Operation::RandomBrightness { .. } => "random_brightness",
            Operation::RandomColor { .. } => "random_color",
        }
    }

    /// Checks the parameter invariants of this step
    pub fn validate(&self) -> Result<()> {
        let probability = self.probability();
        if !(0.0..=1.0).contains(&probability) {
            return Err(Error::Config(format!(
                "{}: probability must be within [0, 1], got {}",
                self.name(),
                probability
            )));
        }

        match *self {
            Operation::Rotate {
                max_left_rotation,
                max_right_rotation,
                ..
            } => {
                for (side, value) in [("left", max_left_rotation), ("right", max_right_rotation)] {
                    if !(0.0..=MAX_ROTATION_DEGREES).contains(&value) {
                        return Err(Error::Config(format!(
                            "rotate: max {} rotation must be within [0, {}], got {}",
                            side, MAX_ROTATION_DEGREES, value
                        )));
                    }
                }
            }
            Operation::ZoomRandom { percentage_area, .. } => {
                if !(percentage_area > 0.0 && percentage_area <= 1.0) {
                    return Err(Error::Config(format!(
                        "zoom_random: percentage area must be within (0, 1], got {}",
                        percentage_area
                    )));
                }
            }
            Operation::RandomContrast {
                min_factor,
                max_factor,
                ..
            }
            | Operation::RandomBrightness {
                min_factor,
                max_factor,
                ..
            }
            | Operation::RandomColor {
                min_factor,
                max_factor,
                ..
            } => validate_factor_range(self.name(), min_factor, max_factor)?,
        }

        Ok(())
    }
}

fn validate_factor_range(name: &str, min: f32, max: f32) -> Result<()> {
    if !min.is_finite() || !max.is_finite() || min < 0.0 {
        return Err(Error::Config(format!(
            "{}: factors must be finite and non-negative, got [{}, {}]",
            name, min, max
        )));
    }
    if min > max {
        return Err(Error::Config(format!(
            "{}: min factor {} exceeds max factor {}",
            name, min, max
        )));
    }
    Ok(())
}

/// Raster format of generated samples
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    Bmp,
}

impl OutputFormat {
    /// File extension used for generated files
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Bmp => "bmp",
        }
    }

    pub fn image_format(&self) -> image::ImageFormat {
        match self {
            OutputFormat::Png => image::ImageFormat::Png,
            OutputFormat::Jpeg => image::ImageFormat::Jpeg,
            OutputFormat::Bmp => image::ImageFormat::Bmp,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Png => write!(f, "png"),
            OutputFormat::Jpeg => write!(f, "jpeg"),
            OutputFormat::Bmp => write!(f, "bmp"),
        }
    }
}

/// Ordered list of augmentation steps plus the output format.
///
/// Steps are applied independently according to their probability and in
/// list order. Construct through [`AugmentationConfig::builder`] or a
/// [`Preset`]; deserialized values must be checked with
/// [`AugmentationConfig::validate`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AugmentationConfig {
    #[serde(default)]
    pub output_format: OutputFormat,
    pub operations: Vec<Operation>,
}

impl AugmentationConfig {
    pub fn builder() -> AugmentationConfigBuilder {
        AugmentationConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.operations.is_empty() {
            return Err(Error::Config(
                "augmentation config must contain at least one operation".to_string(),
            ));
        }
        self.operations.iter().try_for_each(Operation::validate)
    }
}

impl Default for AugmentationConfig {
    fn default() -> Self {
        Preset::default().config()
    }
}

/// Chained builder mirroring the order steps are added in
#[derive(Debug, Clone, Default)]
pub struct AugmentationConfigBuilder {
    operations: Vec<Operation>,
    output_format: OutputFormat,
}

impl AugmentationConfigBuilder {
    pub fn rotate(
        mut self,
        probability: f32,
        max_left_rotation: f32,
        max_right_rotation: f32,
    ) -> Self {
        self.operations.push(Operation::Rotate {
            probability,
            max_left_rotation,
            max_right_rotation,
        });
        self
    }

    pub fn zoom_random(mut self, probability: f32, percentage_area: f32) -> Self {
        self.operations.push(Operation::ZoomRandom {
            probability,
            percentage_area,
        });
        self
    }

    pub fn random_contrast(mut self, probability: f32, min_factor: f32, max_factor: f32) -> Self {
        self.operations.push(Operation::RandomContrast {
            probability,
            min_factor,
            max_factor,
        });
        self
    }

    pub fn random_brightness(mut self, probability: f32, min_factor: f32, max_factor: f32) -> Self {
        self.operations.push(Operation::RandomBrightness {
            probability,
            min_factor,
            max_factor,
        });
        self
    }

    pub fn random_color(mut self, probability: f32, min_factor: f32, max_factor: f32) -> Self {
        self.operations.push(Operation::RandomColor {
            probability,
            min_factor,
            max_factor,
        });
        self
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Validates every step and returns the finished configuration
    pub fn build(self) -> Result<AugmentationConfig> {
        let config = AugmentationConfig {
            output_format: self.output_format,
            operations: self.operations,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Named configurations corresponding to the known call-site variants
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Rotation, zoom to 95% and color jitter; used when sweeping subdirectories
    #[default]
    SubdirectorySweep,
    /// Rotation and zoom to 90% only; used for a single folder
    SingleDirectory,
    /// Rotation, zoom to 70% and color jitter
    CloseCrop,
}

impl Preset {
    pub const ALL: [Preset; 3] = [
        Preset::SubdirectorySweep,
        Preset::SingleDirectory,
        Preset::CloseCrop,
    ];

    pub fn config(&self) -> AugmentationConfig {
        match self {
            Preset::SubdirectorySweep => with_color_jitter(0.95),
            Preset::SingleDirectory => AugmentationConfig {
                output_format: OutputFormat::Png,
                operations: vec![rotation(), zoom(0.9)],
            },
            Preset::CloseCrop => with_color_jitter(0.7),
        }
    }
}

fn rotation() -> Operation {
    Operation::Rotate {
        probability: 0.7,
        max_left_rotation: 25.0,
        max_right_rotation: 25.0,
    }
}

fn zoom(percentage_area: f32) -> Operation {
    Operation::ZoomRandom {
        probability: 0.5,
        percentage_area,
    }
}

fn with_color_jitter(percentage_area: f32) -> AugmentationConfig {
    AugmentationConfig {
        output_format: OutputFormat::Png,
        operations: vec![
            rotation(),
            zoom(percentage_area),
            Operation::RandomContrast {
                probability: 0.5,
                min_factor: 0.8,
                max_factor: 1.2,
            },
            Operation::RandomBrightness {
                probability: 0.5,
                min_factor: 0.8,
                max_factor: 1.2,
            },
            Operation::RandomColor {
                probability: 0.5,
                min_factor: 0.8,
                max_factor: 1.2,
            },
        ],
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preset::SubdirectorySweep => write!(f, "subdirectory-sweep"),
            Preset::SingleDirectory => write!(f, "single-directory"),
            Preset::CloseCrop => write!(f, "close-crop"),
        }
    }
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "subdirectory-sweep" => Ok(Preset::SubdirectorySweep),
            "single-directory" => Ok(Preset::SingleDirectory),
            "close-crop" => Ok(Preset::CloseCrop),
            _ => Err(Error::Config(format!(
                "Unknown preset: {}. Use 'subdirectory-sweep', 'single-directory', or 'close-crop'",
                s
            ))),
        }
    }
}

/// What to do when one collection fails
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// Stop the batch at the first failing collection
    #[default]
    FailFast,
    /// Record the failure and move on to the next collection
    Continue,
}

/// What to do with entries under the root that are not directories
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum StrayEntryPolicy {
    /// Skip and log at debug level
    #[default]
    Skip,
    /// Skip and log a warning
    Warn,
}

/// Settings for one batch run, loadable from TOML
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchConfig {
    /// Samples generated per collection
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
    /// Per-collection failure handling
    #[serde(default)]
    pub on_error: ErrorPolicy,
    /// Handling of stray files under the root
    #[serde(default)]
    pub stray_entries: StrayEntryPolicy,
    /// Random seed for reproducible sampling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Steps applied to each sample
    #[serde(default)]
    pub augmentation: AugmentationConfig,
}

fn default_sample_size() -> usize {
    250
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            sample_size: default_sample_size(),
            on_error: ErrorPolicy::default(),
            stray_entries: StrayEntryPolicy::default(),
            seed: None,
            augmentation: AugmentationConfig::default(),
        }
    }
}

impl BatchConfig {
    pub fn validate(&self) -> Result<()> {
        self.augmentation.validate()
    }
}
