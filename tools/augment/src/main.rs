//! In-place augmentation tool for folders of images.
//!
//! - `subdirs`: augment every immediate subdirectory of a root
//! - `dir`: augment a single directory
//! - `presets`: print the built-in presets as batch config files

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use imgaug_core::{
    load_toml_config, setup_cli_logging, BatchConfig, ErrorPolicy, OutcomeStatus, Preset,
};
use imgaug_pipeline::{BatchOrchestrator, PipelineExecutor};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Samples per collection when sweeping subdirectories
const DEFAULT_SUBDIR_SAMPLES: usize = 250;
/// Samples when augmenting a single directory
const DEFAULT_DIR_SAMPLES: usize = 70;

#[derive(Parser)]
#[command(name = "augment")]
#[command(about = "Generate augmented image samples inside image folders", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Augment every immediate subdirectory of a root directory in place
    Subdirs {
        /// Root directory containing one folder per image collection
        root: PathBuf,

        /// Samples to generate per collection (default: 250)
        #[arg(short = 'n', long)]
        samples: Option<usize>,

        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Behavior when a collection fails
        #[arg(long, value_enum)]
        on_error: Option<OnError>,

        /// Write a JSON run report to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Augment a single directory of images in place
    Dir {
        /// Directory containing source images
        dir: PathBuf,

        /// Samples to generate (default: 70)
        #[arg(short = 'n', long)]
        samples: Option<usize>,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Print built-in presets as batch config TOML
    Presets {
        /// Only print this preset
        #[arg(short, long)]
        preset: Option<Preset>,
    },
}

#[derive(Args)]
struct PipelineArgs {
    /// Augmentation preset: subdirectory-sweep, single-directory, close-crop
    #[arg(short, long)]
    preset: Option<Preset>,

    /// Batch config file (TOML); command-line flags take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Random seed for reproducible sampling
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OnError {
    /// Stop at the first failing collection
    FailFast,
    /// Record the failure and continue with the next collection
    Continue,
}

impl From<OnError> for ErrorPolicy {
    fn from(value: OnError) -> Self {
        match value {
            OnError::FailFast => ErrorPolicy::FailFast,
            OnError::Continue => ErrorPolicy::Continue,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_cli_logging(cli.verbose)?;

    match cli.command {
        Commands::Subdirs {
            root,
            samples,
            pipeline,
            on_error,
            report,
        } => {
            let mut batch = resolve_batch_config(
                &pipeline,
                samples,
                DEFAULT_SUBDIR_SAMPLES,
                Preset::SubdirectorySweep,
            )?;
            if let Some(policy) = on_error {
                batch.on_error = policy.into();
            }
            augment_subdirectories(&root, &batch, report.as_deref())?
        }

        Commands::Dir {
            dir,
            samples,
            pipeline,
        } => {
            let batch = resolve_batch_config(
                &pipeline,
                samples,
                DEFAULT_DIR_SAMPLES,
                Preset::SingleDirectory,
            )?;
            augment_directory(&dir, &batch)?
        }

        Commands::Presets { preset } => print_presets(preset)?,
    }

    Ok(())
}

/// Merges the config file, preset and flags into one validated batch config.
///
/// Fields the config file leaves out take the command's defaults.
fn resolve_batch_config(
    args: &PipelineArgs,
    samples: Option<usize>,
    default_samples: usize,
    default_preset: Preset,
) -> Result<BatchConfig> {
    let mut batch = match &args.config {
        Some(path) => {
            let mut batch = load_toml_config::<BatchConfig>(path)?;
            let table = load_toml_config::<toml::Table>(path)?;
            if !table.contains_key("sample_size") {
                batch.sample_size = default_samples;
            }
            if !table.contains_key("augmentation") {
                batch.augmentation = default_preset.config();
            }
            batch
        }
        None => BatchConfig {
            sample_size: default_samples,
            augmentation: default_preset.config(),
            ..Default::default()
        },
    };

    if let Some(preset) = args.preset {
        batch.augmentation = preset.config();
    }
    if let Some(samples) = samples {
        batch.sample_size = samples;
    }
    if args.seed.is_some() {
        batch.seed = args.seed;
    }

    batch.validate().context("Invalid augmentation configuration")?;
    Ok(batch)
}

fn executor_for(batch: &BatchConfig) -> PipelineExecutor {
    match batch.seed {
        Some(seed) => PipelineExecutor::with_seed(seed),
        None => PipelineExecutor::new(),
    }
}

fn augment_subdirectories(
    root: &Path,
    batch: &BatchConfig,
    report_path: Option<&Path>,
) -> Result<()> {
    info!("Augmenting subdirectories of {:?}", root);
    info!(
        "Samples per collection: {}, operations: {}, output: {}",
        batch.sample_size,
        batch.augmentation.operations.len(),
        batch.augmentation.output_format
    );

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .context("Invalid progress bar template")?
            .progress_chars("=>-"),
    );

    let mut orchestrator =
        BatchOrchestrator::from_batch_config(executor_for(batch), batch)?.with_progress(pb);
    let report = orchestrator
        .augment_subdirectories(root, batch.sample_size)
        .with_context(|| format!("Failed to augment {}", root.display()))?;

    println!("\n📊 Augmentation Summary\n");
    println!("{:<40} {:>10}  {}", "Collection", "Generated", "Status");
    println!("{}", "=".repeat(70));
    for outcome in &report.collections {
        let status = match &outcome.status {
            OutcomeStatus::Generated { .. } => "ok".to_string(),
            OutcomeStatus::Failed { message, .. } => message.clone(),
        };
        println!(
            "{:<40} {:>10}  {}",
            outcome.collection.name,
            outcome.generated_count(),
            status
        );
    }
    println!("{}", "=".repeat(70));
    println!(
        "Total: {} collections, {} samples, {} skipped entries",
        report.collections.len(),
        report.total_generated(),
        report.skipped_entries.len()
    );

    if report.failed() > 0 {
        warn!("{} collections failed", report.failed());
    }

    if let Some(path) = report_path {
        fs::write(path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        info!("Report saved to {:?}", path);
    }

    info!("✓ Augmentation complete!");
    Ok(())
}

fn augment_directory(dir: &Path, batch: &BatchConfig) -> Result<()> {
    info!("Augmenting directory {:?} with {} samples", dir, batch.sample_size);

    let mut orchestrator = BatchOrchestrator::from_batch_config(executor_for(batch), batch)?;
    let outcome = orchestrator
        .augment_directory(dir, batch.sample_size)
        .with_context(|| format!("Failed to augment {}", dir.display()))?;

    info!("✓ Wrote {} samples to {:?}", outcome.generated_count(), dir);
    Ok(())
}

fn print_presets(only: Option<Preset>) -> Result<()> {
    let presets: Vec<Preset> = match only {
        Some(preset) => vec![preset],
        None => Preset::ALL.to_vec(),
    };

    for preset in presets {
        let batch = BatchConfig {
            augmentation: preset.config(),
            ..Default::default()
        };
        println!("# preset: {}", preset);
        println!("{}", toml::to_string_pretty(&batch).context("Failed to render preset")?);
    }

    Ok(())
}
