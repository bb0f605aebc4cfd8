//! Batch orchestration: augment every collection under a root directory.

use crate::executor::Augmenter;
use crate::walker::DirectoryWalker;
use imgaug_core::{
    AugmentationConfig, BatchConfig, BatchReport, CollectionOutcome, Error, ErrorPolicy,
    ImageCollection, Result, SampleRequest, StrayEntryPolicy,
};
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Runs one augmentation configuration over each collection of a root,
/// sequentially, writing samples back into each collection.
pub struct BatchOrchestrator<A> {
    augmenter: A,
    config: AugmentationConfig,
    on_error: ErrorPolicy,
    stray_entries: StrayEntryPolicy,
    progress: Option<ProgressBar>,
}

impl<A: Augmenter> BatchOrchestrator<A> {
    /// Creates an orchestrator; the configuration is validated here, before
    /// anything touches the filesystem.
    pub fn new(augmenter: A, config: AugmentationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            augmenter,
            config,
            on_error: ErrorPolicy::default(),
            stray_entries: StrayEntryPolicy::default(),
            progress: None,
        })
    }

    /// Creates an orchestrator from a loaded batch configuration file
    pub fn from_batch_config(augmenter: A, batch: &BatchConfig) -> Result<Self> {
        Ok(Self::new(augmenter, batch.augmentation.clone())?
            .with_error_policy(batch.on_error)
            .with_stray_entries(batch.stray_entries))
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.on_error = policy;
        self
    }

    pub fn with_stray_entries(mut self, policy: StrayEntryPolicy) -> Self {
        self.stray_entries = policy;
        self
    }

    /// Reports progress per collection on the given bar
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn config(&self) -> &AugmentationConfig {
        &self.config
    }

    pub fn augmenter(&self) -> &A {
        &self.augmenter
    }

    /// Augments every immediate subdirectory of `root` in place.
    ///
    /// Under [`ErrorPolicy::FailFast`] the first failing collection aborts the
    /// batch with an [`Error::Collection`]; under [`ErrorPolicy::Continue`]
    /// the failure is recorded in the report and the next collection runs.
    pub fn augment_subdirectories(
        &mut self,
        root: &Path,
        sample_size: usize,
    ) -> Result<BatchReport> {
        let scan = DirectoryWalker::new(root).scan()?;
        let request = SampleRequest::new(sample_size);

        info!(
            "Found {} collections under {}",
            scan.collections.len(),
            root.display()
        );
        self.report_stray_entries(&scan.skipped);

        let mut report = BatchReport::new(root, sample_size);
        report.skipped_entries = scan.skipped;

        if let Some(pb) = &self.progress {
            pb.set_length(scan.collections.len() as u64);
        }

        for collection in scan.collections {
            if let Some(pb) = &self.progress {
                pb.set_message(collection.name.clone());
            }

            match self.run_collection(&collection, request) {
                Ok(files) => {
                    report
                        .collections
                        .push(CollectionOutcome::generated(collection, files));
                }
                Err(e) => match self.on_error {
                    ErrorPolicy::FailFast => {
                        if let Some(pb) = &self.progress {
                            pb.abandon_with_message(format!("failed on {}", collection.name));
                        }
                        return Err(e.in_collection(collection.name));
                    }
                    ErrorPolicy::Continue => {
                        warn!("Collection '{}' failed: {}", collection.name, e);
                        report
                            .collections
                            .push(CollectionOutcome::failed(collection, &e));
                    }
                },
            }

            if let Some(pb) = &self.progress {
                pb.inc(1);
            }
        }

        if let Some(pb) = &self.progress {
            pb.finish_with_message("Done");
        }

        info!(
            "Batch complete: {} succeeded, {} failed, {} samples written",
            report.succeeded(),
            report.failed(),
            report.total_generated()
        );
        Ok(report)
    }

    /// Augments a single directory in place
    pub fn augment_directory(
        &mut self,
        dir: &Path,
        sample_size: usize,
    ) -> Result<CollectionOutcome> {
        if !dir.is_dir() {
            return Err(Error::DirectoryNotFound(dir.to_path_buf()));
        }

        let collection = ImageCollection::new(dir);
        match self.run_collection(&collection, SampleRequest::new(sample_size)) {
            Ok(files) => Ok(CollectionOutcome::generated(collection, files)),
            Err(e) => Err(e.in_collection(collection.name)),
        }
    }

    fn run_collection(
        &mut self,
        collection: &ImageCollection,
        request: SampleRequest,
    ) -> Result<Vec<PathBuf>> {
        info!(
            "Augmenting collection: {} ({} samples)",
            collection.name, request.count
        );
        let files = self
            .augmenter
            .augment(&collection.path, &collection.path, &self.config, request)?;
        debug!("  Wrote {} files to {}", files.len(), collection.path.display());
        Ok(files)
    }

    fn report_stray_entries(&self, skipped: &[PathBuf]) {
        for path in skipped {
            match self.stray_entries {
                StrayEntryPolicy::Skip => debug!("Skipping non-directory entry {}", path.display()),
                StrayEntryPolicy::Warn => warn!("Skipping non-directory entry {}", path.display()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::PipelineExecutor;
    use crate::loader::ImageLoader;
    use imgaug_core::{ErrorKind, Preset};
    use std::fs;
    use tempfile::TempDir;

    /// Copies a source image `count` times; fails like the real executor on
    /// an empty collection.
    #[derive(Default)]
    struct StubAugmenter {
        calls: Vec<(PathBuf, PathBuf, usize)>,
        next_id: usize,
    }

    impl Augmenter for StubAugmenter {
        fn augment(
            &mut self,
            source: &Path,
            dest: &Path,
            _config: &AugmentationConfig,
            request: SampleRequest,
        ) -> Result<Vec<PathBuf>> {
            self.calls
                .push((source.to_path_buf(), dest.to_path_buf(), request.count));

            let images = ImageLoader::new(source).scan_directory()?;
            let first = images.first().ok_or_else(|| {
                Error::Augmentation(format!("No images found in {}", source.display()))
            })?;

            let mut written = Vec::new();
            for _ in 0..request.count {
                let out = dest.join(format!("stub_{}.png", self.next_id));
                self.next_id += 1;
                fs::copy(first, &out)?;
                written.push(out);
            }
            Ok(written)
        }
    }

    fn create_test_image(path: &Path) {
        let img = image::ImageBuffer::from_fn(16, 16, |x, y| {
            image::Rgb([(x * 16) as u8, (y * 16) as u8, 64u8])
        });
        img.save(path).unwrap();
    }

    fn make_root(collections: &[(&str, usize)]) -> TempDir {
        let root = TempDir::new().unwrap();
        for (name, images) in collections {
            let dir = root.path().join(name);
            fs::create_dir(&dir).unwrap();
            for i in 0..*images {
                create_test_image(&dir.join(format!("img{}.png", i)));
            }
        }
        root
    }

    fn count_images(dir: &Path) -> usize {
        ImageLoader::new(dir).scan_directory().unwrap().len()
    }

    fn stub_orchestrator() -> BatchOrchestrator<StubAugmenter> {
        BatchOrchestrator::new(
            StubAugmenter::default(),
            Preset::SubdirectorySweep.config(),
        )
        .unwrap()
    }

    #[test]
    fn test_each_collection_gets_exact_sample_count() {
        let root = make_root(&[("0", 2), ("1", 1), ("2", 3)]);
        let mut orchestrator = stub_orchestrator();

        let report = orchestrator.augment_subdirectories(root.path(), 4).unwrap();

        assert_eq!(report.succeeded(), 3);
        assert_eq!(report.total_generated(), 12);
        assert_eq!(count_images(&root.path().join("0")), 6);
        assert_eq!(count_images(&root.path().join("1")), 5);
        assert_eq!(count_images(&root.path().join("2")), 7);

        // source and destination are the collection itself
        for (source, dest, count) in &orchestrator.augmenter().calls {
            assert_eq!(source, dest);
            assert_eq!(*count, 4);
        }
    }

    #[test]
    fn test_stray_files_are_not_collections() {
        let root = make_root(&[("digits", 1)]);
        fs::write(root.path().join("notes.txt"), "stray").unwrap();
        create_test_image(&root.path().join("loose.png"));

        let mut orchestrator = stub_orchestrator().with_stray_entries(StrayEntryPolicy::Warn);
        let report = orchestrator.augment_subdirectories(root.path(), 2).unwrap();

        let calls = &orchestrator.augmenter().calls;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, root.path().join("digits"));
        assert_eq!(report.skipped_entries.len(), 2);
        assert!(report.skipped_entries.contains(&root.path().join("notes.txt")));
        assert_eq!(count_images(root.path()), 1);
    }

    #[test]
    fn test_empty_collection_reported_with_continue() {
        let root = make_root(&[("a", 1), ("b_empty", 0), ("c", 1)]);
        let mut orchestrator = stub_orchestrator().with_error_policy(ErrorPolicy::Continue);

        let report = orchestrator.augment_subdirectories(root.path(), 3).unwrap();

        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        let outcome = report.outcome("b_empty").unwrap();
        match &outcome.status {
            imgaug_core::OutcomeStatus::Failed { kind, .. } => {
                assert_eq!(*kind, ErrorKind::Augmentation)
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(count_images(&root.path().join("c")), 4);
    }

    #[test]
    fn test_empty_collection_stops_batch_with_fail_fast() {
        let root = make_root(&[("a", 1), ("b_empty", 0), ("c", 1)]);
        let mut orchestrator = stub_orchestrator();

        let err = orchestrator.augment_subdirectories(root.path(), 3).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Augmentation);
        match &err {
            Error::Collection { collection, .. } => assert_eq!(collection, "b_empty"),
            other => panic!("expected collection error, got {:?}", other),
        }
        assert_eq!(count_images(&root.path().join("a")), 4);
        assert_eq!(count_images(&root.path().join("c")), 1);
    }

    #[test]
    fn test_zero_sample_size_writes_nothing() {
        let root = make_root(&[("a", 2), ("b", 1)]);
        let mut orchestrator =
            BatchOrchestrator::new(PipelineExecutor::with_seed(3), Preset::default().config())
                .unwrap();

        let report = orchestrator.augment_subdirectories(root.path(), 0).unwrap();

        assert_eq!(report.total_generated(), 0);
        assert_eq!(fs::read_dir(root.path().join("a")).unwrap().count(), 2);
        assert_eq!(fs::read_dir(root.path().join("b")).unwrap().count(), 1);
    }

    #[test]
    fn test_rerun_appends_samples() {
        let root = make_root(&[("a", 1), ("b", 2)]);
        let mut orchestrator =
            BatchOrchestrator::new(PipelineExecutor::with_seed(8), Preset::CloseCrop.config())
                .unwrap();

        orchestrator.augment_subdirectories(root.path(), 2).unwrap();
        let after_first = (
            count_images(&root.path().join("a")),
            count_images(&root.path().join("b")),
        );
        orchestrator.augment_subdirectories(root.path(), 2).unwrap();
        let after_second = (
            count_images(&root.path().join("a")),
            count_images(&root.path().join("b")),
        );

        assert_eq!(after_first, (3, 4));
        assert_eq!(after_second, (5, 6));
    }

    #[test]
    fn test_invalid_config_fails_before_io() {
        let root = make_root(&[("a", 1)]);
        let config = AugmentationConfig {
            output_format: Default::default(),
            operations: vec![imgaug_core::Operation::RandomContrast {
                probability: 0.5,
                min_factor: 1.2,
                max_factor: 0.8,
            }],
        };

        let err = BatchOrchestrator::new(StubAugmenter::default(), config).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(count_images(&root.path().join("a")), 1);
    }

    #[test]
    fn test_missing_root() {
        let mut orchestrator = stub_orchestrator();
        let err = orchestrator
            .augment_subdirectories(Path::new("/nonexistent/root"), 5)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DirectoryNotFound);
        assert!(orchestrator.augmenter().calls.is_empty());
    }

    #[test]
    fn test_real_executor_end_to_end() {
        let root = make_root(&[("cats", 2), ("dogs", 1)]);
        let mut orchestrator = BatchOrchestrator::new(
            PipelineExecutor::with_seed(42),
            Preset::SubdirectorySweep.config(),
        )
        .unwrap()
        .with_progress(ProgressBar::hidden());

        let report = orchestrator.augment_subdirectories(root.path(), 5).unwrap();

        assert_eq!(report.total_generated(), 10);
        assert_eq!(count_images(&root.path().join("cats")), 7);
        assert_eq!(count_images(&root.path().join("dogs")), 6);
        let outcome = report.outcome("dogs").unwrap();
        match &outcome.status {
            imgaug_core::OutcomeStatus::Generated { files } => {
                assert!(files.iter().all(|f| f
                    .file_name()
                    .unwrap()
                    .to_string_lossy()
                    .starts_with("dogs_original_img0.png_")));
            }
            other => panic!("expected generated files, got {:?}", other),
        }
    }

    #[test]
    fn test_undecodable_collection_report_matches_disk() {
        let root = make_root(&[("clean", 1), ("mixed", 3)]);
        fs::write(root.path().join("mixed").join("zz_broken.png"), b"garbage").unwrap();
        let mut orchestrator = BatchOrchestrator::new(
            PipelineExecutor::with_seed(1),
            Preset::SingleDirectory.config(),
        )
        .unwrap()
        .with_error_policy(ErrorPolicy::Continue);

        let report = orchestrator.augment_subdirectories(root.path(), 50).unwrap();

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        let mixed = report.outcome("mixed").unwrap();
        assert_eq!(mixed.generated_count(), 0);
        assert_eq!(fs::read_dir(root.path().join("mixed")).unwrap().count(), 4);
        assert_eq!(count_images(&root.path().join("clean")), 51);
    }

    #[test]
    fn test_augment_single_directory() {
        let root = make_root(&[("8", 2)]);
        let dir = root.path().join("8");
        let mut orchestrator = BatchOrchestrator::new(
            PipelineExecutor::with_seed(70),
            Preset::SingleDirectory.config(),
        )
        .unwrap();

        let outcome = orchestrator.augment_directory(&dir, 3).unwrap();
        assert_eq!(outcome.generated_count(), 3);
        assert_eq!(count_images(&dir), 5);

        let err = orchestrator
            .augment_directory(&root.path().join("missing"), 3)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DirectoryNotFound);
    }

    #[test]
    fn test_from_batch_config() {
        let batch = BatchConfig {
            on_error: ErrorPolicy::Continue,
            ..Default::default()
        };
        let orchestrator =
            BatchOrchestrator::from_batch_config(StubAugmenter::default(), &batch).unwrap();
        assert_eq!(orchestrator.on_error, ErrorPolicy::Continue);
        assert_eq!(orchestrator.config(), &batch.augmentation);
    }
}
