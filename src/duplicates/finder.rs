//! Work dispatcher: walks the tree, hashes each directory's files on a
//! bounded worker pool, classifies results and persists after every one.
//!
//! # Overview
//!
//! For every directory yielded by the [`Walker`]:
//!
//! 1. File names found in the [`SkipSet`] (restart only) are dropped.
//! 2. A rayon pool of `workers` threads is built and each remaining file
//!    is spawned as an independent hashing task.
//! 3. Tasks send their result over a completion channel. The coordinating
//!    thread receives them in completion order, records each digest in the
//!    [`ClassificationStore`] and rewrites both documents before taking
//!    the next result.
//! 4. The pool is dropped once the channel drains, so one directory's
//!    tasks always finish before the next directory's are submitted.
//!
//! A file that fails to hash is logged and left out of the store; it never
//! aborts its siblings. A failed write of the documents aborts the run.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let config = FinderConfig::default()
//!     .with_workers(8)
//!     .with_output_paths("dups.json", "uniques.json");
//! let outcome = DuplicateFinder::new(config).run(Path::new("/data")).unwrap();
//!
//! println!("{} duplicate groups", outcome.summary.duplicate_groups);
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::duplicates::groups::{path_to_record, ClassificationStore, Partition};
use crate::progress::{ProgressCallback, PHASE_HASHING};
use crate::scanner::{
    count_root_files, validate_root, HashAlgorithm, HashError, Hasher, ScanError, Walker,
    WalkerConfig, DEFAULT_BUFFER_SIZE,
};
use crate::session::{load_state, ResumeState, SkipSet, StateError, StateWriter};

/// Default number of hashing threads per directory batch.
pub const DEFAULT_WORKERS: usize = 4;

/// Default location of the duplicates document.
pub const DEFAULT_DUPLICATES_PATH: &str = "duplicates.json";

/// Default location of the uniques document.
pub const DEFAULT_UNIQUES_PATH: &str = "uniques.json";

/// Configuration for a hashing run.
#[derive(Clone)]
pub struct FinderConfig {
    /// Worker threads per directory batch (at least 1)
    pub workers: usize,
    /// Digest algorithm
    pub algorithm: HashAlgorithm,
    /// Read buffer size in bytes
    pub buffer_size: usize,
    /// Enumeration options
    pub walker: WalkerConfig,
    /// Resume from existing documents instead of starting empty
    pub restart: bool,
    /// Duplicates document path
    pub duplicates_path: PathBuf,
    /// Uniques document path
    pub uniques_path: PathBuf,
    /// Extension filter for the progress pre-count
    pub count_extension: Option<String>,
    /// Optional shutdown flag for graceful termination
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("workers", &self.workers)
            .field("algorithm", &self.algorithm)
            .field("buffer_size", &self.buffer_size)
            .field("walker", &self.walker)
            .field("restart", &self.restart)
            .field("duplicates_path", &self.duplicates_path)
            .field("uniques_path", &self.uniques_path)
            .field("count_extension", &self.count_extension)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            algorithm: HashAlgorithm::default(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            walker: WalkerConfig::default(),
            restart: false,
            duplicates_path: PathBuf::from(DEFAULT_DUPLICATES_PATH),
            uniques_path: PathBuf::from(DEFAULT_UNIQUES_PATH),
            count_extension: None,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the number of worker threads (clamped to at least 1).
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the digest algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the read buffer size.
    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Set the enumeration options.
    #[must_use]
    pub fn with_walker_config(mut self, walker: WalkerConfig) -> Self {
        self.walker = walker;
        self
    }

    /// Resume from the existing documents.
    #[must_use]
    pub fn with_restart(mut self, restart: bool) -> Self {
        self.restart = restart;
        self
    }

    /// Set both document paths.
    #[must_use]
    pub fn with_output_paths(
        mut self,
        duplicates_path: impl Into<PathBuf>,
        uniques_path: impl Into<PathBuf>,
    ) -> Self {
        self.duplicates_path = duplicates_path.into();
        self.uniques_path = uniques_path.into();
        self
    }

    /// Only count files with this extension when estimating progress.
    #[must_use]
    pub fn with_count_extension(mut self, extension: Option<String>) -> Self {
        self.count_extension = extension;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Statistics for one run.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Directories whose batch was dispatched
    pub directories: usize,
    /// Files hashed and recorded during this run
    pub hashed_files: usize,
    /// Files left out because their name was in the skip set
    pub skipped_files: usize,
    /// Paths loaded from the previous run's documents
    pub resumed_files: usize,
    /// Bytes read while hashing
    pub bytes_hashed: u64,
    /// Digests shared by two or more paths
    pub duplicate_groups: usize,
    /// Paths inside duplicate groups
    pub duplicate_files: usize,
    /// Paths with unique content
    pub unique_files: usize,
    /// Files that could not be hashed
    pub hash_errors: Vec<HashError>,
    /// Directories that could not be read
    pub scan_errors: Vec<ScanError>,
    /// Whether the run stopped early on a shutdown request
    pub interrupted: bool,
    /// Wall time of the run
    pub scan_duration: Duration,
}

impl ScanSummary {
    /// Number of files that failed to hash.
    #[must_use]
    pub fn failed_files(&self) -> usize {
        self.hash_errors.len()
    }

    /// Whether any file or directory could not be processed.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.hash_errors.is_empty() || !self.scan_errors.is_empty()
    }

    fn absorb_partition(&mut self, partition: &Partition) {
        self.duplicate_groups = partition.duplicate_groups();
        self.duplicate_files = partition.duplicate_files();
        self.unique_files = partition.unique_files();
    }
}

/// Final partition and statistics of a run.
#[derive(Debug)]
pub struct ScanOutcome {
    /// Duplicate/unique split, as last persisted
    pub partition: Partition,
    /// Run statistics
    pub summary: ScanSummary,
}

/// Errors that end a run.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The root is missing or not a directory.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Resuming or persisting state failed.
    #[error(transparent)]
    State(#[from] StateError),

    /// The worker pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// State owned by the coordinating thread for the length of a run.
struct RunState {
    store: ClassificationStore,
    skip: SkipSet,
    writer: StateWriter,
    summary: ScanSummary,
    started: Instant,
}

/// Concurrent, resumable duplicate finder.
#[derive(Debug, Clone)]
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Create a finder from a configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let hasher = Hasher::new(config.algorithm, config.buffer_size);
        Self { config, hasher }
    }

    /// Create a finder with the default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The finder's configuration.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Hash every file under `root` and classify the results.
    ///
    /// # Errors
    ///
    /// Configuration errors (missing root, missing or invalid documents on
    /// restart) are returned before any file is hashed. A failure to write
    /// the documents aborts the run.
    pub fn run(&self, root: &Path) -> Result<ScanOutcome, FinderError> {
        validate_root(root)?;
        let estimate = count_root_files(root, self.config.count_extension.as_deref())?;
        let mut state = self.prepare()?;

        log::info!("Walking structure of: {}", root.display());
        log::info!("Generating {} hashes for files...", self.config.algorithm);
        self.notify_start(estimate.saturating_sub(state.skip.len()));

        let walker = Walker::new(root, self.config.walker);
        for batch in walker.batches() {
            let batch = match batch {
                Ok(batch) => batch,
                Err(e) => {
                    state.summary.scan_errors.push(e);
                    continue;
                }
            };

            if self.config.is_shutdown_requested() {
                log::info!("Shutdown requested, stopping before {}", batch.dir.display());
                state.summary.interrupted = true;
                break;
            }
            state.summary.directories += 1;

            let mut paths = Vec::with_capacity(batch.len());
            for name in &batch.file_names {
                if state.skip.contains(name) {
                    log::trace!("Skipping already hashed: {}", batch.dir.join(name).display());
                    state.summary.skipped_files += 1;
                } else {
                    paths.push(batch.dir.join(name));
                }
            }

            self.dispatch_batch(paths, &mut state)?;
        }

        self.finish(state)
    }

    /// Hash an explicit list of files as a single batch.
    ///
    /// Restart and skip handling behave as in [`run`](Self::run).
    ///
    /// # Errors
    ///
    /// Same as [`run`](Self::run), minus the root checks.
    pub fn hash_files(&self, paths: Vec<PathBuf>) -> Result<ScanOutcome, FinderError> {
        let mut state = self.prepare()?;

        let (skipped, paths): (Vec<_>, Vec<_>) = paths.into_iter().partition(|p| {
            p.file_name()
                .is_some_and(|n| state.skip.contains(&n.to_string_lossy()))
        });
        state.summary.skipped_files = skipped.len();

        self.notify_start(paths.len());
        self.dispatch_batch(paths, &mut state)?;
        self.finish(state)
    }

    fn prepare(&self) -> Result<RunState, FinderError> {
        let started = Instant::now();
        let ResumeState { store, skip } = if self.config.restart {
            load_state(&self.config.duplicates_path, &self.config.uniques_path)?
        } else {
            ResumeState::default()
        };

        let summary = ScanSummary {
            resumed_files: store.len(),
            ..Default::default()
        };

        Ok(RunState {
            store,
            skip,
            writer: StateWriter::new(&self.config.duplicates_path, &self.config.uniques_path),
            summary,
            started,
        })
    }

    fn notify_start(&self, estimate: usize) {
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(PHASE_HASHING, estimate);
        }
    }

    /// Hash one directory's files on a fresh pool and record results as
    /// they complete.
    fn dispatch_batch(&self, paths: Vec<PathBuf>, state: &mut RunState) -> Result<(), FinderError> {
        if paths.is_empty() {
            return Ok(());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers.max(1))
            .thread_name(|i| format!("dupescan-hash-{i}"))
            .build()?;

        let (tx, rx) = crossbeam_channel::unbounded();
        for path in paths {
            let tx = tx.clone();
            let hasher = self.hasher;
            pool.spawn(move || {
                // The receiver is gone only if the run already failed.
                let _ = tx.send(hasher.hash_file(&path));
            });
        }
        drop(tx);

        for result in rx {
            match result {
                Ok(hashed) => {
                    let record = path_to_record(&hashed.path);
                    if !state.store.record(hashed.digest, record.clone()) {
                        continue;
                    }
                    state.summary.hashed_files += 1;
                    state.summary.bytes_hashed += hashed.bytes;

                    state.writer.write(&state.store.partition())?;

                    if let Some(ref callback) = self.config.progress_callback {
                        callback.on_item_completed(hashed.bytes);
                        callback.on_progress(state.summary.hashed_files, &record);
                    }
                }
                Err(e) => {
                    log::warn!("Failed to hash {}: {}", e.path().display(), e);
                    state.summary.hash_errors.push(e);
                }
            }
        }

        Ok(())
    }

    fn finish(&self, mut state: RunState) -> Result<ScanOutcome, FinderError> {
        let partition = state.store.partition();
        // Nothing new was recorded; still leave both documents behind.
        if state.writer.writes() == 0 {
            state.writer.write(&partition)?;
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(PHASE_HASHING);
        }

        state.summary.absorb_partition(&partition);
        state.summary.scan_duration = state.started.elapsed();

        log::info!("Number of unique files: {}", state.summary.unique_files);
        log::info!(
            "Number of duplicated files: {}",
            state.summary.duplicate_files
        );
        if !state.summary.hash_errors.is_empty() {
            log::warn!(
                "{} files could not be hashed",
                state.summary.hash_errors.len()
            );
        }

        Ok(ScanOutcome {
            partition,
            summary: state.summary,
        })
    }
}
