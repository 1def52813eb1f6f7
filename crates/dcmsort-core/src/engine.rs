use crate::config::SortConfig;
use crate::error::{Error, FolderRenameFailure, MutationFailure, NamingCollision};
use crate::extract;
use crate::grouper;
use crate::model::PendingFolderRename;
use crate::namer::{self, ReorgPlan};
use crate::progress::ProgressReporter;
use crate::reader::{DicomReader, MetadataReader};
use crate::reorg;
use crate::retry::RetryCoordinator;
use crate::scanner;
use crate::sorted;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Cooperative stop flag, checked between directories.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct SortEngine<R = DicomReader> {
    config: SortConfig,
    reader: R,
    cancel: CancelToken,
}

#[derive(Debug, Default)]
pub struct SortReport {
    pub duration: Duration,
    pub directories_visited: usize,
    pub directories_already_sorted: usize,
    pub directories_reorganized: usize,
    pub files_moved: usize,
    pub unrecognized_files: usize,
    pub mutation_failures: Vec<MutationFailure>,
    pub collisions: Vec<NamingCollision>,
    pub folder_renames: Vec<PendingFolderRename>,
    pub unresolved: Vec<FolderRenameFailure>,
    /// Filled only in dry-run mode.
    pub planned: Vec<ReorgPlan>,
    pub cancelled: bool,
}

impl SortReport {
    /// A run fails only when a folder rename is still unresolved.
    pub fn is_success(&self) -> bool {
        self.unresolved.is_empty()
    }
}

impl SortEngine<DicomReader> {
    pub fn new(config: SortConfig) -> Self {
        Self::with_reader(config, DicomReader)
    }
}

impl<R: MetadataReader> SortEngine<R> {
    pub fn with_reader(config: SortConfig, reader: R) -> Self {
        Self {
            config,
            reader,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Reconcile every directory under `root`:
    /// 1. Snapshot the directory tree
    /// 2. Per directory: extract, group, name, then apply the plan on the worker pool
    /// 3. Apply deferred folder renames, with a second pass for failures
    pub fn run(&self, root: &Path, reporter: &dyn ProgressReporter) -> Result<SortReport, Error> {
        self.config.validate()?;
        if !root.is_dir() {
            return Err(Error::RootNotFound(root.to_path_buf()));
        }

        let start = Instant::now();
        let pool = self.build_pool()?;

        let directories = scanner::collect_directories(root, &self.config.ignore_patterns);
        reporter.on_walk_complete(directories.len());
        info!(
            "Found {} directories under {}",
            directories.len(),
            root.display()
        );

        let mut report = SortReport::default();
        let mut coordinator = RetryCoordinator::new(self.config.rename_attempts);
        let total = directories.len();

        for (index, dir) in directories.iter().enumerate() {
            if self.cancel.is_cancelled() {
                info!("Cancelled after {} of {} directories", index, total);
                report.cancelled = true;
                break;
            }
            reporter.on_directory_start(index, total, dir);
            report.directories_visited += 1;
            self.process_directory(&pool, dir, &mut report, &mut coordinator, reporter);
        }

        let pending = coordinator.pending().len();
        if pending > 0 {
            if self.config.settle_delay_ms > 0 {
                thread::sleep(Duration::from_millis(self.config.settle_delay_ms));
            }
            reporter.on_rename_phase_start(pending);
            let renames = coordinator.finish();
            reporter.on_rename_phase_complete(renames.renamed.len(), renames.unresolved.len());
            report.folder_renames = renames.renamed;
            report.unresolved = renames.unresolved;
        }

        report.duration = start.elapsed();
        debug!(
            "Run completed in {:.2}s: {} reorganized, {} files moved, {} unresolved renames",
            report.duration.as_secs_f64(),
            report.directories_reorganized,
            report.files_moved,
            report.unresolved.len(),
        );
        Ok(report)
    }

    /// Directories under `root` whose file listing is not in canonical form. Read-only.
    pub fn unsorted_directories(&self, root: &Path) -> Result<Vec<PathBuf>, Error> {
        if !root.is_dir() {
            return Err(Error::RootNotFound(root.to_path_buf()));
        }
        let mut unsorted = Vec::new();
        for dir in scanner::collect_directories(root, &self.config.ignore_patterns) {
            match scanner::list_files(&dir) {
                Ok(files) if !sorted::is_sorted(file_names(&files)) => unsorted.push(dir),
                Ok(_) => {}
                Err(e) => warn!("Cannot list {}: {}", dir.display(), e),
            }
        }
        Ok(unsorted)
    }

    fn build_pool(&self) -> Result<ThreadPool, Error> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.config.workers)
            .thread_name(|i| format!("dcmsort-worker-{}", i))
            .build()?;
        Ok(pool)
    }

    fn process_directory(
        &self,
        pool: &ThreadPool,
        dir: &Path,
        report: &mut SortReport,
        coordinator: &mut RetryCoordinator,
        reporter: &dyn ProgressReporter,
    ) {
        let files = match scanner::list_files(dir) {
            Ok(files) => files,
            Err(e) => {
                warn!("Cannot list {}: {}", dir.display(), e);
                return;
            }
        };

        if sorted::is_sorted(file_names(&files)) {
            report.directories_already_sorted += 1;
            return;
        }

        let extraction = extract::extract(pool, &self.reader, &files);
        report.unrecognized_files += extraction.unrecognized;
        if extraction.records.is_empty() {
            debug!("No images in {}", dir.display());
            return;
        }

        let grouped = grouper::group(extraction.records);
        let plan = namer::assign(dir, &grouped);

        for collision in &plan.collisions {
            warn!("Naming collision in {}: {}", dir.display(), collision);
        }
        report.collisions.extend(plan.collisions.iter().cloned());

        if plan.is_noop() {
            debug!("Nothing to change in {}", dir.display());
            return;
        }

        info!("Sorting {}", dir.display());

        if self.config.dry_run {
            report.planned.push(plan);
            return;
        }

        let outcome = reorg::apply(pool, &plan);
        reporter.on_directory_sorted(dir, outcome.moved, outcome.failures.len());
        report.files_moved += outcome.moved;
        report.directories_reorganized += 1;
        report.mutation_failures.extend(outcome.failures);

        // Every move for this directory has returned by now.
        if let Some(rename) = plan.folder_rename {
            coordinator.enqueue(rename);
        }
    }
}

fn file_names(files: &[PathBuf]) -> Vec<String> {
    files
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect()
}
