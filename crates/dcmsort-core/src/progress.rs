use std::path::Path;

/// Trait for reporting reconciliation progress.
///
/// The CLI implements it with indicatif; library callers can use [`SilentReporter`].
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_walk_complete(&self, _directories: usize) {}
    fn on_directory_start(&self, _index: usize, _total: usize, _path: &Path) {}
    fn on_directory_sorted(&self, _path: &Path, _moved: usize, _failed: usize) {}
    fn on_rename_phase_start(&self, _pending: usize) {}
    fn on_rename_phase_complete(&self, _renamed: usize, _unresolved: usize) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
