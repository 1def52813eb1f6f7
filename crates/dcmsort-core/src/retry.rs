use crate::error::FolderRenameFailure;
use crate::model::PendingFolderRename;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameState {
    Pending,
    Attempting { attempt: u32 },
    Succeeded { attempts: u32 },
    Failed(FolderRenameFailure),
}

/// One directory rename driven through `Pending -> Attempting -> {Succeeded, Failed}`.
#[derive(Debug, Clone)]
pub struct RenameTask {
    pub rename: PendingFolderRename,
    pub state: RenameState,
}

impl RenameTask {
    pub fn new(rename: PendingFolderRename) -> Self {
        Self {
            rename,
            state: RenameState::Pending,
        }
    }

    /// Try up to `max_attempts` times with `rename_fn`. A destination that already
    /// exists counts as a failed attempt. Returns the number of attempts on success.
    pub fn drive<F>(
        &mut self,
        max_attempts: u32,
        mut rename_fn: F,
    ) -> Result<u32, FolderRenameFailure>
    where
        F: FnMut(&Path, &Path) -> io::Result<()>,
    {
        let from = self.rename.from.as_path();
        let to = self.rename.to.as_path();
        let mut last_error = String::from("no attempt made");

        for attempt in 1..=max_attempts {
            self.state = RenameState::Attempting { attempt };

            let result = if to.exists() {
                Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "destination already exists",
                ))
            } else {
                rename_fn(from, to)
            };

            match result {
                Ok(()) => {
                    self.state = RenameState::Succeeded { attempts: attempt };
                    return Ok(attempt);
                }
                Err(e) => {
                    debug!(
                        "Rename attempt {} of {} -> {} failed: {}",
                        attempt,
                        from.display(),
                        to.display(),
                        e
                    );
                    last_error = e.to_string();
                }
            }
        }

        let failure = FolderRenameFailure {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            attempts: max_attempts,
            last_error,
        };
        self.state = RenameState::Failed(failure.clone());
        Err(failure)
    }

    /// Point this task at the new location of a directory that was renamed above it.
    fn rebase(&mut self, done: &PendingFolderRename) {
        for path in [&mut self.rename.from, &mut self.rename.to] {
            let moved = path.strip_prefix(&done.from).ok().map(|rest| done.to.join(rest));
            if let Some(moved) = moved {
                *path = moved;
            }
        }
    }
}

fn rebase_all(tasks: &mut [RenameTask], done: &PendingFolderRename) {
    for task in tasks {
        task.rebase(done);
    }
}

/// `fs::rename` with bounded retry.
pub fn rename_with_retry(
    from: &Path,
    to: &Path,
    max_attempts: u32,
) -> Result<u32, FolderRenameFailure> {
    let mut task = RenameTask::new(PendingFolderRename {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
    });
    task.drive(max_attempts, |a, b| fs::rename(a, b))
}

/// Final state of the folder-rename phase.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RetryReport {
    pub renamed: Vec<PendingFolderRename>,
    pub unresolved: Vec<FolderRenameFailure>,
}

/// Collects folder renames during the walk and applies them in two passes afterwards.
///
/// The queue is append-only until [`RetryCoordinator::finish_with`] drains it.
#[derive(Debug)]
pub struct RetryCoordinator {
    max_attempts: u32,
    pending: Vec<PendingFolderRename>,
}

impl RetryCoordinator {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            pending: Vec::new(),
        }
    }

    pub fn enqueue(&mut self, rename: PendingFolderRename) {
        self.pending.push(rename);
    }

    pub fn pending(&self) -> &[PendingFolderRename] {
        &self.pending
    }

    pub fn finish(self) -> RetryReport {
        self.finish_with(|a, b| fs::rename(a, b))
    }

    /// Run both passes with a caller-supplied rename. Deepest paths go first so a
    /// parent rename never invalidates a child still waiting in the queue.
    pub fn finish_with<F>(mut self, mut rename_fn: F) -> RetryReport
    where
        F: FnMut(&Path, &Path) -> io::Result<()>,
    {
        self.pending
            .sort_by(|a, b| b.depth().cmp(&a.depth()).then_with(|| a.from.cmp(&b.from)));

        let mut report = RetryReport::default();
        let mut deferred: Vec<RenameTask> = Vec::new();

        for rename in self.pending {
            let mut task = RenameTask::new(rename);
            match task.drive(self.max_attempts, &mut rename_fn) {
                Ok(_) => {
                    // Children that failed were queued first and may live under this one.
                    rebase_all(&mut deferred, &task.rename);
                    report.renamed.push(task.rename);
                }
                Err(_) => {
                    warn!(
                        "Deferring rename of {} to {}",
                        task.rename.from.display(),
                        task.rename.to.display()
                    );
                    deferred.push(task);
                }
            }
        }

        if !deferred.is_empty() {
            info!("Retrying {} folder renames", deferred.len());
        }

        for i in 0..deferred.len() {
            let (current, rest) = deferred[i..].split_at_mut(1);
            let task = &mut current[0];
            task.state = RenameState::Pending;
            match task.drive(self.max_attempts, &mut rename_fn) {
                Ok(_) => {
                    rebase_all(rest, &task.rename);
                    report.renamed.push(task.rename.clone());
                }
                Err(failure) => {
                    warn!("{}", failure);
                    report.unresolved.push(failure);
                }
            }
        }

        report
    }
}
