use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Hard failures that stop a run before or during the tree walk.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Worker pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Root directory not found: {}", .0.display())]
    RootNotFound(PathBuf),
}

/// Why a file was left out of grouping. Never fatal.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("cannot open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not a recognized DICOM file: {reason}", .path.display())]
    Unrecognized { path: PathBuf, reason: String },
}

/// A single file rename or move that did not happen. The source is left in place.
#[derive(Error, Debug)]
#[error("failed to move {} to {}: {error}", .from.display(), .to.display())]
pub struct MutationFailure {
    pub from: PathBuf,
    pub to: PathBuf,
    #[source]
    pub error: io::Error,
}

impl MutationFailure {
    pub fn kind(&self) -> io::ErrorKind {
        self.error.kind()
    }
}

/// A directory rename still failing after every retry pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to rename {} to {} after {attempts} attempts: {last_error}", .from.display(), .to.display())]
pub struct FolderRenameFailure {
    pub from: PathBuf,
    pub to: PathBuf,
    pub attempts: u32,
    pub last_error: String,
}

/// Two or more sources computed the same destination. All of them are kept where they are.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{} files resolve to {}", .sources.len(), .destination.display())]
pub struct NamingCollision {
    pub destination: PathBuf,
    pub sources: Vec<PathBuf>,
}
