use std::path::PathBuf;

/// The identifying attributes pulled from one image file.
/// Missing strings are empty and missing numbers are zero so grouping stays total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Attributes {
    pub series_instance_uid: String,
    pub protocol_name: String,
    pub series_number: i32,
    pub instance_number: i32,
}

/// A recognized file and its attributes, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DicomRecord {
    pub path: PathBuf,
    pub attributes: Attributes,
}

impl DicomRecord {
    pub fn new(path: impl Into<PathBuf>, attributes: Attributes) -> Self {
        Self {
            path: path.into(),
            attributes,
        }
    }
}

/// A file-level rename or move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMove {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// A directory rename deferred until the file phase of that directory is complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFolderRename {
    pub from: PathBuf,
    pub to: PathBuf,
}

impl PendingFolderRename {
    pub fn depth(&self) -> usize {
        self.from.components().count()
    }
}
