mod dicom;

pub use dicom::DicomReader;

use crate::error::ReadError;
use crate::model::Attributes;
use std::path::Path;

/// Source of per-file attributes. Shared across the worker pool.
pub trait MetadataReader: Send + Sync {
    fn read(&self, path: &Path) -> Result<Attributes, ReadError>;
}

