use crate::model::DicomRecord;
use crate::reader::MetadataReader;
use rayon::prelude::*;
use rayon::ThreadPool;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Result of reading one directory's files.
#[derive(Debug, Default)]
pub struct Extraction {
    /// Recognized files, in the same order as the input paths.
    pub records: Vec<DicomRecord>,
    pub unrecognized: usize,
}

/// Fan `paths` out to `reader` on `pool` and block until every path is resolved.
///
/// Unreadable files are dropped. A reader that panics on one path only loses that path.
pub fn extract<R>(pool: &ThreadPool, reader: &R, paths: &[PathBuf]) -> Extraction
where
    R: MetadataReader + ?Sized,
{
    let results: Vec<Option<DicomRecord>> = pool.install(|| {
        paths
            .par_iter()
            .map(|path| {
                match panic::catch_unwind(AssertUnwindSafe(|| reader.read(path))) {
                    Ok(Ok(attributes)) => Some(DicomRecord::new(path.clone(), attributes)),
                    Ok(Err(e)) => {
                        debug!("Skipping {}", e);
                        None
                    }
                    Err(_) => {
                        warn!("Metadata reader panicked on {}", path.display());
                        None
                    }
                }
            })
            .collect()
    });

    let total = results.len();
    let records: Vec<DicomRecord> = results.into_iter().flatten().collect();
    Extraction {
        unrecognized: total - records.len(),
        records,
    }
}
