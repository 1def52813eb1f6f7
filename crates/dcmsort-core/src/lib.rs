pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod grouper;
pub mod model;
pub mod namer;
pub mod progress;
pub mod reader;
pub mod reorg;
pub mod retry;
pub mod scanner;
pub mod sorted;

pub use config::SortConfig;
pub use engine::{CancelToken, SortEngine, SortReport};
pub use error::Error;
pub use model::{Attributes, DicomRecord};
pub use progress::{ProgressReporter, SilentReporter};
pub use reader::{DicomReader, MetadataReader};
