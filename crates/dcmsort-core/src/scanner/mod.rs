pub mod walk;

pub use walk::{collect_directories, list_files};
