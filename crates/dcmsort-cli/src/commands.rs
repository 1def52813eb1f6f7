use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "dcmsort")]
#[command(about = "Reorganize DICOM folders into one canonical folder per series", long_about = None)]
pub struct Cli {
    /// Log at debug level unless TRACING_LEVEL says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sort every directory under DIR into DCM####_PROTOCOL/IMAGE.####.#### form
    Sort {
        /// Root directory to reorganize
        #[arg(short, long)]
        dir: PathBuf,
        /// Show what would change without touching the filesystem
        #[arg(long)]
        dry_run: bool,
        /// Worker pool width
        #[arg(short, long)]
        workers: Option<usize>,
        /// Attempts per folder rename in each retry pass
        #[arg(long)]
        attempts: Option<u32>,
    },
    /// List directories that are not yet in canonical form
    Check {
        /// Root directory to inspect
        #[arg(short, long)]
        dir: PathBuf,
    },
    /// Print configuration values
    PrintConfig,
}
