use dcmsort_core::ProgressReporter;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

const TICKS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// CLI progress reporter using indicatif.
///
/// - Directory phase: progress bar over the directory snapshot
/// - Folder-rename phase: spinner
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.take() {
                old.finish_and_clear();
            }
            *guard = Some(pb);
        }
    }

    fn finish_bar(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                f(pb);
            }
        }
    }
}

impl ProgressReporter for CliReporter {
    fn on_walk_complete(&self, directories: usize) {
        let pb = ProgressBar::new(directories as u64);
        if let Ok(style) = ProgressStyle::with_template(
            "  {spinner:.cyan} Sorting [{bar:30.cyan/dim}] {pos}/{len} dirs {wide_msg}",
        ) {
            pb.set_style(style.progress_chars("━╸─").tick_chars(TICKS));
        }
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_directory_start(&self, index: usize, _total: usize, path: &Path) {
        self.with_bar(|pb| {
            pb.set_position(index as u64);
            pb.set_message(path.display().to_string());
        });
    }

    fn on_directory_sorted(&self, path: &Path, moved: usize, failed: usize) {
        self.with_bar(|pb| {
            if failed > 0 {
                pb.println(format!(
                    "  \x1b[33m!\x1b[0m {}: {} moved, {} failed",
                    path.display(),
                    moved,
                    failed
                ));
            }
        });
    }

    fn on_rename_phase_start(&self, pending: usize) {
        self.finish_bar();
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            pb.set_style(style.tick_chars(TICKS));
        }
        pb.set_message(format!("Renaming {} folders...", pending));
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_rename_phase_complete(&self, renamed: usize, unresolved: usize) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Folder renames: {} done, {} unresolved",
            renamed, unresolved
        );
    }
}

impl Drop for CliReporter {
    fn drop(&mut self) {
        self.finish_bar();
    }
}
