use crate::error::MutationFailure;
use crate::model::FileMove;
use crate::namer::ReorgPlan;
use rayon::prelude::*;
use rayon::ThreadPool;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, error, warn};

/// What happened when a plan was applied. Returned only once every move has finished.
#[derive(Debug, Default)]
pub struct ApplyOutcome {
    pub folders_created: usize,
    pub moved: usize,
    pub failures: Vec<MutationFailure>,
}

impl ApplyOutcome {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Create the plan's folders, then run its moves on `pool`.
///
/// Per-file failures are collected and never stop sibling moves.
pub fn apply(pool: &ThreadPool, plan: &ReorgPlan) -> ApplyOutcome {
    let mut outcome = ApplyOutcome::default();

    for folder in &plan.folders_to_create {
        match ensure_folder(folder) {
            Ok(true) => outcome.folders_created += 1,
            Ok(false) => {}
            Err(e) => warn!("Cannot create folder {}: {}", folder.display(), e),
        }
    }

    let results: Vec<Result<(), MutationFailure>> =
        pool.install(|| plan.moves.par_iter().map(move_file).collect());

    for result in results {
        match result {
            Ok(()) => outcome.moved += 1,
            Err(failure) => {
                error!("{}", failure);
                outcome.failures.push(failure);
            }
        }
    }

    outcome
}

/// Returns `Ok(true)` if the folder was created, `Ok(false)` if it was already there.
fn ensure_folder(folder: &Path) -> io::Result<bool> {
    match fs::create_dir(folder) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && folder.is_dir() => Ok(false),
        Err(e) => Err(e),
    }
}

/// Rename `m.from` to `m.to`, refusing to replace an existing destination.
///
/// A hard link claims the destination atomically, then the source name is dropped.
/// Filesystems without hard links fall back to check-then-rename, which can still race
/// with another process creating the destination in between.
pub fn move_file(m: &FileMove) -> Result<(), MutationFailure> {
    let fail = |error: io::Error| MutationFailure {
        from: m.from.clone(),
        to: m.to.clone(),
        error,
    };

    match fs::hard_link(&m.from, &m.to) {
        Ok(()) => {
            if let Err(e) = fs::remove_file(&m.from) {
                // Leave the tree as it was: one name, at the source.
                if let Err(undo) = fs::remove_file(&m.to) {
                    warn!("Cannot remove link {}: {}", m.to.display(), undo);
                }
                return Err(fail(e));
            }
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Err(fail(e)),
        Err(e) => {
            debug!("Hard link unavailable for {}: {}", m.from.display(), e);
            if fs::symlink_metadata(&m.to).is_ok() {
                return Err(fail(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "destination already exists",
                )));
            }
            fs::rename(&m.from, &m.to).map_err(fail)?;
        }
    }

    debug!("Moved {} -> {}", m.from.display(), m.to.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namer::Layout;
    use rayon::ThreadPoolBuilder;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn split_plan(dir: &Path, moves: Vec<FileMove>) -> ReorgPlan {
        let mut folders_to_create: Vec<PathBuf> = Vec::new();
        for m in &moves {
            let folder = m.to.parent().unwrap().to_path_buf();
            if !folders_to_create.contains(&folder) {
                folders_to_create.push(folder);
            }
        }
        ReorgPlan {
            directory: dir.to_path_buf(),
            layout: Layout::Split,
            folders_to_create,
            moves,
            folder_rename: None,
            collisions: Vec::new(),
        }
    }

    #[test]
    fn test_apply_creates_folders_then_moves() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path();
        fs::write(dir.join("a"), "a").unwrap();
        fs::write(dir.join("b"), "b").unwrap();
        fs::create_dir(dir.join("DCM0002_T2")).unwrap();

        let plan = split_plan(
            dir,
            vec![
                FileMove { from: dir.join("a"), to: dir.join("DCM0001_T1/IMAGE.0001.0001") },
                FileMove { from: dir.join("b"), to: dir.join("DCM0002_T2/IMAGE.0002.0001") },
            ],
        );
        let pool = ThreadPoolBuilder::new().num_threads(2).build().unwrap();

        let outcome = apply(&pool, &plan);

        assert!(outcome.is_clean());
        assert_eq!(outcome.folders_created, 1);
        assert_eq!(outcome.moved, 2);
        assert_eq!(fs::read_to_string(dir.join("DCM0001_T1/IMAGE.0001.0001")).unwrap(), "a");
        assert_eq!(fs::read_to_string(dir.join("DCM0002_T2/IMAGE.0002.0001")).unwrap(), "b");
    }

    #[test]
    fn test_one_failed_move_does_not_stop_siblings() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path();
        for name in ["a", "b", "c"] {
            fs::write(dir.join(name), name).unwrap();
        }
        fs::create_dir(dir.join("DCM0001_T1")).unwrap();
        fs::write(dir.join("DCM0001_T1/IMAGE.0001.0002"), "occupied").unwrap();

        let plan = split_plan(
            dir,
            vec![
                FileMove { from: dir.join("a"), to: dir.join("DCM0001_T1/IMAGE.0001.0001") },
                FileMove { from: dir.join("b"), to: dir.join("DCM0001_T1/IMAGE.0001.0002") },
                FileMove { from: dir.join("c"), to: dir.join("DCM0001_T1/IMAGE.0001.0003") },
            ],
        );
        let pool = ThreadPoolBuilder::new().num_threads(3).build().unwrap();

        let outcome = apply(&pool, &plan);

        assert_eq!(outcome.moved, 2);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].from, dir.join("b"));
        assert_eq!(outcome.failures[0].kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(dir.join("b")).unwrap(), "b");
        assert_eq!(
            fs::read_to_string(dir.join("DCM0001_T1/IMAGE.0001.0002")).unwrap(),
            "occupied"
        );
        assert!(dir.join("DCM0001_T1/IMAGE.0001.0003").exists());
    }

    #[test]
    fn test_move_leaves_single_name_at_destination() {
        let tmp = tempdir().unwrap();
        let from = tmp.path().join("slice");
        fs::write(&from, "pixels").unwrap();
        let m = FileMove {
            from: from.clone(),
            to: tmp.path().join("IMAGE.0001.0001"),
        };

        move_file(&m).unwrap();

        assert!(!from.exists());
        assert_eq!(fs::read_to_string(&m.to).unwrap(), "pixels");
    }

    #[test]
    fn test_existing_destination_is_never_replaced() {
        let tmp = tempdir().unwrap();
        let from = tmp.path().join("slice");
        let to = tmp.path().join("IMAGE.0001.0001");
        fs::write(&from, "new").unwrap();
        fs::write(&to, "old").unwrap();

        let failure = move_file(&FileMove { from: from.clone(), to: to.clone() }).unwrap_err();

        assert_eq!(failure.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(&from).unwrap(), "new");
        assert_eq!(fs::read_to_string(&to).unwrap(), "old");
    }

    #[test]
    fn test_missing_source_is_reported() {
        let tmp = tempdir().unwrap();
        let m = FileMove {
            from: tmp.path().join("vanished"),
            to: tmp.path().join("IMAGE.0001.0001"),
        };
        let failure = move_file(&m).unwrap_err();
        assert_eq!(failure.kind(), io::ErrorKind::NotFound);
    }
}
