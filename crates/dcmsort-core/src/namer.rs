use crate::error::NamingCollision;
use crate::grouper::GroupedDirectory;
use crate::model::{FileMove, PendingFolderRename};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// One series: files are renamed in place and the directory itself is renamed.
    Flat,
    /// Several series: one subfolder per `(series_number, protocol_name)`.
    Split,
}

/// Everything a directory needs done to it, computed before anything is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorgPlan {
    pub directory: PathBuf,
    pub layout: Layout,
    pub folders_to_create: Vec<PathBuf>,
    pub moves: Vec<FileMove>,
    pub folder_rename: Option<PendingFolderRename>,
    pub collisions: Vec<NamingCollision>,
}

impl ReorgPlan {
    pub fn is_noop(&self) -> bool {
        self.moves.is_empty() && self.folder_rename.is_none()
    }
}

/// Last four decimal digits, zero padded.
pub fn zero_pad(n: i32) -> String {
    format!("{:04}", n.rem_euclid(10_000))
}

pub fn file_name(series_number: i32, instance_number: i32) -> String {
    format!(
        "IMAGE.{}.{}",
        zero_pad(series_number),
        zero_pad(instance_number)
    )
}

pub fn folder_name(series_number: i32, protocol_name: &str) -> String {
    format!(
        "DCM{}_{}",
        zero_pad(series_number),
        sanitize_component(protocol_name)
    )
}

fn sanitize_component(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .to_uppercase()
}

/// Compute the plan for `directory`. Pure: nothing on disk is read or written.
pub fn assign(directory: &Path, grouped: &GroupedDirectory) -> ReorgPlan {
    let layout = if grouped.is_single_series() {
        Layout::Flat
    } else {
        Layout::Split
    };

    let mut targets: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(grouped.record_count());
    for group in &grouped.groups {
        let parent = match layout {
            Layout::Flat => directory.to_path_buf(),
            Layout::Split => directory.join(folder_name(group.series_number, &group.protocol_name)),
        };
        for record in &group.records {
            let name = file_name(group.series_number, record.attributes.instance_number);
            targets.push((record.path.clone(), parent.join(name)));
        }
    }

    let mut claims: HashMap<&Path, Vec<&Path>> = HashMap::new();
    for (from, to) in &targets {
        claims.entry(to.as_path()).or_default().push(from.as_path());
    }

    let mut collisions: Vec<NamingCollision> = Vec::new();
    let mut moves: Vec<FileMove> = Vec::new();
    for (from, to) in &targets {
        let sources = &claims[to.as_path()];
        if sources.len() > 1 {
            if sources[0] == from.as_path() {
                collisions.push(NamingCollision {
                    destination: to.clone(),
                    sources: sources.iter().map(|p| p.to_path_buf()).collect(),
                });
            }
            continue;
        }
        if from != to {
            moves.push(FileMove {
                from: from.clone(),
                to: to.clone(),
            });
        }
    }

    let mut folders_to_create: Vec<PathBuf> = Vec::new();
    if layout == Layout::Split {
        for m in &moves {
            if let Some(folder) = m.to.parent() {
                if !folders_to_create.iter().any(|f| f == folder) {
                    folders_to_create.push(folder.to_path_buf());
                }
            }
        }
    }

    let folder_rename = match (layout, grouped.groups.first(), directory.parent()) {
        (Layout::Flat, Some(first), Some(parent)) => {
            let target = parent.join(folder_name(first.series_number, &first.protocol_name));
            (target != directory).then(|| PendingFolderRename {
                from: directory.to_path_buf(),
                to: target,
            })
        }
        _ => None,
    };

    ReorgPlan {
        directory: directory.to_path_buf(),
        layout,
        folders_to_create,
        moves,
        folder_rename,
        collisions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouper::group;
    use crate::model::{Attributes, DicomRecord};

    fn record(dir: &Path, name: &str, uid: &str, protocol: &str, series: i32, instance: i32) -> DicomRecord {
        DicomRecord::new(
            dir.join(name),
            Attributes {
                series_instance_uid: uid.into(),
                protocol_name: protocol.into(),
                series_number: series,
                instance_number: instance,
            },
        )
    }

    #[test]
    fn test_file_name_is_deterministic() {
        assert_eq!(file_name(3, 27), "IMAGE.0003.0027");
        assert_eq!(file_name(3, 27), file_name(3, 27));
        assert_eq!(file_name(0, 0), "IMAGE.0000.0000");
        assert_eq!(file_name(12345, 1), "IMAGE.2345.0001");
    }

    #[test]
    fn test_folder_name_uppercases_and_sanitizes() {
        assert_eq!(folder_name(7, "t1_mprage"), "DCM0007_T1_MPRAGE");
        assert_eq!(folder_name(2, " ax/cor: dwi "), "DCM0002_AX_COR_ DWI");
        assert_eq!(folder_name(1, ""), "DCM0001_");
    }

    #[test]
    fn test_single_series_gives_flat_plan_and_folder_rename() {
        let dir = Path::new("/data/patient/scan");
        let grouped = group(vec![
            record(dir, "b", "1.2.3", "t2_tse", 4, 2),
            record(dir, "a", "1.2.3", "t2_tse", 4, 1),
        ]);

        let plan = assign(dir, &grouped);

        assert_eq!(plan.layout, Layout::Flat);
        assert!(plan.folders_to_create.is_empty());
        assert_eq!(
            plan.moves,
            vec![
                FileMove { from: dir.join("a"), to: dir.join("IMAGE.0004.0001") },
                FileMove { from: dir.join("b"), to: dir.join("IMAGE.0004.0002") },
            ]
        );
        assert_eq!(
            plan.folder_rename,
            Some(PendingFolderRename {
                from: dir.to_path_buf(),
                to: PathBuf::from("/data/patient/DCM0004_T2_TSE"),
            })
        );
    }

    #[test]
    fn test_two_series_give_split_plan_without_parent_rename() {
        let dir = Path::new("/data/patient");
        let grouped = group(vec![
            record(dir, "x1", "1.1", "loc", 1, 1),
            record(dir, "x2", "1.2", "t1", 2, 1),
            record(dir, "x3", "1.2", "t1", 2, 2),
        ]);

        let plan = assign(dir, &grouped);

        assert_eq!(plan.layout, Layout::Split);
        assert_eq!(
            plan.folders_to_create,
            vec![dir.join("DCM0001_LOC"), dir.join("DCM0002_T1")]
        );
        assert_eq!(plan.moves.len(), 3);
        assert_eq!(plan.moves[2].to, dir.join("DCM0002_T1").join("IMAGE.0002.0002"));
        assert!(plan.folder_rename.is_none());
        assert!(plan.collisions.is_empty());
    }

    #[test]
    fn test_collisions_keep_every_source_in_place() {
        let dir = Path::new("/data/scan");
        let grouped = group(vec![
            record(dir, "dup1", "1.1", "t1", 1, 5),
            record(dir, "dup2", "1.1", "t1", 1, 5),
            record(dir, "ok", "1.1", "t1", 1, 6),
        ]);

        let plan = assign(dir, &grouped);

        assert_eq!(plan.collisions.len(), 1);
        assert_eq!(plan.collisions[0].destination, dir.join("IMAGE.0001.0005"));
        assert_eq!(plan.collisions[0].sources, vec![dir.join("dup1"), dir.join("dup2")]);
        assert_eq!(
            plan.moves,
            vec![FileMove { from: dir.join("ok"), to: dir.join("IMAGE.0001.0006") }]
        );
    }

    #[test]
    fn test_already_named_files_are_not_moved() {
        let dir = Path::new("/data/DCM0001_T1");
        let grouped = group(vec![
            record(dir, "IMAGE.0001.0001", "1.1", "t1", 1, 1),
            record(dir, "stray", "1.1", "t1", 1, 2),
        ]);

        let plan = assign(dir, &grouped);

        assert_eq!(
            plan.moves,
            vec![FileMove { from: dir.join("stray"), to: dir.join("IMAGE.0001.0002") }]
        );
        assert!(plan.folder_rename.is_none());
    }

    #[test]
    fn test_empty_grouping_is_noop() {
        let plan = assign(Path::new("/data/empty"), &GroupedDirectory::default());
        assert!(plan.is_noop());
    }
}
