use std::path::PathBuf;
use std::sync::Arc;

use bincode::{Decode, Encode};
use hashlink::LinkedHashMap;
use tracing::debug;

use crate::application::RuntimeConfig;
use crate::checking::{Snapshot, SnapshotStore, StrategyTrait, TargetMatcher, magic_tag};
use crate::filesystem::{
    DirectoryEntry, DirectoryEntryEnumerator, FileSize, FileTime, path_from_bytes, path_to_bytes,
};

/// Aggregate over the matched immediate children of one directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
pub struct DirSummary {
    pub file_count: u32,
    pub total_size: FileSize,
    pub latest_write_time: FileTime,
}

impl DirSummary {
    pub fn add(&mut self, entry: &DirectoryEntry) {
        self.file_count = self.file_count.saturating_add(1);
        self.total_size = self.total_size.saturating_add(entry.size());
        self.latest_write_time = self.latest_write_time.max(entry.last_write_time());
    }
}

#[derive(Debug, Default, PartialEq, Encode, Decode)]
struct DirSummarySnapshot {
    top_level: DirSummary,
    directories: Vec<(Vec<u8>, DirSummary)>,
}

impl Snapshot for DirSummarySnapshot {
    const MAGIC: u32 = magic_tag(*b"dfc1");
}

/// Compares per-directory summaries instead of individual entries.
///
/// The command-line targets themselves are summarized together, as if they
/// were the children of one synthetic directory. Replacing a file with another
/// of the same size and time leaves every summary unchanged and is not reported.
#[derive(Debug)]
pub struct DirSummaryStrategy {
    config: Arc<RuntimeConfig>,
    matcher: TargetMatcher,
    store: SnapshotStore,
    top_level: DirSummary,
    directories: LinkedHashMap<PathBuf, DirSummary>,
    previous_top_level: DirSummary,
    previous_directories: LinkedHashMap<PathBuf, DirSummary>,
    changed: bool,
}

impl DirSummaryStrategy {
    pub fn new(config: Arc<RuntimeConfig>) -> Self {
        Self {
            matcher: TargetMatcher::from(config.as_ref()),
            store: SnapshotStore::new(&config.database),
            top_level: DirSummary::default(),
            directories: LinkedHashMap::new(),
            previous_top_level: DirSummary::default(),
            previous_directories: LinkedHashMap::new(),
            changed: false,
            config,
        }
    }

    fn check_top_level_entry(&mut self, entry: &DirectoryEntry) {
        if self.matcher.is_target(entry) {
            self.top_level.add(entry);
        }
        self.check_entry(entry);
    }

    fn check_entry(&mut self, entry: &DirectoryEntry) {
        if self.matcher.descends_into(entry) {
            self.check_directory(entry.path());
        }
    }

    fn check_directory(&mut self, directory: PathBuf) {
        if self.directories.contains_key(&directory) {
            debug!("Directory '{}' was already summarized", directory.display());
            return;
        }

        let mut summary = DirSummary::default();
        for entry in DirectoryEntryEnumerator::open(&directory) {
            self.check_entry(&entry);
            if self.matcher.is_target(&entry) {
                summary.add(&entry);
            }
        }

        match self.previous_directories.remove(&directory) {
            None => {
                debug!("New directory '{}'", directory.display());
                self.changed = true;
            }
            Some(previous) if previous != summary => {
                debug!(
                    "Directory '{}' changed: {:?} -> {:?}",
                    directory.display(),
                    previous,
                    summary
                );
                self.changed = true;
            }
            Some(_) => {}
        }
        self.directories.insert(directory, summary);
    }
}

impl StrategyTrait for DirSummaryStrategy {
    async fn read_previous_state(&mut self) {
        let snapshot: DirSummarySnapshot = self.store.load().await;
        debug!(
            "Loaded {} directory summaries",
            snapshot.directories.len()
        );
        self.previous_top_level = snapshot.top_level;
        self.previous_directories = snapshot
            .directories
            .into_iter()
            .map(|(directory, summary)| (path_from_bytes(directory), summary))
            .collect();
    }

    fn check(&mut self) -> bool {
        let config = self.config.clone();
        for target in &config.targets {
            self.check_top_level_entry(&DirectoryEntry::stat(target));
        }

        if self.top_level != self.previous_top_level {
            debug!(
                "Top-level targets changed: {:?} -> {:?}",
                self.previous_top_level, self.top_level
            );
            self.changed = true;
        }
        if !self.previous_directories.is_empty() {
            for directory in self.previous_directories.keys() {
                debug!("Directory '{}' is gone", directory.display());
            }
            self.changed = true;
        }
        self.changed
    }

    async fn write_state(&self) {
        let snapshot = DirSummarySnapshot {
            top_level: self.top_level,
            directories: self
                .directories
                .iter()
                .map(|(directory, summary)| (path_to_bytes(directory), *summary))
                .collect(),
        };
        self.store.save(&snapshot).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checking::snapshot::{decode, encode};
    use crate::checking::test_support::{
        NANOS_PER_SECOND, Workspace, run_once, set_modified, write_file,
    };
    use crate::filesystem::FileType;
    use std::fs;

    fn strategy(workspace: &Workspace) -> DirSummaryStrategy {
        DirSummaryStrategy::new(workspace.config(&[workspace.src()], true, false, &[".c"]))
    }

    async fn stored_snapshot(workspace: &Workspace) -> DirSummarySnapshot {
        SnapshotStore::new(workspace.database())
            .try_load()
            .await
            .expect("Failed to load database")
    }

    #[test]
    fn test_summary_aggregates_count_size_and_latest_time() {
        let mut summary = DirSummary::default();
        summary.add(&DirectoryEntry::new("/d", "a.c", FileType::RegularFile, 10, 1000));
        summary.add(&DirectoryEntry::new("/d", "b.c", FileType::RegularFile, 5, 2000));
        summary.add(&DirectoryEntry::new("/d", "c.c", FileType::RegularFile, 1, 1500));

        assert_eq!(
            summary,
            DirSummary {
                file_count: 3,
                total_size: 16,
                latest_write_time: 2000,
            }
        );
    }

    #[test]
    fn test_snapshot_round_trip() {
        let snapshot = DirSummarySnapshot {
            top_level: DirSummary {
                file_count: 1,
                total_size: 42,
                latest_write_time: u64::MAX,
            },
            directories: vec![
                (b"/proj/src".to_vec(), DirSummary { file_count: 2, total_size: 15, latest_write_time: 2000 }),
                ("/proj/src/тест".as_bytes().to_vec(), DirSummary::default()),
            ],
        };

        let bytes = encode(&snapshot).expect("Failed to encode");

        assert_eq!(&bytes[0..4], b"dfc1");
        assert_eq!(&bytes[4..8], &1u32.to_le_bytes());
        assert_eq!(&bytes[8..16], &42u64.to_le_bytes());
        assert_eq!(&bytes[24..32], &2u64.to_le_bytes());
        assert_eq!(&bytes[32..40], &9u64.to_le_bytes());
        assert_eq!(&bytes[40..49], b"/proj/src");
        assert_eq!(decode::<DirSummarySnapshot>(&bytes).expect("Failed to decode"), snapshot);
    }

    #[compio::test]
    async fn test_first_run_reports_change_and_second_does_not() {
        let workspace = Workspace::new();
        write_file(&workspace.src().join("a.c"), 10, 1000);

        assert!(run_once(strategy(&workspace)).await);
        assert!(!run_once(strategy(&workspace)).await);
    }

    #[compio::test]
    async fn test_added_file_changes_directory_summary() {
        let workspace = Workspace::new();
        write_file(&workspace.src().join("a.c"), 10, 1000);
        assert!(run_once(strategy(&workspace)).await);

        write_file(&workspace.src().join("b.c"), 5, 2000);

        assert!(run_once(strategy(&workspace)).await);
        let snapshot = stored_snapshot(&workspace).await;
        assert_eq!(
            snapshot.directories,
            vec![(
                path_to_bytes(&workspace.src()),
                DirSummary {
                    file_count: 2,
                    total_size: 15,
                    latest_write_time: 2000 * NANOS_PER_SECOND,
                }
            )]
        );
    }

    #[compio::test]
    async fn test_change_in_one_nested_directory_is_detected() {
        let workspace = Workspace::new();
        let first = workspace.src().join("first");
        let second = workspace.src().join("second");
        fs::create_dir(&first).expect("Failed to create first");
        fs::create_dir(&second).expect("Failed to create second");
        write_file(&first.join("a.c"), 10, 1000);
        write_file(&second.join("b.c"), 10, 1000);
        assert!(run_once(strategy(&workspace)).await);
        assert!(!run_once(strategy(&workspace)).await);

        write_file(&second.join("b.c"), 11, 1000);

        assert!(run_once(strategy(&workspace)).await);
    }

    #[compio::test]
    async fn test_same_size_and_time_replacement_is_not_detected() {
        let workspace = Workspace::new();
        write_file(&workspace.src().join("a.c"), 100, 3000);
        assert!(run_once(strategy(&workspace)).await);

        fs::remove_file(workspace.src().join("a.c")).expect("Failed to remove a.c");
        write_file(&workspace.src().join("b.c"), 100, 3000);

        assert!(!run_once(strategy(&workspace)).await);
    }

    #[compio::test]
    async fn test_removed_directory_is_detected() {
        let workspace = Workspace::new();
        let nested = workspace.src().join("nested");
        fs::create_dir(&nested).expect("Failed to create nested");
        write_file(&workspace.src().join("a.c"), 10, 1000);
        assert!(run_once(strategy(&workspace)).await);

        fs::remove_dir(&nested).expect("Failed to remove nested");

        assert!(run_once(strategy(&workspace)).await);
        assert!(!run_once(strategy(&workspace)).await);
    }

    #[compio::test]
    async fn test_top_level_targets_are_summarized_together() {
        let workspace = Workspace::new();
        let a = workspace.src().join("a.c");
        let b = workspace.src().join("b.c");
        write_file(&a, 10, 1000);
        write_file(&b, 10, 1000);
        let both = workspace.config(&[a.clone(), b.clone()], false, false, &[]);
        let swapped = workspace.config(&[b.clone(), a.clone()], false, false, &[]);
        let only_a = workspace.config(&[a.clone()], false, false, &[]);
        assert!(run_once(DirSummaryStrategy::new(both)).await);

        assert!(!run_once(DirSummaryStrategy::new(swapped)).await);
        assert!(run_once(DirSummaryStrategy::new(only_a)).await);
        let snapshot = stored_snapshot(&workspace).await;
        assert_eq!(snapshot.top_level.file_count, 1);
        assert!(snapshot.directories.is_empty());
    }

    #[compio::test]
    async fn test_overlapping_targets_stay_idempotent() {
        let workspace = Workspace::new();
        let nested = workspace.src().join("nested");
        fs::create_dir(&nested).expect("Failed to create nested");
        write_file(&nested.join("a.c"), 10, 1000);
        let config = workspace.config(&[workspace.src(), nested.clone()], true, false, &[".c"]);

        assert!(run_once(DirSummaryStrategy::new(config.clone())).await);
        assert!(!run_once(DirSummaryStrategy::new(config)).await);
        assert_eq!(stored_snapshot(&workspace).await.directories.len(), 2);
    }

    #[compio::test]
    async fn test_damaged_database_is_treated_as_first_run() {
        let workspace = Workspace::new();
        write_file(&workspace.src().join("a.c"), 10, 1000);
        assert!(run_once(strategy(&workspace)).await);

        let bytes = fs::read(workspace.database()).expect("Failed to read database");
        fs::write(workspace.database(), &bytes[..bytes.len() - 3]).expect("Failed to truncate");

        assert!(run_once(strategy(&workspace)).await);
        assert!(!run_once(strategy(&workspace)).await);
    }

    #[compio::test]
    async fn test_included_directories_count_in_parent_summary() {
        let workspace = Workspace::new();
        let nested = workspace.src().join("nested");
        fs::create_dir(&nested).expect("Failed to create nested");
        write_file(&workspace.src().join("a.c"), 10, 1000);
        set_modified(&nested, 1000);
        let config = workspace.config(&[workspace.src()], true, true, &[".c"]);
        assert!(run_once(DirSummaryStrategy::new(config.clone())).await);
        assert!(!run_once(DirSummaryStrategy::new(config.clone())).await);

        let snapshot = stored_snapshot(&workspace).await;
        assert_eq!(snapshot.top_level.file_count, 1);
        let (_, summary) = snapshot
            .directories
            .iter()
            .find(|(directory, _)| *directory == path_to_bytes(&workspace.src()))
            .expect("Expected src to be summarized");
        assert_eq!(summary.file_count, 2);
        assert_eq!(summary.latest_write_time, 1000 * NANOS_PER_SECOND);

        set_modified(&nested, 2000);

        assert!(run_once(DirSummaryStrategy::new(config)).await);
    }

    #[compio::test]
    async fn test_oversized_directory_count_is_treated_as_first_run() {
        let workspace = Workspace::new();
        write_file(&workspace.src().join("a.c"), 10, 1000);
        let mut bytes = b"dfc1".to_vec();
        bytes.extend([0u8; 20]);
        bytes.extend(u64::MAX.to_le_bytes());
        fs::write(workspace.database(), bytes).expect("Failed to write database");

        assert!(run_once(strategy(&workspace)).await);
        assert!(!run_once(strategy(&workspace)).await);
    }

    #[cfg(target_os = "linux")]
    #[compio::test]
    async fn test_non_utf8_directories_are_summarized_separately() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let workspace = Workspace::new();
        let first = workspace.src().join(OsStr::from_bytes(b"d\xff"));
        let second = workspace.src().join(OsStr::from_bytes(b"d\xfe"));
        fs::create_dir(&first).expect("Failed to create first");
        fs::create_dir(&second).expect("Failed to create second");
        write_file(&first.join("a.c"), 10, 1000);
        write_file(&second.join("a.c"), 10, 1000);
        assert!(run_once(strategy(&workspace)).await);
        assert!(!run_once(strategy(&workspace)).await);
        assert_eq!(stored_snapshot(&workspace).await.directories.len(), 3);

        write_file(&first.join("b.c"), 5, 2000);

        assert!(run_once(strategy(&workspace)).await);
    }
}
