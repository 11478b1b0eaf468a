use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::application::RuntimeConfig;
use crate::checking::{SnapshotStore, StrategyTrait, TargetMatcher};
use crate::filesystem::{DirectoryEntry, DirectoryEntryEnumerator, FileTime};

/// Reports a change as soon as any target is newer than the database file.
///
/// Nothing is stored besides the database file's own last-write time, so
/// deletions and changes that leave timestamps alone go unnoticed. The scan
/// stops at the first newer entry and never visits the remaining targets.
#[derive(Debug)]
pub struct FastStrategy {
    config: Arc<RuntimeConfig>,
    matcher: TargetMatcher,
    store: SnapshotStore,
    database_time: FileTime,
}

impl FastStrategy {
    pub fn new(config: Arc<RuntimeConfig>) -> Self {
        Self {
            matcher: TargetMatcher::from(config.as_ref()),
            store: SnapshotStore::new(&config.database),
            database_time: 0,
            config,
        }
    }

    fn check_entry(&self, entry: &DirectoryEntry) -> bool {
        if self.matcher.is_target(entry) && entry.last_write_time() > self.database_time {
            debug!("'{}' is newer than the database", entry.path().display());
            return true;
        }

        self.matcher.descends_into(entry) && self.check_directory(&entry.path())
    }

    fn check_directory(&self, directory: &Path) -> bool {
        DirectoryEntryEnumerator::open(directory).any(|entry| self.check_entry(&entry))
    }
}

impl StrategyTrait for FastStrategy {
    async fn read_previous_state(&mut self) {
        self.database_time = self.store.last_write_time();
        debug!(
            "Database {} was last written at {}",
            self.store.path().display(),
            self.database_time
        );
    }

    fn check(&mut self) -> bool {
        self.config
            .targets
            .iter()
            .any(|target| self.check_entry(&DirectoryEntry::stat(target)))
    }

    async fn write_state(&self) {
        self.store.touch().await;
    }
}
