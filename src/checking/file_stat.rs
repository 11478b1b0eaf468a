use std::path::PathBuf;
use std::sync::Arc;

use bincode::{Decode, Encode};
use hashlink::LinkedHashMap;
use tracing::debug;

use crate::application::RuntimeConfig;
use crate::checking::{Snapshot, SnapshotStore, StrategyTrait, TargetMatcher, magic_tag};
use crate::filesystem::{
    DirectoryEntry, DirectoryEntryEnumerator, FileSize, FileTime, FileType, path_from_bytes,
    path_to_bytes,
};

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
struct EntryRecord {
    path: Vec<u8>,
    file_type: FileType,
    size: FileSize,
    last_write_time: FileTime,
}

impl From<&DirectoryEntry> for EntryRecord {
    fn from(entry: &DirectoryEntry) -> Self {
        Self {
            path: path_to_bytes(&entry.path()),
            file_type: entry.file_type(),
            size: entry.size(),
            last_write_time: entry.last_write_time(),
        }
    }
}

impl From<EntryRecord> for DirectoryEntry {
    fn from(record: EntryRecord) -> Self {
        DirectoryEntry::from_path(
            &path_from_bytes(record.path),
            record.file_type,
            record.size,
            record.last_write_time,
        )
    }
}

#[derive(Debug, Default, PartialEq, Encode, Decode)]
struct FileStatSnapshot {
    entries: Vec<EntryRecord>,
}

impl Snapshot for FileStatSnapshot {
    const MAGIC: u32 = magic_tag(*b"dfc2");
}

/// Remembers type, size and last-write time of every matched entry.
///
/// Entries confirmed during the scan are drained from the previous state;
/// whatever is left afterwards was deleted.
#[derive(Debug)]
pub struct FileStatStrategy {
    config: Arc<RuntimeConfig>,
    matcher: TargetMatcher,
    store: SnapshotStore,
    entries: LinkedHashMap<PathBuf, DirectoryEntry>,
    previous_entries: LinkedHashMap<PathBuf, DirectoryEntry>,
    changed: bool,
}

impl FileStatStrategy {
    pub fn new(config: Arc<RuntimeConfig>) -> Self {
        Self {
            matcher: TargetMatcher::from(config.as_ref()),
            store: SnapshotStore::new(&config.database),
            entries: LinkedHashMap::new(),
            previous_entries: LinkedHashMap::new(),
            changed: false,
            config,
        }
    }

    fn check_entry(&mut self, entry: DirectoryEntry) {
        let descend = self.matcher.descends_into(&entry);
        let directory = entry.path();
        if self.matcher.is_target(&entry) {
            self.check_target_entry(entry);
        }
        if descend {
            for child in DirectoryEntryEnumerator::open(&directory) {
                self.check_entry(child);
            }
        }
    }

    fn check_target_entry(&mut self, entry: DirectoryEntry) {
        let path = entry.path();
        if self.entries.contains_key(&path) {
            return;
        }

        match self.previous_entries.remove(&path) {
            None => {
                debug!("New entry '{}'", path.display());
                self.changed = true;
            }
            Some(previous) if !previous.has_same_state(&entry) => {
                debug!("Entry '{}' changed", path.display());
                self.changed = true;
            }
            Some(_) => {}
        }
        self.entries.insert(path, entry);
    }
}

impl StrategyTrait for FileStatStrategy {
    async fn read_previous_state(&mut self) {
        let snapshot: FileStatSnapshot = self.store.load().await;
        debug!("Loaded {} entries", snapshot.entries.len());
        self.previous_entries = snapshot
            .entries
            .into_iter()
            .map(DirectoryEntry::from)
            .map(|entry| (entry.path(), entry))
            .collect();
    }

    fn check(&mut self) -> bool {
        let config = self.config.clone();
        for target in &config.targets {
            self.check_entry(DirectoryEntry::stat(target));
        }

        if !self.previous_entries.is_empty() {
            for path in self.previous_entries.keys() {
                debug!("Entry '{}' is gone", path.display());
            }
            self.changed = true;
        }
        self.changed
    }

    async fn write_state(&self) {
        let snapshot = FileStatSnapshot {
            entries: self.entries.values().map(EntryRecord::from).collect(),
        };
        self.store.save(&snapshot).await;
    }
}
