use std::fs::{self, ReadDir};
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::filesystem::{DirectoryEntry, concat_path};

/// One-shot scan over the immediate children of a directory.
///
/// A directory that cannot be opened yields no entries. The underlying handle
/// is released as soon as the scan ends or the enumerator is dropped.
#[derive(Debug)]
pub struct DirectoryEntryEnumerator {
    directory: PathBuf,
    read_dir: Option<ReadDir>,
}

impl DirectoryEntryEnumerator {
    pub fn open(directory: &Path) -> Self {
        let read_dir = match fs::read_dir(directory) {
            Ok(read_dir) => Some(read_dir),
            Err(err) => {
                debug!("Cannot open directory '{}': {}", directory.display(), err);
                None
            }
        };

        Self {
            directory: directory.to_path_buf(),
            read_dir,
        }
    }

    pub fn is_end(&self) -> bool {
        self.read_dir.is_none()
    }

    fn close(&mut self) {
        self.read_dir = None;
    }

    fn make_entry(&self, dir_entry: fs::DirEntry) -> Option<DirectoryEntry> {
        let file_name = dir_entry.file_name();
        if file_name == "." || file_name == ".." {
            return None;
        }

        // Does not follow symbolic links
        Some(match dir_entry.metadata() {
            Ok(metadata) => DirectoryEntry::from_metadata(&self.directory, file_name, &metadata),
            Err(err) => {
                debug!(
                    "Failed to read metadata of '{}': {}",
                    concat_path(&self.directory, &file_name).display(),
                    err
                );
                DirectoryEntry::unavailable(&self.directory, file_name)
            }
        })
    }
}

impl Iterator for DirectoryEntryEnumerator {
    type Item = DirectoryEntry;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.is_end() {
            let next = self.read_dir.as_mut().and_then(Iterator::next);
            match next {
                Some(Ok(dir_entry)) => {
                    if let Some(entry) = self.make_entry(dir_entry) {
                        return Some(entry);
                    }
                }
                Some(Err(err)) => {
                    debug!("Stopped scanning '{}': {}", self.directory.display(), err);
                    self.close();
                }
                None => self.close(),
            }
        }
        None
    }
}

impl FusedIterator for DirectoryEntryEnumerator {}
