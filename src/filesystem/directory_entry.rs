use std::ffi::{OsStr, OsString};
use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};

use bincode::{Decode, Encode};
use tracing::debug;

use crate::ext::SystemTimeExt;
use crate::filesystem::{concat_path, directory_part, file_name_part};

/// Opaque last-write timestamp, only ever compared against other `FileTime`s.
pub type FileTime = u64;
pub type FileSize = u64;

/// Kind of a filesystem object. `Error` means its metadata could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Encode, Decode)]
pub enum FileType {
    #[default]
    Error,
    RegularFile,
    Directory,
}

impl FileType {
    /// Anything that is not a directory counts as a regular file.
    pub fn from_metadata(metadata: &Metadata) -> Self {
        if metadata.is_dir() {
            FileType::Directory
        } else {
            FileType::RegularFile
        }
    }
}

/// One filesystem object as seen by a single scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    directory: PathBuf,
    file_name: OsString,
    file_type: FileType,
    size: FileSize,
    last_write_time: FileTime,
}

impl DirectoryEntry {
    pub fn new(
        directory: impl Into<PathBuf>,
        file_name: impl Into<OsString>,
        file_type: FileType,
        size: FileSize,
        last_write_time: FileTime,
    ) -> Self {
        Self {
            directory: directory.into(),
            file_name: file_name.into(),
            file_type,
            size,
            last_write_time,
        }
    }

    /// An entry whose metadata could not be retrieved. It still carries its path.
    pub fn unavailable(directory: impl Into<PathBuf>, file_name: impl Into<OsString>) -> Self {
        Self::new(directory, file_name, FileType::Error, 0, 0)
    }

    pub fn from_metadata(
        directory: impl Into<PathBuf>,
        file_name: impl Into<OsString>,
        metadata: &Metadata,
    ) -> Self {
        let last_write_time = metadata
            .modified()
            .map(|time| time.to_file_time())
            .unwrap_or_default();

        Self::new(
            directory,
            file_name,
            FileType::from_metadata(metadata),
            metadata.len(),
            last_write_time,
        )
    }

    /// Rebuilds an entry from a full path, splitting it into directory part and name.
    pub fn from_path(
        path: &Path,
        file_type: FileType,
        size: FileSize,
        last_write_time: FileTime,
    ) -> Self {
        Self::new(
            directory_part(path),
            file_name_part(path),
            file_type,
            size,
            last_write_time,
        )
    }

    /// Reads the metadata of `path`, following symbolic links.
    pub fn stat(path: &Path) -> Self {
        let (directory, file_name) = (directory_part(path), file_name_part(path));
        match fs::metadata(path) {
            Ok(metadata) => Self::from_metadata(directory, file_name, &metadata),
            Err(err) => {
                debug!("Failed to stat '{}': {}", path.display(), err);
                Self::unavailable(directory, file_name)
            }
        }
    }

    pub fn path(&self) -> PathBuf {
        concat_path(&self.directory, &self.file_name)
    }

    #[cfg(test)]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn file_name(&self) -> &OsStr {
        &self.file_name
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn size(&self) -> FileSize {
        self.size
    }

    pub fn last_write_time(&self) -> FileTime {
        self.last_write_time
    }

    pub fn is_directory(&self) -> bool {
        self.file_type == FileType::Directory
    }

    pub fn is_regular_file(&self) -> bool {
        self.file_type == FileType::RegularFile
    }

    /// True when type, size and last-write time all match. Paths are not compared.
    pub fn has_same_state(&self, other: &DirectoryEntry) -> bool {
        self.file_type == other.file_type
            && self.size == other.size
            && self.last_write_time == other.last_write_time
    }
}
