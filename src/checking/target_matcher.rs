use std::ffi::OsStr;

use tracing::warn;

use crate::application::RuntimeConfig;
use crate::filesystem::DirectoryEntry;

/// Decides which entries take part in a comparison and which directories are descended into.
#[derive(Debug, Clone, Default)]
pub struct TargetMatcher {
    recursive: bool,
    include_directories: bool,
    extensions: Vec<String>,
}

impl TargetMatcher {
    pub fn new(recursive: bool, include_directories: bool, extensions: Vec<String>) -> Self {
        Self {
            recursive,
            include_directories,
            extensions,
        }
    }

    /// Directories match when directories are included; regular files match on extension.
    /// Entries without metadata never match.
    pub fn is_target(&self, entry: &DirectoryEntry) -> bool {
        if entry.is_directory() {
            return self.include_directories;
        }
        if entry.is_regular_file() {
            return self.matches_extension(entry.file_name());
        }

        warn!("Could not retrieve information for '{}'", entry.path().display());
        false
    }

    pub fn descends_into(&self, entry: &DirectoryEntry) -> bool {
        self.recursive && entry.is_directory()
    }

    /// Case-insensitive suffix match on the raw name bytes. An empty allow-list matches every name.
    pub fn matches_extension(&self, file_name: &OsStr) -> bool {
        let file_name = file_name.as_encoded_bytes();
        self.extensions.is_empty()
            || self.extensions.iter().any(|extension| {
                file_name
                    .len()
                    .checked_sub(extension.len())
                    .is_some_and(|start| file_name[start..].eq_ignore_ascii_case(extension.as_bytes()))
            })
    }
}

impl From<&RuntimeConfig> for TargetMatcher {
    fn from(config: &RuntimeConfig) -> Self {
        Self::new(
            config.recursive,
            config.include_directories,
            config.extensions.clone(),
        )
    }
}
