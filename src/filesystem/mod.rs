//! Normalized view of the filesystem used by the checking strategies.
//!
//! Every object is reported as a [`DirectoryEntry`] whose metadata is
//! resolved once, when the entry is produced, so consumers never stat twice.

mod directory_entry;
mod enumerator;
mod path;

pub use directory_entry::{DirectoryEntry, FileSize, FileTime, FileType};
pub use enumerator::DirectoryEntryEnumerator;
pub use path::{concat_path, directory_part, file_name_part, path_from_bytes, path_to_bytes};
