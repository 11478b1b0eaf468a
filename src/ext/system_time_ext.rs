use std::time::SystemTime;

use crate::filesystem::FileTime;

pub trait SystemTimeExt {
    /// Nanoseconds since the Unix epoch, saturating. Pre-epoch times map to 0.
    fn to_file_time(&self) -> FileTime;
}

impl SystemTimeExt for SystemTime {
    fn to_file_time(&self) -> FileTime {
        self.duration_since(SystemTime::UNIX_EPOCH)
            .ok()
            .map(|d| FileTime::try_from(d.as_nanos()).unwrap_or(FileTime::MAX))
            .unwrap_or(0)
    }
}
