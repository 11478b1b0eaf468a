use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tempfile::TempDir;

use crate::application::RuntimeConfig;
use crate::checking::StrategyTrait;
use crate::filesystem::FileTime;

pub const NANOS_PER_SECOND: FileTime = 1_000_000_000;

/// A scratch project: `<root>/src` holds the targets, `<root>/state.db` the database.
pub struct Workspace {
    pub temp_dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::create_dir(temp_dir.path().join("src")).expect("Failed to create src");
        Self { temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn src(&self) -> PathBuf {
        self.root().join("src")
    }

    pub fn database(&self) -> PathBuf {
        self.root().join("state.db")
    }

    pub fn config(
        &self,
        targets: &[PathBuf],
        recursive: bool,
        include_directories: bool,
        extensions: &[&str],
    ) -> Arc<RuntimeConfig> {
        Arc::new(RuntimeConfig {
            targets: targets.to_vec(),
            recursive,
            include_directories,
            extensions: extensions.iter().map(|ext| ext.to_string()).collect(),
            database: self.database(),
            on_change: None,
            method: String::new(),
        })
    }
}

/// Writes `size` bytes to `path` and pins its last-write time to `seconds` after the epoch.
pub fn write_file(path: &Path, size: usize, seconds: u64) {
    fs::write(path, vec![b'x'; size]).expect("Failed to write file");
    set_modified(path, seconds);
}

/// Pins the last-write time of a file or directory.
pub fn set_modified(path: &Path, seconds: u64) {
    let file = if path.is_dir() {
        File::open(path)
    } else {
        File::options().write(true).open(path)
    };
    file.and_then(|file| file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(seconds)))
        .expect("Failed to set modified time");
}

/// One full invocation: load, check, persist on change.
pub async fn run_once(mut strategy: impl StrategyTrait) -> bool {
    strategy.read_previous_state().await;
    let changed = strategy.check();
    if changed {
        strategy.write_state().await;
    }
    changed
}
