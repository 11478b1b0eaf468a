//! Binary database file shared by the checking strategies.
//!
//! Every payload is preceded by a four byte magic tag naming its format. All
//! values use bincode's legacy layout: little-endian fixed-width integers,
//! `u64` lengths in front of strings and sequences, and `u32` enum tags.
//! Decoding refuses to allocate more than [`MAX_DECODE_ALLOCATION`] bytes, so
//! a damaged length prefix reads as a malformed database.

use std::io;
use std::path::{Path, PathBuf};

use bincode::config::{self, Configuration, Fixint, Limit, LittleEndian, NoLimit};
use bincode::{Decode, Encode};
use compio::fs;
use snafu::{ResultExt, Snafu, ensure};
use tracing::{debug, info, warn};

use crate::ext::{BestEffortPathExt, SystemTimeExt};
use crate::filesystem::FileTime;

/// Upper bound on the memory claimed while decoding one database.
pub const MAX_DECODE_ALLOCATION: usize = 1 << 30;

fn encode_config() -> Configuration<LittleEndian, Fixint, NoLimit> {
    config::legacy()
}

fn decode_config() -> Configuration<LittleEndian, Fixint, Limit<MAX_DECODE_ALLOCATION>> {
    config::legacy().with_limit::<MAX_DECODE_ALLOCATION>()
}

/// Packs four tag characters into the `u32` written at the start of a database.
pub const fn magic_tag(tag: [u8; 4]) -> u32 {
    u32::from_le_bytes(tag)
}

/// A strategy's persisted state.
pub trait Snapshot: Encode + Decode<()> + Default {
    const MAGIC: u32;
}

/// Reads and writes a single database file.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the previous snapshot, falling back to an empty one when the
    /// file is missing, foreign or damaged.
    pub async fn load<S: Snapshot>(&self) -> S {
        debug!("Reading database {}", self.path.best_effort_path_display());
        match self.try_load().await {
            Ok(snapshot) => {
                debug!("Successfully read database");
                snapshot
            }
            Err(err) => {
                info!("No usable previous state, starting fresh: {}", err);
                S::default()
            }
        }
    }

    pub async fn try_load<S: Snapshot>(&self) -> Result<S, SnapshotError> {
        let bytes = fs::read(&self.path).await.context(ReadSnafu {
            path: self.path.best_effort_path_display(),
        })?;
        decode(&bytes)
    }

    /// Writes the snapshot. Failures are logged and the state is not persisted.
    pub async fn save<S: Snapshot>(&self, snapshot: &S) {
        match self.try_save(snapshot).await {
            Ok(()) => debug!("Wrote database {}", self.path.best_effort_path_display()),
            Err(err) => warn!("{}", err),
        }
    }

    pub async fn try_save<S: Snapshot>(&self, snapshot: &S) -> Result<(), SnapshotError> {
        let bytes = encode(snapshot)?;
        self.write_bytes(bytes).await
    }

    /// Creates or truncates the file, making its last-write time "now".
    pub async fn touch(&self) {
        if let Err(err) = self.write_bytes(Vec::new()).await {
            warn!("{}", err);
        }
    }

    /// Last-write time of the database file, 0 if it cannot be read.
    pub fn last_write_time(&self) -> FileTime {
        std::fs::metadata(&self.path)
            .and_then(|metadata| metadata.modified())
            .map(|time| time.to_file_time())
            .unwrap_or(0)
    }

    async fn write_bytes(&self, bytes: Vec<u8>) -> Result<(), SnapshotError> {
        fs::write(&self.path, bytes).await.0.context(WriteSnafu {
            path: self.path.best_effort_path_display(),
        })
    }
}

pub fn encode<S: Snapshot>(snapshot: &S) -> Result<Vec<u8>, SnapshotError> {
    let mut bytes = bincode::encode_to_vec(S::MAGIC, encode_config()).context(EncodeSnafu)?;
    bytes.extend(bincode::encode_to_vec(snapshot, encode_config()).context(EncodeSnafu)?);
    Ok(bytes)
}

pub fn decode<S: Snapshot>(bytes: &[u8]) -> Result<S, SnapshotError> {
    let (magic, read) =
        bincode::decode_from_slice::<u32, _>(bytes, decode_config()).context(DecodeSnafu)?;
    ensure!(
        magic == S::MAGIC,
        MagicMismatchSnafu {
            found: magic,
            expected: S::MAGIC,
        }
    );
    let (snapshot, _) =
        bincode::decode_from_slice::<S, _>(&bytes[read..], decode_config()).context(DecodeSnafu)?;
    Ok(snapshot)
}

#[derive(Debug, Snafu)]
pub enum SnapshotError {
    #[snafu(display("Failed to read database file {}", path))]
    ReadError { path: String, source: io::Error },
    #[snafu(display("Failed to write database file {}", path))]
    WriteError { path: String, source: io::Error },
    #[snafu(display("Database has format tag {:#010x}, expected {:#010x}", found, expected))]
    MagicMismatch { found: u32, expected: u32 },
    #[snafu(display("Database contents are truncated or malformed"))]
    DecodeError {
        source: bincode::error::DecodeError,
    },
    #[snafu(display("Failed to encode database contents"))]
    EncodeError {
        source: bincode::error::EncodeError,
    },
}
