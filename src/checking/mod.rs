//! Change detection over the configured targets.
//!
//! Three interchangeable strategies trade accuracy for cost:
//! - `fast` compares timestamps against the database file's own timestamp.
//! - `dirsummary` keeps a count/size/latest-time summary per directory.
//! - `filestat` keeps type, size and time for every matched entry.

mod dir_summary;
mod fast;
mod file_stat;
mod registry;
mod snapshot;
mod strategy;
mod target_matcher;

#[cfg(test)]
pub(crate) mod test_support;

pub use dir_summary::DirSummaryStrategy;
pub use fast::FastStrategy;
pub use file_stat::FileStatStrategy;
pub use registry::{StrategyRegistry, UnknownStrategyError};
pub use snapshot::{Snapshot, SnapshotStore, magic_tag};
pub use strategy::{Strategy, StrategyTrait};
pub use target_matcher::TargetMatcher;
