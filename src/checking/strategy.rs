use crate::checking::{DirSummaryStrategy, FastStrategy, FileStatStrategy};

/// A way of deciding whether the targets changed since the previous run.
///
/// One run calls `read_previous_state`, then `check` once, then `write_state`
/// if the run should persist what `check` saw.
pub trait StrategyTrait {
    async fn read_previous_state(&mut self);
    /// Scans the targets and reports whether anything differs from the previous state
    fn check(&mut self) -> bool;
    async fn write_state(&self);
}

#[derive(Debug)]
pub enum Strategy {
    Fast(FastStrategy),
    DirSummary(DirSummaryStrategy),
    FileStat(FileStatStrategy),
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Fast(_) => "fast",
            Strategy::DirSummary(_) => "dirsummary",
            Strategy::FileStat(_) => "filestat",
        }
    }
}

impl StrategyTrait for Strategy {
    async fn read_previous_state(&mut self) {
        match self {
            Strategy::Fast(strategy) => strategy.read_previous_state().await,
            Strategy::DirSummary(strategy) => strategy.read_previous_state().await,
            Strategy::FileStat(strategy) => strategy.read_previous_state().await,
        }
    }

    fn check(&mut self) -> bool {
        match self {
            Strategy::Fast(strategy) => strategy.check(),
            Strategy::DirSummary(strategy) => strategy.check(),
            Strategy::FileStat(strategy) => strategy.check(),
        }
    }

    async fn write_state(&self) {
        match self {
            Strategy::Fast(strategy) => strategy.write_state().await,
            Strategy::DirSummary(strategy) => strategy.write_state().await,
            Strategy::FileStat(strategy) => strategy.write_state().await,
        }
    }
}
