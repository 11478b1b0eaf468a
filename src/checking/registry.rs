use std::collections::HashMap;
use std::sync::Arc;

use snafu::Snafu;
use tracing::debug;

use crate::application::RuntimeConfig;
use crate::checking::{DirSummaryStrategy, FastStrategy, FileStatStrategy, Strategy};

pub type StrategyFactory = fn(Arc<RuntimeConfig>) -> Strategy;

/// Maps checking method names, as given to `-m`, to strategy constructors.
#[derive(Debug, Clone, Default)]
pub struct StrategyRegistry {
    factories: HashMap<String, StrategyFactory>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtin_strategies() -> Self {
        let mut registry = Self::new();
        registry.register_builtin_strategies();
        registry
    }

    /// Registers `0`/`fast`, `1`/`dirsummary` and `2`/`filestat`. The empty name selects `filestat`.
    pub fn register_builtin_strategies(&mut self) {
        for name in ["0", "fast"] {
            self.register(name, |config| Strategy::Fast(FastStrategy::new(config)));
        }
        for name in ["1", "dirsummary"] {
            self.register(name, |config| {
                Strategy::DirSummary(DirSummaryStrategy::new(config))
            });
        }
        for name in ["2", "filestat", ""] {
            self.register(name, |config| Strategy::FileStat(FileStatStrategy::new(config)));
        }
    }

    pub fn register(&mut self, name: impl Into<String>, factory: StrategyFactory) {
        let name = name.into();
        debug!("Registering checking method '{}'", name);
        self.factories.insert(name, factory);
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn create(
        &self,
        name: &str,
        config: Arc<RuntimeConfig>,
    ) -> Result<Strategy, UnknownStrategyError> {
        match self.factories.get(name) {
            Some(factory) => Ok(factory(config)),
            None => Err(UnknownStrategyError {
                name: name.to_string(),
                known: self
                    .names()
                    .into_iter()
                    .filter(|name| !name.is_empty())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(display("Unknown checking method name '{}' (expected one of: {})", name, known))]
pub struct UnknownStrategyError {
    name: String,
    known: String,
}
