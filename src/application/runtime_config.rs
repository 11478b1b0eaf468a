use std::path::PathBuf;

use crate::cli::Cli;

/// Everything a single run needs, fixed once the command line is parsed.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub targets: Vec<PathBuf>,
    pub recursive: bool,
    pub include_directories: bool,
    pub extensions: Vec<String>,
    pub database: PathBuf,
    pub on_change: Option<String>,
    pub method: String,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            targets: cli.targets,
            recursive: cli.recursive,
            include_directories: cli.include_directories,
            extensions: cli.extensions,
            database: cli.database,
            on_change: cli.on_change.filter(|command| !command.is_empty()),
            method: cli.method.unwrap_or_default(),
        }
    }
}
