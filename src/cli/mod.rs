mod cli;

pub use cli::{Cli, expand_legacy_options};
