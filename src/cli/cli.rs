use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;

/// Reports whether files changed since the previous run and optionally runs a command when they did.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// Files or directories to check
    pub targets: Vec<PathBuf>,

    /// Descend into subdirectories of directory targets
    #[clap(long, short = 'r')]
    pub recursive: bool,

    /// Treat directories themselves as targets
    #[clap(long, short = 'd')]
    pub include_directories: bool,

    /// Database file holding the state of the previous run (also accepted as `-db`)
    #[clap(long = "db", value_name = "PATH")]
    pub database: PathBuf,

    /// Shell command to run when a change is detected
    #[clap(long = "exec", short = 'e', value_name = "COMMAND", allow_hyphen_values = true)]
    pub on_change: Option<String>,

    /// Checking method: 0|fast, 1|dirsummary, 2|filestat (default)
    #[clap(long = "method", short = 'm', value_name = "NAME")]
    pub method: Option<String>,

    /// Only regular files ending with this suffix are targets, ignoring case. Repeatable (also accepted as `-ext`)
    #[clap(long = "ext", value_name = "SUFFIX")]
    pub extensions: Vec<String>,

    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,
}

/// Single-dash spellings of long options and their `--` forms.
const LEGACY_OPTIONS: &[(&str, &str)] = &[("-db", "--db"), ("-ext", "--ext")];

/// Options whose next argument is a value and must be passed through untouched.
const VALUE_OPTIONS: &[&str] = &[
    "-db",
    "--db",
    "-ext",
    "--ext",
    "-e",
    "--exec",
    "-m",
    "--method",
    "-l",
    "--log-level",
];

/// Rewrites `-db` and `-ext` to `--db` and `--ext` so clap can parse them.
pub fn expand_legacy_options<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut expanded = Vec::new();
    let mut expects_value = false;
    let mut passthrough = false;

    for arg in args {
        let arg: OsString = arg.into();
        if passthrough || expects_value {
            expects_value = false;
            expanded.push(arg);
            continue;
        }

        match arg.to_str() {
            Some("--") => passthrough = true,
            Some(text) => {
                expects_value = VALUE_OPTIONS.contains(&text);
                if let Some((_, long)) = LEGACY_OPTIONS.iter().find(|(legacy, _)| *legacy == text) {
                    expanded.push(OsString::from(*long));
                    continue;
                }
            }
            None => {}
        }
        expanded.push(arg);
    }

    expanded
}
