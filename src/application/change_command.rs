use compio::process::Command;
use snafu::{ResultExt, Snafu};
use tracing::{debug, info};

/// Shell command run after a change was detected.
#[derive(Debug, Clone)]
pub struct ChangeCommand {
    command: String,
}

impl ChangeCommand {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Runs the command through the host shell with inherited stdio and waits for it.
    pub async fn run(&self) -> Result<(), ChangeCommandError> {
        debug!("Running change command '{}'", self.command);
        let mut child = self.create_command().spawn().context(SpawnSnafu {
            command: self.command.clone(),
        })?;

        let status = child.wait().await.context(WaitSnafu {
            command: self.command.clone(),
        })?;

        if status.success() {
            info!("Change command '{}' completed successfully", self.command);
            Ok(())
        } else {
            Err(ChangeCommandError::UnsuccessfulExecution {
                command: self.command.clone(),
                status: status.code().unwrap_or(-1),
            })
        }
    }

    /// Returns the shell and its arguments for the current platform.
    fn full_command(&self) -> (&'static str, Vec<&str>) {
        #[cfg(target_family = "windows")]
        {
            ("cmd", vec!["/C", &self.command])
        }
        #[cfg(target_family = "unix")]
        {
            ("sh", vec!["-c", &self.command])
        }
    }

    fn create_command(&self) -> Command {
        let (shell, args) = self.full_command();
        let mut cmd = Command::new(shell);
        cmd.args(args);
        cmd
    }
}

#[derive(Debug, Snafu)]
pub enum ChangeCommandError {
    #[snafu(display("Failed to spawn change command '{}'", command))]
    SpawnError {
        command: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to wait for change command '{}'", command))]
    WaitError {
        command: String,
        source: std::io::Error,
    },
    #[snafu(display("Change command '{}' failed with exit code {}", command, status))]
    UnsuccessfulExecution { command: String, status: i32 },
}
