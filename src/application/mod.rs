mod application;
mod change_command;
pub mod data;
mod runtime_config;

pub use application::{Application, ApplicationError};
pub use change_command::ChangeCommand;
pub use runtime_config::RuntimeConfig;
