mod command;

pub use command::{CommandExecutor, CommandOutput, ShellExecutor};
