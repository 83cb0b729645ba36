pub mod commands;
pub mod core;
mod help;
pub mod output;
pub mod registry;
mod shell;
mod shell_context;

pub use self::core::{CliError, CliMode, CommandError, ShellContext};
pub use shell::{run_cli, SCRIPT_ENV};
