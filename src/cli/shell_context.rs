use std::sync::Arc;

use crate::{
    config::{Config, ConfigManager},
    core::services::BankingLedger,
    storage::JsonStore,
};

use super::registry::CommandRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub store: Arc<JsonStore>,
    pub ledger: BankingLedger,
    pub last_command: Option<String>,
    pub running: bool,
}
