//! Core CLI loop, dispatch, and shell context helpers.

use std::{io, sync::Arc};

use strsim::levenshtein;

use crate::{
    config::{Config, ConfigManager},
    core::services::BankingLedger,
    domain::{common::Period, units::GramsCo2e},
    errors::{
        BankingError, ComparisonError, ComplianceError, FuelError, FuelEuError, PoolError,
        StoreError,
    },
    storage::JsonStore,
};

use super::commands;
use super::output;
use super::registry::{CommandEntry, CommandRegistry};
pub use crate::cli::shell_context::{CliMode, ShellContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let config_manager = ConfigManager::new()?;
        Self::with_config_manager(mode, config_manager)
    }

    pub fn with_config_manager(
        mode: CliMode,
        config_manager: ConfigManager,
    ) -> Result<Self, CliError> {
        let config = config_manager.load()?;
        crate::init_with_filter(Some(config.log_filter.as_str()));

        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let store = Arc::new(JsonStore::open_or_empty(config_manager.data_file(&config))?);
        let ledger = build_ledger(&store, &config);

        Ok(ShellContext {
            mode,
            registry,
            config_manager,
            config,
            store,
            ledger,
            last_command: None,
            running: true,
        })
    }

    /// `(name, usage)` pairs in registration order, for completion and hints.
    pub(crate) fn command_usages(&self) -> Vec<(&'static str, &'static str)> {
        self.registry
            .list()
            .map(|entry| (entry.name, entry.usage))
            .collect()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn prompt(&self) -> String {
        "fueleu> ".to_string()
    }

    pub(crate) fn target_intensity(&self) -> f64 {
        self.config.target_intensity
    }

    /// Persists `config` and rebuilds the services that depend on it.
    pub(crate) fn apply_config(&mut self, config: Config) -> CommandResult {
        self.config_manager.save(&config)?;
        if self.config_manager.data_file(&config) != self.store.path() {
            self.store = Arc::new(JsonStore::open_or_empty(
                self.config_manager.data_file(&config),
            )?);
        }
        self.ledger = build_ledger(&self.store, &config);
        self.config = config;
        Ok(())
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match crate::cli::shell::parse_command_line(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                output::warning(err);
                return Ok(LoopControl::Continue);
            }
        };

        let Some(raw) = tokens.first() else {
            return Ok(LoopControl::Continue);
        };
        let command = raw.to_lowercase();
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();

        self.last_command = Some(line.trim().to_string());

        match self.dispatch(&command, raw, &args) {
            Ok(LoopControl::Exit) => {
                self.running = false;
                Ok(LoopControl::Exit)
            }
            other => other,
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let best = self
            .registry
            .names()
            .map(|key| (levenshtein(key, &input.to_lowercase()), key))
            .min_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = best {
            if distance <= 3 {
                output::info(format!("Suggestion: `{}`?", best));
            }
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
            }
            CommandError::Domain(err) => {
                output::error(format!("[{}] {}", err.code(), err));
            }
            other => output::error(other),
        }
    }
}

fn build_ledger(store: &Arc<JsonStore>, config: &Config) -> BankingLedger {
    BankingLedger::new(store.clone(), store.clone(), config.target_intensity)
        .with_policy(config.apply_policy)
}

pub(crate) fn expect_args<'a>(
    args: &'a [&'a str],
    count: usize,
    usage: &str,
) -> Result<&'a [&'a str], CommandError> {
    if args.len() < count {
        return Err(CommandError::InvalidArguments(format!("usage: {usage}")));
    }
    Ok(args)
}

pub(crate) fn parse_period(input: &str) -> Result<Period, CommandError> {
    input.trim().parse::<Period>().map_err(|_| {
        CommandError::InvalidArguments(format!("invalid period `{}` (use a year, e.g. 2025)", input))
    })
}

pub(crate) fn parse_number(input: &str, what: &str) -> Result<f64, CommandError> {
    match input.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(CommandError::InvalidArguments(format!(
            "invalid {} `{}`",
            what, input
        ))),
    }
}

pub(crate) fn parse_grams(input: &str) -> Result<GramsCo2e, CommandError> {
    parse_number(input, "amount").map(GramsCo2e)
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Domain(#[from] FuelEuError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("exit requested")]
    ExitRequested,
}

macro_rules! domain_error {
    ($($source:ty),* $(,)?) => {
        $(
            impl From<$source> for CommandError {
                fn from(err: $source) -> Self {
                    CommandError::Domain(err.into())
                }
            }
        )*
    };
}

domain_error!(
    FuelError,
    ComplianceError,
    BankingError,
    PoolError,
    ComparisonError,
    StoreError,
);

/// Failures that stop the shell itself.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] FuelEuError),
    #[error("{0}")]
    Command(String),
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        CliError::Core(err.into())
    }
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<rustyline::error::ReadlineError> for CliError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        CliError::Command(err.to_string())
    }
}

#[cfg(test)]
pub(crate) fn process_script(
    base: &std::path::Path,
    lines: &[&str],
) -> Result<ShellContext, CliError> {
    let manager = ConfigManager::with_base_dir(base)?;
    let mut app = ShellContext::with_config_manager(CliMode::Script, manager)?;
    for line in lines {
        match app.process_line(line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => app.report_error(err),
        }
    }
    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ledger::ApplyPolicy;
    use crate::storage::{FuelRecordStore, LedgerStore};
    use crate::domain::ledger::EntryKind;
    use tempfile::tempdir;

    #[test]
    fn seed_then_bank_updates_the_dataset() {
        let temp = tempdir().unwrap();
        let app = process_script(
            temp.path(),
            &["seed", "bank R003 2025 500000", "apply R003 2025 200000"],
        )
        .unwrap();
        assert_eq!(app.store.find_all(None).unwrap().len(), 5);
        assert_eq!(
            app.store.sum_entries("R003", 2025, EntryKind::Banked).unwrap().value(),
            0.5
        );
        assert_eq!(
            app.store.sum_entries("R003", 2025, EntryKind::Applied).unwrap().value(),
            0.2
        );
    }

    #[test]
    fn errors_do_not_stop_the_script() {
        let temp = tempdir().unwrap();
        let app = process_script(
            temp.path(),
            &["seed", "bank R001 2025 10", "baseline R002", "exit", "baseline R003"],
        )
        .unwrap();
        assert_eq!(app.store.find_baseline().unwrap().unwrap().code, "R002");
        assert!(!app.running);
    }

    #[test]
    fn config_set_rebuilds_the_ledger() {
        let temp = tempdir().unwrap();
        let app = process_script(
            temp.path(),
            &["config set apply_policy deficit_only", "config set target_intensity 80"],
        )
        .unwrap();
        assert_eq!(app.ledger.policy(), ApplyPolicy::DeficitOnly);
        assert_eq!(app.ledger.target_intensity(), 80.0);
        let reloaded = ConfigManager::with_base_dir(temp.path()).unwrap().load().unwrap();
        assert_eq!(reloaded.target_intensity, 80.0);
    }

    #[test]
    fn argument_parsers_reject_garbage() {
        assert!(parse_period("twenty").is_err());
        assert!(parse_grams("NaN").is_err());
        assert_eq!(parse_period(" 2025 ").unwrap(), 2025);
        assert_eq!(expect_args(&["a"], 2, "x <a> <b>").unwrap_err().to_string(), "usage: x <a> <b>");
    }
}
