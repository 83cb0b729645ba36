use std::path::PathBuf;

use crate::cli::core::{expect_args, parse_number, CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::domain::ledger::ApplyPolicy;

pub(crate) const KEYS: &[&str] = &["target_intensity", "apply_policy", "data_file", "log_filter"];
pub(crate) const ACTIONS: &[&str] = &["show", "set"];

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "Show or change settings",
        "config [set <key> <value>]",
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let action = args.first().map(|sub| sub.to_ascii_lowercase());
    match action.as_deref() {
        None | Some("show") => {
            show(context);
            Ok(())
        }
        Some("set") => {
            let args = expect_args(args, 3, "config set <key> <value>")?;
            set(context, args[1], args[2])
        }
        Some(other) => Err(CommandError::InvalidArguments(format!(
            "unknown config action `{}` (use `show` or `set`)",
            other
        ))),
    }
}

fn show(context: &ShellContext) {
    let config = &context.config;
    output::section("Configuration");
    output::info(format!("  target_intensity : {}", config.target_intensity));
    output::info(format!("  apply_policy     : {}", policy_label(config.apply_policy)));
    output::info(format!(
        "  data_file        : {}",
        context.config_manager.data_file(config).display()
    ));
    output::info(format!("  log_filter       : {}", config.log_filter));
    output::info(format!(
        "  config path      : {}",
        context.config_manager.path().display()
    ));
}

fn set(context: &mut ShellContext, key: &str, value: &str) -> CommandResult {
    let mut config = context.config.clone();
    match key {
        "target_intensity" => config.target_intensity = parse_number(value, "target intensity")?,
        "apply_policy" => config.apply_policy = parse_policy(value)?,
        "data_file" => config.data_file = Some(PathBuf::from(value)),
        "log_filter" => config.log_filter = value.to_string(),
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown setting `{}` (expected one of: {})",
                other,
                KEYS.join(", ")
            )))
        }
    }
    context.apply_config(config)?;
    output::success(format!("Updated {key}."));
    if key == "log_filter" {
        output::hint("The new log filter takes effect on the next start.");
    }
    Ok(())
}

fn parse_policy(value: &str) -> Result<ApplyPolicy, CommandError> {
    match value.to_ascii_lowercase().replace('-', "_").as_str() {
        "any_balance" => Ok(ApplyPolicy::AnyBalance),
        "deficit_only" => Ok(ApplyPolicy::DeficitOnly),
        _ => Err(CommandError::InvalidArguments(format!(
            "invalid apply policy `{}` (use any_balance or deficit_only)",
            value
        ))),
    }
}

fn policy_label(policy: ApplyPolicy) -> &'static str {
    match policy {
        ApplyPolicy::AnyBalance => "any_balance",
        ApplyPolicy::DeficitOnly => "deficit_only",
    }
}
