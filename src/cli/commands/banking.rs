use crate::cli::core::{
    expect_args, parse_grams, parse_period, CommandResult, ShellContext,
};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::core::services::ComplianceService;
use crate::domain::{common::Displayable, ledger::BankingOutcome};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "bank",
            "Bank part of a route's positive balance",
            "bank <code> <period> <grams>",
            cmd_bank,
        ),
        CommandEntry::new(
            "apply",
            "Apply banked surplus to a route",
            "apply <code> <period> <grams>",
            cmd_apply,
        ),
        CommandEntry::new(
            "available",
            "Show banked and applied totals",
            "available <code> <period>",
            cmd_available,
        ),
        CommandEntry::new(
            "history",
            "List banking entries in append order",
            "history <code> <period>",
            cmd_history,
        ),
        CommandEntry::new(
            "adjusted",
            "Show raw and bank-adjusted balances for a period",
            "adjusted <period>",
            cmd_adjusted,
        ),
    ]
}

fn cmd_bank(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = expect_args(args, 3, "bank <code> <period> <grams>")?;
    let period = parse_period(args[1])?;
    let amount = parse_grams(args[2])?;
    let outcome = context.ledger.bank(args[0], period, amount)?;
    output::success(format!("Banked {} for {} ({}).", amount, args[0], period));
    print_outcome(&outcome);
    Ok(())
}

fn cmd_apply(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = expect_args(args, 3, "apply <code> <period> <grams>")?;
    let period = parse_period(args[1])?;
    let amount = parse_grams(args[2])?;
    let outcome = context.ledger.apply(args[0], period, amount)?;
    output::success(format!("Applied {} to {} ({}).", amount, args[0], period));
    print_outcome(&outcome);
    Ok(())
}

fn print_outcome(outcome: &BankingOutcome) {
    output::info(format!("  CB before: {}", outcome.cb_before));
    output::info(format!("  Amount:    {}", outcome.applied));
    output::info(format!("  CB after:  {}", outcome.cb_after));
}

fn cmd_available(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = expect_args(args, 2, "available <code> <period>")?;
    let period = parse_period(args[1])?;
    let available = context.ledger.available_banked(args[0], period)?;
    let applied = context.ledger.applied_banked(args[0], period)?;
    output::info(format!("Available: {available}"));
    output::info(format!("Applied:   {applied}"));
    Ok(())
}

fn cmd_history(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = expect_args(args, 2, "history <code> <period>")?;
    let period = parse_period(args[1])?;
    let entries = context.ledger.entries(args[0], period)?;
    if entries.is_empty() {
        output::info(format!("No banking entries for {} ({}).", args[0], period));
        return Ok(());
    }
    for entry in entries {
        output::info(format!("  {}", entry.display_label()));
    }
    Ok(())
}

fn cmd_adjusted(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = expect_args(args, 1, "adjusted <period>")?;
    let period = parse_period(args[0])?;
    let store = context.store.as_ref();
    let rows: Vec<Vec<String>> =
        ComplianceService::adjusted_cb(store, store, period, context.target_intensity())?
            .into_iter()
            .map(|row| {
                vec![
                    row.entity_id,
                    row.vessel_type.unwrap_or_else(|| "-".into()),
                    row.cb_before.to_string(),
                    row.applied.to_string(),
                    row.cb_adjusted.to_string(),
                ]
            })
            .collect();
    output::table(
        &["code", "vessel", "cb_before", "applied", "cb_adjusted"],
        &rows,
    );
    Ok(())
}
