use crate::cli::core::{expect_args, parse_number, parse_period, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::core::services::{ComparisonService, ComplianceService, IntensityService};
use crate::domain::fuel::RecordFilter;
use crate::seed;
use crate::storage::FuelRecordStore;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "seed",
            "Replace the dataset with the reference routes",
            "seed",
            cmd_seed,
        ),
        CommandEntry::new(
            "routes",
            "List routes, optionally for one period",
            "routes [period]",
            cmd_routes,
        ),
        CommandEntry::new(
            "baseline",
            "Flag a route as the comparison baseline",
            "baseline <code>",
            cmd_baseline,
        ),
        CommandEntry::new(
            "intensity",
            "Compute well-to-wake intensity for a fuel quantity",
            "intensity <fuel> <tonnes>",
            cmd_intensity,
        ),
        CommandEntry::new(
            "cb",
            "Show the raw compliance balance of a route",
            "cb <code>",
            cmd_cb,
        ),
        CommandEntry::new(
            "compare",
            "Compare every route against the baseline",
            "compare",
            cmd_compare,
        ),
    ]
}

fn cmd_seed(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let dataset = seed::seed_dataset();
    let count = dataset.records.len();
    context.store.replace(dataset)?;
    output::success(format!(
        "Seeded {} routes into {}.",
        count,
        context.store.path().display()
    ));
    Ok(())
}

fn cmd_routes(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let filter = match args.first() {
        Some(period) => Some(RecordFilter::for_period(parse_period(period)?)),
        None => None,
    };
    let rows: Vec<Vec<String>> = context
        .store
        .find_all(filter.as_ref())?
        .into_iter()
        .map(|record| {
            let route = match (&record.origin, &record.destination) {
                (Some(origin), Some(destination)) => format!("{origin} -> {destination}"),
                _ => "-".into(),
            };
            vec![
                record.code.clone(),
                record.period.to_string(),
                record.fuel_type.clone().unwrap_or_else(|| "-".into()),
                record
                    .fuel_consumption_tonnes
                    .map(|mass| format!("{mass:.1}"))
                    .unwrap_or_else(|| "-".into()),
                route,
                if record.is_baseline { "yes" } else { "" }.to_string(),
            ]
        })
        .collect();
    output::table(
        &["code", "period", "fuel", "tonnes", "route", "baseline"],
        &rows,
    );
    Ok(())
}

fn cmd_baseline(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = expect_args(args, 1, "baseline <code>")?;
    context.store.set_baseline(args[0])?;
    output::success(format!("Baseline set to {}.", args[0]));
    Ok(())
}

fn cmd_intensity(_context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = expect_args(args, 2, "intensity <fuel> <tonnes>")?;
    let mass = parse_number(args[1], "mass")?;
    let result = IntensityService::compute_intensity(args[0], mass)?;
    output::info(format!("Intensity: {:.4} gCO2e/MJ", result.intensity));
    output::info(format!("Energy:    {:.2} MJ", result.energy_mj));
    Ok(())
}

fn cmd_cb(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = expect_args(args, 1, "cb <code>")?;
    let target = context.target_intensity();
    let result = ComplianceService::cb_for_entity(context.store.as_ref(), args[0], target)?;
    let status = if result.is_surplus() {
        "surplus"
    } else if result.is_deficit() {
        "deficit"
    } else {
        "balanced"
    };
    output::info(format!("Route:     {}", args[0]));
    output::info(format!(
        "Intensity: {:.4} gCO2e/MJ (target {target})",
        result.actual_intensity
    ));
    output::info(format!("Energy:    {:.2} MJ", result.energy_mj));
    output::info(format!(
        "CB:        {} ({}) {status}",
        result.cb_grams, result.cb_tonnes
    ));
    Ok(())
}

fn cmd_compare(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let results =
        ComparisonService::compare_with_store(context.store.as_ref(), context.target_intensity())?;
    let rows: Vec<Vec<String>> = results
        .iter()
        .map(|result| {
            vec![
                result.code.clone(),
                format!("{:.4}", result.baseline_intensity),
                format!("{:.4}", result.comparison_intensity),
                format!("{:+.2}%", result.percent_diff),
                if result.compliant { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();
    output::table(
        &["code", "baseline", "intensity", "diff", "compliant"],
        &rows,
    );
    Ok(())
}
