use crate::cli::core::{expect_args, parse_period, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::core::services::PoolingService;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "pool",
        "Pool the balances of several routes and save the result",
        "pool <period> <code> <code>...",
        cmd_pool,
    )]
}

fn cmd_pool(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = expect_args(args, 2, "pool <period> <code> <code>...")?;
    let period = parse_period(args[0])?;
    let codes: Vec<String> = args[1..].iter().map(|code| code.to_string()).collect();

    let result = PoolingService::create_pool_for_entities(
        context.store.as_ref(),
        period,
        &codes,
        context.target_intensity(),
    )?;
    let name = format!("{}-{}", period, codes.join("+"));
    let record = PoolingService::persist_pool(context.store.as_ref(), &name, &result)?;

    output::success(format!("Pool {} saved ({}).", record.name, record.id));
    let rows: Vec<Vec<String>> = result
        .members
        .iter()
        .map(|member| {
            vec![
                member.entity_id.clone(),
                member.cb_before.to_string(),
                member.cb_after.to_string(),
                member.transferred().to_string(),
            ]
        })
        .collect();
    output::table(&["code", "cb_before", "cb_after", "transferred"], &rows);
    output::info(format!("Pool sum: {}", result.pool_sum));
    Ok(())
}
