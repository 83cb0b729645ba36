mod common;

use assert_cmd::Command;
use fueleu_core::storage::json_backend::load_dataset_from_path;
use predicates::{prelude::*, str::contains};

fn script(input: &str) -> assert_cmd::assert::Assert {
    let home = common::temp_base();
    script_in(&home, input)
}

fn script_in(home: &std::path::Path, input: &str) -> assert_cmd::assert::Assert {
    Command::cargo_bin("fueleu_cli")
        .unwrap()
        .env("FUELEU_CLI_SCRIPT", "1")
        .env("FUELEU_HOME", home)
        .env_remove("RUST_LOG")
        .write_stdin(input.to_string())
        .assert()
}

#[test]
fn script_mode_seeds_and_lists_routes() {
    script("seed\nroutes 2025\nexit\n")
        .success()
        .stdout(contains("Seeded 5 routes"))
        .stdout(contains("Rotterdam -> Singapore"))
        .stdout(contains("R005"));
}

#[test]
fn banking_flow_reports_balances() {
    script("seed\nbank R003 2025 500000\navailable R003 2025\napply R003 2025 200000\nhistory R003 2025\n")
        .success()
        .stdout(contains("Banked 500000.00 gCO2e for R003 (2025)."))
        .stdout(contains("Available: 0.500000 tCO2e"))
        .stdout(contains("Applied 200000.00 gCO2e to R003 (2025)."))
        .stdout(contains("BANKED"))
        .stdout(contains("APPLIED"));
}

#[test]
fn errors_print_codes_and_the_script_continues() {
    script("seed\nbank R001 2025 10\nintensity ammonia 1\ncb R404\nroutes\n")
        .success()
        .stdout(contains("[CB_NOT_POSITIVE]"))
        .stdout(contains("[UNSUPPORTED_FUEL_TYPE]"))
        .stdout(contains("[ROUTE_NOT_FOUND]"))
        .stdout(contains("R004"));
}

#[test]
fn compare_and_pool_use_the_seeded_dataset() {
    script("seed\ncompare\npool 2025 R003 R001 R004\n")
        .success()
        .stdout(contains("compliant"))
        .stdout(contains("-5.85%"))
        .stdout(contains("Pool 2025-R003+R001+R004 saved"));
}

#[test]
fn unknown_commands_get_a_suggestion() {
    script("comapre\n")
        .success()
        .stdout(contains("Unknown command `comapre`"))
        .stdout(contains("Suggestion: `compare`?"));
}

#[test]
fn state_persists_between_runs() {
    let home = common::temp_base();
    script_in(&home, "seed\nbaseline R002\nconfig set target_intensity 90\n").success();
    script_in(&home, "config\n")
        .success()
        .stdout(contains("target_intensity : 90"));

    let dataset = load_dataset_from_path(&home.join("fueleu.json")).unwrap();
    let baselines: Vec<_> = dataset
        .records
        .iter()
        .filter(|record| record.is_baseline)
        .map(|record| record.code.as_str())
        .collect();
    assert_eq!(baselines, ["R002"]);
    assert!(home.join("config").join("config.json").exists());
}

#[test]
fn script_skips_comments_and_blank_lines() {
    script("# load the reference routes\n\nseed\n   \n# then list them\nroutes 2025\n")
        .success()
        .stdout(contains("Seeded 5 routes"))
        .stdout(contains("R005"))
        .stdout(contains("Unknown command").not());
}
