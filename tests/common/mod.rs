#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc, sync::Mutex};

use fueleu_core::{
    config::DEFAULT_TARGET_INTENSITY,
    core::services::BankingLedger,
    domain::fuel::FuelRecord,
    seed,
    storage::{JsonStore, MemoryStore},
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

pub const TARGET: f64 = DEFAULT_TARGET_INTENSITY;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Returns a fresh directory that outlives the calling test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

pub fn seeded_memory_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::from_dataset(seed::seed_dataset()))
}

pub fn memory_store(records: Vec<FuelRecord>) -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_records(records))
}

/// A JSON store seeded with the reference routes, in its own directory.
pub fn seeded_json_store() -> Arc<JsonStore> {
    let path = temp_base().join("fueleu.json");
    Arc::new(JsonStore::open(path, seed::seed_dataset()).expect("open json store"))
}

pub fn ledger_over_memory(store: &Arc<MemoryStore>) -> BankingLedger {
    BankingLedger::new(store.clone(), store.clone(), TARGET)
}

pub fn ledger_over_json(store: &Arc<JsonStore>) -> BankingLedger {
    BankingLedger::new(store.clone(), store.clone(), TARGET)
}
