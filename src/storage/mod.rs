//! Store collaborators consumed by the compliance services.

pub mod json_backend;
pub mod memory;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    common::Period,
    fuel::{FuelRecord, RecordFilter},
    ledger::{EntryKind, LedgerEntry},
    pool::{PoolMember, PoolRecord},
    units::TonnesCo2e,
};
use crate::errors::StoreError;

pub use json_backend::JsonStore;
pub use memory::MemoryStore;

pub type Result<T> = std::result::Result<T, StoreError>;

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Read access to fuel records plus the global baseline flag.
pub trait FuelRecordStore: Send + Sync {
    fn find_by_code(&self, code: &str) -> Result<Option<FuelRecord>>;
    fn find_all(&self, filter: Option<&RecordFilter>) -> Result<Vec<FuelRecord>>;
    fn find_baseline(&self) -> Result<Option<FuelRecord>>;
    /// Clears any existing baseline and flags `code`, as one atomic step.
    fn set_baseline(&self, code: &str) -> Result<()>;
}

/// Append-only storage for banking entries.
pub trait LedgerStore: Send + Sync {
    fn append_entry(&self, entry: LedgerEntry) -> Result<()>;
    fn sum_entries(&self, entity_id: &str, period: Period, kind: EntryKind)
        -> Result<TonnesCo2e>;
    fn entries(&self, entity_id: &str, period: Period) -> Result<Vec<LedgerEntry>>;
}

/// Optional persistence for pooling results.
pub trait PoolStore: Send + Sync {
    fn create_pool(&self, name: &str, period: Period) -> Result<Uuid>;
    fn add_member(&self, pool_id: Uuid, member: &PoolMember) -> Result<()>;
    fn pool(&self, pool_id: Uuid) -> Result<Option<PoolRecord>>;
}

/// Everything a backend keeps, in one serializable snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default = "Dataset::schema_version_default")]
    pub schema_version: u8,
    #[serde(default)]
    pub records: Vec<FuelRecord>,
    #[serde(default)]
    pub ledger: Vec<LedgerEntry>,
    #[serde(default)]
    pub pools: Vec<PoolRecord>,
}

impl Default for Dataset {
    fn default() -> Self {
        Self::with_records(Vec::new())
    }
}

impl Dataset {
    pub fn with_records(records: Vec<FuelRecord>) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            records,
            ledger: Vec::new(),
            pools: Vec::new(),
        }
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }

    pub fn find_by_code(&self, code: &str) -> Option<&FuelRecord> {
        self.records.iter().find(|record| record.code == code)
    }

    pub fn find_all(&self, filter: Option<&RecordFilter>) -> Vec<FuelRecord> {
        self.records
            .iter()
            .filter(|record| filter.map_or(true, |filter| filter.matches(record)))
            .cloned()
            .collect()
    }

    pub fn find_baseline(&self) -> Option<&FuelRecord> {
        self.records.iter().find(|record| record.is_baseline)
    }

    pub fn set_baseline(&mut self, code: &str) -> Result<()> {
        if self.find_by_code(code).is_none() {
            return Err(StoreError::RecordNotFound { code: code.into() });
        }
        for record in &mut self.records {
            record.is_baseline = record.code == code;
        }
        Ok(())
    }

    pub fn sum_entries(&self, entity_id: &str, period: Period, kind: EntryKind) -> TonnesCo2e {
        self.ledger
            .iter()
            .filter(|entry| entry.belongs_to(entity_id, period) && entry.kind == kind)
            .map(|entry| entry.amount)
            .sum()
    }

    pub fn entries(&self, entity_id: &str, period: Period) -> Vec<LedgerEntry> {
        self.ledger
            .iter()
            .filter(|entry| entry.belongs_to(entity_id, period))
            .cloned()
            .collect()
    }

    pub fn create_pool(&mut self, name: &str, period: Period) -> Uuid {
        let pool = PoolRecord::new(name, period);
        let id = pool.id;
        self.pools.push(pool);
        id
    }

    pub fn add_member(&mut self, pool_id: Uuid, member: &PoolMember) -> Result<()> {
        let pool = self
            .pools
            .iter_mut()
            .find(|pool| pool.id == pool_id)
            .ok_or(StoreError::PoolNotFound { id: pool_id })?;
        pool.members.push(member.clone());
        Ok(())
    }

    pub fn pool(&self, pool_id: Uuid) -> Option<&PoolRecord> {
        self.pools.iter().find(|pool| pool.id == pool_id)
    }
}

/// Detects anomalies in a dataset snapshot without rejecting it.
pub fn dataset_warnings(dataset: &Dataset) -> Vec<String> {
    let mut warnings = Vec::new();
    let mut codes = HashSet::new();
    for record in &dataset.records {
        if !codes.insert(record.code.as_str()) {
            warnings.push(format!("duplicate route code {}", record.code));
        }
        if record.fuel_consumption_tonnes.is_some_and(|mass| mass < 0.0) {
            warnings.push(format!("route {} has negative fuel consumption", record.code));
        }
    }

    let baselines = dataset
        .records
        .iter()
        .filter(|record| record.is_baseline)
        .count();
    if baselines > 1 {
        warnings.push(format!("{baselines} routes flagged as baseline"));
    }

    for entry in &dataset.ledger {
        if !codes.contains(entry.entity_id.as_str()) {
            warnings.push(format!(
                "ledger entry {} references unknown route {}",
                entry.id, entry.entity_id
            ));
        }
        if !entry.amount.is_positive() {
            warnings.push(format!(
                "ledger entry {} has non-positive amount {}",
                entry.id, entry.amount
            ));
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        Dataset::with_records(vec![
            FuelRecord::new("R001", "HFO", 10.0, 2025).as_baseline(),
            FuelRecord::new("R002", "LNG", 5.0, 2025),
        ])
    }

    #[test]
    fn set_baseline_moves_the_flag() {
        let mut data = dataset();
        data.set_baseline("R002").unwrap();
        assert_eq!(data.find_baseline().unwrap().code, "R002");
        assert_eq!(data.records.iter().filter(|r| r.is_baseline).count(), 1);
    }

    #[test]
    fn set_baseline_unknown_code_keeps_previous_flag() {
        let mut data = dataset();
        let err = data.set_baseline("R999").unwrap_err();
        assert!(matches!(err, StoreError::RecordNotFound { .. }));
        assert_eq!(data.find_baseline().unwrap().code, "R001");
    }

    #[test]
    fn warnings_flag_duplicates_and_orphans() {
        let mut data = dataset();
        data.records.push(FuelRecord::new("R001", "MGO", 1.0, 2025).as_baseline());
        data.ledger
            .push(LedgerEntry::banked("GHOST", 2025, TonnesCo2e(1.0)));
        let warnings = dataset_warnings(&data);
        assert!(warnings.iter().any(|w| w.contains("duplicate route code R001")));
        assert!(warnings.iter().any(|w| w.contains("2 routes flagged")));
        assert!(warnings.iter().any(|w| w.contains("unknown route GHOST")));
    }
}
