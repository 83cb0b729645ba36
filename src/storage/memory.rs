use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use uuid::Uuid;

use crate::domain::{
    common::Period,
    fuel::{FuelRecord, RecordFilter},
    ledger::{EntryKind, LedgerEntry},
    pool::{PoolMember, PoolRecord},
    units::TonnesCo2e,
};
use crate::errors::StoreError;

use super::{Dataset, FuelRecordStore, LedgerStore, PoolStore, Result};

/// In-process store backed by a lock-guarded [`Dataset`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<Dataset>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<FuelRecord>) -> Self {
        Self::from_dataset(Dataset::with_records(records))
    }

    pub fn from_dataset(dataset: Dataset) -> Self {
        Self {
            data: RwLock::new(dataset),
        }
    }

    pub fn insert_record(&self, record: FuelRecord) -> Result<()> {
        self.write()?.records.push(record);
        Ok(())
    }

    pub fn snapshot(&self) -> Result<Dataset> {
        Ok(self.read()?.clone())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Dataset>> {
        self.data.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Dataset>> {
        self.data.write().map_err(|_| StoreError::Poisoned)
    }
}

impl FuelRecordStore for MemoryStore {
    fn find_by_code(&self, code: &str) -> Result<Option<FuelRecord>> {
        Ok(self.read()?.find_by_code(code).cloned())
    }

    fn find_all(&self, filter: Option<&RecordFilter>) -> Result<Vec<FuelRecord>> {
        Ok(self.read()?.find_all(filter))
    }

    fn find_baseline(&self) -> Result<Option<FuelRecord>> {
        Ok(self.read()?.find_baseline().cloned())
    }

    fn set_baseline(&self, code: &str) -> Result<()> {
        self.write()?.set_baseline(code)
    }
}

impl LedgerStore for MemoryStore {
    fn append_entry(&self, entry: LedgerEntry) -> Result<()> {
        self.write()?.ledger.push(entry);
        Ok(())
    }

    fn sum_entries(
        &self,
        entity_id: &str,
        period: Period,
        kind: EntryKind,
    ) -> Result<TonnesCo2e> {
        Ok(self.read()?.sum_entries(entity_id, period, kind))
    }

    fn entries(&self, entity_id: &str, period: Period) -> Result<Vec<LedgerEntry>> {
        Ok(self.read()?.entries(entity_id, period))
    }
}

impl PoolStore for MemoryStore {
    fn create_pool(&self, name: &str, period: Period) -> Result<Uuid> {
        Ok(self.write()?.create_pool(name, period))
    }

    fn add_member(&self, pool_id: Uuid, member: &PoolMember) -> Result<()> {
        self.write()?.add_member(pool_id, member)
    }

    fn pool(&self, pool_id: Uuid) -> Result<Option<PoolRecord>> {
        Ok(self.read()?.pool(pool_id).cloned())
    }
}
