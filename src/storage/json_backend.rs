use std::{
    fs,
    path::{Path, PathBuf},
    sync::{RwLock, RwLockReadGuard},
};

use uuid::Uuid;

use crate::domain::{
    common::Period,
    fuel::{FuelRecord, RecordFilter},
    ledger::{EntryKind, LedgerEntry},
    pool::{PoolMember, PoolRecord},
    units::TonnesCo2e,
};
use crate::errors::StoreError;
use crate::utils::persistence::write_atomic;

use super::{
    dataset_warnings, Dataset, FuelRecordStore, LedgerStore, PoolStore, Result,
    CURRENT_SCHEMA_VERSION,
};

/// File-backed store. Every mutation rewrites the dataset atomically.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    data: RwLock<Dataset>,
}

impl JsonStore {
    /// Opens `path`, creating it from `initial` when it does not exist yet.
    pub fn open(path: impl Into<PathBuf>, initial: Dataset) -> Result<Self> {
        let path = path.into();
        let dataset = if path.exists() {
            load_dataset_from_path(&path)?
        } else {
            save_dataset_to_path(&initial, &path)?;
            tracing::info!(path = %path.display(), "created dataset file");
            initial
        };
        for warning in dataset_warnings(&dataset) {
            tracing::warn!(path = %path.display(), "{warning}");
        }
        Ok(Self {
            path,
            data: RwLock::new(dataset),
        })
    }

    pub fn open_or_empty(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open(path, Dataset::default())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> Result<Dataset> {
        Ok(self.read()?.clone())
    }

    /// Replaces the whole dataset, for example with seed data.
    pub fn replace(&self, dataset: Dataset) -> Result<()> {
        self.mutate(|data| {
            *data = dataset;
            Ok(())
        })
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Dataset>> {
        self.data.read().map_err(|_| StoreError::Poisoned)
    }

    /// Applies `change` to a copy, persists it, then publishes it.
    fn mutate<T>(&self, change: impl FnOnce(&mut Dataset) -> Result<T>) -> Result<T> {
        let mut guard = self.data.write().map_err(|_| StoreError::Poisoned)?;
        let mut next = guard.clone();
        let value = change(&mut next)?;
        save_dataset_to_path(&next, &self.path)?;
        *guard = next;
        Ok(value)
    }
}

impl FuelRecordStore for JsonStore {
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
        self.mutate(|data| data.set_baseline(code))?;
        tracing::info!(code, "baseline updated");
        Ok(())
    }
}

impl LedgerStore for JsonStore {
    fn append_entry(&self, entry: LedgerEntry) -> Result<()> {
        self.mutate(|data| {
            data.ledger.push(entry);
            Ok(())
        })
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

impl PoolStore for JsonStore {
    fn create_pool(&self, name: &str, period: Period) -> Result<Uuid> {
        self.mutate(|data| Ok(data.create_pool(name, period)))
    }

    fn add_member(&self, pool_id: Uuid, member: &PoolMember) -> Result<()> {
        self.mutate(|data| data.add_member(pool_id, member))
    }

    fn pool(&self, pool_id: Uuid) -> Result<Option<PoolRecord>> {
        Ok(self.read()?.pool(pool_id).cloned())
    }
}

pub fn save_dataset_to_path(dataset: &Dataset, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(dataset)?;
    write_atomic(path, &json)?;
    tracing::info!(path = %path.display(), records = dataset.records.len(), "saved dataset");
    Ok(())
}

pub fn load_dataset_from_path(path: &Path) -> Result<Dataset> {
    let data = fs::read_to_string(path)?;
    let dataset: Dataset = serde_json::from_str(&data)?;
    if dataset.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(StoreError::UnsupportedSchema {
            found: dataset.schema_version,
            supported: CURRENT_SCHEMA_VERSION,
        });
    }
    Ok(dataset)
}
