//! Banking ledger: surplus is banked per (entity, period) and later applied.
//!
//! Amounts enter and leave in grams and are stored in tonnes. The
//! read-validate-write sequence of [`BankingLedger::bank`] and
//! [`BankingLedger::apply`] runs under a lock dedicated to the
//! `(entity_id, period)` key, so concurrent callers cannot both pass the
//! capacity checks against the same balance. A key's lock is dropped from
//! the registry once no caller holds it, so the registry only grows with
//! the number of keys in flight.
//!
//! Ledger sums go through the tonne representation, which can leave a
//! residue of a few ulps. Capacity checks therefore allow a relative slack
//! of [`LEDGER_REL_TOLERANCE`], far below one gram for any real balance.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use crate::domain::{
    common::Period,
    ledger::{ApplyPolicy, BankingOutcome, EntryKind, LedgerEntry},
    units::{GramsCo2e, TonnesCo2e},
};
use crate::errors::{BankingError, StoreError};
use crate::storage::{FuelRecordStore, LedgerStore};

use super::compliance_service::ComplianceService;

type LedgerKey = (String, Period);

/// Relative slack applied when comparing against summed ledger amounts.
pub const LEDGER_REL_TOLERANCE: f64 = 1e-12;

pub struct BankingLedger {
    records: Arc<dyn FuelRecordStore>,
    ledger: Arc<dyn LedgerStore>,
    target_intensity: f64,
    policy: ApplyPolicy,
    locks: Mutex<HashMap<LedgerKey, Arc<Mutex<()>>>>,
}

impl BankingLedger {
    pub fn new(
        records: Arc<dyn FuelRecordStore>,
        ledger: Arc<dyn LedgerStore>,
        target_intensity: f64,
    ) -> Self {
        Self {
            records,
            ledger,
            target_intensity,
            policy: ApplyPolicy::default(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_policy(mut self, policy: ApplyPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn target_intensity(&self) -> f64 {
        self.target_intensity
    }

    pub fn policy(&self) -> ApplyPolicy {
        self.policy
    }

    /// Banks `amount` of the entity's positive raw balance.
    pub fn bank(
        &self,
        entity_id: &str,
        period: Period,
        amount: GramsCo2e,
    ) -> Result<BankingOutcome, BankingError> {
        ensure_positive(amount)?;
        self.with_key_lock(entity_id, period, || self.bank_locked(entity_id, period, amount))
    }

    fn bank_locked(
        &self,
        entity_id: &str,
        period: Period,
        amount: GramsCo2e,
    ) -> Result<BankingOutcome, BankingError> {
        let cb_before = self.raw_cb(entity_id)?;
        if !cb_before.is_positive() {
            tracing::warn!(entity_id, period, cb = cb_before.value(), "bank rejected");
            return Err(BankingError::CbNotPositive {
                entity_id: entity_id.into(),
                period,
                cb: cb_before,
            });
        }
        if amount > cb_before {
            return Err(BankingError::AmountExceedsAvailable {
                requested: amount,
                available: cb_before,
            });
        }

        self.ledger
            .append_entry(LedgerEntry::banked(entity_id, period, amount.to_tonnes()))?;
        tracing::info!(entity_id, period, grams = amount.value(), "banked surplus");

        Ok(BankingOutcome {
            entity_id: entity_id.into(),
            period,
            cb_before,
            applied: amount,
            cb_after: cb_before - amount,
        })
    }

    /// Draws `amount` from the banked surplus of `(entity_id, period)`.
    pub fn apply(
        &self,
        entity_id: &str,
        period: Period,
        amount: GramsCo2e,
    ) -> Result<BankingOutcome, BankingError> {
        ensure_positive(amount)?;
        self.with_key_lock(entity_id, period, || self.apply_locked(entity_id, period, amount))
    }

    fn apply_locked(
        &self,
        entity_id: &str,
        period: Period,
        amount: GramsCo2e,
    ) -> Result<BankingOutcome, BankingError> {
        let cb_before = self.raw_cb(entity_id)?;
        if self.policy == ApplyPolicy::DeficitOnly && !cb_before.is_negative() {
            return Err(BankingError::NoDeficit {
                entity_id: entity_id.into(),
                period,
                cb: cb_before,
            });
        }

        let available = available_total(self.ledger.as_ref(), entity_id, period)?.to_grams();
        if !available.is_positive() {
            tracing::warn!(entity_id, period, "apply rejected: nothing banked");
            return Err(BankingError::NoBankedSurplus {
                entity_id: entity_id.into(),
                period,
            });
        }
        if exceeds(amount, available) {
            return Err(BankingError::AmountExceedsAvailable {
                requested: amount,
                available,
            });
        }

        self.ledger
            .append_entry(LedgerEntry::applied(entity_id, period, amount.to_tonnes()))?;
        tracing::info!(entity_id, period, grams = amount.value(), "applied banked surplus");

        Ok(BankingOutcome {
            entity_id: entity_id.into(),
            period,
            cb_before,
            applied: amount,
            cb_after: cb_before + amount,
        })
    }

    /// Banked minus applied, never below zero.
    pub fn available_banked(
        &self,
        entity_id: &str,
        period: Period,
    ) -> Result<TonnesCo2e, BankingError> {
        Ok(available_total(self.ledger.as_ref(), entity_id, period)?)
    }

    pub fn applied_banked(
        &self,
        entity_id: &str,
        period: Period,
    ) -> Result<TonnesCo2e, BankingError> {
        Ok(applied_total(self.ledger.as_ref(), entity_id, period)?)
    }

    /// Ledger history for one key, in append order.
    pub fn entries(&self, entity_id: &str, period: Period) -> Result<Vec<LedgerEntry>, BankingError> {
        Ok(self.ledger.entries(entity_id, period)?)
    }

    fn raw_cb(&self, entity_id: &str) -> Result<GramsCo2e, BankingError> {
        let result =
            ComplianceService::cb_for_entity(self.records.as_ref(), entity_id, self.target_intensity)?;
        Ok(result.cb_grams)
    }

    /// Runs `critical` while holding the lock of `(entity_id, period)`.
    fn with_key_lock<T>(
        &self,
        entity_id: &str,
        period: Period,
        critical: impl FnOnce() -> Result<T, BankingError>,
    ) -> Result<T, BankingError> {
        let key = (entity_id.to_string(), period);
        let lock = self.key_lock(&key)?;
        let result = match lock.lock() {
            Ok(_guard) => critical(),
            Err(_) => Err(StoreError::Poisoned.into()),
        };
        drop(lock);
        self.release_key(&key);
        result
    }

    fn key_lock(&self, key: &LedgerKey) -> Result<Arc<Mutex<()>>, StoreError> {
        let mut locks = self.locks.lock().map_err(|_| StoreError::Poisoned)?;
        let lock = locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())));
        Ok(Arc::clone(lock))
    }

    /// Forgets the key's lock when the registry holds the only reference.
    fn release_key(&self, key: &LedgerKey) {
        let Ok(mut locks) = self.locks.lock() else {
            return;
        };
        if locks
            .get(key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(key);
        }
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.locks.lock().map(|locks| locks.len()).unwrap_or_default()
    }
}

/// True when `amount` is above `available` by more than the ledger slack.
fn exceeds(amount: GramsCo2e, available: GramsCo2e) -> bool {
    let slack = LEDGER_REL_TOLERANCE * available.value().abs().max(1.0);
    amount.value() - available.value() > slack
}

fn ensure_positive(amount: GramsCo2e) -> Result<(), BankingError> {
    if amount.is_positive() && amount.is_finite() {
        Ok(())
    } else {
        Err(BankingError::InvalidAmount { amount })
    }
}

pub(crate) fn applied_total(
    ledger: &dyn LedgerStore,
    entity_id: &str,
    period: Period,
) -> Result<TonnesCo2e, StoreError> {
    ledger.sum_entries(entity_id, period, EntryKind::Applied)
}

pub(crate) fn available_total(
    ledger: &dyn LedgerStore,
    entity_id: &str,
    period: Period,
) -> Result<TonnesCo2e, StoreError> {
    let banked = ledger.sum_entries(entity_id, period, EntryKind::Banked)?;
    let applied = ledger.sum_entries(entity_id, period, EntryKind::Applied)?;
    let remaining = banked - applied;
    // Rounding residue of a full drawdown counts as empty.
    if remaining.value() <= LEDGER_REL_TOLERANCE * banked.value() {
        return Ok(TonnesCo2e::ZERO);
    }
    Ok(remaining)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fuel::FuelRecord;
    use crate::storage::MemoryStore;

    const TARGET: f64 = 89.3368;

    fn ledger_with(records: Vec<FuelRecord>) -> BankingLedger {
        let store = Arc::new(MemoryStore::with_records(records));
        BankingLedger::new(store.clone(), store, TARGET)
    }

    fn surplus_ledger() -> BankingLedger {
        ledger_with(vec![
            FuelRecord::new("R003", "LNG", 1.0, 2025),
            FuelRecord::new("R001", "HFO", 1.0, 2025),
        ])
    }

    #[test]
    fn bank_reduces_balance_exactly() {
        let ledger = surplus_ledger();
        let outcome = ledger.bank("R003", 2025, GramsCo2e(500_000.0)).unwrap();
        assert_eq!(outcome.cb_after, outcome.cb_before - GramsCo2e(500_000.0));
        assert_eq!(
            ledger.available_banked("R003", 2025).unwrap(),
            TonnesCo2e(0.5)
        );
    }

    #[test]
    fn invalid_amount_is_checked_before_lookup() {
        let ledger = surplus_ledger();
        let err = ledger.bank("UNKNOWN", 2025, GramsCo2e(0.0)).unwrap_err();
        assert_eq!(err.code(), "INVALID_AMOUNT");
        let err = ledger.apply("UNKNOWN", 2025, GramsCo2e(-5.0)).unwrap_err();
        assert_eq!(err.code(), "INVALID_AMOUNT");
    }

    #[test]
    fn deficit_entity_cannot_bank() {
        let ledger = surplus_ledger();
        let err = ledger.bank("R001", 2025, GramsCo2e(1.0)).unwrap_err();
        assert!(matches!(err, BankingError::CbNotPositive { .. }));
    }

    #[test]
    fn banking_more_than_balance_fails() {
        let ledger = surplus_ledger();
        let err = ledger.bank("R003", 2025, GramsCo2e(1_000_000.0)).unwrap_err();
        assert!(matches!(err, BankingError::AmountExceedsAvailable { .. }));
        assert_eq!(ledger.entries("R003", 2025).unwrap().len(), 0);
    }

    #[test]
    fn apply_requires_banked_surplus() {
        let ledger = surplus_ledger();
        let err = ledger.apply("R001", 2025, GramsCo2e(10.0)).unwrap_err();
        assert!(matches!(err, BankingError::NoBankedSurplus { .. }));
    }

    #[test]
    fn apply_draws_down_available() {
        let ledger = surplus_ledger();
        ledger.bank("R003", 2025, GramsCo2e(500_000.0)).unwrap();
        let outcome = ledger.apply("R003", 2025, GramsCo2e(200_000.0)).unwrap();
        assert_eq!(outcome.cb_after, outcome.cb_before + GramsCo2e(200_000.0));
        assert_eq!(ledger.applied_banked("R003", 2025).unwrap(), TonnesCo2e(0.2));

        let err = ledger.apply("R003", 2025, GramsCo2e(400_000.0)).unwrap_err();
        assert!(matches!(err, BankingError::AmountExceedsAvailable { .. }));
    }

    #[test]
    fn periods_are_tracked_separately() {
        let ledger = surplus_ledger();
        ledger.bank("R003", 2025, GramsCo2e(100_000.0)).unwrap();
        assert_eq!(ledger.available_banked("R003", 2026).unwrap(), TonnesCo2e::ZERO);
    }

    #[test]
    fn deficit_only_policy_rejects_surplus_entities() {
        let ledger = surplus_ledger().with_policy(ApplyPolicy::DeficitOnly);
        ledger.bank("R003", 2025, GramsCo2e(100_000.0)).unwrap();
        let err = ledger.apply("R003", 2025, GramsCo2e(50_000.0)).unwrap_err();
        assert_eq!(err.code(), "NO_DEFICIT");
    }

    #[test]
    fn full_drawdown_of_several_deposits_is_allowed() {
        for (first, second) in [(700_000.0, 100_000.0), (300_000.0, 600_000.0)] {
            let ledger = ledger_with(vec![FuelRecord::new("R003", "LNG", 10.0, 2025)]);
            ledger.bank("R003", 2025, GramsCo2e(first)).unwrap();
            ledger.bank("R003", 2025, GramsCo2e(second)).unwrap();

            let outcome = ledger
                .apply("R003", 2025, GramsCo2e(first + second))
                .unwrap();
            assert_eq!(outcome.applied, GramsCo2e(first + second));
            assert_eq!(
                ledger.available_banked("R003", 2025).unwrap(),
                TonnesCo2e::ZERO
            );
            let err = ledger.apply("R003", 2025, GramsCo2e(1.0)).unwrap_err();
            assert_eq!(err.code(), "NO_BANKED_SURPLUS");
        }
    }

    #[test]
    fn one_gram_over_the_banked_total_is_rejected() {
        let ledger = ledger_with(vec![FuelRecord::new("R003", "LNG", 10.0, 2025)]);
        ledger.bank("R003", 2025, GramsCo2e(700_000.0)).unwrap();
        ledger.bank("R003", 2025, GramsCo2e(100_000.0)).unwrap();
        let err = ledger.apply("R003", 2025, GramsCo2e(800_001.0)).unwrap_err();
        assert!(matches!(err, BankingError::AmountExceedsAvailable { .. }));
    }

    #[test]
    fn key_locks_are_released_after_use() {
        let ledger = surplus_ledger();
        ledger.bank("R003", 2025, GramsCo2e(100_000.0)).unwrap();
        ledger.apply("R003", 2025, GramsCo2e(50_000.0)).unwrap();
        assert!(ledger.bank("R001", 2025, GramsCo2e(1.0)).is_err());
        assert_eq!(ledger.tracked_keys(), 0);

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| ledger.apply("R003", 2025, GramsCo2e(10_000.0)));
            }
        });
        assert_eq!(ledger.tracked_keys(), 0);
        assert_eq!(ledger.entries("R003", 2025).unwrap().len(), 6);
    }
}
