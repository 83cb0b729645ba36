use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    common::Period,
    units::{GramsCo2e, TonnesCo2e},
};

/// Direction of a banking ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryKind {
    Banked,
    Applied,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Banked => f.write_str("BANKED"),
            EntryKind::Applied => f.write_str("APPLIED"),
        }
    }
}

/// Immutable ledger line. Reversals are new entries, never edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub entity_id: String,
    pub period: Period,
    pub amount: TonnesCo2e,
    pub kind: EntryKind,
    pub recorded_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn new(
        entity_id: impl Into<String>,
        period: Period,
        amount: TonnesCo2e,
        kind: EntryKind,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            entity_id: entity_id.into(),
            period,
            amount,
            kind,
            recorded_at: Utc::now(),
        }
    }

    pub fn banked(entity_id: impl Into<String>, period: Period, amount: TonnesCo2e) -> Self {
        Self::new(entity_id, period, amount, EntryKind::Banked)
    }

    pub fn applied(entity_id: impl Into<String>, period: Period, amount: TonnesCo2e) -> Self {
        Self::new(entity_id, period, amount, EntryKind::Applied)
    }

    pub fn is_applied(&self) -> bool {
        self.kind == EntryKind::Applied
    }

    pub fn belongs_to(&self, entity_id: &str, period: Period) -> bool {
        self.entity_id == entity_id && self.period == period
    }
}

/// Result of a bank or apply call, all values in grams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankingOutcome {
    pub entity_id: String,
    pub period: Period,
    pub cb_before: GramsCo2e,
    pub applied: GramsCo2e,
    pub cb_after: GramsCo2e,
}

/// Whether `apply` requires the target balance to be in deficit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyPolicy {
    /// Banked surplus may be applied regardless of the current balance.
    #[default]
    AnyBalance,
    /// Only balances strictly below zero may draw on banked surplus.
    DeficitOnly,
}
