use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{common::Period, units::GramsCo2e};

/// A pool participant and its starting balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolMemberInput {
    pub entity_id: String,
    pub cb_before: GramsCo2e,
}

impl PoolMemberInput {
    pub fn new(entity_id: impl Into<String>, cb_before: impl Into<GramsCo2e>) -> Self {
        Self {
            entity_id: entity_id.into(),
            cb_before: cb_before.into(),
        }
    }
}

/// A participant after redistribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolMember {
    pub entity_id: String,
    pub cb_before: GramsCo2e,
    pub cb_after: GramsCo2e,
}

impl PoolMember {
    pub fn was_deficit(&self) -> bool {
        self.cb_before.is_negative()
    }

    pub fn was_surplus(&self) -> bool {
        self.cb_before.is_positive()
    }

    /// Net amount received (positive) or given away (negative).
    pub fn transferred(&self) -> GramsCo2e {
        self.cb_after - self.cb_before
    }
}

/// Outcome of one pooling round. Members keep their input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolResult {
    pub period: Period,
    pub members: Vec<PoolMember>,
    pub pool_sum: GramsCo2e,
}

impl PoolResult {
    pub fn member(&self, entity_id: &str) -> Option<&PoolMember> {
        self.members
            .iter()
            .find(|member| member.entity_id == entity_id)
    }
}

/// Persisted projection of a pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolRecord {
    pub id: Uuid,
    pub name: String,
    pub period: Period,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub members: Vec<PoolMember>,
}

impl PoolRecord {
    pub fn new(name: impl Into<String>, period: Period) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            period,
            created_at: Utc::now(),
            members: Vec::new(),
        }
    }
}
