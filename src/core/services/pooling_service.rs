//! Greedy redistribution of compliance balance inside one pool.

use std::{cmp::Ordering, collections::HashSet};

use crate::domain::{
    common::Period,
    pool::{PoolMember, PoolMemberInput, PoolRecord, PoolResult},
    units::GramsCo2e,
};
use crate::errors::{PoolError, StoreError};
use crate::storage::{FuelRecordStore, PoolStore};

use super::compliance_service::ComplianceService;

pub struct PoolingService;

impl PoolingService {
    /// Forms a pool for `period` and redistributes surplus onto deficits.
    ///
    /// Surplus members are drained largest first and deficits are filled
    /// most negative first. Equal values keep their input order. Members
    /// are returned in input order.
    ///
    /// Balances are expected in whole grams. With fractional balances the
    /// input sum can round up to zero; a deficit left uncovered after the
    /// transfers is then reported as `PoolSumNegative`.
    pub fn create_pool(
        period: Period,
        members: &[PoolMemberInput],
    ) -> Result<PoolResult, PoolError> {
        if members.is_empty() {
            return Err(PoolError::InvalidPool {
                reason: "pool must have at least one member".into(),
            });
        }
        let mut seen = HashSet::new();
        for member in members {
            if !seen.insert(member.entity_id.as_str()) {
                return Err(PoolError::InvalidPool {
                    reason: format!("{} appears more than once", member.entity_id),
                });
            }
            if !member.cb_before.is_finite() {
                return Err(PoolError::InvalidPool {
                    reason: format!("{} has a non-finite balance", member.entity_id),
                });
            }
        }

        let pool_sum: GramsCo2e = members.iter().map(|member| member.cb_before).sum();
        if pool_sum.is_negative() {
            tracing::warn!(period, pool_sum = pool_sum.value(), "pool rejected");
            return Err(PoolError::PoolSumNegative { pool_sum });
        }

        let mut working: Vec<PoolMember> = members
            .iter()
            .map(|member| PoolMember {
                entity_id: member.entity_id.clone(),
                cb_before: member.cb_before,
                cb_after: member.cb_before,
            })
            .collect();

        let surplus = ordered_indices(&working, GramsCo2e::is_positive, descending);
        let deficit = ordered_indices(&working, GramsCo2e::is_negative, ascending);

        for &d in &deficit {
            for &s in &surplus {
                if !working[d].cb_after.is_negative() {
                    break;
                }
                let available = working[s].cb_after;
                if !available.is_positive() {
                    continue;
                }
                let transfer = available.min(working[d].cb_after.abs());
                working[s].cb_after -= transfer;
                working[d].cb_after += transfer;
            }
        }

        let uncovered: GramsCo2e = working
            .iter()
            .filter(|member| member.cb_after.is_negative())
            .map(|member| member.cb_after)
            .sum();
        if uncovered.is_negative() {
            tracing::warn!(period, uncovered = uncovered.value(), "pool left a deficit uncovered");
            return Err(PoolError::PoolSumNegative {
                pool_sum: uncovered,
            });
        }

        Self::verify_allocation(&working)?;

        let pool_sum: GramsCo2e = working.iter().map(|member| member.cb_after).sum();
        tracing::info!(period, members = working.len(), "pool allocated");
        Ok(PoolResult {
            period,
            members: working,
            pool_sum,
        })
    }

    /// Checks the per-member post-conditions of an allocation.
    ///
    /// A breach means the allocation itself is wrong; callers should treat
    /// it as a bug rather than a user error.
    pub fn verify_allocation(members: &[PoolMember]) -> Result<(), PoolError> {
        for member in members {
            if member.was_deficit() && member.cb_after < member.cb_before {
                let err = PoolError::DeficitShipWorse {
                    entity_id: member.entity_id.clone(),
                    cb_before: member.cb_before,
                    cb_after: member.cb_after,
                };
                tracing::error!(%err, "pool invariant breached");
                return Err(err);
            }
            if member.was_surplus() && member.cb_after.is_negative() {
                let err = PoolError::SurplusShipNegative {
                    entity_id: member.entity_id.clone(),
                    cb_after: member.cb_after,
                };
                tracing::error!(%err, "pool invariant breached");
                return Err(err);
            }
        }
        Ok(())
    }

    /// Builds a pool from stored records, using each raw balance as `cb_before`.
    pub fn create_pool_for_entities(
        records: &dyn FuelRecordStore,
        period: Period,
        codes: &[String],
        target_intensity: f64,
    ) -> Result<PoolResult, PoolError> {
        let mut members = Vec::with_capacity(codes.len());
        for code in codes {
            let cb = ComplianceService::cb_for_entity(records, code, target_intensity)?;
            members.push(PoolMemberInput::new(code.clone(), cb.cb_grams));
        }
        Self::create_pool(period, &members)
    }

    /// Writes a computed pool through the store and returns the stored record.
    pub fn persist_pool(
        store: &dyn PoolStore,
        name: &str,
        result: &PoolResult,
    ) -> Result<PoolRecord, PoolError> {
        let pool_id = store.create_pool(name, result.period)?;
        for member in &result.members {
            store.add_member(pool_id, member)?;
        }
        let record = store
            .pool(pool_id)?
            .ok_or(StoreError::PoolNotFound { id: pool_id })?;
        tracing::info!(pool_id = %pool_id, name, "pool persisted");
        Ok(record)
    }
}

fn ordered_indices(
    members: &[PoolMember],
    keep: fn(GramsCo2e) -> bool,
    order: fn(&GramsCo2e, &GramsCo2e) -> Ordering,
) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..members.len())
        .filter(|&idx| keep(members[idx].cb_after))
        .collect();
    // stable: ties keep input order
    indices.sort_by(|&a, &b| order(&members[a].cb_after, &members[b].cb_after));
    indices
}

fn descending(a: &GramsCo2e, b: &GramsCo2e) -> Ordering {
    b.value().total_cmp(&a.value())
}

fn ascending(a: &GramsCo2e, b: &GramsCo2e) -> Ordering {
    a.value().total_cmp(&b.value())
}
