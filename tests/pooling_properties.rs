//! Property tests for greedy pool allocation.

use fueleu_core::{
    core::services::PoolingService,
    domain::{pool::PoolMemberInput, units::GramsCo2e},
    errors::PoolError,
};
use proptest::prelude::*;

/// Whole-gram balances keep every sum exact in f64.
fn arb_members(max: usize) -> impl Strategy<Value = Vec<PoolMemberInput>> {
    prop::collection::vec(-10_000_000i64..10_000_000, 1..max).prop_map(|balances| {
        balances
            .into_iter()
            .enumerate()
            .map(|(idx, cb)| PoolMemberInput::new(format!("S{idx}"), cb as f64))
            .collect()
    })
}

fn sum_before(members: &[PoolMemberInput]) -> GramsCo2e {
    members.iter().map(|member| member.cb_before).sum()
}

proptest! {
    #[test]
    fn allocation_respects_member_invariants(members in arb_members(12)) {
        let total = sum_before(&members);
        prop_assume!(!total.is_negative());

        let result = PoolingService::create_pool(2025, &members).unwrap();
        prop_assert_eq!(result.members.len(), members.len());
        for (input, member) in members.iter().zip(&result.members) {
            prop_assert_eq!(&input.entity_id, &member.entity_id);
            if member.was_deficit() {
                prop_assert!(member.cb_after >= member.cb_before);
            }
            if member.was_surplus() {
                prop_assert!(member.cb_after >= GramsCo2e::ZERO);
                prop_assert!(member.cb_after <= member.cb_before);
            }
        }
        prop_assert!(PoolingService::verify_allocation(&result.members).is_ok());
    }

    #[test]
    fn allocation_conserves_the_pool_sum(members in arb_members(12)) {
        let total = sum_before(&members);
        prop_assume!(!total.is_negative());

        let result = PoolingService::create_pool(2025, &members).unwrap();
        let after: GramsCo2e = result.members.iter().map(|member| member.cb_after).sum();
        prop_assert_eq!(after, total);
        prop_assert_eq!(result.pool_sum, total);
    }

    #[test]
    fn non_negative_pools_cover_every_deficit(members in arb_members(12)) {
        prop_assume!(!sum_before(&members).is_negative());
        let result = PoolingService::create_pool(2025, &members).unwrap();
        prop_assert!(result.members.iter().all(|member| !member.cb_after.is_negative()));
    }

    #[test]
    fn negative_pools_are_rejected(members in arb_members(12)) {
        let total = sum_before(&members);
        prop_assume!(total.is_negative());

        let err = PoolingService::create_pool(2025, &members).unwrap_err();
        prop_assert_eq!(err, PoolError::PoolSumNegative { pool_sum: total });
    }
}
