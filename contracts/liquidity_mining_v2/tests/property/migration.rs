#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]
//! Property-based tests for the migration protocol.
//!
//! Invariants tested:
//! - Migrated positions and pool totals equal the source snapshot
//! - How users are split into batches, and in which order, does not matter
//! - A migrated user cannot be migrated again
//! - After the switch-over every user earns exactly what the source would
//!   have paid

use common::LedgerError;
use proptest::prelude::*;
use soroban_sdk::Address;

use crate::fixture::Deployment;

const REWARD_PER_BLOCK: i128 = 5;

/// Stake `amounts[i]` for user `i`, `gaps[i]` blocks after the previous one.
fn stake_on_source(d: &Deployment, amounts: &[i128], gaps: &[u32]) -> std::vec::Vec<Address> {
    let users = d.users(amounts.len());
    for (i, user) in users.iter().enumerate() {
        d.advance(gaps[i]);
        d.mint_stake(user, amounts[i]);
        d.v1.deposit(user, &d.pool_token, &amounts[i], &None);
    }
    users
}

fn stakes() -> impl Strategy<Value = (std::vec::Vec<i128>, std::vec::Vec<u32>)> {
    (1usize..=6).prop_flat_map(|n| {
        (
            prop::collection::vec(1i128..=10_000, n),
            prop::collection::vec(0u32..=10, n),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_batching_does_not_change_outcome(
        (amounts, gaps) in stakes(),
        split_seed in 0usize..=6,
        reverse in any::<bool>(),
        settle_blocks in 1u32..=20,
    ) {
        let d = Deployment::new(REWARD_PER_BLOCK, true);
        let mut users = stake_on_source(&d, &amounts, &gaps);
        d.advance(settle_blocks);
        d.open_migration();
        d.v2.migrate_pools(&d.admin);

        if reverse {
            users.reverse();
        }
        let split = split_seed % (users.len() + 1);
        let (first, second) = users.split_at(split);
        let migrated = d.v2.migrate_users(&d.admin, &d.batch(first))
            + d.v2.migrate_users(&d.admin, &d.batch(second));
        prop_assert_eq!(migrated as usize, users.len());

        let source_pool = d.v1.get_pool_info(&d.pool_token);
        let target_pool = d.v2.get_pool_info(&d.pool_token);
        prop_assert_eq!(target_pool.total_staked, source_pool.total_staked);
        prop_assert_eq!(target_pool.accruals, source_pool.accruals);
        prop_assert_eq!(target_pool.total_staked, amounts.iter().sum::<i128>());

        for user in users.iter() {
            prop_assert!(d.v2.is_user_migrated(user));
            prop_assert_eq!(d.v2.get_user_positions(user), d.v1.get_user_positions(user));
            prop_assert_eq!(
                d.v2.get_pending_rewards(&d.pool_token, user).get(0).unwrap(),
                d.v1.get_pending_reward(&d.pool_token, user)
            );
        }

        // Replaying any already-migrated user is refused.
        if let Some(user) = users.first() {
            let replay = d.v2.try_migrate_users(&d.admin, &d.batch(core::slice::from_ref(user)));
            match replay {
                Err(Ok(e)) => prop_assert_eq!(e, LedgerError::AlreadyProcessed),
                _ => prop_assert!(false, "Expected AlreadyProcessed error"),
            }
        }
    }

    #[test]
    fn prop_switch_over_preserves_earnings(
        (amounts, gaps) in stakes(),
        before in 1u32..=20,
        after in 1u32..=20,
    ) {
        let d = Deployment::new(REWARD_PER_BLOCK, true);
        let users = stake_on_source(&d, &amounts, &gaps);
        d.advance(before);

        d.open_migration();
        d.v2.migrate_pools(&d.admin);
        d.v2.migrate_users(&d.admin, &d.batch(&users));
        d.v2.migrate_funds(&d.admin);
        d.v2.finish_migration(&d.admin);

        // Project what the source would owe `after` blocks later by replaying
        // its accrual on a clone of the snapshot.
        let pool = d.v1.get_pool_info(&d.pool_token);
        let state = pool.accruals.get(d.reward_token.clone()).unwrap();
        let mut projected = state.clone();
        common::accrual::update_pool(
            &mut projected,
            d.block() + after,
            pool.allocation_point,
            d.v1.get_total_allocation_point(),
            pool.total_staked,
        )
        .unwrap();

        d.advance(after);
        for (i, user) in users.iter().enumerate() {
            let position = d.v1.get_user_positions(user).get(0).unwrap();
            let reward = position.info.rewards.get(d.reward_token.clone()).unwrap_or_default();
            let expected = reward.accumulated_reward
                + common::accrual::settle(amounts[i], projected.acc_reward_per_share, reward.reward_debt)
                    .unwrap();

            let payouts = d.v2.withdraw(user, &d.pool_token, &amounts[i], &None);
            let paid: i128 = payouts.iter().map(|p| p.gross).sum();
            prop_assert_eq!(paid, expected);
            prop_assert_eq!(d.balance(&d.pool_token, user), amounts[i]);
        }
        prop_assert_eq!(d.v2.get_pool_info(&d.pool_token).total_staked, 0);
    }
}
