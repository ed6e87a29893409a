#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]
//! Property-based tests for a ledger under arbitrary user traffic.
//!
//! Invariants tested:
//! - Pool `total_staked` always equals the sum of user stakes and the
//!   ledger's custodied pool-token balance
//! - Rewards paid never exceed what the pool emitted while staked
//! - A second claim in the same block pays nothing

use proptest::prelude::*;
use proptest_derive::Arbitrary;

use crate::fixture::{Deployment, REWARD_SUPPLY};

const USERS: usize = 3;
const REWARD_PER_BLOCK: i128 = 7;

#[derive(Debug, Clone, Arbitrary)]
enum Action {
    Deposit(
        #[proptest(strategy = "0usize..USERS")] usize,
        #[proptest(strategy = "1i128..=1_000")] i128,
    ),
    /// Withdraw a percentage of the user's stake.
    Withdraw(
        #[proptest(strategy = "0usize..USERS")] usize,
        #[proptest(strategy = "0i128..=100")] i128,
    ),
    Claim(#[proptest(strategy = "0usize..USERS")] usize),
    EmergencyWithdraw(#[proptest(strategy = "0usize..USERS")] usize),
    Advance(#[proptest(strategy = "1u32..=20")] u32),
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_stake_and_rewards_are_conserved(
        actions in prop::collection::vec(any::<Action>(), 1..40),
    ) {
        let d = Deployment::new(REWARD_PER_BLOCK, false);
        let users = d.users(USERS);
        let mut stakes = [0i128; USERS];
        let mut emitted: i128 = 0;

        for action in actions {
            match action {
                Action::Deposit(i, amount) => {
                    d.mint_stake(&users[i], amount);
                    d.v2.deposit(&users[i], &d.pool_token, &amount, &None);
                    stakes[i] += amount;
                }
                Action::Withdraw(i, pct) => {
                    if stakes[i] == 0 {
                        continue;
                    }
                    let amount = stakes[i] * pct / 100;
                    d.v2.withdraw(&users[i], &d.pool_token, &amount, &None);
                    stakes[i] -= amount;
                }
                Action::Claim(i) => {
                    d.v2.claim_reward(&users[i], &d.pool_token, &None);
                    let again = d.v2.claim_reward(&users[i], &d.pool_token, &None);
                    prop_assert_eq!(again.len(), 0);
                }
                Action::EmergencyWithdraw(i) => {
                    if stakes[i] == 0 {
                        continue;
                    }
                    let returned = d.v2.emergency_withdraw(&users[i], &d.pool_token);
                    prop_assert_eq!(returned, stakes[i]);
                    stakes[i] = 0;
                }
                Action::Advance(blocks) => {
                    if stakes.iter().sum::<i128>() > 0 {
                        emitted += REWARD_PER_BLOCK * i128::from(blocks);
                    }
                    d.advance(blocks);
                }
            }

            let total: i128 = stakes.iter().sum();
            let pool = d.v2.get_pool_info(&d.pool_token);
            prop_assert_eq!(pool.total_staked, total);
            prop_assert_eq!(d.balance(&d.pool_token, &d.v2.address), total);
            prop_assert_eq!(
                d.v2.get_reward_tokens().get(0).unwrap().total_users_balance,
                total
            );
            for (i, user) in users.iter().enumerate() {
                prop_assert_eq!(d.v2.get_user_info(&d.pool_token, user).amount, stakes[i]);
            }

            let paid: i128 = users.iter().map(|u| d.balance(&d.reward_token, u)).sum();
            prop_assert!(paid <= emitted, "paid {} > emitted {}", paid, emitted);
            prop_assert_eq!(
                d.balance(&d.reward_token, &d.v2.address),
                REWARD_SUPPLY - paid
            );
        }
    }

    /// A lone staker's full exit never pays more than the emission and loses
    /// at most one unit to flooring.
    #[test]
    fn prop_single_staker_earns_emission_minus_rounding(
        amount in 1i128..=1_000_000,
        blocks in 1u32..=500,
    ) {
        let d = Deployment::new(REWARD_PER_BLOCK, false);
        let user = d.users(1).pop().unwrap();
        d.mint_stake(&user, amount);
        d.v2.deposit(&user, &d.pool_token, &amount, &None);

        d.advance(blocks);
        d.v2.withdraw(&user, &d.pool_token, &amount, &None);

        let emitted = REWARD_PER_BLOCK * i128::from(blocks);
        let paid = d.balance(&d.reward_token, &user);
        prop_assert!(paid <= emitted);
        prop_assert!(emitted - paid <= 1, "lost {} to rounding", emitted - paid);
        prop_assert_eq!(d.balance(&d.pool_token, &user), amount);
    }
}
