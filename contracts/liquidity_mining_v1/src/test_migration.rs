extern crate std;

use common::{LedgerError, MigrationState};
use soroban_sdk::{testutils::Address as _, Address};

use crate::test::{Fixture, REWARD_SUPPLY, START_BLOCK};

// ── Grace period ──────────────────────────────────────────────────────────────

#[test]
fn test_grace_period_state_machine() {
    let f = Fixture::new(0);
    assert_eq!(f.client.get_migration_state(), MigrationState::NotStarted);
    assert_eq!(f.client.get_grace_start_block(), None);

    f.set_block(START_BLOCK + 7);
    f.client.start_migration_grace_period(&f.admin);
    assert_eq!(
        f.client.get_migration_state(),
        MigrationState::GracePeriodActive
    );
    assert_eq!(f.client.get_grace_start_block(), Some(START_BLOCK + 7));

    f.client.finish_migration_grace_period(&f.admin);
    assert_eq!(f.client.get_migration_state(), MigrationState::Finished);
}

#[test]
fn test_grace_period_cannot_start_twice() {
    let f = Fixture::new(0);
    f.client.start_migration_grace_period(&f.admin);

    let result = f.client.try_start_migration_grace_period(&f.admin);
    match result {
        Err(Ok(e)) => assert_eq!(e, LedgerError::InvalidState),
        _ => unreachable!("Expected InvalidState error"),
    }
}

#[test]
fn test_non_admin_cannot_start_grace_period() {
    let f = Fixture::new(0);
    let intruder = Address::generate(&f.env);

    let result = f.client.try_start_migration_grace_period(&intruder);
    match result {
        Err(Ok(e)) => assert_eq!(e, LedgerError::Unauthorized),
        _ => unreachable!("Expected Unauthorized error"),
    }
}

#[test]
fn test_finish_outside_window_fails() {
    let f = Fixture::new(0);

    match f.client.try_finish_migration_grace_period(&f.admin) {
        Err(Ok(e)) => assert_eq!(e, LedgerError::MigrationNotStarted),
        _ => unreachable!("Expected MigrationNotStarted error"),
    }

    f.client.start_migration_grace_period(&f.admin);
    f.client.finish_migration_grace_period(&f.admin);

    match f.client.try_finish_migration_grace_period(&f.admin) {
        Err(Ok(e)) => assert_eq!(e, LedgerError::MigrationAlreadyEnded),
        _ => unreachable!("Expected MigrationAlreadyEnded error"),
    }
}

// ── Successor ─────────────────────────────────────────────────────────────────

#[test]
fn test_set_successor() {
    let f = Fixture::new(0);
    let successor = Address::generate(&f.env);

    assert_eq!(f.client.get_successor(), None);
    f.client.set_successor(&f.admin, &successor);
    assert_eq!(f.client.get_successor(), Some(successor));
}

#[test]
fn test_successor_cannot_be_self() {
    let f = Fixture::new(0);

    let result = f.client.try_set_successor(&f.admin, &f.client.address);
    match result {
        Err(Ok(e)) => assert_eq!(e, LedgerError::InvalidAddress),
        _ => unreachable!("Expected InvalidAddress error"),
    }
}

#[test]
fn test_non_admin_cannot_set_successor() {
    let f = Fixture::new(0);
    let intruder = Address::generate(&f.env);

    let result = f.client.try_set_successor(&intruder, &intruder);
    match result {
        Err(Ok(e)) => assert_eq!(e, LedgerError::Unauthorized),
        _ => unreachable!("Expected Unauthorized error"),
    }
}

// ── Deposit policy ────────────────────────────────────────────────────────────

#[test]
fn test_deposits_stay_open_by_default_during_grace() {
    let f = Fixture::new(0);
    let user = f.staker(&f.pool_a, 100);
    f.client.start_migration_grace_period(&f.admin);

    f.client.deposit(&user, &f.pool_a, &100, &None);

    assert_eq!(f.client.get_user_info(&f.pool_a, &user).amount, 100);
}

#[test]
fn test_locked_deposits_during_grace() {
    let f = Fixture::new(0);
    let user = f.staker(&f.pool_a, 200);
    f.client.set_lock_deposits_in_grace(&f.admin, &true);
    assert!(f.client.get_lock_deposits_in_grace());

    // The lock only bites once the grace period is open.
    f.client.deposit(&user, &f.pool_a, &100, &None);
    f.client.start_migration_grace_period(&f.admin);

    let result = f.client.try_deposit(&user, &f.pool_a, &100, &None);
    match result {
        Err(Ok(e)) => assert_eq!(e, LedgerError::DepositsLocked),
        _ => unreachable!("Expected DepositsLocked error"),
    }

    // Leaving is never locked.
    f.set_block(START_BLOCK + 10);
    f.client.withdraw(&user, &f.pool_a, &100, &None);
    assert_eq!(f.balance(&f.pool_a, &user), 200);
    assert_eq!(f.balance(&f.reward_token, &user), 30);
}

// ── Source reads ──────────────────────────────────────────────────────────────

#[test]
fn test_user_positions_follow_pool_order() {
    let f = Fixture::new(0);
    f.client.add(&f.admin, &f.pool_b, &10);
    let user = f.staker(&f.pool_b, 100);
    let beneficiary = Address::generate(&f.env);
    f.client
        .deposit(&user, &f.pool_b, &100, &Some(beneficiary.clone()));

    let positions = f.client.get_user_positions(&user);

    assert_eq!(positions.len(), 1);
    let position = positions.get(0).unwrap();
    assert_eq!(position.pool_token, f.pool_b);
    assert_eq!(position.info.amount, 100);
    assert_eq!(position.info.beneficiary, Some(beneficiary));
    assert_eq!(f.client.get_user_positions(&f.admin).len(), 0);
}

#[test]
fn test_update_all_pools_flushes_every_pool() {
    let f = Fixture::new(0);
    f.client.add(&f.admin, &f.pool_b, &10);
    let user = f.staker(&f.pool_a, 100);
    f.client.deposit(&user, &f.pool_a, &100, &None);

    f.set_block(START_BLOCK + 10);
    f.client.update_all_pools();

    for pool in f.client.get_pools().iter() {
        assert_eq!(pool.last_reward_block, START_BLOCK + 10);
    }
    let state = f
        .client
        .get_pool_info(&f.pool_a)
        .accruals
        .get(f.reward_token.clone())
        .unwrap();
    assert_eq!(state.acc_reward_per_share, 15 * common::accrual::PRECISION / 100);
}

// ── Funds ─────────────────────────────────────────────────────────────────────

#[test]
fn test_migrate_funds_moves_every_balance_to_successor() {
    let f = Fixture::new(0);
    let successor = Address::generate(&f.env);
    let user = f.staker(&f.pool_a, 100);
    f.client.deposit(&user, &f.pool_a, &100, &None);

    f.client.set_successor(&f.admin, &successor);
    f.client.add_admin(&f.admin, &successor);
    f.client.start_migration_grace_period(&f.admin);

    let moved = f.client.migrate_funds(&successor);

    assert_eq!(moved.len(), 2);
    assert_eq!(moved.get(0).unwrap().asset, f.pool_a);
    assert_eq!(moved.get(0).unwrap().amount, 100);
    assert_eq!(moved.get(1).unwrap().asset, f.reward_token);
    assert_eq!(moved.get(1).unwrap().amount, REWARD_SUPPLY);
    assert_eq!(f.balance(&f.pool_a, &successor), 100);
    assert_eq!(f.balance(&f.reward_token, &successor), REWARD_SUPPLY);
    assert_eq!(f.balance(&f.pool_a, &f.client.address), 0);

    // Nothing left to move.
    match f.client.try_migrate_funds(&successor) {
        Err(Ok(e)) => assert_eq!(e, LedgerError::InvalidAmount),
        _ => unreachable!("Expected InvalidAmount error"),
    }
}

#[test]
fn test_migrate_funds_requires_recorded_successor() {
    let f = Fixture::new(0);
    let successor = Address::generate(&f.env);
    let impostor = Address::generate(&f.env);
    f.client.add_admin(&f.admin, &successor);
    f.client.add_admin(&f.admin, &impostor);
    f.client.start_migration_grace_period(&f.admin);

    match f.client.try_migrate_funds(&successor) {
        Err(Ok(e)) => assert_eq!(e, LedgerError::NotInitialized),
        _ => unreachable!("Expected NotInitialized error"),
    }

    f.client.set_successor(&f.admin, &successor);
    match f.client.try_migrate_funds(&impostor) {
        Err(Ok(e)) => assert_eq!(e, LedgerError::NotInitialized),
        _ => unreachable!("Expected NotInitialized error"),
    }
}

#[test]
fn test_migrate_funds_guard_order() {
    let f = Fixture::new(0);
    let successor = Address::generate(&f.env);
    f.client.set_successor(&f.admin, &successor);

    // Authorization is checked ahead of the phase.
    match f.client.try_migrate_funds(&successor) {
        Err(Ok(e)) => assert_eq!(e, LedgerError::Unauthorized),
        _ => unreachable!("Expected Unauthorized error"),
    }

    f.client.add_admin(&f.admin, &successor);
    match f.client.try_migrate_funds(&successor) {
        Err(Ok(e)) => assert_eq!(e, LedgerError::MigrationNotStarted),
        _ => unreachable!("Expected MigrationNotStarted error"),
    }

    f.client.start_migration_grace_period(&f.admin);
    f.client.finish_migration_grace_period(&f.admin);
    match f.client.try_migrate_funds(&successor) {
        Err(Ok(e)) => assert_eq!(e, LedgerError::MigrationAlreadyEnded),
        _ => unreachable!("Expected MigrationAlreadyEnded error"),
    }
}
