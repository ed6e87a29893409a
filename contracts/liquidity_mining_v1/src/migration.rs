//! Source half of the migration protocol.
//!
//! The source owns the phase (`NotStarted → GracePeriodActive → Finished`),
//! the successor address, and the deposit policy for the grace period. The
//! successor drives everything else through `MigrationSource`.

use common::{admin, ledger, FundTransfer, LedgerError, MigrationState};
use soroban_sdk::{symbol_short, token, Address, Env, Symbol, Vec};

use crate::events;

// ── Storage keys ─────────────────────────────────────────────────────────────

const STATE: Symbol = symbol_short!("MIG_ST");
const GRACE_START: Symbol = symbol_short!("GRACE_BL");
const SUCCESSOR: Symbol = symbol_short!("SUCCESSR");
const LOCK_DEPOSITS: Symbol = symbol_short!("LOCK_DEP");

// ── Phase ────────────────────────────────────────────────────────────────────

pub fn state(env: &Env) -> MigrationState {
    env.storage()
        .instance()
        .get(&STATE)
        .unwrap_or(MigrationState::NotStarted)
}

pub fn grace_start_block(env: &Env) -> Option<u32> {
    env.storage().instance().get(&GRACE_START)
}

/// Guard for every successor-driven step.
pub fn require_window(env: &Env) -> Result<(), LedgerError> {
    match state(env) {
        MigrationState::NotStarted => Err(LedgerError::MigrationNotStarted),
        MigrationState::GracePeriodActive => Ok(()),
        MigrationState::Finished => Err(LedgerError::MigrationAlreadyEnded),
    }
}

pub fn start_grace_period(env: &Env, caller: &Address) -> Result<(), LedgerError> {
    admin::require_admin(env, caller)?;
    if state(env) != MigrationState::NotStarted {
        return Err(LedgerError::InvalidState);
    }

    let block = ledger::current_block(env);
    env.storage()
        .instance()
        .set(&STATE, &MigrationState::GracePeriodActive);
    env.storage().instance().set(&GRACE_START, &block);

    events::publish_grace_period_started(env, caller.clone(), block);
    Ok(())
}

pub fn finish_grace_period(env: &Env, caller: &Address) -> Result<(), LedgerError> {
    admin::require_admin(env, caller)?;
    require_window(env)?;

    env.storage().instance().set(&STATE, &MigrationState::Finished);

    events::publish_migration_finished(env, caller.clone());
    Ok(())
}

// ── Successor ────────────────────────────────────────────────────────────────

pub fn successor(env: &Env) -> Option<Address> {
    env.storage().instance().get(&SUCCESSOR)
}

pub fn set_successor(env: &Env, caller: &Address, successor: &Address) -> Result<(), LedgerError> {
    admin::require_admin(env, caller)?;
    if *successor == env.current_contract_address() {
        return Err(LedgerError::InvalidAddress);
    }

    env.storage().instance().set(&SUCCESSOR, successor);

    events::publish_successor_set(env, caller.clone(), successor.clone());
    Ok(())
}

// ── Deposit policy ───────────────────────────────────────────────────────────

pub fn deposits_locked_in_grace(env: &Env) -> bool {
    env.storage()
        .instance()
        .get(&LOCK_DEPOSITS)
        .unwrap_or(false)
}

pub fn set_deposits_locked_in_grace(env: &Env, locked: bool) {
    env.storage().instance().set(&LOCK_DEPOSITS, &locked);
}

/// Deposits stay open unless the policy locks them and migration has begun.
pub fn require_deposits_open(env: &Env) -> Result<(), LedgerError> {
    if deposits_locked_in_grace(env) && state(env) != MigrationState::NotStarted {
        return Err(LedgerError::DepositsLocked);
    }
    Ok(())
}

// ── Funds ────────────────────────────────────────────────────────────────────

/// Move every pool-token and reward-token balance held by this ledger to its
/// recorded successor, which must also be the caller.
pub fn migrate_funds(env: &Env, caller: &Address) -> Result<Vec<FundTransfer>, LedgerError> {
    admin::require_admin(env, caller)?;
    require_window(env)?;

    let recorded = successor(env).ok_or(LedgerError::NotInitialized)?;
    if recorded != *caller {
        return Err(LedgerError::NotInitialized);
    }

    let mut assets = ledger::pool_tokens(env);
    for reward_token in ledger::reward_tokens(env).iter() {
        if !assets.contains(&reward_token) {
            assets.push_back(reward_token);
        }
    }

    let this = env.current_contract_address();
    let mut moved = Vec::new(env);
    for asset in assets.iter() {
        let client = token::Client::new(env, &asset);
        let balance = client.balance(&this);
        if balance > 0 {
            client.transfer(&this, &recorded, &balance);
            moved.push_back(FundTransfer {
                asset,
                amount: balance,
            });
        }
    }
    if moved.is_empty() {
        return Err(LedgerError::InvalidAmount);
    }

    events::publish_funds_migrated(env, recorded, moved.len());
    Ok(moved)
}
