//! Target half of the migration protocol.
//!
//! Every step is a separate call so large user sets can be split across
//! transactions. Each unit of work (the pool set, one user, the funds) is
//! marked here and refuses to run twice.

use common::{
    admin, forward, ledger, FundTransfer, LedgerError, MigrationSourceClient, MigrationState,
};
use soroban_sdk::{symbol_short, Address, Env, Symbol, Vec};

use crate::events;

// ── Storage keys ─────────────────────────────────────────────────────────────

const SOURCE: Symbol = symbol_short!("MIG_SRC");
const POOLS_MIGRATED: Symbol = symbol_short!("POOLS_MG");
const FINISHED: Symbol = symbol_short!("MIG_DONE");

// Persistent: (prefix, user)
const USER_MIGRATED: Symbol = symbol_short!("MIG_USER");

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

// ── State ────────────────────────────────────────────────────────────────────

pub fn source(env: &Env) -> Option<Address> {
    env.storage().instance().get(&SOURCE)
}

pub fn set_source(env: &Env, source: &Address) {
    env.storage().instance().set(&SOURCE, source);
}

pub fn pools_migrated(env: &Env) -> bool {
    env.storage()
        .instance()
        .get(&POOLS_MIGRATED)
        .unwrap_or(false)
}

pub fn is_finished(env: &Env) -> bool {
    env.storage().instance().get(&FINISHED).unwrap_or(false)
}

pub fn is_user_migrated(env: &Env, user: &Address) -> bool {
    let key = (USER_MIGRATED, user.clone());
    let migrated = env.storage().persistent().has(&key);
    if migrated {
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
    migrated
}

fn mark_user(env: &Env, user: &Address) {
    let key = (USER_MIGRATED, user.clone());
    env.storage().persistent().set(&key, &true);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// User traffic and pool registry changes wait until a configured migration
/// has been finished.
pub fn require_open(env: &Env) -> Result<(), LedgerError> {
    if source(env).is_some() && !is_finished(env) {
        return Err(LedgerError::MigrationInProgress);
    }
    Ok(())
}

/// Reward tokens may be registered until the source pools are copied.
pub fn require_reward_registry_open(env: &Env) -> Result<(), LedgerError> {
    if pools_migrated(env) {
        require_open(env)
    } else {
        Ok(())
    }
}

// ── Guards ───────────────────────────────────────────────────────────────────

/// Checks, in order: `caller` is a local admin, this ledger is an admin of the
/// source, and the source's grace period is open.
fn authorize<'a>(
    env: &'a Env,
    caller: &Address,
) -> Result<(Address, MigrationSourceClient<'a>), LedgerError> {
    admin::require_admin(env, caller)?;
    let source = source(env).ok_or(LedgerError::InvalidState)?;
    let client = MigrationSourceClient::new(env, &source);

    let this = env.current_contract_address();
    if !forward(client.try_is_admin(&this))? {
        return Err(LedgerError::Unauthorized);
    }

    match forward(client.try_get_migration_state())? {
        MigrationState::NotStarted => Err(LedgerError::MigrationNotStarted),
        MigrationState::Finished => Err(LedgerError::MigrationAlreadyEnded),
        MigrationState::GracePeriodActive => Ok((source, client)),
    }
}

// ── Steps ────────────────────────────────────────────────────────────────────

/// Recreate every source pool here with its accrual state as of now.
///
/// Every reward token of the source must already be registered locally.
pub fn migrate_pools(env: &Env, caller: &Address) -> Result<u32, LedgerError> {
    let (source, client) = authorize(env, caller)?;
    if pools_migrated(env) {
        return Err(LedgerError::AlreadyProcessed);
    }

    forward(client.try_update_all_pools())?;

    let reward_configs = forward(client.try_get_reward_tokens())?;
    for config in reward_configs.iter() {
        ledger::import_reward_aggregates(env, &config)?;
    }

    let pools = forward(client.try_get_pools())?;
    for pool in pools.iter() {
        ledger::import_pool(env, &pool)?;
    }

    env.storage().instance().set(&POOLS_MIGRATED, &true);

    events::publish_pools_migrated(env, source, pools.len(), reward_configs.len());
    Ok(pools.len())
}

/// Copy the positions of `users` verbatim. Returns how many users had
/// positions; users without any are skipped and can be submitted again.
pub fn migrate_users(env: &Env, caller: &Address, users: &Vec<Address>) -> Result<u32, LedgerError> {
    let (_, client) = authorize(env, caller)?;
    if !pools_migrated(env) {
        return Err(LedgerError::InvalidState);
    }

    let mut migrated: u32 = 0;
    for user in users.iter() {
        if is_user_migrated(env, &user) {
            return Err(LedgerError::AlreadyProcessed);
        }

        let positions = forward(client.try_get_user_positions(&user))?;
        if positions.is_empty() {
            continue;
        }
        for position in positions.iter() {
            ledger::import_user_position(env, &user, &position)?;
        }
        mark_user(env, &user);
        migrated += 1;

        events::publish_user_migrated(env, user, positions.len());
    }
    Ok(migrated)
}

/// Pull every custodied balance from the source.
pub fn migrate_funds(env: &Env, caller: &Address) -> Result<Vec<FundTransfer>, LedgerError> {
    let (source, client) = authorize(env, caller)?;

    let moved = forward(client.try_migrate_funds(&env.current_contract_address()))?;

    events::publish_funds_received(env, source, moved.len());
    Ok(moved)
}

/// Close the source for good and open this ledger to user traffic.
pub fn finish_migration(env: &Env, caller: &Address) -> Result<(), LedgerError> {
    let (source, client) = authorize(env, caller)?;

    forward(client.try_finish_migration_grace_period(&env.current_contract_address()))?;
    env.storage().instance().set(&FINISHED, &true);

    events::publish_migration_finished(env, caller.clone(), source);
    Ok(())
}
