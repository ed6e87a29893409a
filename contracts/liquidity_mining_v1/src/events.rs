#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, Env};

// ── Event payloads ──────────────────────────────────────────────────────────

/// Fired once when the ledger is bootstrapped.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub admin: Address,
    pub reward_token: Address,
    pub reward_per_block: i128,
    pub start_delay_blocks: u32,
    pub strategy: Address,
    pub lock_deposits_in_grace: bool,
    pub block: u32,
}

/// Fired when the successor ledger is recorded.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SuccessorSetEvent {
    pub caller: Address,
    pub successor: Address,
    pub block: u32,
}

/// Fired when the migration grace period opens.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GracePeriodStartedEvent {
    pub caller: Address,
    pub grace_start_block: u32,
}

/// Fired when custodied funds are handed to the successor.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FundsMigratedEvent {
    pub successor: Address,
    pub assets_moved: u32,
    pub block: u32,
}

// ── Publishers ──────────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
pub fn publish_initialized(
    env: &Env,
    admin: Address,
    reward_token: Address,
    reward_per_block: i128,
    start_delay_blocks: u32,
    strategy: Address,
    lock_deposits_in_grace: bool,
) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            admin,
            reward_token,
            reward_per_block,
            start_delay_blocks,
            strategy,
            lock_deposits_in_grace,
            block: env.ledger().sequence(),
        },
    );
}

pub fn publish_successor_set(env: &Env, caller: Address, successor: Address) {
    env.events().publish(
        (symbol_short!("SUCC_SET"),),
        SuccessorSetEvent {
            caller,
            successor,
            block: env.ledger().sequence(),
        },
    );
}

pub fn publish_grace_period_started(env: &Env, caller: Address, grace_start_block: u32) {
    env.events().publish(
        (symbol_short!("GRACE_ST"),),
        GracePeriodStartedEvent {
            caller,
            grace_start_block,
        },
    );
}

pub fn publish_migration_finished(env: &Env, caller: Address) {
    env.events().publish(
        (symbol_short!("MIG_DONE"),),
        (caller, env.ledger().sequence()),
    );
}

pub fn publish_funds_migrated(env: &Env, successor: Address, assets_moved: u32) {
    env.events().publish(
        (symbol_short!("FUNDS_MV"),),
        FundsMigratedEvent {
            successor,
            assets_moved,
            block: env.ledger().sequence(),
        },
    );
}

pub fn publish_deposit_lock_set(env: &Env, locked: bool) {
    env.events().publish(
        (symbol_short!("DEP_LOCK"),),
        (locked, env.ledger().sequence()),
    );
}
