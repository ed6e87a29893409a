#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, Env};

// ── Event payloads ──────────────────────────────────────────────────────────

/// Fired once when the ledger is bootstrapped.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub admin: Address,
    pub migration_source: Option<Address>,
    pub block: u32,
}

/// Fired when the predecessor's pool set has been recreated here.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolsMigratedEvent {
    pub source: Address,
    pub pools: u32,
    pub reward_tokens: u32,
    pub block: u32,
}

/// Fired for every user whose positions were copied.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserMigratedEvent {
    pub user: Address,
    pub positions: u32,
    pub block: u32,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FundsReceivedEvent {
    pub source: Address,
    pub assets: u32,
    pub block: u32,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(env: &Env, admin: Address, migration_source: Option<Address>) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            admin,
            migration_source,
            block: env.ledger().sequence(),
        },
    );
}

pub fn publish_pools_migrated(env: &Env, source: Address, pools: u32, reward_tokens: u32) {
    env.events().publish(
        (symbol_short!("MIG_POOL"),),
        PoolsMigratedEvent {
            source,
            pools,
            reward_tokens,
            block: env.ledger().sequence(),
        },
    );
}

pub fn publish_user_migrated(env: &Env, user: Address, positions: u32) {
    env.events().publish(
        (symbol_short!("MIG_USER"), user.clone()),
        UserMigratedEvent {
            user,
            positions,
            block: env.ledger().sequence(),
        },
    );
}

pub fn publish_funds_received(env: &Env, source: Address, assets: u32) {
    env.events().publish(
        (symbol_short!("MIG_FUND"),),
        FundsReceivedEvent {
            source,
            assets,
            block: env.ledger().sequence(),
        },
    );
}

pub fn publish_migration_finished(env: &Env, caller: Address, source: Address) {
    env.events().publish(
        (symbol_short!("MIG_DONE"),),
        (caller, source, env.ledger().sequence()),
    );
}
