#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, Env};

/// Fired once when the strategy is bootstrapped.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub admin: Address,
    pub token: Address,
    pub unlocked_immediately_bps: u32,
    pub lock_blocks: u32,
    pub block: u32,
}

/// Fired for every payout requested by a ledger.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PaidEvent {
    pub ledger: Address,
    pub recipient: Address,
    pub delivered: i128,
    pub locked: i128,
    pub block: u32,
}

pub fn publish_initialized(
    env: &Env,
    admin: Address,
    token: Address,
    unlocked_immediately_bps: u32,
    lock_blocks: u32,
) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            admin,
            token,
            unlocked_immediately_bps,
            lock_blocks,
            block: env.ledger().sequence(),
        },
    );
}

pub fn publish_ledger_changed(env: &Env, ledger: Address, allowed: bool) {
    env.events().publish(
        (symbol_short!("LEDGER"), ledger),
        (allowed, env.ledger().sequence()),
    );
}

pub fn publish_paid(env: &Env, ledger: Address, recipient: Address, delivered: i128, locked: i128) {
    env.events().publish(
        (symbol_short!("PAID"), recipient.clone()),
        PaidEvent {
            ledger,
            recipient,
            delivered,
            locked,
            block: env.ledger().sequence(),
        },
    );
}

pub fn publish_unlocked_withdrawn(env: &Env, recipient: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("UNLOCKED"), recipient),
        (amount, env.ledger().sequence()),
    );
}
