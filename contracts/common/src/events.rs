#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, Env};

// ── Event payloads ──────────────────────────────────────────────────────────

/// Fired when a pool is registered.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolAddedEvent {
    pub token: Address,
    pub allocation_point: u32,
    pub block: u32,
}

/// Fired when a pool is re-weighted.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolUpdatedEvent {
    pub token: Address,
    pub old_allocation_point: u32,
    pub new_allocation_point: u32,
    pub block: u32,
}

/// Fired when a reward token is registered.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardTokenAddedEvent {
    pub token: Address,
    pub reward_per_block: i128,
    pub start_block: u32,
    pub strategy: Address,
    pub block: u32,
}

/// Fired on deposit.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DepositEvent {
    pub user: Address,
    pub pool_token: Address,
    pub amount: i128,
    pub new_total_staked: i128,
    pub block: u32,
}

/// Fired on withdraw.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawEvent {
    pub user: Address,
    pub pool_token: Address,
    pub amount: i128,
    pub new_total_staked: i128,
    pub block: u32,
}

/// Fired on emergency withdraw; `forfeited` is the unpaid reward dropped.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmergencyWithdrawEvent {
    pub user: Address,
    pub pool_token: Address,
    pub amount: i128,
    pub forfeited: i128,
    pub block: u32,
}

/// Fired for every reward token paid out through its strategy.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardPaidEvent {
    pub user: Address,
    pub recipient: Address,
    pub pool_token: Address,
    pub reward_token: Address,
    pub gross: i128,
    pub delivered: i128,
    pub block: u32,
}

/// Fired when an admin is added or removed.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdminChangedEvent {
    pub caller: Address,
    pub admin: Address,
    pub added: bool,
    pub block: u32,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_pool_added(env: &Env, token: Address, allocation_point: u32) {
    env.events().publish(
        (symbol_short!("POOL_ADD"),),
        PoolAddedEvent {
            token,
            allocation_point,
            block: env.ledger().sequence(),
        },
    );
}

pub fn publish_pool_updated(
    env: &Env,
    token: Address,
    old_allocation_point: u32,
    new_allocation_point: u32,
) {
    env.events().publish(
        (symbol_short!("POOL_UPD"),),
        PoolUpdatedEvent {
            token,
            old_allocation_point,
            new_allocation_point,
            block: env.ledger().sequence(),
        },
    );
}

pub fn publish_reward_token_added(
    env: &Env,
    token: Address,
    reward_per_block: i128,
    start_block: u32,
    strategy: Address,
) {
    env.events().publish(
        (symbol_short!("RWD_ADD"),),
        RewardTokenAddedEvent {
            token,
            reward_per_block,
            start_block,
            strategy,
            block: env.ledger().sequence(),
        },
    );
}

pub fn publish_deposit(
    env: &Env,
    user: Address,
    pool_token: Address,
    amount: i128,
    new_total_staked: i128,
) {
    env.events().publish(
        (symbol_short!("DEPOSIT"), user.clone()),
        DepositEvent {
            user,
            pool_token,
            amount,
            new_total_staked,
            block: env.ledger().sequence(),
        },
    );
}

pub fn publish_withdraw(
    env: &Env,
    user: Address,
    pool_token: Address,
    amount: i128,
    new_total_staked: i128,
) {
    env.events().publish(
        (symbol_short!("WITHDRAW"), user.clone()),
        WithdrawEvent {
            user,
            pool_token,
            amount,
            new_total_staked,
            block: env.ledger().sequence(),
        },
    );
}

pub fn publish_emergency_withdraw(
    env: &Env,
    user: Address,
    pool_token: Address,
    amount: i128,
    forfeited: i128,
) {
    env.events().publish(
        (symbol_short!("EMRG_WD"), user.clone()),
        EmergencyWithdrawEvent {
            user,
            pool_token,
            amount,
            forfeited,
            block: env.ledger().sequence(),
        },
    );
}

#[allow(clippy::too_many_arguments)]
pub fn publish_reward_paid(
    env: &Env,
    user: Address,
    recipient: Address,
    pool_token: Address,
    reward_token: Address,
    gross: i128,
    delivered: i128,
) {
    env.events().publish(
        (symbol_short!("RWD_PAID"), user.clone()),
        RewardPaidEvent {
            user,
            recipient,
            pool_token,
            reward_token,
            gross,
            delivered,
            block: env.ledger().sequence(),
        },
    );
}

pub fn publish_admin_changed(env: &Env, caller: Address, admin: Address, added: bool) {
    env.events().publish(
        (symbol_short!("ADM_CHG"),),
        AdminChangedEvent {
            caller,
            admin,
            added,
            block: env.ledger().sequence(),
        },
    );
}
