//! Pool registry, user positions and reward settlement.
//!
//! Both ledger contracts keep their accounting here; they differ only in who
//! may call what and in their half of the migration protocol. Callers are
//! expected to have run `require_auth()` and the admin guard already.

use soroban_sdk::{symbol_short, token, Address, Env, Map, Symbol, Vec};

use crate::accrual;
use crate::events;
use crate::interfaces::{forward, RewardTransferStrategyClient};
use crate::types::{
    AccrualState, Pool, PoolInfoList, RewardPayout, RewardTokenConfig, UserInfo, UserInfoView,
    UserPosition, UserReward,
};
use crate::LedgerError;

// ── Storage keys ─────────────────────────────────────────────────────────────

const POOL_LIST: Symbol = symbol_short!("POOL_LST");
const TOTAL_ALLOC: Symbol = symbol_short!("TOT_ALOC");
const REWARD_LIST: Symbol = symbol_short!("RWD_LST");
const REWARD_CFG: Symbol = symbol_short!("RWD_CFG");

// Persistent storage uses tuple keys: (prefix, pool_token[, user])
const POOL: Symbol = symbol_short!("POOL");
const USER_INFO: Symbol = symbol_short!("USR_INFO");

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

// ── Storage helpers ──────────────────────────────────────────────────────────

pub fn current_block(env: &Env) -> u32 {
    env.ledger().sequence()
}

fn pool_key(token: &Address) -> (Symbol, Address) {
    (POOL, token.clone())
}

fn reward_key(token: &Address) -> (Symbol, Address) {
    (REWARD_CFG, token.clone())
}

fn user_key(pool_token: &Address, user: &Address) -> (Symbol, Address, Address) {
    (USER_INFO, pool_token.clone(), user.clone())
}

/// Pool tokens in registration order.
pub fn pool_tokens(env: &Env) -> Vec<Address> {
    env.storage()
        .instance()
        .get(&POOL_LIST)
        .unwrap_or(Vec::new(env))
}

/// Reward tokens in registration order.
pub fn reward_tokens(env: &Env) -> Vec<Address> {
    env.storage()
        .instance()
        .get(&REWARD_LIST)
        .unwrap_or(Vec::new(env))
}

pub fn total_allocation_point(env: &Env) -> u32 {
    env.storage().instance().get(&TOTAL_ALLOC).unwrap_or(0)
}

pub fn has_pool(env: &Env, token: &Address) -> bool {
    env.storage().persistent().has(&pool_key(token))
}

pub fn load_pool(env: &Env, token: &Address) -> Result<Pool, LedgerError> {
    let key = pool_key(token);
    let pool: Pool = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(LedgerError::PoolNotFound)?;
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    Ok(pool)
}

fn store_pool(env: &Env, pool: &Pool) {
    let key = pool_key(&pool.token);
    env.storage().persistent().set(&key, pool);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn load_reward_config(env: &Env, token: &Address) -> Result<RewardTokenConfig, LedgerError> {
    env.storage()
        .instance()
        .get(&reward_key(token))
        .ok_or(LedgerError::RewardTokenNotFound)
}

fn store_reward_config(env: &Env, config: &RewardTokenConfig) {
    env.storage()
        .instance()
        .set(&reward_key(&config.token), config);
}

pub fn load_user(env: &Env, pool_token: &Address, user: &Address) -> Option<UserInfo> {
    let key = user_key(pool_token, user);
    let info: Option<UserInfo> = env.storage().persistent().get(&key);
    if info.is_some() {
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
    info
}

fn store_user(env: &Env, pool_token: &Address, user: &Address, info: &UserInfo) {
    let key = user_key(pool_token, user);
    env.storage().persistent().set(&key, info);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

fn insert_pool(env: &Env, pool: &Pool) -> Result<(), LedgerError> {
    let total = total_allocation_point(env)
        .checked_add(pool.allocation_point)
        .ok_or(LedgerError::ArithmeticOverflow)?;
    env.storage().instance().set(&TOTAL_ALLOC, &total);

    let mut tokens = pool_tokens(env);
    tokens.push_back(pool.token.clone());
    env.storage().instance().set(&POOL_LIST, &tokens);

    store_pool(env, pool);
    Ok(())
}

// ── Registry ─────────────────────────────────────────────────────────────────

/// Register a pool for `token`. Existing pools are brought up to date first
/// because the total allocation changes.
pub fn add_pool(env: &Env, token: &Address, allocation_point: u32) -> Result<(), LedgerError> {
    if has_pool(env, token) {
        return Err(LedgerError::DuplicatePool);
    }
    if allocation_point == 0 {
        return Err(LedgerError::InvalidAmount);
    }
    update_all_pools(env)?;

    let now = current_block(env);
    let mut accruals = Map::new(env);
    let mut last_reward_block = now;
    for (i, reward_token) in reward_tokens(env).iter().enumerate() {
        let config = load_reward_config(env, &reward_token)?;
        let state = AccrualState::new(now, &config);
        if i == 0 {
            last_reward_block = state.last_reward_block;
        }
        accruals.set(reward_token, state);
    }

    insert_pool(
        env,
        &Pool {
            token: token.clone(),
            allocation_point,
            last_reward_block,
            total_staked: 0,
            accruals,
        },
    )?;

    events::publish_pool_added(env, token.clone(), allocation_point);
    Ok(())
}

/// Re-weight a pool after flushing every pool at the old weights.
pub fn set_allocation_point(
    env: &Env,
    token: &Address,
    allocation_point: u32,
) -> Result<(), LedgerError> {
    load_pool(env, token)?;
    update_all_pools(env)?;

    let mut pool = load_pool(env, token)?;
    let old = pool.allocation_point;
    let total = total_allocation_point(env)
        .checked_sub(old)
        .and_then(|t| t.checked_add(allocation_point))
        .ok_or(LedgerError::ArithmeticOverflow)?;

    pool.allocation_point = allocation_point;
    store_pool(env, &pool);
    env.storage().instance().set(&TOTAL_ALLOC, &total);

    events::publish_pool_updated(env, token.clone(), old, allocation_point);
    Ok(())
}

/// Register a reward token emitted to every pool from
/// `current_block + start_delay_blocks` on.
pub fn add_reward_token(
    env: &Env,
    token: &Address,
    reward_per_block: i128,
    start_delay_blocks: u32,
    strategy: &Address,
) -> Result<(), LedgerError> {
    if env.storage().instance().has(&reward_key(token)) {
        return Err(LedgerError::DuplicateRewardToken);
    }
    if reward_per_block < 0 {
        return Err(LedgerError::InvalidAmount);
    }

    let now = current_block(env);
    let start_block = now
        .checked_add(start_delay_blocks)
        .ok_or(LedgerError::ArithmeticOverflow)?;

    let pools = get_pools(env);
    let mut total_users_balance: i128 = 0;
    for pool in pools.iter() {
        total_users_balance = total_users_balance
            .checked_add(pool.total_staked)
            .ok_or(LedgerError::ArithmeticOverflow)?;
    }

    let config = RewardTokenConfig {
        token: token.clone(),
        reward_per_block,
        start_block,
        total_users_balance,
        strategy: strategy.clone(),
    };
    store_reward_config(env, &config);

    let mut tokens = reward_tokens(env);
    tokens.push_back(token.clone());
    env.storage().instance().set(&REWARD_LIST, &tokens);

    for mut pool in pools.iter() {
        pool.accruals
            .set(token.clone(), AccrualState::new(now, &config));
        store_pool(env, &pool);
    }

    events::publish_reward_token_added(
        env,
        token.clone(),
        reward_per_block,
        start_block,
        strategy.clone(),
    );
    Ok(())
}

// ── Accrual ──────────────────────────────────────────────────────────────────

fn advance(pool: &mut Pool, now: u32, total_allocation: u32) -> Result<(), LedgerError> {
    let reward_tokens = pool.accruals.keys();
    for reward_token in reward_tokens.iter() {
        let mut state = pool
            .accruals
            .get(reward_token.clone())
            .ok_or(LedgerError::RewardTokenNotFound)?;
        accrual::update_pool(
            &mut state,
            now,
            pool.allocation_point,
            total_allocation,
            pool.total_staked,
        )?;
        pool.accruals.set(reward_token, state);
    }
    if now > pool.last_reward_block {
        pool.last_reward_block = now;
    }
    Ok(())
}

/// Bring one pool's accrual up to the current block and persist it.
pub fn update_pool(env: &Env, token: &Address) -> Result<Pool, LedgerError> {
    let mut pool = load_pool(env, token)?;
    advance(&mut pool, current_block(env), total_allocation_point(env))?;
    store_pool(env, &pool);
    Ok(pool)
}

pub fn update_all_pools(env: &Env) -> Result<(), LedgerError> {
    for token in pool_tokens(env).iter() {
        update_pool(env, &token)?;
    }
    Ok(())
}

// ── Settlement ───────────────────────────────────────────────────────────────

/// Fold everything accrued since the last settlement into `accumulated_reward`.
fn settle_user(pool: &Pool, info: &mut UserInfo) -> Result<(), LedgerError> {
    for (reward_token, state) in pool.accruals.iter() {
        let mut reward = info.reward(&reward_token);
        let pending =
            accrual::settle(info.amount, state.acc_reward_per_share, reward.reward_debt)?;
        reward.accumulated_reward = reward
            .accumulated_reward
            .checked_add(pending)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        info.rewards.set(reward_token, reward);
    }
    Ok(())
}

fn reset_reward_debts(pool: &Pool, info: &mut UserInfo) -> Result<(), LedgerError> {
    for (reward_token, state) in pool.accruals.iter() {
        let mut reward = info.reward(&reward_token);
        reward.reward_debt = accrual::reward_debt(info.amount, state.acc_reward_per_share)?;
        info.rewards.set(reward_token, reward);
    }
    Ok(())
}

fn adjust_users_balance(env: &Env, pool: &Pool, delta: i128) -> Result<(), LedgerError> {
    for reward_token in pool.accruals.keys().iter() {
        let mut config = load_reward_config(env, &reward_token)?;
        config.total_users_balance = config
            .total_users_balance
            .checked_add(delta)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        store_reward_config(env, &config);
    }
    Ok(())
}

/// Zero the position's accumulated rewards, returning what was owed per
/// reward token in registration order.
fn take_rewards(env: &Env, pool: &Pool, info: &mut UserInfo) -> Vec<(Address, i128)> {
    let mut owed = Vec::new(env);
    for reward_token in reward_tokens(env).iter() {
        if !pool.accruals.contains_key(reward_token.clone()) {
            continue;
        }
        let mut reward = info.reward(&reward_token);
        if reward.accumulated_reward > 0 {
            owed.push_back((reward_token.clone(), reward.accumulated_reward));
            reward.accumulated_reward = 0;
            info.rewards.set(reward_token, reward);
        }
    }
    owed
}

/// Hand each owed amount to its reward token's strategy.
fn deliver(
    env: &Env,
    user: &Address,
    pool_token: &Address,
    recipient: &Address,
    owed: Vec<(Address, i128)>,
) -> Result<Vec<RewardPayout>, LedgerError> {
    let ledger = env.current_contract_address();
    let mut payouts = Vec::new(env);
    for (reward_token, gross) in owed.iter() {
        let config = load_reward_config(env, &reward_token)?;
        token::Client::new(env, &reward_token).transfer(&ledger, &config.strategy, &gross);
        let delivered = forward(
            RewardTransferStrategyClient::new(env, &config.strategy)
                .try_payout(&ledger, recipient, &gross),
        )?;

        events::publish_reward_paid(
            env,
            user.clone(),
            recipient.clone(),
            pool_token.clone(),
            reward_token.clone(),
            gross,
            delivered,
        );
        payouts.push_back(RewardPayout {
            reward_token,
            recipient: recipient.clone(),
            gross,
            delivered,
        });
    }
    Ok(payouts)
}

fn payout_recipient(user: &Address, info: &UserInfo, beneficiary: Option<Address>) -> Address {
    beneficiary
        .or_else(|| info.beneficiary.clone())
        .unwrap_or_else(|| user.clone())
}

// ── User operations ──────────────────────────────────────────────────────────

/// Stake `amount` of `pool_token`. A `beneficiary` becomes the position's
/// default payout recipient.
pub fn deposit(
    env: &Env,
    pool_token: &Address,
    user: &Address,
    amount: i128,
    beneficiary: Option<Address>,
) -> Result<(), LedgerError> {
    if amount <= 0 {
        return Err(LedgerError::InvalidAmount);
    }

    let mut pool = update_pool(env, pool_token)?;
    let mut info = load_user(env, pool_token, user).unwrap_or_else(|| UserInfo::new(env));
    settle_user(&pool, &mut info)?;

    info.amount = info
        .amount
        .checked_add(amount)
        .ok_or(LedgerError::ArithmeticOverflow)?;
    pool.total_staked = pool
        .total_staked
        .checked_add(amount)
        .ok_or(LedgerError::ArithmeticOverflow)?;
    if beneficiary.is_some() {
        info.beneficiary = beneficiary;
    }
    reset_reward_debts(&pool, &mut info)?;
    adjust_users_balance(env, &pool, amount)?;

    store_pool(env, &pool);
    store_user(env, pool_token, user, &info);

    token::Client::new(env, pool_token).transfer(user, &env.current_contract_address(), &amount);

    events::publish_deposit(env, user.clone(), pool_token.clone(), amount, pool.total_staked);
    Ok(())
}

/// Unstake `amount` and pay out the position's accumulated reward.
pub fn withdraw(
    env: &Env,
    pool_token: &Address,
    user: &Address,
    amount: i128,
    beneficiary: Option<Address>,
) -> Result<Vec<RewardPayout>, LedgerError> {
    if amount < 0 {
        return Err(LedgerError::InvalidAmount);
    }

    let mut pool = update_pool(env, pool_token)?;
    let mut info = load_user(env, pool_token, user).ok_or(LedgerError::InsufficientBalance)?;
    if amount > info.amount {
        return Err(LedgerError::InsufficientBalance);
    }
    settle_user(&pool, &mut info)?;

    info.amount -= amount;
    pool.total_staked = pool
        .total_staked
        .checked_sub(amount)
        .ok_or(LedgerError::ArithmeticOverflow)?;
    reset_reward_debts(&pool, &mut info)?;
    adjust_users_balance(env, &pool, -amount)?;

    let recipient = payout_recipient(user, &info, beneficiary);
    let owed = take_rewards(env, &pool, &mut info);

    store_pool(env, &pool);
    store_user(env, pool_token, user, &info);

    if amount > 0 {
        token::Client::new(env, pool_token).transfer(
            &env.current_contract_address(),
            user,
            &amount,
        );
    }
    let payouts = deliver(env, user, pool_token, &recipient, owed)?;

    events::publish_withdraw(env, user.clone(), pool_token.clone(), amount, pool.total_staked);
    Ok(payouts)
}

/// Settle and pay every reward token of one position.
pub fn claim_reward(
    env: &Env,
    pool_token: &Address,
    user: &Address,
    beneficiary: Option<Address>,
) -> Result<Vec<RewardPayout>, LedgerError> {
    let pool = update_pool(env, pool_token)?;
    let Some(mut info) = load_user(env, pool_token, user) else {
        return Ok(Vec::new(env));
    };

    settle_user(&pool, &mut info)?;
    reset_reward_debts(&pool, &mut info)?;

    let recipient = payout_recipient(user, &info, beneficiary);
    let owed = take_rewards(env, &pool, &mut info);
    store_user(env, pool_token, user, &info);

    deliver(env, user, pool_token, &recipient, owed)
}

pub fn claim_reward_from_all_pools(
    env: &Env,
    user: &Address,
    beneficiary: Option<Address>,
) -> Result<Vec<RewardPayout>, LedgerError> {
    let mut payouts = Vec::new(env);
    for pool_token in pool_tokens(env).iter() {
        if load_user(env, &pool_token, user).is_none() {
            continue;
        }
        payouts.append(&claim_reward(env, &pool_token, user, beneficiary.clone())?);
    }
    Ok(payouts)
}

/// Return the whole stake without paying rewards; unpaid reward is forfeited.
pub fn emergency_withdraw(
    env: &Env,
    pool_token: &Address,
    user: &Address,
) -> Result<i128, LedgerError> {
    let mut pool = update_pool(env, pool_token)?;
    let mut info = load_user(env, pool_token, user).ok_or(LedgerError::InsufficientBalance)?;

    let amount = info.amount;
    let mut forfeited: i128 = 0;
    for (_, reward) in info.rewards.iter() {
        forfeited = forfeited.saturating_add(reward.accumulated_reward);
    }

    pool.total_staked = pool
        .total_staked
        .checked_sub(amount)
        .ok_or(LedgerError::ArithmeticOverflow)?;
    adjust_users_balance(env, &pool, -amount)?;
    info.amount = 0;
    info.rewards = Map::new(env);

    store_pool(env, &pool);
    store_user(env, pool_token, user, &info);

    if amount > 0 {
        token::Client::new(env, pool_token).transfer(
            &env.current_contract_address(),
            user,
            &amount,
        );
    }

    events::publish_emergency_withdraw(env, user.clone(), pool_token.clone(), amount, forfeited);
    Ok(amount)
}

// ── Views ────────────────────────────────────────────────────────────────────

pub fn get_user_info(env: &Env, pool_token: &Address, user: &Address) -> UserInfoView {
    let info = load_user(env, pool_token, user).unwrap_or_else(|| UserInfo::new(env));
    let mut rewards = Vec::new(env);
    for reward_token in reward_tokens(env).iter() {
        rewards.push_back(info.reward(&reward_token));
    }
    UserInfoView {
        amount: info.amount,
        rewards,
    }
}

pub fn get_pool_info_list(env: &Env) -> PoolInfoList {
    let mut list = PoolInfoList {
        tokens: Vec::new(env),
        allocation_points: Vec::new(env),
        last_reward_blocks: Vec::new(env),
    };
    for pool in get_pools(env).iter() {
        list.tokens.push_back(pool.token);
        list.allocation_points.push_back(pool.allocation_point);
        list.last_reward_blocks.push_back(pool.last_reward_block);
    }
    list
}

pub fn get_pools(env: &Env) -> Vec<Pool> {
    let mut pools = Vec::new(env);
    for token in pool_tokens(env).iter() {
        if let Ok(pool) = load_pool(env, &token) {
            pools.push_back(pool);
        }
    }
    pools
}

pub fn get_reward_configs(env: &Env) -> Vec<RewardTokenConfig> {
    let mut configs = Vec::new(env);
    for token in reward_tokens(env).iter() {
        if let Ok(config) = load_reward_config(env, &token) {
            configs.push_back(config);
        }
    }
    configs
}

/// Every pool position `user` has ever opened, in pool registration order.
pub fn get_user_positions(env: &Env, user: &Address) -> Vec<UserPosition> {
    let mut positions = Vec::new(env);
    for pool_token in pool_tokens(env).iter() {
        if let Some(info) = load_user(env, &pool_token, user) {
            positions.push_back(UserPosition { pool_token, info });
        }
    }
    positions
}

pub fn pool_id(env: &Env, token: &Address) -> Result<u32, LedgerError> {
    pool_tokens(env)
        .first_index_of(token)
        .ok_or(LedgerError::PoolNotFound)
}

/// Accumulated plus pending reward per reward token, as of the current block,
/// without writing anything.
pub fn pending_rewards(
    env: &Env,
    pool_token: &Address,
    user: &Address,
) -> Result<Vec<i128>, LedgerError> {
    let mut pool = load_pool(env, pool_token)?;
    advance(&mut pool, current_block(env), total_allocation_point(env))?;
    let info = load_user(env, pool_token, user).unwrap_or_else(|| UserInfo::new(env));

    let mut pending = Vec::new(env);
    for reward_token in reward_tokens(env).iter() {
        let reward = info.reward(&reward_token);
        let accrued = match pool.accruals.get(reward_token) {
            Some(state) => {
                accrual::settle(info.amount, state.acc_reward_per_share, reward.reward_debt)?
            }
            None => 0,
        };
        pending.push_back(
            reward
                .accumulated_reward
                .checked_add(accrued)
                .ok_or(LedgerError::ArithmeticOverflow)?,
        );
    }
    Ok(pending)
}

// ── Migration import ─────────────────────────────────────────────────────────

/// Copy a predecessor's aggregate fields into the matching local reward token.
pub fn import_reward_aggregates(
    env: &Env,
    source: &RewardTokenConfig,
) -> Result<(), LedgerError> {
    let mut config = load_reward_config(env, &source.token)?;
    config.start_block = source.start_block;
    config.total_users_balance = source.total_users_balance;
    store_reward_config(env, &config);
    Ok(())
}

/// Recreate a predecessor's pool with identical weight and accrual state and
/// no stake; stake arrives as users are imported.
pub fn import_pool(env: &Env, source: &Pool) -> Result<(), LedgerError> {
    if has_pool(env, &source.token) {
        return Err(LedgerError::AlreadyProcessed);
    }

    let now = current_block(env);
    let mut accruals = Map::new(env);
    for reward_token in reward_tokens(env).iter() {
        let state = match source.accruals.get(reward_token.clone()) {
            Some(state) => state,
            None => AccrualState::new(now, &load_reward_config(env, &reward_token)?),
        };
        accruals.set(reward_token, state);
    }

    insert_pool(
        env,
        &Pool {
            token: source.token.clone(),
            allocation_point: source.allocation_point,
            last_reward_block: source.last_reward_block,
            total_staked: 0,
            accruals,
        },
    )
}

/// Copy one position verbatim and credit its stake to the local pool.
pub fn import_user_position(
    env: &Env,
    user: &Address,
    position: &UserPosition,
) -> Result<(), LedgerError> {
    let mut pool = load_pool(env, &position.pool_token)?;
    if load_user(env, &position.pool_token, user).is_some() {
        return Err(LedgerError::AlreadyProcessed);
    }

    // Reward tokens the predecessor never had start from the current rate, and
    // their aggregate did not include this stake yet.
    let mut info = position.info.clone();
    for (reward_token, state) in pool.accruals.iter() {
        if !info.rewards.contains_key(reward_token.clone()) {
            info.rewards.set(
                reward_token.clone(),
                UserReward {
                    reward_debt: accrual::reward_debt(info.amount, state.acc_reward_per_share)?,
                    accumulated_reward: 0,
                },
            );
            let mut config = load_reward_config(env, &reward_token)?;
            config.total_users_balance = config
                .total_users_balance
                .checked_add(info.amount)
                .ok_or(LedgerError::ArithmeticOverflow)?;
            store_reward_config(env, &config);
        }
    }

    pool.total_staked = pool
        .total_staked
        .checked_add(info.amount)
        .ok_or(LedgerError::ArithmeticOverflow)?;

    store_pool(env, &pool);
    store_user(env, &position.pool_token, user, &info);
    Ok(())
}
