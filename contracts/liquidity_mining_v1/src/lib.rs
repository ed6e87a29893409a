#![no_std]

pub mod events;
pub mod migration;

use common::{
    admin, events as ledger_events, ledger, FundTransfer, MigrationSource, MigrationState, Pool,
    PoolInfoList, RewardPayout, RewardTokenConfig, UserInfoView, UserPosition,
};
use soroban_sdk::{contract, contractimpl, symbol_short, Address, Env, Symbol, Vec};

pub use common::LedgerError;

// ── Storage key constants ────────────────────────────────────────────────────

const INITIALIZED: Symbol = symbol_short!("INIT");
const REWARD_TOKEN: Symbol = symbol_short!("RWD_TOK");

// ── Contract ─────────────────────────────────────────────────────────────────

/// First-generation liquidity-mining ledger: a single reward token, and the
/// source side of a migration to a successor ledger.
#[contract]
pub struct LiquidityMiningV1;

#[contractimpl]
impl LiquidityMiningV1 {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the ledger.
    ///
    /// * `reward_token`  – token emitted to stakers, paid through `strategy`.
    /// * `reward_per_block` – emission across all pools per ledger sequence.
    /// * `start_delay_blocks` – emission starts this many blocks from now.
    /// * `lock_deposits_in_grace` – refuse deposits once migration has begun.
    pub fn initialize(
        env: Env,
        admin: Address,
        reward_token: Address,
        reward_per_block: i128,
        start_delay_blocks: u32,
        strategy: Address,
        lock_deposits_in_grace: bool,
    ) -> Result<(), LedgerError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(LedgerError::AlreadyInitialized);
        }

        env.storage().instance().set(&INITIALIZED, &true);
        env.storage().instance().set(&REWARD_TOKEN, &reward_token);
        admin::bootstrap(&env, &admin);
        ledger::add_reward_token(
            &env,
            &reward_token,
            reward_per_block,
            start_delay_blocks,
            &strategy,
        )?;
        migration::set_deposits_locked_in_grace(&env, lock_deposits_in_grace);

        events::publish_initialized(
            &env,
            admin,
            reward_token,
            reward_per_block,
            start_delay_blocks,
            strategy,
            lock_deposits_in_grace,
        );
        Ok(())
    }

    // ── Pools ───────────────────────────────────────────────────────────────

    /// Register a pool for `token` with weight `allocation_point`.
    pub fn add(
        env: Env,
        caller: Address,
        token: Address,
        allocation_point: u32,
    ) -> Result<(), LedgerError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        admin::require_admin(&env, &caller)?;

        ledger::add_pool(&env, &token, allocation_point)
    }

    /// Change a pool's weight. Every pool is flushed at the old weights first.
    pub fn update(
        env: Env,
        caller: Address,
        token: Address,
        allocation_point: u32,
    ) -> Result<(), LedgerError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        admin::require_admin(&env, &caller)?;

        ledger::set_allocation_point(&env, &token, allocation_point)
    }

    pub fn update_pool(env: Env, token: Address) -> Result<(), LedgerError> {
        Self::require_initialized(&env)?;
        ledger::update_pool(&env, &token).map(|_| ())
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Deposit `amount` of `token`. `beneficiary` redirects this position's
    /// future reward payouts.
    pub fn deposit(
        env: Env,
        user: Address,
        token: Address,
        amount: i128,
        beneficiary: Option<Address>,
    ) -> Result<(), LedgerError> {
        Self::require_initialized(&env)?;
        user.require_auth();
        migration::require_deposits_open(&env)?;

        ledger::deposit(&env, &token, &user, amount, beneficiary)
    }

    /// Withdraw `amount` of `token` and pay out the accumulated reward.
    pub fn withdraw(
        env: Env,
        user: Address,
        token: Address,
        amount: i128,
        beneficiary: Option<Address>,
    ) -> Result<Vec<RewardPayout>, LedgerError> {
        Self::require_initialized(&env)?;
        user.require_auth();

        ledger::withdraw(&env, &token, &user, amount, beneficiary)
    }

    pub fn claim_reward(
        env: Env,
        user: Address,
        token: Address,
        beneficiary: Option<Address>,
    ) -> Result<Vec<RewardPayout>, LedgerError> {
        Self::require_initialized(&env)?;
        user.require_auth();

        ledger::claim_reward(&env, &token, &user, beneficiary)
    }

    pub fn claim_reward_from_all_pools(
        env: Env,
        user: Address,
        beneficiary: Option<Address>,
    ) -> Result<Vec<RewardPayout>, LedgerError> {
        Self::require_initialized(&env)?;
        user.require_auth();

        ledger::claim_reward_from_all_pools(&env, &user, beneficiary)
    }

    /// Withdraw the whole stake, forfeiting unpaid reward.
    pub fn emergency_withdraw(env: Env, user: Address, token: Address) -> Result<i128, LedgerError> {
        Self::require_initialized(&env)?;
        user.require_auth();

        ledger::emergency_withdraw(&env, &token, &user)
    }

    // ── View functions ───────────────────────────────────────────────────────

    pub fn get_user_info(env: Env, token: Address, user: Address) -> UserInfoView {
        ledger::get_user_info(&env, &token, &user)
    }

    pub fn get_pool_info_list_array(env: Env) -> PoolInfoList {
        ledger::get_pool_info_list(&env)
    }

    pub fn get_pool_info(env: Env, token: Address) -> Result<Pool, LedgerError> {
        ledger::load_pool(&env, &token)
    }

    pub fn get_pool_length(env: Env) -> u32 {
        ledger::pool_tokens(&env).len()
    }

    pub fn get_pool_id(env: Env, token: Address) -> Result<u32, LedgerError> {
        ledger::pool_id(&env, &token)
    }

    /// Accumulated plus not-yet-settled reward of a position, in real time.
    pub fn get_pending_reward(env: Env, token: Address, user: Address) -> Result<i128, LedgerError> {
        Ok(ledger::pending_rewards(&env, &token, &user)?
            .first()
            .unwrap_or(0))
    }

    pub fn get_reward_token(env: Env) -> Result<RewardTokenConfig, LedgerError> {
        let token: Address = env
            .storage()
            .instance()
            .get(&REWARD_TOKEN)
            .ok_or(LedgerError::NotInitialized)?;
        ledger::load_reward_config(&env, &token)
    }

    pub fn get_total_allocation_point(env: Env) -> u32 {
        ledger::total_allocation_point(&env)
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    // ── Admin set ────────────────────────────────────────────────────────────

    /// Grant privileged-call capability. Granting it to a successor ledger
    /// gives that ledger migration authority over this one.
    pub fn add_admin(env: Env, caller: Address, admin: Address) -> Result<(), LedgerError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        admin::add_admin(&env, &caller, &admin)?;

        ledger_events::publish_admin_changed(&env, caller, admin, true);
        Ok(())
    }

    pub fn remove_admin(env: Env, caller: Address, admin: Address) -> Result<(), LedgerError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        admin::remove_admin(&env, &caller, &admin)?;

        ledger_events::publish_admin_changed(&env, caller, admin, false);
        Ok(())
    }

    pub fn get_admins(env: Env) -> Vec<Address> {
        admin::list_admins(&env)
    }

    // ── Migration (source side) ──────────────────────────────────────────────

    /// Record the only ledger `migrate_funds` may pay out to.
    pub fn set_successor(env: Env, caller: Address, successor: Address) -> Result<(), LedgerError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        migration::set_successor(&env, &caller, &successor)
    }

    pub fn get_successor(env: Env) -> Option<Address> {
        migration::successor(&env)
    }

    pub fn set_lock_deposits_in_grace(
        env: Env,
        caller: Address,
        locked: bool,
    ) -> Result<(), LedgerError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        admin::require_admin(&env, &caller)?;

        migration::set_deposits_locked_in_grace(&env, locked);
        events::publish_deposit_lock_set(&env, locked);
        Ok(())
    }

    pub fn get_lock_deposits_in_grace(env: Env) -> bool {
        migration::deposits_locked_in_grace(&env)
    }

    /// Open the migration window. Fails `InvalidState` unless migration has
    /// not started yet.
    pub fn start_migration_grace_period(env: Env, caller: Address) -> Result<(), LedgerError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        migration::start_grace_period(&env, &caller)
    }

    pub fn get_grace_start_block(env: Env) -> Option<u32> {
        migration::grace_start_block(&env)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn require_initialized(env: &Env) -> Result<(), LedgerError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(LedgerError::NotInitialized);
        }
        Ok(())
    }
}

#[contractimpl]
impl MigrationSource for LiquidityMiningV1 {
    fn is_admin(env: Env, who: Address) -> bool {
        admin::is_admin(&env, &who)
    }

    fn get_migration_state(env: Env) -> MigrationState {
        migration::state(&env)
    }

    fn update_all_pools(env: Env) -> Result<(), LedgerError> {
        Self::require_initialized(&env)?;
        ledger::update_all_pools(&env)
    }

    fn get_pools(env: Env) -> Vec<Pool> {
        ledger::get_pools(&env)
    }

    fn get_reward_tokens(env: Env) -> Vec<RewardTokenConfig> {
        ledger::get_reward_configs(&env)
    }

    fn get_user_positions(env: Env, user: Address) -> Vec<UserPosition> {
        ledger::get_user_positions(&env, &user)
    }

    fn migrate_funds(env: Env, caller: Address) -> Result<Vec<FundTransfer>, LedgerError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        migration::migrate_funds(&env, &caller)
    }

    fn finish_migration_grace_period(env: Env, caller: Address) -> Result<(), LedgerError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        migration::finish_grace_period(&env, &caller)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────


#[cfg(test)]
mod test_migration;
