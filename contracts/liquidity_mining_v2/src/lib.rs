#![no_std]

pub mod events;
pub mod migration;

use common::{
    admin, events as ledger_events, ledger, FundTransfer, Pool, PoolInfoList, RewardPayout,
    RewardTokenConfig, UserInfoView, UserPosition,
};
use soroban_sdk::{contract, contractimpl, symbol_short, Address, Env, Symbol, Vec};

pub use common::LedgerError;

// ── Storage key constants ────────────────────────────────────────────────────

const INITIALIZED: Symbol = symbol_short!("INIT");

// ── Contract ─────────────────────────────────────────────────────────────────

/// Multi-reward liquidity-mining ledger. When created with a migration source
/// it first takes over that ledger's pools, positions and funds, and only
/// then opens for user traffic.
#[contract]
pub struct LiquidityMiningV2;

#[contractimpl]
impl LiquidityMiningV2 {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the ledger. `migration_source` is the predecessor to take
    /// over, if any.
    pub fn initialize(
        env: Env,
        admin: Address,
        migration_source: Option<Address>,
    ) -> Result<(), LedgerError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(LedgerError::AlreadyInitialized);
        }
        if let Some(source) = &migration_source {
            if *source == env.current_contract_address() {
                return Err(LedgerError::InvalidAddress);
            }
            migration::set_source(&env, source);
        }

        env.storage().instance().set(&INITIALIZED, &true);
        admin::bootstrap(&env, &admin);

        events::publish_initialized(&env, admin, migration_source);
        Ok(())
    }

    /// Register a reward token emitted to every pool. While a migration is in
    /// progress this is only allowed before `migrate_pools`, so the
    /// predecessor's reward tokens can be registered first.
    pub fn add_reward_token(
        env: Env,
        caller: Address,
        token: Address,
        reward_per_block: i128,
        start_delay_blocks: u32,
        strategy: Address,
    ) -> Result<(), LedgerError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        admin::require_admin(&env, &caller)?;
        migration::require_reward_registry_open(&env)?;

        ledger::add_reward_token(&env, &token, reward_per_block, start_delay_blocks, &strategy)
    }

    // ── Pools ───────────────────────────────────────────────────────────────

    pub fn add(
        env: Env,
        caller: Address,
        token: Address,
        allocation_point: u32,
    ) -> Result<(), LedgerError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        admin::require_admin(&env, &caller)?;
        migration::require_open(&env)?;

        ledger::add_pool(&env, &token, allocation_point)
    }

    pub fn update(
        env: Env,
        caller: Address,
        token: Address,
        allocation_point: u32,
    ) -> Result<(), LedgerError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        admin::require_admin(&env, &caller)?;
        migration::require_open(&env)?;

        ledger::set_allocation_point(&env, &token, allocation_point)
    }

    pub fn update_pool(env: Env, token: Address) -> Result<(), LedgerError> {
        Self::require_initialized(&env)?;
        migration::require_open(&env)?;
        ledger::update_pool(&env, &token).map(|_| ())
    }

    pub fn update_all_pools(env: Env) -> Result<(), LedgerError> {
        Self::require_initialized(&env)?;
        migration::require_open(&env)?;
        ledger::update_all_pools(&env)
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    pub fn deposit(
        env: Env,
        user: Address,
        token: Address,
        amount: i128,
        beneficiary: Option<Address>,
    ) -> Result<(), LedgerError> {
        Self::require_initialized(&env)?;
        user.require_auth();
        migration::require_open(&env)?;

        ledger::deposit(&env, &token, &user, amount, beneficiary)
    }

    pub fn withdraw(
        env: Env,
        user: Address,
        token: Address,
        amount: i128,
        beneficiary: Option<Address>,
    ) -> Result<Vec<RewardPayout>, LedgerError> {
        Self::require_initialized(&env)?;
        user.require_auth();
        migration::require_open(&env)?;

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
        migration::require_open(&env)?;

        ledger::claim_reward(&env, &token, &user, beneficiary)
    }

    pub fn claim_reward_from_all_pools(
        env: Env,
        user: Address,
        beneficiary: Option<Address>,
    ) -> Result<Vec<RewardPayout>, LedgerError> {
        Self::require_initialized(&env)?;
        user.require_auth();
        migration::require_open(&env)?;

        ledger::claim_reward_from_all_pools(&env, &user, beneficiary)
    }

    pub fn emergency_withdraw(env: Env, user: Address, token: Address) -> Result<i128, LedgerError> {
        Self::require_initialized(&env)?;
        user.require_auth();
        migration::require_open(&env)?;

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

    pub fn get_pools(env: Env) -> Vec<Pool> {
        ledger::get_pools(&env)
    }

    pub fn get_reward_tokens(env: Env) -> Vec<RewardTokenConfig> {
        ledger::get_reward_configs(&env)
    }

    pub fn get_user_positions(env: Env, user: Address) -> Vec<UserPosition> {
        ledger::get_user_positions(&env, &user)
    }

    /// Pending reward per reward token, in registration order.
    pub fn get_pending_rewards(
        env: Env,
        token: Address,
        user: Address,
    ) -> Result<Vec<i128>, LedgerError> {
        ledger::pending_rewards(&env, &token, &user)
    }

    pub fn get_total_allocation_point(env: Env) -> u32 {
        ledger::total_allocation_point(&env)
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    // ── Admin set ────────────────────────────────────────────────────────────

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

    pub fn is_admin(env: Env, who: Address) -> bool {
        admin::is_admin(&env, &who)
    }

    pub fn get_admins(env: Env) -> Vec<Address> {
        admin::list_admins(&env)
    }

    // ── Migration (target side) ──────────────────────────────────────────────

    /// Recreate the source's pools here. Returns the number of pools copied.
    pub fn migrate_pools(env: Env, caller: Address) -> Result<u32, LedgerError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        migration::migrate_pools(&env, &caller)
    }

    /// Copy the source positions of `users`. Returns how many had positions.
    pub fn migrate_users(
        env: Env,
        caller: Address,
        users: Vec<Address>,
    ) -> Result<u32, LedgerError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        migration::migrate_users(&env, &caller, &users)
    }

    pub fn migrate_funds(env: Env, caller: Address) -> Result<Vec<FundTransfer>, LedgerError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        migration::migrate_funds(&env, &caller)
    }

    pub fn finish_migration(env: Env, caller: Address) -> Result<(), LedgerError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        migration::finish_migration(&env, &caller)
    }

    pub fn is_user_migrated(env: Env, user: Address) -> bool {
        migration::is_user_migrated(&env, &user)
    }

    pub fn are_pools_migrated(env: Env) -> bool {
        migration::pools_migrated(&env)
    }

    pub fn is_migration_finished(env: Env) -> bool {
        migration::is_finished(&env)
    }

    pub fn get_migration_source(env: Env) -> Option<Address> {
        migration::source(&env)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn require_initialized(env: &Env) -> Result<(), LedgerError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(LedgerError::NotInitialized);
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
