#![no_std]

pub mod events;

use common::{admin, LedgerError, RewardTransferStrategy};
use soroban_sdk::{
    contract, contractimpl, contracttype, symbol_short, token, Address, Env, Symbol, Vec,
};

// ── Storage key constants ────────────────────────────────────────────────────

const INITIALIZED: Symbol = symbol_short!("INIT");
const TOKEN: Symbol = symbol_short!("TOKEN");
const UNLOCKED_BPS: Symbol = symbol_short!("UNLK_BPS");
const LOCK_BLOCKS: Symbol = symbol_short!("LOCK_BLK");

// Persistent storage uses tuple keys:  (prefix, address)
const LEDGER: Symbol = symbol_short!("LEDGER");
const GRANTS: Symbol = symbol_short!("GRANTS");

/// 10 000 basis points is 100 %.
pub const MAX_BPS: u32 = 10_000;

// ── Public-facing types ──────────────────────────────────────────────────────

/// Reward withheld from a recipient until `unlock_block`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LockedGrant {
    pub amount: i128,
    pub unlock_block: u32,
}

// ── Contract ─────────────────────────────────────────────────────────────────

/// Pays rewards on behalf of registered ledgers: a configurable share is sent
/// immediately, the rest is locked for `lock_blocks`. At `MAX_BPS` it is a
/// plain instant transfer.
#[contract]
pub struct RewardTransferLogic;

#[contractimpl]
impl RewardTransferLogic {
    /// * `token` – reward token this strategy pays out.
    /// * `unlocked_immediately_bps` – share delivered on payout.
    /// * `lock_blocks` – how long the remainder stays locked.
    pub fn initialize(
        env: Env,
        admin: Address,
        token: Address,
        unlocked_immediately_bps: u32,
        lock_blocks: u32,
    ) -> Result<(), LedgerError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(LedgerError::AlreadyInitialized);
        }
        if unlocked_immediately_bps > MAX_BPS {
            return Err(LedgerError::InvalidAmount);
        }

        env.storage().instance().set(&INITIALIZED, &true);
        env.storage().instance().set(&TOKEN, &token);
        env.storage()
            .instance()
            .set(&UNLOCKED_BPS, &unlocked_immediately_bps);
        env.storage().instance().set(&LOCK_BLOCKS, &lock_blocks);
        admin::bootstrap(&env, &admin);

        events::publish_initialized(&env, admin, token, unlocked_immediately_bps, lock_blocks);
        Ok(())
    }

    /// Allow `ledger` to call `payout`.
    pub fn add_ledger(env: Env, caller: Address, ledger: Address) -> Result<(), LedgerError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        admin::require_admin(&env, &caller)?;

        env.storage().persistent().set(&(LEDGER, ledger.clone()), &true);
        events::publish_ledger_changed(&env, ledger, true);
        Ok(())
    }

    pub fn remove_ledger(env: Env, caller: Address, ledger: Address) -> Result<(), LedgerError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        admin::require_admin(&env, &caller)?;

        env.storage().persistent().remove(&(LEDGER, ledger.clone()));
        events::publish_ledger_changed(&env, ledger, false);
        Ok(())
    }

    pub fn is_ledger(env: Env, ledger: Address) -> bool {
        env.storage().persistent().has(&(LEDGER, ledger))
    }

    /// Change the share delivered immediately; affects future payouts only.
    pub fn set_unlocked_immediately_bps(
        env: Env,
        caller: Address,
        bps: u32,
    ) -> Result<(), LedgerError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        admin::require_admin(&env, &caller)?;
        if bps > MAX_BPS {
            return Err(LedgerError::InvalidAmount);
        }

        env.storage().instance().set(&UNLOCKED_BPS, &bps);
        Ok(())
    }

    pub fn get_unlocked_immediately_bps(env: Env) -> u32 {
        env.storage().instance().get(&UNLOCKED_BPS).unwrap_or(MAX_BPS)
    }

    pub fn get_lock_blocks(env: Env) -> u32 {
        env.storage().instance().get(&LOCK_BLOCKS).unwrap_or(0)
    }

    /// Release every grant of `recipient` whose unlock block has passed.
    pub fn withdraw_unlocked(env: Env, recipient: Address) -> Result<i128, LedgerError> {
        Self::require_initialized(&env)?;
        recipient.require_auth();

        let now = env.ledger().sequence();
        let mut released: i128 = 0;
        let mut still_locked = Vec::new(&env);
        for grant in Self::get_grants(env.clone(), recipient.clone()).iter() {
            if grant.unlock_block <= now {
                released = released
                    .checked_add(grant.amount)
                    .ok_or(LedgerError::ArithmeticOverflow)?;
            } else {
                still_locked.push_back(grant);
            }
        }
        if released == 0 {
            return Ok(0);
        }

        env.storage()
            .persistent()
            .set(&(GRANTS, recipient.clone()), &still_locked);
        token::Client::new(&env, &Self::token(&env)?).transfer(
            &env.current_contract_address(),
            &recipient,
            &released,
        );

        events::publish_unlocked_withdrawn(&env, recipient, released);
        Ok(released)
    }

    pub fn get_grants(env: Env, recipient: Address) -> Vec<LockedGrant> {
        env.storage()
            .persistent()
            .get(&(GRANTS, recipient))
            .unwrap_or(Vec::new(&env))
    }

    pub fn get_locked_balance(env: Env, recipient: Address) -> i128 {
        Self::get_grants(env, recipient)
            .iter()
            .fold(0i128, |total, grant| total.saturating_add(grant.amount))
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn require_initialized(env: &Env) -> Result<(), LedgerError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(LedgerError::NotInitialized);
        }
        Ok(())
    }

    fn token(env: &Env) -> Result<Address, LedgerError> {
        env.storage()
            .instance()
            .get(&TOKEN)
            .ok_or(LedgerError::NotInitialized)
    }
}

#[contractimpl]
impl RewardTransferStrategy for RewardTransferLogic {
    /// The calling ledger has already transferred `amount` to this contract.
    fn payout(
        env: Env,
        ledger: Address,
        recipient: Address,
        amount: i128,
    ) -> Result<i128, LedgerError> {
        Self::require_initialized(&env)?;
        ledger.require_auth();
        if !env.storage().persistent().has(&(LEDGER, ledger.clone())) {
            return Err(LedgerError::Unauthorized);
        }
        if amount < 0 {
            return Err(LedgerError::InvalidAmount);
        }
        if amount == 0 {
            return Ok(0);
        }

        let bps: u32 = env.storage().instance().get(&UNLOCKED_BPS).unwrap_or(MAX_BPS);
        let immediate = amount
            .checked_mul(i128::from(bps))
            .map(|v| v / i128::from(MAX_BPS))
            .ok_or(LedgerError::ArithmeticOverflow)?;
        let locked = amount - immediate;

        if locked > 0 {
            let lock_blocks: u32 = env.storage().instance().get(&LOCK_BLOCKS).unwrap_or(0);
            let mut grants = Self::get_grants(env.clone(), recipient.clone());
            grants.push_back(LockedGrant {
                amount: locked,
                unlock_block: env.ledger().sequence().saturating_add(lock_blocks),
            });
            env.storage()
                .persistent()
                .set(&(GRANTS, recipient.clone()), &grants);
        }
        if immediate > 0 {
            token::Client::new(&env, &Self::token(&env)?).transfer(
                &env.current_contract_address(),
                &recipient,
                &immediate,
            );
        }

        events::publish_paid(&env, ledger, recipient, immediate, locked);
        Ok(immediate)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
