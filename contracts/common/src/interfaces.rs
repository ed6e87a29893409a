//! Cross-contract seams.
//!
//! Each trait generates a typed client (`MigrationSourceClient`,
//! `RewardTransferStrategyClient`) that callers use instead of depending on
//! the callee's crate.

use soroban_sdk::{contractclient, Address, Env, InvokeError, Vec};

use crate::types::{FundTransfer, MigrationState, Pool, RewardTokenConfig, UserPosition};
use crate::LedgerError;

/// What a successor ledger may read from, and trigger on, its predecessor.
#[contractclient(name = "MigrationSourceClient")]
pub trait MigrationSource {
    fn is_admin(env: Env, who: Address) -> bool;

    fn get_migration_state(env: Env) -> MigrationState;

    fn update_all_pools(env: Env) -> Result<(), LedgerError>;

    fn get_pools(env: Env) -> Vec<Pool>;

    fn get_reward_tokens(env: Env) -> Vec<RewardTokenConfig>;

    fn get_user_positions(env: Env, user: Address) -> Vec<UserPosition>;

    /// Moves every custodied balance to `caller`, which must be both an admin
    /// and the recorded successor.
    fn migrate_funds(env: Env, caller: Address) -> Result<Vec<FundTransfer>, LedgerError>;

    fn finish_migration_grace_period(env: Env, caller: Address) -> Result<(), LedgerError>;
}

/// Delivers a claimed reward. The ledger transfers `amount` of the reward token
/// to the strategy before calling `payout`; the return value is the part
/// handed to `recipient` immediately.
#[contractclient(name = "RewardTransferStrategyClient")]
pub trait RewardTransferStrategy {
    fn payout(env: Env, ledger: Address, recipient: Address, amount: i128)
        -> Result<i128, LedgerError>;
}

/// Error slot of a generated `try_*` result: `LedgerError` for fallible
/// entry points, the host `Error` for infallible ones.
pub trait CalleeError {
    fn into_ledger_error(self) -> LedgerError;
}

impl CalleeError for LedgerError {
    fn into_ledger_error(self) -> LedgerError {
        self
    }
}

impl CalleeError for soroban_sdk::Error {
    fn into_ledger_error(self) -> LedgerError {
        LedgerError::ExternalCallFailed
    }
}

/// Collapses the nested result of a generated `try_*` client call, forwarding
/// the callee's own [`LedgerError`] unchanged.
pub fn forward<T, C, E: CalleeError>(
    result: Result<Result<T, C>, Result<E, InvokeError>>,
) -> Result<T, LedgerError> {
    match result {
        Ok(Ok(value)) => Ok(value),
        Err(Ok(err)) => Err(err.into_ledger_error()),
        Ok(Err(_)) | Err(Err(_)) => Err(LedgerError::ExternalCallFailed),
    }
}
