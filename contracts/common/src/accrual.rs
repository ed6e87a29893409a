//! Reward accrual arithmetic shared by every ledger version.
//!
//! Everything here is pure integer math over `i128` with floor division at
//! each step. A successor ledger only reproduces its predecessor's balances
//! if it truncates in exactly the same places, so the order of operations in
//! [`pool_reward`] and [`update_pool`] must not change.

use crate::types::AccrualState;
use crate::LedgerError;

/// Scale of `acc_reward_per_share`.
pub const PRECISION: i128 = 1_000_000_000_000;

/// Reward emitted to one pool over `elapsed` blocks.
pub fn pool_reward(
    elapsed: u32,
    reward_per_block: i128,
    allocation_point: u32,
    total_allocation: u32,
) -> Result<i128, LedgerError> {
    if total_allocation == 0 {
        return Ok(0);
    }
    i128::from(elapsed)
        .checked_mul(reward_per_block)
        .and_then(|r| r.checked_mul(i128::from(allocation_point)))
        .map(|r| r / i128::from(total_allocation))
        .ok_or(LedgerError::ArithmeticOverflow)
}

/// Advance `state` to `current_block`.
///
/// With nothing staked only `last_reward_block` moves, so blocks without
/// stakers never inflate the per-share rate.
pub fn update_pool(
    state: &mut AccrualState,
    current_block: u32,
    allocation_point: u32,
    total_allocation: u32,
    total_staked: i128,
) -> Result<(), LedgerError> {
    if current_block <= state.last_reward_block {
        return Ok(());
    }
    if total_staked <= 0 || total_allocation == 0 {
        state.last_reward_block = current_block;
        return Ok(());
    }

    let elapsed = current_block - state.last_reward_block;
    let reward = pool_reward(
        elapsed,
        state.reward_per_block,
        allocation_point,
        total_allocation,
    )?;
    let increment = reward
        .checked_mul(PRECISION)
        .map(|r| r / total_staked)
        .ok_or(LedgerError::ArithmeticOverflow)?;

    state.acc_reward_per_share = state
        .acc_reward_per_share
        .checked_add(increment)
        .ok_or(LedgerError::ArithmeticOverflow)?;
    state.last_reward_block = current_block;
    Ok(())
}

/// `amount * acc / PRECISION`, the debt a position owes at `acc`.
pub fn reward_debt(amount: i128, acc_reward_per_share: i128) -> Result<i128, LedgerError> {
    amount
        .checked_mul(acc_reward_per_share)
        .map(|r| r / PRECISION)
        .ok_or(LedgerError::ArithmeticOverflow)
}

/// Reward accrued by a position since its debt was last reset.
///
/// `acc_reward_per_share` only grows between settlements, so a debt above
/// what is owed means the position is corrupt and the call fails.
pub fn settle(
    amount: i128,
    acc_reward_per_share: i128,
    reward_debt_paid: i128,
) -> Result<i128, LedgerError> {
    let owed = reward_debt(amount, acc_reward_per_share)?;
    match owed.checked_sub(reward_debt_paid) {
        Some(pending) if pending >= 0 => Ok(pending),
        _ => Err(LedgerError::ArithmeticOverflow),
    }
}
