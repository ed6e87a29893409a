//! Shared accounting, authorization and error types for the liquidity-mining
//! ledgers.
//!
//! This crate provides:
//! - [`LedgerError`]: error codes shared by every ledger contract, so a
//!   callee's error crosses contract boundaries unchanged.
//! - [`accrual`]: the fixed-point reward math both ledger versions run.
//! - [`ledger`]: pool registry, user positions and settlement on top of
//!   contract storage.
//! - [`admin`]: the flat admin set consulted by privileged entry points.
//! - [`interfaces`]: cross-contract clients for migration and reward payout.

#![cfg_attr(not(feature = "std"), no_std)]

use soroban_sdk::contracterror;

// ── Modules ──────────────────────────────────────────────────────────────────

pub mod accrual;
pub mod admin;
pub mod events;
pub mod interfaces;
pub mod ledger;
pub mod types;

pub use interfaces::*;
pub use types::*;

// ── Shared error enum ────────────────────────────────────────────────────────

/// Error codes shared by every ledger contract.
///
/// # Code ranges
/// | Range   | Purpose                        |
/// |---------|--------------------------------|
/// | 1 – 9   | Lifecycle / initialisation     |
/// | 10 – 19 | Authentication & authorisation |
/// | 20 – 29 | Registry lookups               |
/// | 30 – 39 | Amounts & arithmetic           |
/// | 40 – 49 | Migration & policy state       |
/// | 50+     | Cross-contract calls           |
#[contracterror]
#[derive(Clone, Debug, Eq, PartialEq, Copy)]
#[repr(u32)]
pub enum LedgerError {
    // ── Lifecycle (1–9) ──────────────────────────────────────
    /// The contract is not initialised, or the successor recorded on the
    /// source is unset or is not the caller.
    NotInitialized = 1,
    AlreadyInitialized = 2,

    // ── Auth (10–19) ─────────────────────────────────────────
    /// The caller is not in the ledger's admin set.
    Unauthorized = 10,
    /// The address is the ledger itself.
    InvalidAddress = 11,

    // ── Registry (20–29) ─────────────────────────────────────
    PoolNotFound = 20,
    DuplicatePool = 21,
    RewardTokenNotFound = 22,
    DuplicateRewardToken = 23,

    // ── Amounts (30–39) ──────────────────────────────────────
    /// Non-positive amount, out-of-range rate, or nothing left to transfer.
    InvalidAmount = 30,
    /// Withdraw exceeds the staked amount.
    InsufficientBalance = 31,
    /// Checked math overflowed, or a settlement came out negative.
    ArithmeticOverflow = 32,

    // ── Migration & policy (40–49) ───────────────────────────
    /// Generic phase guard, e.g. starting a grace period twice.
    InvalidState = 40,
    /// The source has not opened its grace period yet.
    MigrationNotStarted = 41,
    /// The source has already finished migrating.
    MigrationAlreadyEnded = 42,
    /// The pool set or the user was already migrated.
    AlreadyProcessed = 43,
    /// The source refuses deposits once its grace period has begun.
    DepositsLocked = 44,
    /// The target refuses user traffic until migration is finished.
    MigrationInProgress = 45,

    // ── Cross-contract (50+) ─────────────────────────────────
    /// A callee aborted without returning a `LedgerError`.
    ExternalCallFailed = 50,
}
