//! Flat admin set owned by each ledger instance.
//!
//! Membership is one persistent entry per address plus a tracked listing.
//! A successor ledger gains migration authority over its predecessor by being
//! added here on the predecessor.

use soroban_sdk::{symbol_short, Address, Env, Symbol, Vec};

use crate::LedgerError;

// ── Storage Keys ─────────────────────────────────────────────────────────────

const ADMIN_PREFIX: Symbol = symbol_short!("ADMIN");
const ADMIN_LIST: Symbol = symbol_short!("ADM_LIST");

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

// ── Storage Helpers ──────────────────────────────────────────────────────────

fn admin_key(admin: &Address) -> (Symbol, Address) {
    (ADMIN_PREFIX, admin.clone())
}

fn extend_ttl(env: &Env, key: &(Symbol, Address)) {
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

fn store_list(env: &Env, admins: &Vec<Address>) {
    env.storage().persistent().set(&ADMIN_LIST, admins);
    env.storage()
        .persistent()
        .extend_ttl(&ADMIN_LIST, TTL_THRESHOLD, TTL_EXTEND_TO);
}

fn track(env: &Env, admin: &Address) {
    let mut admins = list_admins(env);
    if !admins.contains(admin) {
        admins.push_back(admin.clone());
    }
    store_list(env, &admins);
}

fn untrack(env: &Env, admin: &Address) {
    let admins = list_admins(env);
    let mut kept = Vec::new(env);
    for a in admins.iter() {
        if a != *admin {
            kept.push_back(a);
        }
    }
    store_list(env, &kept);
}

// ── Core Functions ───────────────────────────────────────────────────────────

/// Seeds the set with the initializing admin. Only called from `initialize`.
pub fn bootstrap(env: &Env, admin: &Address) {
    let key = admin_key(admin);
    env.storage().persistent().set(&key, &true);
    extend_ttl(env, &key);
    track(env, admin);
}

pub fn is_admin(env: &Env, who: &Address) -> bool {
    let key = admin_key(who);
    let member = env.storage().persistent().has(&key);
    if member {
        extend_ttl(env, &key);
    }
    member
}

/// Guard used by every privileged entry point, ahead of any phase check.
///
/// # Errors
/// `Unauthorized` if `caller` is not in the set.
pub fn require_admin(env: &Env, caller: &Address) -> Result<(), LedgerError> {
    if is_admin(env, caller) {
        Ok(())
    } else {
        Err(LedgerError::Unauthorized)
    }
}

/// Adds `candidate` to the set on behalf of `caller`, who must already be an
/// admin and must have been authenticated with `require_auth()`.
///
/// # Errors
/// `Unauthorized` for a non-admin caller, `InvalidAddress` when the candidate
/// is the contract itself.
pub fn add_admin(env: &Env, caller: &Address, candidate: &Address) -> Result<(), LedgerError> {
    require_admin(env, caller)?;
    if *candidate == env.current_contract_address() {
        return Err(LedgerError::InvalidAddress);
    }
    let key = admin_key(candidate);
    env.storage().persistent().set(&key, &true);
    extend_ttl(env, &key);
    track(env, candidate);
    Ok(())
}

/// Removes `target` from the set. The last remaining admin cannot be removed.
///
/// # Errors
/// `Unauthorized` for a non-admin caller, `InvalidAddress` if `target` is not
/// an admin or is the only one left.
pub fn remove_admin(env: &Env, caller: &Address, target: &Address) -> Result<(), LedgerError> {
    require_admin(env, caller)?;
    if !is_admin(env, target) || list_admins(env).len() <= 1 {
        return Err(LedgerError::InvalidAddress);
    }
    env.storage().persistent().remove(&admin_key(target));
    untrack(env, target);
    Ok(())
}

pub fn list_admins(env: &Env) -> Vec<Address> {
    match env.storage().persistent().get(&ADMIN_LIST) {
        Some(admins) => {
            env.storage()
                .persistent()
                .extend_ttl(&ADMIN_LIST, TTL_THRESHOLD, TTL_EXTEND_TO);
            admins
        }
        None => Vec::new(env),
    }
}
