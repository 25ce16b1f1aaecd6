//! Reentrancy guard for value-moving flows.
//!
//! Prevents intermediate re-entry into payment/escrow operations. Uses a
//! single lock flag in instance storage.

use crate::errors::AgentPayError;
use soroban_sdk::{symbol_short, Env};

/// Runs a closure with the payment reentrancy guard held.
///
/// At entry, if the lock is already set, fails `ReentrantCall`. Otherwise
/// sets the lock, runs `f`, then clears the lock on success or failure.
pub fn with_payment_guard<F, R>(env: &Env, f: F) -> Result<R, AgentPayError>
where
    F: FnOnce() -> Result<R, AgentPayError>,
{
    let key = symbol_short!("pay_lock");
    if env.storage().instance().get(&key).unwrap_or(false) {
        return Err(AgentPayError::ReentrantCall);
    }
    env.storage().instance().set(&key, &true);
    let result = f();
    env.storage().instance().set(&key, &false);
    result
}
