use crate::admin::AdminStorage;
use crate::errors::AgentPayError;
use soroban_sdk::{symbol_short, Address, Env, Symbol};

/// Storage key for the protocol pause flag.
const PAUSED_KEY: Symbol = symbol_short!("paused");

/// Pause controller for the protocol.
///
/// When paused, mutating entry points reject with `ContractPaused`; the
/// read surface and admin operations stay available.
pub struct PauseControl;

impl PauseControl {
    pub fn is_paused(env: &Env) -> bool {
        env.storage().instance().get(&PAUSED_KEY).unwrap_or(false)
    }

    /// Set the pause flag (admin only).
    pub fn set_paused(env: &Env, admin: &Address, paused: bool) -> Result<(), AgentPayError> {
        admin.require_auth();
        if !AdminStorage::is_admin(env, admin) {
            return Err(AgentPayError::NotAdmin);
        }
        env.storage().instance().set(&PAUSED_KEY, &paused);
        Ok(())
    }

    /// Require that the protocol is not paused.
    pub fn require_not_paused(env: &Env) -> Result<(), AgentPayError> {
        if Self::is_paused(env) {
            return Err(AgentPayError::ContractPaused);
        }
        Ok(())
    }
}
