//! Protocol admin role.
//!
//! A single admin address, set once at initialization, gates the pause
//! switch and configuration changes. Record custody is never admin-gated:
//! invoices, requests, escrows and streams answer only to their own rules.

use crate::errors::AgentPayError;
use soroban_sdk::{symbol_short, Address, Env, Symbol};

pub const ADMIN_KEY: Symbol = symbol_short!("admin");

pub struct AdminStorage;

impl AdminStorage {
    pub fn set(env: &Env, admin: &Address) {
        env.storage().instance().set(&ADMIN_KEY, admin);
    }

    pub fn get(env: &Env) -> Option<Address> {
        env.storage().instance().get(&ADMIN_KEY)
    }

    pub fn is_admin(env: &Env, address: &Address) -> bool {
        match Self::get(env) {
            Some(admin) => admin == *address,
            None => false,
        }
    }

    /// Transfer the admin role. The current admin must authorize.
    pub fn transfer(
        env: &Env,
        current_admin: &Address,
        new_admin: &Address,
    ) -> Result<(), AgentPayError> {
        current_admin.require_auth();
        if !Self::is_admin(env, current_admin) {
            return Err(AgentPayError::NotAdmin);
        }
        env.storage().instance().set(&ADMIN_KEY, new_admin);
        emit_admin_transferred(env, current_admin, new_admin);
        Ok(())
    }
}

fn emit_admin_transferred(env: &Env, old_admin: &Address, new_admin: &Address) {
    env.events().publish(
        (symbol_short!("adm_trf"),),
        (
            old_admin.clone(),
            new_admin.clone(),
            env.ledger().timestamp(),
        ),
    );
}
