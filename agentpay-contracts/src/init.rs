//! One-time protocol initialization.
//!
//! Configures the admin and the single settlement asset every amount is
//! denominated in. Re-initialization is rejected so neither can be swapped
//! out from under live records.

use soroban_sdk::{symbol_short, Address, Env, Symbol};

use crate::admin::AdminStorage;
use crate::errors::AgentPayError;
use crate::store::SettlementAsset;

const INITIALIZED_KEY: Symbol = symbol_short!("proto_in");

pub struct ProtocolInitializer;

impl ProtocolInitializer {
    pub fn initialize(
        env: &Env,
        admin: &Address,
        settlement_asset: &Address,
    ) -> Result<(), AgentPayError> {
        admin.require_auth();

        if Self::is_initialized(env) {
            return Err(AgentPayError::AlreadyInitialized);
        }

        AdminStorage::set(env, admin);
        SettlementAsset::set(env, settlement_asset);
        env.storage().instance().set(&INITIALIZED_KEY, &true);

        env.events().publish(
            (symbol_short!("proto_in"),),
            (
                admin.clone(),
                settlement_asset.clone(),
                env.ledger().timestamp(),
            ),
        );
        Ok(())
    }

    pub fn is_initialized(env: &Env) -> bool {
        env.storage()
            .instance()
            .get(&INITIALIZED_KEY)
            .unwrap_or(false)
    }
}
