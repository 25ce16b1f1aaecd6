//! Account store: typed records at derived addresses, plus value movement.
//!
//! Every persistent record is wrapped in [`Record`] so the stored value
//! carries its class; loading through the typed accessors of each subsystem
//! fails `WrongClass` when an address holds a record of another class.
//! Creation is unique per address, and all writes within one entry point are
//! atomic (the host rolls back every write and transfer on error).

use soroban_sdk::{contracttype, symbol_short, token, Address, BytesN, Env, Symbol};

use crate::batch::BatchSettlement;
use crate::dispute::Dispute;
use crate::errors::AgentPayError;
use crate::escrow::Escrow;
use crate::invoice::Invoice;
use crate::registry::AgentProfile;
use crate::request::ServiceRequest;
use crate::stream::PaymentStream;
use crate::treasury::Treasury;

/// Class-discriminated record wrapper. The variant is the class tag.
#[contracttype]
#[derive(Clone)]
pub enum Record {
    Treasury(Treasury),
    Invoice(Invoice),
    Batch(BatchSettlement),
    Agent(AgentProfile),
    Request(ServiceRequest),
    Escrow(Escrow),
    Dispute(Dispute),
    Stream(PaymentStream),
}

pub struct AccountStore;

impl AccountStore {
    /// Create a record at `address`. Fails if the address is occupied.
    pub fn create(
        env: &Env,
        address: &BytesN<32>,
        record: &Record,
    ) -> Result<(), AgentPayError> {
        if env.storage().persistent().has(address) {
            return Err(AgentPayError::AlreadyExists);
        }
        env.storage().persistent().set(address, record);
        Ok(())
    }

    /// Load the record at `address`.
    pub fn load(env: &Env, address: &BytesN<32>) -> Result<Record, AgentPayError> {
        env.storage()
            .persistent()
            .get(address)
            .ok_or(AgentPayError::NotFound)
    }

    /// Overwrite the record at `address`. The caller holds the derivation
    /// for the address, which is what authorizes the write.
    pub fn write(env: &Env, address: &BytesN<32>, record: &Record) {
        env.storage().persistent().set(address, record);
    }

    /// Remove the record at `address`.
    pub fn close(env: &Env, address: &BytesN<32>) {
        env.storage().persistent().remove(address);
    }

    pub fn exists(env: &Env, address: &BytesN<32>) -> bool {
        env.storage().persistent().has(address)
    }
}

/// The single settlement asset every amount in the protocol is denominated
/// in, configured once at protocol initialization.
pub struct SettlementAsset;

const ASSET_KEY: Symbol = symbol_short!("asset");

impl SettlementAsset {
    pub fn set(env: &Env, token_address: &Address) {
        env.storage().instance().set(&ASSET_KEY, token_address);
    }

    pub fn get(env: &Env) -> Result<Address, AgentPayError> {
        env.storage()
            .instance()
            .get(&ASSET_KEY)
            .ok_or(AgentPayError::NotInitialized)
    }
}

/// Move base units between principals. The sender's balance is checked
/// up front so an underfunded transfer fails `Insufficient` instead of
/// trapping inside the token contract.
pub fn transfer(
    env: &Env,
    from: &Address,
    to: &Address,
    amount: i128,
) -> Result<(), AgentPayError> {
    let asset = SettlementAsset::get(env)?;
    let client = token::Client::new(env, &asset);
    if client.balance(from) < amount {
        return Err(AgentPayError::Insufficient);
    }
    client.transfer(from, to, &amount);
    Ok(())
}

/// Move base units from a principal into program custody.
pub fn deposit_to_custody(
    env: &Env,
    from: &Address,
    amount: i128,
) -> Result<(), AgentPayError> {
    transfer(env, from, &env.current_contract_address(), amount)
}

/// Release base units from program custody to a principal.
pub fn payout_from_custody(
    env: &Env,
    to: &Address,
    amount: i128,
) -> Result<(), AgentPayError> {
    transfer(env, &env.current_contract_address(), to, amount)
}
