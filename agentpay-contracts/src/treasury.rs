//! Per-principal treasury: the accounting record for earned funds.
//!
//! A treasury never holds value itself; payments land at the owner's token
//! balance and the treasury tracks cumulative received/settled totals plus
//! the number of outstanding invoices naming the owner as recipient.

use soroban_sdk::{contracttype, Address, BytesN, Env};

use crate::address;
use crate::errors::AgentPayError;
use crate::events;
use crate::store::{AccountStore, Record};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Treasury {
    pub owner: Address,
    pub bump: u32,
    /// Cumulative base units received. Monotonically non-decreasing.
    pub total_received: i128,
    /// Cumulative base units reconciled via batches. Never exceeds
    /// `total_received`.
    pub total_settled: i128,
    /// Number of Pending invoices whose recipient is `owner`.
    pub pending_invoices: u64,
    pub created_at: u64,
}

pub struct TreasuryStorage;

impl TreasuryStorage {
    pub fn address(env: &Env, owner: &Address) -> (BytesN<32>, u32) {
        address::derive(
            env,
            address::TREASURY_TAG,
            &[address::seed_from_address(env, owner)],
        )
    }

    pub fn exists(env: &Env, owner: &Address) -> bool {
        let (addr, _) = Self::address(env, owner);
        AccountStore::exists(env, &addr)
    }

    /// Load the treasury for `owner`, failing `NoTreasury` when the owner
    /// never initialized one.
    pub fn get(env: &Env, owner: &Address) -> Result<Treasury, AgentPayError> {
        let (addr, _) = Self::address(env, owner);
        match AccountStore::load(env, &addr) {
            Ok(Record::Treasury(treasury)) => Ok(treasury),
            Ok(_) => Err(AgentPayError::WrongClass),
            Err(AgentPayError::NotFound) => Err(AgentPayError::NoTreasury),
            Err(e) => Err(e),
        }
    }

    pub fn update(env: &Env, treasury: &Treasury) {
        let (addr, _) = Self::address(env, &treasury.owner);
        AccountStore::write(env, &addr, &Record::Treasury(treasury.clone()));
    }
}

/// Create the treasury record for `owner`. One per principal, ever.
pub fn initialize_treasury(env: &Env, owner: &Address) -> Result<BytesN<32>, AgentPayError> {
    owner.require_auth();

    let (addr, bump) = TreasuryStorage::address(env, owner);
    let treasury = Treasury {
        owner: owner.clone(),
        bump,
        total_received: 0,
        total_settled: 0,
        pending_invoices: 0,
        created_at: env.ledger().timestamp(),
    };
    AccountStore::create(env, &addr, &Record::Treasury(treasury.clone()))?;

    events::emit_treasury_initialized(env, owner, &addr);
    Ok(addr)
}
