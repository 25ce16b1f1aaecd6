//! Program-controlled escrow records.
//!
//! An escrow is the value-holding sibling of a service request or payment
//! stream: the tokens sit in the contract's own balance and the record
//! tracks how much of them belong to this escrow. No principal owns an
//! escrow; only the entry points in this crate can move value out, and only
//! through the drain operations below.

use soroban_sdk::{contracttype, Address, BytesN, Env};

use crate::address;
use crate::errors::AgentPayError;
use crate::store::{self, AccountStore, Record};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EscrowStatus {
    /// Funds are held by the program.
    Held,
    /// Fully paid out to the beneficiary.
    Released,
    /// Fully returned to the payer.
    Refunded,
    /// Divided between beneficiary and payer by a dispute verdict.
    Split,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Escrow {
    /// Identifier of the owning request or stream.
    pub id: BytesN<32>,
    pub bump: u32,
    pub payer: Address,
    pub beneficiary: Address,
    /// Amount locked at creation.
    pub amount: i128,
    /// Base units currently held for this escrow.
    pub balance: i128,
    pub created_at: u64,
    pub status: EscrowStatus,
}

pub struct EscrowVault;

impl EscrowVault {
    pub fn address(env: &Env, tag: &[u8], id: &BytesN<32>) -> (BytesN<32>, u32) {
        address::derive(env, tag, &[address::seed_from_id(env, id)])
    }

    pub fn get(env: &Env, tag: &[u8], id: &BytesN<32>) -> Result<Escrow, AgentPayError> {
        let (addr, _) = Self::address(env, tag, id);
        match AccountStore::load(env, &addr)? {
            Record::Escrow(escrow) => Ok(escrow),
            _ => Err(AgentPayError::WrongClass),
        }
    }

    fn update(env: &Env, tag: &[u8], escrow: &Escrow) {
        let (addr, _) = Self::address(env, tag, &escrow.id);
        AccountStore::write(env, &addr, &Record::Escrow(escrow.clone()));
    }

    /// Create the escrow record and pull `amount` from the payer into
    /// program custody.
    pub fn open(
        env: &Env,
        tag: &[u8],
        id: &BytesN<32>,
        payer: &Address,
        beneficiary: &Address,
        amount: i128,
    ) -> Result<BytesN<32>, AgentPayError> {
        let (addr, bump) = Self::address(env, tag, id);
        let escrow = Escrow {
            id: id.clone(),
            bump,
            payer: payer.clone(),
            beneficiary: beneficiary.clone(),
            amount,
            balance: amount,
            created_at: env.ledger().timestamp(),
            status: EscrowStatus::Held,
        };
        AccountStore::create(env, &addr, &Record::Escrow(escrow))?;
        store::deposit_to_custody(env, payer, amount)?;
        Ok(addr)
    }

    /// Pay the full balance to `to` and mark the escrow with `final_status`.
    pub fn drain(
        env: &Env,
        tag: &[u8],
        id: &BytesN<32>,
        to: &Address,
        final_status: EscrowStatus,
    ) -> Result<i128, AgentPayError> {
        let mut escrow = Self::get(env, tag, id)?;
        if escrow.status != EscrowStatus::Held {
            return Err(AgentPayError::AlreadyTerminal);
        }
        let amount = escrow.balance;
        if amount > 0 {
            store::payout_from_custody(env, to, amount)?;
        }
        escrow.balance = 0;
        escrow.status = final_status;
        Self::update(env, tag, &escrow);
        Ok(amount)
    }

    /// Divide the balance: `beneficiary_share` to the beneficiary, the exact
    /// remainder back to the payer.
    pub fn drain_split(
        env: &Env,
        tag: &[u8],
        id: &BytesN<32>,
        beneficiary_share: i128,
    ) -> Result<(i128, i128), AgentPayError> {
        let mut escrow = Self::get(env, tag, id)?;
        if escrow.status != EscrowStatus::Held {
            return Err(AgentPayError::AlreadyTerminal);
        }
        if beneficiary_share < 0 || beneficiary_share > escrow.balance {
            return Err(AgentPayError::BadAmount);
        }
        let payer_share = escrow.balance - beneficiary_share;
        if beneficiary_share > 0 {
            store::payout_from_custody(env, &escrow.beneficiary, beneficiary_share)?;
        }
        if payer_share > 0 {
            store::payout_from_custody(env, &escrow.payer, payer_share)?;
        }
        escrow.balance = 0;
        escrow.status = EscrowStatus::Split;
        Self::update(env, tag, &escrow);
        Ok((beneficiary_share, payer_share))
    }

    /// Pay part of the balance to `to`, leaving the escrow held. Used by
    /// stream withdrawals and cancel refunds.
    pub fn withdraw_partial(
        env: &Env,
        tag: &[u8],
        id: &BytesN<32>,
        to: &Address,
        amount: i128,
    ) -> Result<(), AgentPayError> {
        let mut escrow = Self::get(env, tag, id)?;
        if escrow.status != EscrowStatus::Held {
            return Err(AgentPayError::AlreadyTerminal);
        }
        if amount <= 0 || amount > escrow.balance {
            return Err(AgentPayError::BadAmount);
        }
        store::payout_from_custody(env, to, amount)?;
        escrow.balance -= amount;
        Self::update(env, tag, &escrow);
        Ok(())
    }

    /// Mark a held, fully-drained escrow with its terminal status.
    pub fn finalize(
        env: &Env,
        tag: &[u8],
        id: &BytesN<32>,
        final_status: EscrowStatus,
    ) -> Result<(), AgentPayError> {
        let mut escrow = Self::get(env, tag, id)?;
        if escrow.status != EscrowStatus::Held {
            return Err(AgentPayError::AlreadyTerminal);
        }
        escrow.status = final_status;
        Self::update(env, tag, &escrow);
        Ok(())
    }
}
