//! Batch settlement: atomically reconcile a set of previously-paid invoices.
//!
//! No value moves here; it moved when each invoice was paid. A batch
//! advances the recipient's settled cursor and leaves an auditable record of
//! which invoices it covers. Each invoice can be reconciled by at most one
//! batch, which is what keeps `total_settled ≤ total_received` a hard
//! invariant.

use soroban_sdk::{contracttype, symbol_short, Address, BytesN, Env, Symbol, Vec};

use crate::address;
use crate::errors::AgentPayError;
use crate::events;
use crate::invoice::{InvoiceStatus, InvoiceStorage};
use crate::store::{AccountStore, Record};
use crate::treasury::TreasuryStorage;

pub const MAX_BATCH_SIZE: u32 = 50;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BatchSettlement {
    pub id: BytesN<32>,
    pub bump: u32,
    pub settler: Address,
    pub recipient: Address,
    pub invoice_ids: Vec<BytesN<32>>,
    pub total_amount: i128,
    pub settled_at: u64,
}

const SETTLED_MARKER: Symbol = symbol_short!("settled");

pub struct BatchStorage;

impl BatchStorage {
    pub fn address(env: &Env, id: &BytesN<32>) -> (BytesN<32>, u32) {
        address::derive(env, address::BATCH_TAG, &[address::seed_from_id(env, id)])
    }

    pub fn get(env: &Env, id: &BytesN<32>) -> Result<BatchSettlement, AgentPayError> {
        let (addr, _) = Self::address(env, id);
        match AccountStore::load(env, &addr)? {
            Record::Batch(batch) => Ok(batch),
            _ => Err(AgentPayError::WrongClass),
        }
    }

    /// The batch that reconciled `invoice_id`, if any.
    pub fn settling_batch(env: &Env, invoice_id: &BytesN<32>) -> Option<BytesN<32>> {
        env.storage()
            .persistent()
            .get(&(SETTLED_MARKER, invoice_id.clone()))
    }

    fn mark_settled(env: &Env, invoice_id: &BytesN<32>, batch_id: &BytesN<32>) {
        env.storage()
            .persistent()
            .set(&(SETTLED_MARKER, invoice_id.clone()), batch_id);
    }
}

/// Post a batch: every named invoice must be Paid to `recipient` and not
/// yet reconciled, and the claimed total must equal the exact sum.
pub fn settle_batch(
    env: &Env,
    settler: &Address,
    batch_id: &BytesN<32>,
    recipient: &Address,
    invoice_ids: Vec<BytesN<32>>,
    claimed_total: i128,
) -> Result<BytesN<32>, AgentPayError> {
    settler.require_auth();

    if invoice_ids.is_empty() {
        return Err(AgentPayError::EmptyBatch);
    }
    if invoice_ids.len() > MAX_BATCH_SIZE {
        return Err(AgentPayError::BatchTooLarge);
    }

    let (addr, bump) = BatchStorage::address(env, batch_id);
    if AccountStore::exists(env, &addr) {
        return Err(AgentPayError::AlreadyExists);
    }

    let mut treasury = TreasuryStorage::get(env, recipient)?;

    let mut sum: i128 = 0;
    for invoice_id in invoice_ids.iter() {
        let invoice = InvoiceStorage::get(env, &invoice_id)?;
        if invoice.status != InvoiceStatus::Paid {
            return Err(AgentPayError::InvoiceNotPaid);
        }
        if invoice.recipient != *recipient {
            return Err(AgentPayError::WrongRecipient);
        }
        sum = sum.saturating_add(invoice.amount);
    }

    if sum != claimed_total {
        return Err(AgentPayError::SumMismatch);
    }

    // Second pass: claim each invoice for this batch. An invoice already
    // reconciled (by an earlier batch, or a duplicate id in this one) is no
    // longer awaiting settlement.
    for invoice_id in invoice_ids.iter() {
        if BatchStorage::settling_batch(env, &invoice_id).is_some() {
            return Err(AgentPayError::InvoiceNotPaid);
        }
        BatchStorage::mark_settled(env, &invoice_id, batch_id);
    }

    let batch = BatchSettlement {
        id: batch_id.clone(),
        bump,
        settler: settler.clone(),
        recipient: recipient.clone(),
        invoice_ids,
        total_amount: claimed_total,
        settled_at: env.ledger().timestamp(),
    };
    AccountStore::create(env, &addr, &Record::Batch(batch.clone()))?;

    treasury.total_settled = treasury.total_settled.saturating_add(claimed_total);
    TreasuryStorage::update(env, &treasury);

    events::emit_batch_settled(env, &batch);
    Ok(addr)
}
