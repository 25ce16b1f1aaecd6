//! Invoice lifecycle: Pending → Paid / Expired / Cancelled.
//!
//! Terminal states are sticky; once an invoice leaves Pending no further
//! mutation is accepted. Paying moves value straight from the payer to the
//! recipient principal; the recipient's treasury only records the totals.

use soroban_sdk::{contracttype, symbol_short, Address, BytesN, Env, String, Symbol, Vec};

use crate::address;
use crate::errors::AgentPayError;
use crate::events;
use crate::store::{self, AccountStore, Record};
use crate::treasury::TreasuryStorage;

pub const MAX_MEMO_LENGTH: u32 = 256;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Expired,
    Cancelled,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Invoice {
    pub id: BytesN<32>,
    pub bump: u32,
    pub recipient: Address,
    pub amount: i128,
    pub memo: String,
    pub status: InvoiceStatus,
    pub created_at: u64,
    pub expires_at: u64,
    pub paid_at: Option<u64>,
    pub payer: Option<Address>,
}

impl Invoice {
    /// Status as observable right now: a stored Pending past its expiry
    /// reads as Expired whether or not the transition was persisted.
    pub fn effective_status(&self, now: u64) -> InvoiceStatus {
        if self.status == InvoiceStatus::Pending && now > self.expires_at {
            InvoiceStatus::Expired
        } else {
            self.status.clone()
        }
    }
}

const RECIPIENT_INDEX: Symbol = symbol_short!("inv_rcp");

pub struct InvoiceStorage;

impl InvoiceStorage {
    pub fn address(env: &Env, id: &BytesN<32>) -> (BytesN<32>, u32) {
        address::derive(env, address::INVOICE_TAG, &[address::seed_from_id(env, id)])
    }

    pub fn get(env: &Env, id: &BytesN<32>) -> Result<Invoice, AgentPayError> {
        let (addr, _) = Self::address(env, id);
        match AccountStore::load(env, &addr)? {
            Record::Invoice(invoice) => Ok(invoice),
            _ => Err(AgentPayError::WrongClass),
        }
    }

    pub fn update(env: &Env, invoice: &Invoice) {
        let (addr, _) = Self::address(env, &invoice.id);
        AccountStore::write(env, &addr, &Record::Invoice(invoice.clone()));
    }

    pub fn ids_by_recipient(env: &Env, recipient: &Address) -> Vec<BytesN<32>> {
        env.storage()
            .persistent()
            .get(&(RECIPIENT_INDEX, recipient.clone()))
            .unwrap_or_else(|| Vec::new(env))
    }

    fn add_to_recipient_index(env: &Env, recipient: &Address, id: &BytesN<32>) {
        let mut ids = Self::ids_by_recipient(env, recipient);
        if !ids.contains(id) {
            ids.push_back(id.clone());
            env.storage()
                .persistent()
                .set(&(RECIPIENT_INDEX, recipient.clone()), &ids);
        }
    }
}

/// Create a Pending invoice. The recipient signs and must already have a
/// treasury; the pending counter there goes up by one.
pub fn create_invoice(
    env: &Env,
    recipient: &Address,
    id: &BytesN<32>,
    amount: i128,
    memo: String,
    expires_at: u64,
) -> Result<BytesN<32>, AgentPayError> {
    recipient.require_auth();

    if amount <= 0 {
        return Err(AgentPayError::BadAmount);
    }
    if memo.len() > MAX_MEMO_LENGTH {
        return Err(AgentPayError::MemoTooLong);
    }
    let now = env.ledger().timestamp();
    if expires_at <= now {
        return Err(AgentPayError::ExpiryInPast);
    }

    let mut treasury = TreasuryStorage::get(env, recipient)?;

    let (addr, bump) = InvoiceStorage::address(env, id);
    let invoice = Invoice {
        id: id.clone(),
        bump,
        recipient: recipient.clone(),
        amount,
        memo,
        status: InvoiceStatus::Pending,
        created_at: now,
        expires_at,
        paid_at: None,
        payer: None,
    };
    AccountStore::create(env, &addr, &Record::Invoice(invoice.clone()))?;
    InvoiceStorage::add_to_recipient_index(env, recipient, id);

    treasury.pending_invoices += 1;
    TreasuryStorage::update(env, &treasury);

    events::emit_invoice_created(env, &invoice);
    Ok(addr)
}

/// Pay a Pending, unexpired invoice: value moves payer → recipient, the
/// invoice becomes Paid, and the recipient's treasury totals advance.
pub fn pay_invoice(
    env: &Env,
    payer: &Address,
    invoice_id: &BytesN<32>,
) -> Result<(), AgentPayError> {
    payer.require_auth();

    let mut invoice = InvoiceStorage::get(env, invoice_id)?;
    if invoice.status != InvoiceStatus::Pending {
        return Err(AgentPayError::NotPending);
    }
    let now = env.ledger().timestamp();
    if now >= invoice.expires_at {
        return Err(AgentPayError::Expired);
    }

    let mut treasury = TreasuryStorage::get(env, &invoice.recipient)?;

    store::transfer(env, payer, &invoice.recipient, invoice.amount)?;

    invoice.status = InvoiceStatus::Paid;
    invoice.paid_at = Some(now);
    invoice.payer = Some(payer.clone());
    InvoiceStorage::update(env, &invoice);

    treasury.total_received = treasury.total_received.saturating_add(invoice.amount);
    treasury.pending_invoices = treasury.pending_invoices.saturating_sub(1);
    TreasuryStorage::update(env, &treasury);

    events::emit_invoice_paid(env, &invoice, payer);
    Ok(())
}

/// Cancel a Pending invoice. Recipient only.
pub fn cancel_invoice(env: &Env, invoice_id: &BytesN<32>) -> Result<(), AgentPayError> {
    let mut invoice = InvoiceStorage::get(env, invoice_id)?;
    invoice.recipient.require_auth();

    if invoice.status != InvoiceStatus::Pending {
        return Err(AgentPayError::NotPending);
    }

    invoice.status = InvoiceStatus::Cancelled;
    InvoiceStorage::update(env, &invoice);

    let mut treasury = TreasuryStorage::get(env, &invoice.recipient)?;
    treasury.pending_invoices = treasury.pending_invoices.saturating_sub(1);
    TreasuryStorage::update(env, &treasury);

    events::emit_invoice_cancelled(env, &invoice);
    Ok(())
}

/// Persist the Pending → Expired transition once it is observable.
/// Permissionless; returns whether the transition happened. Clients must
/// not rely on anyone calling this; the effective status already reads
/// Expired either way.
pub fn mark_invoice_expired(env: &Env, invoice_id: &BytesN<32>) -> Result<bool, AgentPayError> {
    let mut invoice = InvoiceStorage::get(env, invoice_id)?;
    if invoice.status != InvoiceStatus::Pending {
        return Err(AgentPayError::NotPending);
    }
    if env.ledger().timestamp() <= invoice.expires_at {
        return Ok(false);
    }

    invoice.status = InvoiceStatus::Expired;
    InvoiceStorage::update(env, &invoice);

    let mut treasury = TreasuryStorage::get(env, &invoice.recipient)?;
    treasury.pending_invoices = treasury.pending_invoices.saturating_sub(1);
    TreasuryStorage::update(env, &treasury);

    events::emit_invoice_expired(env, &invoice);
    Ok(true)
}
