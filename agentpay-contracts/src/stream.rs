//! Linear-rate payment streams with pause/resume/cancel and pull-based
//! withdrawal.
//!
//! The full stream amount is escrowed at creation. Value vests at
//! `total / (end − start)` base units per second (integer division); the
//! final withdrawal absorbs the division remainder so the recipient can
//! always reach exactly `total`. Pausing freezes availability; resuming
//! shifts `end_time` by the pause duration.

use soroban_sdk::{contracttype, symbol_short, Address, BytesN, Env, Symbol, Vec};

use crate::address;
use crate::errors::AgentPayError;
use crate::escrow::{EscrowStatus, EscrowVault};
use crate::events;
use crate::store::{AccountStore, Record};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StreamStatus {
    Active,
    Cancelled,
    Completed,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PaymentStream {
    pub id: BytesN<32>,
    pub bump: u32,
    pub sender: Address,
    pub recipient: Address,
    pub total_amount: i128,
    pub start_time: u64,
    pub end_time: u64,
    pub withdrawn_amount: i128,
    pub is_paused: bool,
    pub paused_at: Option<u64>,
    pub status: StreamStatus,
}

impl PaymentStream {
    /// Base units the recipient could withdraw at `now`.
    ///
    /// Zero while paused or once the stream left Active; the escrow balance
    /// of a cancelled stream tracks the snapshot taken at cancellation.
    pub fn available(&self, now: u64) -> i128 {
        if self.status != StreamStatus::Active || self.is_paused {
            return 0;
        }
        if now < self.start_time {
            return 0;
        }
        let streamed = if now >= self.end_time {
            self.total_amount
        } else {
            let rate = self.total_amount / ((self.end_time - self.start_time) as i128);
            rate * ((now - self.start_time) as i128)
        };
        let available = streamed - self.withdrawn_amount;
        if available < 0 {
            0
        } else {
            available
        }
    }
}

const RECIPIENT_INDEX: Symbol = symbol_short!("str_rcp");

pub struct StreamStorage;

impl StreamStorage {
    pub fn address(env: &Env, id: &BytesN<32>) -> (BytesN<32>, u32) {
        address::derive(env, address::STREAM_TAG, &[address::seed_from_id(env, id)])
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

    pub fn get(env: &Env, id: &BytesN<32>) -> Result<PaymentStream, AgentPayError> {
        let (addr, _) = Self::address(env, id);
        match AccountStore::load(env, &addr)? {
            Record::Stream(stream) => Ok(stream),
            _ => Err(AgentPayError::WrongClass),
        }
    }

    pub fn update(env: &Env, stream: &PaymentStream) {
        let (addr, _) = Self::address(env, &stream.id);
        AccountStore::write(env, &addr, &Record::Stream(stream.clone()));
    }
}

/// Open a stream and escrow the full amount from the sender.
pub fn create_stream(
    env: &Env,
    sender: &Address,
    stream_id: &BytesN<32>,
    recipient: &Address,
    total_amount: i128,
    start_time: u64,
    end_time: u64,
) -> Result<BytesN<32>, AgentPayError> {
    sender.require_auth();

    if total_amount <= 0 {
        return Err(AgentPayError::BadAmount);
    }
    let now = env.ledger().timestamp();
    if end_time <= start_time || end_time <= now {
        return Err(AgentPayError::InvalidSchedule);
    }

    let (addr, bump) = StreamStorage::address(env, stream_id);
    let stream = PaymentStream {
        id: stream_id.clone(),
        bump,
        sender: sender.clone(),
        recipient: recipient.clone(),
        total_amount,
        start_time,
        end_time,
        withdrawn_amount: 0,
        is_paused: false,
        paused_at: None,
        status: StreamStatus::Active,
    };
    AccountStore::create(env, &addr, &Record::Stream(stream.clone()))?;
    StreamStorage::add_to_recipient_index(env, recipient, stream_id);

    EscrowVault::open(
        env,
        address::STREAM_ESCROW_TAG,
        stream_id,
        sender,
        recipient,
        total_amount,
    )?;

    events::emit_stream_created(env, &stream);
    Ok(addr)
}

/// Withdraw everything currently available. Recipient only.
pub fn withdraw_from_stream(
    env: &Env,
    stream_id: &BytesN<32>,
) -> Result<i128, AgentPayError> {
    let mut stream = StreamStorage::get(env, stream_id)?;
    stream.recipient.require_auth();

    let now = env.ledger().timestamp();
    let amount = match stream.status {
        StreamStatus::Active => {
            if stream.is_paused {
                return Err(AgentPayError::StreamPaused);
            }
            stream.available(now)
        }
        // A cancelled stream keeps the snapshot taken at cancellation in
        // its escrow; one follow-up withdrawal claims it.
        StreamStatus::Cancelled => {
            let escrow = EscrowVault::get(env, address::STREAM_ESCROW_TAG, stream_id)?;
            if escrow.status == EscrowStatus::Held {
                escrow.balance
            } else {
                0
            }
        }
        StreamStatus::Completed => return Err(AgentPayError::StreamNotActive),
    };
    if amount <= 0 {
        return Err(AgentPayError::Insufficient);
    }

    EscrowVault::withdraw_partial(
        env,
        address::STREAM_ESCROW_TAG,
        stream_id,
        &stream.recipient,
        amount,
    )?;
    stream.withdrawn_amount += amount;

    match stream.status {
        StreamStatus::Active if stream.withdrawn_amount >= stream.total_amount => {
            stream.status = StreamStatus::Completed;
            EscrowVault::finalize(
                env,
                address::STREAM_ESCROW_TAG,
                stream_id,
                EscrowStatus::Released,
            )?;
            StreamStorage::update(env, &stream);
            events::emit_stream_withdrawn(env, &stream, amount);
            events::emit_stream_completed(env, &stream);
        }
        StreamStatus::Cancelled => {
            EscrowVault::finalize(
                env,
                address::STREAM_ESCROW_TAG,
                stream_id,
                EscrowStatus::Split,
            )?;
            StreamStorage::update(env, &stream);
            events::emit_stream_withdrawn(env, &stream, amount);
        }
        _ => {
            StreamStorage::update(env, &stream);
            events::emit_stream_withdrawn(env, &stream, amount);
        }
    }
    Ok(amount)
}

/// Freeze availability. Sender only.
pub fn pause_stream(env: &Env, stream_id: &BytesN<32>) -> Result<(), AgentPayError> {
    let mut stream = StreamStorage::get(env, stream_id)?;
    stream.sender.require_auth();

    if stream.status != StreamStatus::Active {
        return Err(AgentPayError::StreamNotActive);
    }
    if stream.is_paused {
        return Err(AgentPayError::StreamPaused);
    }
    stream.is_paused = true;
    stream.paused_at = Some(env.ledger().timestamp());
    StreamStorage::update(env, &stream);

    events::emit_stream_paused(env, &stream);
    Ok(())
}

/// Unfreeze, extending `end_time` by the pause duration. Sender only.
pub fn resume_stream(env: &Env, stream_id: &BytesN<32>) -> Result<(), AgentPayError> {
    let mut stream = StreamStorage::get(env, stream_id)?;
    stream.sender.require_auth();

    if stream.status != StreamStatus::Active {
        return Err(AgentPayError::StreamNotActive);
    }
    if !stream.is_paused {
        return Err(AgentPayError::StreamNotPaused);
    }
    let paused_at = stream.paused_at.unwrap_or(stream.start_time);
    let now = env.ledger().timestamp();
    stream.end_time += now.saturating_sub(paused_at);
    stream.is_paused = false;
    stream.paused_at = None;
    StreamStorage::update(env, &stream);

    events::emit_stream_resumed(env, &stream);
    Ok(())
}

/// Stop the stream: refund the unvested remainder to the sender, leaving
/// whatever was available at cancellation claimable by the recipient.
pub fn cancel_stream(env: &Env, stream_id: &BytesN<32>) -> Result<(), AgentPayError> {
    let mut stream = StreamStorage::get(env, stream_id)?;
    stream.sender.require_auth();

    if stream.status != StreamStatus::Active {
        return Err(AgentPayError::StreamNotActive);
    }

    let now = env.ledger().timestamp();
    let claimable = stream.available(now);
    let refund = stream.total_amount - stream.withdrawn_amount - claimable;

    if refund > 0 {
        EscrowVault::withdraw_partial(
            env,
            address::STREAM_ESCROW_TAG,
            stream_id,
            &stream.sender,
            refund,
        )?;
    }
    if claimable == 0 {
        EscrowVault::finalize(
            env,
            address::STREAM_ESCROW_TAG,
            stream_id,
            EscrowStatus::Refunded,
        )?;
    }

    stream.status = StreamStatus::Cancelled;
    StreamStorage::update(env, &stream);

    events::emit_stream_cancelled(env, &stream, refund, claimable);
    Ok(())
}
