//! Dispute lifecycle for service requests.
//!
//! Either party may open a dispute inside the window measured from the
//! request's creation. Resolution authority: the request's designated
//! arbiter when one was set, otherwise the provider may concede value to
//! itself only through `PayProvider`/`Split` and the requester may only
//! reclaim via `RefundRequester`.

use soroban_sdk::{contracttype, Address, BytesN, Env};

use crate::address;
use crate::errors::AgentPayError;
use crate::escrow::{EscrowStatus, EscrowVault};
use crate::events;
use crate::registry::RegistryStorage;
use crate::request::{RequestStatus, RequestStorage, ServiceRequest};
use crate::store::{AccountStore, Record};
use crate::treasury::TreasuryStorage;

pub const DISPUTE_WINDOW_SECONDS: u64 = 86_400;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Resolution {
    Unresolved,
    RefundRequester,
    PayProvider,
    /// Provider share as a ratio `num/den`, strictly between 0 and 1.
    /// Integer truncation favors the requester.
    Split(u64, u64),
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Dispute {
    pub request_id: BytesN<32>,
    pub bump: u32,
    pub initiator: Address,
    pub opened_at: u64,
    pub resolution: Resolution,
    pub resolved_at: Option<u64>,
    pub window_seconds: u64,
}

pub struct DisputeStorage;

impl DisputeStorage {
    pub fn address(env: &Env, request_id: &BytesN<32>) -> (BytesN<32>, u32) {
        address::derive(
            env,
            address::DISPUTE_TAG,
            &[address::seed_from_id(env, request_id)],
        )
    }

    pub fn get(env: &Env, request_id: &BytesN<32>) -> Result<Dispute, AgentPayError> {
        let (addr, _) = Self::address(env, request_id);
        match AccountStore::load(env, &addr) {
            Ok(Record::Dispute(dispute)) => Ok(dispute),
            Ok(_) => Err(AgentPayError::WrongClass),
            Err(AgentPayError::NotFound) => Err(AgentPayError::NotDisputed),
            Err(e) => Err(e),
        }
    }

    pub fn update(env: &Env, dispute: &Dispute) {
        let (addr, _) = Self::address(env, &dispute.request_id);
        AccountStore::write(env, &addr, &Record::Dispute(dispute.clone()));
    }
}

/// Open a dispute on a live request. Party-only, window-bounded.
pub fn initiate_dispute(
    env: &Env,
    initiator: &Address,
    request_id: &BytesN<32>,
) -> Result<BytesN<32>, AgentPayError> {
    initiator.require_auth();

    let mut request = RequestStorage::get(env, request_id)?;
    if *initiator != request.requester && *initiator != request.provider {
        return Err(AgentPayError::NotParty);
    }

    match request.status {
        RequestStatus::Pending | RequestStatus::InProgress => {}
        RequestStatus::Disputed => return Err(AgentPayError::AlreadyDisputed),
        RequestStatus::Completed | RequestStatus::Refunded => {
            return Err(AgentPayError::AlreadyTerminal)
        }
    }

    // The window runs from request creation; completion or the dispute
    // itself never extend it.
    let now = env.ledger().timestamp();
    if now - request.created_at > DISPUTE_WINDOW_SECONDS {
        return Err(AgentPayError::WindowExpired);
    }

    let (addr, bump) = DisputeStorage::address(env, request_id);
    let dispute = Dispute {
        request_id: request_id.clone(),
        bump,
        initiator: initiator.clone(),
        opened_at: now,
        resolution: Resolution::Unresolved,
        resolved_at: None,
        window_seconds: DISPUTE_WINDOW_SECONDS,
    };
    AccountStore::create(env, &addr, &Record::Dispute(dispute.clone()))
        .map_err(|_| AgentPayError::AlreadyDisputed)?;

    request.status = RequestStatus::Disputed;
    RequestStorage::update(env, &request);

    events::emit_dispute_initiated(env, &dispute);
    Ok(addr)
}

fn check_authority(
    request: &ServiceRequest,
    resolver: &Address,
    resolution: &Resolution,
) -> Result<(), AgentPayError> {
    if let Some(arbiter) = &request.arbiter {
        if resolver != arbiter {
            return Err(AgentPayError::NotArbiter);
        }
        return Ok(());
    }
    let allowed = match resolution {
        Resolution::RefundRequester => *resolver == request.requester,
        Resolution::PayProvider | Resolution::Split(_, _) => *resolver == request.provider,
        Resolution::Unresolved => false,
    };
    if !allowed {
        return Err(AgentPayError::NotArbiter);
    }
    Ok(())
}

/// Provider payout for a split verdict: floor(amount · num / den), so the
/// requester always receives the exact remainder.
pub(crate) fn provider_share(amount: i128, num: u64, den: u64) -> i128 {
    amount * (num as i128) / (den as i128)
}

/// Resolve an open dispute and drain the escrow accordingly.
pub fn resolve_dispute(
    env: &Env,
    resolver: &Address,
    request_id: &BytesN<32>,
    resolution: Resolution,
) -> Result<(), AgentPayError> {
    resolver.require_auth();

    let mut dispute = DisputeStorage::get(env, request_id)?;
    if dispute.resolution != Resolution::Unresolved {
        return Err(AgentPayError::AlreadyTerminal);
    }

    let mut request = RequestStorage::get(env, request_id)?;
    if request.status != RequestStatus::Disputed {
        return Err(AgentPayError::NotDisputed);
    }

    check_authority(&request, resolver, &resolution)?;

    let now = env.ledger().timestamp();
    match &resolution {
        Resolution::Unresolved => return Err(AgentPayError::BadSerialization),
        Resolution::RefundRequester => {
            EscrowVault::drain(
                env,
                address::REQUEST_ESCROW_TAG,
                request_id,
                &request.requester,
                EscrowStatus::Refunded,
            )?;
            request.status = RequestStatus::Refunded;
        }
        Resolution::PayProvider => {
            let released = EscrowVault::drain(
                env,
                address::REQUEST_ESCROW_TAG,
                request_id,
                &request.provider,
                EscrowStatus::Released,
            )?;
            credit_provider(env, &request, released, now)?;
            request.status = RequestStatus::Completed;
            request.completed_at = Some(now);
        }
        Resolution::Split(num, den) => {
            if *num == 0 || *den == 0 || num >= den {
                return Err(AgentPayError::BadAmount);
            }
            let share = provider_share(request.amount, *num, *den);
            let (to_provider, _to_requester) =
                EscrowVault::drain_split(env, address::REQUEST_ESCROW_TAG, request_id, share)?;
            credit_provider(env, &request, to_provider, now)?;
            request.status = RequestStatus::Completed;
            request.completed_at = Some(now);
        }
    }
    RequestStorage::update(env, &request);

    dispute.resolution = resolution;
    dispute.resolved_at = Some(now);
    DisputeStorage::update(env, &dispute);

    events::emit_dispute_resolved(env, &dispute);
    Ok(())
}

fn credit_provider(
    env: &Env,
    request: &ServiceRequest,
    amount: i128,
    now: u64,
) -> Result<(), AgentPayError> {
    let mut treasury = TreasuryStorage::get(env, &request.provider)?;
    treasury.total_received = treasury.total_received.saturating_add(amount);
    TreasuryStorage::update(env, &treasury);

    let mut profile = RegistryStorage::get(env, &request.provider)?;
    profile.total_requests += 1;
    profile.total_earnings = profile.total_earnings.saturating_add(amount);
    profile.last_active_at = now;
    RegistryStorage::update(env, &profile);
    Ok(())
}
