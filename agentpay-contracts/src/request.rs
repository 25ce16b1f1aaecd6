//! Service requests: request → escrow → deliver, with a dispute exit.
//!
//! A request is jointly governed: the requester funds the escrow and may
//! dispute, the provider delivers and collects, and a resolved dispute can
//! name either side. The escrow record always holds exactly the request
//! amount until the request reaches Completed or Refunded.

use soroban_sdk::{contracttype, symbol_short, Address, BytesN, Env, String, Symbol, Vec};

use crate::address;
use crate::errors::AgentPayError;
use crate::escrow::{EscrowStatus, EscrowVault};
use crate::events;
use crate::registry::RegistryStorage;
use crate::store::{AccountStore, Record};
use crate::treasury::TreasuryStorage;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RequestStatus {
    Pending,
    InProgress,
    Completed,
    Disputed,
    Refunded,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServiceRequest {
    pub id: BytesN<32>,
    pub bump: u32,
    pub requester: Address,
    pub provider: Address,
    /// Designated dispute authority, fixed at creation. When unset, the
    /// role rules in `dispute::resolve_dispute` apply.
    pub arbiter: Option<Address>,
    pub capability: String,
    pub amount: i128,
    pub status: RequestStatus,
    pub created_at: u64,
    pub completed_at: Option<u64>,
    pub result_hash: Option<BytesN<32>>,
}

const PROVIDER_INDEX: Symbol = symbol_short!("req_prv");

pub struct RequestStorage;

impl RequestStorage {
    pub fn address(env: &Env, id: &BytesN<32>) -> (BytesN<32>, u32) {
        address::derive(env, address::REQUEST_TAG, &[address::seed_from_id(env, id)])
    }

    pub fn get(env: &Env, id: &BytesN<32>) -> Result<ServiceRequest, AgentPayError> {
        let (addr, _) = Self::address(env, id);
        match AccountStore::load(env, &addr)? {
            Record::Request(request) => Ok(request),
            _ => Err(AgentPayError::WrongClass),
        }
    }

    pub fn update(env: &Env, request: &ServiceRequest) {
        let (addr, _) = Self::address(env, &request.id);
        AccountStore::write(env, &addr, &Record::Request(request.clone()));
    }

    pub fn ids_by_provider(env: &Env, provider: &Address) -> Vec<BytesN<32>> {
        env.storage()
            .persistent()
            .get(&(PROVIDER_INDEX, provider.clone()))
            .unwrap_or_else(|| Vec::new(env))
    }

    fn add_to_provider_index(env: &Env, provider: &Address, id: &BytesN<32>) {
        let mut ids = Self::ids_by_provider(env, provider);
        if !ids.contains(id) {
            ids.push_back(id.clone());
            env.storage()
                .persistent()
                .set(&(PROVIDER_INDEX, provider.clone()), &ids);
        }
    }
}

/// Request a service from a registered provider, escrowing the full amount.
#[allow(clippy::too_many_arguments)]
pub fn request_service(
    env: &Env,
    requester: &Address,
    request_id: &BytesN<32>,
    provider: &Address,
    capability: String,
    amount: i128,
    arbiter: Option<Address>,
) -> Result<BytesN<32>, AgentPayError> {
    requester.require_auth();

    let profile = RegistryStorage::get(env, provider)?;
    if !profile.is_active {
        return Err(AgentPayError::ProviderInactive);
    }
    if !profile.capabilities.contains(&capability) {
        return Err(AgentPayError::UnknownCapability);
    }
    if amount < profile.base_price {
        return Err(AgentPayError::PriceBelowMinimum);
    }
    if amount <= 0 {
        return Err(AgentPayError::BadAmount);
    }

    let (addr, bump) = RequestStorage::address(env, request_id);
    let request = ServiceRequest {
        id: request_id.clone(),
        bump,
        requester: requester.clone(),
        provider: provider.clone(),
        arbiter,
        capability,
        amount,
        status: RequestStatus::Pending,
        created_at: env.ledger().timestamp(),
        completed_at: None,
        result_hash: None,
    };
    AccountStore::create(env, &addr, &Record::Request(request.clone()))?;

    EscrowVault::open(
        env,
        address::REQUEST_ESCROW_TAG,
        request_id,
        requester,
        provider,
        amount,
    )?;

    RequestStorage::add_to_provider_index(env, provider, request_id);

    events::emit_service_requested(env, &request);
    Ok(addr)
}

/// Provider acknowledges work has begun: Pending → InProgress.
pub fn start_service(env: &Env, request_id: &BytesN<32>) -> Result<(), AgentPayError> {
    let mut request = RequestStorage::get(env, request_id)?;
    request.provider.require_auth();

    if request.status != RequestStatus::Pending {
        return Err(AgentPayError::NotPending);
    }
    request.status = RequestStatus::InProgress;
    RequestStorage::update(env, &request);

    if let Ok(mut profile) = RegistryStorage::get(env, &request.provider) {
        profile.last_active_at = env.ledger().timestamp();
        RegistryStorage::update(env, &profile);
    }

    events::emit_service_started(env, &request);
    Ok(())
}

/// Deliver: drain the escrow to the provider and credit treasury + profile.
pub fn complete_service(
    env: &Env,
    request_id: &BytesN<32>,
    result_hash: &BytesN<32>,
) -> Result<(), AgentPayError> {
    let mut request = RequestStorage::get(env, request_id)?;
    request.provider.require_auth();

    match request.status {
        RequestStatus::Pending | RequestStatus::InProgress => {}
        RequestStatus::Disputed => return Err(AgentPayError::AlreadyDisputed),
        RequestStatus::Completed | RequestStatus::Refunded => {
            return Err(AgentPayError::AlreadyTerminal)
        }
    }

    let mut profile = RegistryStorage::get(env, &request.provider)?;
    let (expected_treasury, _) = TreasuryStorage::address(env, &request.provider);
    if profile.treasury != expected_treasury {
        return Err(AgentPayError::AddressMismatch);
    }
    let mut treasury = TreasuryStorage::get(env, &request.provider)?;

    let released = EscrowVault::drain(
        env,
        address::REQUEST_ESCROW_TAG,
        request_id,
        &request.provider,
        EscrowStatus::Released,
    )?;

    let now = env.ledger().timestamp();
    request.status = RequestStatus::Completed;
    request.completed_at = Some(now);
    request.result_hash = Some(result_hash.clone());
    RequestStorage::update(env, &request);

    treasury.total_received = treasury.total_received.saturating_add(released);
    TreasuryStorage::update(env, &treasury);

    profile.total_requests += 1;
    profile.total_earnings = profile.total_earnings.saturating_add(released);
    profile.last_active_at = now;
    RegistryStorage::update(env, &profile);

    events::emit_service_completed(env, &request);
    Ok(())
}
