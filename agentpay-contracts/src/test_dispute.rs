use super::*;
use crate::dispute::{Resolution, DISPUTE_WINDOW_SECONDS};
use crate::escrow::EscrowStatus;
use crate::request::RequestStatus;
use crate::test::{balance, bytes32, mint, register_provider, setup_protocol, T0};
use soroban_sdk::{
    testutils::{Address as _, Ledger},
    Address, Env, String,
};

fn open_request(
    env: &Env,
    arbiter: Option<Address>,
) -> (AgentPayContractClient<'_>, Address, Address, Address, soroban_sdk::BytesN<32>) {
    let (client, _admin, currency) = setup_protocol(env);
    let provider = Address::generate(env);
    let requester = Address::generate(env);
    register_provider(env, &client, &provider, "sentiment", 100);
    mint(env, &currency, &requester, 10_000);

    let request_id = bytes32(env, 0xD0);
    client.request_service(
        &requester,
        &request_id,
        &provider,
        &String::from_str(env, "sentiment"),
        &100,
        &arbiter,
    );
    (client, currency, provider, requester, request_id)
}

#[test]
fn test_dispute_then_refund() {
    let env = Env::default();
    let (client, currency, provider, requester, request_id) = open_request(&env, None);

    client.initiate_dispute(&requester, &request_id);
    assert_eq!(
        client.get_request(&request_id).status,
        RequestStatus::Disputed
    );
    // Escrow keeps the full amount while disputed.
    assert_eq!(client.get_request_escrow(&request_id).balance, 100);

    // Without a designated arbiter the requester may concede a refund.
    client.resolve_dispute(&requester, &request_id, &Resolution::RefundRequester);

    let request = client.get_request(&request_id);
    assert_eq!(request.status, RequestStatus::Refunded);

    let escrow = client.get_request_escrow(&request_id);
    assert_eq!(escrow.balance, 0);
    assert_eq!(escrow.status, EscrowStatus::Refunded);

    // Requester is made whole; provider counters untouched.
    assert_eq!(balance(&env, &currency, &requester), 10_000);
    assert_eq!(balance(&env, &currency, &provider), 0);
    assert_eq!(client.get_agent(&provider).total_requests, 0);
    assert_eq!(client.get_treasury(&provider).total_received, 0);

    let dispute = client.get_dispute(&request_id);
    assert_eq!(dispute.resolution, Resolution::RefundRequester);
    assert_eq!(dispute.resolved_at, Some(T0));
}

#[test]
fn test_dispute_window_expired() {
    let env = Env::default();
    let (client, _currency, _provider, requester, request_id) = open_request(&env, None);

    env.ledger().set_timestamp(T0 + DISPUTE_WINDOW_SECONDS + 1);
    assert_eq!(
        client.try_initiate_dispute(&requester, &request_id),
        Err(Ok(AgentPayError::WindowExpired))
    );
    assert_eq!(
        client.get_request(&request_id).status,
        RequestStatus::Pending
    );
}

#[test]
fn test_dispute_at_window_boundary_is_allowed() {
    let env = Env::default();
    let (client, _currency, _provider, requester, request_id) = open_request(&env, None);

    env.ledger().set_timestamp(T0 + DISPUTE_WINDOW_SECONDS);
    client.initiate_dispute(&requester, &request_id);
    assert_eq!(
        client.get_request(&request_id).status,
        RequestStatus::Disputed
    );
}

#[test]
fn test_only_parties_may_dispute() {
    let env = Env::default();
    let (client, _currency, provider, _requester, request_id) = open_request(&env, None);

    let outsider = Address::generate(&env);
    assert_eq!(
        client.try_initiate_dispute(&outsider, &request_id),
        Err(Ok(AgentPayError::NotParty))
    );
    // The provider is a party too.
    client.initiate_dispute(&provider, &request_id);
}

#[test]
fn test_no_double_dispute() {
    let env = Env::default();
    let (client, _currency, _provider, requester, request_id) = open_request(&env, None);

    client.initiate_dispute(&requester, &request_id);
    assert_eq!(
        client.try_initiate_dispute(&requester, &request_id),
        Err(Ok(AgentPayError::AlreadyDisputed))
    );
}

#[test]
fn test_completed_request_cannot_be_disputed() {
    let env = Env::default();
    let (client, _currency, _provider, requester, request_id) = open_request(&env, None);

    client.complete_service(&request_id, &bytes32(&env, 0xAA));
    assert_eq!(
        client.try_initiate_dispute(&requester, &request_id),
        Err(Ok(AgentPayError::AlreadyTerminal))
    );
}

#[test]
fn test_fallback_authority_roles() {
    let env = Env::default();
    let (client, _currency, provider, requester, request_id) = open_request(&env, None);
    client.initiate_dispute(&requester, &request_id);

    // Without an arbiter each party can only concede, never award itself.
    assert_eq!(
        client.try_resolve_dispute(&requester, &request_id, &Resolution::PayProvider),
        Err(Ok(AgentPayError::NotArbiter))
    );
    assert_eq!(
        client.try_resolve_dispute(&provider, &request_id, &Resolution::RefundRequester),
        Err(Ok(AgentPayError::NotArbiter))
    );
    assert_eq!(
        client.try_resolve_dispute(&requester, &request_id, &Resolution::Split(1, 2)),
        Err(Ok(AgentPayError::NotArbiter))
    );

    // The provider conceding payment to itself is how delivery under
    // dispute gets honored.
    client.resolve_dispute(&provider, &request_id, &Resolution::PayProvider);
    assert_eq!(
        client.get_request(&request_id).status,
        RequestStatus::Completed
    );
    assert_eq!(client.get_treasury(&provider).total_received, 100);
    assert_eq!(client.get_agent(&provider).total_requests, 1);
}

#[test]
fn test_designated_arbiter_has_sole_authority() {
    let env = Env::default();
    let arbiter = Address::generate(&env);
    let (client, currency, provider, requester, request_id) =
        open_request(&env, Some(arbiter.clone()));

    client.initiate_dispute(&provider, &request_id);

    // Parties lose their fallback powers once an arbiter is designated.
    assert_eq!(
        client.try_resolve_dispute(&provider, &request_id, &Resolution::PayProvider),
        Err(Ok(AgentPayError::NotArbiter))
    );
    assert_eq!(
        client.try_resolve_dispute(&requester, &request_id, &Resolution::RefundRequester),
        Err(Ok(AgentPayError::NotArbiter))
    );

    // Split 1/3 of 100: provider 33, requester 67.
    client.resolve_dispute(&arbiter, &request_id, &Resolution::Split(1, 3));

    assert_eq!(balance(&env, &currency, &provider), 33);
    assert_eq!(balance(&env, &currency, &requester), 9_900 + 67);

    let escrow = client.get_request_escrow(&request_id);
    assert_eq!(escrow.balance, 0);
    assert_eq!(escrow.status, EscrowStatus::Split);

    let request = client.get_request(&request_id);
    assert_eq!(request.status, RequestStatus::Completed);

    // Provider side is credited with its share only.
    assert_eq!(client.get_treasury(&provider).total_received, 33);
    assert_eq!(client.get_agent(&provider).total_earnings, 33);
}

#[test]
fn test_split_ratio_bounds() {
    let env = Env::default();
    let (client, _currency, _provider, requester, request_id) = open_request(&env, None);
    client.initiate_dispute(&requester, &request_id);

    let provider = client.get_request(&request_id).provider;
    for (num, den) in [(0u64, 3u64), (3, 3), (4, 3), (1, 0)] {
        assert_eq!(
            client.try_resolve_dispute(&provider, &request_id, &Resolution::Split(num, den)),
            Err(Ok(AgentPayError::BadAmount)),
            "ratio {num}/{den}"
        );
    }
}

#[test]
fn test_resolution_requires_open_dispute() {
    let env = Env::default();
    let (client, _currency, provider, requester, request_id) = open_request(&env, None);

    // No dispute yet.
    assert_eq!(
        client.try_resolve_dispute(&provider, &request_id, &Resolution::PayProvider),
        Err(Ok(AgentPayError::NotDisputed))
    );

    client.initiate_dispute(&requester, &request_id);
    client.resolve_dispute(&requester, &request_id, &Resolution::RefundRequester);

    // Resolving twice is rejected and the verdict stands.
    assert_eq!(
        client.try_resolve_dispute(&provider, &request_id, &Resolution::PayProvider),
        Err(Ok(AgentPayError::AlreadyTerminal))
    );
    assert_eq!(
        client.get_dispute(&request_id).resolution,
        Resolution::RefundRequester
    );
}

#[test]
fn test_refunded_request_cannot_complete() {
    let env = Env::default();
    let (client, _currency, _provider, requester, request_id) = open_request(&env, None);

    client.initiate_dispute(&requester, &request_id);
    client.resolve_dispute(&requester, &request_id, &Resolution::RefundRequester);

    assert_eq!(
        client.try_complete_service(&request_id, &bytes32(&env, 0xAB)),
        Err(Ok(AgentPayError::AlreadyTerminal))
    );
}

#[test]
fn test_window_uses_request_creation_time() {
    let env = Env::default();
    let (client, _currency, provider, requester, request_id) = open_request(&env, None);

    // Move the request to InProgress late in the window; the clock still
    // runs from creation.
    env.ledger().set_timestamp(T0 + DISPUTE_WINDOW_SECONDS - 10);
    client.start_service(&request_id);

    env.ledger().set_timestamp(T0 + DISPUTE_WINDOW_SECONDS + 1);
    assert_eq!(
        client.try_initiate_dispute(&requester, &request_id),
        Err(Ok(AgentPayError::WindowExpired))
    );
    let _ = provider;
}
