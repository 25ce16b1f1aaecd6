use super::*;
use crate::escrow::EscrowStatus;
use crate::stream::StreamStatus;
use crate::test::{balance, bytes32, mint, setup_protocol, T0};
use soroban_sdk::{
    testutils::{Address as _, Ledger},
    Address, Env,
};

fn open_stream(
    env: &Env,
    total: i128,
    duration: u64,
) -> (AgentPayContractClient<'_>, Address, Address, Address, soroban_sdk::BytesN<32>) {
    let (client, _admin, currency) = setup_protocol(env);
    let sender = Address::generate(env);
    let recipient = Address::generate(env);
    mint(env, &currency, &sender, total * 2);

    let stream_id = bytes32(env, 0x51);
    client.create_stream(&sender, &stream_id, &recipient, &total, &T0, &(T0 + duration));
    (client, currency, sender, recipient, stream_id)
}

#[test]
fn test_create_stream_escrows_total() {
    let env = Env::default();
    let (client, currency, sender, recipient, stream_id) = open_stream(&env, 1_000, 100);

    let stream = client.get_stream(&stream_id);
    assert_eq!(stream.sender, sender);
    assert_eq!(stream.recipient, recipient);
    assert_eq!(stream.total_amount, 1_000);
    assert_eq!(stream.withdrawn_amount, 0);
    assert_eq!(stream.status, StreamStatus::Active);
    assert!(!stream.is_paused);

    let escrow = client.get_stream_escrow(&stream_id);
    assert_eq!(escrow.balance, 1_000);
    assert_eq!(balance(&env, &currency, &sender), 1_000);
}

#[test]
fn test_create_stream_validation() {
    let env = Env::default();
    let (client, _admin, currency) = setup_protocol(&env);
    let sender = Address::generate(&env);
    let recipient = Address::generate(&env);
    mint(&env, &currency, &sender, 10_000);

    assert_eq!(
        client.try_create_stream(&sender, &bytes32(&env, 1), &recipient, &0, &T0, &(T0 + 10)),
        Err(Ok(AgentPayError::BadAmount))
    );
    assert_eq!(
        client.try_create_stream(&sender, &bytes32(&env, 1), &recipient, &100, &(T0 + 10), &(T0 + 10)),
        Err(Ok(AgentPayError::InvalidSchedule))
    );
    assert_eq!(
        client.try_create_stream(&sender, &bytes32(&env, 1), &recipient, &100, &(T0 - 20), &(T0 - 10)),
        Err(Ok(AgentPayError::InvalidSchedule))
    );
    // Underfunded sender.
    assert_eq!(
        client.try_create_stream(&sender, &bytes32(&env, 1), &recipient, &20_000, &T0, &(T0 + 10)),
        Err(Ok(AgentPayError::Insufficient))
    );

    client.create_stream(&sender, &bytes32(&env, 1), &recipient, &100, &T0, &(T0 + 10));
    assert_eq!(
        client.try_create_stream(&sender, &bytes32(&env, 1), &recipient, &100, &T0, &(T0 + 10)),
        Err(Ok(AgentPayError::AlreadyExists))
    );
}

#[test]
fn test_withdraw_tracks_linear_vesting() {
    let env = Env::default();
    let (client, currency, _sender, recipient, stream_id) = open_stream(&env, 1_000, 100);

    // Nothing has vested at the start.
    assert_eq!(client.get_stream_available(&stream_id), 0);
    assert_eq!(
        client.try_withdraw_from_stream(&stream_id),
        Err(Ok(AgentPayError::Insufficient))
    );

    env.ledger().set_timestamp(T0 + 40);
    assert_eq!(client.get_stream_available(&stream_id), 400);
    assert_eq!(client.withdraw_from_stream(&stream_id), 400);
    assert_eq!(balance(&env, &currency, &recipient), 400);
    assert_eq!(client.get_stream_available(&stream_id), 0);

    env.ledger().set_timestamp(T0 + 70);
    assert_eq!(client.get_stream_available(&stream_id), 300);
    assert_eq!(client.withdraw_from_stream(&stream_id), 300);
    assert_eq!(balance(&env, &currency, &recipient), 700);
}

#[test]
fn test_final_withdrawal_absorbs_remainder() {
    let env = Env::default();
    // 1000 over 3 seconds: rate floors to 333.
    let (client, currency, _sender, recipient, stream_id) = open_stream(&env, 1_000, 3);

    env.ledger().set_timestamp(T0 + 2);
    assert_eq!(client.withdraw_from_stream(&stream_id), 666);

    env.ledger().set_timestamp(T0 + 3);
    assert_eq!(client.withdraw_from_stream(&stream_id), 334);
    assert_eq!(balance(&env, &currency, &recipient), 1_000);

    let stream = client.get_stream(&stream_id);
    assert_eq!(stream.status, StreamStatus::Completed);
    assert_eq!(stream.withdrawn_amount, 1_000);

    let escrow = client.get_stream_escrow(&stream_id);
    assert_eq!(escrow.balance, 0);
    assert_eq!(escrow.status, EscrowStatus::Released);

    // A completed stream has nothing left to withdraw.
    assert_eq!(
        client.try_withdraw_from_stream(&stream_id),
        Err(Ok(AgentPayError::StreamNotActive))
    );
}

#[test]
fn test_pause_freezes_availability() {
    let env = Env::default();
    let (client, _currency, _sender, _recipient, stream_id) = open_stream(&env, 1_000, 100);

    env.ledger().set_timestamp(T0 + 50);
    client.pause_stream(&stream_id);

    assert_eq!(client.get_stream_available(&stream_id), 0);
    assert_eq!(
        client.try_withdraw_from_stream(&stream_id),
        Err(Ok(AgentPayError::StreamPaused))
    );
    assert_eq!(
        client.try_pause_stream(&stream_id),
        Err(Ok(AgentPayError::StreamPaused))
    );
}

#[test]
fn test_resume_shifts_end_time() {
    let env = Env::default();
    let (client, _currency, _sender, _recipient, stream_id) = open_stream(&env, 1_000, 100);

    env.ledger().set_timestamp(T0 + 50);
    client.pause_stream(&stream_id);

    env.ledger().set_timestamp(T0 + 80);
    client.resume_stream(&stream_id);

    let stream = client.get_stream(&stream_id);
    assert!(!stream.is_paused);
    assert_eq!(stream.paused_at, None);
    assert_eq!(stream.end_time, T0 + 100 + 30);

    // Resuming an unpaused stream is rejected.
    assert_eq!(
        client.try_resume_stream(&stream_id),
        Err(Ok(AgentPayError::StreamNotPaused))
    );
}

#[test]
fn test_cancel_splits_funds_between_parties() {
    let env = Env::default();
    let (client, currency, sender, recipient, stream_id) = open_stream(&env, 1_000, 100);

    env.ledger().set_timestamp(T0 + 30);
    client.cancel_stream(&stream_id);

    // 300 had vested and stays claimable; 700 went back to the sender.
    assert_eq!(balance(&env, &currency, &sender), 1_000 + 700);
    let stream = client.get_stream(&stream_id);
    assert_eq!(stream.status, StreamStatus::Cancelled);
    assert_eq!(client.get_stream_escrow(&stream_id).balance, 300);

    // The recipient's follow-up withdrawal claims the snapshot.
    assert_eq!(client.withdraw_from_stream(&stream_id), 300);
    assert_eq!(balance(&env, &currency, &recipient), 300);
    let escrow = client.get_stream_escrow(&stream_id);
    assert_eq!(escrow.balance, 0);
    assert_eq!(escrow.status, EscrowStatus::Split);

    // And only once.
    assert_eq!(
        client.try_withdraw_from_stream(&stream_id),
        Err(Ok(AgentPayError::Insufficient))
    );
}

#[test]
fn test_cancel_while_paused_refunds_everything_unwithdrawn() {
    let env = Env::default();
    let (client, currency, sender, _recipient, stream_id) = open_stream(&env, 1_000, 100);

    env.ledger().set_timestamp(T0 + 40);
    assert_eq!(client.withdraw_from_stream(&stream_id), 400);

    env.ledger().set_timestamp(T0 + 60);
    client.pause_stream(&stream_id);
    // Paused availability is zero, so cancellation reclaims the rest.
    client.cancel_stream(&stream_id);

    assert_eq!(balance(&env, &currency, &sender), 1_000 + 600);
    let escrow = client.get_stream_escrow(&stream_id);
    assert_eq!(escrow.balance, 0);
    assert_eq!(escrow.status, EscrowStatus::Refunded);
    assert_eq!(
        client.try_withdraw_from_stream(&stream_id),
        Err(Ok(AgentPayError::Insufficient))
    );
}

#[test]
fn test_cancelled_stream_rejects_lifecycle_ops() {
    let env = Env::default();
    let (client, _currency, _sender, _recipient, stream_id) = open_stream(&env, 1_000, 100);

    env.ledger().set_timestamp(T0 + 10);
    client.cancel_stream(&stream_id);

    assert_eq!(
        client.try_cancel_stream(&stream_id),
        Err(Ok(AgentPayError::StreamNotActive))
    );
    assert_eq!(
        client.try_pause_stream(&stream_id),
        Err(Ok(AgentPayError::StreamNotActive))
    );
    assert_eq!(
        client.try_resume_stream(&stream_id),
        Err(Ok(AgentPayError::StreamNotActive))
    );
}

#[test]
fn test_recipient_index_tracks_streams() {
    let env = Env::default();
    let (client, _currency, sender, recipient, stream_id) = open_stream(&env, 1_000, 100);

    let second_id = bytes32(&env, 0x52);
    client.create_stream(&sender, &second_id, &recipient, &500, &T0, &(T0 + 50));

    let ids = client.get_streams_by_recipient(&recipient);
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&stream_id));
    assert!(ids.contains(&second_id));

    // Another recipient's index is independent.
    let other = Address::generate(&env);
    assert_eq!(client.get_streams_by_recipient(&other).len(), 0);

    // The index survives lifecycle transitions.
    env.ledger().set_timestamp(T0 + 10);
    client.cancel_stream(&stream_id);
    let ids = client.get_streams_by_recipient(&recipient);
    assert_eq!(ids.len(), 2);
}

#[test]
fn test_withdraw_after_resume_keeps_totals_exact() {
    let env = Env::default();
    let (client, currency, _sender, recipient, stream_id) = open_stream(&env, 1_000, 100);

    env.ledger().set_timestamp(T0 + 50);
    assert_eq!(client.withdraw_from_stream(&stream_id), 500);

    client.pause_stream(&stream_id);
    env.ledger().set_timestamp(T0 + 70);
    client.resume_stream(&stream_id);

    // End shifted to T0 + 120; everything is claimable at the new end.
    env.ledger().set_timestamp(T0 + 120);
    assert_eq!(client.withdraw_from_stream(&stream_id), 500);
    assert_eq!(balance(&env, &currency, &recipient), 1_000);
    assert_eq!(
        client.get_stream(&stream_id).status,
        StreamStatus::Completed
    );
}
