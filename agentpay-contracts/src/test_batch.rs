use super::*;
use crate::test::{balance, bytes32, mint, setup_protocol, T0};
use soroban_sdk::{testutils::Address as _, Address, Env, String, Vec};

/// Three paid invoices of 100/200/300 for `recipient`, ids 0x01..0x03.
fn paid_invoices(
    env: &Env,
    client: &AgentPayContractClient,
    currency: &Address,
    recipient: &Address,
    payer: &Address,
) -> Vec<soroban_sdk::BytesN<32>> {
    client.initialize_treasury(recipient);
    mint(env, currency, payer, 1_000);

    let mut ids = Vec::new(env);
    for (i, amount) in [100i128, 200, 300].iter().enumerate() {
        let id = bytes32(env, (i + 1) as u8);
        client.create_invoice(
            recipient,
            &id,
            amount,
            &String::from_str(env, "metered usage"),
            &(T0 + 3600),
        );
        client.pay_invoice(payer, &id);
        ids.push_back(id);
    }
    ids
}

#[test]
fn test_batch_of_three() {
    let env = Env::default();
    let (client, _admin, currency) = setup_protocol(&env);

    let alice = Address::generate(&env);
    let bob = Address::generate(&env);
    let ids = paid_invoices(&env, &client, &currency, &alice, &bob);

    let batch_id = bytes32(&env, 0xB1);
    client.settle_batch(&bob, &batch_id, &alice, &ids, &600);

    let batch = client.get_batch(&batch_id);
    assert_eq!(batch.total_amount, 600);
    assert_eq!(batch.invoice_ids.len(), 3);
    assert_eq!(batch.settler, bob);
    assert_eq!(batch.recipient, alice);
    assert_eq!(batch.settled_at, T0);

    let treasury = client.get_treasury(&alice);
    assert_eq!(treasury.total_settled, 600);
    assert!(treasury.total_settled <= treasury.total_received);

    // Settlement moved no value; payment already did.
    assert_eq!(balance(&env, &currency, &alice), 600);
    assert_eq!(balance(&env, &currency, &bob), 400);

    // Each invoice is traceable to its batch.
    for id in ids.iter() {
        assert_eq!(client.get_settling_batch(&id), Some(batch_id.clone()));
    }
}

#[test]
fn test_batch_id_is_unique() {
    let env = Env::default();
    let (client, _admin, currency) = setup_protocol(&env);

    let alice = Address::generate(&env);
    let bob = Address::generate(&env);
    let ids = paid_invoices(&env, &client, &currency, &alice, &bob);

    let batch_id = bytes32(&env, 0xB2);
    client.settle_batch(&bob, &batch_id, &alice, &ids, &600);
    assert_eq!(
        client.try_settle_batch(&bob, &batch_id, &alice, &ids, &600),
        Err(Ok(AgentPayError::AlreadyExists))
    );
}

#[test]
fn test_batch_sum_mismatch() {
    let env = Env::default();
    let (client, _admin, currency) = setup_protocol(&env);

    let alice = Address::generate(&env);
    let bob = Address::generate(&env);
    let ids = paid_invoices(&env, &client, &currency, &alice, &bob);

    assert_eq!(
        client.try_settle_batch(&bob, &bytes32(&env, 0xB3), &alice, &ids, &599),
        Err(Ok(AgentPayError::SumMismatch))
    );
    // Nothing was reconciled by the failed attempt.
    assert_eq!(client.get_treasury(&alice).total_settled, 0);
    for id in ids.iter() {
        assert_eq!(client.get_settling_batch(&id), None);
    }
}

#[test]
fn test_batch_size_bounds() {
    let env = Env::default();
    let (client, _admin, _currency) = setup_protocol(&env);

    let alice = Address::generate(&env);
    let bob = Address::generate(&env);
    client.initialize_treasury(&alice);

    let empty: Vec<soroban_sdk::BytesN<32>> = Vec::new(&env);
    assert_eq!(
        client.try_settle_batch(&bob, &bytes32(&env, 0xB4), &alice, &empty, &0),
        Err(Ok(AgentPayError::EmptyBatch))
    );

    let mut oversized = Vec::new(&env);
    for i in 0..51u32 {
        oversized.push_back(bytes32(&env, i as u8));
    }
    assert_eq!(
        client.try_settle_batch(&bob, &bytes32(&env, 0xB5), &alice, &oversized, &0),
        Err(Ok(AgentPayError::BatchTooLarge))
    );
}

#[test]
fn test_batch_rejects_wrong_recipient() {
    let env = Env::default();
    let (client, _admin, currency) = setup_protocol(&env);

    let alice = Address::generate(&env);
    let carol = Address::generate(&env);
    let bob = Address::generate(&env);
    let mut ids = paid_invoices(&env, &client, &currency, &alice, &bob);

    // One paid invoice belongs to carol.
    client.initialize_treasury(&carol);
    let foreign = bytes32(&env, 0xCC);
    client.create_invoice(
        &carol,
        &foreign,
        &50,
        &String::from_str(&env, "other recipient"),
        &(T0 + 3600),
    );
    client.pay_invoice(&bob, &foreign);
    ids.push_back(foreign);

    assert_eq!(
        client.try_settle_batch(&bob, &bytes32(&env, 0xB6), &alice, &ids, &650),
        Err(Ok(AgentPayError::WrongRecipient))
    );
    // The abort preserved every invoice's Paid state and settled nothing.
    assert_eq!(client.get_treasury(&alice).total_settled, 0);
    for id in ids.iter() {
        assert_eq!(
            client.get_invoice(&id).status,
            crate::invoice::InvoiceStatus::Paid
        );
        assert_eq!(client.get_settling_batch(&id), None);
    }
}

#[test]
fn test_batch_rejects_unpaid_invoice() {
    let env = Env::default();
    let (client, _admin, currency) = setup_protocol(&env);

    let alice = Address::generate(&env);
    let bob = Address::generate(&env);
    let mut ids = paid_invoices(&env, &client, &currency, &alice, &bob);

    let unpaid = bytes32(&env, 0xDD);
    client.create_invoice(
        &alice,
        &unpaid,
        &50,
        &String::from_str(&env, "still pending"),
        &(T0 + 3600),
    );
    ids.push_back(unpaid);

    assert_eq!(
        client.try_settle_batch(&bob, &bytes32(&env, 0xB7), &alice, &ids, &650),
        Err(Ok(AgentPayError::InvoiceNotPaid))
    );
}

#[test]
fn test_invoice_reconciled_at_most_once() {
    let env = Env::default();
    let (client, _admin, currency) = setup_protocol(&env);

    let alice = Address::generate(&env);
    let bob = Address::generate(&env);
    let ids = paid_invoices(&env, &client, &currency, &alice, &bob);

    client.settle_batch(&bob, &bytes32(&env, 0xB8), &alice, &ids, &600);

    // A fresh batch over the same invoices cannot double-settle them.
    assert_eq!(
        client.try_settle_batch(&bob, &bytes32(&env, 0xB9), &alice, &ids, &600),
        Err(Ok(AgentPayError::InvoiceNotPaid))
    );
    let treasury = client.get_treasury(&alice);
    assert_eq!(treasury.total_settled, 600);
    assert!(treasury.total_settled <= treasury.total_received);
}

#[test]
fn test_duplicate_invoice_id_within_batch() {
    let env = Env::default();
    let (client, _admin, currency) = setup_protocol(&env);

    let alice = Address::generate(&env);
    let bob = Address::generate(&env);
    client.initialize_treasury(&alice);
    mint(&env, &currency, &bob, 1_000);

    let id = bytes32(&env, 0xEE);
    client.create_invoice(
        &alice,
        &id,
        &100,
        &String::from_str(&env, "metered usage"),
        &(T0 + 3600),
    );
    client.pay_invoice(&bob, &id);

    let mut ids = Vec::new(&env);
    ids.push_back(id.clone());
    ids.push_back(id.clone());
    assert_eq!(
        client.try_settle_batch(&bob, &bytes32(&env, 0xBA), &alice, &ids, &200),
        Err(Ok(AgentPayError::InvoiceNotPaid))
    );
    // The failed batch left no marker behind.
    assert_eq!(client.get_settling_batch(&id), None);
}
