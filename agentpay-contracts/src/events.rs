//! Event emission helpers.
//!
//! One event per state-changing operation: a short operation symbol as the
//! topic plus the primary identifiers in the payload. Events are for
//! subscribers only and never affect state.

use soroban_sdk::{symbol_short, Address, BytesN, Env};

use crate::batch::BatchSettlement;
use crate::dispute::Dispute;
use crate::invoice::Invoice;
use crate::registry::AgentProfile;
use crate::request::ServiceRequest;
use crate::stream::PaymentStream;

pub fn emit_treasury_initialized(env: &Env, owner: &Address, treasury: &BytesN<32>) {
    env.events().publish(
        (symbol_short!("trs_init"),),
        (owner.clone(), treasury.clone(), env.ledger().timestamp()),
    );
}

pub fn emit_invoice_created(env: &Env, invoice: &Invoice) {
    env.events().publish(
        (symbol_short!("inv_new"), invoice.id.clone()),
        (
            invoice.recipient.clone(),
            invoice.amount,
            invoice.expires_at,
        ),
    );
}

pub fn emit_invoice_paid(env: &Env, invoice: &Invoice, payer: &Address) {
    env.events().publish(
        (symbol_short!("inv_paid"), invoice.id.clone()),
        (payer.clone(), invoice.amount),
    );
}

pub fn emit_invoice_cancelled(env: &Env, invoice: &Invoice) {
    env.events().publish(
        (symbol_short!("inv_cncl"), invoice.id.clone()),
        (invoice.recipient.clone(), env.ledger().timestamp()),
    );
}

pub fn emit_invoice_expired(env: &Env, invoice: &Invoice) {
    env.events().publish(
        (symbol_short!("inv_exp"), invoice.id.clone()),
        (invoice.recipient.clone(), invoice.expires_at),
    );
}

pub fn emit_batch_settled(env: &Env, batch: &BatchSettlement) {
    env.events().publish(
        (symbol_short!("bch_stld"), batch.id.clone()),
        (
            batch.recipient.clone(),
            batch.invoice_ids.len(),
            batch.total_amount,
        ),
    );
}

pub fn emit_agent_registered(env: &Env, profile: &AgentProfile) {
    env.events().publish(
        (symbol_short!("agt_reg"),),
        (
            profile.owner.clone(),
            profile.name.clone(),
            profile.base_price,
        ),
    );
}

pub fn emit_agent_updated(env: &Env, profile: &AgentProfile) {
    env.events().publish(
        (symbol_short!("agt_upd"),),
        (profile.owner.clone(), profile.is_active),
    );
}

pub fn emit_service_requested(env: &Env, request: &ServiceRequest) {
    env.events().publish(
        (symbol_short!("svc_req"), request.id.clone()),
        (
            request.requester.clone(),
            request.provider.clone(),
            request.capability.clone(),
            request.amount,
        ),
    );
}

pub fn emit_service_started(env: &Env, request: &ServiceRequest) {
    env.events().publish(
        (symbol_short!("svc_strt"), request.id.clone()),
        (request.provider.clone(), env.ledger().timestamp()),
    );
}

pub fn emit_service_completed(env: &Env, request: &ServiceRequest) {
    env.events().publish(
        (symbol_short!("svc_done"), request.id.clone()),
        (request.provider.clone(), request.amount),
    );
}

pub fn emit_dispute_initiated(env: &Env, dispute: &Dispute) {
    env.events().publish(
        (symbol_short!("dsp_open"), dispute.request_id.clone()),
        (dispute.initiator.clone(), dispute.opened_at),
    );
}

pub fn emit_dispute_resolved(env: &Env, dispute: &Dispute) {
    env.events().publish(
        (symbol_short!("dsp_rslv"), dispute.request_id.clone()),
        (dispute.resolution.clone(), env.ledger().timestamp()),
    );
}

pub fn emit_stream_created(env: &Env, stream: &PaymentStream) {
    env.events().publish(
        (symbol_short!("str_new"), stream.id.clone()),
        (
            stream.sender.clone(),
            stream.recipient.clone(),
            stream.total_amount,
            stream.start_time,
            stream.end_time,
        ),
    );
}

pub fn emit_stream_withdrawn(env: &Env, stream: &PaymentStream, amount: i128) {
    env.events().publish(
        (symbol_short!("str_wdrw"), stream.id.clone()),
        (stream.recipient.clone(), amount),
    );
}

pub fn emit_stream_paused(env: &Env, stream: &PaymentStream) {
    env.events().publish(
        (symbol_short!("str_paus"), stream.id.clone()),
        (stream.sender.clone(), env.ledger().timestamp()),
    );
}

pub fn emit_stream_resumed(env: &Env, stream: &PaymentStream) {
    env.events().publish(
        (symbol_short!("str_rsme"), stream.id.clone()),
        (stream.sender.clone(), stream.end_time),
    );
}

pub fn emit_stream_cancelled(env: &Env, stream: &PaymentStream, refund: i128, claimable: i128) {
    env.events().publish(
        (symbol_short!("str_cncl"), stream.id.clone()),
        (stream.sender.clone(), refund, claimable),
    );
}

pub fn emit_stream_completed(env: &Env, stream: &PaymentStream) {
    env.events().publish(
        (symbol_short!("str_done"), stream.id.clone()),
        (stream.recipient.clone(), stream.total_amount),
    );
}
