#![no_std]
//! AgentPay: on-chain payment protocol for autonomous service agents.
//!
//! Four instrument classes over one keyed account store: per-principal
//! treasuries, time-bound invoices, batch settlements, and escrowed service
//! requests with a dispute exit, plus linear-rate payment streams built on
//! the same custody primitives. Every record lives at a deterministically
//! derived, off-curve address; every entry point is atomic.

use soroban_sdk::{contract, contractimpl, Address, Bytes, BytesN, Env, String, Vec};

mod address;
mod admin;
mod batch;
mod curve;
mod dispute;
mod errors;
mod escrow;
mod events;
mod init;
mod invoice;
mod pause;
mod reentrancy;
mod registry;
mod request;
mod store;
mod stream;
mod treasury;

#[cfg(test)]
mod test_batch;
#[cfg(test)]
mod test_dispute;
#[cfg(test)]
mod test_stream;

use admin::AdminStorage;
use batch::{settle_batch as do_settle_batch, BatchSettlement, BatchStorage};
use dispute::{
    initiate_dispute as do_initiate_dispute, resolve_dispute as do_resolve_dispute, Dispute,
    DisputeStorage, Resolution,
};
use errors::AgentPayError;
use escrow::{Escrow, EscrowVault};
use init::ProtocolInitializer;
use invoice::{
    cancel_invoice as do_cancel_invoice, create_invoice as do_create_invoice,
    mark_invoice_expired as do_mark_invoice_expired, pay_invoice as do_pay_invoice, Invoice,
    InvoiceStatus, InvoiceStorage,
};
use pause::PauseControl;
use registry::{
    register_agent as do_register_agent, update_agent_profile as do_update_agent_profile,
    AgentProfile, RegistryStorage,
};
use request::{
    complete_service as do_complete_service, request_service as do_request_service,
    start_service as do_start_service, RequestStorage, ServiceRequest,
};
use stream::{
    cancel_stream as do_cancel_stream, create_stream as do_create_stream,
    pause_stream as do_pause_stream, resume_stream as do_resume_stream,
    withdraw_from_stream as do_withdraw_from_stream, PaymentStream, StreamStorage,
};
use treasury::{initialize_treasury as do_initialize_treasury, Treasury, TreasuryStorage};

#[contract]
pub struct AgentPayContract;

#[contractimpl]
impl AgentPayContract {
    // ============================================================================
    // Protocol administration
    // ============================================================================

    /// One-time setup: admin plus the settlement asset all amounts are
    /// denominated in.
    pub fn initialize(
        env: Env,
        admin: Address,
        settlement_asset: Address,
    ) -> Result<(), AgentPayError> {
        ProtocolInitializer::initialize(&env, &admin, &settlement_asset)
    }

    pub fn is_initialized(env: Env) -> bool {
        ProtocolInitializer::is_initialized(&env)
    }

    pub fn get_version(_env: Env) -> u32 {
        1u32
    }

    /// Transfer the admin role (current admin only).
    pub fn transfer_admin(env: Env, new_admin: Address) -> Result<(), AgentPayError> {
        let current = AdminStorage::get(&env).ok_or(AgentPayError::NotAdmin)?;
        AdminStorage::transfer(&env, &current, &new_admin)
    }

    pub fn get_admin(env: Env) -> Option<Address> {
        AdminStorage::get(&env)
    }

    /// Pause mutating entry points (admin only). Getters keep working.
    pub fn pause(env: Env, admin: Address) -> Result<(), AgentPayError> {
        PauseControl::set_paused(&env, &admin, true)
    }

    /// Unpause the protocol (admin only).
    pub fn unpause(env: Env, admin: Address) -> Result<(), AgentPayError> {
        PauseControl::set_paused(&env, &admin, false)
    }

    pub fn is_paused(env: Env) -> bool {
        PauseControl::is_paused(&env)
    }

    // ============================================================================
    // Treasury
    // ============================================================================

    /// Create the treasury record for `owner`. One per principal.
    pub fn initialize_treasury(env: Env, owner: Address) -> Result<BytesN<32>, AgentPayError> {
        PauseControl::require_not_paused(&env)?;
        do_initialize_treasury(&env, &owner)
    }

    pub fn get_treasury(env: Env, owner: Address) -> Result<Treasury, AgentPayError> {
        TreasuryStorage::get(&env, &owner)
    }

    /// Derived address of `owner`'s treasury, whether or not it exists yet.
    pub fn get_treasury_address(env: Env, owner: Address) -> BytesN<32> {
        TreasuryStorage::address(&env, &owner).0
    }

    // ============================================================================
    // Invoices
    // ============================================================================

    /// Create a Pending invoice naming the signing recipient.
    pub fn create_invoice(
        env: Env,
        recipient: Address,
        invoice_id: BytesN<32>,
        amount: i128,
        memo: String,
        expires_at: u64,
    ) -> Result<BytesN<32>, AgentPayError> {
        PauseControl::require_not_paused(&env)?;
        do_create_invoice(&env, &recipient, &invoice_id, amount, memo, expires_at)
    }

    /// Pay a Pending, unexpired invoice. Anyone may pay.
    pub fn pay_invoice(
        env: Env,
        payer: Address,
        invoice_id: BytesN<32>,
    ) -> Result<(), AgentPayError> {
        PauseControl::require_not_paused(&env)?;
        reentrancy::with_payment_guard(&env, || do_pay_invoice(&env, &payer, &invoice_id))
    }

    /// Cancel a Pending invoice (recipient only).
    pub fn cancel_invoice(env: Env, invoice_id: BytesN<32>) -> Result<(), AgentPayError> {
        PauseControl::require_not_paused(&env)?;
        do_cancel_invoice(&env, &invoice_id)
    }

    /// Persist an observable Pending → Expired transition. Permissionless;
    /// returns whether the transition happened.
    pub fn mark_invoice_expired(
        env: Env,
        invoice_id: BytesN<32>,
    ) -> Result<bool, AgentPayError> {
        PauseControl::require_not_paused(&env)?;
        do_mark_invoice_expired(&env, &invoice_id)
    }

    pub fn get_invoice(env: Env, invoice_id: BytesN<32>) -> Result<Invoice, AgentPayError> {
        InvoiceStorage::get(&env, &invoice_id)
    }

    /// Status as observable now: Pending invoices past expiry read Expired.
    pub fn get_invoice_status(
        env: Env,
        invoice_id: BytesN<32>,
    ) -> Result<InvoiceStatus, AgentPayError> {
        let invoice = InvoiceStorage::get(&env, &invoice_id)?;
        Ok(invoice.effective_status(env.ledger().timestamp()))
    }

    pub fn get_invoices_by_recipient(env: Env, recipient: Address) -> Vec<BytesN<32>> {
        InvoiceStorage::ids_by_recipient(&env, &recipient)
    }

    // ============================================================================
    // Batch settlement
    // ============================================================================

    /// Atomically reconcile up to `MAX_BATCH_SIZE` paid invoices.
    pub fn settle_batch(
        env: Env,
        settler: Address,
        batch_id: BytesN<32>,
        recipient: Address,
        invoice_ids: Vec<BytesN<32>>,
        claimed_total: i128,
    ) -> Result<BytesN<32>, AgentPayError> {
        PauseControl::require_not_paused(&env)?;
        do_settle_batch(
            &env,
            &settler,
            &batch_id,
            &recipient,
            invoice_ids,
            claimed_total,
        )
    }

    pub fn get_batch(env: Env, batch_id: BytesN<32>) -> Result<BatchSettlement, AgentPayError> {
        BatchStorage::get(&env, &batch_id)
    }

    /// The batch that reconciled `invoice_id`, if any.
    pub fn get_settling_batch(env: Env, invoice_id: BytesN<32>) -> Option<BytesN<32>> {
        BatchStorage::settling_batch(&env, &invoice_id)
    }

    // ============================================================================
    // Agent registry
    // ============================================================================

    /// Register the signing owner as a service agent.
    pub fn register_agent(
        env: Env,
        owner: Address,
        name: String,
        description: String,
        capabilities: Vec<String>,
        base_price: i128,
    ) -> Result<BytesN<32>, AgentPayError> {
        PauseControl::require_not_paused(&env)?;
        do_register_agent(&env, &owner, name, description, capabilities, base_price)
    }

    /// Update profile fields; absent options leave fields untouched.
    pub fn update_agent_profile(
        env: Env,
        owner: Address,
        name: Option<String>,
        description: Option<String>,
        capabilities: Option<Vec<String>>,
        base_price: Option<i128>,
        is_active: Option<bool>,
    ) -> Result<(), AgentPayError> {
        PauseControl::require_not_paused(&env)?;
        do_update_agent_profile(
            &env,
            &owner,
            name,
            description,
            capabilities,
            base_price,
            is_active,
        )
    }

    pub fn get_agent(env: Env, owner: Address) -> Result<AgentProfile, AgentPayError> {
        RegistryStorage::get(&env, &owner)
    }

    pub fn get_agent_address(env: Env, owner: Address) -> BytesN<32> {
        RegistryStorage::address(&env, &owner).0
    }

    // ============================================================================
    // Service requests
    // ============================================================================

    /// Request a service from a registered provider; the amount is escrowed.
    /// An optional designated arbiter fixes dispute authority at creation.
    pub fn request_service(
        env: Env,
        requester: Address,
        request_id: BytesN<32>,
        provider: Address,
        capability: String,
        amount: i128,
        arbiter: Option<Address>,
    ) -> Result<BytesN<32>, AgentPayError> {
        PauseControl::require_not_paused(&env)?;
        reentrancy::with_payment_guard(&env, || {
            do_request_service(
                &env,
                &requester,
                &request_id,
                &provider,
                capability.clone(),
                amount,
                arbiter.clone(),
            )
        })
    }

    /// Provider acknowledges work has begun (Pending → InProgress).
    pub fn start_service(env: Env, request_id: BytesN<32>) -> Result<(), AgentPayError> {
        PauseControl::require_not_paused(&env)?;
        do_start_service(&env, &request_id)
    }

    /// Deliver the result and collect the escrowed payment (provider only).
    pub fn complete_service(
        env: Env,
        request_id: BytesN<32>,
        result_hash: BytesN<32>,
    ) -> Result<(), AgentPayError> {
        PauseControl::require_not_paused(&env)?;
        reentrancy::with_payment_guard(&env, || {
            do_complete_service(&env, &request_id, &result_hash)
        })
    }

    pub fn get_request(
        env: Env,
        request_id: BytesN<32>,
    ) -> Result<ServiceRequest, AgentPayError> {
        RequestStorage::get(&env, &request_id)
    }

    pub fn get_request_escrow(
        env: Env,
        request_id: BytesN<32>,
    ) -> Result<Escrow, AgentPayError> {
        EscrowVault::get(&env, address::REQUEST_ESCROW_TAG, &request_id)
    }

    pub fn get_requests_by_provider(env: Env, provider: Address) -> Vec<BytesN<32>> {
        RequestStorage::ids_by_provider(&env, &provider)
    }

    // ============================================================================
    // Disputes
    // ============================================================================

    /// Open a dispute on a live request (either party, inside the window).
    pub fn initiate_dispute(
        env: Env,
        initiator: Address,
        request_id: BytesN<32>,
    ) -> Result<BytesN<32>, AgentPayError> {
        PauseControl::require_not_paused(&env)?;
        do_initiate_dispute(&env, &initiator, &request_id)
    }

    /// Resolve an open dispute and drain the escrow accordingly.
    pub fn resolve_dispute(
        env: Env,
        resolver: Address,
        request_id: BytesN<32>,
        resolution: Resolution,
    ) -> Result<(), AgentPayError> {
        PauseControl::require_not_paused(&env)?;
        reentrancy::with_payment_guard(&env, || {
            do_resolve_dispute(&env, &resolver, &request_id, resolution.clone())
        })
    }

    pub fn get_dispute(env: Env, request_id: BytesN<32>) -> Result<Dispute, AgentPayError> {
        DisputeStorage::get(&env, &request_id)
    }

    // ============================================================================
    // Payment streams
    // ============================================================================

    /// Open a linear-rate stream; the full amount is escrowed up front.
    pub fn create_stream(
        env: Env,
        sender: Address,
        stream_id: BytesN<32>,
        recipient: Address,
        total_amount: i128,
        start_time: u64,
        end_time: u64,
    ) -> Result<BytesN<32>, AgentPayError> {
        PauseControl::require_not_paused(&env)?;
        reentrancy::with_payment_guard(&env, || {
            do_create_stream(
                &env,
                &sender,
                &stream_id,
                &recipient,
                total_amount,
                start_time,
                end_time,
            )
        })
    }

    /// Withdraw everything currently available (recipient only).
    pub fn withdraw_from_stream(
        env: Env,
        stream_id: BytesN<32>,
    ) -> Result<i128, AgentPayError> {
        PauseControl::require_not_paused(&env)?;
        reentrancy::with_payment_guard(&env, || do_withdraw_from_stream(&env, &stream_id))
    }

    /// Freeze stream availability (sender only).
    pub fn pause_stream(env: Env, stream_id: BytesN<32>) -> Result<(), AgentPayError> {
        PauseControl::require_not_paused(&env)?;
        do_pause_stream(&env, &stream_id)
    }

    /// Unfreeze; `end_time` shifts by the pause duration (sender only).
    pub fn resume_stream(env: Env, stream_id: BytesN<32>) -> Result<(), AgentPayError> {
        PauseControl::require_not_paused(&env)?;
        do_resume_stream(&env, &stream_id)
    }

    /// Refund the unvested remainder to the sender; what was available at
    /// cancellation stays claimable by the recipient.
    pub fn cancel_stream(env: Env, stream_id: BytesN<32>) -> Result<(), AgentPayError> {
        PauseControl::require_not_paused(&env)?;
        reentrancy::with_payment_guard(&env, || do_cancel_stream(&env, &stream_id))
    }

    pub fn get_stream(env: Env, stream_id: BytesN<32>) -> Result<PaymentStream, AgentPayError> {
        StreamStorage::get(&env, &stream_id)
    }

    /// Base units the recipient could withdraw right now.
    pub fn get_stream_available(
        env: Env,
        stream_id: BytesN<32>,
    ) -> Result<i128, AgentPayError> {
        let stream = StreamStorage::get(&env, &stream_id)?;
        Ok(stream.available(env.ledger().timestamp()))
    }

    pub fn get_stream_escrow(
        env: Env,
        stream_id: BytesN<32>,
    ) -> Result<Escrow, AgentPayError> {
        EscrowVault::get(&env, address::STREAM_ESCROW_TAG, &stream_id)
    }

    pub fn get_streams_by_recipient(env: Env, recipient: Address) -> Vec<BytesN<32>> {
        StreamStorage::ids_by_recipient(&env, &recipient)
    }

    // ============================================================================
    // Record addressing
    // ============================================================================

    /// Derive the address and bump for any record class tag and seed list,
    /// so clients and tests can reproduce record addresses themselves.
    pub fn derive_record_address(
        env: Env,
        tag: String,
        seeds: Vec<Bytes>,
    ) -> Result<(BytesN<32>, u32), AgentPayError> {
        address::derive_dynamic(&env, &tag, &seeds)
    }
}
