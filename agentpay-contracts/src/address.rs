//! Deterministic record addressing.
//!
//! Every persistent record lives at a 32-byte address derived from a class
//! tag and an ordered list of seeds. The derivation is a pure function:
//! SHA-256 over a domain constant, the length-prefixed tag, each
//! length-prefixed seed, and a trailing bump byte. The bump is scanned from
//! 255 downwards until the digest is not a valid ed25519 point encoding, so
//! no principal can ever hold the signing key for a record address.

use soroban_sdk::{panic_with_error, xdr::ToXdr, Address, Bytes, BytesN, Env, String, Vec};

use crate::curve;
use crate::errors::AgentPayError;

pub const TREASURY_TAG: &[u8] = b"treasury";
pub const INVOICE_TAG: &[u8] = b"invoice";
pub const BATCH_TAG: &[u8] = b"batch";
pub const AGENT_TAG: &[u8] = b"agent";
pub const REQUEST_TAG: &[u8] = b"request";
pub const REQUEST_ESCROW_TAG: &[u8] = b"request_escrow";
pub const DISPUTE_TAG: &[u8] = b"dispute";
pub const STREAM_TAG: &[u8] = b"stream";
pub const STREAM_ESCROW_TAG: &[u8] = b"stream_escrow";

const DOMAIN: &[u8] = b"agentpay/address/v1";

/// Longest tag accepted by the runtime-tag derivation path.
pub const MAX_TAG_LENGTH: u32 = 32;

/// Derive the address and bump for `(tag, seeds)`.
///
/// Deterministic: identical inputs always return the identical pair. Seeds
/// are length-prefixed before hashing so distinct seed lists can never
/// produce the same preimage.
pub fn derive(env: &Env, tag: &[u8], seeds: &[Bytes]) -> (BytesN<32>, u32) {
    derive_with(env, tag, seeds.iter().cloned())
}

/// Derivation with a runtime tag and seed list, for the read surface.
/// Identical inputs produce the same pair as the static-tag path.
pub fn derive_dynamic(
    env: &Env,
    tag: &String,
    seeds: &Vec<Bytes>,
) -> Result<(BytesN<32>, u32), AgentPayError> {
    if tag.len() == 0 || tag.len() > MAX_TAG_LENGTH {
        return Err(AgentPayError::BadSerialization);
    }
    let mut tag_buf = [0u8; MAX_TAG_LENGTH as usize];
    let tag_len = tag.len() as usize;
    tag.copy_into_slice(&mut tag_buf[..tag_len]);
    Ok(derive_with(env, &tag_buf[..tag_len], seeds.iter()))
}

fn derive_with(
    env: &Env,
    tag: &[u8],
    seeds: impl Iterator<Item = Bytes>,
) -> (BytesN<32>, u32) {
    let mut base = Bytes::from_slice(env, DOMAIN);
    append_chunk(env, &mut base, &Bytes::from_slice(env, tag));
    for seed in seeds {
        append_chunk(env, &mut base, &seed);
    }

    let mut bump = 255u32;
    loop {
        let mut preimage = base.clone();
        preimage.push_back(bump as u8);
        let digest: BytesN<32> = env.crypto().sha256(&preimage).into();
        if !curve::is_valid_point(&digest.to_array()) {
            return (digest, bump);
        }
        if bump == 0 {
            // 256 consecutive on-curve digests cannot occur for SHA-256
            // output; treat it as a corrupted derivation request.
            panic_with_error!(env, AgentPayError::AddressMismatch);
        }
        bump -= 1;
    }
}

/// Seed bytes for a principal: the XDR encoding of its address.
pub fn seed_from_address(env: &Env, address: &Address) -> Bytes {
    address.clone().to_xdr(env)
}

/// Seed bytes for a 32-byte identifier.
pub fn seed_from_id(env: &Env, id: &BytesN<32>) -> Bytes {
    Bytes::from_slice(env, &id.to_array())
}

/// Check a stored address against a fresh derivation.
pub fn require_match(
    env: &Env,
    tag: &[u8],
    seeds: &[Bytes],
    expected: &BytesN<32>,
) -> Result<u32, AgentPayError> {
    let (derived, bump) = derive(env, tag, seeds);
    if derived != *expected {
        return Err(AgentPayError::AddressMismatch);
    }
    Ok(bump)
}

fn append_chunk(env: &Env, out: &mut Bytes, chunk: &Bytes) {
    out.append(&Bytes::from_slice(env, &chunk.len().to_le_bytes()));
    out.append(chunk);
}
