//! Agent registry: profiles, capability lists, and activity counters.

use soroban_sdk::{contracttype, Address, BytesN, Env, String, Vec};

use crate::address;
use crate::errors::AgentPayError;
use crate::events;
use crate::store::{AccountStore, Record};
use crate::treasury::TreasuryStorage;

pub const MAX_NAME_LENGTH: u32 = 32;
pub const MAX_DESCRIPTION_LENGTH: u32 = 256;
pub const MAX_CAPABILITIES: u32 = 10;
pub const MAX_CAPABILITY_LENGTH: u32 = 32;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AgentProfile {
    pub owner: Address,
    /// Derived address of the owner's treasury.
    pub treasury: BytesN<32>,
    pub bump: u32,
    pub name: String,
    pub description: String,
    /// Canonical capability list: order-preserving, no duplicates.
    pub capabilities: Vec<String>,
    /// Minimum price per request, in base units.
    pub base_price: i128,
    pub is_active: bool,
    pub total_requests: u64,
    pub total_earnings: i128,
    pub registered_at: u64,
    pub last_active_at: u64,
}

pub struct RegistryStorage;

impl RegistryStorage {
    pub fn address(env: &Env, owner: &Address) -> (BytesN<32>, u32) {
        address::derive(
            env,
            address::AGENT_TAG,
            &[address::seed_from_address(env, owner)],
        )
    }

    pub fn get(env: &Env, owner: &Address) -> Result<AgentProfile, AgentPayError> {
        let (addr, _) = Self::address(env, owner);
        match AccountStore::load(env, &addr)? {
            Record::Agent(profile) => Ok(profile),
            _ => Err(AgentPayError::WrongClass),
        }
    }

    pub fn update(env: &Env, profile: &AgentProfile) {
        let (addr, _) = Self::address(env, &profile.owner);
        AccountStore::write(env, &addr, &Record::Agent(profile.clone()));
    }
}

fn validate_name(name: &String) -> Result<(), AgentPayError> {
    if name.len() > MAX_NAME_LENGTH {
        return Err(AgentPayError::NameTooLong);
    }
    Ok(())
}

fn validate_description(description: &String) -> Result<(), AgentPayError> {
    if description.len() > MAX_DESCRIPTION_LENGTH {
        return Err(AgentPayError::DescriptionTooLong);
    }
    Ok(())
}

/// Order-preserving dedup plus per-tag and list-size checks.
fn canonicalize_capabilities(
    env: &Env,
    capabilities: &Vec<String>,
) -> Result<Vec<String>, AgentPayError> {
    let mut canonical: Vec<String> = Vec::new(env);
    for capability in capabilities.iter() {
        if capability.len() == 0 || capability.len() > MAX_CAPABILITY_LENGTH {
            return Err(AgentPayError::CapabilityTooLong);
        }
        if !canonical.contains(&capability) {
            canonical.push_back(capability);
        }
    }
    if canonical.len() > MAX_CAPABILITIES {
        return Err(AgentPayError::CapabilityListTooLarge);
    }
    Ok(canonical)
}

/// Register an agent profile for `owner`. Requires an initialized treasury.
pub fn register_agent(
    env: &Env,
    owner: &Address,
    name: String,
    description: String,
    capabilities: Vec<String>,
    base_price: i128,
) -> Result<BytesN<32>, AgentPayError> {
    owner.require_auth();

    validate_name(&name)?;
    validate_description(&description)?;
    let capabilities = canonicalize_capabilities(env, &capabilities)?;
    if base_price < 0 {
        return Err(AgentPayError::BadAmount);
    }

    if !TreasuryStorage::exists(env, owner) {
        return Err(AgentPayError::NoTreasury);
    }
    let (treasury_addr, _) = TreasuryStorage::address(env, owner);

    let now = env.ledger().timestamp();
    let (addr, bump) = RegistryStorage::address(env, owner);
    let profile = AgentProfile {
        owner: owner.clone(),
        treasury: treasury_addr,
        bump,
        name,
        description,
        capabilities,
        base_price,
        is_active: true,
        total_requests: 0,
        total_earnings: 0,
        registered_at: now,
        last_active_at: now,
    };
    AccountStore::create(env, &addr, &Record::Agent(profile.clone()))?;

    events::emit_agent_registered(env, &profile);
    Ok(addr)
}

/// Update the mutable profile fields. Absent options leave fields untouched;
/// `last_active_at` always advances.
pub fn update_agent_profile(
    env: &Env,
    owner: &Address,
    name: Option<String>,
    description: Option<String>,
    capabilities: Option<Vec<String>>,
    base_price: Option<i128>,
    is_active: Option<bool>,
) -> Result<(), AgentPayError> {
    owner.require_auth();

    let mut profile = RegistryStorage::get(env, owner)?;

    if let Some(name) = name {
        validate_name(&name)?;
        profile.name = name;
    }
    if let Some(description) = description {
        validate_description(&description)?;
        profile.description = description;
    }
    if let Some(capabilities) = capabilities {
        profile.capabilities = canonicalize_capabilities(env, &capabilities)?;
    }
    if let Some(base_price) = base_price {
        if base_price < 0 {
            return Err(AgentPayError::BadAmount);
        }
        profile.base_price = base_price;
    }
    if let Some(is_active) = is_active {
        profile.is_active = is_active;
    }
    profile.last_active_at = env.ledger().timestamp();

    RegistryStorage::update(env, &profile);

    events::emit_agent_updated(env, &profile);
    Ok(())
}
