//! Role-Based Authorization Capability
//!
//! The core never stores roles itself; every mutating operation consumes the
//! [`AuthorizationProvider`] capability and is told whether the caller holds
//! the required role. [`RoleRegistry`] is the in-process implementation used
//! by tests and single-process deployments; production systems may back the
//! trait with multisig or directory lookups.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::primitives::Address;

/// Role enumeration for authority checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Operator administration (daily limits, configuration)
    Admin,
    /// Token minting
    Minter,
    /// Token burning (includes redemption settlement burns)
    Burner,
    /// Pausing all transfers
    Pauser,
    /// Resuming transfers after a pause
    Resumer,
    /// Freezing individual addresses
    Freezer,
    /// Whitelist membership and whitelist mode
    Whitelister,
    /// Blacklist membership
    Blacklister,
    /// Patent registry management
    PatentManager,
    /// Reserve book management
    ReserveManager,
    /// Revenue round creation
    RevenueManager,
    /// Redemption settlement and cancellation
    RedemptionManager,
}

impl Role {
    /// All roles in stable order
    pub const ALL: &'static [Role] = &[
        Role::Admin,
        Role::Minter,
        Role::Burner,
        Role::Pauser,
        Role::Resumer,
        Role::Freezer,
        Role::Whitelister,
        Role::Blacklister,
        Role::PatentManager,
        Role::ReserveManager,
        Role::RevenueManager,
        Role::RedemptionManager,
    ];
}

/// Authorization capability consumed by every mutating core operation.
///
/// Implementations answer from pre-authorized state; the core never grants
/// or revokes through this trait.
pub trait AuthorizationProvider {
    /// Check if an address holds a role
    fn has_role(&self, role: Role, address: &Address) -> bool;

    /// Check if an address holds any role at all
    fn is_authorized_signer(&self, address: &Address) -> bool {
        Role::ALL.iter().any(|role| self.has_role(*role, address))
    }
}

/// Role registry: maps roles to sets of authorized addresses
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleRegistry {
    roles: HashMap<Role, HashSet<Address>>,
}

impl RoleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant a role to an address
    pub fn grant(&mut self, role: Role, address: Address) {
        self.roles.entry(role).or_default().insert(address);
    }

    /// Revoke a role from an address
    pub fn revoke(&mut self, role: Role, address: &Address) {
        if let Some(set) = self.roles.get_mut(&role) {
            set.remove(address);
        }
    }

    /// Get all addresses holding a role
    pub fn addresses(&self, role: Role) -> impl Iterator<Item = &Address> {
        self.roles
            .get(&role)
            .map(|set| set.iter())
            .into_iter()
            .flatten()
    }
}

impl AuthorizationProvider for RoleRegistry {
    fn has_role(&self, role: Role, address: &Address) -> bool {
        self.roles
            .get(&role)
            .map(|set| set.contains(address))
            .unwrap_or(false)
    }
}
