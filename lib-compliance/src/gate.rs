//! Transfer Authorization Decision
//!
//! The gate answers one question with no side effects: given the current
//! flags, may `from` send to `to`? Flag mutation is role-gated through the
//! injected [`AuthorizationProvider`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use lib_types::{Address, AuthorizationProvider, Role};

use crate::errors::{ComplianceError, ComplianceResult};

// =============================================================================
// FLAGS
// =============================================================================

/// Per-address compliance flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountFlags {
    pub whitelisted: bool,
    pub blacklisted: bool,
    pub frozen: bool,
}

impl AccountFlags {
    fn is_clear(&self) -> bool {
        !self.whitelisted && !self.blacklisted && !self.frozen
    }
}

/// Which per-address flag an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlagKind {
    Whitelisted,
    Blacklisted,
    Frozen,
}

impl FlagKind {
    /// The role allowed to mutate this flag
    pub fn required_role(self) -> Role {
        match self {
            FlagKind::Whitelisted => Role::Whitelister,
            FlagKind::Blacklisted => Role::Blacklister,
            FlagKind::Frozen => Role::Freezer,
        }
    }
}

// =============================================================================
// DECISION
// =============================================================================

/// Why a transfer was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DenialReason {
    Paused,
    Blacklisted,
    Frozen,
    NotWhitelisted,
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DenialReason::Paused => "transfers are paused",
            DenialReason::Blacklisted => "address is blacklisted",
            DenialReason::Frozen => "address is frozen",
            DenialReason::NotWhitelisted => "address is not whitelisted",
        };
        write!(f, "{}", s)
    }
}

/// Outcome of [`ComplianceGate::authorize_transfer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferDecision {
    Allowed,
    Denied(DenialReason),
}

impl TransferDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, TransferDecision::Allowed)
    }
}

// =============================================================================
// GATE
// =============================================================================

/// Compliance gate state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComplianceGate {
    flags: BTreeMap<Address, AccountFlags>,
    paused: bool,
    whitelist_enabled: bool,
}

impl ComplianceGate {
    /// Create a gate with everything permitted: unpaused, whitelist off,
    /// no flags set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Authorize a transfer between two addresses.
    ///
    /// Evaluated in fixed priority order, first match wins:
    /// pause, blacklist, freeze, whitelist. Blacklist and freeze are checked
    /// even when the whitelist is disabled, and always dominate it.
    pub fn authorize_transfer(&self, from: &Address, to: &Address) -> TransferDecision {
        if self.paused {
            return TransferDecision::Denied(DenialReason::Paused);
        }

        let from_flags = self.flags_of(from);
        let to_flags = self.flags_of(to);

        if from_flags.blacklisted || to_flags.blacklisted {
            return TransferDecision::Denied(DenialReason::Blacklisted);
        }

        if from_flags.frozen || to_flags.frozen {
            return TransferDecision::Denied(DenialReason::Frozen);
        }

        if self.whitelist_enabled && (!from_flags.whitelisted || !to_flags.whitelisted) {
            return TransferDecision::Denied(DenialReason::NotWhitelisted);
        }

        TransferDecision::Allowed
    }

    // =========================================================================
    // Mutations (role-gated)
    // =========================================================================

    /// Pause or unpause all transfers.
    ///
    /// Pausing requires `Pauser`; unpausing requires `Resumer`. The two are
    /// distinct so an emergency pause key cannot also lift the pause.
    pub fn set_paused(
        &mut self,
        caller: &Address,
        auth: &dyn AuthorizationProvider,
        value: bool,
    ) -> ComplianceResult<()> {
        let role = if value { Role::Pauser } else { Role::Resumer };
        self.require_role(auth, role, caller)?;

        self.paused = value;
        tracing::info!(%caller, paused = value, "transfer pause switched");
        Ok(())
    }

    /// Enable or disable whitelist mode (`Whitelister` role).
    pub fn set_whitelist_enabled(
        &mut self,
        caller: &Address,
        auth: &dyn AuthorizationProvider,
        value: bool,
    ) -> ComplianceResult<()> {
        self.require_role(auth, Role::Whitelister, caller)?;

        self.whitelist_enabled = value;
        tracing::info!(%caller, enabled = value, "whitelist mode switched");
        Ok(())
    }

    /// Set one flag on one address (kind-matching role).
    pub fn set_flag(
        &mut self,
        caller: &Address,
        auth: &dyn AuthorizationProvider,
        address: Address,
        kind: FlagKind,
        value: bool,
    ) -> ComplianceResult<()> {
        self.require_role(auth, kind.required_role(), caller)?;

        self.apply_flag(address, kind, value);
        tracing::info!(%caller, target = %address, ?kind, value, "compliance flag set");
        Ok(())
    }

    /// Set one flag on many addresses.
    ///
    /// The role check happens once, before any mutation, so an unauthorized
    /// caller changes nothing.
    pub fn batch_set_flag(
        &mut self,
        caller: &Address,
        auth: &dyn AuthorizationProvider,
        addresses: &[Address],
        kind: FlagKind,
        value: bool,
    ) -> ComplianceResult<()> {
        self.require_role(auth, kind.required_role(), caller)?;

        for address in addresses {
            self.apply_flag(*address, kind, value);
        }
        tracing::info!(%caller, count = addresses.len(), ?kind, value, "compliance flags batch set");
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Flags for an address (all-clear if never touched)
    pub fn flags_of(&self, address: &Address) -> AccountFlags {
        self.flags.get(address).copied().unwrap_or_default()
    }

    pub fn is_whitelisted(&self, address: &Address) -> bool {
        self.flags_of(address).whitelisted
    }

    pub fn is_blacklisted(&self, address: &Address) -> bool {
        self.flags_of(address).blacklisted
    }

    pub fn is_frozen(&self, address: &Address) -> bool {
        self.flags_of(address).frozen
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn whitelist_enabled(&self) -> bool {
        self.whitelist_enabled
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn require_role(
        &self,
        auth: &dyn AuthorizationProvider,
        role: Role,
        caller: &Address,
    ) -> ComplianceResult<()> {
        if auth.has_role(role, caller) {
            Ok(())
        } else {
            tracing::warn!(%caller, ?role, "compliance mutation rejected");
            Err(ComplianceError::Unauthorized {
                role,
                caller: *caller,
            })
        }
    }

    fn apply_flag(&mut self, address: Address, kind: FlagKind, value: bool) {
        let flags = self.flags.entry(address).or_default();
        match kind {
            FlagKind::Whitelisted => flags.whitelisted = value,
            FlagKind::Blacklisted => flags.blacklisted = value,
            FlagKind::Frozen => flags.frozen = value,
        }
        // Keep the map bounded by the set of flagged addresses.
        if flags.is_clear() {
            self.flags.remove(&address);
        }
    }
}
