//! IP Coin Core
//!
//! The accounting and authorization engine beneath the IP Coin UI: a
//! supply-conserving ledger with rate-limited issuance, a compliance gate in
//! front of every transfer, a weighted patent registry valuing the backing
//! pool, and a round-based revenue distributor with idempotent claims.
//!
//! # Execution model
//!
//! [`TokenCore`] is a single sequential state machine: each mutating
//! operation validates fully, then commits atomically. [`SharedCore`] wraps
//! it behind a lock for runtimes with multiple callers.
//!
//! # Collaborators
//!
//! Role storage ([`lib_types::AuthorizationProvider`]), revenue custody
//! ([`lib_revenue::RevenueVault`]) and reserve custody
//! ([`redemption::ReserveCustody`]) are injected traits; the core never
//! implements them.
//!
//! ```ignore
//! use std::sync::Arc;
//! use ipcoin::{CoreConfig, TokenCore};
//! use lib_types::{Address, Role, RoleRegistry};
//!
//! let mut roles = RoleRegistry::new();
//! roles.grant(Role::Minter, Address::new([1u8; 32]));
//! let core = TokenCore::new(CoreConfig::default(), Arc::new(roles))?;
//! ```

pub mod audit;
pub mod config;
pub mod core;
pub mod errors;
pub mod redemption;

pub use audit::{AuditEvent, AuditLog, AuditRecord};
pub use config::CoreConfig;
pub use core::{system_now, PatentStats, RevenueInfo, SharedCore, TokenCore, TokenInfo};
pub use errors::{CoreError, CoreResult};
pub use redemption::{
    RedemptionError, RedemptionQueue, RedemptionRequest, RedemptionStatus, ReserveCustody,
};
