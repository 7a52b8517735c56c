//! IP Coin Compliance Gate
//!
//! Single source of truth for "may address A transfer to address B".
//!
//! The gate holds per-address flags (whitelisted, blacklisted, frozen) and
//! two process-wide switches (pause, whitelist mode). It never touches
//! balances; the ledger consults [`ComplianceGate::authorize_transfer`]
//! before moving anything.
//!
//! Decision priority is fixed: pause, then blacklist, then freeze, then
//! whitelist. A whitelisted address cannot escape a block.

pub mod errors;
pub mod gate;

pub use errors::{ComplianceError, ComplianceResult};
pub use gate::{AccountFlags, ComplianceGate, DenialReason, FlagKind, TransferDecision};
