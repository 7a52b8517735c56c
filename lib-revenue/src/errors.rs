//! Revenue Distribution Errors

use lib_types::{Address, Role, RoundId};
use thiserror::Error;

/// Failure reported by the external funds-custody collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Custody payout failed: {0}")]
pub struct VaultError(pub String);

/// Error during revenue operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RevenueError {
    #[error("Unauthorized: {caller} does not hold {role:?}")]
    Unauthorized { role: Role, caller: Address },

    #[error("Invalid amount: must be positive")]
    InvalidAmount,

    #[error("Cannot distribute against zero supply")]
    ZeroSupply,

    #[error("Revenue round not found: {0}")]
    RoundNotFound(RoundId),

    #[error("Round {round_id} already claimed by {account}")]
    AlreadyClaimed { round_id: RoundId, account: Address },

    #[error("Nothing to claim for round {round_id}")]
    NothingToClaim { round_id: RoundId },

    #[error(transparent)]
    Vault(#[from] VaultError),
}

/// Result type for revenue operations
pub type RevenueResult<T> = Result<T, RevenueError>;
