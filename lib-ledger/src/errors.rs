//! Token Ledger Errors

use lib_compliance::DenialReason;
use lib_types::{Address, Amount, Role};
use thiserror::Error;

/// Error during ledger operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Unauthorized: {caller} does not hold {role:?}")]
    Unauthorized { role: Role, caller: Address },

    #[error("Invalid amount: must be positive")]
    InvalidAmount,

    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: Amount, need: Amount },

    #[error("Max supply exceeded: max {max}, would have {would_have}")]
    ExceedsMaxSupply { max: Amount, would_have: Amount },

    #[error("Daily mint limit exceeded: limit {limit}, minted today {used}, requested {requested}")]
    ExceedsDailyMintLimit {
        limit: Amount,
        used: Amount,
        requested: Amount,
    },

    #[error("Daily burn limit exceeded: limit {limit}, burned today {used}, requested {requested}")]
    ExceedsDailyBurnLimit {
        limit: Amount,
        used: Amount,
        requested: Amount,
    },

    #[error("Transfer denied: {0}")]
    TransferDenied(DenialReason),

    #[error("Arithmetic overflow")]
    Overflow,
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
