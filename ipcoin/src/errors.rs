//! Core Errors
//!
//! One error type for the facade so callers see a single taxonomy; the
//! component errors pass through unchanged and stay matchable.

use lib_compliance::ComplianceError;
use lib_ledger::LedgerError;
use lib_patents::PatentError;
use lib_revenue::RevenueError;
use lib_types::{Address, Role};
use thiserror::Error;

use crate::redemption::RedemptionError;

/// Error during core operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error(transparent)]
    Compliance(#[from] ComplianceError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Patent(#[from] PatentError),

    #[error(transparent)]
    Revenue(#[from] RevenueError),

    #[error(transparent)]
    Redemption(#[from] RedemptionError),

    #[error("Unauthorized: {caller} does not hold {role:?}")]
    Unauthorized { role: Role, caller: Address },
}

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;
