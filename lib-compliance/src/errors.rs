//! Compliance Gate Errors

use lib_types::{Address, Role};
use thiserror::Error;

/// Error during compliance gate mutations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComplianceError {
    #[error("Unauthorized: {caller} does not hold {role:?}")]
    Unauthorized { role: Role, caller: Address },
}

/// Result type for compliance operations
pub type ComplianceResult<T> = Result<T, ComplianceError>;
