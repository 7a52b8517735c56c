//! Backing Asset Errors

use lib_types::{Address, Bps, Role};
use thiserror::Error;

/// Error during patent registry or reserve book operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatentError {
    #[error("Unauthorized: {caller} does not hold {role:?}")]
    Unauthorized { role: Role, caller: Address },

    #[error("Duplicate asset id: {0}")]
    DuplicateAsset(String),

    #[error("Asset not found or inactive: {0}")]
    AssetNotFound(String),

    #[error("Weight out of range: {weight} bps exceeds 10000")]
    WeightOutOfRange { weight: Bps },
}

/// Result type for backing asset operations
pub type PatentResult<T> = Result<T, PatentError>;
