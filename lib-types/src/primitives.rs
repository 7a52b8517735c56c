//! Canonical Primitive Types for the IP Coin Ledger
//!
//! Rule: no floating point anywhere near balances or valuations.
//!
//! These types are the foundational building blocks for all ledger state.
//! They are designed to be:
//! - Fixed-size (no dynamic allocation)
//! - Deterministically serializable
//! - Efficient to copy and compare

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// TYPE ALIASES
// ============================================================================

/// Token amounts in raw 18-decimal units
pub type Amount = u128;

/// USD valuations in whole currency units (unscaled)
pub type UsdValue = u64;

/// Basis points for weight calculations (10000 = 100%)
pub type Bps = u16;

/// Seconds since the Unix epoch
pub type Timestamp = u64;

/// Sequential revenue round identifier (first round is 1)
pub type RoundId = u64;

// ============================================================================
// SCALES & CONSTANTS
// ============================================================================

/// Maximum basis points (100%)
pub const MAX_BPS: Bps = 10_000;

/// Raw units per whole token (18 decimals)
pub const TOKEN_SCALE: Amount = 1_000_000_000_000_000_000;

/// Fixed-point scale for the backing ratio: `RATIO_SCALE` == 1.0,
/// i.e. one USD of reserve per whole token outstanding.
pub const RATIO_SCALE: Amount = 1_000_000_000_000_000_000;

/// Length of a UTC day window for mint/burn ceilings
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Map a timestamp to its UTC day window index.
///
/// Daily mint/burn counters reset whenever this index changes; the reset is
/// lazy (computed on access), never timer-driven.
pub const fn day_index(ts: Timestamp) -> u64 {
    ts / SECONDS_PER_DAY
}

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// 32-byte account address
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, Default)]
pub struct Address(pub [u8; 32]);

impl Address {
    /// Create a new Address from raw bytes
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Create a zeroed Address
    pub const fn zero() -> Self {
        Self([0u8; 32])
    }

    /// Get the underlying bytes
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Check if this is the zero address
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl From<[u8; 32]> for Address {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// ============================================================================
// TESTS
// ============================================================================
