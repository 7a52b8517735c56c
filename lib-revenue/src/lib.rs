//! IP Coin Revenue Distribution
//!
//! Revenue arrives in rounds. Each round snapshots the total supply at
//! creation time and is immutable afterwards; every account may claim its
//! pro-rata share of a round exactly once.
//!
//! The claimable amount is computed from the account's balance *at claim
//! time* against the round's supply snapshot. Funds movement itself is a
//! custody collaborator behind [`RevenueVault`]; the distributor only
//! accounts for who may claim how much.

pub mod distributor;
pub mod errors;

pub use distributor::{RevenueDistributor, RevenueRound, RevenueVault};
pub use errors::{RevenueError, RevenueResult, VaultError};
