//! IP Coin Token Ledger
//!
//! Supply-conserving balance ledger with rate-limited issuance.
//!
//! # Invariants
//!
//! - `sum(balances) == total_supply` after every successful operation
//! - `total_supply <= max_supply` always
//! - Mint and burn are each capped per UTC day window; the counters reset
//!   lazily when a new day index is observed
//!
//! Every operation validates fully before mutating anything, so a failed
//! call leaves the ledger untouched.

pub mod errors;
pub mod ledger;
pub mod limits;

pub use errors::{LedgerError, LedgerResult};
pub use ledger::TokenLedger;
pub use limits::DayWindow;
