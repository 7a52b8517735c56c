//! IP Coin Backing Assets
//!
//! Registry of the patents backing the token and the reserve instruments
//! held against it. Used only for valuation and backing-ratio reporting;
//! transfer authorization never consults this crate.
//!
//! Patent records are never physically deleted. Deactivation excludes a
//! record from valuation while preserving it for historical lookup, and its
//! id can never be registered again.

pub mod errors;
pub mod registry;
pub mod reserves;

pub use errors::{PatentError, PatentResult};
pub use registry::{PatentRecord, PatentRegistry};
pub use reserves::{backing_ratio, ReserveBook, ReserveRecord};
