//! IP Coin Shared Types
//!
//! This crate defines the primitive types and capabilities every other core
//! crate builds on.
//!
//! # Key Types
//!
//! - [`Address`]: 32-byte account identifier
//! - [`Amount`]: token amounts at a fixed 18-decimal scale
//! - [`Role`] / [`AuthorizationProvider`]: the injected authorization seam
//! - [`math::mul_div`]: overflow-safe multiply-then-divide
//!
//! Role storage itself is a collaborator concern; [`RoleRegistry`] is the
//! in-process implementation used by tests and single-process deployments.

pub mod auth;
pub mod math;
pub mod primitives;

pub use auth::{AuthorizationProvider, Role, RoleRegistry};
pub use math::mul_div;
pub use primitives::*;
