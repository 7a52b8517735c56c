//! Reserve Book and Backing Ratio
//!
//! External reserve instruments held against the token, keyed by an opaque
//! asset reference. Their aggregate USD value over the outstanding supply
//! gives the backing ratio reported to the UI.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use lib_types::{mul_div, Address, Amount, AuthorizationProvider, Role, UsdValue, RATIO_SCALE, TOKEN_SCALE};

use crate::errors::{PatentError, PatentResult};

/// One reserve instrument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveRecord {
    /// Opaque reference to the external instrument
    pub asset_ref: String,
    pub quantity: u128,
    /// Current value in whole USD
    pub value_usd: UsdValue,
}

/// Book of reserve instruments backing the token
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReserveBook {
    reserves: BTreeMap<String, ReserveRecord>,
}

impl ReserveBook {
    /// Create an empty book
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a reserve record (`ReserveManager` role)
    pub fn set_reserve(
        &mut self,
        caller: &Address,
        auth: &dyn AuthorizationProvider,
        asset_ref: impl Into<String>,
        quantity: u128,
        value_usd: UsdValue,
    ) -> PatentResult<()> {
        self.require_role(auth, caller)?;

        let asset_ref = asset_ref.into();
        self.reserves.insert(
            asset_ref.clone(),
            ReserveRecord {
                asset_ref: asset_ref.clone(),
                quantity,
                value_usd,
            },
        );

        tracing::info!(%caller, asset = %asset_ref, quantity, value_usd, "reserve updated");
        Ok(())
    }

    /// Drop a reserve record (`ReserveManager` role)
    pub fn remove_reserve(
        &mut self,
        caller: &Address,
        auth: &dyn AuthorizationProvider,
        asset_ref: &str,
    ) -> PatentResult<()> {
        self.require_role(auth, caller)?;

        if self.reserves.remove(asset_ref).is_none() {
            return Err(PatentError::AssetNotFound(asset_ref.to_string()));
        }

        tracing::info!(%caller, asset = %asset_ref, "reserve removed");
        Ok(())
    }

    /// Look up a reserve record
    pub fn get(&self, asset_ref: &str) -> Option<&ReserveRecord> {
        self.reserves.get(asset_ref)
    }

    /// Aggregate USD value across all reserve instruments
    pub fn total_reserve_value_usd(&self) -> u128 {
        self.reserves
            .values()
            .map(|r| r.value_usd as u128)
            .sum()
    }

    pub fn len(&self) -> usize {
        self.reserves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reserves.is_empty()
    }

    fn require_role(
        &self,
        auth: &dyn AuthorizationProvider,
        caller: &Address,
    ) -> PatentResult<()> {
        if auth.has_role(Role::ReserveManager, caller) {
            Ok(())
        } else {
            tracing::warn!(%caller, "reserve mutation rejected");
            Err(PatentError::Unauthorized {
                role: Role::ReserveManager,
                caller: *caller,
            })
        }
    }
}

/// Backing ratio at `RATIO_SCALE` fixed point.
///
/// `RATIO_SCALE` means exactly one USD of reserve per whole token
/// outstanding. Zero supply yields zero (never a division by zero); an
/// unrepresentable quotient saturates to `u128::MAX` on this read-only
/// reporting path.
pub fn backing_ratio(total_reserve_usd: u128, total_supply: Amount) -> Amount {
    if total_supply == 0 {
        return 0;
    }
    mul_div(total_reserve_usd, RATIO_SCALE * TOKEN_SCALE, total_supply).unwrap_or(u128::MAX)
}
