//! Patent Registry
//!
//! Weighted patent records keyed by their immutable id (the patent number).
//! Weights are advisory allocation hints in basis points; the registry does
//! not require them to sum to any particular total.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use lib_types::{Address, AuthorizationProvider, Bps, Role, Timestamp, UsdValue, MAX_BPS};

use crate::errors::{PatentError, PatentResult};

/// One patent backing the token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatentRecord {
    /// Unique, immutable identifier (e.g. the patent number)
    pub id: String,
    pub title: String,
    pub inventors: Vec<String>,
    /// Valuation in whole USD
    pub valuation_usd: UsdValue,
    /// Advisory allocation weight in basis points
    pub weight_bps: Bps,
    pub active: bool,
    /// Registration time; never changes after creation
    pub added_at: Timestamp,
    /// Opaque content-addressed reference to off-ledger documents
    pub metadata_ref: String,
}

/// Registry of backing patents
///
/// BTreeMap keeps iteration (and therefore pagination) deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatentRegistry {
    patents: BTreeMap<String, PatentRecord>,
}

impl PatentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Mutations (role `PatentManager`)
    // =========================================================================

    /// Register a new patent.
    ///
    /// Ids are never reused: registration fails with `DuplicateAsset` even
    /// if a record under the same id was deactivated long ago.
    #[allow(clippy::too_many_arguments)]
    pub fn add_patent(
        &mut self,
        caller: &Address,
        auth: &dyn AuthorizationProvider,
        id: impl Into<String>,
        title: impl Into<String>,
        inventors: Vec<String>,
        valuation_usd: UsdValue,
        weight_bps: Bps,
        metadata_ref: impl Into<String>,
        now: Timestamp,
    ) -> PatentResult<()> {
        self.require_role(auth, caller)?;

        let id = id.into();
        if self.patents.contains_key(&id) {
            return Err(PatentError::DuplicateAsset(id));
        }
        if weight_bps > MAX_BPS {
            return Err(PatentError::WeightOutOfRange { weight: weight_bps });
        }

        let record = PatentRecord {
            id: id.clone(),
            title: title.into(),
            inventors,
            valuation_usd,
            weight_bps,
            active: true,
            added_at: now,
            metadata_ref: metadata_ref.into(),
        };
        self.patents.insert(id.clone(), record);

        tracing::info!(%caller, patent = %id, valuation_usd, weight_bps, "patent registered");
        Ok(())
    }

    /// Overwrite valuation and weight of an active patent.
    ///
    /// `added_at` is untouched. Inactive or unknown ids fail with
    /// `AssetNotFound`.
    pub fn update_valuation(
        &mut self,
        caller: &Address,
        auth: &dyn AuthorizationProvider,
        id: &str,
        valuation_usd: UsdValue,
        weight_bps: Bps,
    ) -> PatentResult<()> {
        self.require_role(auth, caller)?;

        if weight_bps > MAX_BPS {
            return Err(PatentError::WeightOutOfRange { weight: weight_bps });
        }

        let record = self
            .patents
            .get_mut(id)
            .filter(|r| r.active)
            .ok_or_else(|| PatentError::AssetNotFound(id.to_string()))?;

        record.valuation_usd = valuation_usd;
        record.weight_bps = weight_bps;

        tracing::info!(%caller, patent = %id, valuation_usd, weight_bps, "patent revalued");
        Ok(())
    }

    /// Deactivate a patent, excluding it from valuation from now on.
    ///
    /// The record is retained for historical lookup.
    pub fn deactivate(
        &mut self,
        caller: &Address,
        auth: &dyn AuthorizationProvider,
        id: &str,
    ) -> PatentResult<()> {
        self.require_role(auth, caller)?;

        let record = self
            .patents
            .get_mut(id)
            .filter(|r| r.active)
            .ok_or_else(|| PatentError::AssetNotFound(id.to_string()))?;
        record.active = false;

        tracing::info!(%caller, patent = %id, "patent deactivated");
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Look up a record (active or not)
    pub fn get(&self, id: &str) -> Option<&PatentRecord> {
        self.patents.get(id)
    }

    /// Sum of active valuations.
    ///
    /// Widened to u128: individual valuations are u64 and the pool may hold
    /// many of them.
    pub fn total_valuation(&self) -> u128 {
        self.patents
            .values()
            .filter(|r| r.active)
            .map(|r| r.valuation_usd as u128)
            .sum()
    }

    /// Page through active patent ids in deterministic (lexicographic) order
    pub fn list_active(&self, offset: usize, limit: usize) -> Vec<String> {
        self.patents
            .values()
            .filter(|r| r.active)
            .skip(offset)
            .take(limit)
            .map(|r| r.id.clone())
            .collect()
    }

    /// Total records ever registered, active or not
    pub fn patent_count(&self) -> usize {
        self.patents.len()
    }

    pub fn active_count(&self) -> usize {
        self.patents.values().filter(|r| r.active).count()
    }

    fn require_role(
        &self,
        auth: &dyn AuthorizationProvider,
        caller: &Address,
    ) -> PatentResult<()> {
        if auth.has_role(Role::PatentManager, caller) {
            Ok(())
        } else {
            tracing::warn!(%caller, "patent mutation rejected");
            Err(PatentError::Unauthorized {
                role: Role::PatentManager,
                caller: *caller,
            })
        }
    }
}
