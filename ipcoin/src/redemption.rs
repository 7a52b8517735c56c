//! Redemption Requests
//!
//! Holders request to redeem tokens against a reserve instrument; an
//! operator settles (burning the tokens and paying out the pro-rata reserve
//! value) or the request is cancelled. Requests do not escrow tokens:
//! settlement re-validates balance and compliance, so a requester who spends
//! the tokens in the meantime simply fails at settlement.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use lib_revenue::VaultError;
use lib_types::{Address, Amount, Timestamp};

/// Custody collaborator paying out reserve value at settlement
pub trait ReserveCustody {
    /// Pay `value_usd` of the instrument behind `asset_ref` to `to`
    fn payout_reserve(
        &mut self,
        asset_ref: &str,
        to: &Address,
        value_usd: u128,
    ) -> Result<(), VaultError>;
}

/// Lifecycle of a redemption request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RedemptionStatus {
    Pending,
    Settled,
    Cancelled,
}

/// One redemption request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionRequest {
    /// Sequential id, first request is 1
    pub id: u64,
    pub account: Address,
    pub amount: Amount,
    /// Reserve instrument the holder wants to redeem into
    pub asset_ref: String,
    pub requested_at: Timestamp,
    pub status: RedemptionStatus,
}

/// Error during redemption queue operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RedemptionError {
    #[error("Redemption request not found: {0}")]
    NotFound(u64),

    #[error("Redemption request {0} is not pending")]
    NotPending(u64),
}

/// Queue of redemption requests
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RedemptionQueue {
    requests: BTreeMap<u64, RedemptionRequest>,
    last_id: u64,
}

impl RedemptionQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new pending request, returning its id
    pub fn create(
        &mut self,
        account: Address,
        amount: Amount,
        asset_ref: impl Into<String>,
        now: Timestamp,
    ) -> u64 {
        let id = self.last_id + 1;
        self.last_id = id;
        self.requests.insert(
            id,
            RedemptionRequest {
                id,
                account,
                amount,
                asset_ref: asset_ref.into(),
                requested_at: now,
                status: RedemptionStatus::Pending,
            },
        );
        id
    }

    pub fn get(&self, id: u64) -> Option<&RedemptionRequest> {
        self.requests.get(&id)
    }

    /// Mark a pending request settled
    pub fn mark_settled(&mut self, id: u64) -> Result<(), RedemptionError> {
        self.transition(id, RedemptionStatus::Settled)
    }

    /// Mark a pending request cancelled
    pub fn mark_cancelled(&mut self, id: u64) -> Result<(), RedemptionError> {
        self.transition(id, RedemptionStatus::Cancelled)
    }

    /// Ids of all pending requests in creation order
    pub fn pending_ids(&self) -> Vec<u64> {
        self.requests
            .values()
            .filter(|r| r.status == RedemptionStatus::Pending)
            .map(|r| r.id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    fn transition(&mut self, id: u64, to: RedemptionStatus) -> Result<(), RedemptionError> {
        let request = self
            .requests
            .get_mut(&id)
            .ok_or(RedemptionError::NotFound(id))?;
        if request.status != RedemptionStatus::Pending {
            return Err(RedemptionError::NotPending(id));
        }
        request.status = to;
        Ok(())
    }
}
