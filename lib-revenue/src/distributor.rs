//! Revenue Rounds and Claims
//!
//! Rounds are append-only and immutable; claim records are created lazily on
//! first claim. The claimed flag is set before the custody payout runs, so a
//! re-entrant claim observes it; if the payout fails the flag is rolled back
//! and the error surfaced.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use lib_types::{mul_div, Address, Amount, AuthorizationProvider, Role, RoundId, Timestamp};

use crate::errors::{RevenueError, RevenueResult, VaultError};

/// Funds-custody collaborator.
///
/// `distribute` assumes the round's funds are already held in custody; the
/// distributor never pulls them. Claims pay out through this trait.
pub trait RevenueVault {
    /// Transfer `amount` of `token` from custody to `to`
    fn payout(&mut self, token: &Address, to: &Address, amount: Amount) -> Result<(), VaultError>;
}

/// One immutable distribution round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueRound {
    /// Sequential id, first round is 1, never reused
    pub round_id: RoundId,
    /// Revenue deposited for this round
    pub total_amount: Amount,
    /// Token the revenue is denominated in
    pub revenue_token: Address,
    /// Total token supply at round creation
    pub total_supply_snapshot: Amount,
    pub timestamp: Timestamp,
}

/// Round ledger and claim state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RevenueDistributor {
    rounds: BTreeMap<RoundId, RevenueRound>,
    claims: BTreeMap<(RoundId, Address), bool>,
    last_round_id: RoundId,
}

impl RevenueDistributor {
    /// Create a distributor with no rounds
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Create a new round (`RevenueManager` role).
    ///
    /// Snapshots `total_supply` as passed by the ledger at call time. The
    /// round is immutable from here on.
    pub fn distribute(
        &mut self,
        caller: &Address,
        auth: &dyn AuthorizationProvider,
        total_amount: Amount,
        revenue_token: Address,
        total_supply: Amount,
        now: Timestamp,
    ) -> RevenueResult<RoundId> {
        if !auth.has_role(Role::RevenueManager, caller) {
            tracing::warn!(%caller, "revenue distribution rejected");
            return Err(RevenueError::Unauthorized {
                role: Role::RevenueManager,
                caller: *caller,
            });
        }
        if total_amount == 0 {
            return Err(RevenueError::InvalidAmount);
        }
        if total_supply == 0 {
            return Err(RevenueError::ZeroSupply);
        }

        let round_id = self.last_round_id + 1;
        self.rounds.insert(
            round_id,
            RevenueRound {
                round_id,
                total_amount,
                revenue_token,
                total_supply_snapshot: total_supply,
                timestamp: now,
            },
        );
        self.last_round_id = round_id;

        tracing::info!(
            %caller,
            round_id,
            total_amount,
            token = %revenue_token,
            supply_snapshot = total_supply,
            "revenue round created"
        );
        Ok(round_id)
    }

    /// Claim an account's share of a round, paying out through `vault`.
    ///
    /// Returns the amount paid. Fails with `AlreadyClaimed` on a second
    /// attempt and with `NothingToClaim` when the computed share is zero.
    pub fn claim(
        &mut self,
        round_id: RoundId,
        account: Address,
        balance_now: Amount,
        vault: &mut dyn RevenueVault,
    ) -> RevenueResult<Amount> {
        let round = self
            .rounds
            .get(&round_id)
            .ok_or(RevenueError::RoundNotFound(round_id))?;

        if self.has_claimed(round_id, &account) {
            return Err(RevenueError::AlreadyClaimed { round_id, account });
        }

        let amount = pro_rata(balance_now, round);
        if amount == 0 {
            return Err(RevenueError::NothingToClaim { round_id });
        }

        let token = round.revenue_token;

        // Mark claimed before the payout side effect so a re-entrant claim
        // sees the flag; roll back if custody refuses.
        self.claims.insert((round_id, account), true);
        if let Err(err) = vault.payout(&token, &account, amount) {
            self.claims.remove(&(round_id, account));
            return Err(err.into());
        }

        tracing::info!(round_id, %account, amount, "revenue claimed");
        Ok(amount)
    }

    /// Claim several rounds in sequence.
    ///
    /// Each round is an independent unit of work: a failure is reported in
    /// that round's slot and the batch continues.
    pub fn claim_many(
        &mut self,
        round_ids: &[RoundId],
        account: Address,
        balance_now: Amount,
        vault: &mut dyn RevenueVault,
    ) -> Vec<(RoundId, RevenueResult<Amount>)> {
        round_ids
            .iter()
            .map(|&round_id| (round_id, self.claim(round_id, account, balance_now, vault)))
            .collect()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Pure claimable computation: `floor(balance * total / snapshot)`.
    ///
    /// Zero if the round is unknown or the account already claimed. Uses the
    /// balance supplied by the caller at call time, not any historical
    /// account snapshot.
    pub fn claimable(&self, round_id: RoundId, account: &Address, balance_now: Amount) -> Amount {
        match self.rounds.get(&round_id) {
            Some(round) if !self.has_claimed(round_id, account) => pro_rata(balance_now, round),
            _ => 0,
        }
    }

    pub fn has_claimed(&self, round_id: RoundId, account: &Address) -> bool {
        self.claims
            .get(&(round_id, *account))
            .copied()
            .unwrap_or(false)
    }

    /// Look up a round (immutable once created)
    pub fn round(&self, round_id: RoundId) -> Option<&RevenueRound> {
        self.rounds.get(&round_id)
    }

    /// Id of the most recent round, 0 before the first distribution
    pub fn current_round_id(&self) -> RoundId {
        self.last_round_id
    }

    /// Total revenue deposited across all rounds
    pub fn total_distributed(&self) -> Amount {
        self.rounds
            .values()
            .fold(0u128, |acc, r| acc.saturating_add(r.total_amount))
    }
}

/// Pro-rata share of a round for a balance.
///
/// An unrepresentable quotient is treated as nothing claimable; safety-biased
/// for an accounting path that must never over-pay.
fn pro_rata(balance: Amount, round: &RevenueRound) -> Amount {
    mul_div(balance, round.total_amount, round.total_supply_snapshot).unwrap_or(0)
}
