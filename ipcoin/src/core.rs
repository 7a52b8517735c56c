//! Token Core
//!
//! One owned state struct behind a single mutation entry point. Every
//! operation authorizes against the injected [`AuthorizationProvider`],
//! validates fully, commits, then appends one audit record. [`SharedCore`]
//! wraps the core in an exclusive lock for multi-caller runtimes: mutations
//! hold the write lock for their full duration, reads share the read lock
//! and never observe a half-committed write.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use lib_compliance::{ComplianceGate, FlagKind, TransferDecision};
use lib_ledger::{LedgerError, TokenLedger};
use lib_patents::{backing_ratio, PatentError, PatentRegistry, ReserveBook};
use lib_revenue::{RevenueDistributor, RevenueVault};
use lib_types::{
    mul_div, Address, Amount, AuthorizationProvider, Bps, Role, RoundId, Timestamp, UsdValue,
};

use crate::audit::{AuditEvent, AuditLog};
use crate::config::CoreConfig;
use crate::errors::{CoreError, CoreResult};
use crate::redemption::{RedemptionError, RedemptionQueue, RedemptionStatus, ReserveCustody};

// =============================================================================
// READ-SURFACE VIEWS
// =============================================================================

/// Token identity and supply snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: Amount,
    pub max_supply: Amount,
}

/// Backing pool snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatentStats {
    pub patent_count: usize,
    pub active_patents: usize,
    pub total_valuation_usd: u128,
    pub total_reserve_value_usd: u128,
    pub backing_ratio: Amount,
}

/// Revenue snapshot for one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueInfo {
    pub current_round: RoundId,
    pub total_distributed: Amount,
    /// Claimable from the current round at the account's present balance
    pub claimable: Amount,
    pub has_claimed: bool,
}

// =============================================================================
// CORE
// =============================================================================

/// The accounting and authorization engine
pub struct TokenCore {
    gate: ComplianceGate,
    ledger: TokenLedger,
    patents: PatentRegistry,
    reserves: ReserveBook,
    revenue: RevenueDistributor,
    redemptions: RedemptionQueue,
    audit: AuditLog,
    auth: Arc<dyn AuthorizationProvider + Send + Sync>,
}

impl TokenCore {
    /// Build a core from validated configuration and an authorization
    /// collaborator.
    pub fn new(
        config: CoreConfig,
        auth: Arc<dyn AuthorizationProvider + Send + Sync>,
    ) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self {
            gate: ComplianceGate::new(),
            ledger: TokenLedger::new(
                config.name,
                config.symbol,
                config.decimals,
                config.max_supply,
                config.daily_mint_limit,
                config.daily_burn_limit,
            ),
            patents: PatentRegistry::new(),
            reserves: ReserveBook::new(),
            revenue: RevenueDistributor::new(),
            redemptions: RedemptionQueue::new(),
            audit: AuditLog::new(),
            auth,
        })
    }

    // =========================================================================
    // Compliance operations
    // =========================================================================

    pub fn set_paused(&mut self, caller: Address, value: bool, now: Timestamp) -> CoreResult<()> {
        self.gate.set_paused(&caller, &*self.auth, value)?;
        let event = if value {
            AuditEvent::ContractPaused
        } else {
            AuditEvent::ContractUnpaused
        };
        self.audit.record(now, caller, event);
        Ok(())
    }

    pub fn set_whitelist_enabled(
        &mut self,
        caller: Address,
        value: bool,
        now: Timestamp,
    ) -> CoreResult<()> {
        self.gate.set_whitelist_enabled(&caller, &*self.auth, value)?;
        self.audit
            .record(now, caller, AuditEvent::WhitelistModeSet { enabled: value });
        Ok(())
    }

    pub fn set_flag(
        &mut self,
        caller: Address,
        address: Address,
        kind: FlagKind,
        value: bool,
        now: Timestamp,
    ) -> CoreResult<()> {
        self.gate
            .set_flag(&caller, &*self.auth, address, kind, value)?;
        self.audit.record(
            now,
            caller,
            AuditEvent::FlagSet {
                address,
                kind,
                value,
            },
        );
        Ok(())
    }

    pub fn batch_set_flag(
        &mut self,
        caller: Address,
        addresses: &[Address],
        kind: FlagKind,
        value: bool,
        now: Timestamp,
    ) -> CoreResult<()> {
        self.gate
            .batch_set_flag(&caller, &*self.auth, addresses, kind, value)?;
        self.audit.record(
            now,
            caller,
            AuditEvent::FlagsBatchSet {
                addresses: addresses.to_vec(),
                kind,
                value,
            },
        );
        Ok(())
    }

    /// Dry-run the compliance decision without touching anything
    pub fn authorize_transfer(&self, from: &Address, to: &Address) -> TransferDecision {
        self.gate.authorize_transfer(from, to)
    }

    // =========================================================================
    // Ledger operations
    // =========================================================================

    pub fn mint(
        &mut self,
        caller: Address,
        to: Address,
        amount: Amount,
        now: Timestamp,
    ) -> CoreResult<()> {
        self.ledger.mint(&caller, &*self.auth, to, amount, now)?;
        self.audit
            .record(now, caller, AuditEvent::TokensMinted { to, amount });
        Ok(())
    }

    pub fn burn(
        &mut self,
        caller: Address,
        from: Address,
        amount: Amount,
        now: Timestamp,
    ) -> CoreResult<()> {
        self.ledger.burn(&caller, &*self.auth, from, amount, now)?;
        self.audit
            .record(now, caller, AuditEvent::TokensBurned { from, amount });
        Ok(())
    }

    pub fn transfer(
        &mut self,
        from: Address,
        to: Address,
        amount: Amount,
        now: Timestamp,
    ) -> CoreResult<()> {
        self.ledger.transfer(&self.gate, from, to, amount)?;
        self.audit
            .record(now, from, AuditEvent::TokensTransferred { from, to, amount });
        Ok(())
    }

    pub fn set_daily_limits(
        &mut self,
        caller: Address,
        mint_limit: Amount,
        burn_limit: Amount,
        now: Timestamp,
    ) -> CoreResult<()> {
        self.ledger
            .set_daily_limits(&caller, &*self.auth, mint_limit, burn_limit)?;
        self.audit.record(
            now,
            caller,
            AuditEvent::DailyLimitsSet {
                mint_limit,
                burn_limit,
            },
        );
        Ok(())
    }

    // =========================================================================
    // Patent and reserve operations
    // =========================================================================

    #[allow(clippy::too_many_arguments)]
    pub fn add_patent(
        &mut self,
        caller: Address,
        id: &str,
        title: &str,
        inventors: Vec<String>,
        valuation_usd: UsdValue,
        weight_bps: Bps,
        metadata_ref: &str,
        now: Timestamp,
    ) -> CoreResult<()> {
        self.patents.add_patent(
            &caller,
            &*self.auth,
            id,
            title,
            inventors,
            valuation_usd,
            weight_bps,
            metadata_ref,
            now,
        )?;
        self.audit
            .record(now, caller, AuditEvent::PatentAdded { id: id.to_string() });
        Ok(())
    }

    pub fn update_patent_valuation(
        &mut self,
        caller: Address,
        id: &str,
        valuation_usd: UsdValue,
        weight_bps: Bps,
        now: Timestamp,
    ) -> CoreResult<()> {
        self.patents
            .update_valuation(&caller, &*self.auth, id, valuation_usd, weight_bps)?;
        self.audit
            .record(now, caller, AuditEvent::PatentUpdated { id: id.to_string() });
        Ok(())
    }

    pub fn deactivate_patent(
        &mut self,
        caller: Address,
        id: &str,
        now: Timestamp,
    ) -> CoreResult<()> {
        self.patents.deactivate(&caller, &*self.auth, id)?;
        self.audit.record(
            now,
            caller,
            AuditEvent::PatentDeactivated { id: id.to_string() },
        );
        Ok(())
    }

    pub fn set_reserve(
        &mut self,
        caller: Address,
        asset_ref: &str,
        quantity: u128,
        value_usd: UsdValue,
        now: Timestamp,
    ) -> CoreResult<()> {
        self.reserves
            .set_reserve(&caller, &*self.auth, asset_ref, quantity, value_usd)?;
        self.audit.record(
            now,
            caller,
            AuditEvent::ReserveSet {
                asset_ref: asset_ref.to_string(),
            },
        );
        Ok(())
    }

    pub fn remove_reserve(
        &mut self,
        caller: Address,
        asset_ref: &str,
        now: Timestamp,
    ) -> CoreResult<()> {
        self.reserves.remove_reserve(&caller, &*self.auth, asset_ref)?;
        self.audit.record(
            now,
            caller,
            AuditEvent::ReserveRemoved {
                asset_ref: asset_ref.to_string(),
            },
        );
        Ok(())
    }

    // =========================================================================
    // Revenue operations
    // =========================================================================

    /// Create a revenue round against the current total supply.
    ///
    /// Precondition (custody collaborator contract): the revenue funds are
    /// already held where [`TokenCore::claim_revenue`] can pay them out.
    pub fn distribute_revenue(
        &mut self,
        caller: Address,
        total_amount: Amount,
        revenue_token: Address,
        now: Timestamp,
    ) -> CoreResult<RoundId> {
        let supply = self.ledger.total_supply();
        let round_id = self.revenue.distribute(
            &caller,
            &*self.auth,
            total_amount,
            revenue_token,
            supply,
            now,
        )?;
        self.audit.record(
            now,
            caller,
            AuditEvent::RevenueDistributed {
                round_id,
                total_amount,
                revenue_token,
                total_supply_snapshot: supply,
            },
        );
        Ok(round_id)
    }

    /// Claim an account's share of a round at its present balance.
    pub fn claim_revenue(
        &mut self,
        account: Address,
        round_id: RoundId,
        vault: &mut dyn RevenueVault,
        now: Timestamp,
    ) -> CoreResult<Amount> {
        let balance = self.ledger.balance_of(&account);
        let amount = self.revenue.claim(round_id, account, balance, vault)?;
        self.audit.record(
            now,
            account,
            AuditEvent::RevenueClaimed {
                round_id,
                account,
                amount,
            },
        );
        Ok(amount)
    }

    /// Claim several rounds; each round succeeds or fails independently.
    pub fn claim_many_revenue(
        &mut self,
        account: Address,
        round_ids: &[RoundId],
        vault: &mut dyn RevenueVault,
        now: Timestamp,
    ) -> Vec<(RoundId, CoreResult<Amount>)> {
        round_ids
            .iter()
            .map(|&round_id| (round_id, self.claim_revenue(account, round_id, vault, now)))
            .collect()
    }

    // =========================================================================
    // Redemption operations
    // =========================================================================

    /// File a redemption request. Tokens are not escrowed; balance and
    /// compliance are re-validated at settlement.
    pub fn request_redemption(
        &mut self,
        account: Address,
        amount: Amount,
        asset_ref: &str,
        now: Timestamp,
    ) -> CoreResult<u64> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount.into());
        }
        if let TransferDecision::Denied(reason) = self.gate.authorize_transfer(&account, &account)
        {
            return Err(LedgerError::TransferDenied(reason).into());
        }
        let have = self.ledger.balance_of(&account);
        if have < amount {
            return Err(LedgerError::InsufficientBalance { have, need: amount }.into());
        }
        if self.reserves.get(asset_ref).is_none() {
            return Err(PatentError::AssetNotFound(asset_ref.to_string()).into());
        }

        let id = self.redemptions.create(account, amount, asset_ref, now);
        self.audit.record(
            now,
            account,
            AuditEvent::RedemptionRequested {
                id,
                account,
                amount,
                asset_ref: asset_ref.to_string(),
            },
        );
        Ok(id)
    }

    /// Settle a pending request: burn the tokens and pay out the pro-rata
    /// reserve value (`RedemptionManager` role; the burn also requires the
    /// caller to hold `Burner`).
    ///
    /// Returns the USD value paid out.
    pub fn settle_redemption(
        &mut self,
        caller: Address,
        id: u64,
        custody: &mut dyn ReserveCustody,
        now: Timestamp,
    ) -> CoreResult<u128> {
        if !self.auth.has_role(Role::RedemptionManager, &caller) {
            return Err(CoreError::Unauthorized {
                role: Role::RedemptionManager,
                caller,
            });
        }

        let request = self
            .redemptions
            .get(id)
            .ok_or(RedemptionError::NotFound(id))?;
        if request.status != RedemptionStatus::Pending {
            return Err(RedemptionError::NotPending(id).into());
        }
        let account = request.account;
        let amount = request.amount;
        let asset_ref = request.asset_ref.clone();

        // Validate every burn precondition up front so the custody payout
        // below is never followed by a failed burn.
        if let TransferDecision::Denied(reason) = self.gate.authorize_transfer(&account, &account)
        {
            return Err(LedgerError::TransferDenied(reason).into());
        }
        if !self.auth.has_role(Role::Burner, &caller) {
            return Err(LedgerError::Unauthorized {
                role: Role::Burner,
                caller,
            }
            .into());
        }
        let have = self.ledger.balance_of(&account);
        if have < amount {
            return Err(LedgerError::InsufficientBalance { have, need: amount }.into());
        }
        let used = self.ledger.burned_today(now);
        if used.saturating_add(amount) > self.ledger.daily_burn_limit() {
            return Err(LedgerError::ExceedsDailyBurnLimit {
                limit: self.ledger.daily_burn_limit(),
                used,
                requested: amount,
            }
            .into());
        }

        // Pro-rata share of the reserve pool at pre-burn supply.
        let value_usd = mul_div(
            amount,
            self.reserves.total_reserve_value_usd(),
            self.ledger.total_supply(),
        )
        .unwrap_or(0);

        custody
            .payout_reserve(&asset_ref, &account, value_usd)
            .map_err(lib_revenue::RevenueError::from)?;

        self.ledger.burn(&caller, &*self.auth, account, amount, now)?;
        self.redemptions.mark_settled(id)?;

        self.audit
            .record(now, caller, AuditEvent::RedemptionSettled { id, value_usd });
        Ok(value_usd)
    }

    /// Cancel a pending request (the requester or a `RedemptionManager`).
    pub fn cancel_redemption(&mut self, caller: Address, id: u64, now: Timestamp) -> CoreResult<()> {
        let request = self
            .redemptions
            .get(id)
            .ok_or(RedemptionError::NotFound(id))?;
        if caller != request.account && !self.auth.has_role(Role::RedemptionManager, &caller) {
            return Err(CoreError::Unauthorized {
                role: Role::RedemptionManager,
                caller,
            });
        }

        self.redemptions.mark_cancelled(id)?;
        self.audit
            .record(now, caller, AuditEvent::RedemptionCancelled { id });
        Ok(())
    }

    // =========================================================================
    // Read surface
    // =========================================================================

    pub fn token_info(&self) -> TokenInfo {
        TokenInfo {
            name: self.ledger.name().to_string(),
            symbol: self.ledger.symbol().to_string(),
            decimals: self.ledger.decimals(),
            total_supply: self.ledger.total_supply(),
            max_supply: self.ledger.max_supply(),
        }
    }

    pub fn patent_stats(&self) -> PatentStats {
        let total_reserve = self.reserves.total_reserve_value_usd();
        PatentStats {
            patent_count: self.patents.patent_count(),
            active_patents: self.patents.active_count(),
            total_valuation_usd: self.patents.total_valuation(),
            total_reserve_value_usd: total_reserve,
            backing_ratio: backing_ratio(total_reserve, self.ledger.total_supply()),
        }
    }

    pub fn revenue_info(&self, account: &Address) -> RevenueInfo {
        let current = self.revenue.current_round_id();
        let balance = self.ledger.balance_of(account);
        RevenueInfo {
            current_round: current,
            total_distributed: self.revenue.total_distributed(),
            claimable: self.revenue.claimable(current, account, balance),
            has_claimed: self.revenue.has_claimed(current, account),
        }
    }

    pub fn backing_ratio(&self) -> Amount {
        backing_ratio(
            self.reserves.total_reserve_value_usd(),
            self.ledger.total_supply(),
        )
    }

    pub fn balance_of(&self, address: &Address) -> Amount {
        self.ledger.balance_of(address)
    }

    pub fn total_supply(&self) -> Amount {
        self.ledger.total_supply()
    }

    pub fn paused(&self) -> bool {
        self.gate.paused()
    }

    /// Whether an address holds any administrative role at all; drives the
    /// UI's admin-surface visibility.
    pub fn is_authorized_signer(&self, address: &Address) -> bool {
        self.auth.is_authorized_signer(address)
    }

    pub fn gate(&self) -> &ComplianceGate {
        &self.gate
    }

    pub fn ledger(&self) -> &TokenLedger {
        &self.ledger
    }

    pub fn patents(&self) -> &PatentRegistry {
        &self.patents
    }

    pub fn reserves(&self) -> &ReserveBook {
        &self.reserves
    }

    pub fn revenue(&self) -> &RevenueDistributor {
        &self.revenue
    }

    pub fn redemptions(&self) -> &RedemptionQueue {
        &self.redemptions
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }
}

// =============================================================================
// SHARED HANDLE
// =============================================================================

/// Lock-protected handle for multi-caller runtimes.
///
/// Mutations serialize behind the write lock; reads run concurrently with
/// each other and never see partial state.
#[derive(Clone)]
pub struct SharedCore {
    inner: Arc<RwLock<TokenCore>>,
}

impl SharedCore {
    pub fn new(core: TokenCore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(core)),
        }
    }

    /// Run a read-only closure under the shared lock
    pub fn read<R>(&self, f: impl FnOnce(&TokenCore) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        f(&guard)
    }

    /// Run a mutating closure under the exclusive lock
    pub fn write<R>(&self, f: impl FnOnce(&mut TokenCore) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }
}

/// Current wall-clock timestamp for callers without their own clock
pub fn system_now() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
