//! Balance and Supply Ledger
//!
//! All mutations follow the same shape: authorize, validate every
//! precondition, then commit. Nothing is written until every check has
//! passed, so errors never leave partial state behind.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use lib_compliance::{ComplianceGate, TransferDecision};
use lib_types::{Address, Amount, AuthorizationProvider, Role, Timestamp};

use crate::errors::{LedgerError, LedgerResult};
use crate::limits::DayWindow;

/// Supply-conserving token ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenLedger {
    name: String,
    symbol: String,
    decimals: u8,
    max_supply: Amount,
    daily_mint_limit: Amount,
    daily_burn_limit: Amount,

    balances: BTreeMap<Address, Amount>,
    total_supply: Amount,
    mint_window: DayWindow,
    burn_window: DayWindow,
}

impl TokenLedger {
    /// Create an empty ledger
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        decimals: u8,
        max_supply: Amount,
        daily_mint_limit: Amount,
        daily_burn_limit: Amount,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals,
            max_supply,
            daily_mint_limit,
            daily_burn_limit,
            balances: BTreeMap::new(),
            total_supply: 0,
            mint_window: DayWindow::new(),
            burn_window: DayWindow::new(),
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Mint `amount` to `to` (`Minter` role).
    ///
    /// Fails if the result would exceed the absolute supply cap or the
    /// running total for the current UTC day would exceed the mint ceiling.
    pub fn mint(
        &mut self,
        caller: &Address,
        auth: &dyn AuthorizationProvider,
        to: Address,
        amount: Amount,
        now: Timestamp,
    ) -> LedgerResult<()> {
        self.require_role(auth, Role::Minter, caller)?;
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }

        let new_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        if new_supply > self.max_supply {
            return Err(LedgerError::ExceedsMaxSupply {
                max: self.max_supply,
                would_have: new_supply,
            });
        }

        let used = self.mint_window.used_today(now);
        if used.saturating_add(amount) > self.daily_mint_limit {
            return Err(LedgerError::ExceedsDailyMintLimit {
                limit: self.daily_mint_limit,
                used,
                requested: amount,
            });
        }

        let new_balance = self
            .balance_of(&to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        self.set_balance(to, new_balance);
        self.total_supply = new_supply;
        self.mint_window.consume(now, amount);

        tracing::info!(%caller, %to, amount, "tokens minted");
        Ok(())
    }

    /// Burn `amount` from `from` (`Burner` role).
    pub fn burn(
        &mut self,
        caller: &Address,
        auth: &dyn AuthorizationProvider,
        from: Address,
        amount: Amount,
        now: Timestamp,
    ) -> LedgerResult<()> {
        self.require_role(auth, Role::Burner, caller)?;
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }

        let have = self.balance_of(&from);
        if have < amount {
            return Err(LedgerError::InsufficientBalance { have, need: amount });
        }

        let used = self.burn_window.used_today(now);
        if used.saturating_add(amount) > self.daily_burn_limit {
            return Err(LedgerError::ExceedsDailyBurnLimit {
                limit: self.daily_burn_limit,
                used,
                requested: amount,
            });
        }

        let new_supply = self
            .total_supply
            .checked_sub(amount)
            .ok_or(LedgerError::Overflow)?;

        self.set_balance(from, have - amount);
        self.total_supply = new_supply;
        self.burn_window.consume(now, amount);

        tracing::info!(%caller, %from, amount, "tokens burned");
        Ok(())
    }

    /// Move `amount` from `from` to `to`, subject to the compliance gate.
    ///
    /// The carried denial reason stays distinguishable from a balance
    /// failure so callers can render an accurate message. The exact amount
    /// moves; there is no fee.
    pub fn transfer(
        &mut self,
        gate: &ComplianceGate,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> LedgerResult<()> {
        if let TransferDecision::Denied(reason) = gate.authorize_transfer(&from, &to) {
            tracing::warn!(%from, %to, amount, %reason, "transfer denied");
            return Err(LedgerError::TransferDenied(reason));
        }
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }

        let have = self.balance_of(&from);
        if have < amount {
            return Err(LedgerError::InsufficientBalance { have, need: amount });
        }

        // Credit is computed against the post-debit balance so a
        // self-transfer stays exact.
        let debited_from = have - amount;
        let to_balance = if to == from {
            debited_from
        } else {
            self.balance_of(&to)
        };
        let credited_to = to_balance
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        self.set_balance(from, debited_from);
        self.set_balance(to, credited_to);

        tracing::info!(%from, %to, amount, "tokens transferred");
        Ok(())
    }

    /// Retune the daily issuance ceilings (`Admin` role).
    pub fn set_daily_limits(
        &mut self,
        caller: &Address,
        auth: &dyn AuthorizationProvider,
        mint_limit: Amount,
        burn_limit: Amount,
    ) -> LedgerResult<()> {
        self.require_role(auth, Role::Admin, caller)?;

        self.daily_mint_limit = mint_limit;
        self.daily_burn_limit = burn_limit;
        tracing::info!(%caller, mint_limit, burn_limit, "daily limits updated");
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn balance_of(&self, address: &Address) -> Amount {
        self.balances.get(address).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    pub fn max_supply(&self) -> Amount {
        self.max_supply
    }

    /// Supply headroom under the absolute cap
    pub fn remaining_mintable(&self) -> Amount {
        self.max_supply.saturating_sub(self.total_supply)
    }

    pub fn daily_mint_limit(&self) -> Amount {
        self.daily_mint_limit
    }

    pub fn daily_burn_limit(&self) -> Amount {
        self.daily_burn_limit
    }

    pub fn minted_today(&self, now: Timestamp) -> Amount {
        self.mint_window.used_today(now)
    }

    pub fn burned_today(&self, now: Timestamp) -> Amount {
        self.burn_window.used_today(now)
    }

    /// Number of addresses with a non-zero balance
    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }

    /// Check the conservation invariant: `sum(balances) == total_supply`.
    pub fn verify_conservation(&self) -> bool {
        let mut sum: Amount = 0;
        for balance in self.balances.values() {
            sum = match sum.checked_add(*balance) {
                Some(s) => s,
                None => return false,
            };
        }
        sum == self.total_supply
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn require_role(
        &self,
        auth: &dyn AuthorizationProvider,
        role: Role,
        caller: &Address,
    ) -> LedgerResult<()> {
        if auth.has_role(role, caller) {
            Ok(())
        } else {
            tracing::warn!(%caller, ?role, "ledger mutation rejected");
            Err(LedgerError::Unauthorized {
                role,
                caller: *caller,
            })
        }
    }

    /// Write a balance, pruning zero entries so the map stays bounded by
    /// the holder set.
    fn set_balance(&mut self, address: Address, amount: Amount) {
        if amount == 0 {
            self.balances.remove(&address);
        } else {
            self.balances.insert(address, amount);
        }
    }
}
