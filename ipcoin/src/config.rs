//! Core Configuration
//!
//! Operator-supplied parameters for a core instance, loadable from JSON.
//! Defaults match the reference deployment: 18 decimals, one billion token
//! cap, 100M tokens of mint and burn headroom per day.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use lib_types::{Amount, TOKEN_SCALE};

/// Parameters fixed at core construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub max_supply: Amount,
    pub daily_mint_limit: Amount,
    pub daily_burn_limit: Amount,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            name: "IP Coin".to_string(),
            symbol: "IPC".to_string(),
            decimals: 18,
            max_supply: 1_000_000_000 * TOKEN_SCALE,
            daily_mint_limit: 100_000_000 * TOKEN_SCALE,
            daily_burn_limit: 100_000_000 * TOKEN_SCALE,
        }
    }
}

impl CoreConfig {
    /// Check internal consistency.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("token name must not be empty");
        }
        if self.symbol.trim().is_empty() {
            bail!("token symbol must not be empty");
        }
        if self.decimals != 18 {
            // Amounts are fixed 18-decimal throughout the core.
            bail!("unsupported decimals {}: the ledger is 18-decimal", self.decimals);
        }
        if self.max_supply == 0 {
            bail!("max supply must be positive");
        }
        if self.daily_mint_limit == 0 || self.daily_burn_limit == 0 {
            bail!("daily limits must be positive");
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).context("invalid core configuration JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading core configuration {}", path.display()))?;
        let config = Self::from_json(&raw)?;
        tracing::info!(path = %path.display(), symbol = %config.symbol, "core configuration loaded");
        Ok(config)
    }
}
