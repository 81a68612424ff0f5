//! Wallet-wide policy settings.
//!
//! [`WalletConfig`] carries the discovery gap limit, the default fee rate
//! and the dust threshold. Every field has a default, so a partial JSON
//! document (or `{}`) is a valid configuration.

use serde::{Deserialize, Serialize};

use cairn_core::constants::{DEFAULT_DUST_THRESHOLD, DEFAULT_GAP_LIMIT};

use crate::error::WalletError;
use crate::fee::FeeRate;

/// Policy knobs shared by discovery and transaction building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Batch size for gap-limit discovery.
    pub gap_limit: u32,
    /// Fee rate used when a build does not name one.
    pub fee_rate: FeeRate,
    /// Change at or below this value is added to the fee instead.
    pub dust_threshold: u64,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            gap_limit: DEFAULT_GAP_LIMIT,
            fee_rate: FeeRate::default(),
            dust_threshold: DEFAULT_DUST_THRESHOLD,
        }
    }
}

impl WalletConfig {
    /// Parse a JSON configuration and validate it.
    pub fn from_json(s: &str) -> Result<Self, WalletError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), WalletError> {
        if self.gap_limit == 0 {
            return Err(WalletError::Validation("gap limit must be positive".into()));
        }
        Ok(())
    }
}
