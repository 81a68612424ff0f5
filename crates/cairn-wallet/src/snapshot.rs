//! JSON snapshot of wallet state.
//!
//! ```json
//! {
//!   "network": "testnet",
//!   "account": "<hex account key node>",
//!   "external": { "k": 3, "map": { "<address>": 0, ... } },
//!   "internal": { "k": 1, "map": { ... } },
//!   "unspents": [ { "txId": "<hex>", "vout": 0, "address": "...", "value": 1000, "script": "<hex>" } ]
//! }
//! ```
//!
//! The snapshot contains the account key node. Treat files as secret.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use cairn_core::address::Network;

use crate::chain::AddressChain;
use crate::error::WalletError;
use crate::unspent::UnspentOutput;

/// Serialized chain: cursor plus address → position map.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ChainSnapshot {
    pub k: u32,
    pub map: BTreeMap<String, u32>,
}

impl ChainSnapshot {
    pub(crate) fn from_chain(chain: &AddressChain) -> Self {
        let map = chain
            .addresses()
            .iter()
            .enumerate()
            .map(|(i, a)| (a.clone(), i as u32))
            .collect();
        Self { k: chain.k(), map }
    }

    /// Addresses in position order. The positions must be exactly `0..n`.
    pub(crate) fn ordered_addresses(&self) -> Result<Vec<String>, WalletError> {
        let mut slots: Vec<Option<&String>> = vec![None; self.map.len()];
        for (address, &position) in &self.map {
            let slot = slots.get_mut(position as usize).ok_or_else(|| {
                WalletError::Snapshot(format!("position {position} outside 0..{}", self.map.len()))
            })?;
            if slot.is_some() {
                return Err(WalletError::Snapshot(format!("position {position} assigned twice")));
            }
            *slot = Some(address);
        }
        // n entries in 0..n with no repeats fill every slot.
        Ok(slots.into_iter().flatten().cloned().collect())
    }
}

/// Complete persisted wallet state.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct WalletSnapshot {
    pub network: Network,
    /// Hex account key node.
    pub account: String,
    pub external: ChainSnapshot,
    pub internal: ChainSnapshot,
    pub unspents: Vec<UnspentOutput>,
}

impl WalletSnapshot {
    pub fn to_json(&self) -> Result<String, WalletError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self, WalletError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Write the snapshot as JSON to `path`.
    pub fn write_to(&self, path: &Path) -> Result<(), WalletError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read a JSON snapshot from `path`.
    pub fn read_from(path: &Path) -> Result<Self, WalletError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }
}

impl fmt::Debug for WalletSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletSnapshot")
            .field("network", &self.network)
            .field("account", &"[REDACTED]")
            .field("external", &self.external)
            .field("internal", &self.internal)
            .field("unspents", &self.unspents.len())
            .finish()
    }
}
