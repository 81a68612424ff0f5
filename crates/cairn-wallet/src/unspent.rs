//! Spendable outputs known to the wallet.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use cairn_core::types::{Hash256, OutPoint, hex_bytes};

use crate::error::WalletError;

/// An output the wallet may spend.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UnspentOutput {
    /// Transaction that created the output.
    #[serde(rename = "txId")]
    pub tx_id: Hash256,
    /// Output index within that transaction.
    pub vout: u32,
    /// Encoded address the output pays to.
    pub address: String,
    /// Value in base units.
    pub value: u64,
    /// Locking script, hex in snapshots.
    #[serde(with = "hex_bytes")]
    pub script: Vec<u8>,
}

impl UnspentOutput {
    pub fn outpoint(&self) -> OutPoint {
        OutPoint::new(self.tx_id, self.vout)
    }
}

/// Unspent outputs keyed by outpoint.
///
/// Iteration is in outpoint order so snapshots are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnspentOutputSet {
    outputs: BTreeMap<OutPoint, UnspentOutput>,
}

impl UnspentOutputSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new output. Rejects an outpoint that is already tracked.
    pub fn insert(&mut self, output: UnspentOutput) -> Result<(), WalletError> {
        let outpoint = output.outpoint();
        if self.outputs.contains_key(&outpoint) {
            return Err(WalletError::Validation(format!("duplicate unspent output {outpoint}")));
        }
        self.outputs.insert(outpoint, output);
        Ok(())
    }

    pub fn remove(&mut self, outpoint: &OutPoint) -> Option<UnspentOutput> {
        self.outputs.remove(outpoint)
    }

    pub fn get(&self, outpoint: &OutPoint) -> Option<&UnspentOutput> {
        self.outputs.get(outpoint)
    }

    pub fn contains(&self, outpoint: &OutPoint) -> bool {
        self.outputs.contains_key(outpoint)
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnspentOutput> {
        self.outputs.values()
    }

    /// Sum of all tracked values, saturating at `u64::MAX`.
    pub fn total_value(&self) -> u64 {
        self.outputs
            .values()
            .fold(0u64, |acc, o| acc.saturating_add(o.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utxo(seed: u8, vout: u32, value: u64) -> UnspentOutput {
        UnspentOutput {
            tx_id: Hash256([seed; 32]),
            vout,
            address: format!("addr-{seed}"),
            value,
            script: vec![0x76, 0xa9],
        }
    }

    #[test]
    fn insert_and_lookup() {
        let mut set = UnspentOutputSet::new();
        set.insert(utxo(1, 0, 500)).unwrap();
        set.insert(utxo(1, 1, 700)).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(&OutPoint::new(Hash256([1; 32]), 1)).unwrap().value, 700);
        assert_eq!(set.total_value(), 1_200);
    }

    #[test]
    fn duplicate_outpoint_rejected() {
        let mut set = UnspentOutputSet::new();
        set.insert(utxo(2, 0, 500)).unwrap();
        assert!(matches!(
            set.insert(utxo(2, 0, 900)),
            Err(WalletError::Validation(_))
        ));
        assert_eq!(set.total_value(), 500);
    }

    #[test]
    fn remove_returns_output() {
        let mut set = UnspentOutputSet::new();
        set.insert(utxo(3, 2, 42)).unwrap();
        let op = OutPoint::new(Hash256([3; 32]), 2);
        assert_eq!(set.remove(&op).unwrap().value, 42);
        assert!(set.is_empty());
        assert!(set.remove(&op).is_none());
    }

    #[test]
    fn total_saturates() {
        let mut set = UnspentOutputSet::new();
        set.insert(utxo(4, 0, u64::MAX)).unwrap();
        set.insert(utxo(4, 1, 1)).unwrap();
        assert_eq!(set.total_value(), u64::MAX);
    }

    #[test]
    fn json_field_names() {
        let json = serde_json::to_value(utxo(5, 1, 10)).unwrap();
        assert_eq!(json["txId"], "05".repeat(32));
        assert_eq!(json["script"], "76a9");
        assert_eq!(json["vout"], 1);
        let back: UnspentOutput = serde_json::from_value(json).unwrap();
        assert_eq!(back, utxo(5, 1, 10));
    }
}
