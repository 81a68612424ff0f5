//! Transaction builder with fee/change planning and signing.
//!
//! Building happens in two phases:
//! 1. [`TransactionBuilder::plan`] is pure: it validates the request against
//!    the unspent set and decides the fee and whether a change output exists.
//! 2. [`TransactionBuilder::build`] resolves signing keys, allocates the
//!    change address (the commit point), signs every input and encodes.
//!
//! Any error from phase 1 or from key resolution leaves the wallet untouched.
//! Errors after change allocation leave the change cursor advanced.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use cairn_core::traits::TransactionCodec;
use cairn_core::types::{EncodedTransaction, OutPoint, TxInput, TxOutput};

use crate::account::Account;
use crate::chain::ChainPurpose;
use crate::error::WalletError;
use crate::fee::FeeRate;
use crate::unspent::{UnspentOutput, UnspentOutputSet};

/// Fee and change decided for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeePlan {
    /// Outputs being spent, in caller order.
    pub spent: Vec<UnspentOutput>,
    pub total_in: u64,
    pub total_out: u64,
    /// Fee the transaction pays.
    pub fee: u64,
    /// Change value, if a change output is created.
    pub change: Option<u64>,
}

/// A built, signed and encoded transaction.
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub transaction: EncodedTransaction,
    pub fee: u64,
    /// The change output appended last, if one was created.
    pub change: Option<TxOutput>,
}

/// Builder for a transaction spending wallet outputs.
///
/// # Example
/// ```ignore
/// let mut builder = TransactionBuilder::new(5_000);
/// builder
///     .add_input(outpoint)
///     .add_recipient(address, 40_000);
/// let result = wallet.build_transaction(&builder).await?;
/// ```
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    inputs: Vec<OutPoint>,
    outputs: Vec<TxOutput>,
    fee_max: u64,
    fee_rate: Option<FeeRate>,
    lock_time: u32,
}

impl TransactionBuilder {
    /// Create a builder whose fee may not exceed `fee_max`.
    pub fn new(fee_max: u64) -> Self {
        Self {
            inputs: Vec::new(),
            outputs: Vec::new(),
            fee_max,
            fee_rate: None,
            lock_time: 0,
        }
    }

    /// Spend a tracked output.
    pub fn add_input(&mut self, outpoint: OutPoint) -> &mut Self {
        self.inputs.push(outpoint);
        self
    }

    /// Pay `value` to `address`.
    pub fn add_recipient(&mut self, address: impl Into<String>, value: u64) -> &mut Self {
        self.outputs.push(TxOutput {
            value,
            address: address.into(),
        });
        self
    }

    pub fn set_fee_max(&mut self, fee_max: u64) -> &mut Self {
        self.fee_max = fee_max;
        self
    }

    /// Override the wallet's default fee rate for this build.
    pub fn set_fee_rate(&mut self, rate: FeeRate) -> &mut Self {
        self.fee_rate = Some(rate);
        self
    }

    pub fn set_lock_time(&mut self, lock_time: u32) -> &mut Self {
        self.lock_time = lock_time;
        self
    }

    pub fn inputs(&self) -> &[OutPoint] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TxOutput] {
        &self.outputs
    }

    pub fn fee_max(&self) -> u64 {
        self.fee_max
    }

    /// Validate the request and decide fee and change.
    ///
    /// `default_rate` applies unless the builder names a rate. Change at or
    /// below `dust` is added to the fee.
    pub fn plan(
        &self,
        unspents: &UnspentOutputSet,
        default_rate: FeeRate,
        dust: u64,
    ) -> Result<FeePlan, WalletError> {
        if self.inputs.is_empty() {
            return Err(WalletError::Validation("no inputs".into()));
        }
        let mut seen = BTreeSet::new();
        let mut spent = Vec::with_capacity(self.inputs.len());
        for outpoint in &self.inputs {
            if !seen.insert(outpoint) {
                return Err(WalletError::Validation(format!("duplicate input {outpoint}")));
            }
            let utxo = unspents
                .get(outpoint)
                .ok_or_else(|| WalletError::UnknownInput(outpoint.clone()))?;
            spent.push(utxo.clone());
        }

        if self.outputs.is_empty() {
            return Err(WalletError::Validation("no outputs".into()));
        }
        if let Some(i) = self.outputs.iter().position(|o| o.value == 0) {
            return Err(WalletError::Validation(format!("output {i} has zero value")));
        }

        let total_in = spent
            .iter()
            .try_fold(0u64, |acc, u| acc.checked_add(u.value))
            .ok_or_else(|| WalletError::Validation("input value overflow".into()))?;
        let total_out = self
            .outputs
            .iter()
            .try_fold(0u64, |acc, o| acc.checked_add(o.value))
            .ok_or_else(|| WalletError::Validation("output value overflow".into()))?;

        let rate = self.fee_rate.unwrap_or(default_rate);
        let fee_overflow = || WalletError::Validation("fee overflow".into());
        let n_in = spent.len();
        let n_out = self.outputs.len();

        let min_fee = rate.fee_for(n_in, n_out).ok_or_else(fee_overflow)?;
        let need = total_out.checked_add(min_fee).ok_or_else(fee_overflow)?;
        if total_in < need {
            return Err(WalletError::InsufficientFunds {
                have: total_in,
                need,
            });
        }

        let surplus = total_in - total_out;
        let change_fee = rate.fee_for(n_in, n_out + 1).ok_or_else(fee_overflow)?;
        let (fee, change) = match surplus.checked_sub(change_fee) {
            Some(remainder) if remainder > dust => (change_fee, Some(remainder)),
            _ => (surplus, None),
        };
        if fee > self.fee_max {
            return Err(WalletError::FeeTooHigh {
                fee,
                max: self.fee_max,
            });
        }

        debug!(total_in, total_out, fee, ?change, %rate, "planned transaction");
        Ok(FeePlan {
            spent,
            total_in,
            total_out,
            fee,
            change,
        })
    }

    /// Plan, allocate change, sign and encode.
    pub(crate) async fn build(
        &self,
        account: &mut Account,
        unspents: &UnspentOutputSet,
        default_rate: FeeRate,
        dust: u64,
        codec: &dyn TransactionCodec,
    ) -> Result<BuildResult, WalletError> {
        let plan = self.plan(unspents, default_rate, dust)?;

        let nodes = plan
            .spent
            .iter()
            .map(|u| account.signing_node(&u.address))
            .collect::<Result<Vec<_>, _>>()?;

        let mut outputs = self.outputs.clone();
        let change = match plan.change {
            Some(value) => {
                let address = account.chain_mut(ChainPurpose::Change).advance()?.to_string();
                if self.outputs.iter().any(|o| o.address == address) {
                    warn!(%address, "recipient pays to a reserved change address");
                }
                let output = TxOutput { value, address };
                outputs.push(output.clone());
                Some(output)
            }
            None => None,
        };

        let mut inputs: Vec<TxInput> = plan
            .spent
            .iter()
            .map(|u| TxInput::unsigned(u.outpoint(), u.script.clone()))
            .collect();

        let provider = account.provider().clone();
        for (i, node) in nodes.iter().enumerate() {
            let digest = codec.sighash(&inputs, &outputs, self.lock_time, i)?;
            let signature = provider.sign(node, &digest).await?;
            inputs[i].signature = signature.bytes;
            inputs[i].public_key = signature.public_key;
        }

        let transaction = codec.encode(inputs, outputs, self.lock_time)?;
        info!(
            txid = %transaction.id(),
            fee = plan.fee,
            change = change.as_ref().map(|c| c.value),
            "built transaction"
        );

        Ok(BuildResult {
            transaction,
            fee: plan.fee,
            change,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_core::types::Hash256;

    const DUST: u64 = 546;

    fn utxo(seed: u8, value: u64) -> UnspentOutput {
        UnspentOutput {
            tx_id: Hash256([seed; 32]),
            vout: 0,
            address: format!("owner-{seed}"),
            value,
            script: vec![],
        }
    }

    fn set(values: &[u64]) -> UnspentOutputSet {
        let mut set = UnspentOutputSet::new();
        for (i, v) in values.iter().enumerate() {
            set.insert(utxo(i as u8 + 1, *v)).unwrap();
        }
        set
    }

    fn op(seed: u8) -> OutPoint {
        OutPoint::new(Hash256([seed; 32]), 0)
    }

    #[test]
    fn change_created_above_dust() {
        let utxos = set(&[100_000]);
        let mut b = TransactionBuilder::new(10_000);
        b.add_input(op(1)).add_recipient("dest", 40_000);
        let plan = b.plan(&utxos, FeeRate::default(), DUST).unwrap();
        // 1 input, 2 outputs: 226 bytes * 10
        assert_eq!(plan.fee, 2_260);
        assert_eq!(plan.change, Some(100_000 - 40_000 - 2_260));
        assert_eq!(plan.total_in, plan.total_out + plan.fee + plan.change.unwrap());
    }

    #[test]
    fn dust_remainder_folded_into_fee() {
        // 1 input, 1 output min fee = 1_920; with change = 2_260
        let utxos = set(&[50_000 + 2_260 + 500]);
        let mut b = TransactionBuilder::new(10_000);
        b.add_input(op(1)).add_recipient("dest", 50_000);
        let plan = b.plan(&utxos, FeeRate::default(), DUST).unwrap();
        assert_eq!(plan.change, None);
        assert_eq!(plan.fee, 2_760);
    }

    #[test]
    fn remainder_equal_to_dust_is_not_change() {
        let utxos = set(&[50_000 + 2_260 + DUST]);
        let mut b = TransactionBuilder::new(10_000);
        b.add_input(op(1)).add_recipient("dest", 50_000);
        let plan = b.plan(&utxos, FeeRate::default(), DUST).unwrap();
        assert_eq!(plan.change, None);
    }

    #[test]
    fn exact_min_fee_without_change_room() {
        let utxos = set(&[50_000 + 1_920]);
        let mut b = TransactionBuilder::new(1_920);
        b.add_input(op(1)).add_recipient("dest", 50_000);
        let plan = b.plan(&utxos, FeeRate::default(), DUST).unwrap();
        assert_eq!(plan.fee, 1_920);
        assert_eq!(plan.change, None);
    }

    #[test]
    fn insufficient_funds() {
        let utxos = set(&[50_000]);
        let mut b = TransactionBuilder::new(10_000);
        b.add_input(op(1)).add_recipient("dest", 49_000);
        assert_eq!(
            b.plan(&utxos, FeeRate::default(), DUST).unwrap_err(),
            WalletError::InsufficientFunds {
                have: 50_000,
                need: 49_000 + 1_920
            }
        );
    }

    #[test]
    fn fee_ceiling_with_change() {
        let utxos = set(&[100_000]);
        let mut b = TransactionBuilder::new(2_000);
        b.add_input(op(1)).add_recipient("dest", 40_000);
        assert_eq!(
            b.plan(&utxos, FeeRate::default(), DUST).unwrap_err(),
            WalletError::FeeTooHigh { fee: 2_260, max: 2_000 }
        );
    }

    #[test]
    fn fee_ceiling_without_change() {
        let utxos = set(&[52_500]);
        let mut b = TransactionBuilder::new(2_000);
        b.add_input(op(1)).add_recipient("dest", 50_000);
        assert_eq!(
            b.plan(&utxos, FeeRate::default(), DUST).unwrap_err(),
            WalletError::FeeTooHigh { fee: 2_500, max: 2_000 }
        );
    }

    #[test]
    fn custom_rate_overrides_default() {
        let utxos = set(&[100_000]);
        let mut b = TransactionBuilder::new(10_000);
        b.add_input(op(1))
            .add_recipient("dest", 40_000)
            .set_fee_rate(FeeRate::per_byte(1));
        let plan = b.plan(&utxos, FeeRate::default(), DUST).unwrap();
        assert_eq!(plan.fee, 226);
    }

    #[test]
    fn validation_errors() {
        let utxos = set(&[100_000]);

        let b = TransactionBuilder::new(10_000);
        assert!(matches!(
            b.plan(&utxos, FeeRate::default(), DUST),
            Err(WalletError::Validation(_))
        ));

        let mut b = TransactionBuilder::new(10_000);
        b.add_input(op(1));
        assert!(matches!(
            b.plan(&utxos, FeeRate::default(), DUST),
            Err(WalletError::Validation(_))
        ));

        let mut b = TransactionBuilder::new(10_000);
        b.add_input(op(1)).add_recipient("dest", 0);
        assert!(matches!(
            b.plan(&utxos, FeeRate::default(), DUST),
            Err(WalletError::Validation(_))
        ));

        let mut b = TransactionBuilder::new(10_000);
        b.add_input(op(1)).add_input(op(1)).add_recipient("dest", 1);
        assert!(matches!(
            b.plan(&utxos, FeeRate::default(), DUST),
            Err(WalletError::Validation(_))
        ));
    }

    #[test]
    fn unknown_input() {
        let utxos = set(&[100_000]);
        let mut b = TransactionBuilder::new(10_000);
        b.add_input(op(9)).add_recipient("dest", 1_000);
        assert_eq!(
            b.plan(&utxos, FeeRate::default(), DUST).unwrap_err(),
            WalletError::UnknownInput(op(9))
        );
    }

    #[test]
    fn output_overflow_is_validation() {
        let utxos = set(&[100_000]);
        let mut b = TransactionBuilder::new(10_000);
        b.add_input(op(1))
            .add_recipient("a", u64::MAX)
            .add_recipient("b", 1);
        assert!(matches!(
            b.plan(&utxos, FeeRate::default(), DUST),
            Err(WalletError::Validation(_))
        ));
    }
}
