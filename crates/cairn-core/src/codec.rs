//! Standard transaction codec.
//!
//! The signing digest for input `i` commits to:
//! - the transaction version
//! - every input's outpoint (signatures and public keys excluded)
//! - the locking script of input `i` only
//! - every output's value and address
//! - the lock time and `i` itself
//!
//! Because signatures are excluded, inputs can be signed in any order.
//! Encoded transactions are bincode bytes; the transaction ID is the BLAKE3
//! hash of those bytes.

use crate::address::Address;
use crate::crypto::PublicKey;
use crate::error::{CodecError, CryptoError};
use crate::traits::TransactionCodec;
use crate::types::{EncodedTransaction, Hash256, TX_VERSION, Transaction, TxInput, TxOutput};

/// Bincode encoding with BLAKE3 digests and transaction IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCodec;

impl StandardCodec {
    pub fn new() -> Self {
        Self
    }

    /// Verify the signature on input `index` of an encoded transaction.
    ///
    /// Checks that the embedded public key hashes to the key hash locked in
    /// the input's script and that the signature covers the input's digest.
    pub fn verify_input(&self, tx: &EncodedTransaction, index: usize) -> Result<(), CryptoError> {
        let inputs = tx.inputs();
        let input = inputs.get(index).ok_or(CryptoError::VerificationFailed)?;
        let public_key = PublicKey::from_slice(&input.public_key)?;

        // Network does not enter the script, only the key hash.
        let owner = Address::from_public_key(&public_key.to_bytes(), Default::default());
        if owner.script() != input.script {
            return Err(CryptoError::VerificationFailed);
        }

        let digest = signing_digest(inputs, tx.outputs(), tx.lock_time(), index)
            .map_err(|_| CryptoError::VerificationFailed)?;
        public_key.verify(digest.as_bytes(), &input.signature)
    }
}

fn signing_digest(
    inputs: &[TxInput],
    outputs: &[TxOutput],
    lock_time: u32,
    index: usize,
) -> Result<Hash256, CodecError> {
    let signed = inputs.get(index).ok_or(CodecError::InputIndexOutOfBounds {
        index,
        len: inputs.len(),
    })?;

    let mut hasher = blake3::Hasher::new();
    hasher.update(&TX_VERSION.to_le_bytes());

    hasher.update(&(inputs.len() as u64).to_le_bytes());
    for input in inputs {
        hasher.update(input.previous_output.txid.as_bytes());
        hasher.update(&input.previous_output.vout.to_le_bytes());
    }

    hasher.update(&(signed.script.len() as u64).to_le_bytes());
    hasher.update(&signed.script);

    hasher.update(&(outputs.len() as u64).to_le_bytes());
    for output in outputs {
        hasher.update(&output.value.to_le_bytes());
        hasher.update(&(output.address.len() as u64).to_le_bytes());
        hasher.update(output.address.as_bytes());
    }

    hasher.update(&lock_time.to_le_bytes());
    hasher.update(&(index as u64).to_le_bytes());

    Ok(Hash256(*hasher.finalize().as_bytes()))
}

impl TransactionCodec for StandardCodec {
    fn sighash(
        &self,
        inputs: &[TxInput],
        outputs: &[TxOutput],
        lock_time: u32,
        index: usize,
    ) -> Result<Hash256, CodecError> {
        signing_digest(inputs, outputs, lock_time, index)
    }

    fn encode(
        &self,
        inputs: Vec<TxInput>,
        outputs: Vec<TxOutput>,
        lock_time: u32,
    ) -> Result<EncodedTransaction, CodecError> {
        if inputs.is_empty() || outputs.is_empty() {
            return Err(CodecError::EmptyInputsOrOutputs);
        }
        if let Some(i) = inputs.iter().position(|input| !input.is_signed()) {
            return Err(CodecError::MissingSignature(i));
        }
        if let Some(i) = outputs.iter().position(|output| output.value == 0) {
            return Err(CodecError::ZeroValueOutput(i));
        }

        let body = Transaction {
            version: TX_VERSION,
            inputs,
            outputs,
            lock_time,
        };
        let raw = body.to_bytes()?;
        let txid = Hash256(*blake3::hash(&raw).as_bytes());
        Ok(EncodedTransaction::new(body, raw, txid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Network;
    use crate::crypto::KeyPair;
    use crate::types::OutPoint;

    fn owner(seed: u8) -> (KeyPair, Vec<u8>) {
        let kp = KeyPair::from_secret_bytes([seed; 32]);
        let script = Address::from_public_key(&kp.public_key().to_bytes(), Network::Testnet).script();
        (kp, script)
    }

    fn unsigned_inputs() -> (Vec<KeyPair>, Vec<TxInput>) {
        let (kp_a, script_a) = owner(1);
        let (kp_b, script_b) = owner(2);
        let inputs = vec![
            TxInput::unsigned(OutPoint::new(Hash256([0xAA; 32]), 0), script_a),
            TxInput::unsigned(OutPoint::new(Hash256([0xBB; 32]), 1), script_b),
        ];
        (vec![kp_a, kp_b], inputs)
    }

    fn outputs() -> Vec<TxOutput> {
        vec![TxOutput { value: 40_000, address: "dest".into() }]
    }

    fn sign_all(codec: &StandardCodec, keys: &[KeyPair], inputs: &mut [TxInput], outs: &[TxOutput]) {
        for i in 0..inputs.len() {
            let digest = codec.sighash(inputs, outs, 0, i).unwrap();
            inputs[i].signature = keys[i].sign(digest.as_bytes()).to_vec();
            inputs[i].public_key = keys[i].public_key().to_bytes().to_vec();
        }
    }

    #[test]
    fn sighash_deterministic() {
        let codec = StandardCodec::new();
        let (_, inputs) = unsigned_inputs();
        let a = codec.sighash(&inputs, &outputs(), 0, 0).unwrap();
        let b = codec.sighash(&inputs, &outputs(), 0, 0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn sighash_differs_per_input() {
        let codec = StandardCodec::new();
        let (_, inputs) = unsigned_inputs();
        let a = codec.sighash(&inputs, &outputs(), 0, 0).unwrap();
        let b = codec.sighash(&inputs, &outputs(), 0, 1).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn sighash_ignores_signatures() {
        let codec = StandardCodec::new();
        let (_, mut inputs) = unsigned_inputs();
        let before = codec.sighash(&inputs, &outputs(), 0, 1).unwrap();
        inputs[0].signature = vec![9; 64];
        inputs[0].public_key = vec![9; 32];
        assert_eq!(codec.sighash(&inputs, &outputs(), 0, 1).unwrap(), before);
    }

    #[test]
    fn sighash_commits_to_outputs_and_lock_time() {
        let codec = StandardCodec::new();
        let (_, inputs) = unsigned_inputs();
        let base = codec.sighash(&inputs, &outputs(), 0, 0).unwrap();
        let mut outs = outputs();
        outs[0].value += 1;
        assert_ne!(codec.sighash(&inputs, &outs, 0, 0).unwrap(), base);
        assert_ne!(codec.sighash(&inputs, &outputs(), 100, 0).unwrap(), base);
    }

    #[test]
    fn sighash_index_out_of_bounds() {
        let codec = StandardCodec::new();
        let (_, inputs) = unsigned_inputs();
        assert_eq!(
            codec.sighash(&inputs, &outputs(), 0, 5).unwrap_err(),
            CodecError::InputIndexOutOfBounds { index: 5, len: 2 }
        );
    }

    #[test]
    fn encode_rejects_unsigned_input() {
        let codec = StandardCodec::new();
        let (_, inputs) = unsigned_inputs();
        assert_eq!(
            codec.encode(inputs, outputs(), 0).unwrap_err(),
            CodecError::MissingSignature(0)
        );
    }

    #[test]
    fn encode_rejects_empty() {
        let codec = StandardCodec::new();
        assert_eq!(
            codec.encode(vec![], outputs(), 0).unwrap_err(),
            CodecError::EmptyInputsOrOutputs
        );
    }

    #[test]
    fn encode_rejects_zero_value_output() {
        let codec = StandardCodec::new();
        let (keys, mut inputs) = unsigned_inputs();
        let mut outs = outputs();
        outs.push(TxOutput { value: 0, address: "nothing".into() });
        sign_all(&codec, &keys, &mut inputs, &outs);
        assert_eq!(
            codec.encode(inputs, outs, 0).unwrap_err(),
            CodecError::ZeroValueOutput(1)
        );
    }

    #[test]
    fn encoded_id_is_hash_of_bytes() {
        let codec = StandardCodec::new();
        let (keys, mut inputs) = unsigned_inputs();
        let outs = outputs();
        sign_all(&codec, &keys, &mut inputs, &outs);
        let tx = codec.encode(inputs, outs, 0).unwrap();
        let raw = tx.serialize();
        assert_eq!(tx.txid(), Hash256(*blake3::hash(&raw).as_bytes()));
        assert_eq!(tx.id().len(), 64);
        assert_eq!(Transaction::from_bytes(&raw).unwrap(), *tx.body());
    }

    #[test]
    fn verify_input_accepts_valid_signatures() {
        let codec = StandardCodec::new();
        let (keys, mut inputs) = unsigned_inputs();
        let outs = outputs();
        sign_all(&codec, &keys, &mut inputs, &outs);
        let tx = codec.encode(inputs, outs, 0).unwrap();
        assert!(codec.verify_input(&tx, 0).is_ok());
        assert!(codec.verify_input(&tx, 1).is_ok());
    }

    #[test]
    fn verify_input_rejects_wrong_signer() {
        let codec = StandardCodec::new();
        let (mut keys, mut inputs) = unsigned_inputs();
        keys.swap(0, 1);
        let outs = outputs();
        sign_all(&codec, &keys, &mut inputs, &outs);
        let tx = codec.encode(inputs, outs, 0).unwrap();
        assert_eq!(codec.verify_input(&tx, 0), Err(CryptoError::VerificationFailed));
    }
}
