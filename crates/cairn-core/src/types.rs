//! Core wallet types: hashes, outpoints, transactions.
//!
//! All monetary values are in the smallest currency unit (1 coin = 10^8 units)
//! and carried as `u64`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::CodecError;

/// A 32-byte hash value.
///
/// Used for transaction IDs and signing digests. Serializes as a lowercase
/// hex string so snapshots stay human-readable.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
    bincode::Encode, bincode::Decode,
)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    /// The zero hash (32 zero bytes).
    pub const ZERO: Self = Self([0u8; 32]);

    /// Create a Hash256 from a byte array.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Check if this is the zero hash.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for Hash256 {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl From<[u8; 32]> for Hash256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Hash256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Hash256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Hash256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Serde adapter encoding byte vectors as hex strings.
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

/// Reference to a specific output of a previous transaction.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
    bincode::Encode, bincode::Decode,
)]
pub struct OutPoint {
    /// Transaction ID containing the referenced output.
    pub txid: Hash256,
    /// Index of the output within the transaction.
    pub vout: u32,
}

impl OutPoint {
    pub fn new(txid: Hash256, vout: u32) -> Self {
        Self { txid, vout }
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.vout)
    }
}

/// A transaction input, spending a previous output.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct TxInput {
    /// The outpoint being spent.
    pub previous_output: OutPoint,
    /// Locking script of the spent output. Committed to by the signature.
    pub script: Vec<u8>,
    /// Signature bytes. Empty until signed.
    pub signature: Vec<u8>,
    /// Public key bytes of the signer. Empty until signed.
    pub public_key: Vec<u8>,
}

impl TxInput {
    /// An unsigned input spending `previous_output` locked by `script`.
    pub fn unsigned(previous_output: OutPoint, script: Vec<u8>) -> Self {
        Self {
            previous_output,
            script,
            signature: Vec::new(),
            public_key: Vec::new(),
        }
    }

    pub fn is_signed(&self) -> bool {
        !self.signature.is_empty() && !self.public_key.is_empty()
    }
}

/// A transaction output paying `value` to `address`.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct TxOutput {
    /// Value in the smallest currency unit.
    pub value: u64,
    /// Encoded destination address.
    pub address: String,
}

/// Current transaction format version.
pub const TX_VERSION: u32 = 1;

/// A transaction body transferring value between addresses.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct Transaction {
    /// Format version.
    pub version: u32,
    /// Inputs consuming previous outputs.
    pub inputs: Vec<TxInput>,
    /// New outputs created by this transaction.
    pub outputs: Vec<TxOutput>,
    /// Block height or timestamp before which this tx is invalid.
    pub lock_time: u32,
}

impl Transaction {
    /// Canonical byte encoding (bincode, standard config).
    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        bincode::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| CodecError::Serialization(e.to_string()))
    }

    /// Decode a transaction from its canonical encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let (tx, read) = bincode::decode_from_slice(bytes, bincode::config::standard())
            .map_err(|e| CodecError::Serialization(e.to_string()))?;
        if read != bytes.len() {
            return Err(CodecError::Serialization(format!(
                "{} trailing bytes",
                bytes.len() - read
            )));
        }
        Ok(tx)
    }

    /// Sum of all output values. Returns None on overflow.
    pub fn total_output_value(&self) -> Option<u64> {
        self.outputs
            .iter()
            .try_fold(0u64, |acc, out| acc.checked_add(out.value))
    }
}

/// A fully encoded, signed transaction as produced by a codec.
///
/// Holds the body alongside its canonical bytes and transaction ID, both
/// computed once at encode time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedTransaction {
    body: Transaction,
    raw: Vec<u8>,
    txid: Hash256,
}

impl EncodedTransaction {
    /// Wrap a body with its precomputed encoding and ID.
    pub fn new(body: Transaction, raw: Vec<u8>, txid: Hash256) -> Self {
        Self { body, raw, txid }
    }

    /// Transaction ID as a hex string.
    pub fn id(&self) -> String {
        self.txid.to_string()
    }

    pub fn txid(&self) -> Hash256 {
        self.txid
    }

    /// The canonical serialized bytes.
    pub fn serialize(&self) -> Vec<u8> {
        self.raw.clone()
    }

    pub fn body(&self) -> &Transaction {
        &self.body
    }

    pub fn inputs(&self) -> &[TxInput] {
        &self.body.inputs
    }

    pub fn outputs(&self) -> &[TxOutput] {
        &self.body.outputs
    }

    pub fn lock_time(&self) -> u32 {
        self.body.lock_time
    }
}
