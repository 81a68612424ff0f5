//! Collaborator interfaces for the wallet core.
//!
//! These traits are the seams between wallet bookkeeping and the outside world:
//! - [`KeyDerivationProvider`] — key derivation, address encoding, signing
//! - [`QueryOracle`] — "does this address have history" lookups
//! - [`TransactionCodec`] — signing digests and transaction encoding
//!
//! Standard implementations live in [`crate::derivation`] and [`crate::codec`].
//! Tests substitute their own fakes.

use async_trait::async_trait;

use crate::crypto::{KeyNode, Signature};
use crate::error::{CodecError, CryptoError, OracleError};
use crate::types::{EncodedTransaction, Hash256, TxInput, TxOutput};

/// Hierarchical key derivation and signing.
///
/// Derivation is pure and synchronous. Signing may suspend, e.g. when the
/// key lives on an external device.
#[async_trait]
pub trait KeyDerivationProvider: Send + Sync {
    /// Derive the root node from seed bytes.
    fn derive_root(&self, seed: &[u8]) -> Result<KeyNode, CryptoError>;

    /// Derive the child of `node` at `index`, hardened or not.
    fn derive_child(&self, node: &KeyNode, hardened: bool, index: u32) -> Result<KeyNode, CryptoError>;

    /// Encoded address controlled by `node`.
    fn address_for(&self, node: &KeyNode) -> Result<String, CryptoError>;

    /// Sign a 32-byte digest with the key held by `node`.
    async fn sign(&self, node: &KeyNode, digest: &Hash256) -> Result<Signature, CodecError>;
}

/// Answers whether addresses have on-chain history.
#[async_trait]
pub trait QueryOracle: Send + Sync {
    /// Returns one flag per address, in the same order as `addresses`.
    async fn query(&self, addresses: &[String]) -> Result<Vec<bool>, OracleError>;
}

/// Transaction digest computation and encoding.
pub trait TransactionCodec: Send + Sync {
    /// Digest that the signer of input `index` commits to.
    fn sighash(
        &self,
        inputs: &[TxInput],
        outputs: &[TxOutput],
        lock_time: u32,
        index: usize,
    ) -> Result<Hash256, CodecError>;

    /// Encode signed inputs and outputs into a transaction.
    fn encode(
        &self,
        inputs: Vec<TxInput>,
        outputs: Vec<TxOutput>,
        lock_time: u32,
    ) -> Result<EncodedTransaction, CodecError>;
}
