//! Shared fakes and fixtures for integration tests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use cairn_core::address::{Address, Network};
use cairn_core::codec::StandardCodec;
use cairn_core::crypto::{KeyNode, Signature};
use cairn_core::error::{CodecError, CryptoError, OracleError};
use cairn_core::traits::{KeyDerivationProvider, QueryOracle, TransactionCodec};
use cairn_core::types::{EncodedTransaction, Hash256, OutPoint, TxInput, TxOutput};
use cairn_wallet::{ChainPurpose, Collaborators, Seed, UnspentOutput, Wallet, WalletConfig};

pub const NETWORK: Network = Network::Testnet;

/// Install a test-writer tracing subscriber honouring `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

pub fn seed(byte: u8) -> Seed {
    Seed::from_bytes(&[byte; 32]).unwrap()
}

/// Wallet from a one-byte seed with the standard collaborators.
pub fn wallet(byte: u8) -> Wallet {
    Wallet::from_seed(&seed(byte), NETWORK).unwrap()
}

/// Wallet with custom collaborators and the default config.
pub fn wallet_with(byte: u8, collaborators: Collaborators) -> Wallet {
    Wallet::from_seed_with(&seed(byte), NETWORK, collaborators, WalletConfig::default()).unwrap()
}

/// Address at `position` of a wallet chain, derived whether or not the
/// chain has reached it.
pub fn address_at(wallet: &Wallet, purpose: ChainPurpose, position: u32) -> String {
    let node = wallet.account().chain(purpose).node_at(position).unwrap();
    wallet.account().provider().address_for(&node).unwrap()
}

/// An unspent output of `value` paying `address`, keyed by `(tx_seed, 0)`.
pub fn utxo(address: &str, tx_seed: u8, value: u64) -> UnspentOutput {
    UnspentOutput {
        tx_id: Hash256([tx_seed; 32]),
        vout: 0,
        address: address.to_string(),
        value,
        script: Address::decode(address).unwrap().script(),
    }
}

/// Track an output paying `address` and return its outpoint.
pub fn fund(wallet: &mut Wallet, address: &str, tx_seed: u8, value: u64) -> OutPoint {
    let output = utxo(address, tx_seed, value);
    let outpoint = output.outpoint();
    wallet.add_unspent(output).unwrap();
    outpoint
}

/// A destination address outside every test wallet.
pub fn foreign_address(byte: u8) -> String {
    Address::from_key_hash([byte; 20], NETWORK).encode()
}

// ---------------------------------------------------------------------------
// Oracles
// ---------------------------------------------------------------------------

/// Oracle answering from a set of used addresses, optionally failing any
/// batch that contains a poisoned address.
#[derive(Default)]
pub struct ScriptedOracle {
    used: HashSet<String>,
    poisoned: HashMap<String, String>,
    batches: Mutex<Vec<Vec<String>>>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark positions of a wallet chain as having history.
    pub fn with_history(mut self, wallet: &Wallet, purpose: ChainPurpose, positions: &[u32]) -> Self {
        for p in positions {
            self.used.insert(address_at(wallet, purpose, *p));
        }
        self
    }

    /// Fail with `reason` whenever a batch includes this chain position.
    pub fn failing_at(mut self, wallet: &Wallet, purpose: ChainPurpose, position: u32, reason: &str) -> Self {
        self.poisoned
            .insert(address_at(wallet, purpose, position), reason.to_string());
        self
    }

    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().clone()
    }
}

#[async_trait]
impl QueryOracle for ScriptedOracle {
    async fn query(&self, addresses: &[String]) -> Result<Vec<bool>, OracleError> {
        self.batches.lock().push(addresses.to_vec());
        tokio::task::yield_now().await;
        if let Some(reason) = addresses.iter().find_map(|a| self.poisoned.get(a)) {
            return Err(OracleError::Transport(reason.clone()));
        }
        Ok(addresses.iter().map(|a| self.used.contains(a)).collect())
    }
}

// ---------------------------------------------------------------------------
// Failing collaborators
// ---------------------------------------------------------------------------

/// Standard derivation whose signer always fails.
pub struct FailingSigner {
    inner: Arc<dyn KeyDerivationProvider>,
}

impl FailingSigner {
    pub fn new(inner: Arc<dyn KeyDerivationProvider>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl KeyDerivationProvider for FailingSigner {
    fn derive_root(&self, seed: &[u8]) -> Result<KeyNode, CryptoError> {
        self.inner.derive_root(seed)
    }

    fn derive_child(&self, node: &KeyNode, hardened: bool, index: u32) -> Result<KeyNode, CryptoError> {
        self.inner.derive_child(node, hardened, index)
    }

    fn address_for(&self, node: &KeyNode) -> Result<String, CryptoError> {
        self.inner.address_for(node)
    }

    async fn sign(&self, _node: &KeyNode, _digest: &Hash256) -> Result<Signature, CodecError> {
        Err(CodecError::Signing {
            index: 0,
            reason: "signer unavailable".into(),
        })
    }
}

/// Standard codec whose encoder always fails.
pub struct FailingEncoder;

impl TransactionCodec for FailingEncoder {
    fn sighash(
        &self,
        inputs: &[TxInput],
        outputs: &[TxOutput],
        lock_time: u32,
        index: usize,
    ) -> Result<Hash256, CodecError> {
        StandardCodec::new().sighash(inputs, outputs, lock_time, index)
    }

    fn encode(
        &self,
        _inputs: Vec<TxInput>,
        _outputs: Vec<TxOutput>,
        _lock_time: u32,
    ) -> Result<EncodedTransaction, CodecError> {
        Err(CodecError::Serialization("encoder offline".into()))
    }
}
