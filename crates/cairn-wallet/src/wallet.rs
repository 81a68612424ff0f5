//! Wallet composition: one account, its unspent outputs, and the
//! collaborators used to derive, sign and encode.
//!
//! [`Wallet`] is the orchestration surface. Operations that change state
//! ([`Wallet::discover`], [`Wallet::build_transaction`], cursor advances,
//! unspent bookkeeping) take `&mut self`; introspection takes `&self`.
//! Callers sharing a wallet across tasks wrap it in a single lock.

use std::fmt;
use std::sync::Arc;

use tracing::info;

use cairn_core::address::Network;
use cairn_core::codec::StandardCodec;
use cairn_core::crypto::KeyNode;
use cairn_core::derivation::Ed25519Provider;
use cairn_core::traits::{KeyDerivationProvider, QueryOracle, TransactionCodec};
use cairn_core::types::OutPoint;

use crate::account::Account;
use crate::builder::{BuildResult, TransactionBuilder};
use crate::chain::{AddressChain, ChainPurpose};
use crate::config::WalletConfig;
use crate::discovery::{AccountDiscovery, DiscoveryEngine};
use crate::error::WalletError;
use crate::keys::{Seed, derive_account};
use crate::snapshot::{ChainSnapshot, WalletSnapshot};
use crate::unspent::{UnspentOutput, UnspentOutputSet};

/// Key derivation and transaction encoding implementations used by a wallet.
#[derive(Clone)]
pub struct Collaborators {
    pub provider: Arc<dyn KeyDerivationProvider>,
    pub codec: Arc<dyn TransactionCodec>,
}

impl Collaborators {
    /// Ed25519 derivation and the standard codec for `network`.
    pub fn standard(network: Network) -> Self {
        Self {
            provider: Arc::new(Ed25519Provider::new(network)),
            codec: Arc::new(StandardCodec::new()),
        }
    }
}

/// HD wallet with receive and change chains.
pub struct Wallet {
    account: Account,
    unspents: UnspentOutputSet,
    codec: Arc<dyn TransactionCodec>,
    config: WalletConfig,
}

impl Wallet {
    /// Create a wallet from a seed with the standard collaborators.
    pub fn from_seed(seed: &Seed, network: Network) -> Result<Self, WalletError> {
        Self::from_seed_with(seed, network, Collaborators::standard(network), WalletConfig::default())
    }

    pub fn from_seed_with(
        seed: &Seed,
        network: Network,
        collaborators: Collaborators,
        config: WalletConfig,
    ) -> Result<Self, WalletError> {
        config.validate()?;
        let node = derive_account(collaborators.provider.as_ref(), seed)?;
        let account = Account::new(node, network, collaborators.provider)?;
        info!(%network, "created wallet from seed");
        Ok(Self {
            account,
            unspents: UnspentOutputSet::new(),
            codec: collaborators.codec,
            config,
        })
    }

    /// Restore a wallet from a snapshot with the standard collaborators.
    pub fn import(snapshot: &WalletSnapshot, network: Network) -> Result<Self, WalletError> {
        Self::import_with(snapshot, network, Collaborators::standard(network), WalletConfig::default())
    }

    /// Restore a wallet from a snapshot.
    ///
    /// Fails if the snapshot belongs to another network, if a chain map is
    /// not a contiguous `0..n` index, if a cursor exceeds its map, if any
    /// address differs from its derivation, or if an unspent output repeats.
    pub fn import_with(
        snapshot: &WalletSnapshot,
        network: Network,
        collaborators: Collaborators,
        config: WalletConfig,
    ) -> Result<Self, WalletError> {
        config.validate()?;
        if snapshot.network != network {
            return Err(WalletError::Snapshot(format!(
                "snapshot is for {}, wallet is {network}",
                snapshot.network
            )));
        }

        let node = KeyNode::from_hex(&snapshot.account)?;
        let provider = collaborators.provider;
        let receive = AddressChain::restore(
            ChainPurpose::Receive,
            &node,
            provider.clone(),
            snapshot.external.ordered_addresses()?,
            snapshot.external.k,
        )?;
        let change = AddressChain::restore(
            ChainPurpose::Change,
            &node,
            provider.clone(),
            snapshot.internal.ordered_addresses()?,
            snapshot.internal.k,
        )?;

        let mut unspents = UnspentOutputSet::new();
        for utxo in &snapshot.unspents {
            unspents
                .insert(utxo.clone())
                .map_err(|e| WalletError::Snapshot(e.to_string()))?;
        }

        info!(
            %network,
            receive_k = receive.k(),
            change_k = change.k(),
            unspents = unspents.len(),
            "imported wallet snapshot"
        );
        Ok(Self {
            account: Account::from_parts(node, network, provider, receive, change),
            unspents,
            codec: collaborators.codec,
            config,
        })
    }

    /// Capture the wallet state. `import(export())` restores it exactly.
    pub fn export(&self) -> WalletSnapshot {
        WalletSnapshot {
            network: self.network(),
            account: self.account.node().to_hex(),
            external: ChainSnapshot::from_chain(self.receive_chain()),
            internal: ChainSnapshot::from_chain(self.change_chain()),
            unspents: self.unspents.iter().cloned().collect(),
        }
    }

    pub fn network(&self) -> Network {
        self.account.network()
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn receive_chain(&self) -> &AddressChain {
        self.account.chain(ChainPurpose::Receive)
    }

    pub fn change_chain(&self) -> &AddressChain {
        self.account.chain(ChainPurpose::Change)
    }

    // --- Address introspection ---

    /// Whether `address` is a derived address on either chain.
    pub fn contains_address(&self, address: &str) -> bool {
        self.account.contains_address(address)
    }

    /// Every derived address: receive chain first, then change.
    pub fn all_addresses(&self) -> impl Iterator<Item = &str> {
        self.receive_chain()
            .addresses()
            .iter()
            .chain(self.change_chain().addresses())
            .map(String::as_str)
    }

    pub fn receive_address(&self) -> &str {
        self.receive_chain().current_address()
    }

    pub fn change_address(&self) -> &str {
        self.change_chain().current_address()
    }

    pub fn is_receive_address(&self, address: &str) -> bool {
        self.receive_chain().is_current_address(address)
    }

    pub fn is_change_address(&self, address: &str) -> bool {
        self.change_chain().is_current_address(address)
    }

    /// Advance the receive cursor and return the new receive address.
    pub fn next_receive_address(&mut self) -> Result<String, WalletError> {
        Ok(self.account.chain_mut(ChainPurpose::Receive).advance()?.to_string())
    }

    /// Advance the change cursor and return the new change address.
    pub fn next_change_address(&mut self) -> Result<String, WalletError> {
        Ok(self.account.chain_mut(ChainPurpose::Change).advance()?.to_string())
    }

    // --- Unspent outputs ---

    pub fn add_unspent(&mut self, output: UnspentOutput) -> Result<(), WalletError> {
        self.unspents.insert(output)
    }

    pub fn remove_unspent(&mut self, outpoint: &OutPoint) -> Option<UnspentOutput> {
        self.unspents.remove(outpoint)
    }

    pub fn unspents(&self) -> impl Iterator<Item = &UnspentOutput> {
        self.unspents.iter()
    }

    /// Total value of tracked unspent outputs.
    pub fn balance(&self) -> u64 {
        self.unspents.total_value()
    }

    // --- Orchestration ---

    /// Gap-limit discovery over both chains.
    ///
    /// The chains are scanned concurrently. A chain whose scan completed
    /// keeps its result even if the other chain's scan fails.
    pub async fn discover(
        &mut self,
        gap_limit: u32,
        oracle: &dyn QueryOracle,
    ) -> Result<AccountDiscovery, WalletError> {
        let engine = DiscoveryEngine::new(gap_limit)?;
        let (receive, change) = self.account.chains_mut();
        engine.discover_account(receive, change, oracle).await
    }

    /// [`Wallet::discover`] with the configured gap limit.
    pub async fn discover_default(
        &mut self,
        oracle: &dyn QueryOracle,
    ) -> Result<AccountDiscovery, WalletError> {
        self.discover(self.config.gap_limit, oracle).await
    }

    /// Build, sign and encode a transaction.
    ///
    /// Spent outputs stay tracked; remove them once the transaction confirms.
    pub async fn build_transaction(
        &mut self,
        builder: &TransactionBuilder,
    ) -> Result<BuildResult, WalletError> {
        builder
            .build(
                &mut self.account,
                &self.unspents,
                self.config.fee_rate,
                self.config.dust_threshold,
                self.codec.as_ref(),
            )
            .await
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("network", &self.network())
            .field("receive_k", &self.receive_chain().k())
            .field("change_k", &self.change_chain().k())
            .field("unspents", &self.unspents.len())
            .finish()
    }
}
