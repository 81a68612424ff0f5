//! An account: the key node at the standard path plus its two chains.

use std::fmt;
use std::sync::Arc;

use cairn_core::address::Network;
use cairn_core::crypto::KeyNode;
use cairn_core::traits::KeyDerivationProvider;

use crate::chain::{AddressChain, ChainPurpose};
use crate::error::WalletError;

pub struct Account {
    network: Network,
    node: KeyNode,
    provider: Arc<dyn KeyDerivationProvider>,
    receive: AddressChain,
    change: AddressChain,
}

impl Account {
    /// A fresh account with both chains at position 0.
    pub fn new(
        node: KeyNode,
        network: Network,
        provider: Arc<dyn KeyDerivationProvider>,
    ) -> Result<Self, WalletError> {
        let receive = AddressChain::new(ChainPurpose::Receive, &node, provider.clone())?;
        let change = AddressChain::new(ChainPurpose::Change, &node, provider.clone())?;
        Ok(Self {
            network,
            node,
            provider,
            receive,
            change,
        })
    }

    /// Assemble an account from chains restored elsewhere.
    pub(crate) fn from_parts(
        node: KeyNode,
        network: Network,
        provider: Arc<dyn KeyDerivationProvider>,
        receive: AddressChain,
        change: AddressChain,
    ) -> Self {
        Self {
            network,
            node,
            provider,
            receive,
            change,
        }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn node(&self) -> &KeyNode {
        &self.node
    }

    pub fn provider(&self) -> &Arc<dyn KeyDerivationProvider> {
        &self.provider
    }

    pub fn chain(&self, purpose: ChainPurpose) -> &AddressChain {
        match purpose {
            ChainPurpose::Receive => &self.receive,
            ChainPurpose::Change => &self.change,
        }
    }

    pub fn chain_mut(&mut self, purpose: ChainPurpose) -> &mut AddressChain {
        match purpose {
            ChainPurpose::Receive => &mut self.receive,
            ChainPurpose::Change => &mut self.change,
        }
    }

    /// Both chains, mutably, for concurrent discovery.
    pub(crate) fn chains_mut(&mut self) -> (&mut AddressChain, &mut AddressChain) {
        (&mut self.receive, &mut self.change)
    }

    pub fn contains_address(&self, address: &str) -> bool {
        self.receive.contains_address(address) || self.change.contains_address(address)
    }

    /// Chain and position of an address, receive chain first.
    pub fn locate(&self, address: &str) -> Option<(ChainPurpose, u32)> {
        [&self.receive, &self.change]
            .into_iter()
            .find_map(|chain| chain.index_of(address).map(|i| (chain.purpose(), i)))
    }

    /// Key node able to sign for `address`.
    pub fn signing_node(&self, address: &str) -> Result<KeyNode, WalletError> {
        let (purpose, position) = self
            .locate(address)
            .ok_or_else(|| WalletError::KeyNotFound(address.to_string()))?;
        self.chain(purpose).node_at(position)
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("network", &self.network)
            .field("receive", &self.receive)
            .field("change", &self.change)
            .finish_non_exhaustive()
    }
}
