//! One address derivation sequence (receive or change).
//!
//! An [`AddressChain`] is an arena of derived addresses indexed by position,
//! a reverse lookup from address to position, and a cursor `k`:
//! - `k` is the position of the current address (the next one to hand out)
//! - after discovery, every position below `k` has been seen on chain
//! - the arena always holds position `k`, so `current_address` never derives
//! - `k` only moves forward
//!
//! Addresses past `k` may exist transiently while a discovery scan derives a
//! batch ahead; the scan drops them once it finishes.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use cairn_core::constants::MAX_CHAIN_INDEX;
use cairn_core::crypto::KeyNode;
use cairn_core::error::CryptoError;
use cairn_core::traits::KeyDerivationProvider;

use crate::error::WalletError;

/// Which of the account's two chains an address belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChainPurpose {
    /// External chain, addresses handed to payers.
    Receive,
    /// Internal chain, addresses for change outputs.
    Change,
}

impl ChainPurpose {
    /// Non-hardened child index of this chain under the account node.
    pub fn index(&self) -> u32 {
        match self {
            ChainPurpose::Receive => 0,
            ChainPurpose::Change => 1,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChainPurpose::Receive => "receive",
            ChainPurpose::Change => "change",
        }
    }
}

impl fmt::Display for ChainPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Derived addresses of one chain with a usage cursor.
pub struct AddressChain {
    purpose: ChainPurpose,
    provider: Arc<dyn KeyDerivationProvider>,
    chain_node: KeyNode,
    addresses: Vec<String>,
    index: HashMap<String, u32>,
    k: u32,
}

impl AddressChain {
    /// A fresh chain under `account` holding only position 0.
    pub fn new(
        purpose: ChainPurpose,
        account: &KeyNode,
        provider: Arc<dyn KeyDerivationProvider>,
    ) -> Result<Self, WalletError> {
        let chain_node = provider.derive_child(account, false, purpose.index())?;
        let mut chain = Self {
            purpose,
            provider,
            chain_node,
            addresses: Vec::new(),
            index: HashMap::new(),
            k: 0,
        };
        chain.ensure_derived(1)?;
        Ok(chain)
    }

    /// Rebuild a chain from previously derived addresses and a cursor.
    ///
    /// Each address is checked against its derivation. `k` may be at most
    /// `addresses.len()`; position `k` is derived if missing.
    pub fn restore(
        purpose: ChainPurpose,
        account: &KeyNode,
        provider: Arc<dyn KeyDerivationProvider>,
        addresses: Vec<String>,
        k: u32,
    ) -> Result<Self, WalletError> {
        if k as usize > addresses.len() {
            return Err(WalletError::Snapshot(format!(
                "{purpose} cursor {k} beyond {} derived addresses",
                addresses.len()
            )));
        }
        let mut chain = Self::new(purpose, account, provider)?;
        chain.addresses.clear();
        chain.index.clear();
        for (i, address) in addresses.into_iter().enumerate() {
            let i = u32::try_from(i).map_err(|_| CryptoError::ChildIndexOutOfRange(u32::MAX))?;
            if chain.derive_address(i)? != address {
                return Err(WalletError::Snapshot(format!(
                    "{purpose} address at index {i} does not match its derivation"
                )));
            }
            chain.push(address);
        }
        chain.k = k;
        chain.ensure_derived(k.saturating_add(1))?;
        Ok(chain)
    }

    pub fn purpose(&self) -> ChainPurpose {
        self.purpose
    }

    /// Cursor: position of the current address.
    pub fn k(&self) -> u32 {
        self.k
    }

    /// Number of derived addresses.
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// The address at the cursor.
    pub fn current_address(&self) -> &str {
        // The arena always holds position k.
        &self.addresses[self.k as usize]
    }

    pub fn is_current_address(&self, address: &str) -> bool {
        self.current_address() == address
    }

    pub fn contains_address(&self, address: &str) -> bool {
        self.index.contains_key(address)
    }

    pub fn index_of(&self, address: &str) -> Option<u32> {
        self.index.get(address).copied()
    }

    pub fn address_at(&self, position: u32) -> Option<&str> {
        self.addresses.get(position as usize).map(String::as_str)
    }

    /// Every derived address, in position order.
    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }

    /// Move the cursor one position forward and return the new current address.
    pub fn advance(&mut self) -> Result<&str, WalletError> {
        if self.k >= MAX_CHAIN_INDEX {
            return Err(CryptoError::ChildIndexOutOfRange(self.k.saturating_add(1)).into());
        }
        let next = self.k + 1;
        self.ensure_derived(next + 1)?;
        self.k = next;
        tracing::debug!(purpose = %self.purpose, k = next, "advanced chain cursor");
        Ok(self.current_address())
    }

    /// Key node for the address at `position`.
    pub fn node_at(&self, position: u32) -> Result<KeyNode, WalletError> {
        Ok(self.provider.derive_child(&self.chain_node, false, position)?)
    }

    /// Derive positions up to (excluding) `end`.
    pub(crate) fn ensure_derived(&mut self, end: u32) -> Result<(), WalletError> {
        while (self.addresses.len() as u64) < u64::from(end) {
            let position = self.addresses.len() as u32;
            let address = self.derive_address(position)?;
            self.push(address);
        }
        Ok(())
    }

    /// Raise the cursor to `k` if it is ahead of the current one.
    pub(crate) fn raise_cursor(&mut self, k: u32) -> Result<(), WalletError> {
        if k > self.k {
            self.ensure_derived(k.saturating_add(1))?;
            self.k = k;
        }
        Ok(())
    }

    /// Drop derived addresses past the cursor.
    pub(crate) fn trim_lookahead(&mut self) {
        let keep = self.k as usize + 1;
        for address in self.addresses.drain(keep.min(self.addresses.len())..) {
            self.index.remove(&address);
        }
    }

    fn derive_address(&self, position: u32) -> Result<String, WalletError> {
        let node = self.node_at(position)?;
        Ok(self.provider.address_for(&node)?)
    }

    fn push(&mut self, address: String) {
        let position = self.addresses.len() as u32;
        self.index.insert(address.clone(), position);
        self.addresses.push(address);
    }
}

impl fmt::Debug for AddressChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddressChain")
            .field("purpose", &self.purpose)
            .field("k", &self.k)
            .field("derived", &self.addresses.len())
            .finish()
    }
}
