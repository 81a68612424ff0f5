//! Standard key derivation provider: BLAKE3-keyed Ed25519 derivation.
//!
//! BIP-32 public derivation does not work for Ed25519, so every child is
//! derived from its parent's chain code with BLAKE3 in keyed mode, in the
//! style of SLIP-10:
//!
//! ```text
//! hardened:     BLAKE3-XOF(key = chain_code, 0x00 || secret     || be32(index | 2^31))
//! non-hardened: BLAKE3-XOF(key = chain_code, 0x02 || public_key || be32(index))
//! ```
//!
//! The 64-byte output splits into the child secret and child chain code.

use async_trait::async_trait;
use zeroize::Zeroize;

use crate::address::{Address, Network};
use crate::crypto::{KEY_NODE_LEN, KeyNode, Signature};
use crate::error::{CodecError, CryptoError};
use crate::traits::KeyDerivationProvider;
use crate::types::Hash256;

/// BLAKE3 KDF context for the root node.
const ROOT_KDF_CONTEXT: &str = "cairn-wallet root-node v1";

/// Offset added to hardened child indices.
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// Accepted seed lengths in bytes (BIP-32 bounds).
pub const MIN_SEED_LEN: usize = 16;
pub const MAX_SEED_LEN: usize = 64;

/// Ed25519 derivation with Base58Check addresses for one network.
#[derive(Debug, Clone, Copy)]
pub struct Ed25519Provider {
    network: Network,
}

impl Ed25519Provider {
    pub fn new(network: Network) -> Self {
        Self { network }
    }

    pub fn network(&self) -> Network {
        self.network
    }
}

fn expand(hasher: blake3::Hasher) -> KeyNode {
    let mut material = [0u8; KEY_NODE_LEN];
    hasher.finalize_xof().fill(&mut material);
    let node = KeyNode::from_material(&material);
    material.zeroize();
    node
}

#[async_trait]
impl KeyDerivationProvider for Ed25519Provider {
    fn derive_root(&self, seed: &[u8]) -> Result<KeyNode, CryptoError> {
        if !(MIN_SEED_LEN..=MAX_SEED_LEN).contains(&seed.len()) {
            return Err(CryptoError::InvalidSeedLength(seed.len()));
        }
        let mut hasher = blake3::Hasher::new_derive_key(ROOT_KDF_CONTEXT);
        hasher.update(seed);
        Ok(expand(hasher))
    }

    fn derive_child(&self, node: &KeyNode, hardened: bool, index: u32) -> Result<KeyNode, CryptoError> {
        if index >= HARDENED_OFFSET {
            return Err(CryptoError::ChildIndexOutOfRange(index));
        }
        let mut hasher = blake3::Hasher::new_keyed(node.chain_code());
        if hardened {
            hasher.update(&[0x00]);
            hasher.update(node.secret());
            hasher.update(&(index | HARDENED_OFFSET).to_be_bytes());
        } else {
            hasher.update(&[0x02]);
            hasher.update(&node.keypair().public_key().to_bytes());
            hasher.update(&index.to_be_bytes());
        }
        Ok(expand(hasher))
    }

    fn address_for(&self, node: &KeyNode) -> Result<String, CryptoError> {
        let public_key = node.keypair().public_key().to_bytes();
        Ok(Address::from_public_key(&public_key, self.network).encode())
    }

    async fn sign(&self, node: &KeyNode, digest: &Hash256) -> Result<Signature, CodecError> {
        let keypair = node.keypair();
        Ok(Signature {
            bytes: keypair.sign(digest.as_bytes()).to_vec(),
            public_key: keypair.public_key().to_bytes().to_vec(),
        })
    }
}
