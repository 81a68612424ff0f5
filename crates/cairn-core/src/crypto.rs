//! Ed25519 keys, derivation nodes and signatures.
//!
//! Uses ed25519-dalek for signing and verification. Secret material held in
//! [`KeyNode`] is zeroized on drop.

use ed25519_dalek::{Signer, Verifier};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

/// Encoded length of a [`KeyNode`]: secret key followed by chain code.
pub const KEY_NODE_LEN: usize = 64;

/// A node in the derivation tree: 32 bytes of secret key material plus a
/// 32-byte chain code used to derive its children.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct KeyNode {
    secret: [u8; 32],
    chain_code: [u8; 32],
}

impl KeyNode {
    pub fn new(secret: [u8; 32], chain_code: [u8; 32]) -> Self {
        Self { secret, chain_code }
    }

    /// Split 64 bytes of key material into secret (left) and chain code (right).
    pub fn from_material(material: &[u8; KEY_NODE_LEN]) -> Self {
        let mut secret = [0u8; 32];
        let mut chain_code = [0u8; 32];
        secret.copy_from_slice(&material[..32]);
        chain_code.copy_from_slice(&material[32..]);
        Self { secret, chain_code }
    }

    pub fn secret(&self) -> &[u8; 32] {
        &self.secret
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    /// Signing keypair for this node.
    pub fn keypair(&self) -> KeyPair {
        KeyPair::from_secret_bytes(self.secret)
    }

    /// Serialize as lowercase hex (`secret || chain_code`). Handle with care.
    pub fn to_hex(&self) -> String {
        let mut bytes = [0u8; KEY_NODE_LEN];
        bytes[..32].copy_from_slice(&self.secret);
        bytes[32..].copy_from_slice(&self.chain_code);
        let encoded = hex::encode(&bytes);
        bytes.zeroize();
        encoded
    }

    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let mut bytes = [0u8; KEY_NODE_LEN];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| CryptoError::InvalidKeyNode(e.to_string()))?;
        let node = Self::from_material(&bytes);
        bytes.zeroize();
        Ok(node)
    }
}

impl fmt::Debug for KeyNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyNode")
            .field("public_key", &self.keypair().public_key())
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Ed25519 keypair for signing digests.
pub struct KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

impl KeyPair {
    /// Create a keypair from 32-byte secret key material.
    pub fn from_secret_bytes(bytes: [u8; 32]) -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(&bytes),
        }
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            verifying_key: self.signing_key.verifying_key(),
        }
    }

    /// Sign a message, returning the raw 64-byte Ed25519 signature.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

/// Ed25519 public key for verifying signatures and deriving addresses.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    verifying_key: ed25519_dalek::VerifyingKey,
}

impl PublicKey {
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        let vk = ed25519_dalek::VerifyingKey::from_bytes(bytes)
            .map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self { verifying_key: vk })
    }

    /// Parse from a byte slice that must be exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| CryptoError::InvalidPublicKey)?;
        Self::from_bytes(&arr)
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.verifying_key.to_bytes()
    }

    /// Verify an Ed25519 signature on a message.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        let sig_bytes: [u8; 64] = signature
            .try_into()
            .map_err(|_| CryptoError::InvalidSignature)?;
        let sig = ed25519_dalek::Signature::from_bytes(&sig_bytes);
        self.verifying_key
            .verify(message, &sig)
            .map_err(|_| CryptoError::VerificationFailed)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.to_bytes()))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.to_bytes()))
    }
}

/// A signature over a digest together with the signer's public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub bytes: Vec<u8>,
    pub public_key: Vec<u8>,
}
