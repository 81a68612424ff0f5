//! Seed handling and the standard account derivation path.
//!
//! ```text
//! root ──hardened ACCOUNT_INDEX──▶ account ──purpose (0|1)──▶ chain ──index──▶ address node
//! ```
//!
//! Only the account step is hardened, so a chain's nodes can be derived
//! from the account node alone.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use cairn_core::constants::ACCOUNT_INDEX;
use cairn_core::crypto::KeyNode;
use cairn_core::derivation::{MAX_SEED_LEN, MIN_SEED_LEN};
use cairn_core::error::CryptoError;
use cairn_core::traits::KeyDerivationProvider;

use crate::error::WalletError;

/// Master seed bytes (16 to 64 bytes).
///
/// Secret material is zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Seed {
    bytes: Vec<u8>,
}

impl Seed {
    /// Create a seed from raw bytes, checking the length.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WalletError> {
        if !(MIN_SEED_LEN..=MAX_SEED_LEN).contains(&bytes.len()) {
            return Err(CryptoError::InvalidSeedLength(bytes.len()).into());
        }
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    /// Parse a hex-encoded seed.
    pub fn from_hex(s: &str) -> Result<Self, WalletError> {
        let mut bytes =
            hex::decode(s).map_err(|e| WalletError::Validation(format!("seed hex: {e}")))?;
        let seed = Self::from_bytes(&bytes);
        bytes.zeroize();
        seed
    }

    /// Raw seed bytes. Handle with care.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seed")
            .field("len", &self.bytes.len())
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Derive the account node for `seed` at the standard path.
pub fn derive_account(
    provider: &dyn KeyDerivationProvider,
    seed: &Seed,
) -> Result<KeyNode, WalletError> {
    let root = provider.derive_root(seed.as_bytes())?;
    Ok(provider.derive_child(&root, true, ACCOUNT_INDEX)?)
}
