//! Network parameters and Base58Check address encoding.
//!
//! An address is `base58(version || key_hash || checksum)` where `version` is
//! the network's address version byte, `key_hash` is the first 20 bytes of
//! the BLAKE3 hash of the Ed25519 public key, and `checksum` is the first 4
//! bytes of double SHA-256 over `version || key_hash`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::error::AddressError;

/// Length of the key hash carried by an address.
pub const KEY_HASH_LEN: usize = 20;

/// Length of the Base58Check checksum.
const CHECKSUM_LEN: usize = 4;

/// Decoded payload length: version + key hash + checksum.
const PAYLOAD_LEN: usize = 1 + KEY_HASH_LEN + CHECKSUM_LEN;

/// Network parameters. Compared by equality only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Production network (version byte `0x00`).
    #[default]
    Mainnet,
    /// Test network (version byte `0x6f`).
    Testnet,
}

impl Network {
    /// Address version byte for this network.
    pub fn address_version(&self) -> u8 {
        match self {
            Network::Mainnet => 0x00,
            Network::Testnet => 0x6f,
        }
    }

    /// Look up a network from its address version byte.
    pub fn from_address_version(version: u8) -> Result<Self, AddressError> {
        match version {
            0x00 => Ok(Network::Mainnet),
            0x6f => Ok(Network::Testnet),
            other => Err(AddressError::UnknownVersion(other)),
        }
    }

    /// Stable identifier used in snapshots.
    pub fn name(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Network {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            other => Err(AddressError::UnknownNetwork(other.to_string())),
        }
    }
}

/// A pay-to-key-hash address for a given network.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Address {
    network: Network,
    key_hash: [u8; KEY_HASH_LEN],
}

impl Address {
    pub fn from_key_hash(key_hash: [u8; KEY_HASH_LEN], network: Network) -> Self {
        Self { network, key_hash }
    }

    /// Address of a raw 32-byte Ed25519 public key.
    pub fn from_public_key(public_key: &[u8; 32], network: Network) -> Self {
        let digest = blake3::hash(public_key);
        let mut key_hash = [0u8; KEY_HASH_LEN];
        key_hash.copy_from_slice(&digest.as_bytes()[..KEY_HASH_LEN]);
        Self::from_key_hash(key_hash, network)
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn key_hash(&self) -> &[u8; KEY_HASH_LEN] {
        &self.key_hash
    }

    /// Locking script for outputs paying this address.
    ///
    /// `OP_DUP OP_HASH OP_PUSH20 <key_hash> OP_EQUALVERIFY OP_CHECKSIG`.
    pub fn script(&self) -> Vec<u8> {
        let mut script = Vec::with_capacity(KEY_HASH_LEN + 5);
        script.extend_from_slice(&[0x76, 0xa9, KEY_HASH_LEN as u8]);
        script.extend_from_slice(&self.key_hash);
        script.extend_from_slice(&[0x88, 0xac]);
        script
    }

    /// Encode as a Base58Check string.
    pub fn encode(&self) -> String {
        let mut payload = Vec::with_capacity(PAYLOAD_LEN);
        payload.push(self.network.address_version());
        payload.extend_from_slice(&self.key_hash);
        let check = checksum(&payload);
        payload.extend_from_slice(&check);
        bs58::encode(payload).into_string()
    }

    /// Decode a Base58Check string.
    pub fn decode(s: &str) -> Result<Self, AddressError> {
        let payload = bs58::decode(s)
            .into_vec()
            .map_err(|e| AddressError::InvalidBase58(e.to_string()))?;
        if payload.len() != PAYLOAD_LEN {
            return Err(AddressError::InvalidLength(payload.len()));
        }
        let (body, check) = payload.split_at(1 + KEY_HASH_LEN);
        if checksum(body).as_slice() != check {
            return Err(AddressError::InvalidChecksum);
        }
        let network = Network::from_address_version(body[0])?;
        let mut key_hash = [0u8; KEY_HASH_LEN];
        key_hash.copy_from_slice(&body[1..]);
        Ok(Self { network, key_hash })
    }
}

fn checksum(data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&second[..CHECKSUM_LEN]);
    out
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::decode(&s).map_err(serde::de::Error::custom)
    }
}
