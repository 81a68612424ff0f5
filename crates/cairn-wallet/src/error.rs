//! Wallet error types.

use cairn_core::error::{CodecError, CryptoError, OracleError};
use cairn_core::types::OutPoint;
use thiserror::Error;

/// Errors that can occur in wallet operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// Malformed call arguments or configuration.
    #[error("validation: {0}")]
    Validation(String),

    /// A referenced input is not tracked by the wallet.
    #[error("unknown input: {0}")]
    UnknownInput(OutPoint),

    /// Inputs cannot cover the requested outputs plus the minimum fee.
    #[error("insufficient funds: have {have}, need {need}")]
    InsufficientFunds {
        /// Total input value in base units.
        have: u64,
        /// Output value plus minimum fee in base units.
        need: u64,
    },

    /// The required fee exceeds the caller's ceiling.
    #[error("fee too high: {fee} exceeds maximum {max}")]
    FeeTooHigh {
        /// Fee the transaction would pay.
        fee: u64,
        /// Caller-supplied ceiling.
        max: u64,
    },

    /// Query oracle failure, propagated verbatim.
    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// Signing or encoding failure from the transaction collaborators.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Key derivation failure.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// An input pays to an address outside both wallet chains.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// Snapshot is inconsistent or belongs to another network.
    #[error("snapshot: {0}")]
    Snapshot(String),

    /// Serialization error.
    #[error("serialization: {0}")]
    Serialization(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for WalletError {
    fn from(e: serde_json::Error) -> Self {
        WalletError::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for WalletError {
    fn from(e: std::io::Error) -> Self {
        WalletError::Io(e.to_string())
    }
}
