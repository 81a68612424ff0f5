//! Error types for the Cairn wallet primitives and collaborators.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid public key bytes")] InvalidPublicKey,
    #[error("invalid signature bytes")] InvalidSignature,
    #[error("signature verification failed")] VerificationFailed,
    #[error("invalid seed length: {0} bytes")] InvalidSeedLength(usize),
    #[error("invalid key node encoding: {0}")] InvalidKeyNode(String),
    #[error("child index out of range: {0}")] ChildIndexOutOfRange(u32),
    #[error("derivation failed: {0}")] Derivation(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("empty inputs or outputs")] EmptyInputsOrOutputs,
    #[error("input index out of bounds: {index} >= {len}")] InputIndexOutOfBounds { index: usize, len: usize },
    #[error("missing signature on input {0}")] MissingSignature(usize),
    #[error("zero-value output at index {0}")] ZeroValueOutput(usize),
    #[error("signing failed on input {index}: {reason}")] Signing { index: usize, reason: String },
    #[error("serialization: {0}")] Serialization(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("oracle transport: {0}")] Transport(String),
    #[error("oracle answered {got} results for {expected} addresses")] LengthMismatch { expected: usize, got: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid base58: {0}")] InvalidBase58(String),
    #[error("invalid length: {0}")] InvalidLength(usize),
    #[error("invalid checksum")] InvalidChecksum,
    #[error("unknown version byte: {0:#04x}")] UnknownVersion(u8),
    #[error("unknown network: {0}")] UnknownNetwork(String),
}
