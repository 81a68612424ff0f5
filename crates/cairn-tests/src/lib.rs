//! Integration and property tests for the Cairn wallet.
//!
//! Tests drive a real [`cairn_wallet::Wallet`] with the standard derivation
//! provider and codec, substituting scripted fakes for the query oracle and,
//! where a test needs a failure, for the signer or encoder.

pub mod helpers;
