//! # cairn-core
//! Primitive types, address encoding and collaborator traits for the Cairn wallet.

pub mod address;
pub mod codec;
pub mod constants;
pub mod crypto;
pub mod derivation;
pub mod error;
pub mod traits;
pub mod types;
