//! # cairn-wallet — HD wallet core.
//!
//! Derives receive and change address chains from one account, discovers
//! used addresses through a query oracle under a gap limit, tracks
//! spendable outputs, and builds fee-correct transactions with change.
//!
//! # Modules
//!
//! - [`error`] — `WalletError` enum
//! - [`config`] — Gap limit, fee rate and dust policy
//! - [`fee`] — Linear size model and `FeeRate`
//! - [`keys`] — `Seed` and the standard account path
//! - [`chain`] — `AddressChain` arena with usage cursor
//! - [`account`] — Account key node with its two chains
//! - [`discovery`] — Gap-limit scanning
//! - [`unspent`] — Tracked unspent outputs
//! - [`builder`] — Fee/change planning, signing and encoding
//! - [`snapshot`] — JSON export/import format
//! - [`wallet`] — High-level wallet composition

pub mod account;
pub mod builder;
pub mod chain;
pub mod config;
pub mod discovery;
pub mod error;
pub mod fee;
pub mod keys;
pub mod snapshot;
pub mod unspent;
pub mod wallet;

// Re-exports for convenient access
pub use account::Account;
pub use builder::{BuildResult, FeePlan, TransactionBuilder};
pub use chain::{AddressChain, ChainPurpose};
pub use config::WalletConfig;
pub use discovery::{AccountDiscovery, DiscoveryEngine, DiscoveryReport};
pub use error::WalletError;
pub use fee::FeeRate;
pub use keys::Seed;
pub use snapshot::{ChainSnapshot, WalletSnapshot};
pub use unspent::{UnspentOutput, UnspentOutputSet};
pub use wallet::{Collaborators, Wallet};
