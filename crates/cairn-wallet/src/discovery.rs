//! Gap-limit discovery of used addresses.
//!
//! A chain is scanned in batches of `gap_limit` positions starting at 0.
//! Each batch is sent to the [`QueryOracle`]; if any address in the batch
//! has history, the chain cursor is raised to one past the last used
//! position and the next batch is scanned. The first batch with no history
//! ends the scan.
//!
//! Batches within a chain are sequential. The receive and change chains are
//! scanned concurrently.

use tracing::{debug, info};

use cairn_core::error::{CryptoError, OracleError};
use cairn_core::traits::QueryOracle;

use crate::chain::{AddressChain, ChainPurpose};
use crate::error::WalletError;

/// Outcome of scanning one chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryReport {
    pub purpose: ChainPurpose,
    /// Highest position observed with history, if any.
    pub boundary: Option<u32>,
    /// Cursor after the scan.
    pub k: u32,
    /// Oracle queries issued.
    pub batches: u32,
    /// Addresses sent to the oracle.
    pub scanned: u64,
}

/// Reports for both chains of an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountDiscovery {
    pub receive: DiscoveryReport,
    pub change: DiscoveryReport,
}

/// Gap-limit scanner.
#[derive(Debug, Clone, Copy)]
pub struct DiscoveryEngine {
    gap_limit: u32,
}

impl DiscoveryEngine {
    pub fn new(gap_limit: u32) -> Result<Self, WalletError> {
        if gap_limit == 0 {
            return Err(WalletError::Validation("gap limit must be positive".into()));
        }
        Ok(Self { gap_limit })
    }

    pub fn gap_limit(&self) -> u32 {
        self.gap_limit
    }

    /// Scan both chains concurrently.
    ///
    /// Each chain keeps whatever progress its own scan made. If either scan
    /// fails, the receive chain's error is reported first.
    pub async fn discover_account(
        &self,
        receive: &mut AddressChain,
        change: &mut AddressChain,
        oracle: &dyn QueryOracle,
    ) -> Result<AccountDiscovery, WalletError> {
        let (receive, change) = tokio::join!(self.scan(receive, oracle), self.scan(change, oracle));
        Ok(AccountDiscovery {
            receive: receive?,
            change: change?,
        })
    }

    /// Scan one chain. Look-ahead addresses are dropped afterwards, whether
    /// or not the scan succeeded.
    pub async fn scan(
        &self,
        chain: &mut AddressChain,
        oracle: &dyn QueryOracle,
    ) -> Result<DiscoveryReport, WalletError> {
        let result = self.scan_batches(chain, oracle).await;
        chain.trim_lookahead();
        match &result {
            Ok(report) => info!(
                purpose = %report.purpose,
                k = report.k,
                batches = report.batches,
                "discovery complete"
            ),
            Err(e) => debug!(purpose = %chain.purpose(), k = chain.k(), "discovery aborted: {e}"),
        }
        result
    }

    async fn scan_batches(
        &self,
        chain: &mut AddressChain,
        oracle: &dyn QueryOracle,
    ) -> Result<DiscoveryReport, WalletError> {
        let purpose = chain.purpose();
        let mut report = DiscoveryReport {
            purpose,
            boundary: None,
            k: chain.k(),
            batches: 0,
            scanned: 0,
        };
        let mut start: u32 = 0;

        loop {
            let end = start
                .checked_add(self.gap_limit)
                .ok_or(CryptoError::ChildIndexOutOfRange(start))?;
            chain.ensure_derived(end)?;
            let batch = chain.addresses()[start as usize..end as usize].to_vec();

            debug!(%purpose, start, size = batch.len(), "querying oracle");
            let used = oracle.query(&batch).await?;
            if used.len() != batch.len() {
                return Err(OracleError::LengthMismatch {
                    expected: batch.len(),
                    got: used.len(),
                }
                .into());
            }
            report.batches += 1;
            report.scanned += batch.len() as u64;

            let Some(offset) = used.iter().rposition(|has_history| *has_history) else {
                break;
            };
            let last_used = start + offset as u32;
            chain.raise_cursor(last_used + 1)?;
            report.boundary = Some(last_used);
            report.k = chain.k();
            debug!(%purpose, last_used, k = report.k, "batch has history");
            start = end;
        }

        report.k = chain.k();
        Ok(report)
    }
}
