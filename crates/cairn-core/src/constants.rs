//! Wallet constants. All monetary values in base units (1 coin = 10^8 units).

pub const COIN: u64 = 100_000_000;

/// Consecutive unused addresses that end a discovery scan.
pub const DEFAULT_GAP_LIMIT: u32 = 20;

/// Default fee rate in base units per estimated byte.
pub const DEFAULT_FEE_RATE: u64 = 10;

/// Change at or below this value is folded into the fee.
pub const DEFAULT_DUST_THRESHOLD: u64 = 546;

// Size model used for fee estimation:
// overhead + inputs * INPUT_BYTES + outputs * OUTPUT_BYTES.

/// Fixed per-transaction bytes (version, counts, lock time).
pub const TX_OVERHEAD_BYTES: u64 = 10;

/// Estimated bytes per signed input.
pub const INPUT_BYTES: u64 = 148;

/// Estimated bytes per output.
pub const OUTPUT_BYTES: u64 = 34;

/// Hardened account index under the root.
pub const ACCOUNT_INDEX: u32 = 0;

/// Highest child index a chain may derive.
pub const MAX_CHAIN_INDEX: u32 = 0x7fff_ffff;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_input_two_output_size() {
        assert_eq!(TX_OVERHEAD_BYTES + INPUT_BYTES + 2 * OUTPUT_BYTES, 226);
    }

    #[test]
    fn dust_below_single_input_fee() {
        assert!(DEFAULT_DUST_THRESHOLD < INPUT_BYTES * DEFAULT_FEE_RATE);
    }
}
