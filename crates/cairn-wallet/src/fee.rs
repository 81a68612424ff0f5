//! Fee estimation from a linear transaction size model.
//!
//! `size = TX_OVERHEAD_BYTES + INPUT_BYTES * inputs + OUTPUT_BYTES * outputs`
//! and `fee = rate * size`. All arithmetic is checked; `None` means overflow.

use serde::{Deserialize, Serialize};
use std::fmt;

use cairn_core::constants::{DEFAULT_FEE_RATE, INPUT_BYTES, OUTPUT_BYTES, TX_OVERHEAD_BYTES};

/// Fee rate in base units per estimated byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeeRate(u64);

impl FeeRate {
    pub const fn per_byte(units: u64) -> Self {
        Self(units)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Fee for a transaction with the given input and output counts.
    pub fn fee_for(&self, inputs: usize, outputs: usize) -> Option<u64> {
        estimate_size(inputs, outputs)?.checked_mul(self.0)
    }
}

impl Default for FeeRate {
    fn default() -> Self {
        Self(DEFAULT_FEE_RATE)
    }
}

impl fmt::Display for FeeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/byte", self.0)
    }
}

/// Estimated serialized size in bytes.
pub fn estimate_size(inputs: usize, outputs: usize) -> Option<u64> {
    let inputs = u64::try_from(inputs).ok()?;
    let outputs = u64::try_from(outputs).ok()?;
    INPUT_BYTES
        .checked_mul(inputs)?
        .checked_add(OUTPUT_BYTES.checked_mul(outputs)?)?
        .checked_add(TX_OVERHEAD_BYTES)
}
