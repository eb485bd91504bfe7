//! Gas accounting over outcome trees.

use core::{fmt, iter::Sum, ops::Add};

use crate::{constants::TGAS, CryptoHash, ExecutionOutcome};

/// An amount of native gas.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::From, derive_more::Into,
)]
pub struct Gas(u64);

impl Gas {
    /// Zero gas.
    pub const ZERO: Self = Self(0);

    /// Wraps a raw gas amount.
    pub const fn new(gas: u64) -> Self {
        Self(gas)
    }

    /// The raw gas amount.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Adds two amounts, `None` on overflow.
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.0.checked_add(rhs.0) {
            Some(gas) => Some(Self(gas)),
            None => None,
        }
    }

    /// The amount in Tgas (10^12 gas). For display only, use [`Gas::get`] for comparisons.
    pub fn as_tgas(self) -> f64 {
        self.0 as f64 / TGAS as f64
    }
}

/// Overflows like `u64` addition.
impl Add for Gas {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Gas {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// Formats the amount in Tgas, e.g. `2.7`.
impl fmt::Display for Gas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match f.precision() {
            Some(precision) => write!(f, "{:.*}", precision, self.as_tgas()),
            None => write!(f, "{}", self.as_tgas()),
        }
    }
}

/// Total gas burnt by `outcome`: the transaction itself plus every receipt below it.
pub fn extract_gas(outcome: &ExecutionOutcome) -> Gas {
    outcome.iter().map(|node| Gas(node.gas_burnt)).sum()
}

/// Per-step breakdown of the gas of an outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasProfile {
    /// Gas burnt converting the transaction into its first receipt
    pub transaction: Gas,
    /// Gas burnt by each receipt, in execution order
    pub receipts: Vec<(CryptoHash, Gas)>,
}

impl GasProfile {
    /// Builds the breakdown of `outcome`.
    pub fn new(outcome: &ExecutionOutcome) -> Self {
        let receipts = outcome.iter().skip(1).map(|node| (node.id, Gas(node.gas_burnt))).collect();
        Self { transaction: Gas(outcome.gas_burnt), receipts }
    }

    /// Gas burnt by all receipts.
    pub fn receipts_total(&self) -> Gas {
        self.receipts.iter().map(|(_, gas)| *gas).sum()
    }

    /// Total gas, equal to [`extract_gas`] of the outcome.
    pub fn total(&self) -> Gas {
        self.transaction + self.receipts_total()
    }
}

/// Gas measured for one benchmarked operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkResult {
    /// Name of the operation, e.g. `Deploy Contract`
    pub operation: String,
    /// Total gas burnt
    pub gas: Gas,
}

impl BenchmarkResult {
    /// Creates a result.
    pub fn new(operation: impl Into<String>, gas: Gas) -> Self {
        Self { operation: operation.into(), gas }
    }
}

impl fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} Tgas", self.operation, self.gas)
    }
}
