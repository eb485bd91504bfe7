//! Test utilities for the EVM bridge.

mod chain;
mod outcome;

pub use chain::*;
pub use outcome::*;
