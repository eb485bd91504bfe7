//! An adapter that runs EVM operations on a native chain.
//!
//! EVM calls are translated into function calls on the chain's EVM execution contract,
//! signed, submitted, and tracked until their receipt tree is final. The EVM-level return
//! value or revert reason and the gas burnt across all receipts are extracted from the tree.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod constants;

mod abi;
pub use abi::*;

mod account;
pub use account::*;

mod bridge;
pub use bridge::*;

mod config;
pub use config::*;

mod error;
pub use error::*;

mod hash;
pub use hash::*;

mod keys;
pub use keys::*;

mod metrics;
pub use metrics::*;

mod outcome;
pub use outcome::*;

pub mod rpc;

mod submit;
pub use submit::*;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

mod tracker;
pub use tracker::*;

mod translate;
pub use translate::*;

pub mod wire;
pub use wire::{SignedTransaction, Transaction};
