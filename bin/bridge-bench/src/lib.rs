//! Commands of the `bridge-bench` CLI.

mod cmd;
pub use cmd::*;

/// Running benchmark plans
pub mod bench;
/// Calling contracts through the bridge
pub mod call;
/// Arguments, errors and helpers shared by all commands
pub mod common;
/// Deploying bytecode
pub mod deploy;
/// Installing the EVM contract code
pub mod install;
/// Querying earlier submissions
pub mod status;
/// Read-only calls and state queries
pub mod view;
