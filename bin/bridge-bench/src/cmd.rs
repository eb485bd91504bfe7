use clap::{Parser, Subcommand};
use evm_bridge::{rpc::NativeRpc, EvmBridge};

use crate::common::{BenchError, ConnectionArgs, LogArgs};

/// Deploys and calls EVM contracts through a native chain, reporting the gas burnt
#[derive(Parser, Debug)]
#[command(infer_subcommands = true, version)]
pub struct MainCmd {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,

    /// Connection configuration
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Logging configuration
    #[command(flatten)]
    pub log: LogArgs,
}

/// Commands of the CLI
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Deploy EVM bytecode
    Deploy(crate::deploy::Cmd),
    /// Send a call to a contract
    Call(crate::call::Cmd),
    /// Read state without a transaction
    View(crate::view::Cmd),
    /// Query the outcome of a transaction
    Status(crate::status::Cmd),
    /// Run a benchmark plan
    Bench(crate::bench::Cmd),
    /// Install the EVM contract code
    InstallEvm(crate::install::Cmd),
}

/// Error types for the main command
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Command failed
    #[error("{0}")]
    Bench(#[from] BenchError),
}

impl MainCmd {
    /// Sets up logging, connects and runs the command.
    pub async fn run(&self) -> Result<(), Error> {
        self.log.init()?;
        let bridge = self.connection.connect()?;
        self.command.run(&bridge).await
    }
}

impl Command {
    /// Runs the command against `bridge`.
    pub async fn run<C: NativeRpc>(&self, bridge: &EvmBridge<C>) -> Result<(), Error> {
        match self {
            Self::Deploy(cmd) => {
                cmd.run(bridge).await?;
            }
            Self::Call(cmd) => {
                cmd.run(bridge).await?;
            }
            Self::View(cmd) => {
                cmd.run(bridge).await?;
            }
            Self::Status(cmd) => {
                cmd.run(bridge).await?;
            }
            Self::Bench(cmd) => {
                cmd.run(bridge).await?;
            }
            Self::InstallEvm(cmd) => {
                cmd.run(bridge).await?;
            }
        }
        Ok(())
    }
}
