//! `bridge-bench` CLI: deploys and calls EVM contracts through a native chain and reports
//! the gas each operation burns.

use bridge_bench::{Error, MainCmd};
use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Error> {
    set_thread_panic_hook();
    MainCmd::parse().run().await.inspect_err(|e| eprintln!("{e}"))
}

/// Sets thread panic hook, useful for having tests that panic.
fn set_thread_panic_hook() {
    use std::{
        backtrace::Backtrace,
        panic::{set_hook, take_hook},
        process::exit,
    };
    let orig_hook = take_hook();
    set_hook(Box::new(move |panic_info| {
        println!("Custom backtrace: {}", Backtrace::capture());
        orig_hook(panic_info);
        exit(1);
    }));
}
