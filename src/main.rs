//! Guest console test harness CLI
//!
//! Boots a guest OS build under an emulator, drives its console with a
//! scripted command sequence, and reports which indicator phrases appeared
//! in the captured output.

use clap::Parser;
use guest_harness::commands::Commands;
use guest_harness::{cli, common};

#[derive(Parser)]
#[command(name = "guest-harness", about = "Scripted console tests for emulated guests")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    common::logging::init();

    let cli = Cli::parse();

    if let Err(e) = cli::dispatch(cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
