//! CLI command definitions
//!
//! Defines the clap commands for the harness CLI.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run a scripted console session against the emulator
    ///
    /// With no flags this runs the built-in smoke script against the
    /// configured emulator command.
    Run {
        /// Emulator program to run (overrides the config file)
        #[arg(long)]
        program: Option<String>,

        /// Working directory for the emulator
        #[arg(long)]
        working_dir: Option<PathBuf>,

        /// Warm-up wait in seconds before the first command
        #[arg(long)]
        boot_delay: Option<u64>,

        /// Hard bound in seconds on draining output after the last command
        #[arg(long)]
        drain_timeout: Option<u64>,

        /// Seconds to wait for graceful termination before killing
        #[arg(long)]
        grace_period: Option<u64>,

        /// Scripted command in TEXT@SECS form (replaces the built-in script)
        /// Can be specified multiple times: --send "animctl start@2" --send "exit@1"
        #[arg(long = "send")]
        steps: Vec<String>,

        /// Indicator in NAME=PHRASE form (replaces the built-in indicators)
        /// Can be specified multiple times: --indicator stopped=Stopped.
        #[arg(long = "indicator")]
        indicators: Vec<String>,

        /// Arguments to pass to the emulator
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Execute a scenario defined in a YAML file
    Scenario {
        /// Path to the YAML scenario file
        path: PathBuf,

        /// Verbose output
        #[arg(long, short)]
        verbose: bool,
    },
}
