use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use keystretch_core::VERSION;

/// Keystretch - memory-hard key stretching with live progress
#[derive(Parser)]
#[command(name = "keystretch")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the config file
    #[arg(short, long, global = true, env = "KEYSTRETCH_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Arguments for the `derive` command
#[derive(Args)]
pub struct DeriveArgs {
    /// Read the passphrase from the first line of stdin
    #[arg(long)]
    pub passphrase_stdin: bool,

    /// Salt as hex (random 16 bytes if omitted)
    #[arg(long, value_name = "HEX")]
    pub salt_hex: Option<String>,

    /// Argon2 memory cost in KiB (overrides config)
    #[arg(long, value_name = "KIB")]
    pub memory_kib: Option<u32>,

    /// Argon2 iterations per round (overrides config)
    #[arg(long)]
    pub iterations: Option<u32>,

    /// Argon2 lanes (overrides config)
    #[arg(long)]
    pub lanes: Option<u32>,

    /// Number of chained Argon2 rounds (overrides config)
    #[arg(long)]
    pub rounds: Option<u32>,

    /// Terminate the derivation if it is still running after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Start the same derivation again after this many milliseconds
    #[arg(long, value_name = "MS")]
    pub restart_after_ms: Option<u64>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `config init` command
#[derive(Args)]
pub struct ConfigInitArgs {
    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Write a config file with default values
    Init(ConfigInitArgs),

    /// Print the effective configuration
    Show,
}

/// Arguments for the `completions` command
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_name = "SHELL")]
    pub shell: Shell,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Derive a key from a passphrase, showing progress
    Derive(DeriveArgs),

    /// Manage the config file
    #[command(subcommand)]
    Config(ConfigSubcommand),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
