use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::logging::LogArgs;

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Hexadecimal (lowercase)
    Hex,
    /// Uppercase hexadecimal
    HexUpper,
    /// Raw binary bytes
    Raw,
    /// Base64 (standard, with padding)
    Base64,
    /// Base64 URL-safe (no padding)
    Base64url,
}

#[derive(Debug, Parser)]
#[command(name = "poolrand", about = "Fortuna CSPRNG byte and integer generator")]
pub struct Cli {
    /// Number of random bytes to generate
    #[arg(short = 'n', long = "bytes", default_value_t = 32)]
    pub bytes: usize,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Hex)]
    pub format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(short = 'o', long = "output-file")]
    pub output_file: Option<PathBuf>,

    /// Seed from a file holding exactly 64 raw bytes instead of OS randomness
    #[arg(long = "seed-file")]
    pub seed_file: Option<PathBuf>,

    /// Disable the CPU jitter entropy source
    #[arg(long = "no-jitter")]
    pub no_jitter: bool,

    /// Disable the /proc snapshot entropy source
    #[arg(long = "no-procfs")]
    pub no_procfs: bool,

    /// Disable feeding generator output back into the pools on long reads
    #[arg(long = "no-self-feed")]
    pub no_self_feed: bool,

    /// Configuration file path (default: /etc/poolrand.toml)
    #[arg(long = "config")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub log: LogArgs,
}
