// src/cli/mod.rs
use clap::Parser;

pub mod commands;
pub mod menu;
pub mod handlers;

pub use commands::{CliCommand, GenerationArgs};

#[derive(Parser, Debug)]
#[command(author, version, about = "Password generator with per-account saved passwords", long_about = None)]
pub struct Args {
    /// Print command output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Database URL (overrides configuration)
    #[arg(long, short, env = "DATABASE_URL")]
    pub db: Option<String>,

    /// Command to execute; the interactive menu runs when omitted
    #[command(subcommand)]
    pub command: Option<CliCommand>,

    /// API server port
    #[arg(long)]
    pub api_port: Option<u16>,

    /// Run in API-only mode (no CLI)
    #[arg(long)]
    pub api_only: bool,
}
