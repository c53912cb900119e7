// src/cli/commands.rs
use clap::{Args as ClapArgs, Subcommand};

use crate::models::GenerationRequest;

pub const MAX_GENERATE_COUNT: i64 = 1000;

/// Character class and length flags shared by the generating commands.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct GenerationArgs {
    /// Password length (8-128)
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(8..=128))]
    pub length: Option<u16>,

    /// Leave out uppercase letters
    #[arg(long)]
    pub no_uppercase: bool,

    /// Leave out lowercase letters
    #[arg(long)]
    pub no_lowercase: bool,

    /// Leave out digits
    #[arg(long)]
    pub no_numbers: bool,

    /// Leave out symbols
    #[arg(long)]
    pub no_symbols: bool,
}

impl GenerationArgs {
    pub fn to_request(&self, default_length: usize) -> GenerationRequest {
        GenerationRequest {
            length: self.length.map(usize::from).unwrap_or(default_length),
            include_uppercase: !self.no_uppercase,
            include_lowercase: !self.no_lowercase,
            include_numbers: !self.no_numbers,
            include_symbols: !self.no_symbols,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Generate one or more passwords
    Generate {
        #[command(flatten)]
        options: GenerationArgs,

        /// How many passwords to generate (1-1000)
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..=MAX_GENERATE_COUNT))]
        count: u16,

        /// Copy the last generated password to the clipboard
        #[arg(long)]
        copy: bool,
    },

    /// Show the strength tier for a set of options
    Strength {
        #[command(flatten)]
        options: GenerationArgs,
    },

    /// Create an account
    Signup {
        /// Account email (prompted when omitted)
        #[arg(long)]
        email: Option<String>,
    },

    /// Sign in and print a session token
    Signin {
        /// Account email (prompted when omitted)
        #[arg(long)]
        email: Option<String>,
    },

    /// End a session
    Signout {
        /// Session token
        #[arg(long, env = "PASSGEN_TOKEN")]
        token: String,
    },

    /// Save a password to your account, generating one if none is given
    Save {
        /// Session token
        #[arg(long, env = "PASSGEN_TOKEN")]
        token: String,

        /// Label for the saved password
        #[arg(long)]
        label: Option<String>,

        /// Password text to save instead of a generated one
        #[arg(long)]
        password: Option<String>,

        #[command(flatten)]
        options: GenerationArgs,
    },

    /// List saved passwords
    List {
        /// Session token
        #[arg(long, env = "PASSGEN_TOKEN")]
        token: String,

        /// Print passwords in full instead of masked
        #[arg(long)]
        reveal: bool,
    },

    /// Delete a saved password
    Delete {
        /// Session token
        #[arg(long, env = "PASSGEN_TOKEN")]
        token: String,

        /// Saved password ID
        #[arg(required = true)]
        id: String,
    },

    /// Run the HTTP API only
    Serve,
}
