//! # gate CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gate_cli::password::{run_password, PasswordArgs};
use gate_cli::secret::{run_secret, SecretArgs};
use gate_cli::token::{run_token, TokenArgs};

/// tokengate operator CLI
///
/// Operator tooling around the API server's key ring and user directory.
/// Token commands apply the same key ring rules the server uses.
#[derive(Parser, Debug)]
#[command(name = "gate", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Signing secret generation.
    Secret(SecretArgs),

    /// Password hashing for the user directory.
    Password(PasswordArgs),

    /// Token issuance and verification.
    Token(TokenArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Secret(args) => run_secret(&args),
        Commands::Password(args) => run_password(&args),
        Commands::Token(args) => run_token(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
