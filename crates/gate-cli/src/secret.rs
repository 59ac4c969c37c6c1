//! # Secret Subcommand
//!
//! Generates random signing secrets for `JWT_SECRET` / `JWT_OLD_SECRETS`.
//! Output is base64url without padding, so it never contains a comma.

use anyhow::{bail, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use clap::{Args, Subcommand};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

/// Smallest accepted secret size; matches the HS256 output length.
pub const MIN_SECRET_BYTES: usize = 32;

/// Arguments for the `gate secret` subcommand.
#[derive(Args, Debug)]
pub struct SecretArgs {
    #[command(subcommand)]
    pub command: SecretCommand,
}

/// Secret subcommands.
#[derive(Subcommand, Debug)]
pub enum SecretCommand {
    /// Generate a random signing secret.
    Generate {
        /// Number of random bytes before encoding.
        #[arg(long, default_value_t = 48)]
        bytes: usize,
    },
}

/// Execute the secret subcommand.
pub fn run_secret(args: &SecretArgs) -> Result<u8> {
    match &args.command {
        SecretCommand::Generate { bytes } => {
            let secret = generate_secret(*bytes)?;
            println!("{}", secret.as_str());
            Ok(0)
        }
    }
}

/// Generate `len` random bytes from the OS RNG, base64url encoded.
pub fn generate_secret(len: usize) -> Result<Zeroizing<String>> {
    if len < MIN_SECRET_BYTES {
        bail!("secret must be at least {MIN_SECRET_BYTES} bytes, got {len}");
    }
    let mut raw = Zeroizing::new(vec![0u8; len]);
    OsRng.fill_bytes(&mut raw);
    Ok(Zeroizing::new(URL_SAFE_NO_PAD.encode(raw.as_slice())))
}
