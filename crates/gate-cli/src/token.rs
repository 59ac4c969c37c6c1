//! # Token Subcommand
//!
//! Issue and verify tokens outside the running service, using the same key
//! ring semantics. Useful for checking a rotation plan before rolling it out:
//! issue under the old secret, then verify with the new secret plus the old
//! one in `--retired`.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use gate_core::UserId;
use gate_token::{KeySlot, TokenConfig, TokenService, DEFAULT_ISSUER};

/// Arguments for the `gate token` subcommand.
#[derive(Args, Debug)]
pub struct TokenArgs {
    #[command(subcommand)]
    pub command: TokenCommand,
}

/// Token subcommands.
#[derive(Subcommand, Debug)]
pub enum TokenCommand {
    /// Issue a token for a user.
    Issue {
        /// User identifier to place in the subject claim.
        #[arg(long)]
        subject: UserId,
        /// Current signing secret.
        #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
        secret: String,
        /// Issuer claim.
        #[arg(long, env = "JWT_ISSUER", default_value = DEFAULT_ISSUER)]
        issuer: String,
        /// Lifetime in whole hours.
        #[arg(long, env = "TOKEN_EXPIRES_IN", default_value_t = 24)]
        hours: i64,
    },

    /// Verify a token and print its subject.
    Verify {
        /// The token to verify.
        #[arg(value_name = "TOKEN")]
        token: String,
        /// Current signing secret.
        #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
        secret: String,
        /// Retired secrets, comma-separated, newest first.
        #[arg(
            long,
            env = "JWT_OLD_SECRETS",
            hide_env_values = true,
            value_delimiter = ',',
            num_args = 0..
        )]
        retired: Vec<String>,
    },
}

/// Execute the token subcommand.
pub fn run_token(args: &TokenArgs) -> Result<u8> {
    match &args.command {
        TokenCommand::Issue {
            subject,
            secret,
            issuer,
            hours,
        } => cmd_issue(*subject, secret, issuer, *hours),
        TokenCommand::Verify {
            token,
            secret,
            retired,
        } => cmd_verify(token, secret, retired),
    }
}

fn cmd_issue(subject: UserId, secret: &str, issuer: &str, hours: i64) -> Result<u8> {
    let service = TokenService::new(
        TokenConfig::new(secret)
            .with_issuer(issuer)
            .with_lifetime_hours(hours),
    )
    .context("invalid token configuration")?;
    let issued = service
        .issue(subject)
        .context("failed to sign token")?;

    tracing::info!(subject = %subject, exp = issued.claims.exp, "issued token");
    println!("{}", issued.token);
    Ok(0)
}

fn cmd_verify(token: &str, secret: &str, retired: &[String]) -> Result<u8> {
    let retired: Vec<&str> = retired
        .iter()
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .collect();
    let service = TokenService::new(TokenConfig::new(secret).with_retired(retired))
        .context("invalid key ring")?;

    Ok(report(&service, token))
}

/// Verify `token` and print the outcome. Returns the exit code.
fn report(service: &TokenService, token: &str) -> u8 {
    match service.verify_at(token.trim(), chrono::Utc::now()) {
        Ok(verified) => {
            let key = match verified.key {
                KeySlot::Current => "current".to_string(),
                KeySlot::Retired(i) => format!("retired[{i}]"),
            };
            println!("OK: subject {}", verified.user_id);
            println!("  issuer:  {}", verified.claims.iss);
            if let Some(exp) = verified.claims.expires_at() {
                println!("  expires: {}", exp.to_rfc3339());
            }
            println!("  key:     {key}");
            0
        }
        Err(e) => {
            println!("REJECTED: {} ({})", e, e.reason());
            1
        }
    }
}
