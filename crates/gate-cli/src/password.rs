//! # Password Subcommand
//!
//! Produces `password_hash` values for the API server's user directory file.
//! The password is read from stdin so it never appears in shell history or
//! the process list.

use std::io::BufRead;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use gate_api::users::hash_password;
use zeroize::Zeroizing;

/// Arguments for the `gate password` subcommand.
#[derive(Args, Debug)]
pub struct PasswordArgs {
    #[command(subcommand)]
    pub command: PasswordCommand,
}

/// Password subcommands.
#[derive(Subcommand, Debug)]
pub enum PasswordCommand {
    /// Read a password from stdin and print its Argon2id PHC hash.
    Hash,
}

/// Execute the password subcommand.
pub fn run_password(args: &PasswordArgs) -> Result<u8> {
    match &args.command {
        PasswordCommand::Hash => {
            let password = read_password(std::io::stdin().lock())?;
            let hash = hash_password(&password).context("failed to hash password")?;
            println!("{hash}");
            Ok(0)
        }
    }
}

/// Read the first line of `reader` as a password, without its line ending.
pub fn read_password(mut reader: impl BufRead) -> Result<Zeroizing<String>> {
    let mut line = Zeroizing::new(String::new());
    reader
        .read_line(&mut line)
        .context("failed to read password from stdin")?;
    let trimmed = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed);
    if line.is_empty() {
        bail!("password must not be empty");
    }
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn line_ending_is_stripped() {
        let pw = read_password(Cursor::new("hunter2\r\nignored\n")).unwrap();
        assert_eq!(pw.as_str(), "hunter2");
    }

    #[test]
    fn inner_whitespace_is_kept() {
        let pw = read_password(Cursor::new(" pass phrase \n")).unwrap();
        assert_eq!(pw.as_str(), " pass phrase ");
    }

    #[test]
    fn empty_input_rejected() {
        assert!(read_password(Cursor::new("")).is_err());
        assert!(read_password(Cursor::new("\n")).is_err());
    }
}
