//! # gate-cli: Operator Tooling for tokengate
//!
//! Subcommand implementations for the `gate` binary. Each `run_*` function
//! returns the process exit code so `main` stays a thin dispatcher.

pub mod password;
pub mod secret;
pub mod token;
