//! # gate-core: Foundational Types for tokengate
//!
//! Leaf crate of the workspace. It defines the identity type that flows from
//! the login collaborator through token issuance, back out of validation, and
//! into the request context of protected handlers.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `gate-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;

pub use error::ValidationError;
pub use identity::UserId;
