//! # Route Modules
//!
//! - [`session`]: login (public) and whoami (behind the auth gate).

pub mod session;
