//! # Folio Security
//!
//! Argon2id password hashing for Folio user accounts.

pub mod password;

pub use password::*;
