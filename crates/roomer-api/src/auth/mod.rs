//! Authentication and authorization module
//!
//! This module provides opaque-token authentication with the following
//! components:
//! - Password hashing with Argon2 over an explicitly stored salt
//! - Random session-token issuance
//! - The authorization gate resolving presented tokens to accounts

pub mod gate;
pub mod password;
pub mod token;

pub use gate::{authenticate, require_owner, resolve_owner};
pub use password::{generate_salt, hash_password, validate_password, verify_password};
pub use token::{issue_token, RESET_TOKEN_BYTES, SIGNUP_TOKEN_BYTES};
