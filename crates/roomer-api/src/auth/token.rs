//! Opaque session-token issuance
//!
//! Tokens are random byte strings from a CSPRNG, URL-safe base64 encoded.
//! They carry no structure and no expiry; a token stays valid until the
//! account rotates it (sign-up issues the first one, a password change
//! replaces it).

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;

/// Token strength at account creation.
pub const SIGNUP_TOKEN_BYTES: usize = 16;

/// Token strength at password reset/change.
pub const RESET_TOKEN_BYTES: usize = 64;

/// Issue a fresh random opaque token of the requested strength.
pub fn issue_token(byte_length: usize) -> String {
    let mut bytes = vec![0u8; byte_length];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
