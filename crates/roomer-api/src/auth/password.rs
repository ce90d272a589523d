/// Password hashing and verification using Argon2id
///
/// Unlike the usual PHC-managed flow, the salt is generated separately and
/// stored alongside the digest: the account model keeps `password_hash` and
/// `password_salt` as two fields, and the salt is regenerated (never reused)
/// whenever a password changes.
///
/// - Algorithm: Argon2id with the crate's default parameters
/// - Salt: 16 bytes random, B64-encoded
/// - Output: PHC string, printable and safe to store
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use roomer_core::{RoomerError, Result, MIN_PASSWORD_LEN};

/// Generate a fresh random salt from the OS CSPRNG.
pub fn generate_salt() -> String {
    SaltString::generate(&mut OsRng).to_string()
}

/// Hash a plaintext password with the supplied salt.
///
/// Deterministic: the same (password, salt) pair always yields the same
/// digest, which is what verification relies on.
///
/// # Arguments
///
/// * `password` - The plaintext password to hash
/// * `salt` - A salt previously produced by [`generate_salt`]
///
/// # Returns
///
/// * `Ok(String)` - PHC string format digest
/// * `Err(RoomerError)` - If the salt is malformed or hashing fails
pub fn hash_password(password: &str, salt: &str) -> Result<String> {
    let salt = SaltString::from_b64(salt)
        .map_err(|e| RoomerError::Upstream(format!("Invalid password salt: {e}")))?;

    let argon2 = Argon2::default();
    let digest = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| RoomerError::Upstream(format!("Failed to hash password: {e}")))?;

    Ok(digest.to_string())
}

/// Verify a plaintext password against a stored (salt, digest) pair.
///
/// Recomputes the digest with the stored salt and compares.
///
/// # Returns
///
/// * `Ok(true)` - Password matches
/// * `Ok(false)` - Password does not match
/// * `Err(RoomerError)` - If the stored salt is malformed
pub fn verify_password(password: &str, salt: &str, expected_digest: &str) -> Result<bool> {
    Ok(hash_password(password, salt)? == expected_digest)
}

/// Validate that a candidate password meets the minimum length requirement.
pub fn validate_password(password: &str) -> Result<()> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(RoomerError::InvalidFormat(
            "Password must contain at least 5 characters".to_string(),
        ));
    }
    Ok(())
}
