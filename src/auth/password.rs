use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

// fixed salt for the decoy check; never used for stored hashes
const DECOY_SALT: &[u8] = b"site-api-decoy-salt";

/// Checks `password` against a PHC string from the users file.
///
/// A malformed hash is a configuration error, not a failed login.
pub fn verify_password(hash: &str, password: &str) -> anyhow::Result<bool> {
    let parsed =
        PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("users file holds a bad hash: {e}"))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Spends the same argon2 work as [`verify_password`] for an account that
/// does not exist. The outcome is discarded.
pub fn decoy_check(password: &str) {
    if let Ok(salt) = SaltString::encode_b64(DECOY_SALT) {
        let _ = Argon2::default().hash_password(password.as_bytes(), &salt);
    }
}

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("hashing password: {e}"))?;

    Ok(hash.to_string())
}
