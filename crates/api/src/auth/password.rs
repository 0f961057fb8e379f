//! Password hashing and the driver password rules.
//!
//! Hashes are Argon2id PHC strings with a random [`OsRng`] salt, so the
//! parameters and salt travel inside the stored value.
//!
//! Drivers start without a password: until one is set, the password is the
//! same six-digit credential derived from their CPF.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use fleetcheck_core::credentials::driver_credential;
use fleetcheck_core::error::CoreError;

/// Minimum length for staff passwords and driver-chosen passwords.
pub const MIN_PASSWORD_LENGTH: usize = 8;

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// `Ok(false)` on mismatch; `Err` only when `hash` is not a valid PHC string.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

pub fn validate_password_strength(password: &str, min_length: usize) -> Result<(), CoreError> {
    if password.chars().count() < min_length {
        return Err(CoreError::Validation(format!(
            "Password must be at least {min_length} characters long"
        )));
    }
    Ok(())
}

/// Check a driver's password.
///
/// With a stored hash the password is verified against it; without one the
/// password must equal the credential derived from `cpf`.
pub fn verify_driver_password(
    password: &str,
    cpf: &str,
    password_hash: Option<&str>,
) -> Result<bool, argon2::password_hash::Error> {
    match password_hash {
        Some(hash) => verify_password(password, hash),
        None => Ok(driver_credential(cpf).as_deref() == Some(password.trim())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_round_trip() {
        let hash = hash_password("frota-segura-2026").expect("hashing should succeed");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("frota-segura-2026", &hash).unwrap());
        assert!(!verify_password("outra-senha", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("x", "not-a-phc-string").is_err());
    }

    #[test]
    fn strength_counts_characters() {
        assert!(validate_password_strength("curta", MIN_PASSWORD_LENGTH).is_err());
        assert!(validate_password_strength("çççççççç", MIN_PASSWORD_LENGTH).is_ok());
    }

    #[test]
    fn driver_without_hash_uses_credential() {
        let cpf = "123.456.789-09";
        assert!(verify_driver_password("123456", cpf, None).unwrap());
        assert!(!verify_driver_password("654321", cpf, None).unwrap());
    }

    #[test]
    fn driver_with_hash_ignores_credential() {
        let hash = hash_password("minha-senha").unwrap();
        let cpf = "12345678909";
        assert!(verify_driver_password("minha-senha", cpf, Some(&hash)).unwrap());
        assert!(!verify_driver_password("123456", cpf, Some(&hash)).unwrap());
    }
}
