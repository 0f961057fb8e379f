//! Document and plate normalization, and the CPF-derived driver credential.
//!
//! Drivers without a password log in with the first six digits of their CPF
//! as both login and password. CPFs are stored normalized to their 11 digits;
//! logins typed with punctuation (`123.456.789-01`) go through
//! [`normalize_cpf`] before any lookup.

use crate::error::CoreError;

/// Number of CPF digits that make up a derived driver credential.
pub const CREDENTIAL_DIGITS: usize = 6;

/// Number of digits in a complete CPF.
pub const CPF_DIGITS: usize = 11;

/// Length of a normalized plate identifier (`ABC1D23` / `ABC1234`).
pub const PLATE_LENGTH: usize = 7;

/// Strip everything but ASCII digits.
pub fn normalize_cpf(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Validate that a CPF has exactly eleven digits once punctuation is removed.
pub fn validate_cpf(raw: &str) -> Result<String, CoreError> {
    let digits = normalize_cpf(raw);
    if digits.len() != CPF_DIGITS {
        return Err(CoreError::Validation(format!(
            "CPF must have {CPF_DIGITS} digits, got {}",
            digits.len()
        )));
    }
    Ok(digits)
}

/// The credential a driver without a password uses for both login and password.
///
/// Returns `None` when the CPF has fewer than six digits.
pub fn driver_credential(cpf: &str) -> Option<String> {
    let digits = normalize_cpf(cpf);
    if digits.len() < CREDENTIAL_DIGITS {
        return None;
    }
    Some(digits[..CREDENTIAL_DIGITS].to_string())
}

/// Whether `login` identifies the driver with this CPF.
///
/// Accepts either the six-digit credential or the full CPF (with or without
/// punctuation).
pub fn login_matches_cpf(login: &str, cpf: &str) -> bool {
    let login = normalize_cpf(login);
    let cpf = normalize_cpf(cpf);
    if login.is_empty() {
        return false;
    }
    login == cpf || driver_credential(&cpf).as_deref() == Some(login.as_str())
}

/// Uppercase a plate and drop separators.
pub fn normalize_plate(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Normalize and validate a plate identifier.
pub fn validate_plate(raw: &str) -> Result<String, CoreError> {
    let plate = normalize_plate(raw);
    if plate.len() != PLATE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Plate '{raw}' must have {PLATE_LENGTH} letters or digits"
        )));
    }
    Ok(plate)
}

/// Reject blank required text fields.
pub fn require_text(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_cpf_strips_punctuation() {
        assert_eq!(normalize_cpf("123.456.789-01"), "12345678901");
        assert_eq!(normalize_cpf(" 123 456 "), "123456");
    }

    #[test]
    fn credential_is_first_six_digits() {
        assert_eq!(driver_credential("123.456.789-01").as_deref(), Some("123456"));
        assert_eq!(driver_credential("12345"), None);
    }

    #[test]
    fn validate_cpf_requires_eleven_digits() {
        assert_eq!(validate_cpf("123.456.789-01").unwrap(), "12345678901");
        let err = validate_cpf("123.456").unwrap_err();
        assert!(err.to_string().contains("11 digits"));
    }

    #[test]
    fn login_accepts_credential_or_full_cpf() {
        assert!(login_matches_cpf("123456", "123.456.789-01"));
        assert!(login_matches_cpf("12345678901", "123.456.789-01"));
        assert!(login_matches_cpf("123.456.789-01", "12345678901"));
        assert!(!login_matches_cpf("654321", "123.456.789-01"));
        assert!(!login_matches_cpf("", "123.456.789-01"));
    }

    #[test]
    fn plates_are_normalized() {
        assert_eq!(normalize_plate("abc-1d23"), "ABC1D23");
        assert_eq!(validate_plate("abc 1234").unwrap(), "ABC1234");
        assert!(validate_plate("AB-12").is_err());
    }

    #[test]
    fn require_text_rejects_blank() {
        assert!(require_text("name", "  ").is_err());
        assert!(require_text("name", "Maria").is_ok());
    }
}
