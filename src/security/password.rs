//! Password hashing and strength policy.
//!
//! # Responsibilities
//! - Hash credentials with PBKDF2-SHA256 and a per-call random salt
//! - Verify a plaintext against a stored digest in constant time
//! - Enforce the registration strength rules
//!
//! # Design Decisions
//! - PHC string format: salt and parameters travel inside the digest,
//!   so verification needs no out-of-band state
//! - Verification never errors outward; a malformed digest is simply
//!   a non-match
//! - Strength checks are advisory: callers decide whether to reject

use pbkdf2::password_hash::{
    rand_core::OsRng, Error as HashError, PasswordHash, PasswordHasher, PasswordVerifier,
    SaltString,
};
use pbkdf2::Pbkdf2;
use thiserror::Error;

/// Symbols accepted by the strength policy.
const PUNCTUATION: &str = "!@#$%^&*(),.?\":{}|<>";

/// Minimum password length accepted at registration.
const MIN_LENGTH: usize = 8;

/// First strength rule a candidate password violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StrengthError {
    #[error("Password must be at least 8 characters long")]
    TooShort,
    #[error("Password must contain at least one uppercase letter")]
    MissingUppercase,
    #[error("Password must contain at least one lowercase letter")]
    MissingLowercase,
    #[error("Password must contain at least one number")]
    MissingDigit,
    #[error("Password must contain at least one special character")]
    MissingSymbol,
}

/// Hash a plaintext password into a self-describing PHC digest.
///
/// A fresh random salt is drawn per call, so hashing the same input
/// twice never yields the same digest.
pub fn hash(plaintext: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    let digest = Pbkdf2.hash_password(plaintext.as_bytes(), &salt)?;
    Ok(digest.to_string())
}

/// Check a plaintext against a stored digest.
///
/// Comparison runs in constant time inside the password-hash crate.
/// A digest that fails to parse verifies as false.
pub fn verify(digest: &str, plaintext: &str) -> bool {
    match PasswordHash::new(digest) {
        Ok(parsed) => Pbkdf2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Validate password strength, reporting the first violated rule.
///
/// Rules are checked in a fixed order so diagnostics are stable:
/// length, uppercase, lowercase, digit, symbol.
pub fn validate_strength(plaintext: &str) -> Result<(), StrengthError> {
    if plaintext.chars().count() < MIN_LENGTH {
        return Err(StrengthError::TooShort);
    }
    if !plaintext.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(StrengthError::MissingUppercase);
    }
    if !plaintext.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(StrengthError::MissingLowercase);
    }
    if !plaintext.chars().any(|c| c.is_ascii_digit()) {
        return Err(StrengthError::MissingDigit);
    }
    if !plaintext.chars().any(|c| PUNCTUATION.contains(c)) {
        return Err(StrengthError::MissingSymbol);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_verifies() {
        let digest = hash("Sup3r$ecret").unwrap();
        assert!(verify(&digest, "Sup3r$ecret"));
        assert!(!verify(&digest, "Sup3r$ecret2"));
    }

    #[test]
    fn salted_digests_differ() {
        let a = hash("Sup3r$ecret").unwrap();
        let b = hash("Sup3r$ecret").unwrap();
        assert_ne!(a, b);
        assert!(verify(&a, "Sup3r$ecret"));
        assert!(verify(&b, "Sup3r$ecret"));
    }

    #[test]
    fn malformed_digest_is_a_non_match() {
        assert!(!verify("not-a-phc-string", "anything"));
        assert!(!verify("", "anything"));
    }

    #[test]
    fn strength_rules_report_first_violation() {
        assert_eq!(validate_strength("Ab1!"), Err(StrengthError::TooShort));
        assert_eq!(
            validate_strength("lowercase1!"),
            Err(StrengthError::MissingUppercase)
        );
        assert_eq!(
            validate_strength("UPPERCASE1!"),
            Err(StrengthError::MissingLowercase)
        );
        assert_eq!(
            validate_strength("NoDigits!!"),
            Err(StrengthError::MissingDigit)
        );
        assert_eq!(
            validate_strength("NoSymbol123"),
            Err(StrengthError::MissingSymbol)
        );
        assert_eq!(validate_strength("Sup3r$ecret"), Ok(()));
    }
}
