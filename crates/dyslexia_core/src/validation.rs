//! crates/dyslexia_core/src/validation.rs
//!
//! Presence and format checks shared by the handlers.

use regex::Regex;
use std::sync::OnceLock;

pub const MAX_WORD_CHARS: usize = 15;
pub const MAX_FILE_NAME_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{field} must be {max} characters or less")]
    TooLong { field: &'static str, max: usize },
    #[error("invalid email format")]
    InvalidEmail,
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("{0} must be between 0 and 100")]
    OutOfRange(&'static str),
}

/// Trims `value` and rejects it if nothing is left.
pub fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(trimmed.to_string())
}

fn bounded(field: &'static str, value: &str, max: usize) -> Result<String, ValidationError> {
    let trimmed = required(field, value)?;
    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(trimmed)
}

pub fn library_word(text: &str) -> Result<String, ValidationError> {
    bounded("text", text, MAX_WORD_CHARS)
}

pub fn file_name(name: &str) -> Result<String, ValidationError> {
    bounded("fileName", name, MAX_FILE_NAME_CHARS)
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"))
}

pub fn email(value: &str) -> Result<String, ValidationError> {
    let trimmed = required("email", value)?;
    if !email_regex().is_match(&trimmed) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(trimmed)
}

pub fn percent(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(ValidationError::OutOfRange(field));
    }
    Ok(value)
}

/// Registration input after validation. Nothing here has touched storage yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Checks a registration form in the order the client expects the errors:
/// presence, password confirmation, then email shape.
pub fn registration(
    username: &str,
    email_value: &str,
    password: &str,
    confirm_password: &str,
) -> Result<Registration, ValidationError> {
    let username = required("username", username)?;
    required("email", email_value)?;
    if password.is_empty() {
        return Err(ValidationError::Required("password"));
    }
    if confirm_password.is_empty() {
        return Err(ValidationError::Required("confirmPassword"));
    }
    if password != confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    let email = email(email_value)?;
    Ok(Registration {
        username,
        email,
        password: password.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_length_boundary() {
        assert_eq!(library_word("abcdefghijklmno").unwrap().len(), 15);
        assert_eq!(
            library_word("abcdefghijklmnop"),
            Err(ValidationError::TooLong { field: "text", max: 15 })
        );
    }

    #[test]
    fn word_length_counts_characters_not_bytes() {
        // 15 Vietnamese characters, well over 15 bytes.
        assert!(library_word("ươngươngươngươn").is_ok());
    }

    #[test]
    fn word_is_trimmed_and_required() {
        assert_eq!(library_word("  cat "), Ok("cat".to_string()));
        assert_eq!(library_word("   "), Err(ValidationError::Required("text")));
    }

    #[test]
    fn file_name_boundary() {
        assert!(file_name(&"a".repeat(50)).is_ok());
        assert!(file_name(&"a".repeat(51)).is_err());
    }

    #[test]
    fn email_shape() {
        assert!(email("kid@example.com").is_ok());
        assert_eq!(email("kid@example"), Err(ValidationError::InvalidEmail));
        assert_eq!(email("kid example@x.com"), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn registration_checks_password_before_email() {
        assert_eq!(
            registration("kid", "not-an-email", "secret1", "secret2"),
            Err(ValidationError::PasswordMismatch)
        );
        assert_eq!(
            registration("kid", "not-an-email", "secret", "secret"),
            Err(ValidationError::InvalidEmail)
        );
        assert_eq!(
            registration("", "kid@example.com", "secret", "secret"),
            Err(ValidationError::Required("username"))
        );
        assert!(registration("kid", "kid@example.com", "secret", "secret").is_ok());
    }

    #[test]
    fn percent_range() {
        assert!(percent("percent", 0.0).is_ok());
        assert!(percent("percent", 100.0).is_ok());
        assert!(percent("percent", 100.5).is_err());
        assert!(percent("percent", f64::NAN).is_err());
    }
}
