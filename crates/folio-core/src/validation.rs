//! Validation utilities.

use crate::FolioError;
use validator::{Validate, ValidationErrors};

/// Extension trait for validation.
pub trait ValidateExt: Validate {
    /// Validates the struct and returns a `FolioError` on failure.
    fn validate_request(&self) -> Result<(), FolioError> {
        self.validate().map_err(validation_errors_to_folio_error)
    }
}

impl<T: Validate> ValidateExt for T {}

/// Converts `validator::ValidationErrors` into a single `FolioError::Validation`.
///
/// Field errors are sorted by field name so the message is stable.
#[must_use]
pub fn validation_errors_to_folio_error(errors: ValidationErrors) -> FolioError {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string);
                format!("{}: {}", field, message)
            })
        })
        .collect();
    messages.sort();

    FolioError::Validation(messages.join("; "))
}

/// Common validation functions.
pub mod rules {
    use validator::ValidationError;

    /// Validates that a string is not blank (not empty after trimming).
    pub fn not_blank(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new("not_blank"));
        }
        Ok(())
    }

    /// Validates an ISBN: 10 or 13 digits once hyphens and spaces are removed.
    pub fn valid_isbn(isbn: &str) -> Result<(), ValidationError> {
        let digits: Vec<char> = isbn.chars().filter(|c| *c != '-' && *c != ' ').collect();
        if !digits.iter().all(char::is_ascii_digit) {
            return Err(ValidationError::new("isbn_not_numeric"));
        }
        if digits.len() != 10 && digits.len() != 13 {
            return Err(ValidationError::new("isbn_invalid_length"));
        }
        Ok(())
    }

    /// Validates a language tag such as `en` or `pt-BR`.
    pub fn valid_language(language: &str) -> Result<(), ValidationError> {
        let mut parts = language.split('-');
        let primary = parts.next().unwrap_or_default();
        if primary.len() < 2 || primary.len() > 3 || !primary.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::new("language_invalid"));
        }
        if parts.any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_alphanumeric())) {
            return Err(ValidationError::new("language_invalid"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::rules::*;
    use super::*;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 3, message = "too short"))]
        name: String,
        #[validate(range(min = 1, max = 5))]
        rating: i32,
    }

    #[test]
    fn test_not_blank() {
        assert!(not_blank("hello").is_ok());
        assert!(not_blank("   ").is_err());
        assert!(not_blank("").is_err());
    }

    #[test]
    fn test_valid_isbn() {
        assert!(valid_isbn("0306406152").is_ok());
        assert!(valid_isbn("978-0-306-40615-7").is_ok());
        assert!(valid_isbn("12345").is_err());
        assert!(valid_isbn("03064061X2").is_err());
    }

    #[test]
    fn test_valid_language() {
        assert!(valid_language("en").is_ok());
        assert!(valid_language("pt-BR").is_ok());
        assert!(valid_language("e").is_err());
        assert!(valid_language("en-").is_err());
    }

    #[test]
    fn test_validate_request_collects_messages() {
        let sample = Sample {
            name: "ab".to_string(),
            rating: 9,
        };
        let err = sample.validate_request().unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        let message = err.to_string();
        assert!(message.contains("name: too short"));
        assert!(message.contains("rating: range"));
    }
}
