//! Custom validation functions for configuration.

use validator::ValidationError;

/// Validate that an interface name is plausible: non-empty, short, and
/// free of whitespace.
pub fn validate_interface(name: &str) -> Result<(), ValidationError> {
    let valid = !name.is_empty()
        && name.len() <= 15
        && !name.chars().any(char::is_whitespace);

    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_interface"))
    }
}
