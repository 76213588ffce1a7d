//! Input validation utilities

/// Longest username accepted, in characters
pub const MAX_USERNAME_CHARS: usize = 256;

/// Validate username
///
/// Any printable text is accepted, spaces and non-ASCII letters included.
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.trim().is_empty() {
        return Err("Username is required".to_string());
    }

    if username.chars().count() > MAX_USERNAME_CHARS {
        return Err(format!(
            "Username must be at most {} characters long",
            MAX_USERNAME_CHARS
        ));
    }

    if username.chars().any(char::is_control) {
        return Err("Username must not contain control characters".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Validate a required free-text field such as a property or room name
pub fn validate_required(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", field));
    }

    Ok(())
}
