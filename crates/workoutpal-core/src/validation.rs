use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Request field rejected before it reaches a service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("email is required")]
    EmailRequired,

    #[error("invalid email format")]
    EmailFormat,

    #[error("username is required")]
    UsernameRequired,

    #[error("username must be at least 3 characters")]
    UsernameTooShort,

    #[error("username must be less than 50 characters")]
    UsernameTooLong,

    #[error("name is required")]
    NameRequired,

    #[error("name must be at least 2 characters")]
    NameTooShort,

    #[error("password is required")]
    PasswordRequired,

    #[error("password must be at least 6 characters")]
    PasswordTooShort,
}

const MIN_USERNAME: usize = 3;
const MAX_USERNAME: usize = 50;
const MIN_NAME: usize = 2;
const MIN_PASSWORD: usize = 6;

/// Types that can check their own fields after decoding
pub trait Validate {
    /// # Errors
    ///
    /// Returns the first field that fails validation
    fn validate(&self) -> Result<(), ValidationError>;
}

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("must be valid regex")
});

/// # Errors
///
/// Returns an error if the email is empty or malformed
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::EmailRequired);
    }

    if !EMAIL.is_match(email) {
        return Err(ValidationError::EmailFormat);
    }

    Ok(())
}

/// # Errors
///
/// Returns an error if the username is empty, shorter than 3 or longer
/// than 50 characters
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let len = username.chars().count();

    match len {
        0 => Err(ValidationError::UsernameRequired),
        len if len < MIN_USERNAME => Err(ValidationError::UsernameTooShort),
        len if len > MAX_USERNAME => Err(ValidationError::UsernameTooLong),
        _ => Ok(()),
    }
}

/// # Errors
///
/// Returns an error if the name is empty or has fewer than 2 non-blank
/// characters
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::NameRequired);
    }

    if name.trim().chars().count() < MIN_NAME {
        return Err(ValidationError::NameTooShort);
    }

    Ok(())
}

/// # Errors
///
/// Returns an error if the password is empty or shorter than 6 characters
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::PasswordRequired);
    }

    if password.chars().count() < MIN_PASSWORD {
        return Err(ValidationError::PasswordTooShort);
    }

    Ok(())
}
