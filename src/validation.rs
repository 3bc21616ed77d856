//! Form input validation for the login and register pages.

use crate::config::DEFAULT_PANTRY;
use crate::model::{Credentials, Registration};
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid"));

pub const MIN_PASSWORD_LEN: usize = 6;

/// Form validation error types
#[derive(Debug, PartialEq, Eq)]
pub enum FormError {
    EmptyField(&'static str),
    InvalidEmail,
    PasswordTooShort(usize),
}

impl std::fmt::Display for FormError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormError::EmptyField(field) => write!(f, "{} cannot be empty", field),
            FormError::InvalidEmail => write!(f, "Invalid email address"),
            FormError::PasswordTooShort(min) => {
                write!(f, "Password must have at least {} characters", min)
            }
        }
    }
}

impl std::error::Error for FormError {}

fn required(value: &str, field: &'static str) -> Result<String, FormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(FormError::EmptyField(field))
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn validate_email(input: &str) -> Result<String, FormError> {
    let email = required(input, "Email")?;
    if EMAIL_REGEX.is_match(&email) {
        Ok(email)
    } else {
        Err(FormError::InvalidEmail)
    }
}

pub fn validate_credentials(email: &str, password: &str) -> Result<Credentials, FormError> {
    let email = validate_email(email)?;
    if password.is_empty() {
        return Err(FormError::EmptyField("Password"));
    }
    Ok(Credentials {
        email,
        password: password.to_string(),
    })
}

/// New accounts start with the default pantry.
pub fn validate_registration(
    name: &str,
    email: &str,
    password: &str,
) -> Result<Registration, FormError> {
    let name = required(name, "Name")?;
    let email = validate_email(email)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(FormError::PasswordTooShort(MIN_PASSWORD_LEN));
    }
    Ok(Registration {
        name,
        email,
        password: password.to_string(),
        ingredients: DEFAULT_PANTRY.iter().map(|s| s.to_string()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails() {
        assert_eq!(validate_email(" ana@exemplo.com "), Ok("ana@exemplo.com".into()));
        assert_eq!(validate_email("ana@exemplo"), Err(FormError::InvalidEmail));
        assert_eq!(validate_email(""), Err(FormError::EmptyField("Email")));
    }

    #[test]
    fn registration_gets_default_pantry() {
        let reg = validate_registration("Ana", "ana@exemplo.com", "segredo").unwrap();
        assert_eq!(reg.ingredients, vec!["Alface".to_string()]);
        assert_eq!(
            validate_registration("Ana", "ana@exemplo.com", "abc").unwrap_err(),
            FormError::PasswordTooShort(MIN_PASSWORD_LEN)
        );
        assert_eq!(
            validate_registration(" ", "ana@exemplo.com", "segredo").unwrap_err(),
            FormError::EmptyField("Name")
        );
    }

    #[test]
    fn login_needs_password() {
        assert_eq!(
            validate_credentials("ana@exemplo.com", "").unwrap_err(),
            FormError::EmptyField("Password")
        );
        assert!(validate_credentials("ana@exemplo.com", "x").is_ok());
    }
}
