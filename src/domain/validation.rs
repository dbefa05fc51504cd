//! Field validation shared by profile create and update

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

/// Deliberately permissive: something, `@`, something, `.`, something.
const EMAIL_PATTERN: &str = r"^[^@]+@[^@]+\.[^@]+$";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => f.write_str("Name"),
            Self::Email => f.write_str("Email"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{0} is required and cannot be empty")]
    Required(Field),

    #[error("{0} cannot be empty")]
    Empty(Field),

    #[error("Invalid email format")]
    InvalidEmail,
}

impl FieldError {
    /// On creation a blank field is reported the same way as a missing one.
    pub fn into_required(self) -> Self {
        match self {
            Self::Empty(field) => Self::Required(field),
            other => other,
        }
    }
}

pub fn validate_name(raw: &str) -> Result<String, FieldError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(FieldError::Empty(Field::Name));
    }
    Ok(name.to_string())
}

pub fn validate_email(raw: &str) -> Result<String, FieldError> {
    let email = raw.trim();
    if email.is_empty() {
        return Err(FieldError::Empty(Field::Email));
    }
    if !email_regex().is_match(email) {
        return Err(FieldError::InvalidEmail);
    }
    Ok(email.to_string())
}

pub fn validate_bio(raw: Option<&str>) -> String {
    raw.map(str::trim).unwrap_or_default().to_string()
}

/// Validate a field that must be present, reporting absence as `Required`.
pub fn require(
    raw: Option<&str>,
    field: Field,
    validate: fn(&str) -> Result<String, FieldError>,
) -> Result<String, FieldError> {
    let raw = raw.ok_or(FieldError::Required(field))?;
    validate(raw).map_err(FieldError::into_required)
}
