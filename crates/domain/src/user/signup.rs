//! Signup and login request bodies.

use crate::validation::{Fields, ValidationErrors, char_field};

use super::NewUser;

const EMAIL_MAX_LENGTH: usize = 80;
const USERNAME_MAX_LENGTH: usize = 25;
const PASSWORD_MIN_LENGTH: usize = 8;

/// A validated registration request.
pub struct Signup;

impl Signup {
    /// Validates a signup body into factory input. The phone number is
    /// returned in normalized form (`+` and digits only).
    pub fn from_fields(fields: &Fields) -> Result<NewUser, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let email = errors.collect(
            "email",
            char_field(fields, "email", Some(EMAIL_MAX_LENGTH)).and_then(check_email),
        );
        let username = errors.collect(
            "username",
            char_field(fields, "username", Some(USERNAME_MAX_LENGTH)),
        );
        let phone_number = errors.collect(
            "phone_number",
            char_field(fields, "phone_number", None).and_then(|raw| normalize_phone(&raw)),
        );
        let password = errors.collect(
            "password",
            char_field(fields, "password", None).and_then(check_password),
        );

        match (email, username, phone_number, password) {
            (Some(email), Some(username), Some(phone_number), Some(password))
                if errors.is_empty() =>
            {
                Ok(NewUser {
                    email,
                    username,
                    phone_number,
                    password,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Login body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn from_fields(fields: &Fields) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let email = errors.collect("email", char_field(fields, "email", None));
        let password = errors.collect("password", char_field(fields, "password", None));

        match (email, password) {
            (Some(email), Some(password)) if errors.is_empty() => Ok(Self { email, password }),
            _ => Err(errors),
        }
    }
}

fn check_email(email: String) -> Result<String, String> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && domain.split('.').all(|label| !label.is_empty())
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(email)
    } else {
        Err("Enter a valid email address.".to_string())
    }
}

/// Strips spaces, dashes, dots and parentheses, then requires an optional
/// leading `+` followed by 7 to 15 digits.
fn normalize_phone(raw: &str) -> Result<String, String> {
    let compact: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();
    let digits = compact.strip_prefix('+').unwrap_or(&compact);

    if (7..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit()) {
        Ok(compact)
    } else {
        Err("Enter a valid phone number.".to_string())
    }
}

fn check_password(password: String) -> Result<String, String> {
    if password.chars().count() < PASSWORD_MIN_LENGTH {
        Err(format!(
            "Ensure this field has at least {PASSWORD_MIN_LENGTH} characters."
        ))
    } else {
        Ok(password)
    }
}
